use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::CommandInvocation;

/// Destinos de stdout/stderr de un work item. `None` = descartar (null device).
///
/// Si ambos apuntan al mismo fichero el runner debe abrirlo una sola vez y
/// compartir el descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDestination {
    pub stdout: Option<PathBuf>,
    pub stderr: Option<PathBuf>,
}

impl LogDestination {
    pub fn discard() -> Self {
        Self::default()
    }

    pub fn combined(path: PathBuf) -> Self {
        Self { stdout: Some(path.clone()),
               stderr: Some(path) }
    }

    pub fn is_discarded(&self) -> bool {
        self.stdout.is_none() && self.stderr.is_none()
    }

    pub fn is_combined(&self) -> bool {
        matches!((&self.stdout, &self.stderr), (Some(o), Some(e)) if o == e)
    }
}

/// Unidad de trabajo que se entrega al dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub label: String,
    pub invocation: CommandInvocation,
    pub logs: LogDestination,
}

/// Resultado de un work item que terminó con código 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub label: String,
    pub exit_code: i32,
    pub logs: LogDestination,
}
