//! Taxonomía de errores del pipeline.
//!
//! Ningún componente reintenta: cualquier variante aborta la ejecución en la
//! siguiente barrera. Es serializable para poder quedar registrada en los
//! eventos de la ejecución.

use std::path::PathBuf;

use drp_domain::{Dimension, DomainError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum PipelineError {
    /// El registro o el sky map no se pueden abrir/consultar.
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),
    /// A un identificador le falta una dimensión requerida por la etapa.
    #[error("invalid identifier for stage {stage}: missing dimension `{dimension}`")]
    InvalidIdentifier { stage: String, dimension: Dimension },
    /// El proceso externo no pudo arrancar.
    #[error("task {label} could not launch `{program}`: {reason}")]
    TaskLaunchFailure {
        label: String,
        program: String,
        reason: String,
        stdout: Option<PathBuf>,
        stderr: Option<PathBuf>,
    },
    /// El proceso externo terminó con código distinto de 0 (o por señal).
    #[error("task {label} exited with status {}{}", display_code(.exit_code), display_logs(.stdout, .stderr))]
    TaskExecutionFailure {
        label: String,
        exit_code: Option<i32>,
        stdout: Option<PathBuf>,
        stderr: Option<PathBuf>,
    },
    #[error("io: {0}")]
    Io(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Construye `InvalidIdentifier` a partir del error de dominio.
    pub fn from_domain(stage: &str, err: DomainError) -> Self {
        match err {
            DomainError::MissingDimension(dimension) => Self::InvalidIdentifier { stage: stage.to_string(),
                                                                                  dimension },
            other => Self::Internal(format!("stage {stage}: {other}")),
        }
    }

    /// Destinos de log asociados a un fallo de tarea, si los hay.
    pub fn log_paths(&self) -> (Option<&PathBuf>, Option<&PathBuf>) {
        match self {
            Self::TaskLaunchFailure { stdout, stderr, .. } | Self::TaskExecutionFailure { stdout, stderr, .. } => {
                (stdout.as_ref(), stderr.as_ref())
            }
            _ => (None, None),
        }
    }

    /// Indica si el error proviene de un work item (lanzamiento o ejecución).
    pub fn is_task_failure(&self) -> bool {
        matches!(self,
                 Self::TaskLaunchFailure { .. } | Self::TaskExecutionFailure { .. })
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "<signal>".to_string(),
    }
}

fn display_logs(stdout: &Option<PathBuf>, stderr: &Option<PathBuf>) -> String {
    match (stdout, stderr) {
        (Some(o), Some(e)) if o == e => format!(" (log: {})", o.display()),
        (Some(o), Some(e)) => format!(" (stdout: {}, stderr: {})", o.display(), e.display()),
        (Some(o), None) => format!(" (stdout: {})", o.display()),
        (None, Some(e)) => format!(" (stderr: {})", e.display()),
        (None, None) => String::new(),
    }
}
