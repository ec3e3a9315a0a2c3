//! Contexto de una ejecución.

use std::sync::Arc;

use drp_domain::{RepoHandle, TractId};
use uuid::Uuid;

use crate::logs::LogRouter;

/// Datos compartidos por todas las etapas de una ejecución.
///
/// Se construye una vez en `OrchestratorBuilder::build` y no cambia hasta el
/// final de la ejecución.
#[derive(Debug)]
pub struct RunContext {
    pub run_id: Uuid,
    pub repo: Arc<RepoHandle>,
    pub logs: LogRouter,
    pub tracts: Vec<TractId>,
}

impl RunContext {
    pub fn new(run_id: Uuid, repo: Arc<RepoHandle>, logs: LogRouter, tracts: Vec<TractId>) -> Self {
        Self { run_id,
               repo,
               logs,
               tracts }
    }
}
