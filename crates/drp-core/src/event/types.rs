//! Tipos de evento de una ejecución y estructura `RunEvent`.
//!
//! Rol en el pipeline:
//! - El orquestador emite eventos a un `EventStore` append-only.
//! - El orden por `seq` refleja el orden real de envío y de join: sirve
//!   para verificar la barrera entre etapas y para reconstruir el estado de
//!   la ejecución (`RunRepository`).
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use drp_domain::DataId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PipelineError;
use crate::model::LogDestination;
use crate::stage::StagePhase;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Primer evento de un `run_id`: fija el hash del plan.
    RunInitialized {
        plan_hash: String,
        stage_count: usize,
        repo: PathBuf,
    },
    /// Comienza una ejecución de etapa (una barrera). `scope` es el
    /// identificador base `{tract, patch}` en el bucle de patches.
    StageStarted {
        execution: usize,
        stage: String,
        phase: StagePhase,
        scope: Option<DataId>,
        items: usize,
    },
    /// Un work item fue entregado al dispatcher.
    TaskSubmitted {
        execution: usize,
        stage: String,
        label: String,
        data_id: DataId,
    },
    /// El join de un work item devolvió código 0.
    TaskSucceeded {
        execution: usize,
        label: String,
        exit_code: i32,
        logs: LogDestination,
    },
    /// El join de un work item devolvió error.
    TaskFailed {
        execution: usize,
        label: String,
        error: PipelineError,
    },
    /// La barrera se resolvió con todos los work items correctos.
    StageCompleted {
        execution: usize,
        stage: String,
        tasks: usize,
    },
    /// La barrera se resolvió con fallos. La ejecución no continúa.
    StageFailed {
        execution: usize,
        stage: String,
        failed: usize,
        total: usize,
    },
    /// Cierre con fingerprint agregado de la ejecución.
    RunCompleted { run_fingerprint: String },
    /// Cierre por error fatal.
    RunAborted { error: PipelineError },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // asignado por el EventStore (orden append)
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>,
}
