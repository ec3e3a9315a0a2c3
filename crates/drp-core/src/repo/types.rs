//! Estado reconstruido de una ejecución (`RunInstance`).
//!
//! El repositorio aplica un replay lineal: consume eventos en orden `seq` y
//! acumula una `StageExecution` por barrera. No guarda salidas de las
//! herramientas, sólo conteos, etiquetas fallidas y rutas de log.
use drp_domain::DataId;
use uuid::Uuid;

use crate::errors::PipelineError;
use crate::event::{RunEvent, RunEventKind};
use crate::stage::{StagePhase, StageStatus};

#[derive(Debug, Clone)]
pub struct RunInstance {
    pub id: Uuid,
    pub plan_hash: Option<String>,
    pub executions: Vec<StageExecution>,
    pub completed: bool,
    pub fingerprint: Option<String>,
    pub aborted: Option<PipelineError>,
}

impl RunInstance {
    pub fn tasks_submitted(&self) -> usize {
        self.executions.iter().map(|e| e.submitted).sum()
    }

    /// Ejecuciones de una etapa concreta, en orden.
    pub fn executions_of<'a>(&'a self, stage: &'a str) -> impl Iterator<Item = &'a StageExecution> + 'a {
        self.executions.iter().filter(move |e| e.stage == stage)
    }
}

/// Una barrera: una etapa aplicada a un alcance (global o un patch).
#[derive(Debug, Clone)]
pub struct StageExecution {
    pub execution: usize,
    pub stage: String,
    pub phase: StagePhase,
    pub scope: Option<DataId>,
    pub status: StageStatus,
    pub submitted: usize,
    pub succeeded: usize,
    pub failed_labels: Vec<String>,
}

/// Trait para reconstruir (`replay`) el estado de una ejecución a partir de eventos.
pub trait RunRepository {
    fn load(&self, run_id: Uuid, events: &[RunEvent]) -> RunInstance;
}

#[derive(Debug, Default)]
pub struct InMemoryRunRepository;

impl InMemoryRunRepository {
    pub fn new() -> Self {
        Self
    }
}

impl RunRepository for InMemoryRunRepository {
    fn load(&self, run_id: Uuid, events: &[RunEvent]) -> RunInstance {
        let mut instance = RunInstance { id: run_id,
                                         plan_hash: None,
                                         executions: Vec::new(),
                                         completed: false,
                                         fingerprint: None,
                                         aborted: None };
        for ev in events.iter().filter(|e| e.run_id == run_id) {
            match &ev.kind {
                RunEventKind::RunInitialized { plan_hash, .. } => instance.plan_hash = Some(plan_hash.clone()),
                RunEventKind::StageStarted { execution,
                                             stage,
                                             phase,
                                             scope,
                                             .. } => instance.executions.push(StageExecution { execution: *execution,
                                                                                                stage: stage.clone(),
                                                                                                phase: *phase,
                                                                                                scope: scope.clone(),
                                                                                                status: StageStatus::Running,
                                                                                                submitted: 0,
                                                                                                succeeded: 0,
                                                                                                failed_labels: vec![] }),
                RunEventKind::TaskSubmitted { execution, .. } => {
                    if let Some(slot) = find(&mut instance, *execution) {
                        slot.submitted += 1;
                    }
                }
                RunEventKind::TaskSucceeded { execution, .. } => {
                    if let Some(slot) = find(&mut instance, *execution) {
                        slot.succeeded += 1;
                    }
                }
                RunEventKind::TaskFailed { execution, label, .. } => {
                    if let Some(slot) = find(&mut instance, *execution) {
                        slot.failed_labels.push(label.clone());
                    }
                }
                RunEventKind::StageCompleted { execution, .. } => {
                    if let Some(slot) = find(&mut instance, *execution) {
                        slot.status = StageStatus::Completed;
                    }
                }
                RunEventKind::StageFailed { execution, .. } => {
                    if let Some(slot) = find(&mut instance, *execution) {
                        slot.status = StageStatus::Failed;
                    }
                }
                RunEventKind::RunCompleted { run_fingerprint } => {
                    instance.completed = true;
                    instance.fingerprint = Some(run_fingerprint.clone());
                }
                RunEventKind::RunAborted { error } => instance.aborted = Some(error.clone()),
            }
        }
        instance
    }
}

fn find(instance: &mut RunInstance, execution: usize) -> Option<&mut StageExecution> {
    instance.executions.iter_mut().rev().find(|e| e.execution == execution)
}
