//! Orquestador de etapas.

use std::sync::Arc;

use drp_domain::DataId;
use log::{debug, error, info, warn};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogSource};
use crate::dispatch::TaskDispatcher;
use crate::engine::{OrchestratorBuilderInit, RunContext};
use crate::errors::PipelineError;
use crate::event::{EventStore, RunEvent, RunEventKind};
use crate::hashing::hash_value;
use crate::model::{CommandInvocation, LogDestination, TaskRequest};
use crate::repo::{InMemoryRunRepository, RunInstance, RunRepository};
use crate::stage::{Enumeration, StageDefinition, StagePhase, StagePlan};

/// Estado observable del orquestador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Construido, sin ejecutar.
    Pending,
    /// Ejecutando (o detenido con error en) la fase indicada.
    Stage(StagePhase),
    Done,
    Aborted,
}

/// Resumen de una ejecución completada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub stage_executions: usize,
    pub tasks: usize,
    pub fingerprint: String,
}

/// Work item ya materializado, pendiente de envío.
struct Prepared {
    label: String,
    data_id: DataId,
    invocation: CommandInvocation,
    logs: LogDestination,
}

/// Orquestador de una ejecución del pipeline.
///
/// Recorre el plan con barreras fan-out/fan-in: ninguna tarea de la
/// ejecución de etapa N+1 se envía antes de que todos los handles de N se
/// hayan unido. El control es síncrono; sólo los procesos despachados corren
/// en paralelo.
pub struct Orchestrator<S, D, E>
    where S: CatalogSource,
          D: TaskDispatcher,
          E: EventStore
{
    catalog: Catalog<S>,
    dispatcher: D,
    event_store: E,
    plan: StagePlan,
    ctx: RunContext,
    state: PipelineState,
    executions: usize,
    tasks: usize,
    records: Vec<Value>,
}

impl<S, D, E> Orchestrator<S, D, E>
    where S: CatalogSource,
          D: TaskDispatcher,
          E: EventStore
{
    #[inline]
    pub fn builder(source: S, dispatcher: D) -> OrchestratorBuilderInit<S, D> {
        OrchestratorBuilderInit { source, dispatcher }
    }

    pub fn new_with_parts(catalog: Catalog<S>, dispatcher: D, event_store: E, plan: StagePlan, ctx: RunContext) -> Self {
        Self { catalog,
               dispatcher,
               event_store,
               plan,
               ctx,
               state: PipelineState::Pending,
               executions: 0,
               tasks: 0,
               records: Vec::new() }
    }

    pub fn run_id(&self) -> Uuid {
        self.ctx.run_id
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn catalog(&self) -> &Catalog<S> {
        &self.catalog
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.event_store.list(self.ctx.run_id)
    }

    /// Estado reconstruido a partir de los eventos emitidos hasta ahora.
    pub fn instance(&self) -> RunInstance {
        InMemoryRunRepository::new().load(self.ctx.run_id, &self.events())
    }

    /// Ejecuta el plan completo. Sólo puede llamarse una vez.
    pub fn run(&mut self) -> Result<RunSummary, PipelineError> {
        if self.state != PipelineState::Pending {
            return Err(PipelineError::Internal(format!("run {} already executed", self.ctx.run_id)));
        }
        info!("run:start run_id={} plan_hash={} repo={}",
              self.ctx.run_id,
              self.plan.plan_hash(),
              self.ctx.repo.root().display());
        self.emit(RunEventKind::RunInitialized { plan_hash: self.plan.plan_hash().to_string(),
                                                 stage_count: self.plan.len(),
                                                 repo: self.ctx.repo.root().to_path_buf() });

        match self.run_stages() {
            Ok(()) => {
                let fingerprint = self.run_fingerprint();
                self.emit(RunEventKind::RunCompleted { run_fingerprint: fingerprint.clone() });
                self.state = PipelineState::Done;
                info!("run:completed run_id={} executions={} tasks={}",
                      self.ctx.run_id,
                      self.executions,
                      self.tasks);
                Ok(RunSummary { run_id: self.ctx.run_id,
                                stage_executions: self.executions,
                                tasks: self.tasks,
                                fingerprint })
            }
            Err(err) => {
                error!("run:aborted run_id={} state={:?}: {err}", self.ctx.run_id, self.state);
                self.emit(RunEventKind::RunAborted { error: err.clone() });
                self.state = PipelineState::Aborted;
                Err(err)
            }
        }
    }

    fn run_stages(&mut self) -> Result<(), PipelineError> {
        let globals: Vec<Arc<dyn StageDefinition>> = self.plan.global_stages().cloned().collect();
        for stage in &globals {
            self.state = PipelineState::Stage(stage.phase());
            let ids = self.enumerate(stage.as_ref(), None)?;
            self.execute_stage(stage.as_ref(), None, ids)?;
        }

        let per_patch: Vec<Arc<dyn StageDefinition>> = self.plan.patch_stages().cloned().collect();
        if per_patch.is_empty() {
            return Ok(());
        }
        // El sky map existe sólo después de las etapas globales
        for tract in self.ctx.tracts.clone() {
            let patches = self.catalog.patches(tract)?;
            info!("patch_loop:tract {tract} patches={}", patches.len());
            for patch in &patches {
                let base = DataId::tract_patch(tract, patch);
                for stage in &per_patch {
                    self.state = PipelineState::Stage(stage.phase());
                    let ids = self.enumerate(stage.as_ref(), Some(&base))?;
                    self.execute_stage(stage.as_ref(), Some(&base), ids)?;
                }
            }
        }
        Ok(())
    }

    /// Identificadores de los work items de una etapa.
    fn enumerate(&self, stage: &dyn StageDefinition, base: Option<&DataId>) -> Result<Vec<DataId>, PipelineError> {
        let base = base.cloned().unwrap_or_default();
        match stage.phase().enumeration() {
            Enumeration::Single => Ok(vec![base]),
            Enumeration::VisitRafts => {
                let mut ids = Vec::new();
                for visit in self.catalog.visits()? {
                    for raft in self.catalog.rafts(*visit)? {
                        ids.push(DataId::visit_raft(*visit, &raft));
                    }
                }
                Ok(ids)
            }
            Enumeration::Filters => Ok(self.catalog
                                           .filters()?
                                           .iter()
                                           .map(|f| base.with_filter(f))
                                           .collect()),
        }
    }

    /// Materializa todas las invocaciones y sus destinos de log antes de
    /// enviar ninguna: un identificador inválido o un directorio de logs
    /// inaccesible abortan la etapa sin emitir `StageStarted`.
    fn prepare(&self, stage: &dyn StageDefinition, ids: Vec<DataId>) -> Result<Vec<Prepared>, PipelineError> {
        ids.into_iter()
           .map(|data_id| {
               let invocation = stage.build(&self.ctx.repo, &data_id)?;
               let label = stage.label(&data_id)?;
               let logs = self.ctx.logs.route(&label)?;
               Ok(Prepared { label,
                             data_id,
                             invocation,
                             logs })
           })
           .collect()
    }

    /// Una barrera: fan-out de todos los work items y fan-in en orden de envío.
    fn execute_stage(&mut self,
                     stage: &dyn StageDefinition,
                     scope: Option<&DataId>,
                     ids: Vec<DataId>)
                     -> Result<(), PipelineError> {
        let prepared = self.prepare(stage, ids)?;
        let execution = self.executions;
        self.executions += 1;
        let name = stage.name().to_string();
        let scope_label = scope.map(ToString::to_string).unwrap_or_default();

        self.emit(RunEventKind::StageStarted { execution,
                                               stage: name.clone(),
                                               phase: stage.phase(),
                                               scope: scope.cloned(),
                                               items: prepared.len() });
        if prepared.is_empty() {
            warn!("stage:empty {name} {scope_label}: nothing to run");
            self.complete_stage(execution, &name, scope, Vec::new());
            return Ok(());
        }
        info!("stage:start {name} {scope_label} items={}", prepared.len());

        let mut handles = Vec::with_capacity(prepared.len());
        for p in prepared {
            let data_id = p.data_id;
            let request = TaskRequest { label: p.label,
                                        invocation: p.invocation,
                                        logs: p.logs };
            let label = request.label.clone();
            debug!("task:submit {label}: {}", request.invocation);
            let handle = self.dispatcher.submit(request);
            self.emit(RunEventKind::TaskSubmitted { execution,
                                                    stage: name.clone(),
                                                    label: label.clone(),
                                                    data_id });
            handles.push((label, handle));
        }
        self.tasks += handles.len();

        let total = handles.len();
        let mut labels = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for (label, handle) in handles {
            match self.dispatcher.join(handle) {
                Ok(report) => {
                    debug!("task:joined {label} exit_code={}", report.exit_code);
                    self.emit(RunEventKind::TaskSucceeded { execution,
                                                            label: label.clone(),
                                                            exit_code: report.exit_code,
                                                            logs: report.logs });
                }
                Err(err) => {
                    self.emit(RunEventKind::TaskFailed { execution,
                                                         label: label.clone(),
                                                         error: err.clone() });
                    failures.push(err);
                }
            }
            labels.push(label);
        }

        if failures.is_empty() {
            self.complete_stage(execution, &name, scope, labels);
            return Ok(());
        }

        for f in &failures {
            warn!("stage:task_failed {name}: {f}");
        }
        self.emit(RunEventKind::StageFailed { execution,
                                              stage: name.clone(),
                                              failed: failures.len(),
                                              total });
        error!("stage:failed {name} {scope_label} failed={}/{total}", failures.len());
        Err(failures.swap_remove(0))
    }

    fn complete_stage(&mut self, execution: usize, name: &str, scope: Option<&DataId>, labels: Vec<String>) {
        let tasks = labels.len();
        self.emit(RunEventKind::StageCompleted { execution,
                                                 stage: name.to_string(),
                                                 tasks });
        self.records.push(json!({
            "execution": execution,
            "stage": name,
            "scope": scope.map(ToString::to_string),
            "labels": labels,
        }));
        info!("stage:completed {name} tasks={tasks}");
    }

    fn run_fingerprint(&self) -> String {
        hash_value(&json!({
            "engine_version": crate::constants::ENGINE_VERSION,
            "plan_hash": self.plan.plan_hash(),
            "stages": self.records,
        }))
    }

    fn emit(&mut self, kind: RunEventKind) -> RunEvent {
        self.event_store.append_kind(self.ctx.run_id, kind)
    }
}

impl<S, D, E> std::fmt::Debug for Orchestrator<S, D, E>
    where S: CatalogSource,
          D: TaskDispatcher,
          E: EventStore
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
         .field("run_id", &self.ctx.run_id)
         .field("state", &self.state)
         .field("plan", &self.plan)
         .field("executions", &self.executions)
         .finish()
    }
}
