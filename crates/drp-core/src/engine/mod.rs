//! Orquestador de etapas: núcleo, builder y contexto de ejecución.

pub mod builder;
pub mod core;
pub mod run_ctx;

pub use builder::{OrchestratorBuilder, OrchestratorBuilderInit};
pub use self::core::{Orchestrator, PipelineState, RunSummary};
pub use run_ctx::RunContext;

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use drp_domain::{DataId, Dimension, RepoHandle};
    use serde_json::{json, Value};

    use super::*;
    use crate::catalog::InMemoryCatalogSource;
    use crate::dispatch::TaskDispatcher;
    use crate::errors::PipelineError;
    use crate::event::RunEventKind;
    use crate::logs::{LogMode, LogRouter};
    use crate::model::{CommandInvocation, TaskReport, TaskRequest};
    use crate::stage::{StageDefinition, StagePhase, StagePlan};

    struct ToyStage {
        name: &'static str,
        phase: StagePhase,
        dims: Vec<Dimension>,
    }

    impl StageDefinition for ToyStage {
        fn name(&self) -> &str {
            self.name
        }
        fn phase(&self) -> StagePhase {
            self.phase
        }
        fn dimensions(&self) -> &[Dimension] {
            &self.dims
        }
        fn build(&self, _repo: &RepoHandle, data_id: &DataId) -> Result<CommandInvocation, PipelineError> {
            let tokens = data_id.tokens(&self.dims).map_err(|e| PipelineError::from_domain(self.name, e))?;
            Ok(CommandInvocation::new(self.name).args(tokens))
        }
        fn template(&self) -> Value {
            json!({ "program": self.name })
        }
    }

    #[derive(Default)]
    struct Recorder {
        log: Mutex<Vec<String>>,
        failing: HashSet<String>,
    }

    impl TaskDispatcher for Recorder {
        type Handle = TaskRequest;

        fn submit(&self, request: TaskRequest) -> TaskRequest {
            self.log.lock().unwrap().push(format!("submit {}", request.label));
            request
        }

        fn join(&self, handle: TaskRequest) -> Result<TaskReport, PipelineError> {
            self.log.lock().unwrap().push(format!("join {}", handle.label));
            if self.failing.contains(&handle.label) {
                return Err(PipelineError::TaskExecutionFailure { label: handle.label,
                                                                 exit_code: Some(1),
                                                                 stdout: handle.logs.stdout,
                                                                 stderr: handle.logs.stderr });
            }
            Ok(TaskReport { label: handle.label,
                            exit_code: 0,
                            logs: handle.logs })
        }
    }

    fn toy_plan() -> StagePlan {
        StagePlan::new(vec![Arc::new(ToyStage { name: "ingest",
                                                phase: StagePhase::Ingest,
                                                dims: vec![] }),
                            Arc::new(ToyStage { name: "calexp",
                                                phase: StagePhase::PerExposureProcessing,
                                                dims: vec![Dimension::Visit, Dimension::Raft] }),
                            Arc::new(ToyStage { name: "warp",
                                                phase: StagePhase::CoaddTempExp,
                                                dims: vec![Dimension::Tract, Dimension::Patch, Dimension::Filter] })]).unwrap()
    }

    fn source() -> InMemoryCatalogSource {
        InMemoryCatalogSource::new().with_visit(1, ["R1"])
                                    .with_filters(["g"])
                                    .with_patch_grid(0, 1, 1)
    }

    #[test]
    fn runs_plan_and_reaches_done() {
        let tmp = tempfile::tempdir().unwrap();
        let mut orch = Orchestrator::<_, _, crate::event::InMemoryEventStore>::builder(source(), Recorder::default()).plan(toy_plan())
                                                                           .build(RepoHandle::new(tmp.path(), "/refs", "m"),
                                                                                  LogRouter::new(tmp.path().join("logs"), LogMode::Disabled));
        assert_eq!(orch.state(), PipelineState::Pending);
        let summary = orch.run().unwrap();
        assert_eq!(orch.state(), PipelineState::Done);
        assert_eq!(summary.stage_executions, 3);
        assert_eq!(summary.tasks, 3);

        let log = orch.dispatcher().log.lock().unwrap().clone();
        assert_eq!(log,
                   vec!["submit ingest",
                        "join ingest",
                        "submit calexp_1_R1",
                        "join calexp_1_R1",
                        "submit warp_0_0,0_g",
                        "join warp_0_0,0_g"]);
    }

    #[test]
    fn run_cannot_be_repeated() {
        let tmp = tempfile::tempdir().unwrap();
        let mut orch = Orchestrator::<_, _, crate::event::InMemoryEventStore>::builder(source(), Recorder::default()).plan(toy_plan())
                                                                           .build(RepoHandle::new(tmp.path(), "/refs", "m"),
                                                                                  LogRouter::new(tmp.path(), LogMode::Disabled));
        orch.run().unwrap();
        assert!(matches!(orch.run(), Err(PipelineError::Internal(_))));
    }

    #[test]
    fn failure_aborts_and_is_recorded() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder { failing: HashSet::from(["calexp_1_R1".to_string()]),
                                  ..Default::default() };
        let mut orch = Orchestrator::<_, _, crate::event::InMemoryEventStore>::builder(source(), recorder).plan(toy_plan())
                                                                .build(RepoHandle::new(tmp.path(), "/refs", "m"),
                                                                       LogRouter::new(tmp.path(), LogMode::Combined));
        let err = orch.run().unwrap_err();
        assert!(matches!(&err, PipelineError::TaskExecutionFailure { label, .. } if label == "calexp_1_R1"));
        assert_eq!(orch.state(), PipelineState::Aborted);

        let kinds: Vec<_> = orch.events().into_iter().map(|e| e.kind).collect();
        assert!(matches!(kinds.last(), Some(RunEventKind::RunAborted { .. })));
        assert!(kinds.iter().any(|k| matches!(k, RunEventKind::StageFailed { stage, failed: 1, total: 1, .. } if stage == "calexp")));
        // Nada del bucle de patches llegó a enviarse
        assert!(!orch.dispatcher().log.lock().unwrap().iter().any(|l| l.contains("warp")));

        let instance = orch.instance();
        assert!(!instance.completed);
        assert_eq!(instance.aborted, Some(err));
    }
}
