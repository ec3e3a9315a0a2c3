//! drp-core: orquestador determinista de etapas del pipeline DRP.
//!
//! Define la taxonomía de errores, las etapas y el plan, el catálogo
//! memoizado, el router de logs, el contrato del dispatcher, los eventos de
//! la ejecución y el `Orchestrator` que los une con barreras por etapa.
pub mod catalog;
pub mod constants;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod logs;
pub mod model;
pub mod repo;
pub mod stage;

pub use catalog::{Catalog, CatalogSource, InMemoryCatalogSource};
pub use dispatch::TaskDispatcher;
pub use engine::{Orchestrator, OrchestratorBuilder, OrchestratorBuilderInit, PipelineState, RunContext, RunSummary};
pub use errors::PipelineError;
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use logs::{LogMode, LogRouter};
pub use model::{CommandInvocation, LogDestination, TaskReport, TaskRequest};
pub use repo::{InMemoryRunRepository, RunInstance, RunRepository, StageExecution};
pub use stage::{Enumeration, StageDefinition, StagePhase, StagePlan, StageScope, StageStatus};
