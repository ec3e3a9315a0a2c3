//! Cableado de una ejecución completa: bootstrap, plan, catálogo, pool y
//! orquestador.

use drp_adapters::{bootstrap_repo, standard_plan};
use drp_core::{CatalogSource, EventStore, InMemoryEventStore, LogRouter, Orchestrator, PipelineError, RunSummary,
               StagePlan, TaskDispatcher};
use drp_domain::{RepoHandle, TractId};
use drp_exec::{CommandRunner, DryRunRunner, ProcessRunner, WorkerPool};
use drp_persistence::{JsonlEventStore, RepoCatalogSource};
use log::{info, warn};

use crate::config::PipelineConfig;
use crate::error::AppError;

/// Ejecuta el plan con las piezas dadas y devuelve el resumen.
pub fn execute<S, D, E>(source: S,
                        dispatcher: D,
                        event_store: E,
                        plan: StagePlan,
                        repo: RepoHandle,
                        logs: LogRouter,
                        tracts: Vec<TractId>)
                        -> Result<RunSummary, PipelineError>
    where S: CatalogSource,
          D: TaskDispatcher,
          E: EventStore
{
    orchestrator(source, dispatcher, event_store, plan, repo, logs, tracts).run()
}

fn orchestrator<S, D, E>(source: S,
                         dispatcher: D,
                         event_store: E,
                         plan: StagePlan,
                         repo: RepoHandle,
                         logs: LogRouter,
                         tracts: Vec<TractId>)
                         -> Orchestrator<S, D, E>
    where S: CatalogSource,
          D: TaskDispatcher,
          E: EventStore
{
    Orchestrator::<S, D, E>::builder(source, dispatcher).plan(plan)
                                             .event_store(event_store)
                                             .tracts(tracts)
                                             .build(repo, logs)
}

/// Avisa si el fichero de eventos quedó incompleto. Devuelve los eventos
/// que no llegaron a disco.
pub fn report_event_log(store: &JsonlEventStore) -> usize {
    let missing = store.write_errors();
    if missing > 0 {
        warn!("pipeline:event_log incomplete path={} missing_events={missing}",
              store.path().display());
    }
    missing
}

/// Ejecución completa a partir de la configuración.
///
/// Con `dry_run` las invocaciones sólo se registran en el log; el catálogo se
/// sigue leyendo del repositorio.
pub fn run_pipeline(cfg: &PipelineConfig, dry_run: bool) -> Result<RunSummary, AppError> {
    cfg.validate()?;
    let ref_cats = cfg.require_ref_cats()?;
    let repo = bootstrap_repo(&cfg.output_repo, ref_cats, &cfg.mapper)?;
    let plan = standard_plan(&cfg.eimage_pattern, &cfg.config_dir)?;
    info!("pipeline:plan stages={} hash={}", plan.len(), plan.plan_hash());

    let source = RepoCatalogSource::for_repo(&repo, cfg.skymap.clone());
    let runner: Box<dyn CommandRunner> = if dry_run {
        Box::new(DryRunRunner)
    } else {
        Box::new(ProcessRunner)
    };
    let pool = WorkerPool::new(cfg.workers, runner)?;
    let logs = LogRouter::new(&cfg.log_dir, cfg.log_mode);
    let tracts = cfg.tracts.clone();

    let summary = match &cfg.events {
        Some(path) => {
            let store = JsonlEventStore::open(path)?;
            let mut orch = orchestrator(source, pool, store, plan, repo, logs, tracts);
            let result = orch.run();
            report_event_log(orch.event_store());
            result?
        }
        None => execute(source, pool, InMemoryEventStore::default(), plan, repo, logs, tracts)?,
    };
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drp_core::RunEventKind;
    use uuid::Uuid;

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_event_writes_are_reported() {
        // /dev/full rechaza toda escritura con ENOSPC
        let mut store = JsonlEventStore::open("/dev/full").unwrap();
        let run_id = Uuid::new_v4();
        store.append_kind(run_id, RunEventKind::RunAborted { error: PipelineError::Internal("x".into()) });
        store.append_kind(run_id, RunEventKind::RunAborted { error: PipelineError::Internal("y".into()) });

        assert_eq!(report_event_log(&store), 2);
        assert_eq!(store.list(run_id).len(), 2);
    }

    #[test]
    fn complete_event_log_reports_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = JsonlEventStore::open(tmp.path().join("events.jsonl")).unwrap();
        store.append_kind(Uuid::new_v4(), RunEventKind::RunAborted { error: PipelineError::Internal("x".into()) });
        assert_eq!(report_event_log(&store), 0);
    }
}
