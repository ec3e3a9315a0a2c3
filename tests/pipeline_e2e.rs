use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use drp_adapters::standard_plan;
use drp_core::{InMemoryCatalogSource, LogMode, LogRouter, PipelineError, RunEventKind, TaskRequest};
use drp_domain::{RepoHandle, TractId};
use drp_exec::{CommandRunner, WorkerPool};
use drp_persistence::{read_events, JsonlEventStore};
use drpflow::{execute, run_pipeline, AppError, PipelineConfig};

/// Runner que registra el intervalo de cada work item.
#[derive(Default)]
struct TimelineRunner {
    spans: Mutex<Vec<(String, Instant, Instant)>>,
    failing: HashSet<String>,
}

#[async_trait]
impl CommandRunner for TimelineRunner {
    async fn run(&self, request: &TaskRequest) -> Result<Option<i32>, PipelineError> {
        let start = Instant::now();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let end = Instant::now();
        self.spans.lock().unwrap().push((request.label.clone(), start, end));
        if self.failing.contains(&request.label) {
            return Ok(Some(1));
        }
        Ok(Some(0))
    }
}

fn source() -> InMemoryCatalogSource {
    InMemoryCatalogSource::new().with_visit(1, ["R1", "R2"])
                                .with_visit(2, ["R3"])
                                .with_filters(["g", "r", "i"])
                                .with_patch_grid(0, 2, 1)
}

/// Prefijo de etapa + patch de una etiqueta (`makeCoaddTempExp_0_1,0_g` -> `makeCoaddTempExp_0_1,0`).
fn barrier_key(label: &str) -> String {
    let parts: Vec<&str> = label.split('_').collect();
    if parts.len() == 4 {
        parts[..3].join("_")
    } else {
        parts[0].to_string()
    }
}

#[test]
fn worker_pool_respects_stage_barrier() {
    let tmp = tempfile::tempdir().unwrap();
    let pool = WorkerPool::new(3, TimelineRunner::default()).unwrap();
    let plan = standard_plan("imgs/*.fits", "configs").unwrap();
    let events_path = tmp.path().join("events.jsonl");
    let store = JsonlEventStore::open(&events_path).unwrap();

    let repo = RepoHandle::new(tmp.path().join("output"), "/refs", "m");
    let logs = LogRouter::new(tmp.path().join("logs"), LogMode::Disabled);
    let summary = execute(source(), &pool, store, plan, repo, logs, vec![TractId(0)]).unwrap();
    assert_eq!(summary.tasks, 1 + 3 + 1 + 6 * 6);

    let spans = pool.runner().spans.lock().unwrap().clone();
    assert_eq!(spans.len(), summary.tasks);

    // Agrupa por barrera en orden de aparición
    let mut groups: Vec<(String, Instant, Instant)> = Vec::new();
    let events = read_events(&events_path).unwrap();
    for e in &events {
        if let RunEventKind::TaskSubmitted { label, .. } = &e.kind {
            let key = barrier_key(label);
            let (_, start, end) = spans.iter().find(|(l, _, _)| l == label).cloned().unwrap();
            match groups.last_mut() {
                Some((k, first_start, last_end)) if *k == key => {
                    *first_start = (*first_start).min(start);
                    *last_end = (*last_end).max(end);
                }
                _ => groups.push((key, start, end)),
            }
        }
    }
    assert_eq!(groups.len(), 3 + 2 * 6);
    for pair in groups.windows(2) {
        assert!(pair[1].1 >= pair[0].2, "{} started before {} finished", pair[1].0, pair[0].0);
    }
}

#[test]
fn failing_item_stops_the_run() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = TimelineRunner { failing: HashSet::from(["processEimage_2_R3".to_string()]),
                                  ..Default::default() };
    let pool = WorkerPool::new(2, runner).unwrap();
    let plan = standard_plan("imgs/*.fits", "configs").unwrap();
    let repo = RepoHandle::new(tmp.path().join("output"), "/refs", "m");
    let logs = LogRouter::new(tmp.path().join("logs"), LogMode::Combined);

    let err = execute(source(), &pool, drp_core::InMemoryEventStore::default(), plan, repo, logs, vec![TractId(0)])
        .unwrap_err();
    match err {
        PipelineError::TaskExecutionFailure { label, exit_code, stdout, .. } => {
            assert_eq!(label, "processEimage_2_R3");
            assert_eq!(exit_code, Some(1));
            assert_eq!(stdout, Some(tmp.path().join("logs").join("processEimage_2_R3.log")));
        }
        other => panic!("unexpected {other:?}"),
    }
    let labels: Vec<String> = pool.runner().spans.lock().unwrap().iter().map(|(l, _, _)| l.clone()).collect();
    assert_eq!(labels.len(), 4);
    assert!(!labels.iter().any(|l| l.starts_with("makeDiscreteSkyMap")));
}

#[test]
fn missing_ref_cats_is_configuration_error() {
    let cfg = PipelineConfig::default();
    let err = run_pipeline(&cfg, true).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
    assert_eq!(err.exit_code(), 2);
}

#[cfg(unix)]
#[test]
fn dry_run_bootstraps_then_stops_without_registry() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = PipelineConfig { output_repo: tmp.path().join("output"),
                               ref_cats: Some(tmp.path().join("refs")),
                               log_dir: tmp.path().join("logs"),
                               events: Some(tmp.path().join("events.jsonl")),
                               ..PipelineConfig::default() };
    let err = run_pipeline(&cfg, true).unwrap_err();
    assert!(matches!(err, AppError::Pipeline(PipelineError::CatalogUnavailable(_))));
    assert_eq!(err.exit_code(), 1);

    assert!(tmp.path().join("output").join("_mapper").is_file());
    let events = read_events(&tmp.path().join("events.jsonl")).unwrap();
    assert!(events.iter().any(|e| matches!(&e.kind,
                                           RunEventKind::StageCompleted { stage, .. } if stage == "ingestSimImages")));
    assert!(matches!(events.last().map(|e| &e.kind), Some(RunEventKind::RunAborted { .. })));
}
