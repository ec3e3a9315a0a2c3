use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use drp_core::{CommandInvocation, LogDestination, PipelineError, TaskDispatcher, TaskRequest};
use drp_exec::{CommandRunner, ProcessRunner, WorkerPool};

fn sh(label: &str, script: &str, logs: LogDestination) -> TaskRequest {
    TaskRequest { label: label.into(),
                  invocation: CommandInvocation::new("sh").arg("-c").arg(script),
                  logs }
}

#[cfg(unix)]
#[test]
fn zero_exit_code_is_success() {
    let pool = WorkerPool::new(1, ProcessRunner).unwrap();
    let handle = pool.submit(sh("ok", "exit 0", LogDestination::discard()));
    let report = pool.join(handle).unwrap();
    assert_eq!(report.label, "ok");
    assert_eq!(report.exit_code, 0);
}

#[cfg(unix)]
#[test]
fn non_zero_exit_code_is_execution_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let log = tmp.path().join("bad.log");
    let pool = WorkerPool::new(2, ProcessRunner).unwrap();
    let handle = pool.submit(sh("bad", "exit 7", LogDestination::combined(log.clone())));
    let err = pool.join(handle).unwrap_err();
    assert_eq!(err,
               PipelineError::TaskExecutionFailure { label: "bad".into(),
                                                     exit_code: Some(7),
                                                     stdout: Some(log.clone()),
                                                     stderr: Some(log) });
}

#[test]
fn missing_program_is_launch_failure() {
    let pool = WorkerPool::new(1, ProcessRunner).unwrap();
    let request = TaskRequest { label: "ghost".into(),
                                invocation: CommandInvocation::new("no-such-tool-drp.py"),
                                logs: LogDestination::discard() };
    let err = pool.join(pool.submit(request)).unwrap_err();
    assert!(matches!(err, PipelineError::TaskLaunchFailure { ref label, .. } if label == "ghost"));
}

#[cfg(unix)]
#[test]
fn combined_log_captures_both_streams() {
    let tmp = tempfile::tempdir().unwrap();
    let log = tmp.path().join("both.log");
    let pool = WorkerPool::new(1, ProcessRunner).unwrap();
    let handle = pool.submit(sh("both", "echo out; echo err 1>&2", LogDestination::combined(log.clone())));
    pool.join(handle).unwrap();
    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("out"));
    assert!(text.contains("err"));
}

#[cfg(unix)]
#[test]
fn separate_logs_split_streams() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("t.out.log");
    let err = tmp.path().join("t.err.log");
    let pool = WorkerPool::new(1, ProcessRunner).unwrap();
    let logs = LogDestination { stdout: Some(out.clone()),
                                stderr: Some(err.clone()) };
    pool.join(pool.submit(sh("t", "echo visible; echo hidden 1>&2", logs))).unwrap();
    assert_eq!(std::fs::read_to_string(out).unwrap().trim(), "visible");
    assert_eq!(std::fs::read_to_string(err).unwrap().trim(), "hidden");
}

/// Runner que mide la concurrencia máxima observada.
#[derive(Default)]
struct GaugeRunner {
    running: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl CommandRunner for GaugeRunner {
    async fn run(&self, _request: &TaskRequest) -> Result<Option<i32>, PipelineError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(Some(0))
    }
}

#[test]
fn concurrency_never_exceeds_permits() {
    let pool = WorkerPool::new(2, GaugeRunner::default()).unwrap();
    let handles: Vec<_> = (0..8).map(|i| pool.submit(TaskRequest { label: format!("t{i}"),
                                                                   invocation: CommandInvocation::new("noop"),
                                                                   logs: LogDestination::discard() }))
                                .collect();
    for h in handles {
        pool.join(h).unwrap();
    }
    let peak = pool.runner().peak.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 2, "peak {peak}");
    assert_eq!(pool.available_permits(), 2);
}

#[test]
fn zero_workers_is_rejected() {
    assert!(matches!(WorkerPool::new(0, ProcessRunner), Err(PipelineError::Internal(_))));
}
