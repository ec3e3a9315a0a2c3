//! Pool acotado de workers.

use std::sync::Arc;

use drp_core::{LogDestination, PipelineError, TaskDispatcher, TaskReport, TaskRequest};
use log::debug;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::runner::CommandRunner;

/// Workers por defecto.
pub const DEFAULT_WORKERS: usize = 1;

/// Work item en vuelo. Se consume en `join`.
#[derive(Debug)]
pub struct TaskHandle {
    label: String,
    inner: JoinHandle<Result<TaskReport, PipelineError>>,
}

impl TaskHandle {
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Dispatcher sobre un runtime tokio propio.
///
/// Cada `submit` lanza una tarea que adquiere su permiso dentro del propio
/// task, así que `submit` nunca espera: con el pool saturado las tareas
/// quedan encoladas en el semáforo. Como mucho `workers` procesos corren a
/// la vez. El runtime se destruye con el pool.
pub struct WorkerPool<R: CommandRunner + 'static> {
    runtime: Runtime,
    permits: Arc<Semaphore>,
    workers: usize,
    runner: Arc<R>,
}

impl<R: CommandRunner + 'static> WorkerPool<R> {
    pub fn new(workers: usize, runner: R) -> Result<Self, PipelineError> {
        if workers == 0 {
            return Err(PipelineError::Internal("worker pool needs at least one worker".into()));
        }
        let runtime = Builder::new_multi_thread().worker_threads(workers)
                                                 .thread_name("drp-worker")
                                                 .enable_all()
                                                 .build()?;
        debug!("pool:start workers={workers}");
        Ok(Self { runtime,
                  permits: Arc::new(Semaphore::new(workers)),
                  workers,
                  runner: Arc::new(runner) })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Permisos libres en este instante.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner + 'static> TaskDispatcher for WorkerPool<R> {
    type Handle = TaskHandle;

    fn submit(&self, request: TaskRequest) -> TaskHandle {
        let permits = Arc::clone(&self.permits);
        let runner = Arc::clone(&self.runner);
        let label = request.label.clone();
        let inner = self.runtime.spawn(async move {
                                    let _permit = permits.acquire_owned()
                                                         .await
                                                         .map_err(|e| PipelineError::Internal(format!("worker pool closed: {e}")))?;
                                    debug!("pool:run {}", request.label);
                                    let code = runner.run(&request).await?;
                                    into_report(request, code)
                                });
        TaskHandle { label, inner }
    }

    fn join(&self, handle: TaskHandle) -> Result<TaskReport, PipelineError> {
        match self.runtime.block_on(handle.inner) {
            Ok(result) => result,
            Err(e) => Err(PipelineError::Internal(format!("worker for {} failed: {e}", handle.label))),
        }
    }
}

fn into_report(request: TaskRequest, code: Option<i32>) -> Result<TaskReport, PipelineError> {
    let TaskRequest { label, logs, .. } = request;
    match code {
        Some(0) => Ok(TaskReport { label,
                                   exit_code: 0,
                                   logs }),
        exit_code => {
            let LogDestination { stdout, stderr } = logs;
            Err(PipelineError::TaskExecutionFailure { label,
                                                      exit_code,
                                                      stdout,
                                                      stderr })
        }
    }
}

impl<R: CommandRunner + 'static> std::fmt::Debug for WorkerPool<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
         .field("workers", &self.workers)
         .field("available_permits", &self.permits.available_permits())
         .finish()
    }
}
