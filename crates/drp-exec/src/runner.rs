use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use drp_core::{LogDestination, PipelineError, TaskRequest};
use log::{debug, info};
use tokio::process::Command;

/// Ejecuta la invocación de un work item.
///
/// Devuelve el código de salida (`None` si el proceso murió por señal). Sólo
/// los fallos de arranque son `Err` (`TaskLaunchFailure`); interpretar el
/// código es cosa del pool.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, request: &TaskRequest) -> Result<Option<i32>, PipelineError>;
}

#[async_trait]
impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    async fn run(&self, request: &TaskRequest) -> Result<Option<i32>, PipelineError> {
        (**self).run(request).await
    }
}

/// Lanza el proceso con `tokio::process`, sin shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, request: &TaskRequest) -> Result<Option<i32>, PipelineError> {
        let inv = &request.invocation;
        let launch_failure = |reason: String| PipelineError::TaskLaunchFailure { label: request.label.clone(),
                                                                                 program: inv.program.clone(),
                                                                                 reason,
                                                                                 stdout: request.logs.stdout.clone(),
                                                                                 stderr: request.logs.stderr.clone() };

        let (stdout, stderr) = open_streams(&request.logs).map_err(|e| launch_failure(format!("log file: {e}")))?;
        let mut child = Command::new(&inv.program).args(&inv.args)
                                                  .stdin(Stdio::null())
                                                  .stdout(stdout)
                                                  .stderr(stderr)
                                                  .spawn()
                                                  .map_err(|e| launch_failure(e.to_string()))?;
        debug!("runner:spawned {} pid={:?}", request.label, child.id());
        let status = child.wait().await.map_err(|e| launch_failure(e.to_string()))?;
        Ok(status.code())
    }
}

/// Flujos de salida del hijo. Con un único fichero para ambos se abre una vez
/// y se duplica el descriptor.
fn open_streams(logs: &LogDestination) -> io::Result<(Stdio, Stdio)> {
    match (&logs.stdout, &logs.stderr) {
        (Some(out), Some(err)) if out == err => {
            let file = File::create(out)?;
            let dup = file.try_clone()?;
            Ok((file.into(), dup.into()))
        }
        (out, err) => Ok((open_or_null(out)?, open_or_null(err)?)),
    }
}

fn open_or_null(path: &Option<PathBuf>) -> io::Result<Stdio> {
    match path {
        Some(p) => Ok(File::create(p)?.into()),
        None => Ok(Stdio::null()),
    }
}

/// No lanza nada: registra la invocación y reporta éxito.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, request: &TaskRequest) -> Result<Option<i32>, PipelineError> {
        info!("dry-run {}: {}", request.label, request.invocation);
        Ok(Some(0))
    }
}
