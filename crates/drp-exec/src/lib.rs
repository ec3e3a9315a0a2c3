//! drp-exec: dispatcher de tareas sobre un runtime tokio.
//!
//! `WorkerPool` implementa `drp_core::TaskDispatcher`; el lanzamiento real de
//! procesos queda detrás de `CommandRunner` para poder sustituirlo en dry
//! runs y tests.
pub mod pool;
pub mod runner;

pub use pool::{TaskHandle, WorkerPool, DEFAULT_WORKERS};
pub use runner::{CommandRunner, DryRunRunner, ProcessRunner};
