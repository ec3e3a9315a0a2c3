//! Modelos neutrales (CommandInvocation, LogDestination, TaskRequest,...)

pub mod invocation;
pub mod task;

pub use invocation::CommandInvocation;
pub use task::{LogDestination, TaskReport, TaskRequest};
