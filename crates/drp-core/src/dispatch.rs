//! Contrato del dispatcher de tareas.
//!
//! La implementación real (pool acotado de workers sobre tokio) vive en
//! `drp-exec`; el orquestador sólo conoce este trait.

use crate::errors::PipelineError;
use crate::model::{TaskReport, TaskRequest};

pub trait TaskDispatcher {
    /// Handle de un work item en vuelo. Se consume en `join`.
    type Handle;

    /// Encola el work item y retorna de inmediato. Con el pool saturado se
    /// encola, nunca falla.
    fn submit(&self, request: TaskRequest) -> Self::Handle;

    /// Bloquea hasta que el proceso termine.
    ///
    /// Errores: `TaskExecutionFailure` (código distinto de 0) o
    /// `TaskLaunchFailure` (no se pudo arrancar).
    fn join(&self, handle: Self::Handle) -> Result<TaskReport, PipelineError>;
}

impl<D: TaskDispatcher + ?Sized> TaskDispatcher for &D {
    type Handle = D::Handle;

    fn submit(&self, request: TaskRequest) -> Self::Handle {
        (**self).submit(request)
    }

    fn join(&self, handle: Self::Handle) -> Result<TaskReport, PipelineError> {
        (**self).join(handle)
    }
}
