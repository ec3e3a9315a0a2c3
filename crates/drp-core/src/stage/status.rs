/// Estado de una ejecución de etapa.
///
/// Las transiciones válidas son:
/// - `Running` -> `Completed`
/// - `Running` -> `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Work items enviados, barrera pendiente.
    Running,
    /// Todos los work items terminaron con código 0.
    Completed,
    /// Al menos un work item falló; la ejecución se abortó.
    Failed,
}
