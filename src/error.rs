use drp_core::PipelineError;
use drp_persistence::PersistenceError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errores del binario. Cada variante fija el código de salida.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl AppError {
    /// 2 para configuración inválida, 1 para fallos de la ejecución.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::Pipeline(_) | AppError::Persistence(_) => 1,
        }
    }
}
