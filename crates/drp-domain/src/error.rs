use thiserror::Error;

use crate::Dimension;

/// Errores del dominio de identificadores de datos.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("missing dimension `{0}`")]
    MissingDimension(Dimension),
    #[error("unknown dimension `{0}`")]
    UnknownDimension(String),
    #[error("invalid patch id `{0}` (expected `x,y`)")]
    InvalidPatchId(String),
}
