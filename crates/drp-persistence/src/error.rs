//! Errores de persistencia.
//! En la frontera con el core todos se reducen a `CatalogUnavailable`.

use std::path::PathBuf;

use diesel::result::Error as DieselError;
use drp_core::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("registry not found at {0}")]
    MissingRegistry(PathBuf),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("query error: {0}")]
    Query(String),
    /// `makeDiscreteSkyMap` no exporta la geometría: la aporta el operador.
    #[error("sky map geometry not found at {0}; makeDiscreteSkyMap does not write it, \
             provide the file there or point --skymap / DRP_SKYMAP at it")]
    MissingSkyMap(PathBuf),
    #[error("tract {0} not in sky map")]
    UnknownTract(u32),
    #[error("io: {0}")]
    Io(String),
    #[error("json: {0}")]
    Json(String),
}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        Self::Query(err.to_string())
    }
}

impl From<r2d2::Error> for PersistenceError {
    fn from(err: r2d2::Error) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<PersistenceError> for PipelineError {
    fn from(err: PersistenceError) -> Self {
        PipelineError::CatalogUnavailable(err.to_string())
    }
}
