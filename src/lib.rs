//! drpflow: configuración, logging y cableado del pipeline DRP.
//!
//! El binario `drpflow` es una capa fina sobre `pipeline::run_pipeline`.
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use config::{ConfigError, PipelineConfig};
pub use error::AppError;
pub use pipeline::{execute, run_pipeline};
