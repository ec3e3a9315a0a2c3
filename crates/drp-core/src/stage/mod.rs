//! Definiciones relacionadas a etapas (stages).
//!
//! Una etapa es una herramienta externa que se ejecuta una vez por
//! identificador de datos. Este módulo define:
//! - `StageDefinition`: interfaz neutral usada por el orquestador.
//! - `StagePhase`: posición de la etapa en la topología fija del pipeline.
//! - `StagePlan`: lista ordenada e inmutable de etapas para una ejecución.
//! - `StageStatus`: estado de una ejecución de etapa al reconstruir eventos.

pub mod definition;
pub mod plan;
mod status;

pub use definition::{Enumeration, StageDefinition, StagePhase, StageScope};
pub use plan::StagePlan;
pub use status::StageStatus;
