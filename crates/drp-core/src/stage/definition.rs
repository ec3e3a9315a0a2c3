use drp_domain::{DataId, Dimension, RepoHandle};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::PipelineError;
use crate::model::CommandInvocation;

/// Alcance de una etapa: una vez por ejecución o una vez por patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageScope {
    Global,
    PerPatch,
}

/// Cómo se enumeran los work items de una etapa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Enumeration {
    /// Un único work item con identificador vacío.
    Single,
    /// Producto visitas × rafts(visita).
    VisitRafts,
    /// Un work item por filtro sobre el identificador base `{tract, patch}`.
    Filters,
}

/// Fases del pipeline, en el orden de dependencias.
///
/// `Ingest → PerExposureProcessing → SkyMapBuild → PatchLoop(CoaddTempExp →
/// AssembleCoadd → DetectSources → MergeDetections → MeasureSources →
/// MergeMeasurements)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StagePhase {
    Ingest,
    PerExposureProcessing,
    SkyMapBuild,
    CoaddTempExp,
    AssembleCoadd,
    DetectSources,
    MergeDetections,
    MeasureSources,
    MergeMeasurements,
}

impl StagePhase {
    pub fn scope(&self) -> StageScope {
        match self {
            StagePhase::Ingest | StagePhase::PerExposureProcessing | StagePhase::SkyMapBuild => StageScope::Global,
            _ => StageScope::PerPatch,
        }
    }

    pub fn enumeration(&self) -> Enumeration {
        match self {
            StagePhase::Ingest | StagePhase::SkyMapBuild => Enumeration::Single,
            StagePhase::PerExposureProcessing => Enumeration::VisitRafts,
            _ => Enumeration::Filters,
        }
    }
}

/// Trait que define una etapa. `build` debe ser puro: mismas entradas,
/// misma invocación, sin tocar disco ni red.
pub trait StageDefinition: Send + Sync {
    /// Nombre de la tarea (`processEimage`, ...). Único dentro del plan.
    fn name(&self) -> &str;

    /// Fase que ocupa en la topología del pipeline.
    fn phase(&self) -> StagePhase;

    /// Dimensiones requeridas, en el orden en que se serializan.
    fn dimensions(&self) -> &[Dimension];

    /// Materializa la invocación para un identificador.
    fn build(&self, repo: &RepoHandle, data_id: &DataId) -> Result<CommandInvocation, PipelineError>;

    /// Descripción estable de la plantilla de comando (entra en el hash del plan).
    fn template(&self) -> Value;

    /// Etiqueta del work item: `<task>` o `<task>_<sufijo>`.
    fn label(&self, data_id: &DataId) -> Result<String, PipelineError> {
        let suffix = data_id.suffix(self.dimensions())
                            .map_err(|e| PipelineError::from_domain(self.name(), e))?;
        if suffix.is_empty() {
            Ok(self.name().to_string())
        } else {
            Ok(format!("{}_{}", self.name(), suffix))
        }
    }
}
