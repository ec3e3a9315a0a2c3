use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use super::{StageDefinition, StageScope};
use crate::errors::PipelineError;
use crate::hashing::hash_value;

/// Plan inmutable de etapas para una ejecución.
///
/// Invariantes comprobadas en `new`:
/// - no está vacío y los nombres son únicos;
/// - las fases aparecen en orden estrictamente creciente, de modo que las
///   etapas globales preceden al bucle de patches.
#[derive(Clone)]
pub struct StagePlan {
    stages: Vec<Arc<dyn StageDefinition>>,
    plan_hash: String,
}

impl StagePlan {
    pub fn new(stages: Vec<Arc<dyn StageDefinition>>) -> Result<Self, PipelineError> {
        if stages.is_empty() {
            return Err(PipelineError::Internal("stage plan is empty".into()));
        }
        let mut names = HashSet::new();
        for s in &stages {
            if !names.insert(s.name().to_string()) {
                return Err(PipelineError::Internal(format!("duplicate stage `{}` in plan", s.name())));
            }
        }
        for pair in stages.windows(2) {
            if pair[0].phase() >= pair[1].phase() {
                return Err(PipelineError::Internal(format!("stage `{}` ({:?}) cannot follow `{}` ({:?})",
                                                           pair[1].name(),
                                                           pair[1].phase(),
                                                           pair[0].name(),
                                                           pair[0].phase())));
            }
        }
        let plan_hash = Self::compute_hash(&stages);
        Ok(Self { stages, plan_hash })
    }

    fn compute_hash(stages: &[Arc<dyn StageDefinition>]) -> String {
        let described: Vec<_> = stages.iter()
                                      .map(|s| {
                                          json!({
                                              "name": s.name(),
                                              "phase": format!("{:?}", s.phase()),
                                              "dimensions": s.dimensions().iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                                              "template": s.template(),
                                          })
                                      })
                                      .collect();
        hash_value(&json!({
            "engine_version": crate::constants::ENGINE_VERSION,
            "stages": described,
        }))
    }

    pub fn stages(&self) -> &[Arc<dyn StageDefinition>] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn plan_hash(&self) -> &str {
        &self.plan_hash
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn StageDefinition>> {
        self.stages.iter().find(|s| s.name() == name)
    }

    /// Etapas globales, en orden.
    pub fn global_stages(&self) -> impl Iterator<Item = &Arc<dyn StageDefinition>> {
        self.stages.iter().filter(|s| s.phase().scope() == StageScope::Global)
    }

    /// Etapas del bucle de patches, en orden.
    pub fn patch_stages(&self) -> impl Iterator<Item = &Arc<dyn StageDefinition>> {
        self.stages.iter().filter(|s| s.phase().scope() == StageScope::PerPatch)
    }
}

impl std::fmt::Debug for StagePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagePlan")
         .field("stages", &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>())
         .field("plan_hash", &self.plan_hash)
         .finish()
    }
}
