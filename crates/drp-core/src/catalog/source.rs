use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use drp_domain::{FilterId, PatchId, RaftId, TractId, VisitId};

use crate::errors::PipelineError;

/// Lecturas puras contra el registro externo.
///
/// Cualquier fallo se reporta como `PipelineError::CatalogUnavailable`.
pub trait CatalogSource: Send + Sync {
    fn visits(&self) -> Result<Vec<VisitId>, PipelineError>;
    fn rafts(&self, visit: VisitId) -> Result<Vec<RaftId>, PipelineError>;
    fn filters(&self) -> Result<Vec<FilterId>, PipelineError>;
    fn patches(&self, tract: TractId) -> Result<Vec<PatchId>, PipelineError>;
}

/// Fuente en memoria (tests, dry runs). Cuenta las consultas recibidas.
#[derive(Debug, Default)]
pub struct InMemoryCatalogSource {
    visits: Vec<(VisitId, Vec<RaftId>)>,
    filters: Vec<FilterId>,
    patches: BTreeMap<TractId, Vec<PatchId>>,
    unavailable: Option<String>,
    queries: AtomicUsize,
}

impl InMemoryCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visit<R: Into<RaftId>>(mut self, visit: i64, rafts: impl IntoIterator<Item = R>) -> Self {
        self.visits.push((VisitId(visit), rafts.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_filters<F: Into<FilterId>>(mut self, filters: impl IntoIterator<Item = F>) -> Self {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }

    /// Tract con una rejilla `nx × ny` de patches (x varía más rápido).
    pub fn with_patch_grid(mut self, tract: u32, nx: u32, ny: u32) -> Self {
        let patches = (0..ny).flat_map(|y| (0..nx).map(move |x| PatchId::from_index(x, y)))
                             .collect();
        self.patches.insert(TractId(tract), patches);
        self
    }

    /// Simula un registro inaccesible: toda consulta falla.
    pub fn unavailable(mut self, reason: impl Into<String>) -> Self {
        self.unavailable = Some(reason.into());
        self
    }

    /// Número total de consultas atendidas (incluidas las fallidas).
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), PipelineError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        match &self.unavailable {
            Some(reason) => Err(PipelineError::CatalogUnavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl CatalogSource for InMemoryCatalogSource {
    fn visits(&self) -> Result<Vec<VisitId>, PipelineError> {
        self.check()?;
        Ok(self.visits.iter().map(|(v, _)| *v).collect())
    }

    fn rafts(&self, visit: VisitId) -> Result<Vec<RaftId>, PipelineError> {
        self.check()?;
        Ok(self.visits
               .iter()
               .find(|(v, _)| *v == visit)
               .map(|(_, rafts)| rafts.clone())
               .unwrap_or_default())
    }

    fn filters(&self) -> Result<Vec<FilterId>, PipelineError> {
        self.check()?;
        Ok(self.filters.clone())
    }

    fn patches(&self, tract: TractId) -> Result<Vec<PatchId>, PipelineError> {
        self.check()?;
        self.patches
            .get(&tract)
            .cloned()
            .ok_or_else(|| PipelineError::CatalogUnavailable(format!("tract {tract} not in sky map")))
    }
}
