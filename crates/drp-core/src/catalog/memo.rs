use dashmap::DashMap;
use log::debug;
use once_cell::sync::OnceCell;

use drp_domain::{FilterId, PatchId, RaftId, TractId, VisitId};

use super::CatalogSource;
use crate::errors::PipelineError;

/// Catálogo memoizado: cada consulta llega a la fuente como mucho una vez
/// con éxito por ejecución.
///
/// - visitas y filtros: `OnceCell` (una única inicialización aunque haya
///   accesos concurrentes);
/// - rafts por visita y patches por tract: `DashMap`, inicializando la
///   entrada bajo el lock de su shard.
///
/// Los errores no se memoizan.
pub struct Catalog<S: CatalogSource> {
    source: S,
    visits: OnceCell<Vec<VisitId>>,
    filters: OnceCell<Vec<FilterId>>,
    rafts: DashMap<VisitId, Vec<RaftId>>,
    patches: DashMap<TractId, Vec<PatchId>>,
}

impl<S: CatalogSource> Catalog<S> {
    pub fn new(source: S) -> Self {
        Self { source,
               visits: OnceCell::new(),
               filters: OnceCell::new(),
               rafts: DashMap::new(),
               patches: DashMap::new() }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn visits(&self) -> Result<&[VisitId], PipelineError> {
        self.visits
            .get_or_try_init(|| {
                debug!("catalog:visits query");
                self.source.visits()
            })
            .map(Vec::as_slice)
    }

    pub fn filters(&self) -> Result<&[FilterId], PipelineError> {
        self.filters
            .get_or_try_init(|| {
                debug!("catalog:filters query");
                self.source.filters()
            })
            .map(Vec::as_slice)
    }

    pub fn rafts(&self, visit: VisitId) -> Result<Vec<RaftId>, PipelineError> {
        let entry = self.rafts.entry(visit).or_try_insert_with(|| {
                                                 debug!("catalog:rafts query visit={visit}");
                                                 self.source.rafts(visit)
                                             })?;
        Ok(entry.value().clone())
    }

    pub fn patches(&self, tract: TractId) -> Result<Vec<PatchId>, PipelineError> {
        let entry = self.patches.entry(tract).or_try_insert_with(|| {
                                                 debug!("catalog:patches query tract={tract}");
                                                 self.source.patches(tract)
                                             })?;
        Ok(entry.value().clone())
    }
}
