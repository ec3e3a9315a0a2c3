use std::path::PathBuf;

use drp_core::{CatalogSource, PipelineError};
use drp_domain::{FilterId, PatchId, RaftId, RepoHandle, TractId, VisitId};

use crate::registry::SqliteRegistry;
use crate::skymap::SkyMapFile;

/// `CatalogSource` sobre el repositorio de salida: registro SQLite para
/// visitas, rafts y filtros; geometría del sky map para los patches.
#[derive(Debug)]
pub struct RepoCatalogSource {
    registry: SqliteRegistry,
    skymap: SkyMapFile,
}

impl RepoCatalogSource {
    pub fn new(registry: SqliteRegistry, skymap: SkyMapFile) -> Self {
        Self { registry, skymap }
    }

    /// Rutas por defecto dentro del repo; `skymap` las sustituye si se indica.
    pub fn for_repo(repo: &RepoHandle, skymap: Option<PathBuf>) -> Self {
        Self::new(SqliteRegistry::new(repo.registry_path()),
                  SkyMapFile::new(skymap.unwrap_or_else(|| repo.skymap_path())))
    }

    pub fn registry(&self) -> &SqliteRegistry {
        &self.registry
    }

    pub fn skymap(&self) -> &SkyMapFile {
        &self.skymap
    }
}

impl CatalogSource for RepoCatalogSource {
    fn visits(&self) -> Result<Vec<VisitId>, PipelineError> {
        Ok(self.registry.visits()?.into_iter().map(VisitId).collect())
    }

    fn rafts(&self, visit: VisitId) -> Result<Vec<RaftId>, PipelineError> {
        Ok(self.registry.rafts(visit.0)?.into_iter().map(RaftId).collect())
    }

    fn filters(&self) -> Result<Vec<FilterId>, PipelineError> {
        Ok(self.registry.filters()?.into_iter().map(FilterId).collect())
    }

    fn patches(&self, tract: TractId) -> Result<Vec<PatchId>, PipelineError> {
        Ok(self.skymap.patches(tract)?)
    }
}
