//! Geometría del sky map: tracts y su rejilla de patches.
//!
//! ```json
//! {"tracts": [{"id": 0, "num_patches": [7, 7]}]}
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use drp_domain::{PatchId, TractId};
use log::debug;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TractGeometry {
    pub id: u32,
    /// `[nx, ny]`
    pub num_patches: [u32; 2],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkyMapGeometry {
    pub tracts: Vec<TractGeometry>,
}

impl SkyMapGeometry {
    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
                                               ErrorKind::NotFound => PersistenceError::MissingSkyMap(path.to_path_buf()),
                                               _ => PersistenceError::Io(format!("{}: {e}", path.display())),
                                           })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Patches del tract en orden de filas (`x` varía más rápido).
    pub fn patches(&self, tract: TractId) -> Result<Vec<PatchId>, PersistenceError> {
        let geom = self.tracts
                       .iter()
                       .find(|t| t.id == tract.0)
                       .ok_or(PersistenceError::UnknownTract(tract.0))?;
        let [nx, ny] = geom.num_patches;
        Ok((0..ny).flat_map(|y| (0..nx).map(move |x| PatchId::from_index(x, y)))
                  .collect())
    }
}

/// Fichero de geometría, leído la primera vez que se consulta.
#[derive(Debug)]
pub struct SkyMapFile {
    path: PathBuf,
    geometry: OnceCell<SkyMapGeometry>,
}

impl SkyMapFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(),
               geometry: OnceCell::new() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn geometry(&self) -> Result<&SkyMapGeometry, PersistenceError> {
        self.geometry.get_or_try_init(|| {
                         debug!("skymap:load {}", self.path.display());
                         SkyMapGeometry::load(&self.path)
                     })
    }

    pub fn patches(&self, tract: TractId) -> Result<Vec<PatchId>, PersistenceError> {
        self.geometry()?.patches(tract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patches_are_row_major() {
        let geom = SkyMapGeometry { tracts: vec![TractGeometry { id: 3,
                                                                 num_patches: [2, 2] }] };
        let ids: Vec<String> = geom.patches(TractId(3)).unwrap().into_iter().map(|p| p.0).collect();
        assert_eq!(ids, vec!["0,0", "1,0", "0,1", "1,1"]);
        assert!(matches!(geom.patches(TractId(0)), Err(PersistenceError::UnknownTract(0))));
    }

    #[test]
    fn file_is_read_lazily() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("deepCoadd_skyMap.json");
        let file = SkyMapFile::new(&path);
        // Aún no existe: la primera consulta falla y no queda cacheada
        let err = file.patches(TractId(0)).unwrap_err();
        assert!(matches!(err, PersistenceError::MissingSkyMap(ref p) if p == &path));
        fs::write(&path, r#"{"tracts":[{"id":0,"num_patches":[3,1]}]}"#).unwrap();
        assert_eq!(file.patches(TractId(0)).unwrap().len(), 3);
    }

    #[test]
    fn missing_geometry_tells_how_to_supply_it() {
        let tmp = tempfile::tempdir().unwrap();
        let err: drp_core::PipelineError = SkyMapFile::new(tmp.path().join("deepCoadd_skyMap.json")).patches(TractId(0))
                                                                                                   .unwrap_err()
                                                                                                   .into();
        match err {
            drp_core::PipelineError::CatalogUnavailable(msg) => {
                assert!(msg.contains("deepCoadd_skyMap.json"), "{msg}");
                assert!(msg.contains("--skymap"), "{msg}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
