// repo_handle.rs
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Mapper de cámara por defecto escrito en `_mapper`.
pub const DEFAULT_MAPPER: &str = "lsst.obs.lsstSim.LsstSimMapper";

/// Referencia al repositorio de salida del pipeline.
///
/// Se crea una sola vez al arrancar (ver bootstrap en `drp-adapters`) y es de
/// sólo lectura para todas las etapas; las herramientas externas escriben en
/// subdirectorios que ellas mismas crean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoHandle {
    root: PathBuf,
    ref_cats: PathBuf,
    mapper: String,
}

impl RepoHandle {
    pub fn new(root: impl Into<PathBuf>, ref_cats: impl Into<PathBuf>, mapper: impl Into<String>) -> Self {
        Self { root: root.into(),
               ref_cats: ref_cats.into(),
               mapper: mapper.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ref_cats(&self) -> &Path {
        &self.ref_cats
    }

    pub fn mapper(&self) -> &str {
        &self.mapper
    }

    /// Ruta del repositorio como argumento de entrada (`<root>/`).
    pub fn input_arg(&self) -> String {
        let root = self.root.display().to_string();
        if root.ends_with('/') {
            root
        } else {
            format!("{root}/")
        }
    }

    /// Ruta del repositorio como argumento de `--output`.
    pub fn output_arg(&self) -> String {
        self.root.display().to_string()
    }

    /// Registro SQLite que escribe la ingesta.
    pub fn registry_path(&self) -> PathBuf {
        self.root.join("registry.sqlite3")
    }

    /// Geometría del sky map exportada junto al `deepCoadd_skyMap`.
    pub fn skymap_path(&self) -> PathBuf {
        self.root.join("deepCoadd_skyMap.json")
    }
}
