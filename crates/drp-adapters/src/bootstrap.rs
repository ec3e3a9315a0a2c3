//! Preparación del repositorio de salida.

use std::fs;
use std::path::Path;

use drp_core::PipelineError;
use drp_domain::RepoHandle;
use log::{debug, info};

/// Crea el directorio, escribe `_mapper` y enlaza `ref_cats`.
///
/// Idempotente: `_mapper` se reescribe con el mismo contenido y el enlace
/// sólo se crea si no existe ya una entrada `ref_cats` (sea cual sea su tipo).
pub fn bootstrap_repo(root: impl AsRef<Path>, ref_cats: impl AsRef<Path>, mapper: &str) -> Result<RepoHandle, PipelineError> {
    let root = root.as_ref();
    let ref_cats = ref_cats.as_ref();
    fs::create_dir_all(root).map_err(|e| PipelineError::Io(format!("cannot create repo {}: {e}", root.display())))?;

    let mapper_file = root.join("_mapper");
    fs::write(&mapper_file, format!("{mapper}\n")).map_err(|e| {
                                                      PipelineError::Io(format!("cannot write {}: {e}",
                                                                                mapper_file.display()))
                                                  })?;

    let link = root.join("ref_cats");
    if fs::symlink_metadata(&link).is_err() {
        debug!("bootstrap:link {} -> {}", link.display(), ref_cats.display());
        symlink(ref_cats, &link).map_err(|e| PipelineError::Io(format!("cannot link {}: {e}", link.display())))?;
    }
    info!("bootstrap:ready repo={} mapper={mapper}", root.display());
    Ok(RepoHandle::new(root, ref_cats, mapper))
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
