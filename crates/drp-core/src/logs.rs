//! Router de logs: etiqueta de tarea -> destinos de stdout/stderr.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::model::LogDestination;

/// Cómo se guarda la salida de cada work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// stdout y stderr en `<label>.log`.
    #[default]
    Combined,
    /// `<label>.out.log` y `<label>.err.log`.
    Separate,
    /// Salida descartada.
    Disabled,
}

impl FromStr for LogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "combined" => Ok(LogMode::Combined),
            "separate" => Ok(LogMode::Separate),
            "disabled" | "off" | "none" => Ok(LogMode::Disabled),
            other => Err(format!("unknown log mode `{other}`")),
        }
    }
}

impl fmt::Display for LogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
             LogMode::Combined => "combined",
             LogMode::Separate => "separate",
             LogMode::Disabled => "disabled",
         })
    }
}

/// Crea el directorio de logs de forma perezosa (una sola vez por router)
/// y calcula las rutas de cada work item.
#[derive(Debug)]
pub struct LogRouter {
    dir: PathBuf,
    mode: LogMode,
    ready: OnceCell<()>,
}

impl LogRouter {
    pub fn new(dir: impl Into<PathBuf>, mode: LogMode) -> Self {
        Self { dir: dir.into(),
               mode,
               ready: OnceCell::new() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn mode(&self) -> LogMode {
        self.mode
    }

    pub fn route(&self, label: &str) -> Result<LogDestination, PipelineError> {
        self.ready.get_or_try_init(|| {
                      debug!("log_router:create_dir {}", self.dir.display());
                      fs::create_dir_all(&self.dir).map_err(|e| {
                                                      PipelineError::Io(format!("cannot create log dir {}: {e}",
                                                                                self.dir.display()))
                                                  })
                  })?;
        Ok(match self.mode {
            LogMode::Combined => LogDestination::combined(self.dir.join(format!("{label}.log"))),
            LogMode::Separate => LogDestination { stdout: Some(self.dir.join(format!("{label}.out.log"))),
                                                  stderr: Some(self.dir.join(format!("{label}.err.log"))) },
            LogMode::Disabled => LogDestination::discard(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_mode_shares_one_file() {
        let tmp = tempfile::tempdir().unwrap();
        let router = LogRouter::new(tmp.path().join("logs"), LogMode::Combined);
        let dest = router.route("processEimage_1_R1").unwrap();
        assert!(dest.is_combined());
        assert_eq!(dest.stdout.unwrap(), tmp.path().join("logs").join("processEimage_1_R1.log"));
        assert!(tmp.path().join("logs").is_dir());
    }

    #[test]
    fn separate_mode_splits_streams() {
        let tmp = tempfile::tempdir().unwrap();
        let router = LogRouter::new(tmp.path(), LogMode::Separate);
        let dest = router.route("ingestSimImages").unwrap();
        assert_eq!(dest.stdout.unwrap(), tmp.path().join("ingestSimImages.out.log"));
        assert_eq!(dest.stderr.unwrap(), tmp.path().join("ingestSimImages.err.log"));
    }

    #[test]
    fn disabled_mode_discards_but_still_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let router = LogRouter::new(tmp.path().join("logs"), LogMode::Disabled);
        assert!(router.route("x").unwrap().is_discarded());
        assert!(tmp.path().join("logs").is_dir());
    }

    #[test]
    fn directory_is_created_only_once() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs");
        let router = LogRouter::new(&dir, LogMode::Combined);
        router.route("a").unwrap();
        // Si el directorio desaparece, el router no lo vuelve a crear
        fs::remove_dir(&dir).unwrap();
        router.route("b").unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn existing_directory_is_tolerated() {
        let tmp = tempfile::tempdir().unwrap();
        let router = LogRouter::new(tmp.path(), LogMode::Combined);
        assert!(router.route("a").is_ok());
    }

    #[test]
    fn log_mode_parses() {
        assert_eq!("Separate".parse::<LogMode>().unwrap(), LogMode::Separate);
        assert_eq!("off".parse::<LogMode>().unwrap(), LogMode::Disabled);
        assert!("verbose".parse::<LogMode>().is_err());
    }
}
