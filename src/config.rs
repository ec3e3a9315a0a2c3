//! Configuración del pipeline.
//! Carga `.env` una sola vez y lee las variables `DRP_*`; los flags de la CLI
//! se aplican después sobre el resultado.
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use drp_core::constants::DEFAULT_TRACT;
use drp_core::LogMode;
use drp_domain::{TractId, DEFAULT_MAPPER};
use drp_exec::DEFAULT_WORKERS;
use once_cell::sync::Lazy;
use thiserror::Error;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv(); // ignora error si no existe .env
});

/// Forzar carga temprana de .env.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid value `{value}`: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("{var} is required")]
    Missing { var: &'static str },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid { var,
                               value: value.to_string(),
                               reason: reason.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub output_repo: PathBuf,
    /// Catálogo de referencia enlazado como `<repo>/ref_cats`.
    pub ref_cats: Option<PathBuf>,
    pub eimage_pattern: String,
    pub mapper: String,
    pub log_dir: PathBuf,
    pub log_mode: LogMode,
    pub workers: usize,
    pub config_dir: PathBuf,
    pub tracts: Vec<TractId>,
    pub skymap: Option<PathBuf>,
    /// Fichero JSON lines de eventos; `None` los deja sólo en memoria.
    pub events: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { output_repo: PathBuf::from("output"),
               ref_cats: None,
               eimage_pattern: "../eimages/lsst_*.fits.gz".to_string(),
               mapper: DEFAULT_MAPPER.to_string(),
               log_dir: PathBuf::from("logs"),
               log_mode: LogMode::Combined,
               workers: DEFAULT_WORKERS,
               config_dir: PathBuf::from("configs"),
               tracts: vec![TractId(DEFAULT_TRACT)],
               skymap: None,
               events: None }
    }
}

impl PipelineConfig {
    /// Lee `.env` y el entorno del proceso.
    pub fn from_env() -> Result<Self, ConfigError> {
        init_dotenv();
        let vars: HashMap<String, String> = env::vars().filter(|(k, _)| k.starts_with("DRP_")).collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Igual que `from_env` pero con una función de búsqueda arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup("DRP_OUTPUT_REPO") {
            cfg.output_repo = PathBuf::from(v);
        }
        if let Some(v) = lookup("DRP_REF_CATS") {
            cfg.ref_cats = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("DRP_EIMAGE_PATTERN") {
            cfg.eimage_pattern = v;
        }
        if let Some(v) = lookup("DRP_MAPPER") {
            cfg.mapper = v;
        }
        if let Some(v) = lookup("DRP_LOG_DIR") {
            cfg.log_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("DRP_LOG_MODE") {
            cfg.log_mode = v.parse().map_err(|e: String| ConfigError::invalid("DRP_LOG_MODE", &v, e))?;
        }
        if let Some(v) = lookup("DRP_WORKERS") {
            cfg.workers = parse_workers("DRP_WORKERS", &v)?;
        }
        if let Some(v) = lookup("DRP_CONFIG_DIR") {
            cfg.config_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("DRP_TRACTS") {
            cfg.tracts = parse_tracts("DRP_TRACTS", &v)?;
        }
        if let Some(v) = lookup("DRP_SKYMAP") {
            cfg.skymap = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("DRP_EVENTS") {
            cfg.events = Some(PathBuf::from(v));
        }
        Ok(cfg)
    }

    pub fn require_ref_cats(&self) -> Result<&PathBuf, ConfigError> {
        self.ref_cats.as_ref().ok_or(ConfigError::Missing { var: "DRP_REF_CATS" })
    }

    /// Falla si algún valor ya cargado no es utilizable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::invalid("workers", "0", "must be at least 1"));
        }
        if self.tracts.is_empty() {
            return Err(ConfigError::invalid("tracts", "", "at least one tract is required"));
        }
        Ok(())
    }
}

pub fn parse_workers(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::invalid(var, value, "must be at least 1")),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::invalid(var, value, e.to_string())),
    }
}

/// Lista `0,1,...` de tracts.
pub fn parse_tracts(var: &'static str, value: &str) -> Result<Vec<TractId>, ConfigError> {
    let tracts = value.split(',')
                      .map(str::trim)
                      .filter(|s| !s.is_empty())
                      .map(|s| {
                          s.parse::<u32>()
                           .map(TractId)
                           .map_err(|e| ConfigError::invalid(var, value, e.to_string()))
                      })
                      .collect::<Result<Vec<_>, _>>()?;
    if tracts.is_empty() {
        return Err(ConfigError::invalid(var, value, "at least one tract is required"));
    }
    Ok(tracts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let cfg = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.workers, 1);
        assert_eq!(cfg.mapper, "lsst.obs.lsstSim.LsstSimMapper");
        assert_eq!(cfg.tracts, vec![TractId(0)]);
    }

    #[test]
    fn variables_override_defaults() {
        let cfg = PipelineConfig::from_lookup(lookup(&[("DRP_OUTPUT_REPO", "/data/out"),
                                                       ("DRP_WORKERS", "4"),
                                                       ("DRP_LOG_MODE", "separate"),
                                                       ("DRP_TRACTS", "0, 8")])).unwrap();
        assert_eq!(cfg.output_repo, PathBuf::from("/data/out"));
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.log_mode, LogMode::Separate);
        assert_eq!(cfg.tracts, vec![TractId(0), TractId(8)]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(PipelineConfig::from_lookup(lookup(&[("DRP_WORKERS", "0")])).is_err());
        assert!(PipelineConfig::from_lookup(lookup(&[("DRP_WORKERS", "many")])).is_err());
        assert!(PipelineConfig::from_lookup(lookup(&[("DRP_LOG_MODE", "loud")])).is_err());
        let err = PipelineConfig::from_lookup(lookup(&[("DRP_TRACTS", "0,x")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "DRP_TRACTS", .. }));
    }
}
