//! Plantillas de comando de las herramientas de línea de comandos.
//!
//! Orden de argumentos:
//!
//! ```text
//! <task>.py <repo>/ [posicionales --mode link] --output <repo>
//!           [--selectId filter=F] [--id k=v ...]
//!           --doraise --clobber-config (--clobber-versions | --no-versions)
//!           [--configfile <config_dir>/<file>]
//! ```
use std::path::{Path, PathBuf};

use drp_core::{CommandInvocation, PipelineError, StagePhase};
use drp_domain::{DataId, Dimension, RepoHandle};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Política de versionado que se pasa a la herramienta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Versions {
    /// `--clobber-versions`
    Clobber,
    /// `--no-versions`
    Skip,
}

impl Versions {
    pub fn flag(&self) -> &'static str {
        match self {
            Versions::Clobber => "--clobber-versions",
            Versions::Skip => "--no-versions",
        }
    }
}

/// Descripción declarativa de una etapa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTemplate {
    pub name: String,
    pub phase: StagePhase,
    /// Dimensiones de `--id`, en orden de serialización.
    pub dimensions: Vec<Dimension>,
    /// Inyecta `--selectId filter=<filter>` antes de `--id`.
    pub select_filter: bool,
    pub versions: Versions,
    /// Fichero relativo al directorio de configs.
    pub config_file: Option<String>,
    /// La ingesta no lleva `--id` y enlaza las imágenes (`--mode link`).
    pub ingest: bool,
}

impl StageTemplate {
    pub fn new(name: impl Into<String>, phase: StagePhase) -> Self {
        Self { name: name.into(),
               phase,
               dimensions: Vec::new(),
               select_filter: false,
               versions: Versions::Clobber,
               config_file: None,
               ingest: false }
    }

    pub fn dimensions(mut self, dims: &[Dimension]) -> Self {
        self.dimensions = dims.to_vec();
        self
    }

    pub fn select_filter(mut self) -> Self {
        self.select_filter = true;
        self
    }

    pub fn versions(mut self, versions: Versions) -> Self {
        self.versions = versions;
        self
    }

    pub fn config_file(mut self, file: impl Into<String>) -> Self {
        self.config_file = Some(file.into());
        self
    }

    pub fn ingest(mut self) -> Self {
        self.ingest = true;
        self
    }

    pub fn program(&self) -> String {
        format!("{}.py", self.name)
    }
}

/// Argumentos posicionales adicionales (p.ej. el glob de imágenes de la ingesta).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraSelectors {
    pub positional: Vec<String>,
}

impl ExtraSelectors {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn positional(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { positional: items.into_iter().map(Into::into).collect() }
    }
}

/// Construye invocaciones. Puro: no toca disco ni consulta el catálogo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuilder {
    config_dir: PathBuf,
}

impl CommandBuilder {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self { config_dir: config_dir.into() }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Falla sólo con `InvalidIdentifier`, cuando a `data_id` le falta una
    /// dimensión requerida. Las claves sobrantes se ignoran.
    pub fn build(&self,
                 template: &StageTemplate,
                 repo: &RepoHandle,
                 data_id: &DataId,
                 extra: &ExtraSelectors)
                 -> Result<CommandInvocation, PipelineError> {
        let id_tokens = data_id.tokens(&template.dimensions)
                               .map_err(|e| PipelineError::from_domain(&template.name, e))?;

        let mut inv = CommandInvocation::new(template.program()).arg(repo.input_arg());
        if template.ingest {
            inv = inv.args(extra.positional.iter().cloned()).args(["--mode", "link"]);
        }
        inv = inv.args(["--output".to_string(), repo.output_arg()]);

        if template.select_filter {
            let filter = data_id.require(Dimension::Filter)
                                .map_err(|e| PipelineError::from_domain(&template.name, e))?;
            inv = inv.arg("--selectId").arg(format!("filter={filter}"));
        }
        if !template.ingest {
            inv = inv.arg("--id").args(id_tokens);
        }

        inv = inv.args(["--doraise", "--clobber-config", template.versions.flag()]);
        if let Some(file) = &template.config_file {
            inv = inv.arg("--configfile").arg(self.config_path(file));
        }
        Ok(inv)
    }

    fn config_path(&self, file: &str) -> String {
        self.config_dir.join(file).display().to_string()
    }

    /// Forma estable de la plantilla, para el hash del plan.
    pub fn describe(&self, template: &StageTemplate, extra: &ExtraSelectors) -> Value {
        json!({
            "program": template.program(),
            "dimensions": template.dimensions.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
            "select_filter": template.select_filter,
            "versions": template.versions.flag(),
            "config_file": template.config_file.as_deref().map(|f| self.config_path(f)),
            "ingest": template.ingest,
            "positional": extra.positional,
        })
    }
}
