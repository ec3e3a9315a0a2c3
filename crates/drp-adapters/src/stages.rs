//! Adaptador `StageTemplate` → `StageDefinition`.

use drp_core::{CommandInvocation, PipelineError, StageDefinition, StagePhase};
use drp_domain::{DataId, Dimension, RepoHandle};
use serde_json::Value;

use crate::command::{CommandBuilder, ExtraSelectors, StageTemplate};

/// Etapa que ejecuta una herramienta de línea de comandos.
#[derive(Debug, Clone)]
pub struct CmdLineStage {
    template: StageTemplate,
    builder: CommandBuilder,
    extra: ExtraSelectors,
}

impl CmdLineStage {
    pub fn new(template: StageTemplate, builder: CommandBuilder) -> Self {
        Self { template,
               builder,
               extra: ExtraSelectors::none() }
    }

    pub fn with_extra(mut self, extra: ExtraSelectors) -> Self {
        self.extra = extra;
        self
    }

    pub fn stage_template(&self) -> &StageTemplate {
        &self.template
    }
}

impl StageDefinition for CmdLineStage {
    fn name(&self) -> &str {
        &self.template.name
    }

    fn phase(&self) -> StagePhase {
        self.template.phase
    }

    fn dimensions(&self) -> &[Dimension] {
        &self.template.dimensions
    }

    fn build(&self, repo: &RepoHandle, data_id: &DataId) -> Result<CommandInvocation, PipelineError> {
        self.builder.build(&self.template, repo, data_id, &self.extra)
    }

    fn template(&self) -> Value {
        self.builder.describe(&self.template, &self.extra)
    }
}
