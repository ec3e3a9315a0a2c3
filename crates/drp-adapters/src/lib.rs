//! drp-adapters: etapas concretas del pipeline DRP sobre `drp-core`.
//!
//! Este crate provee:
//! - `CommandBuilder`: mapeo puro (etapa, repo, identificador) → invocación.
//! - `CmdLineStage`: adaptador de un `StageTemplate` al trait `StageDefinition`.
//! - `standard_plan`: las nueve etapas del pipeline en su orden fijo.
//! - `bootstrap_repo`: preparación idempotente del repositorio de salida.
//!
//! El core no conoce nombres de herramientas ni flags; todo lo específico de
//! las herramientas vive aquí.

pub mod bootstrap;
pub mod command;
pub mod plan;
pub mod stages;

pub use bootstrap::bootstrap_repo;
pub use command::{CommandBuilder, ExtraSelectors, StageTemplate, Versions};
pub use plan::{standard_plan, standard_templates};
pub use stages::CmdLineStage;
