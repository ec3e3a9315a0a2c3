//! Builder para `Orchestrator`.
//!
//! Patrón builder en dos estados: `OrchestratorBuilderInit` sólo conoce la
//! fuente del catálogo y el dispatcher; hasta fijar el plan (`plan`) no
//! existe `build`, de modo que un orquestador sin etapas no compila.
//!
//! ```ignore
//! let mut orch = Orchestrator::builder(source, pool)
//!     .plan(standard_plan(pattern, "configs")?)
//!     .tracts([TractId(0)])
//!     .build(repo, LogRouter::new("logs", LogMode::Combined));
//! let summary = orch.run()?;
//! ```

use std::sync::Arc;

use drp_domain::{RepoHandle, TractId};
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogSource};
use crate::constants::DEFAULT_TRACT;
use crate::dispatch::TaskDispatcher;
use crate::engine::{Orchestrator, RunContext};
use crate::event::{EventStore, InMemoryEventStore};
use crate::logs::LogRouter;
use crate::stage::StagePlan;

/// Estado inicial del builder.
#[derive(Debug)]
pub struct OrchestratorBuilderInit<S: CatalogSource, D: TaskDispatcher> {
    pub source: S,
    pub dispatcher: D,
}

impl<S: CatalogSource, D: TaskDispatcher> OrchestratorBuilderInit<S, D> {
    /// Fija el plan de etapas y transiciona al builder completo (event store
    /// en memoria por defecto).
    #[inline]
    pub fn plan(self, plan: StagePlan) -> OrchestratorBuilder<S, D, InMemoryEventStore> {
        OrchestratorBuilder { source: self.source,
                              dispatcher: self.dispatcher,
                              plan,
                              event_store: InMemoryEventStore::default(),
                              tracts: Vec::new(),
                              run_id: None }
    }
}

/// Builder principal.
#[derive(Debug)]
pub struct OrchestratorBuilder<S: CatalogSource, D: TaskDispatcher, E: EventStore> {
    source: S,
    dispatcher: D,
    plan: StagePlan,
    event_store: E,
    tracts: Vec<TractId>,
    run_id: Option<Uuid>,
}

impl<S: CatalogSource, D: TaskDispatcher, E: EventStore> OrchestratorBuilder<S, D, E> {
    /// Sustituye el event store.
    #[inline]
    pub fn event_store<E2: EventStore>(self, event_store: E2) -> OrchestratorBuilder<S, D, E2> {
        OrchestratorBuilder { source: self.source,
                              dispatcher: self.dispatcher,
                              plan: self.plan,
                              event_store,
                              tracts: self.tracts,
                              run_id: self.run_id }
    }

    /// Tracts a recorrer en el bucle de patches, en orden.
    #[inline]
    pub fn tracts(mut self, tracts: impl IntoIterator<Item = TractId>) -> Self {
        self.tracts = tracts.into_iter().collect();
        self
    }

    #[inline]
    pub fn run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Construye el orquestador. Sin tracts explícitos se usa `DEFAULT_TRACT`.
    pub fn build(self, repo: RepoHandle, logs: LogRouter) -> Orchestrator<S, D, E> {
        let tracts = if self.tracts.is_empty() {
            vec![TractId(DEFAULT_TRACT)]
        } else {
            self.tracts
        };
        let ctx = RunContext::new(self.run_id.unwrap_or_else(Uuid::new_v4), Arc::new(repo), logs, tracts);
        Orchestrator::new_with_parts(Catalog::new(self.source), self.dispatcher, self.event_store, self.plan, ctx)
    }
}
