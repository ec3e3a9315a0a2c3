//! drp-persistence
//!
//! Lecturas del repositorio de salida y almacenamiento de eventos:
//! - `registry`: registro SQLite (`registry.sqlite3`) que escribe la ingesta,
//!   consultado con Diesel sobre un pool r2d2 de una conexión.
//! - `skymap`: geometría del sky map (tracts y rejilla de patches).
//! - `catalog_source`: ambos combinados como `CatalogSource` del core.
//! - `event_store`: `EventStore` append-only en ficheros JSON lines.
//! - `schema`: tablas Diesel del registro.

pub mod catalog_source;
pub mod error;
pub mod event_store;
pub mod registry;
pub mod schema;
pub mod skymap;

pub use catalog_source::RepoCatalogSource;
pub use error::PersistenceError;
pub use event_store::{read_events, JsonlEventStore};
pub use registry::{build_pool, ConnectionProvider, PoolProvider, SqlitePool, SqliteRegistry};
pub use skymap::{SkyMapFile, SkyMapGeometry, TractGeometry};
