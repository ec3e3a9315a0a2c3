//! Catálogo de identificadores de datos.
//!
//! `CatalogSource` es la costura hacia el registro externo (sólo lectura);
//! `Catalog` la envuelve y memoiza cada respuesta para toda la ejecución.

mod memo;
mod source;

pub use memo::Catalog;
pub use source::{CatalogSource, InMemoryCatalogSource};
