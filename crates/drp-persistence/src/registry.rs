//! Registro SQLite de la ingesta.
//!
//! El fichero lo crea la etapa de ingesta, así que la conexión se abre de
//! forma perezosa en la primera consulta y nunca antes. Todas las consultas
//! usan parámetros enlazados.

use std::path::{Path, PathBuf};

use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use log::debug;
use once_cell::sync::OnceCell;

use crate::error::PersistenceError;
use crate::schema::{raw, raw_visit};

/// Alias de tipo para el pool r2d2 de conexiones SQLite.
pub type SqlitePool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

type PooledSqlite = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

/// Proveedor abstracto de conexiones (pool real o fixture de test).
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<PooledSqlite, PersistenceError>;
}

/// Implementación de `ConnectionProvider` respaldada por un `SqlitePool`.
pub struct PoolProvider {
    pub pool: SqlitePool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<PooledSqlite, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::Connection(format!("pool error: {e}")))
    }
}

/// Pool de una conexión sobre un registro existente. SQLite crearía un
/// fichero vacío si no existe, así que se comprueba antes.
pub fn build_pool(path: &Path) -> Result<SqlitePool, PersistenceError> {
    if !path.is_file() {
        return Err(PersistenceError::MissingRegistry(path.to_path_buf()));
    }
    let manager = ConnectionManager::<SqliteConnection>::new(path.display().to_string());
    let pool = r2d2::Pool::builder().max_size(1).build(manager)?;
    Ok(pool)
}

pub struct SqliteRegistry {
    path: PathBuf,
    provider: OnceCell<Box<dyn ConnectionProvider>>,
}

impl SqliteRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(),
               provider: OnceCell::new() }
    }

    /// Registro con un proveedor ya construido.
    pub fn with_provider(path: impl Into<PathBuf>, provider: impl ConnectionProvider) -> Self {
        let registry = Self::new(path);
        let _ = registry.provider.set(Box::new(provider));
        registry
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<PooledSqlite, PersistenceError> {
        let provider = self.provider.get_or_try_init(|| {
                                        debug!("registry:open {}", self.path.display());
                                        build_pool(&self.path).map(|pool| Box::new(PoolProvider { pool }) as Box<dyn ConnectionProvider>)
                                    })?;
        provider.connection()
    }

    /// `SELECT DISTINCT visit FROM raw_visit ORDER BY visit`
    pub fn visits(&self) -> Result<Vec<i64>, PersistenceError> {
        let mut conn = self.conn()?;
        let rows = raw_visit::table.select(raw_visit::visit)
                                   .distinct()
                                   .order(raw_visit::visit.asc())
                                   .load::<i64>(&mut conn)?;
        Ok(rows)
    }

    /// `SELECT DISTINCT filter FROM raw_visit ORDER BY filter`
    pub fn filters(&self) -> Result<Vec<String>, PersistenceError> {
        let mut conn = self.conn()?;
        let rows = raw_visit::table.select(raw_visit::filter)
                                   .distinct()
                                   .order(raw_visit::filter.asc())
                                   .load::<String>(&mut conn)?;
        Ok(rows)
    }

    /// `SELECT DISTINCT raft FROM raw WHERE visit = ? ORDER BY raft`
    pub fn rafts(&self, visit: i64) -> Result<Vec<String>, PersistenceError> {
        let mut conn = self.conn()?;
        let rows = raw::table.filter(raw::visit.eq(visit))
                             .select(raw::raft)
                             .distinct()
                             .order(raw::raft.asc())
                             .load::<String>(&mut conn)?;
        Ok(rows)
    }
}

impl std::fmt::Debug for SqliteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRegistry")
         .field("path", &self.path)
         .field("open", &self.provider.get().is_some())
         .finish()
    }
}
