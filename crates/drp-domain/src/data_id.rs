// data_id.rs
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Dimension, DomainError, FilterId, PatchId, RaftId, TractId, VisitId};

/// Identificador de datos: mapa `Dimension -> valor` con orden de inserción.
///
/// Selecciona los argumentos `--id` de una herramienta externa y da nombre a
/// su fichero de log. Dentro de una misma etapa todos los identificadores
/// comparten el mismo conjunto de claves; el orden con el que se serializan
/// lo fija la etapa (ver `tokens` / `suffix`), no el orden de inserción.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataId {
    entries: IndexMap<Dimension, String>,
}

impl DataId {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{visit, raft}` para el procesado por exposición.
    pub fn visit_raft(visit: VisitId, raft: &RaftId) -> Self {
        Self::new().with(Dimension::Visit, visit.to_string())
                   .with(Dimension::Raft, raft.0.clone())
    }

    /// `{tract, patch}`: identificador base del bucle de patches.
    pub fn tract_patch(tract: TractId, patch: &PatchId) -> Self {
        Self::new().with(Dimension::Tract, tract.to_string())
                   .with(Dimension::Patch, patch.0.clone())
    }

    /// Copia de `self` con el filtro indicado.
    pub fn with_filter(&self, filter: &FilterId) -> Self {
        self.clone().with(Dimension::Filter, filter.0.clone())
    }

    /// Inserta (o reemplaza) una dimensión y devuelve el identificador.
    pub fn with(mut self, dimension: Dimension, value: impl Into<String>) -> Self {
        self.insert(dimension, value);
        self
    }

    pub fn insert(&mut self, dimension: Dimension, value: impl Into<String>) {
        self.entries.insert(dimension, value.into());
    }

    pub fn get(&self, dimension: Dimension) -> Option<&str> {
        self.entries.get(&dimension).map(String::as_str)
    }

    pub fn contains(&self, dimension: Dimension) -> bool {
        self.entries.contains_key(&dimension)
    }

    /// Valor de una dimensión obligatoria.
    pub fn require(&self, dimension: Dimension) -> Result<&str, DomainError> {
        self.get(dimension).ok_or(DomainError::MissingDimension(dimension))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Claves en orden de inserción.
    pub fn dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &str)> + '_ {
        self.entries.iter().map(|(d, v)| (*d, v.as_str()))
    }

    /// Tokens `key=value` en el orden de claves dado.
    ///
    /// Falla con la primera dimensión de `order` ausente en el identificador.
    /// Las claves presentes que no aparecen en `order` se ignoran.
    pub fn tokens(&self, order: &[Dimension]) -> Result<Vec<String>, DomainError> {
        order.iter()
             .map(|d| self.require(*d).map(|v| format!("{d}={v}")))
             .collect()
    }

    /// Sufijo para nombres de log: valores unidos por `_` en el orden dado.
    pub fn suffix(&self, order: &[Dimension]) -> Result<String, DomainError> {
        let values = order.iter()
                          .map(|d| self.require(*d))
                          .collect::<Result<Vec<_>, _>>()?;
        Ok(values.join("_"))
    }
}

/// Forma `key=value` separada por espacios, en orden de inserción.
impl fmt::Display for DataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (d, v) in &self.entries {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{d}={v}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromIterator<(Dimension, String)> for DataId {
    fn from_iter<I: IntoIterator<Item = (Dimension, String)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
