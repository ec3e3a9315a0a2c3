// dimension.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// Dimensiones con las que se indexan los datos del pipeline.
///
/// El conjunto es cerrado: cualquier identificador de datos (`DataId`) se
/// construye únicamente con estas claves. La forma textual (`visit`, `raft`,
/// ...) es la que esperan las herramientas externas en `--id key=value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Visit,
    Raft,
    Tract,
    Patch,
    Filter,
}

impl Dimension {
    /// Todas las dimensiones en orden canónico.
    pub const ALL: [Dimension; 5] = [Dimension::Visit,
                                     Dimension::Raft,
                                     Dimension::Tract,
                                     Dimension::Patch,
                                     Dimension::Filter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Visit => "visit",
            Dimension::Raft => "raft",
            Dimension::Tract => "tract",
            Dimension::Patch => "patch",
            Dimension::Filter => "filter",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL.into_iter()
                      .find(|d| d.as_str() == s)
                      .ok_or_else(|| DomainError::UnknownDimension(s.to_string()))
    }
}
