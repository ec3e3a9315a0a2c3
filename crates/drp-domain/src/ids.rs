// ids.rs
//! Newtypes para los valores que devuelve el catálogo.
//!
//! El catálogo responde con tipos fuertes para que el orquestador no mezcle
//! una visita con un filtro; al construir un `DataId` todos se reducen a su
//! forma textual.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// Identificador numérico de una visita (exposición).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisitId(pub i64);

/// Identificador de un raft del plano focal, p.ej. `2,2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RaftId(pub String);

/// Nombre de filtro (`u`, `g`, `r`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilterId(pub String);

/// Índice de tract del sky map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TractId(pub u32);

/// Patch dentro de un tract, en forma `x,y`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatchId(pub String);

impl PatchId {
    /// Construye el id textual a partir del índice `(x, y)` del patch.
    pub fn from_index(x: u32, y: u32) -> Self {
        PatchId(format!("{x},{y}"))
    }

    /// Recupera el índice `(x, y)`.
    pub fn index(&self) -> Result<(u32, u32), DomainError> {
        let invalid = || DomainError::InvalidPatchId(self.0.clone());
        let (x, y) = self.0.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        Ok((x, y))
    }
}

macro_rules! display_inner {
    ($($ty:ident),+) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        })+
    };
}

display_inner!(VisitId, RaftId, FilterId, TractId, PatchId);

impl From<&str> for RaftId {
    fn from(s: &str) -> Self {
        RaftId(s.to_string())
    }
}

impl From<&str> for FilterId {
    fn from(s: &str) -> Self {
        FilterId(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_index_roundtrips_through_text() {
        let p = PatchId::from_index(3, 4);
        assert_eq!(p.0, "3,4");
        assert_eq!(p.index().unwrap(), (3, 4));
    }

    #[test]
    fn malformed_patch_is_rejected() {
        assert!(PatchId("34".into()).index().is_err());
        assert!(PatchId("a,b".into()).index().is_err());
    }
}
