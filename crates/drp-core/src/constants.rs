//! Constantes del orquestador.
//!
//! `ENGINE_VERSION` entra en el hash del plan y en el fingerprint de cada
//! ejecución: cambiarla invalida la comparación con ejecuciones previas
//! aunque el plan no cambie.

/// Versión lógica del orquestador.
pub const ENGINE_VERSION: &str = "D1.0";

/// Tract por defecto cuando la configuración no indica ninguno.
pub const DEFAULT_TRACT: u32 = 0;
