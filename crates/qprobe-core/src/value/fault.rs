//! `Fault`: descripción capturada de una llamada fallida.
//!
//! El motor no interpreta la causa; sólo conserva el tipo de excepción (o su
//! equivalente) y el mensaje para el reporte.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct Fault {
    /// Clase del fallo (`TypeError`, `AttributeError`, `Rejected`, ...).
    pub kind: String,
    pub message: String,
}

impl Fault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(),
               message: message.into() }
    }

    /// Firma incompatible (aridad o tipos de argumentos).
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new("TypeError", message)
    }

    pub fn missing_member(type_name: &str, name: &str) -> Self {
        Self::new("AttributeError", format!("'{type_name}' object has no attribute '{name}'"))
    }

    pub fn not_callable(type_name: &str) -> Self {
        Self::type_error(format!("'{type_name}' object is not callable"))
    }

    /// La llamada retornó, pero el valor no cumple la aceptación del candidato.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::new("Rejected", reason)
    }
}
