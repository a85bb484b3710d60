//! Puente pyo3: objetos Python como targets sondeables y resolución de
//! entry points por import.

use pyo3::PyErr;
use thiserror::Error;

mod bridge;
mod entries;
mod target;

pub use entries::PythonEntries;
pub use target::PyTarget;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Error inicializando el intérprete Python: {0}")]
    Init(PyErr),
}

/// Inicializa el intérprete y carga el módulo auxiliar. Idempotente.
pub fn init() -> Result<(), BridgeError> {
    bridge::init_bridge().map_err(BridgeError::Init)
}
