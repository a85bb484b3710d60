//! qprobe: sondeo adaptativo de SDKs cuánticos y de aceleradores.
//!
//! Este crate es la capa de aplicación sobre `qprobe-core` y `qprobe-plans`:
//! - `config`: configuración desde entorno (.env) con overrides de la CLI.
//! - `session`: ejecución de un plan y renderizado del reporte.
//! - `demo`: librería fotónica guionada para probar el motor sin Python.

pub mod config;
pub mod demo;
pub mod errors;
pub mod session;

pub use config::{OutputFormat, ProbeConfig};
pub use errors::AppError;
pub use session::{run_plan, top_outcomes, Session};
