//! Catálogo declarativo de planes de sondeo (JSON) y su carga desde disco.

pub mod catalog;
pub mod errors;
pub mod loader;
pub mod plan;

pub use errors::PlanError;
pub use loader::{load_dir, load_plan, resolve};
pub use plan::{digest_text, Plan, PlanSource};
