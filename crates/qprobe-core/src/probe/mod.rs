//! Capability Prober y sus tipos: candidatos, registros de intentos y resultado.

mod attempt;
mod candidate;
mod prober;

pub use attempt::{AttemptOutcome, AttemptRecord, ProbeResult};
pub use candidate::{Accept, Access, Candidate};
pub use prober::{probe, CapabilityProber};
