//! Eventos de ejecución y trait EventStore.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{ProbeEvent, ProbeEventKind, StageHeader};
