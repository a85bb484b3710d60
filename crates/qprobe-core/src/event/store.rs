use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{ProbeEvent, ProbeEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, run_id: Uuid, kind: ProbeEventKind) -> ProbeEvent;
    /// Eventos de una ejecución, por seq ascendente.
    fn list(&self, run_id: Uuid) -> Vec<ProbeEvent>;
    /// Ejecuciones conocidas, en orden de llegada.
    fn runs(&self) -> Vec<Uuid>;
}

#[derive(Default)]
pub struct InMemoryEventStore {
    inner: HashMap<Uuid, Vec<ProbeEvent>>,
    order: Vec<Uuid>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: ProbeEventKind) -> ProbeEvent {
        if !self.inner.contains_key(&run_id) {
            self.order.push(run_id);
        }
        let events = self.inner.entry(run_id).or_default();
        let ev = ProbeEvent { seq: events.len() as u64,
                              run_id,
                              kind,
                              ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, run_id: Uuid) -> Vec<ProbeEvent> {
        self.inner.get(&run_id).cloned().unwrap_or_default()
    }

    fn runs(&self) -> Vec<Uuid> {
        self.order.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_per_run_and_ascending() {
        let mut store = InMemoryEventStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.append_kind(a, ProbeEventKind::RunCompleted { fingerprint: "x".into() });
        store.append_kind(b, ProbeEventKind::RunCompleted { fingerprint: "y".into() });
        let second = store.append_kind(a, ProbeEventKind::RunCompleted { fingerprint: "z".into() });
        assert_eq!(second.seq, 1);
        assert_eq!(store.list(b).len(), 1);
        assert_eq!(store.runs(), vec![a, b]);
        assert!(store.list(Uuid::new_v4()).is_empty());
    }
}
