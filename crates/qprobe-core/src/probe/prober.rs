//! Capability Prober: ¿qué llamada concreta, si alguna, realiza la operación
//! X sobre este objeto?
//!
//! Recorre los candidatos en el orden dado por el caller. Una operación
//! ausente deja un registro `Absent` sin invocar nada; una presente se invoca
//! una vez por plantilla de argumentos. El primer éxito corta toda la
//! iteración. Ningún fallo escapa: todo termina como `AttemptRecord`.
//!
//! Las llamadas pueden mutar el target aunque luego se consideren fallidas;
//! no hay rollback. Los candidatos de operaciones con estado deben ordenarse
//! de menos a más específicos.

use log::debug;

use super::{Access, AttemptOutcome, AttemptRecord, Candidate, ProbeResult};
use crate::constants::DEFAULT_MAX_ITEMS;
use crate::value::{CallArgs, Fault, Introspect, ProbeValue};

/// Prober configurable (límite de elementos para los checks de aceptación).
#[derive(Debug, Clone, Copy)]
pub struct CapabilityProber {
    max_items: usize,
}

impl Default for CapabilityProber {
    fn default() -> Self {
        Self { max_items: DEFAULT_MAX_ITEMS }
    }
}

impl CapabilityProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn probe(&self, target: &dyn Introspect, candidates: &[Candidate]) -> ProbeResult {
        let mut trace: Vec<AttemptRecord> = Vec::new();
        let type_name = target.type_name();

        for candidate in candidates {
            let op = candidate.operation.as_str();
            if !target.has_member(op) {
                debug!("probe {type_name}.{op}: absent");
                trace.push(AttemptRecord { index: trace.len(),
                                           operation: op.to_string(),
                                           access: candidate.access,
                                           signature: None,
                                           outcome: AttemptOutcome::Absent });
                continue;
            }

            let access = candidate.access.resolve(target, op);
            let reads = [CallArgs::empty()];
            let calls: &[CallArgs] = match access {
                Access::Read => &reads,
                _ => &candidate.calls,
            };

            for args in calls {
                let signature = (access != Access::Read).then(|| args.signature());
                let raw = match access {
                    Access::Read => target.get_member(op),
                    _ => target.invoke(op, args),
                };
                match self.settle(raw, candidate) {
                    Ok(value) => {
                        let winner = AttemptRecord { index: trace.len(),
                                                     operation: op.to_string(),
                                                     access,
                                                     signature,
                                                     outcome: AttemptOutcome::Succeeded { summary: value.describe() } };
                        debug!("probe {type_name}.{}: success -> {}", winner.call_text(), value.describe());
                        trace.push(winner.clone());
                        return ProbeResult::Success { value, winner, trace };
                    }
                    Err(fault) => {
                        let record = AttemptRecord { index: trace.len(),
                                                     operation: op.to_string(),
                                                     access,
                                                     signature,
                                                     outcome: AttemptOutcome::Failed { fault } };
                        debug!("probe {type_name}.{}: {}", record.call_text(), record.fault().map(|f| f.to_string()).unwrap_or_default());
                        trace.push(record);
                    }
                }
            }
        }

        ProbeResult::Exhausted { trace }
    }

    fn settle(&self, raw: Result<ProbeValue, Fault>, candidate: &Candidate) -> Result<ProbeValue, Fault> {
        let value = raw?;
        candidate.accept.check(&value, self.max_items)?;
        Ok(value)
    }
}

/// `probe` con la configuración por defecto.
pub fn probe(target: &dyn Introspect, candidates: &[Candidate]) -> ProbeResult {
    CapabilityProber::default().probe(target, candidates)
}
