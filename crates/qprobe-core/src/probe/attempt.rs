use serde::{Deserialize, Serialize};

use super::Access;
use crate::value::{CallSignature, Fault, ProbeValue};

/// Un intento concreto (candidato + argumentos resueltos) y su desenlace.
/// Append-only; pertenece a la invocación de `probe` que lo creó.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Orden en que se intentó (0-based) dentro de la traza.
    pub index: usize,
    pub operation: String,
    pub access: Access,
    /// `None` para lecturas y ausencias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<CallSignature>,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// El target no expone la operación: no se invocó nada.
    Absent,
    Failed { fault: Fault },
    Succeeded { summary: String },
}

impl AttemptOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptOutcome::Absent => "absent",
            AttemptOutcome::Failed { .. } => "failed",
            AttemptOutcome::Succeeded { .. } => "succeeded",
        }
    }
}

impl AttemptRecord {
    pub fn is_absent(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Absent)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Failed { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Succeeded { .. })
    }

    pub fn fault(&self) -> Option<&Fault> {
        match &self.outcome {
            AttemptOutcome::Failed { fault } => Some(fault),
            _ => None,
        }
    }

    /// `op(args)` / `op` para lecturas.
    pub fn call_text(&self) -> String {
        match &self.signature {
            Some(sig) => format!("{}{}", self.operation, sig),
            None => self.operation.clone(),
        }
    }
}

/// Resultado de un `probe`: éxito o agotamiento. Nunca un error.
#[derive(Debug, Clone)]
pub enum ProbeResult {
    Success {
        value: ProbeValue,
        winner: AttemptRecord,
        /// Traza completa hasta el ganador inclusive.
        trace: Vec<AttemptRecord>,
    },
    Exhausted { trace: Vec<AttemptRecord> },
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeResult::Success { .. })
    }

    pub fn trace(&self) -> &[AttemptRecord] {
        match self {
            ProbeResult::Success { trace, .. } | ProbeResult::Exhausted { trace } => trace,
        }
    }

    pub fn into_trace(self) -> Vec<AttemptRecord> {
        match self {
            ProbeResult::Success { trace, .. } | ProbeResult::Exhausted { trace } => trace,
        }
    }

    pub fn value(&self) -> Option<&ProbeValue> {
        match self {
            ProbeResult::Success { value, .. } => Some(value),
            ProbeResult::Exhausted { .. } => None,
        }
    }

    pub fn winner(&self) -> Option<&AttemptRecord> {
        match self {
            ProbeResult::Success { winner, .. } => Some(winner),
            ProbeResult::Exhausted { .. } => None,
        }
    }
}
