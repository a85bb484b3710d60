//! Reporte de una ejecución: tipos, replay desde eventos, fingerprint y
//! renderizado.

mod render;
mod replay;
mod types;

use serde_json::json;

pub use render::RenderOptions;
pub use replay::replay;
pub use types::{ExitStatus, FailureClass, FatalPrecondition, PipelineReport, SkipReason, StageOutcome, StageReport};

use crate::constants::ENGINE_VERSION;
use crate::hashing::hash_value;

impl PipelineReport {
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == name)
    }

    /// Último stage declarado.
    pub fn terminal(&self) -> Option<&StageReport> {
        self.stages.last()
    }

    /// Éxito completo: se llegó al stage terminal y produjo valor, y ningún
    /// stage no opcional se agotó ni quedó sin correr por una dependencia o
    /// plantilla irresoluble.
    pub fn is_success(&self) -> bool {
        self.fatal.is_none()
        && self.terminal().is_some_and(|t| t.outcome.is_success())
        && !self.stages.iter().any(|s| !s.optional && blocks_success(&s.outcome))
    }

    pub fn attempt_count(&self) -> usize {
        self.stages.iter().map(|s| s.attempts.len()).sum()
    }

    /// Estado de salida: un entry no disponible es fallo de importación; un
    /// stage agotado (o con plantillas irresolubles) aporta su propia clase.
    /// Decide el primero en orden de declaración; los stages opcionales no
    /// cuentan. Un stage saltado por dependencia sólo decide si no hubo otra
    /// causa.
    pub fn exit_status(&self) -> ExitStatus {
        if self.fatal.is_some() {
            return ExitStatus::ImportFailure;
        }
        if self.is_success() {
            return ExitStatus::Success;
        }
        let required = || self.stages.iter().filter(|s| !s.optional);
        required().find_map(|s| match &s.outcome {
                      StageOutcome::Exhausted | StageOutcome::Skipped(SkipReason::InvalidTemplate { .. }) => {
                          Some(s.failure_class.exit_status())
                      }
                      StageOutcome::Skipped(SkipReason::EntryUnavailable { .. }) => Some(ExitStatus::ImportFailure),
                      _ => None,
                  })
                  .or_else(|| {
                      required().find(|s| matches!(s.outcome, StageOutcome::Skipped(SkipReason::MissingDependency { .. })))
                                .map(|s| s.failure_class.exit_status())
                  })
                  .unwrap_or(ExitStatus::ImportFailure)
    }

    /// Fingerprint estable: versión del motor, definición, desenlaces y orden
    /// de intentos. Excluye texto de faults, resúmenes de valores y timestamps.
    pub fn compute_fingerprint(&self) -> String {
        let stages: Vec<_> = self.stages
                                 .iter()
                                 .map(|s| {
                                     let attempts: Vec<_> = s.attempts
                                                             .iter()
                                                             .map(|a| {
                                                                 json!({
                                                                     "op": a.operation,
                                                                     "access": a.access,
                                                                     "signature": a.signature,
                                                                     "outcome": a.outcome.kind(),
                                                                     "fault": a.fault().map(|f| f.kind.clone()),
                                                                 })
                                                             })
                                                             .collect();
                                     json!({
                                         "stage": s.stage,
                                         "outcome": s.outcome.kind(),
                                         "skip": s.outcome.skip_reason().map(|r| r.kind()),
                                         "attempts": attempts,
                                     })
                                 })
                                 .collect();
        hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "definition_hash": self.definition_hash,
            "aborted": self.fatal.as_ref().map(|f| f.entry.clone()),
            "stages": stages,
        }))
    }
}

fn blocks_success(outcome: &StageOutcome) -> bool {
    matches!(outcome,
             StageOutcome::Exhausted
             | StageOutcome::Skipped(SkipReason::MissingDependency { .. } | SkipReason::InvalidTemplate { .. }))
}
