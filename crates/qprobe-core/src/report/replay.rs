//! Reconstrucción del `PipelineReport` a partir de eventos.
//!
//! Replay lineal: cada evento actualiza la entrada de su stage. Eventos de
//! otro `run_id` o con índices fuera de rango se ignoran.
use uuid::Uuid;

use super::{FatalPrecondition, PipelineReport, StageOutcome, StageReport};
use crate::event::{ProbeEvent, ProbeEventKind};

pub fn replay(run_id: Uuid, events: &[ProbeEvent]) -> PipelineReport {
    let mut report = PipelineReport { run_id,
                                      pipeline: String::new(),
                                      definition_hash: String::new(),
                                      stages: Vec::new(),
                                      fatal: None,
                                      fingerprint: None,
                                      started_at: None,
                                      finished_at: None };

    for ev in events.iter().filter(|e| e.run_id == run_id) {
        match &ev.kind {
            ProbeEventKind::RunStarted { pipeline,
                                         definition_hash,
                                         stages, } => {
                report.pipeline = pipeline.clone();
                report.definition_hash = definition_hash.clone();
                report.started_at = Some(ev.ts);
                report.stages = stages.iter()
                                      .enumerate()
                                      .map(|(index, h)| StageReport { index,
                                                                      stage: h.name.clone(),
                                                                      failure_class: h.failure_class,
                                                                      optional: h.optional,
                                                                      outcome: StageOutcome::Pending,
                                                                      attempts: Vec::new() })
                                      .collect();
            }
            ProbeEventKind::StageStarted { .. } => {}
            ProbeEventKind::AttemptRecorded { stage_index, record } => {
                if let Some(slot) = report.stages.get_mut(*stage_index) {
                    slot.attempts.push(record.clone());
                }
            }
            ProbeEventKind::StageSucceeded { stage_index,
                                             call,
                                             summary,
                                             inspected,
                                             .. } => {
                if let Some(slot) = report.stages.get_mut(*stage_index) {
                    slot.outcome = StageOutcome::Succeeded { call: call.clone(),
                                                             summary: summary.clone(),
                                                             inspected: inspected.clone() };
                }
            }
            ProbeEventKind::StageExhausted { stage_index, .. } => {
                if let Some(slot) = report.stages.get_mut(*stage_index) {
                    slot.outcome = StageOutcome::Exhausted;
                }
            }
            ProbeEventKind::StageSkipped { stage_index, reason, .. } => {
                if let Some(slot) = report.stages.get_mut(*stage_index) {
                    slot.outcome = StageOutcome::Skipped(reason.clone());
                }
            }
            ProbeEventKind::RunAborted { stage_index, entry, fault } => {
                let stage = report.stages.get(*stage_index).map(|s| s.stage.clone()).unwrap_or_default();
                report.fatal = Some(FatalPrecondition { stage,
                                                        entry: entry.clone(),
                                                        fault: fault.clone() });
            }
            ProbeEventKind::RunCompleted { fingerprint } => {
                report.fingerprint = Some(fingerprint.clone());
                report.finished_at = Some(ev.ts);
            }
        }
    }
    report
}
