//! `DiscoveryPipeline`: ejecuta stages en orden, hilando el valor de cada
//! uno hacia las plantillas de los siguientes.
//!
//! Política soft-fail-forward: un stage agotado no detiene la ejecución; los
//! stages que dependen de su valor se reportan saltados y los independientes
//! siguen corriendo. La única condición que aborta es un entry point requerido
//! que no se puede obtener. Nunca se reintenta un stage.
//!
//! Todo el progreso se emite como eventos; el reporte es el replay de esos
//! eventos.

use indexmap::IndexMap;
use log::{info, warn};
use uuid::Uuid;

use super::builder::PipelineBuilder;
use super::entry::EntryCache;
use super::stage::{Stage, StageEnv, StageRun};
use super::{EntryResolver, EntrySpec, PipelineContext};
use crate::event::{EventStore, InMemoryEventStore, ProbeEvent, ProbeEventKind, StageHeader};
use crate::probe::{AttemptOutcome, CapabilityProber, ProbeResult};
use crate::report::{replay, PipelineReport, SkipReason};

pub struct DiscoveryPipeline<E: EventStore = InMemoryEventStore> {
    name: String,
    description: String,
    entries: IndexMap<String, EntrySpec>,
    stages: Vec<Box<dyn Stage>>,
    definition_hash: String,
    prober: CapabilityProber,
    event_store: E,
}

impl DiscoveryPipeline<InMemoryEventStore> {
    pub fn builder(name: impl Into<String>) -> PipelineBuilder<InMemoryEventStore> {
        PipelineBuilder::new(name)
    }
}

impl<E: EventStore> DiscoveryPipeline<E> {
    pub(crate) fn from_parts(name: String,
                             description: String,
                             entries: IndexMap<String, EntrySpec>,
                             stages: Vec<Box<dyn Stage>>,
                             definition_hash: String,
                             prober: CapabilityProber,
                             event_store: E)
                             -> Self {
        Self { name,
               description,
               entries,
               stages,
               definition_hash,
               prober,
               event_store }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &EntrySpec> {
        self.entries.values()
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    pub fn events(&self, run_id: Uuid) -> Vec<ProbeEvent> {
        self.event_store.list(run_id)
    }

    /// Ejecuta el pipeline y devuelve el reporte. Nunca falla.
    pub fn run(&mut self, resolver: &mut dyn EntryResolver, initial: PipelineContext) -> PipelineReport {
        self.run_with_context(resolver, initial).0
    }

    /// Como `run`, devolviendo además el contexto final.
    pub fn run_with_context(&mut self,
                            resolver: &mut dyn EntryResolver,
                            initial: PipelineContext)
                            -> (PipelineReport, PipelineContext) {
        let run_id = Uuid::new_v4();
        let mut context = initial;
        let headers = self.stages
                          .iter()
                          .map(|s| StageHeader { name: s.name().to_string(),
                                                 failure_class: s.failure_class(),
                                                 optional: s.optional() })
                          .collect();
        self.event_store.append_kind(run_id,
                                     ProbeEventKind::RunStarted { pipeline: self.name.clone(),
                                                                  definition_hash: self.definition_hash.clone(),
                                                                  stages: headers });
        info!("run {run_id}: pipeline '{}' ({} stages)", self.name, self.stages.len());

        let mut cache = EntryCache::new(resolver, &self.entries);
        let mut aborted = false;

        for (index, stage) in self.stages.iter().enumerate() {
            let name = stage.name().to_string();
            if aborted {
                self.event_store.append_kind(run_id,
                                             ProbeEventKind::StageSkipped { stage_index: index,
                                                                            stage: name,
                                                                            reason: SkipReason::PipelineAborted });
                continue;
            }

            // Un valor sembrado gana: el stage no corre y el contexto no cambia.
            if context.contains(&name) {
                info!("stage {name}: skipped, value supplied by the initial context");
                self.event_store.append_kind(run_id,
                                             ProbeEventKind::StageSkipped { stage_index: index,
                                                                            stage: name,
                                                                            reason: SkipReason::Preseeded });
                continue;
            }

            let missing = stage.missing_dependencies(&context);
            if !missing.is_empty() {
                info!("stage {name}: skipped, missing {}", missing.join(", "));
                self.event_store.append_kind(run_id,
                                             ProbeEventKind::StageSkipped { stage_index: index,
                                                                            stage: name,
                                                                            reason: SkipReason::MissingDependency { missing } });
                continue;
            }

            self.event_store.append_kind(run_id,
                                         ProbeEventKind::StageStarted { stage_index: index,
                                                                        stage: name.clone() });
            let outcome = {
                let mut env = StageEnv::new(&context, &mut cache, &self.prober);
                stage.execute(&mut env)
            };

            match outcome {
                StageRun::Completed { result, inspected } => {
                    for record in result.trace() {
                        self.event_store.append_kind(run_id,
                                                     ProbeEventKind::AttemptRecorded { stage_index: index,
                                                                                       record: record.clone() });
                    }
                    match result {
                        ProbeResult::Success { value, winner, .. } => {
                            let summary = match &winner.outcome {
                                AttemptOutcome::Succeeded { summary } => summary.clone(),
                                _ => value.describe(),
                            };
                            info!("stage {name}: {} -> {summary}", winner.call_text());
                            self.event_store.append_kind(run_id,
                                                         ProbeEventKind::StageSucceeded { stage_index: index,
                                                                                          stage: name.clone(),
                                                                                          call: winner.call_text(),
                                                                                          summary,
                                                                                          inspected });
                            if let Err(e) = context.insert(name, value) {
                                warn!("stage {}: {e}", stage.name());
                            }
                        }
                        ProbeResult::Exhausted { trace } => {
                            info!("stage {name}: exhausted after {} attempts", trace.len());
                            self.event_store.append_kind(run_id,
                                                         ProbeEventKind::StageExhausted { stage_index: index,
                                                                                          stage: name,
                                                                                          attempts: trace.len() });
                        }
                    }
                }
                StageRun::Skipped(reason) => {
                    info!("stage {name}: skipped, {reason}");
                    self.event_store.append_kind(run_id,
                                                 ProbeEventKind::StageSkipped { stage_index: index,
                                                                                stage: name,
                                                                                reason });
                }
                StageRun::Fatal { entry, fault, trace } => {
                    warn!("stage {name}: required entry '{entry}' unavailable ({fault}), aborting run");
                    for record in trace {
                        self.event_store.append_kind(run_id,
                                                     ProbeEventKind::AttemptRecorded { stage_index: index,
                                                                                       record });
                    }
                    self.event_store.append_kind(run_id,
                                                 ProbeEventKind::StageSkipped { stage_index: index,
                                                                                stage: name,
                                                                                reason: SkipReason::EntryUnavailable { entry: entry.clone(),
                                                                                                                       fault: fault.clone() } });
                    self.event_store.append_kind(run_id,
                                                 ProbeEventKind::RunAborted { stage_index: index,
                                                                              entry,
                                                                              fault });
                    aborted = true;
                }
            }
        }
        drop(cache);

        let fingerprint = replay(run_id, &self.event_store.list(run_id)).compute_fingerprint();
        self.event_store.append_kind(run_id, ProbeEventKind::RunCompleted { fingerprint });
        let report = replay(run_id, &self.event_store.list(run_id));
        info!("run {run_id}: {}", report.exit_status().label());
        (report, context)
    }
}
