//! Builder para `DiscoveryPipeline`.
//!
//! Acumula entry points y stages en orden de declaración y valida en
//! `build` que el grafo sea estrictamente hacia adelante:
//! - nombres de stage únicos;
//! - ningún stage se referencia a sí mismo ni a uno posterior;
//! - los targets `entry` deben estar declarados.
//!
//! Referencias a nombres que no son stages se permiten: deben venir del
//! contexto inicial de la ejecución.
//!
//! ```ignore
//! let pipeline = DiscoveryPipeline::builder("perceval")
//!     .entry(EntrySpec::required("pv", &["perceval"]))
//!     .stage(ProbeStage::new("circuit").on_entry("pv", vec![...]))
//!     .stage(ExtractStage::new("distribution", "probs"))
//!     .build()?;
//! ```

use indexmap::IndexMap;
use serde_json::{json, Value};

use super::engine::DiscoveryPipeline;
use super::stage::Stage;
use super::EntrySpec;
use crate::constants::ENGINE_VERSION;
use crate::errors::PipelineError;
use crate::event::{EventStore, InMemoryEventStore};
use crate::hashing::hash_value;
use crate::probe::CapabilityProber;

pub struct PipelineBuilder<E: EventStore = InMemoryEventStore> {
    name: String,
    description: String,
    entries: Vec<EntrySpec>,
    stages: Vec<Box<dyn Stage>>,
    prober: CapabilityProber,
    event_store: E,
}

impl PipelineBuilder<InMemoryEventStore> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               description: String::new(),
               entries: Vec::new(),
               stages: Vec::new(),
               prober: CapabilityProber::default(),
               event_store: InMemoryEventStore::default() }
    }
}

impl<E: EventStore> PipelineBuilder<E> {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn entry(mut self, entry: EntrySpec) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn stage(self, stage: impl Stage + 'static) -> Self {
        self.boxed_stage(Box::new(stage))
    }

    pub fn boxed_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn prober(mut self, prober: CapabilityProber) -> Self {
        self.prober = prober;
        self
    }

    /// Reemplaza el event store (cambia el parámetro de tipo del builder).
    pub fn event_store<S: EventStore>(self, event_store: S) -> PipelineBuilder<S> {
        PipelineBuilder { name: self.name,
                          description: self.description,
                          entries: self.entries,
                          stages: self.stages,
                          prober: self.prober,
                          event_store }
    }

    pub fn build(self) -> Result<DiscoveryPipeline<E>, PipelineError> {
        if self.stages.is_empty() {
            return Err(PipelineError::Empty);
        }

        let mut entries: IndexMap<String, EntrySpec> = IndexMap::new();
        for entry in self.entries {
            if entries.contains_key(&entry.name) {
                return Err(PipelineError::DuplicateEntry(entry.name));
            }
            entries.insert(entry.name.clone(), entry);
        }

        let names: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        for (i, stage) in self.stages.iter().enumerate() {
            let name = stage.name();
            if names[..i].contains(&name) {
                return Err(PipelineError::DuplicateStage(name.to_string()));
            }
            for reference in stage.references() {
                if reference.name == name {
                    return Err(PipelineError::SelfReference(name.to_string()));
                }
                if names[i + 1..].contains(&reference.name.as_str()) {
                    return Err(PipelineError::ForwardReference { stage: name.to_string(),
                                                                 reference: reference.name });
                }
            }
            for entry in stage.entries() {
                if !entries.contains_key(&entry) {
                    return Err(PipelineError::UnknownEntry { stage: name.to_string(),
                                                             entry });
                }
            }
        }

        let definition_hash = definition_hash(&self.name, &entries, &self.stages);
        Ok(DiscoveryPipeline::from_parts(self.name,
                                         self.description,
                                         entries,
                                         self.stages,
                                         definition_hash,
                                         self.prober,
                                         self.event_store))
    }
}

fn definition_hash(name: &str, entries: &IndexMap<String, EntrySpec>, stages: &[Box<dyn Stage>]) -> String {
    let stages: Vec<Value> = stages.iter().map(|s| s.definition()).collect();
    let entries: Vec<&EntrySpec> = entries.values().collect();
    hash_value(&json!({
        "engine_version": ENGINE_VERSION,
        "name": name,
        "entries": entries,
        "stages": stages,
    }))
}
