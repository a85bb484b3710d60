//! Eventos de una ejecución del pipeline.
//!
//! El `DiscoveryPipeline` no guarda estado propio del progreso: emite eventos
//! a un `EventStore` append-only y el `PipelineReport` se reconstruye por
//! replay de esa lista. El enum `ProbeEventKind` es el contrato observable.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::probe::AttemptRecord;
use crate::report::{FailureClass, SkipReason};
use crate::value::Fault;

/// Cabecera de un stage tal como se fija al iniciar la ejecución.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageHeader {
    pub name: String,
    pub failure_class: FailureClass,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProbeEventKind {
    /// Primer evento de todo `run_id`.
    RunStarted {
        pipeline: String,
        definition_hash: String,
        stages: Vec<StageHeader>,
    },
    StageStarted { stage_index: usize, stage: String },
    /// Un intento del prober, en el orden en que se hizo.
    AttemptRecorded { stage_index: usize, record: AttemptRecord },
    StageSucceeded {
        stage_index: usize,
        stage: String,
        call: String,
        summary: String,
        inspected: Vec<String>,
    },
    StageExhausted { stage_index: usize, stage: String, attempts: usize },
    StageSkipped { stage_index: usize, stage: String, reason: SkipReason },
    /// Un entry requerido no pudo obtenerse: los stages restantes se saltan.
    RunAborted { stage_index: usize, entry: String, fault: Fault },
    RunCompleted { fingerprint: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeEvent {
    pub seq: u64,
    pub run_id: Uuid,
    pub kind: ProbeEventKind,
    pub ts: DateTime<Utc>, // no entra en el fingerprint
}
