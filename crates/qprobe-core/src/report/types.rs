use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::probe::AttemptRecord;
use crate::value::Fault;

/// Clase de fallo que un stage representa para el estado de salida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    Import,
    #[default]
    Construction,
    NoBackend,
    NoResult,
}

impl FailureClass {
    pub fn exit_status(self) -> ExitStatus {
        match self {
            FailureClass::Import => ExitStatus::ImportFailure,
            FailureClass::Construction => ExitStatus::ConstructionFailure,
            FailureClass::NoBackend => ExitStatus::NoBackend,
            FailureClass::NoResult => ExitStatus::NoResult,
        }
    }
}

/// Estado de salida del proceso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    Success,
    ImportFailure,
    NoBackend,
    NoResult,
    ConstructionFailure,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::ImportFailure => 2,
            ExitStatus::NoBackend => 3,
            ExitStatus::NoResult => 4,
            ExitStatus::ConstructionFailure => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExitStatus::Success => "success",
            ExitStatus::ImportFailure => "import failure",
            ExitStatus::NoBackend => "no backend found",
            ExitStatus::NoResult => "no result obtained",
            ExitStatus::ConstructionFailure => "construction failure",
        }
    }
}

/// Motivo por el que un stage no llegó a sondear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    MissingDependency { missing: Vec<String> },
    EntryUnavailable { entry: String, fault: Fault },
    InvalidTemplate { detail: String },
    /// El contexto inicial ya traía un valor con el nombre del stage.
    Preseeded,
    PipelineAborted,
}

impl SkipReason {
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::MissingDependency { .. } => "missing_dependency",
            SkipReason::EntryUnavailable { .. } => "entry_unavailable",
            SkipReason::InvalidTemplate { .. } => "invalid_template",
            SkipReason::Preseeded => "preseeded",
            SkipReason::PipelineAborted => "pipeline_aborted",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingDependency { missing } => write!(f, "missing dependency: {}", missing.join(", ")),
            SkipReason::EntryUnavailable { entry, fault } => write!(f, "entry '{entry}' unavailable ({fault})"),
            SkipReason::InvalidTemplate { detail } => write!(f, "cannot resolve candidates: {detail}"),
            SkipReason::Preseeded => write!(f, "value supplied by the initial context"),
            SkipReason::PipelineAborted => write!(f, "pipeline aborted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    /// Sólo visible en reportes de ejecuciones incompletas.
    Pending,
    Succeeded {
        /// Llamada ganadora, `op(args)`.
        call: String,
        summary: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        inspected: Vec<String>,
    },
    Exhausted,
    Skipped(SkipReason),
}

impl StageOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            StageOutcome::Pending => "pending",
            StageOutcome::Succeeded { .. } => "succeeded",
            StageOutcome::Exhausted => "exhausted",
            StageOutcome::Skipped(_) => "skipped",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StageOutcome::Succeeded { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StageOutcome::Skipped(_))
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            StageOutcome::Skipped(r) => Some(r),
            _ => None,
        }
    }
}

/// Entrada del reporte por stage, en orden de declaración.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub index: usize,
    pub stage: String,
    pub failure_class: FailureClass,
    /// Sus fallos no impiden el éxito de la ejecución.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    pub outcome: StageOutcome,
    pub attempts: Vec<AttemptRecord>,
}

/// Entry requerido que no pudo obtenerse y abortó la ejecución.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatalPrecondition {
    pub stage: String,
    pub entry: String,
    pub fault: Fault,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub pipeline: String,
    pub definition_hash: String,
    pub stages: Vec<StageReport>,
    pub fatal: Option<FatalPrecondition>,
    /// Se fija al completar la ejecución (evento `RunCompleted`).
    pub fingerprint: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}
