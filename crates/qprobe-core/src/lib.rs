//! Motor de sondeo adaptativo: negocia con una API opaca y versionada
//! (presencia de miembros, convenciones de llamada) sin conocer su contrato
//! exacto de antemano.
//!
//! - `probe`: Capability Prober (primer candidato que funciona + traza).
//! - `pipeline`: Discovery Pipeline declarativo con política soft-fail-forward.
//! - `extract`: normalización de resultados a mapping etiqueta -> peso.
//! - `event` / `report`: log append-only de la ejecución y reporte por replay.

pub mod constants;
pub mod errors;
pub mod event;
pub mod extract;
pub mod hashing;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod scripted;
pub mod value;

pub use errors::{ContextError, PipelineError, ResolveError};
pub use event::{EventStore, InMemoryEventStore, ProbeEvent, ProbeEventKind};
pub use extract::{extract, extract_with, Extraction, ExtractionOutcome, Shape, Weight};
pub use pipeline::{ArgTemplate, CallTemplate, CandidateTemplate, DiscoveryPipeline, EntryResolver, EntrySpec, ExtractStage,
                   PipelineContext, PipelineSpec, ProbeStage, Stage, StageSpec, TargetSource};
pub use probe::{probe, Accept, Access, AttemptOutcome, AttemptRecord, Candidate, CapabilityProber, ProbeResult};
pub use report::{ExitStatus, FailureClass, PipelineReport, RenderOptions, SkipReason, StageOutcome, StageReport};
pub use value::{CallArgs, CallSignature, Fault, Introspect, ObjectRef, ProbeValue};
