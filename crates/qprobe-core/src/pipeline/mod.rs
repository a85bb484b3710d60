//! Discovery Pipeline: cadena fija de stages de sondeo donde el valor de
//! cada stage alimenta las plantillas de los siguientes.

mod builder;
mod context;
mod engine;
mod entry;
mod spec;
mod stage;
mod template;

pub use builder::PipelineBuilder;
pub use context::PipelineContext;
pub use engine::DiscoveryPipeline;
pub use entry::{EntryFailure, EntryResolver, EntrySpec};
pub use spec::{PipelineSpec, StageSpec};
pub use stage::{ExtractStage, ProbeSpec, ProbeStage, Stage, StageEnv, StageRun, TargetSource};
pub use template::{ArgTemplate, CallTemplate, CandidateTemplate, Reference};
