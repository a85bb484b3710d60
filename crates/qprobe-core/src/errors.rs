//! Errores del core. Los fallos de las llamadas sondeadas nunca son errores
//! de Rust: terminan como `Fault` dentro de un `AttemptRecord`.

use thiserror::Error;

use crate::value::Fault;

/// Errores de validación al construir un pipeline.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PipelineError {
    #[error("pipeline has no stages")] Empty,
    #[error("duplicate stage name '{0}'")] DuplicateStage(String),
    #[error("stage '{0}' references itself")] SelfReference(String),
    #[error("stage '{stage}' references later stage '{reference}'")] ForwardReference { stage: String, reference: String },
    #[error("stage '{stage}' targets undeclared entry '{entry}'")] UnknownEntry { stage: String, entry: String },
    #[error("duplicate entry '{0}'")] DuplicateEntry(String),
    #[error("invalid stage '{stage}': {reason}")] InvalidStage { stage: String, reason: String },
}

/// Errores al materializar plantillas contra el contexto.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ResolveError {
    #[error("missing context entry '{0}'")] Missing(String),
    #[error("context entry '{stage}' ({type_name}) is not iterable")] NotIterable { stage: String, type_name: String },
    #[error("cannot read '{name}' from '{stage}': {fault}")] Member { stage: String, name: String, fault: Fault },
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ContextError {
    #[error("context entry '{0}' already exists")] Duplicate(String),
}
