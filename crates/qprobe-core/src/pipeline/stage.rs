//! Stages del pipeline: el trait `Stage`, el stage declarativo `ProbeStage`
//! y el stage terminal de extracción.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entry::{EntryCache, EntryFailure};
use super::template::{CandidateTemplate, Reference};
use super::PipelineContext;
use crate::extract::extract_with;
use crate::probe::{Accept, Access, AttemptOutcome, AttemptRecord, Candidate, CapabilityProber, ProbeResult};
use crate::report::{FailureClass, SkipReason};
use crate::value::{Fault, ObjectRef, ProbeValue};

/// Lo que un stage ve al ejecutarse: el contexto acumulado, los entry points
/// (resueltos bajo demanda) y el prober configurado.
pub struct StageEnv<'a, 'r> {
    context: &'a PipelineContext,
    entries: &'a mut EntryCache<'r>,
    prober: &'a CapabilityProber,
}

impl<'a, 'r> StageEnv<'a, 'r> {
    pub(crate) fn new(context: &'a PipelineContext, entries: &'a mut EntryCache<'r>, prober: &'a CapabilityProber) -> Self {
        Self { context,
               entries,
               prober }
    }

    pub fn context(&self) -> &PipelineContext {
        self.context
    }

    pub fn prober(&self) -> &CapabilityProber {
        self.prober
    }

    pub fn entry(&mut self, name: &str) -> Result<ObjectRef, EntryFailure> {
        self.entries.get(name)
    }
}

/// Resultado de ejecutar un stage.
#[derive(Debug, Clone)]
pub enum StageRun {
    Completed {
        result: ProbeResult,
        /// Miembros del valor producido que coinciden con las keywords del stage.
        inspected: Vec<String>,
    },
    Skipped(SkipReason),
    /// Un entry requerido no se pudo obtener: la ejecución entera se aborta.
    Fatal {
        entry: String,
        fault: Fault,
        trace: Vec<AttemptRecord>,
    },
}

pub trait Stage {
    fn name(&self) -> &str;

    /// Todos los nombres del contexto que el stage menciona (duros u opcionales).
    fn references(&self) -> Vec<Reference>;

    /// Entry points que el stage usa como target.
    fn entries(&self) -> Vec<String> {
        Vec::new()
    }

    /// Nombres que deben existir en el contexto para que el stage corra.
    fn dependencies(&self) -> Vec<String>;

    fn failure_class(&self) -> FailureClass;

    /// Un stage opcional puede agotarse sin que la ejecución deje de ser un éxito.
    fn optional(&self) -> bool {
        false
    }

    /// Forma canónica de la definición (entra en el hash del pipeline).
    fn definition(&self) -> Value;

    fn execute(&self, env: &mut StageEnv<'_, '_>) -> StageRun;

    fn missing_dependencies(&self, context: &PipelineContext) -> Vec<String> {
        self.dependencies().into_iter().filter(|d| !context.contains(d)).collect()
    }
}

/// Target de un grupo de candidatos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    Entry(String),
    Ctx(String),
}

/// Un grupo: candidatos sobre un mismo target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSpec {
    pub target: TargetSource,
    pub candidates: Vec<CandidateTemplate>,
}

impl ProbeSpec {
    pub fn new(target: TargetSource, candidates: Vec<CandidateTemplate>) -> Self {
        Self { target, candidates }
    }

    fn references(&self) -> Vec<Reference> {
        let mut out = Vec::new();
        if let TargetSource::Ctx(name) = &self.target {
            out.push(Reference { name: name.clone(),
                                 hard: true });
        }
        self.candidates.iter().for_each(|c| c.collect_references(&mut out));
        out
    }

    fn hard_references(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for r in self.references().into_iter().filter(|r| r.hard) {
            if !names.contains(&r.name) {
                names.push(r.name);
            }
        }
        names
    }
}

/// Stage declarativo: grupos de candidatos probados en orden hasta el primer
/// éxito. Un grupo cuyo target o referencias duras faltan se salta.
#[derive(Debug, Clone)]
pub struct ProbeStage {
    pub name: String,
    pub after: Vec<String>,
    pub failure: FailureClass,
    pub optional: bool,
    /// Aceptación por defecto de los candidatos que no fijan la suya.
    pub accept: Accept,
    pub probes: Vec<ProbeSpec>,
    pub inspect: Vec<String>,
}

impl ProbeStage {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               after: Vec::new(),
               failure: FailureClass::default(),
               optional: false,
               accept: Accept::default(),
               probes: Vec::new(),
               inspect: Vec::new() }
    }

    pub fn on_entry(mut self, entry: impl Into<String>, candidates: Vec<CandidateTemplate>) -> Self {
        self.probes.push(ProbeSpec::new(TargetSource::Entry(entry.into()), candidates));
        self
    }

    pub fn on_ctx(mut self, stage: impl Into<String>, candidates: Vec<CandidateTemplate>) -> Self {
        self.probes.push(ProbeSpec::new(TargetSource::Ctx(stage.into()), candidates));
        self
    }

    pub fn after(mut self, stage: impl Into<String>) -> Self {
        self.after.push(stage.into());
        self
    }

    pub fn failure(mut self, failure: FailureClass) -> Self {
        self.failure = failure;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn accept(mut self, accept: Accept) -> Self {
        self.accept = accept;
        self
    }

    pub fn inspect(mut self, keywords: &[&str]) -> Self {
        self.inspect = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    fn inventory(&self, value: &ProbeValue) -> Vec<String> {
        if self.inspect.is_empty() {
            return Vec::new();
        }
        let keywords: Vec<String> = self.inspect.iter().map(|k| k.to_lowercase()).collect();
        value.as_introspect()
             .members()
             .into_iter()
             .filter(|m| {
                 let lower = m.to_lowercase();
                 keywords.iter().any(|k| lower.contains(k.as_str()))
             })
             .collect()
    }
}

fn append_renumbered(trace: &mut Vec<AttemptRecord>, records: Vec<AttemptRecord>) {
    for mut record in records {
        record.index = trace.len();
        trace.push(record);
    }
}

impl Stage for ProbeStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn references(&self) -> Vec<Reference> {
        let mut out: Vec<Reference> = self.after
                                          .iter()
                                          .map(|a| Reference { name: a.clone(),
                                                               hard: true })
                                          .collect();
        self.probes.iter().for_each(|p| out.extend(p.references()));
        out
    }

    fn entries(&self) -> Vec<String> {
        self.probes
            .iter()
            .filter_map(|p| match &p.target {
                TargetSource::Entry(e) => Some(e.clone()),
                TargetSource::Ctx(_) => None,
            })
            .collect()
    }

    /// `after` más los nombres que todos los grupos necesitan.
    fn dependencies(&self) -> Vec<String> {
        let mut deps = self.after.clone();
        let groups: Vec<Vec<String>> = self.probes.iter().map(ProbeSpec::hard_references).collect();
        if let Some((first, rest)) = groups.split_first() {
            for name in first {
                if rest.iter().all(|g| g.contains(name)) && !deps.contains(name) {
                    deps.push(name.clone());
                }
            }
        }
        deps
    }

    fn failure_class(&self) -> FailureClass {
        self.failure
    }

    fn optional(&self) -> bool {
        self.optional
    }

    fn definition(&self) -> Value {
        serde_json::json!({
            "kind": "probe",
            "name": self.name,
            "after": self.after,
            "failure": self.failure,
            "optional": self.optional,
            "accept": self.accept,
            "probes": self.probes,
            "inspect": self.inspect,
        })
    }

    fn execute(&self, env: &mut StageEnv<'_, '_>) -> StageRun {
        let max_items = env.prober().max_items();
        let mut trace: Vec<AttemptRecord> = Vec::new();
        let mut missing: Vec<String> = Vec::new();
        let mut unavailable: Option<EntryFailure> = None;
        let mut invalid: Option<String> = None;
        let mut ran = false;

        for group in &self.probes {
            let absent: Vec<String> = group.hard_references()
                                           .into_iter()
                                           .filter(|n| !env.context().contains(n))
                                           .collect();
            if !absent.is_empty() {
                for name in absent {
                    if !missing.contains(&name) {
                        missing.push(name);
                    }
                }
                continue;
            }

            let target: ObjectRef = match &group.target {
                TargetSource::Entry(entry) => match env.entry(entry) {
                    Ok(obj) => obj,
                    Err(failure) if failure.required => {
                        return StageRun::Fatal { entry: failure.entry,
                                                 fault: failure.fault,
                                                 trace };
                    }
                    Err(failure) => {
                        unavailable.get_or_insert(failure);
                        continue;
                    }
                },
                TargetSource::Ctx(name) => match env.context().get(name) {
                    Some(v) => v.as_introspect(),
                    None => continue,
                },
            };

            let candidates: Result<Vec<Candidate>, _> =
                group.candidates.iter().map(|c| c.resolve(env.context(), self.accept, max_items)).collect();
            let candidates = match candidates {
                Ok(c) => c,
                Err(e) => {
                    invalid.get_or_insert(e.to_string());
                    continue;
                }
            };

            ran = true;
            match env.prober().probe(target.as_ref(), &candidates) {
                ProbeResult::Success { value, mut winner, trace: records } => {
                    append_renumbered(&mut trace, records);
                    winner.index = trace.len() - 1;
                    let inspected = self.inventory(&value);
                    return StageRun::Completed { result: ProbeResult::Success { value, winner, trace },
                                                 inspected };
                }
                ProbeResult::Exhausted { trace: records } => append_renumbered(&mut trace, records),
            }
        }

        if ran {
            return StageRun::Completed { result: ProbeResult::Exhausted { trace },
                                         inspected: Vec::new() };
        }
        if let Some(failure) = unavailable {
            return StageRun::Skipped(SkipReason::EntryUnavailable { entry: failure.entry,
                                                                    fault: failure.fault });
        }
        if let Some(detail) = invalid {
            return StageRun::Skipped(SkipReason::InvalidTemplate { detail });
        }
        StageRun::Skipped(SkipReason::MissingDependency { missing })
    }
}

/// Stage terminal: normaliza el valor de un stage anterior con el adaptador
/// de extracción. Siempre produce valor (una distribución o un diagnóstico).
#[derive(Debug, Clone)]
pub struct ExtractStage {
    pub name: String,
    pub from: String,
    pub after: Vec<String>,
    pub failure: FailureClass,
    pub optional: bool,
}

impl ExtractStage {
    pub fn new(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self { name: name.into(),
               from: from.into(),
               after: Vec::new(),
               failure: FailureClass::NoResult,
               optional: false }
    }

    pub fn after(mut self, stage: impl Into<String>) -> Self {
        self.after.push(stage.into());
        self
    }
}

impl Stage for ExtractStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn references(&self) -> Vec<Reference> {
        std::iter::once(&self.from).chain(&self.after)
                                   .map(|n| Reference { name: n.clone(),
                                                        hard: true })
                                   .collect()
    }

    fn dependencies(&self) -> Vec<String> {
        let mut deps = vec![self.from.clone()];
        deps.extend(self.after.iter().filter(|a| **a != self.from).cloned());
        deps
    }

    fn failure_class(&self) -> FailureClass {
        self.failure
    }

    fn optional(&self) -> bool {
        self.optional
    }

    fn definition(&self) -> Value {
        serde_json::json!({
            "kind": "extract",
            "name": self.name,
            "from": self.from,
            "after": self.after,
            "failure": self.failure,
            "optional": self.optional,
        })
    }

    fn execute(&self, env: &mut StageEnv<'_, '_>) -> StageRun {
        let Some(source) = env.context().get(&self.from) else {
            return StageRun::Skipped(SkipReason::MissingDependency { missing: vec![self.from.clone()] });
        };
        let extraction = extract_with(source, env.prober());
        let mut trace = extraction.trace;
        let winner = AttemptRecord { index: trace.len(),
                                     operation: "extract".to_string(),
                                     access: Access::Read,
                                     signature: None,
                                     outcome: AttemptOutcome::Succeeded { summary: extraction.outcome.summary() } };
        trace.push(winner.clone());
        StageRun::Completed { result: ProbeResult::Success { value: ProbeValue::Data(extraction.outcome.to_value()),
                                                             winner,
                                                             trace },
                              inspected: Vec::new() }
    }
}
