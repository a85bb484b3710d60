//! Forma serializable (JSON) de un plan de sondeo.

use serde::{Deserialize, Serialize};

use super::stage::{ExtractStage, ProbeSpec, ProbeStage, Stage};
use super::{DiscoveryPipeline, EntrySpec, PipelineBuilder};
use crate::errors::PipelineError;
use crate::probe::Accept;
use crate::report::FailureClass;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,
    /// Por defecto `construction` para sondeos y `no_result` para extracción.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureClass>,
    /// Sus fallos no impiden el éxito de la ejecución.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default)]
    pub accept: Accept,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub probes: Vec<ProbeSpec>,
    /// Nombre del stage cuyo valor se extrae (stage terminal).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inspect: Vec<String>,
}

impl StageSpec {
    pub fn into_stage(self) -> Result<Box<dyn Stage>, PipelineError> {
        match (self.probes.is_empty(), self.extract) {
            (false, Some(_)) => Err(PipelineError::InvalidStage { stage: self.name,
                                                                  reason: "declares both probes and extract".into() }),
            (true, None) => Err(PipelineError::InvalidStage { stage: self.name,
                                                              reason: "declares neither probes nor extract".into() }),
            (true, Some(_)) if !self.inspect.is_empty() => {
                Err(PipelineError::InvalidStage { stage: self.name,
                                                  reason: "extract stages do not inspect members".into() })
            }
            (true, Some(_)) if self.accept != Accept::Any => {
                Err(PipelineError::InvalidStage { stage: self.name,
                                                  reason: "extract stages do not take an accept criterion".into() })
            }
            (true, Some(from)) => {
                let mut stage = ExtractStage::new(self.name, from);
                stage.after = self.after;
                stage.optional = self.optional;
                if let Some(failure) = self.failure {
                    stage.failure = failure;
                }
                Ok(Box::new(stage))
            }
            (false, None) => Ok(Box::new(ProbeStage { name: self.name,
                                                      after: self.after,
                                                      failure: self.failure.unwrap_or_default(),
                                                      optional: self.optional,
                                                      accept: self.accept,
                                                      probes: self.probes,
                                                      inspect: self.inspect })),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub entries: Vec<EntrySpec>,
    pub stages: Vec<StageSpec>,
}

impl PipelineSpec {
    /// Construye y valida el pipeline con el event store en memoria.
    pub fn build(self) -> Result<DiscoveryPipeline, PipelineError> {
        self.builder()?.build()
    }

    /// Builder con entries y etapas cargadas, para ajustar prober o event
    /// store antes de validar.
    pub fn builder(self) -> Result<PipelineBuilder, PipelineError> {
        let mut builder = DiscoveryPipeline::builder(self.name).description(self.description);
        for entry in self.entries {
            builder = builder.entry(entry);
        }
        for stage in self.stages {
            builder = builder.boxed_stage(stage.into_stage()?);
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stage_needs_exactly_one_of_probes_or_extract() {
        let neither: StageSpec = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert!(matches!(neither.into_stage(), Err(PipelineError::InvalidStage { .. })));

        let extract: StageSpec = serde_json::from_value(json!({"name": "dist", "extract": "probs"})).unwrap();
        let stage = extract.into_stage().unwrap();
        assert_eq!(stage.failure_class(), FailureClass::NoResult);
        assert_eq!(stage.dependencies(), vec!["probs".to_string()]);
    }

    #[test]
    fn extract_stage_keeps_after_and_rejects_probe_only_fields() {
        let gated: StageSpec = serde_json::from_value(json!({"name": "dist", "extract": "probs", "after": ["gate"]})).unwrap();
        let stage = gated.into_stage().unwrap();
        assert_eq!(stage.dependencies(), vec!["probs".to_string(), "gate".to_string()]);
        assert!(stage.references().iter().any(|r| r.name == "gate" && r.hard));

        let inspecting: StageSpec =
            serde_json::from_value(json!({"name": "dist", "extract": "probs", "inspect": ["add"]})).unwrap();
        assert!(matches!(inspecting.into_stage(), Err(PipelineError::InvalidStage { .. })));

        let accepting: StageSpec =
            serde_json::from_value(json!({"name": "dist", "extract": "probs", "accept": "non_null"})).unwrap();
        assert!(matches!(accepting.into_stage(), Err(PipelineError::InvalidStage { .. })));
    }

    #[test]
    fn probe_stage_parses_groups() {
        let spec: StageSpec = serde_json::from_value(json!({
            "name": "circuit",
            "probes": [
                {"target": {"entry": "pv"}, "candidates": [{"op": "Circuit", "calls": [{"args": [2]}]}]},
                {"target": {"ctx": "lib"}, "candidates": [{"op": "Circuit"}]}
            ]
        }))
        .unwrap();
        let stage = spec.into_stage().unwrap();
        assert_eq!(stage.entries(), vec!["pv".to_string()]);
        // sólo el segundo grupo depende de `lib`: no es dependencia del stage
        assert!(stage.dependencies().is_empty());
        assert_eq!(stage.failure_class(), FailureClass::Construction);
    }
}
