//! Un plan: `PipelineSpec` + origen + digest sha256 del texto fuente.

use std::fmt;
use std::path::PathBuf;

use qprobe_core::{CapabilityProber, DiscoveryPipeline, PipelineSpec};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::PlanError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    Builtin,
    File(PathBuf),
}

impl fmt::Display for PlanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanSource::Builtin => f.write_str("builtin"),
            PlanSource::File(p) => write!(f, "{}", p.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub spec: PipelineSpec,
    pub source: PlanSource,
    /// sha256 (hex) del texto tal como se leyó.
    pub digest: String,
}

pub fn digest_text(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

impl Plan {
    pub fn parse(text: &str, source: PlanSource) -> Result<Self, PlanError> {
        let spec: PipelineSpec = serde_json::from_str(text).map_err(|e| PlanError::Parse { origin: source.to_string(),
                                                                                            source: e })?;
        Ok(Self { spec,
                  source,
                  digest: digest_text(text) })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn description(&self) -> &str {
        &self.spec.description
    }

    /// Valida el grafo y construye el pipeline ejecutable.
    pub fn build(&self) -> Result<DiscoveryPipeline, PlanError> {
        self.spec.clone().build().map_err(|e| PlanError::Invalid { plan: self.spec.name.clone(),
                                                                   source: e })
    }

    /// Como `build`, con un prober configurado (por ejemplo otro límite de
    /// items para `each`).
    pub fn build_with(&self, prober: CapabilityProber) -> Result<DiscoveryPipeline, PlanError> {
        let invalid = |e| PlanError::Invalid { plan: self.spec.name.clone(),
                                               source: e };
        self.spec.clone().builder().map_err(invalid)?.prober(prober).build().map_err(invalid)
    }

    pub fn to_json_pretty(&self) -> Result<String, PlanError> {
        serde_json::to_string_pretty(&self.spec).map_err(|e| PlanError::Parse { origin: self.source.to_string(),
                                                                                source: e })
    }
}
