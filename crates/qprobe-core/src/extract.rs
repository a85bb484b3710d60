//! Result-Extraction Adapter: normaliza un resultado opaco a un mapping
//! etiqueta -> peso, reconociendo su forma en orden fijo de prioridad:
//!
//! 1. mapping directo (dict de números, o secuencia de pares `(etiqueta, peso)`);
//! 2. accessor conocido que devuelve ese mapping (`get_counts`, `as_dict`, ...);
//! 3. secuencia de etiquetas emparejada posicionalmente con un accessor de pesos;
//! 4. sólo etiquetas, con peso desconocido (nunca cero).
//!
//! Si nada aplica se devuelve un diagnóstico (tipo, miembros y repr). No se
//! normaliza ni valida que los pesos sumen 1.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{WEIGHT_ACCESSORS, WELL_KNOWN_ACCESSORS};
use crate::probe::{Accept, AttemptRecord, Candidate, CapabilityProber, ProbeResult};
use crate::value::ProbeValue;

/// Peso de un resultado. `Unknown` se serializa como `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Weight {
    Known(f64),
    Unknown,
}

impl Weight {
    pub fn value(self) -> Option<f64> {
        match self {
            Weight::Known(w) => Some(w),
            Weight::Unknown => None,
        }
    }
}

impl From<Option<f64>> for Weight {
    fn from(v: Option<f64>) -> Self {
        v.map(Weight::Known).unwrap_or(Weight::Unknown)
    }
}

impl From<Weight> for Option<f64> {
    fn from(w: Weight) -> Self {
        w.value()
    }
}

/// Forma reconocida.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    DirectMapping,
    Accessor { name: String },
    PairedWeights { accessor: String },
    LabelsOnly,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::DirectMapping => write!(f, "direct mapping"),
            Shape::Accessor { name } => write!(f, "accessor {name}"),
            Shape::PairedWeights { accessor } => write!(f, "labels + {accessor}"),
            Shape::LabelsOnly => write!(f, "labels only"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Distribution {
        shape: Shape,
        weights: IndexMap<String, Weight>,
    },
    /// Forma no reconocida: lo necesario para escribir el accessor a mano.
    Diagnostic {
        type_name: String,
        members: Vec<String>,
        repr: String,
    },
}

impl ExtractionOutcome {
    pub fn shape(&self) -> Option<&Shape> {
        match self {
            ExtractionOutcome::Distribution { shape, .. } => Some(shape),
            ExtractionOutcome::Diagnostic { .. } => None,
        }
    }

    pub fn weights(&self) -> Option<&IndexMap<String, Weight>> {
        match self {
            ExtractionOutcome::Distribution { weights, .. } => Some(weights),
            ExtractionOutcome::Diagnostic { .. } => None,
        }
    }

    /// Resultados ordenados por peso descendente; los desconocidos al final
    /// en su orden original.
    pub fn ranked(&self) -> Vec<(&str, Weight)> {
        let mut rows: Vec<(&str, Weight)> = self.weights()
                                                .map(|w| w.iter().map(|(k, v)| (k.as_str(), *v)).collect())
                                                .unwrap_or_default();
        rows.sort_by(|a, b| {
                let (x, y) = (a.1.value().unwrap_or(f64::NEG_INFINITY), b.1.value().unwrap_or(f64::NEG_INFINITY));
                y.total_cmp(&x)
            });
        rows
    }

    /// Resumen de una línea para reportes.
    pub fn summary(&self) -> String {
        match self {
            ExtractionOutcome::Distribution { shape, weights } => format!("{} outcomes ({shape})", weights.len()),
            ExtractionOutcome::Diagnostic { type_name, members, .. } => {
                format!("unrecognized {type_name} ({} members)", members.len())
            }
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Desenlace + traza de los accessors intentados.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub outcome: ExtractionOutcome,
    pub trace: Vec<AttemptRecord>,
}

pub fn extract(result: &ProbeValue) -> Extraction {
    extract_with(result, &CapabilityProber::default())
}

pub fn extract_with(result: &ProbeValue, prober: &CapabilityProber) -> Extraction {
    let max_items = prober.max_items();
    let mut trace = Vec::new();

    if let Some(weights) = weight_map(result, max_items) {
        return Extraction { outcome: ExtractionOutcome::Distribution { shape: Shape::DirectMapping,
                                                                       weights },
                            trace };
    }

    let target = result.as_introspect();
    if result.as_object().is_some() {
        let candidates: Vec<Candidate> = WELL_KNOWN_ACCESSORS.iter()
                                                             .map(|n| Candidate::auto(*n).accepting(Accept::Mapping))
                                                             .collect();
        if let Some((name, value)) = first_success(prober.probe(target.as_ref(), &candidates), &mut trace) {
            if let Some(weights) = weight_map(&value, max_items) {
                debug!("extract: accessor {name} on {}", result.type_name());
                return Extraction { outcome: ExtractionOutcome::Distribution { shape: Shape::Accessor { name },
                                                                               weights },
                                    trace };
            }
        }
    }

    if let Some(labels) = result.elements(max_items) {
        let labels: Vec<String> = labels.iter().map(ProbeValue::label).collect();
        if result.as_object().is_some() {
            let candidates: Vec<Candidate> = WEIGHT_ACCESSORS.iter()
                                                             .map(|n| Candidate::auto(*n).accepting(Accept::Sequence))
                                                             .collect();
            if let Some((accessor, value)) = first_success(prober.probe(target.as_ref(), &candidates), &mut trace) {
                if let Some(ws) = weight_list(&value, max_items) {
                    let weights = labels.into_iter().zip(ws).collect();
                    return Extraction { outcome: ExtractionOutcome::Distribution { shape: Shape::PairedWeights { accessor },
                                                                                   weights },
                                        trace };
                }
            }
        }
        let weights = labels.into_iter().map(|l| (l, Weight::Unknown)).collect();
        return Extraction { outcome: ExtractionOutcome::Distribution { shape: Shape::LabelsOnly,
                                                                       weights },
                            trace };
    }

    debug!("extract: unrecognized shape {}", result.type_name());
    Extraction { outcome: ExtractionOutcome::Diagnostic { type_name: result.type_name(),
                                                          members: target.members(),
                                                          repr: target.repr() },
                 trace }
}

/// Vuelca la traza (renumerada) y devuelve operación + valor si hubo éxito.
fn first_success(result: ProbeResult, trace: &mut Vec<AttemptRecord>) -> Option<(String, ProbeValue)> {
    let (found, records) = match result {
        ProbeResult::Success { value, winner, trace } => (Some((winner.operation, value)), trace),
        ProbeResult::Exhausted { trace } => (None, trace),
    };
    for mut record in records {
        record.index = trace.len();
        trace.push(record);
    }
    found
}

fn weight_of(value: &ProbeValue) -> Option<Weight> {
    match value.to_data()? {
        Value::Number(n) => n.as_f64().map(Weight::Known),
        _ => None,
    }
}

/// Sólo una tupla admite etiqueta numérica: en una lista `[1.0, 0.5]` es
/// más probable una fila de matriz que un par.
fn pair_of(value: &ProbeValue) -> Option<(String, Weight)> {
    let (parts, numeric_label) = match value {
        ProbeValue::Tuple(items) => (items.clone(), true),
        ProbeValue::List(items) => (items.clone(), false),
        ProbeValue::Data(Value::Array(items)) => (items.iter().cloned().map(ProbeValue::Data).collect(), false),
        _ => return None,
    };
    match parts.as_slice() {
        [ProbeValue::Data(Value::Number(_)), _] if !numeric_label => None,
        [label, weight] => Some((label.label(), weight_of(weight)?)),
        _ => None,
    }
}

/// Lectura como mapping etiqueta -> peso: dict de números o secuencia no
/// vacía de pares.
pub(crate) fn weight_map(value: &ProbeValue, max_items: usize) -> Option<IndexMap<String, Weight>> {
    if let Some(Value::Object(map)) = value.to_data() {
        return map.iter()
                  .take(max_items)
                  .map(|(k, v)| match v {
                      Value::Number(n) => n.as_f64().map(|w| (k.clone(), Weight::Known(w))),
                      _ => None,
                  })
                  .collect();
    }
    let items = value.elements(max_items)?;
    if items.is_empty() {
        return None;
    }
    items.iter().map(pair_of).collect()
}

/// Lectura como secuencia no vacía de pesos.
pub(crate) fn weight_list(value: &ProbeValue, max_items: usize) -> Option<Vec<Weight>> {
    let items = match value.to_data() {
        Some(Value::Array(items)) => items.into_iter().take(max_items).map(ProbeValue::Data).collect(),
        _ => value.elements(max_items)?,
    };
    if items.is_empty() {
        return None;
    }
    items.iter().map(weight_of).collect()
}
