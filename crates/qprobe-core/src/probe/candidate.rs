use serde::{Deserialize, Serialize};

use crate::extract::{weight_list, weight_map};
use crate::value::{CallArgs, Fault, Introspect, ProbeValue};

/// Cómo se ejerce una operación candidata sobre el target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Invocar el miembro con cada plantilla de argumentos.
    #[default]
    Call,
    /// Leer el atributo (un único intento, sin argumentos).
    Read,
    /// Invocar si es invocable; si no, leer.
    Auto,
}

impl Access {
    /// Resuelve `Auto` contra el target concreto.
    pub fn resolve(self, target: &dyn Introspect, operation: &str) -> Access {
        match self {
            Access::Auto if target.is_callable(operation) => Access::Call,
            Access::Auto => Access::Read,
            other => other,
        }
    }
}

/// Criterio para considerar exitoso un valor devuelto sin fallo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accept {
    #[default]
    Any,
    /// Un `None`/`null` devuelto cuenta como "no obtenido".
    NonNull,
    /// Debe poder leerse como mapping etiqueta -> peso.
    Mapping,
    /// Debe poder leerse como secuencia de pesos.
    Sequence,
}

impl Accept {
    pub fn check(self, value: &ProbeValue, max_items: usize) -> Result<(), Fault> {
        match self {
            Accept::Any => Ok(()),
            Accept::NonNull if value.is_none() => Err(Fault::rejected("returned None")),
            Accept::NonNull => Ok(()),
            Accept::Mapping if weight_map(value, max_items).is_some() => Ok(()),
            Accept::Mapping => Err(Fault::rejected(format!("{} is not a label -> weight mapping", value.type_name()))),
            Accept::Sequence if weight_list(value, max_items).is_some() => Ok(()),
            Accept::Sequence => Err(Fault::rejected(format!("{} is not a sequence of weights", value.type_name()))),
        }
    }
}

/// Candidato concreto: nombre de operación + plantillas de llamada ya resueltas.
/// Inmutable una vez construido.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub operation: String,
    pub access: Access,
    pub accept: Accept,
    pub calls: Vec<CallArgs>,
}

impl Candidate {
    pub fn call(operation: impl Into<String>, calls: Vec<CallArgs>) -> Self {
        Self { operation: operation.into(),
               access: Access::Call,
               accept: Accept::Any,
               calls }
    }

    pub fn read(operation: impl Into<String>) -> Self {
        Self { operation: operation.into(),
               access: Access::Read,
               accept: Accept::Any,
               calls: vec![CallArgs::empty()] }
    }

    /// Llama si es invocable (sin argumentos), si no lee el atributo.
    pub fn auto(operation: impl Into<String>) -> Self {
        Self { operation: operation.into(),
               access: Access::Auto,
               accept: Accept::Any,
               calls: vec![CallArgs::empty()] }
    }

    pub fn accepting(mut self, accept: Accept) -> Self {
        self.accept = accept;
        self
    }
}
