use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Fault, ProbeValue};

/// Argumentos concretos de una llamada: posicionales + keywords en orden.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<ProbeValue>,
    pub keyword: IndexMap<String, ProbeValue>,
}

impl CallArgs {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn positional(values: Vec<ProbeValue>) -> Self {
        Self { positional: values,
               keyword: IndexMap::new() }
    }

    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<ProbeValue>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn arg(&self, index: usize) -> Option<&ProbeValue> {
        self.positional.get(index)
    }

    pub fn kwarg(&self, name: &str) -> Option<&ProbeValue> {
        self.keyword.get(name)
    }

    /// Falla como `TypeError` si no hay exactamente `n` posicionales (y ningún keyword).
    pub fn expect_positional(&self, n: usize) -> Result<(), Fault> {
        if self.positional.len() != n || !self.keyword.is_empty() {
            return Err(Fault::type_error(format!("takes {n} positional arguments but {} were given", self.len())));
        }
        Ok(())
    }

    /// Descripción serializable usada en los registros de intentos.
    pub fn signature(&self) -> CallSignature {
        CallSignature { args: self.positional.iter().map(ProbeValue::describe).collect(),
                        kwargs: self.keyword
                                    .iter()
                                    .map(|(k, v)| (k.clone(), v.describe()))
                                    .collect() }
    }
}

/// Forma textual estable de unos `CallArgs` (sin direcciones de memoria).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSignature {
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub kwargs: IndexMap<String, String>,
}

impl fmt::Display for CallSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.args.clone();
        parts.extend(self.kwargs.iter().map(|(k, v)| format!("{k}={v}")));
        write!(f, "({})", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signature_renders_positional_then_keywords() {
        let args = CallArgs::positional(vec![json!("default.qubit").into(),
                                             ProbeValue::Tuple(vec![json!(0).into(), json!(1).into()])]).with_kwarg("wires", json!(1));
        assert_eq!(args.signature().to_string(), r#"("default.qubit", (0, 1), wires=1)"#);
        assert_eq!(args.len(), 3);
    }
}
