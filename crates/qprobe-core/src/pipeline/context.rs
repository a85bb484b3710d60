//! Pipeline Context: mapping ordenado stage -> valor producido.
//!
//! Crece monótonamente: a lo sumo una entrada por nombre y nunca se
//! sobrescribe. Pertenece a una única ejecución.

use indexmap::IndexMap;

use crate::errors::ContextError;
use crate::value::ProbeValue;

#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    entries: IndexMap<String, ProbeValue>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contexto inicial con valores sembrados por el caller.
    pub fn seeded(values: impl IntoIterator<Item = (String, ProbeValue)>) -> Self {
        let mut ctx = Self::new();
        for (k, v) in values {
            ctx.entries.entry(k).or_insert(v);
        }
        ctx
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ProbeValue) -> Result<(), ContextError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(ContextError::Duplicate(name));
        }
        self.entries.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ProbeValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entries_are_never_overwritten() {
        let mut ctx = PipelineContext::new();
        ctx.insert("circuit", json!(1).into()).unwrap();
        let err = ctx.insert("circuit", json!(2).into()).unwrap_err();
        assert_eq!(err, ContextError::Duplicate("circuit".into()));
        assert_eq!(ctx.get("circuit"), Some(&ProbeValue::Data(json!(1))));
        assert_eq!(ctx.names().collect::<Vec<_>>(), vec!["circuit"]);
    }
}
