//! Vista `Introspect` de un valor que no es un objeto externo.
//!
//! Permite sondear datos planos (un dict ya convertido, una lista de
//! etiquetas) con el mismo prober: no expone miembros, pero sí su vista de
//! datos y sus elementos.

use std::any::Any;

use serde_json::Value;

use super::{CallArgs, Fault, Introspect, ProbeValue};

#[derive(Debug, Clone)]
pub struct PlainValue(pub ProbeValue);

impl Introspect for PlainValue {
    fn type_name(&self) -> String {
        self.0.type_name()
    }

    fn has_member(&self, _name: &str) -> bool {
        false
    }

    fn is_callable(&self, _name: &str) -> bool {
        false
    }

    fn members(&self) -> Vec<String> {
        Vec::new()
    }

    fn get_member(&self, name: &str) -> Result<ProbeValue, Fault> {
        Err(Fault::missing_member(&self.type_name(), name))
    }

    fn invoke(&self, name: &str, _args: &CallArgs) -> Result<ProbeValue, Fault> {
        Err(Fault::missing_member(&self.type_name(), name))
    }

    fn to_data(&self) -> Option<Value> {
        self.0.to_data()
    }

    fn iterate(&self, limit: usize) -> Option<Vec<ProbeValue>> {
        self.0.elements(limit)
    }

    fn repr(&self) -> String {
        self.0.describe()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
