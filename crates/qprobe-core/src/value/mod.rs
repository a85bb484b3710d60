//! Modelo de valores neutral del motor.
//!
//! Un `ProbeValue` es lo que fluye entre stages: datos planos JSON, tuplas y
//! listas (que el runtime externo puede distinguir) u objetos opacos
//! introspectables.

mod args;
mod fault;
mod introspect;
mod plain;

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

pub use args::{CallArgs, CallSignature};
pub use fault::Fault;
pub use introspect::{Introspect, ObjectRef};
pub use plain::PlainValue;

#[derive(Clone)]
pub enum ProbeValue {
    Data(Value),
    Tuple(Vec<ProbeValue>),
    List(Vec<ProbeValue>),
    Object(ObjectRef),
}

impl ProbeValue {
    pub fn none() -> Self {
        ProbeValue::Data(Value::Null)
    }

    pub fn object(obj: impl Introspect + 'static) -> Self {
        ProbeValue::Object(Rc::new(obj))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ProbeValue::Data(Value::Null))
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            ProbeValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Vista introspectable del valor: el objeto mismo, o un `PlainValue`.
    pub fn as_introspect(&self) -> ObjectRef {
        match self {
            ProbeValue::Object(o) => Rc::clone(o),
            other => Rc::new(PlainValue(other.clone())),
        }
    }

    pub fn as_data(&self) -> Option<&Value> {
        match self {
            ProbeValue::Data(v) => Some(v),
            _ => None,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            ProbeValue::Data(Value::Null) => "null".into(),
            ProbeValue::Data(Value::Bool(_)) => "bool".into(),
            ProbeValue::Data(Value::Number(_)) => "number".into(),
            ProbeValue::Data(Value::String(_)) => "str".into(),
            ProbeValue::Data(Value::Array(_)) => "list".into(),
            ProbeValue::Data(Value::Object(_)) => "dict".into(),
            ProbeValue::Tuple(_) => "tuple".into(),
            ProbeValue::List(_) => "list".into(),
            ProbeValue::Object(o) => o.type_name(),
        }
    }

    /// Descripción estable: JSON compacto para datos, `<Tipo>` para objetos.
    pub fn describe(&self) -> String {
        match self {
            ProbeValue::Data(v) => v.to_string(),
            ProbeValue::Tuple(items) if items.len() == 1 => format!("({},)", items[0].describe()),
            ProbeValue::Tuple(items) => format!("({})", join_described(items)),
            ProbeValue::List(items) => format!("[{}]", join_described(items)),
            ProbeValue::Object(o) => format!("<{}>", o.type_name()),
        }
    }

    /// Vista de datos planos, cuando existe (objetos vía `Introspect::to_data`).
    pub fn to_data(&self) -> Option<Value> {
        match self {
            ProbeValue::Data(v) => Some(v.clone()),
            ProbeValue::Tuple(items) | ProbeValue::List(items) => {
                items.iter().map(ProbeValue::to_data).collect::<Option<Vec<_>>>().map(Value::Array)
            }
            ProbeValue::Object(o) => o.to_data(),
        }
    }

    /// Elementos si el valor es una secuencia; las claves si es un mapping.
    pub fn elements(&self, limit: usize) -> Option<Vec<ProbeValue>> {
        match self {
            ProbeValue::Data(Value::Array(items)) => Some(items.iter().take(limit).cloned().map(ProbeValue::Data).collect()),
            ProbeValue::Data(Value::Object(map)) => {
                Some(map.keys().take(limit).map(|k| ProbeValue::Data(Value::String(k.clone()))).collect())
            }
            ProbeValue::Data(_) => None,
            ProbeValue::Tuple(items) | ProbeValue::List(items) => Some(items.iter().take(limit).cloned().collect()),
            ProbeValue::Object(o) => o.iterate(limit),
        }
    }

    /// Etiqueta de resultado: el string tal cual, JSON compacto para otros
    /// datos, `repr` para objetos.
    pub fn label(&self) -> String {
        match self {
            ProbeValue::Data(Value::String(s)) => s.clone(),
            ProbeValue::Object(o) => o.repr(),
            other => other.describe(),
        }
    }
}

fn join_described(items: &[ProbeValue]) -> String {
    items.iter().map(ProbeValue::describe).collect::<Vec<_>>().join(", ")
}

impl fmt::Debug for ProbeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl PartialEq for ProbeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ProbeValue::Data(a), ProbeValue::Data(b)) => a == b,
            (ProbeValue::Tuple(a), ProbeValue::Tuple(b)) => a == b,
            (ProbeValue::List(a), ProbeValue::List(b)) => a == b,
            (ProbeValue::Object(a), ProbeValue::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Value> for ProbeValue {
    fn from(v: Value) -> Self {
        ProbeValue::Data(v)
    }
}

impl From<ObjectRef> for ProbeValue {
    fn from(o: ObjectRef) -> Self {
        ProbeValue::Object(o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn describe_distinguishes_tuples_and_lists() {
        let t = ProbeValue::Tuple(vec![json!(0).into(), json!(1).into()]);
        let l = ProbeValue::List(vec![json!(0).into(), json!(1).into()]);
        let single = ProbeValue::Tuple(vec![json!("a").into()]);
        assert_eq!(t.describe(), "(0, 1)");
        assert_eq!(l.describe(), "[0, 1]");
        assert_eq!(single.describe(), r#"("a",)"#);
        assert_ne!(t, l);
    }

    #[test]
    fn elements_of_mapping_are_its_keys() {
        let v = ProbeValue::Data(json!({"SLOS": 1, "Naive": 2}));
        let keys: Vec<String> = v.elements(10).unwrap().iter().map(ProbeValue::label).collect();
        assert_eq!(keys, vec!["SLOS", "Naive"]);
        assert!(ProbeValue::Data(json!(3)).elements(10).is_none());
    }
}
