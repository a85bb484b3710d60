//! Objetos y entry points guionados, escritos en Rust.
//!
//! Sirven para ejercitar el motor sin un runtime externo: cada método es un
//! closure que decide si la firma recibida "funciona" y qué devuelve. Los
//! objetos registran cada invocación para poder verificar efectos laterales
//! (por ejemplo, mutaciones parciales de un circuito).

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::pipeline::{EntryResolver, EntrySpec};
use crate::value::{CallArgs, CallSignature, Fault, Introspect, ObjectRef, ProbeValue};

type Method = Box<dyn Fn(&CallArgs) -> Result<ProbeValue, Fault>>;

pub struct ScriptedObject {
    type_name: String,
    methods: IndexMap<String, Method>,
    attributes: IndexMap<String, ProbeValue>,
    constructor: Option<Method>,
    data: Option<Value>,
    items: Option<Vec<ProbeValue>>,
    repr: Option<String>,
    log: RefCell<Vec<(String, CallSignature)>>,
}

impl ScriptedObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(),
               methods: IndexMap::new(),
               attributes: IndexMap::new(),
               constructor: None,
               data: None,
               items: None,
               repr: None,
               log: RefCell::new(Vec::new()) }
    }

    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
        where F: Fn(&CallArgs) -> Result<ProbeValue, Fault> + 'static
    {
        self.methods.insert(name.into(), Box::new(f));
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<ProbeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Comportamiento al invocar el objeto mismo (clases, factories).
    pub fn constructor<F>(mut self, f: F) -> Self
        where F: Fn(&CallArgs) -> Result<ProbeValue, Fault> + 'static
    {
        self.constructor = Some(Box::new(f));
        self
    }

    pub fn data(mut self, value: Value) -> Self {
        self.data = Some(value);
        self
    }

    pub fn items(mut self, items: Vec<ProbeValue>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn repr(mut self, repr: impl Into<String>) -> Self {
        self.repr = Some(repr.into());
        self
    }

    pub fn build(self) -> Rc<ScriptedObject> {
        Rc::new(self)
    }

    /// Invocaciones recibidas, en orden (incluye las que fallaron).
    pub fn calls(&self) -> Vec<(String, CallSignature)> {
        self.log.borrow().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.log.borrow().iter().filter(|(n, _)| n == name).count()
    }

    fn record(&self, name: &str, args: &CallArgs) {
        self.log.borrow_mut().push((name.to_string(), args.signature()));
    }
}

impl Introspect for ScriptedObject {
    fn type_name(&self) -> String {
        self.type_name.clone()
    }

    fn has_member(&self, name: &str) -> bool {
        self.methods.contains_key(name) || self.attributes.contains_key(name)
    }

    fn is_callable(&self, name: &str) -> bool {
        self.methods.contains_key(name)
        || matches!(self.attributes.get(name), Some(ProbeValue::Object(o)) if o.as_any().downcast_ref::<ScriptedObject>().is_some_and(|s| s.constructor.is_some()))
    }

    fn members(&self) -> Vec<String> {
        self.methods.keys().chain(self.attributes.keys()).cloned().collect()
    }

    fn get_member(&self, name: &str) -> Result<ProbeValue, Fault> {
        if let Some(v) = self.attributes.get(name) {
            return Ok(v.clone());
        }
        if self.methods.contains_key(name) {
            return Ok(ProbeValue::Data(Value::String(format!("<bound method {}.{}>", self.type_name, name))));
        }
        Err(Fault::missing_member(&self.type_name, name))
    }

    fn invoke(&self, name: &str, args: &CallArgs) -> Result<ProbeValue, Fault> {
        if let Some(m) = self.methods.get(name) {
            self.record(name, args);
            return m(args);
        }
        match self.attributes.get(name) {
            Some(ProbeValue::Object(o)) => {
                self.record(name, args);
                o.call(args)
            }
            Some(other) => Err(Fault::not_callable(&other.type_name())),
            None => Err(Fault::missing_member(&self.type_name, name)),
        }
    }

    fn call(&self, args: &CallArgs) -> Result<ProbeValue, Fault> {
        match &self.constructor {
            Some(c) => c(args),
            None => Err(Fault::not_callable(&self.type_name)),
        }
    }

    fn to_data(&self) -> Option<Value> {
        self.data.clone()
    }

    fn iterate(&self, limit: usize) -> Option<Vec<ProbeValue>> {
        self.items.as_ref().map(|items| items.iter().take(limit).cloned().collect())
    }

    fn repr(&self) -> String {
        self.repr.clone().unwrap_or_else(|| format!("<{}>", self.type_name))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Resolver de entry points sobre un registro en memoria de "módulos".
#[derive(Default)]
pub struct ScriptedEntries {
    modules: IndexMap<String, ObjectRef>,
}

impl ScriptedEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, name: impl Into<String>, object: ObjectRef) -> Self {
        self.modules.insert(name.into(), object);
        self
    }
}

impl EntryResolver for ScriptedEntries {
    fn resolve(&mut self, entry: &EntrySpec) -> Result<ObjectRef, Fault> {
        entry.modules
             .iter()
             .find_map(|m| self.modules.get(m).cloned())
             .ok_or_else(|| Fault::new("ModuleNotFoundError", format!("No module named '{}'", entry.modules.join("' or '"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attribute_objects_with_constructor_are_invocable() {
        let bs = ScriptedObject::new("BS").build();
        let bs_class = ScriptedObject::new("type").constructor(move |args| {
                                                       args.expect_positional(0)?;
                                                       Ok(ProbeValue::Object(bs.clone()))
                                                   })
                                                   .build();
        let module = ScriptedObject::new("module").attribute("BS", ProbeValue::Object(bs_class))
                                                  .attribute("__version__", json!("0.13.0"))
                                                  .build();

        assert!(module.is_callable("BS"));
        assert!(!module.is_callable("__version__"));
        let made = module.invoke("BS", &CallArgs::empty()).expect("BS() should construct");
        assert_eq!(made.type_name(), "BS");
        let err = module.invoke("BS", &CallArgs::positional(vec![json!(1).into()])).unwrap_err();
        assert_eq!(err.kind, "TypeError");
        assert_eq!(module.call_count("BS"), 2);
    }
}
