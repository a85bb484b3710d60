//! Entry points de librería: símbolos externos declarados estáticamente por
//! el plan (un módulo, una clase, una factory) y resueltos como mucho una
//! vez por ejecución.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::{Fault, ObjectRef};

fn required_by_default() -> bool {
    true
}

/// Declaración de un entry point con nombres alternativos, en orden de preferencia.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySpec {
    pub name: String,
    pub modules: Vec<String>,
    /// Si no se puede obtener un entry requerido la ejecución se aborta.
    #[serde(default = "required_by_default")]
    pub required: bool,
}

impl EntrySpec {
    pub fn required(name: impl Into<String>, modules: &[&str]) -> Self {
        Self { name: name.into(),
               modules: modules.iter().map(|m| m.to_string()).collect(),
               required: true }
    }

    pub fn optional(name: impl Into<String>, modules: &[&str]) -> Self {
        Self { required: false,
               ..Self::required(name, modules) }
    }
}

/// Obtiene el objeto vivo detrás de un entry point (importar un módulo, ...).
pub trait EntryResolver {
    fn resolve(&mut self, entry: &EntrySpec) -> Result<ObjectRef, Fault>;
}

/// Entry point no disponible.
#[derive(Debug, Clone)]
pub struct EntryFailure {
    pub entry: String,
    pub fault: Fault,
    pub required: bool,
}

/// Cache por ejecución: cada entry se resuelve (o falla) una sola vez.
pub(crate) struct EntryCache<'r> {
    resolver: &'r mut dyn EntryResolver,
    specs: &'r IndexMap<String, EntrySpec>,
    resolved: HashMap<String, Result<ObjectRef, Fault>>,
}

impl<'r> EntryCache<'r> {
    pub(crate) fn new(resolver: &'r mut dyn EntryResolver, specs: &'r IndexMap<String, EntrySpec>) -> Self {
        Self { resolver,
               specs,
               resolved: HashMap::new() }
    }

    pub(crate) fn get(&mut self, name: &str) -> Result<ObjectRef, EntryFailure> {
        let specs = self.specs;
        let Some(spec) = specs.get(name) else {
            return Err(EntryFailure { entry: name.to_string(),
                                      fault: Fault::new("UndeclaredEntry", format!("entry '{name}' is not declared")),
                                      required: true });
        };
        let resolver = &mut *self.resolver;
        let outcome = self.resolved
                          .entry(name.to_string())
                          .or_insert_with(|| {
                              let r = resolver.resolve(spec);
                              match &r {
                                  Ok(o) => log::debug!("entry {name}: resolved as {}", o.type_name()),
                                  Err(f) => log::warn!("entry {name}: unavailable ({f})"),
                              }
                              r
                          });
        outcome.clone().map_err(|fault| EntryFailure { entry: name.to_string(),
                                                       fault,
                                                       required: spec.required })
    }
}
