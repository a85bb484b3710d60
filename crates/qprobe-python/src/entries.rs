//! Resolución de entry points importando módulos Python.

use std::path::PathBuf;
use std::rc::Rc;

use log::{debug, warn};
use pyo3::prelude::*;
use qprobe_core::{EntryResolver, EntrySpec, Fault, ObjectRef};

use crate::bridge::{bridge, fault_from};
use crate::target::PyTarget;

/// Importa la primera alternativa disponible. `modulo:atributo` importa el
/// módulo y luego recorre el atributo (con puntos).
#[derive(Debug, Default)]
pub struct PythonEntries {
    extra_paths: Vec<PathBuf>,
    paths_applied: bool,
}

impl PythonEntries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rutas antepuestas a `sys.path` antes del primer import.
    pub fn with_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self { extra_paths: paths.into_iter().collect(),
               paths_applied: false }
    }

    fn apply_paths(&mut self, py: Python<'_>) -> Result<(), Fault> {
        if self.paths_applied || self.extra_paths.is_empty() {
            return Ok(());
        }
        let sys_path = py.import("sys").and_then(|s| s.getattr("path")).map_err(|e| fault_from(py, &e))?;
        for path in self.extra_paths.iter().rev() {
            let text = path.to_string_lossy().to_string();
            sys_path.call_method1("insert", (0, text)).map_err(|e| fault_from(py, &e))?;
        }
        self.paths_applied = true;
        Ok(())
    }

    fn import_one(py: Python<'_>, target: &str) -> Result<ObjectRef, Fault> {
        let (module, attribute) = match target.split_once(':') {
            Some((m, a)) => (m, Some(a)),
            None => (target, None),
        };
        let imported = py.import(module).map_err(|e| fault_from(py, &e))?.into_any();
        let object = match attribute {
            Some(path) => bridge(py).and_then(|b| b.getattr("resolve_attribute")?.call1((imported, path)))
                                    .map_err(|e| fault_from(py, &e))?,
            None => imported,
        };
        Ok(Rc::new(PyTarget::new(object.unbind())))
    }
}

impl EntryResolver for PythonEntries {
    fn resolve(&mut self, entry: &EntrySpec) -> Result<ObjectRef, Fault> {
        Python::attach(|py| {
            self.apply_paths(py)?;
            let mut last = Fault::new("ModuleNotFoundError", format!("entry '{}' declares no modules", entry.name));
            for target in &entry.modules {
                match Self::import_one(py, target) {
                    Ok(obj) => {
                        debug!("entry {}: imported {target}", entry.name);
                        return Ok(obj);
                    }
                    Err(fault) => {
                        warn!("entry {}: {target} unavailable ({fault})", entry.name);
                        last = fault;
                    }
                }
            }
            Err(last)
        })
    }
}
