//! `PyTarget`: un objeto Python vivo visto a través de `Introspect`.

use std::any::Any;

use pyo3::prelude::*;
use qprobe_core::{CallArgs, Fault, Introspect, ProbeValue};
use serde_json::Value;

use crate::bridge::{bridge, fault_from, to_call, to_probe};

pub struct PyTarget {
    obj: Py<PyAny>,
}

impl PyTarget {
    pub fn new(obj: Py<PyAny>) -> Self {
        Self { obj }
    }

    pub fn object(&self) -> &Py<PyAny> {
        &self.obj
    }
}

fn settle(py: Python<'_>, outcome: PyResult<Bound<'_, PyAny>>) -> Result<ProbeValue, Fault> {
    let value = outcome.map_err(|e| fault_from(py, &e))?;
    to_probe(py, &value).map_err(|e| fault_from(py, &e))
}

impl Introspect for PyTarget {
    fn type_name(&self) -> String {
        Python::attach(|py| {
            self.obj
                .bind(py)
                .get_type()
                .name()
                .map(|n| n.to_string())
                .unwrap_or_else(|_| "object".to_string())
        })
    }

    fn has_member(&self, name: &str) -> bool {
        Python::attach(|py| self.obj.bind(py).hasattr(name).unwrap_or(false))
    }

    fn is_callable(&self, name: &str) -> bool {
        Python::attach(|py| self.obj.bind(py).getattr(name).map(|a| a.is_callable()).unwrap_or(false))
    }

    fn members(&self) -> Vec<String> {
        Python::attach(|py| {
            bridge(py).and_then(|b| b.getattr("public_members")?.call1((self.obj.bind(py),))?.extract::<Vec<String>>())
                      .unwrap_or_default()
        })
    }

    fn get_member(&self, name: &str) -> Result<ProbeValue, Fault> {
        Python::attach(|py| settle(py, self.obj.bind(py).getattr(name)))
    }

    fn invoke(&self, name: &str, args: &CallArgs) -> Result<ProbeValue, Fault> {
        Python::attach(|py| {
            let member = self.obj.bind(py).getattr(name).map_err(|e| fault_from(py, &e))?;
            let (positional, kwargs) = to_call(py, args)?;
            settle(py, member.call(positional, Some(&kwargs)))
        })
    }

    fn call(&self, args: &CallArgs) -> Result<ProbeValue, Fault> {
        Python::attach(|py| {
            let (positional, kwargs) = to_call(py, args)?;
            settle(py, self.obj.bind(py).call(positional, Some(&kwargs)))
        })
    }

    fn to_data(&self) -> Option<Value> {
        Python::attach(|py| {
            let plain = bridge(py).ok()?.getattr("to_plain").ok()?.call1((self.obj.bind(py),)).ok()?;
            let text: String = plain.extract().ok()?;
            serde_json::from_str(&text).ok()
        })
    }

    fn iterate(&self, limit: usize) -> Option<Vec<ProbeValue>> {
        Python::attach(|py| {
            let bound = self.obj.bind(py);
            if bound.is_instance_of::<pyo3::types::PyString>() {
                return None;
            }
            let iter = bound.try_iter().ok()?;
            let mut items = Vec::new();
            for item in iter.take(limit) {
                items.push(to_probe(py, &item.ok()?).ok()?);
            }
            Some(items)
        })
    }

    fn repr(&self) -> String {
        Python::attach(|py| {
            self.obj
                .bind(py)
                .str()
                .map(|s| s.to_string())
                .unwrap_or_else(|_| format!("<{}>", self.type_name()))
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
