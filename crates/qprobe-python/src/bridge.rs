//! Módulo Python auxiliar (embebido) y conversiones de valores/fallos.

use std::ffi::CString;
use std::sync::OnceLock;

use pyo3::exceptions::PyRuntimeError;
use pyo3::ffi::c_str;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyList, PyModule, PyString, PyTuple};
use qprobe_core::{CallArgs, Fault, Introspect, ProbeValue};
use serde_json::Value;

use crate::target::PyTarget;

static BRIDGE_MODULE: OnceLock<Py<PyModule>> = OnceLock::new();

pub fn init_bridge() -> PyResult<()> {
    Python::attach(|py| {
        if BRIDGE_MODULE.get().is_some() {
            return Ok(());
        }
        let code = CString::new(include_str!("../python/qprobe_bridge.py"))?;
        let module = PyModule::from_code(py, code.as_c_str(), c_str!("qprobe_bridge.py"), c_str!("qprobe_bridge"))?;
        BRIDGE_MODULE.set(module.unbind()).ok();
        Ok(())
    })
}

pub(crate) fn bridge(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    BRIDGE_MODULE.get()
                 .map(|m| m.bind(py).clone())
                 .ok_or_else(|| PyErr::new::<PyRuntimeError, _>("init_bridge() debe llamarse antes de usar PyTarget"))
}

/// Excepción Python -> `Fault` (nombre de la clase + mensaje).
pub(crate) fn fault_from(py: Python<'_>, err: &PyErr) -> Fault {
    let kind = err.get_type(py).name().map(|n| n.to_string()).unwrap_or_else(|_| "Exception".to_string());
    Fault::new(kind, err.value(py).to_string())
}

/// Valor Python -> `ProbeValue`: datos planos como JSON, tuplas como tuplas,
/// todo lo demás como objeto opaco.
pub(crate) fn to_probe(py: Python<'_>, value: &Bound<'_, PyAny>) -> PyResult<ProbeValue> {
    if value.is_none() {
        return Ok(ProbeValue::none());
    }
    if value.is_instance_of::<PyBool>() {
        return Ok(ProbeValue::Data(Value::Bool(value.extract()?)));
    }
    if value.is_instance_of::<PyInt>() {
        if let Ok(i) = value.extract::<i64>() {
            return Ok(ProbeValue::Data(Value::from(i)));
        }
    }
    if value.is_instance_of::<PyFloat>() {
        let f: f64 = value.extract()?;
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Ok(ProbeValue::Data(Value::Number(n)));
        }
    }
    if value.is_instance_of::<PyString>() {
        return Ok(ProbeValue::Data(Value::String(value.extract()?)));
    }
    if let Ok(tuple) = value.downcast::<PyTuple>() {
        let items = tuple.iter().map(|item| to_probe(py, &item)).collect::<PyResult<Vec<_>>>()?;
        return Ok(ProbeValue::Tuple(items));
    }
    if value.is_instance_of::<PyList>() || value.is_instance_of::<PyDict>() {
        let plain = bridge(py)?.getattr("to_plain")?.call1((value,))?;
        if !plain.is_none() {
            let text: String = plain.extract()?;
            if let Ok(data) = serde_json::from_str::<Value>(&text) {
                return Ok(ProbeValue::Data(data));
            }
        }
    }
    Ok(ProbeValue::object(PyTarget::new(value.clone().unbind())))
}

/// `ProbeValue` -> objeto Python. Los objetos deben venir del mismo runtime.
pub(crate) fn to_python<'py>(py: Python<'py>, value: &ProbeValue) -> Result<Bound<'py, PyAny>, Fault> {
    match value {
        ProbeValue::Data(data) => {
            let json = py.import("json").map_err(|e| fault_from(py, &e))?;
            json.call_method1("loads", (data.to_string(),)).map_err(|e| fault_from(py, &e))
        }
        ProbeValue::Tuple(items) => {
            let items = items.iter().map(|v| to_python(py, v)).collect::<Result<Vec<_>, _>>()?;
            PyTuple::new(py, items).map(|t| t.into_any()).map_err(|e| fault_from(py, &e))
        }
        ProbeValue::List(items) => {
            let items = items.iter().map(|v| to_python(py, v)).collect::<Result<Vec<_>, _>>()?;
            PyList::new(py, items).map(|l| l.into_any()).map_err(|e| fault_from(py, &e))
        }
        ProbeValue::Object(obj) => match obj.as_any().downcast_ref::<PyTarget>() {
            Some(target) => Ok(target.object().bind(py).clone()),
            None => Err(Fault::type_error(format!("cannot pass <{}> to Python", obj.type_name()))),
        },
    }
}

/// `CallArgs` -> (tupla posicional, dict de keywords).
pub(crate) fn to_call<'py>(py: Python<'py>, args: &CallArgs) -> Result<(Bound<'py, PyTuple>, Bound<'py, PyDict>), Fault> {
    let positional = args.positional.iter().map(|v| to_python(py, v)).collect::<Result<Vec<_>, _>>()?;
    let positional = PyTuple::new(py, positional).map_err(|e| fault_from(py, &e))?;
    let kwargs = PyDict::new(py);
    for (name, value) in &args.keyword {
        kwargs.set_item(name, to_python(py, value)?).map_err(|e| fault_from(py, &e))?;
    }
    Ok((positional, kwargs))
}
