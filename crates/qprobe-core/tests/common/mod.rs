#![allow(dead_code)]

use qprobe_core::scripted::{ScriptedEntries, ScriptedObject};
use qprobe_core::{ArgTemplate, CallTemplate, Fault, ObjectRef, ProbeValue};
use serde_json::{json, Value};

pub fn lit(v: Value) -> ArgTemplate {
    ArgTemplate::Lit(v)
}

pub fn call(args: Vec<ArgTemplate>) -> CallTemplate {
    CallTemplate::new(args)
}

fn circuit_class() -> ProbeValue {
    let class = ScriptedObject::new("type").constructor(|args| {
                                               args.expect_positional(1)?;
                                               let circuit = ScriptedObject::new("Circuit").method("add", |a| {
                                                                                               a.expect_positional(2)?;
                                                                                               Ok(ProbeValue::none())
                                                                                           })
                                                                                           .build();
                                               Ok(ProbeValue::Object(circuit))
                                           })
                                           .build();
    ProbeValue::Object(class)
}

fn backend() -> ProbeValue {
    let result = || {
        ScriptedObject::new("Result").method("get_counts", |_| Ok(json!({"|1,0>": 0.5, "|0,1>": 0.5}).into()))
                                     .build()
    };
    let backend = ScriptedObject::new("SLOSBackend").method("run", move |args| {
                                                        args.expect_positional(1)?;
                                                        Ok(ProbeValue::Object(result()))
                                                    })
                                                    .build();
    ProbeValue::Object(backend)
}

/// Librería con circuito pero sin ninguna forma de obtener un backend.
pub fn bare_library() -> ObjectRef {
    ScriptedObject::new("module").attribute("Circuit", circuit_class())
                                 .attribute("__version__", json!("0.13.1"))
                                 .build()
}

/// Librería completa. `tag` aparece en los mensajes de error, como una
/// dirección de memoria distinta en cada proceso.
pub fn library(tag: u32) -> ObjectRef {
    ScriptedObject::new("module").attribute("Circuit", circuit_class())
                                 .attribute("__version__", json!("0.13.1"))
                                 .attribute("BACKEND_LIST", json!(["Naive", "SLOS"]))
                                 .method("get_backend", move |args| {
                                     args.expect_positional(1)?;
                                     match args.arg(0).and_then(|a| a.as_data()).and_then(|v| v.as_str()) {
                                         Some("SLOS") => Ok(backend()),
                                         Some("Naive") => Ok(ProbeValue::none()),
                                         _ => Err(Fault::new("KeyError", format!("backend lookup failed at 0x{tag:08x}"))),
                                     }
                                 })
                                 .build()
}

pub fn entries(lib: ObjectRef) -> ScriptedEntries {
    ScriptedEntries::new().module("photonic", lib)
}
