//! Librería fotónica guionada para `qprobe demo`.
//!
//! Imita la superficie que el plan `perceval` espera encontrar, con las
//! mismas asperezas que obligan a sondear: `Circuit.add` sólo acepta
//! `(puerto, componente)`, `get_backend` rechaza los nombres largos y el
//! simulador no da probabilidades hasta tener un circuito asignado.

use std::cell::Cell;
use std::rc::Rc;

use qprobe_core::scripted::{ScriptedEntries, ScriptedObject};
use qprobe_core::{CallArgs, Fault, ObjectRef, ProbeValue};
use serde_json::{json, Value};

/// Nombre de módulo bajo el que se registra la librería.
pub const DEMO_MODULE: &str = "perceval";
pub const DEMO_VERSION: &str = "0.13.2";

fn class<F>(make: F) -> ProbeValue
    where F: Fn(&CallArgs) -> Result<ProbeValue, Fault> + 'static
{
    ProbeValue::Object(ScriptedObject::new("type").constructor(make).build())
}

fn circuit(modes: u64) -> ProbeValue {
    let circuit = ScriptedObject::new("Circuit").method("add", |args| {
                                                    args.expect_positional(2)?;
                                                    match args.arg(1) {
                                                        Some(ProbeValue::Object(_)) => Ok(ProbeValue::none()),
                                                        _ => Err(Fault::type_error("add() expects a component")),
                                                    }
                                                })
                                                .method("compose", |args| {
                                                    args.expect_positional(1)?;
                                                    Ok(ProbeValue::none())
                                                })
                                                .attribute("m", json!(modes))
                                                .repr(format!("Circuit({modes})"))
                                                .build();
    ProbeValue::Object(circuit)
}

fn basic_state(occupation: &[Value]) -> ProbeValue {
    let rendered: Vec<String> = occupation.iter().map(Value::to_string).collect();
    let repr = format!("|{}>", rendered.join(","));
    ProbeValue::Object(ScriptedObject::new("BasicState").data(Value::String(repr.clone()))
                                                        .repr(repr)
                                                        .build())
}

fn distribution() -> ProbeValue {
    let dist = ScriptedObject::new("BSDistribution").method("as_dict", |args| {
                                                        args.expect_positional(0)?;
                                                        Ok(json!({"|1,0>": 0.5, "|0,1>": 0.5}).into())
                                                    })
                                                    .repr("BSDistribution(2 states)")
                                                    .build();
    ProbeValue::Object(dist)
}

fn simulator() -> ProbeValue {
    let bound = Rc::new(Cell::new(false));
    let on_set = bound.clone();
    let sim = ScriptedObject::new("Simulator").method("set_circuit", move |args| {
                                                  args.expect_positional(1)?;
                                                  match args.arg(0) {
                                                      Some(c) if c.type_name() == "Circuit" => {
                                                          on_set.set(true);
                                                          Ok(ProbeValue::none())
                                                      }
                                                      _ => Err(Fault::type_error("set_circuit() expects a Circuit")),
                                                  }
                                              })
                                              .method("probs", move |args| {
                                                  args.expect_positional(1)?;
                                                  if !bound.get() {
                                                      return Err(Fault::new("RuntimeError", "no circuit set"));
                                                  }
                                                  Ok(distribution())
                                              })
                                              .build();
    ProbeValue::Object(sim)
}

fn backend() -> ProbeValue {
    ProbeValue::Object(ScriptedObject::new("SLOSBackend").repr("SLOSBackend").build())
}

fn backend_factory() -> ProbeValue {
    let factory = ScriptedObject::new("BackendFactory").method("get_backend", |args| {
                                                           args.expect_positional(1)?;
                                                           match args.arg(0).and_then(|a| a.as_data()).and_then(Value::as_str) {
                                                               Some("SLOS") => Ok(backend()),
                                                               Some("Naive") => Ok(ProbeValue::none()),
                                                               Some(other) => Err(Fault::new("KeyError", format!("'{other}'"))),
                                                               None => Err(Fault::type_error("backend name must be str")),
                                                           }
                                                       })
                                                       .method("list", |_| Ok(json!(["SLOS", "Naive"]).into()))
                                                       .build();
    ProbeValue::Object(factory)
}

/// Módulo `perceval` guionado.
pub fn photonic_library() -> ObjectRef {
    ScriptedObject::new("module").attribute("__version__", json!(DEMO_VERSION))
                                 .attribute("Circuit",
                                            class(|args| {
                                                args.expect_positional(1)?;
                                                match args.arg(0).and_then(|a| a.as_data()).and_then(Value::as_u64) {
                                                    Some(m) if m > 0 => Ok(circuit(m)),
                                                    _ => Err(Fault::new("ValueError", "number of modes must be a positive int")),
                                                }
                                            }))
                                 .attribute("BS",
                                            class(|args| {
                                                args.expect_positional(0)?;
                                                Ok(ProbeValue::Object(ScriptedObject::new("BS").repr("BS()").build()))
                                            }))
                                 .attribute("BasicState",
                                            class(|args| {
                                                args.expect_positional(1)?;
                                                match args.arg(0).and_then(|a| a.as_data()) {
                                                    Some(Value::Array(occupation)) => Ok(basic_state(occupation)),
                                                    _ => Err(Fault::type_error("BasicState expects a list of occupations")),
                                                }
                                            }))
                                 .attribute("BackendFactory",
                                            class(|args| {
                                                args.expect_positional(0)?;
                                                Ok(backend_factory())
                                            }))
                                 .attribute("BACKEND_LIST", json!(["Naive", "SLOS"]))
                                 .attribute("Simulator",
                                            class(|args| {
                                                args.expect_positional(1)?;
                                                Ok(simulator())
                                            }))
                                 .repr("<module 'perceval' (scripted)>")
                                 .build()
}

pub fn demo_entries() -> ScriptedEntries {
    ScriptedEntries::new().module(DEMO_MODULE, photonic_library())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qprobe_core::Introspect;

    #[test]
    fn simulator_needs_a_circuit_first() {
        let lib = photonic_library();
        let backend = lib.invoke("BackendFactory", &CallArgs::empty())
                         .unwrap()
                         .as_introspect()
                         .invoke("get_backend", &CallArgs::positional(vec![json!("SLOS").into()]))
                         .unwrap();
        let sim = lib.invoke("Simulator", &CallArgs::positional(vec![backend])).unwrap().as_introspect();
        let state = lib.invoke("BasicState", &CallArgs::positional(vec![json!([1, 0]).into()])).unwrap();

        let err = sim.invoke("probs", &CallArgs::positional(vec![state.clone()])).unwrap_err();
        assert_eq!(err.kind, "RuntimeError");

        let circuit = lib.invoke("Circuit", &CallArgs::positional(vec![json!(2).into()])).unwrap();
        sim.invoke("set_circuit", &CallArgs::positional(vec![circuit])).unwrap();
        let dist = sim.invoke("probs", &CallArgs::positional(vec![state])).unwrap();
        assert_eq!(dist.type_name(), "BSDistribution");
    }

    #[test]
    fn basic_state_repr_is_ket() {
        let lib = photonic_library();
        let state = lib.invoke("BasicState", &CallArgs::positional(vec![json!([1, 0]).into()])).unwrap();
        assert_eq!(state.as_introspect().repr(), "|1,0>");
    }
}
