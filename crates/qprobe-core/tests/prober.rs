use std::rc::Rc;

use qprobe_core::scripted::ScriptedObject;
use qprobe_core::{probe, Accept, AttemptOutcome, CallArgs, Candidate, CapabilityProber, Fault, ProbeResult, ProbeValue};
use serde_json::json;

fn component() -> ProbeValue {
    ProbeValue::Object(ScriptedObject::new("BS").build())
}

/// `add(x, y)` sólo funciona con `(componente, (0, 1))`; cada llamada muta el circuito.
fn circuit() -> Rc<ScriptedObject> {
    ScriptedObject::new("Circuit").method("add", |args| {
                                      args.expect_positional(2)?;
                                      match args.arg(1) {
                                          Some(ProbeValue::Tuple(ports)) if ports.len() == 2 => Ok(ProbeValue::none()),
                                          Some(other) => Err(Fault::type_error(format!("invalid port {}", other.describe()))),
                                          None => Err(Fault::type_error("missing port")),
                                      }
                                  })
                                  .build()
}

#[test]
fn scenario_a_third_calling_convention_wins() {
    let target = circuit();
    let c = component();
    let candidates = vec![Candidate::call("add",
                                          vec![CallArgs::positional(vec![c.clone()]),
                                               CallArgs::positional(vec![c.clone(), json!(0).into()]),
                                               CallArgs::positional(vec![c.clone(),
                                                                         ProbeValue::Tuple(vec![json!(0).into(),
                                                                                                json!(1).into()])])])];

    let result = probe(target.as_ref(), &candidates);
    let trace = result.trace();
    assert!(result.is_success());
    assert_eq!(trace.len(), 3);
    assert!(trace[0].is_failure() && trace[1].is_failure());
    assert!(trace[2].is_success());
    assert_eq!(result.winner().map(|w| w.index), Some(2));
    assert_eq!(result.winner().map(|w| w.call_text()), Some("add(<BS>, (0, 1))".to_string()));
    // los intentos fallidos también llegaron al target: no hay rollback
    assert_eq!(target.call_count("add"), 3);
}

#[test]
fn scenario_b_no_candidate_present() {
    let target = ScriptedObject::new("Thing").build();
    let candidates = vec![Candidate::call("get_backend", vec![CallArgs::empty()]),
                          Candidate::read("backends"),
                          Candidate::auto("BackendFactory")];
    let result = probe(target.as_ref(), &candidates);
    assert!(!result.is_success());
    assert_eq!(result.trace().len(), 3);
    assert!(result.trace().iter().all(|r| r.is_absent()));
    assert!(target.calls().is_empty());
}

#[test]
fn first_success_gives_trace_of_one_and_the_returned_value() {
    let target = ScriptedObject::new("Lib").method("version", |_| Ok(json!("1.2").into())).build();
    let result = probe(target.as_ref(), &[Candidate::call("version", vec![CallArgs::empty()])]);
    assert_eq!(result.trace().len(), 1);
    assert_eq!(result.value(), Some(&ProbeValue::Data(json!("1.2"))));
}

#[test]
fn exhaustion_trace_counts_present_pairs_plus_absences() {
    let target = ScriptedObject::new("Lib").method("a", |_| Err(Fault::new("RuntimeError", "boom")))
                                           .method("b", |_| Err(Fault::type_error("nope")))
                                           .build();
    let calls = |n: usize| (0..n).map(|i| CallArgs::positional(vec![json!(i).into()])).collect::<Vec<_>>();
    let candidates = vec![Candidate::call("a", calls(3)),
                          Candidate::call("missing", calls(4)),
                          Candidate::call("b", calls(2)),
                          Candidate::call("gone", calls(1))];

    match probe(target.as_ref(), &candidates) {
        ProbeResult::Exhausted { trace } => {
            assert_eq!(trace.len(), 3 + 2 + 2);
            assert_eq!(trace.iter().filter(|r| r.is_absent()).count(), 2);
            assert!(trace.iter().enumerate().all(|(i, r)| r.index == i));
            let ops: Vec<&str> = trace.iter().map(|r| r.operation.as_str()).collect();
            assert_eq!(ops, vec!["a", "a", "a", "missing", "b", "b", "gone"]);
        }
        ProbeResult::Success { .. } => panic!("every call fails"),
    }
}

#[test]
fn none_from_a_factory_is_not_a_success_under_non_null() {
    let target = ScriptedObject::new("BackendFactory").method("get_backend", |args| {
                                                          match args.arg(0).and_then(|a| a.as_data()) {
                                                              Some(name) if name == "SLOS" => Ok(json!({"name": "SLOS"}).into()),
                                                              _ => Ok(ProbeValue::none()),
                                                          }
                                                      })
                                                      .build();
    let candidate = Candidate::call("get_backend",
                                    vec![CallArgs::positional(vec![json!("Naive").into()]),
                                         CallArgs::positional(vec![json!("SLOS").into()])]).accepting(Accept::NonNull);
    let result = probe(target.as_ref(), &[candidate]);
    assert!(result.is_success());
    let first = &result.trace()[0];
    assert_eq!(first.fault().map(|f| f.kind.as_str()), Some("Rejected"));
}

#[test]
fn read_access_is_a_single_attempt_and_auto_reads_plain_attributes() {
    let target = ScriptedObject::new("module").attribute("__version__", json!("0.13.1")).build();
    let result = probe(target.as_ref(), &[Candidate::auto("__version__")]);
    let winner = result.winner().cloned().expect("attribute read");
    assert_eq!(winner.signature, None);
    assert_eq!(winner.call_text(), "__version__");
    assert!(matches!(winner.outcome, AttemptOutcome::Succeeded { ref summary } if summary == "\"0.13.1\""));
}

#[test]
fn mapping_acceptance_uses_the_configured_item_limit() {
    let target = ScriptedObject::new("Result").method("get_counts", |_| Ok(json!({"00": 5, "11": 3}).into())).build();
    let prober = CapabilityProber::new().with_max_items(1);
    let result = prober.probe(target.as_ref(), &[Candidate::auto("get_counts").accepting(Accept::Mapping)]);
    assert!(result.is_success());
    assert_eq!(prober.max_items(), 1);
}
