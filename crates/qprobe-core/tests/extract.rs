use qprobe_core::scripted::ScriptedObject;
use qprobe_core::{extract, ExtractionOutcome, Fault, ProbeValue, Shape, Weight};
use serde_json::json;

#[test]
fn scenario_c_plain_mapping_is_returned_unchanged() {
    let ex = extract(&json!({"00": 0.5, "11": 0.5}).into());
    assert!(ex.trace.is_empty());
    match ex.outcome {
        ExtractionOutcome::Distribution { shape, weights } => {
            assert_eq!(shape, Shape::DirectMapping);
            assert_eq!(weights.len(), 2);
            assert_eq!(weights["00"], Weight::Known(0.5));
            assert_eq!(weights["11"], Weight::Known(0.5));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn scenario_d_labels_without_weights_are_unknown_not_zero() {
    let ex = extract(&json!(["00", "11"]).into());
    assert_eq!(ex.outcome.shape(), Some(&Shape::LabelsOnly));
    let weights = ex.outcome.weights().unwrap();
    assert_eq!(weights.keys().collect::<Vec<_>>(), vec!["00", "11"]);
    assert!(weights.values().all(|w| *w == Weight::Unknown));
}

#[test]
fn accessor_attempts_are_traced_in_priority_order() {
    let result = ScriptedObject::new("SampleResult").method("get_counts", |_| Err(Fault::new("QiskitError", "no counts")))
                                                    .method("to_dict", |_| Ok(json!({"0": 7, "1": 1}).into()))
                                                    .build();
    let ex = extract(&ProbeValue::Object(result));
    assert_eq!(ex.outcome.shape(), Some(&Shape::Accessor { name: "to_dict".into() }));
    let ops: Vec<&str> = ex.trace.iter().map(|r| r.operation.as_str()).collect();
    assert_eq!(ops, vec!["get_counts", "as_dict", "to_dict"]);
    assert!(ex.trace[1].is_absent());
}

#[test]
fn iterable_labels_pair_with_weights_accessor() {
    let states = vec![json!("|1,0>").into(), json!("|0,1>").into(), json!("|1,1>").into()];
    let result = ScriptedObject::new("BSDistribution").items(states)
                                                      .method("probs", |_| Ok(json!([0.75, 0.25]).into()))
                                                      .build();
    let ex = extract(&ProbeValue::Object(result));
    match &ex.outcome {
        ExtractionOutcome::Distribution { shape, weights } => {
            // `probs` no es un mapping: falla como accessor y luego empareja
            assert_eq!(shape, &Shape::PairedWeights { accessor: "probs".into() });
            // el zip se detiene en la lista más corta
            assert_eq!(weights.len(), 2);
            assert_eq!(weights["|1,0>"], Weight::Known(0.75));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unrecognized_shape_yields_a_diagnostic() {
    let opaque = ScriptedObject::new("Job").method("status", |_| Ok(json!("DONE").into()))
                                           .repr("<Job id=42>")
                                           .build();
    let ex = extract(&ProbeValue::Object(opaque));
    match ex.outcome {
        ExtractionOutcome::Diagnostic { type_name, members, repr } => {
            assert_eq!(type_name, "Job");
            assert_eq!(members, vec!["status".to_string()]);
            assert_eq!(repr, "<Job id=42>");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(ex.trace.iter().all(|r| r.is_absent()));

    let scalar = extract(&json!(3).into());
    assert!(matches!(scalar.outcome, ExtractionOutcome::Diagnostic { .. }));
}

#[test]
fn numeric_matrix_is_not_read_as_pairs() {
    let ex = extract(&json!([[1.0, 1.0], [1.0, 1.0]]).into());
    assert_ne!(ex.outcome.shape(), Some(&Shape::DirectMapping));
    assert_eq!(ex.outcome.shape(), Some(&Shape::LabelsOnly));
    assert!(ex.outcome.weights().unwrap().values().all(|w| *w == Weight::Unknown));
}
