use std::fs;

use qprobe_core::scripted::{ScriptedEntries, ScriptedObject};
use qprobe_core::{CapabilityProber, ExitStatus, PipelineContext, ProbeValue, SkipReason, StageOutcome};
use qprobe_plans::{catalog, load_dir, load_plan, resolve, PlanError, PlanSource};
use serde_json::json;

#[test]
fn every_builtin_plan_parses_and_validates() {
    for name in catalog::names() {
        let plan = catalog::builtin(name).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(plan.name(), name);
        assert_eq!(plan.source, PlanSource::Builtin);
        assert_eq!(plan.digest.len(), 64);
        plan.build().unwrap_or_else(|e| panic!("{name}: {e}"));
    }
    assert_eq!(catalog::all().unwrap().len(), catalog::names().len());
}

#[test]
fn prober_settings_do_not_change_the_definition() {
    let plan = catalog::builtin("perceval").unwrap();
    let default = plan.build().unwrap();
    let bounded = plan.build_with(CapabilityProber::new().with_max_items(8)).unwrap();
    assert_eq!(default.definition_hash(), bounded.definition_hash());
    assert_eq!(default.stage_names(), bounded.stage_names());
}

#[test]
fn unknown_plan_is_an_error() {
    assert!(matches!(catalog::builtin("tensorflow-quantum"), Err(PlanError::Unknown(_))));
}

#[test]
fn plans_without_their_library_abort_as_import_failures() {
    for name in ["perceval", "qiskit", "pennylane", "cuquantum"] {
        let mut pipeline = catalog::builtin(name).unwrap().build().unwrap();
        let report = pipeline.run(&mut ScriptedEntries::new(), PipelineContext::new());
        assert!(report.fatal.is_some(), "{name}");
        assert_eq!(report.exit_status(), ExitStatus::ImportFailure, "{name}");
    }
    // dl_stack sólo declara entries opcionales: nada aborta
    let mut dl = catalog::builtin("dl_stack").unwrap().build().unwrap();
    let report = dl.run(&mut ScriptedEntries::new(), PipelineContext::new());
    assert!(report.fatal.is_none());
    assert!(report.stages.iter().all(|s| s.outcome.is_skipped()));
    assert_eq!(report.exit_status(), ExitStatus::ImportFailure);
}

#[test]
fn cuquantum_falls_back_to_numpy_and_ends_on_the_raw_matrix() {
    let cq = ScriptedObject::new("module").attribute("__version__", json!("24.08.0")).build();
    let ndarray = || {
        ScriptedObject::new("ndarray").method("tolist", |_| Ok(json!([[1.0, 1.0], [1.0, 1.0]]).into()))
                                      .build()
    };
    let np = ScriptedObject::new("module").method("ones", |_| Ok(json!([[1.0, 1.0], [1.0, 1.0]]).into()))
                                          .method("eye", |_| Ok(json!([[1.0, 0.0], [0.0, 1.0]]).into()))
                                          .method("einsum", move |args| {
                                              args.expect_positional(3)?;
                                              Ok(ProbeValue::Object(ndarray()))
                                          })
                                          .build();
    let mut entries = ScriptedEntries::new().module("cuquantum", cq).module("numpy", np);

    let mut pipeline = catalog::builtin("cuquantum").unwrap().build().unwrap();
    let (report, ctx) = pipeline.run_with_context(&mut entries, PipelineContext::new());

    assert_eq!(report.terminal().map(|t| t.stage.as_str()), Some("values"));
    assert!(matches!(report.stage("library_version").unwrap().outcome,
                     StageOutcome::Skipped(SkipReason::EntryUnavailable { .. })));
    let contraction = report.stage("contraction").unwrap();
    assert!(contraction.outcome.is_success());
    // einsum y contract no existen en cuquantum: el grupo de numpy decide
    assert_eq!(contraction.attempts.len(), 3);
    assert_eq!(ctx.get("values"), Some(&ProbeValue::Data(json!([[1.0, 1.0], [1.0, 1.0]]))));
    assert_eq!(report.exit_status(), ExitStatus::Success);
}

#[test]
fn loads_plans_from_disk_and_prefers_files_over_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let text = r#"{
        "name": "perceval",
        "entries": [{"name": "pv", "modules": ["perceval"]}],
        "stages": [{"name": "version", "probes": [
            {"target": {"entry": "pv"}, "candidates": [{"op": "__version__", "access": "read"}]}
        ]}]
    }"#;
    fs::write(dir.path().join("perceval.json"), text).unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let plan = load_plan(dir.path().join("perceval.json")).unwrap();
    assert_eq!(plan.spec.stages.len(), 1);
    assert_eq!(plan.digest, qprobe_plans::digest_text(text));

    let listed = load_dir(dir.path()).unwrap();
    assert_eq!(listed.len(), 1);

    let from_dir = resolve("perceval", Some(dir.path())).unwrap();
    assert!(matches!(from_dir.source, PlanSource::File(_)));
    let builtin = resolve("perceval", None).unwrap();
    assert_eq!(builtin.source, PlanSource::Builtin);
    assert_ne!(from_dir.digest, builtin.digest);

    assert!(matches!(load_plan(dir.path().join("broken.json")), Err(PlanError::Parse { .. })));
    assert!(matches!(load_plan(dir.path().join("missing.json")), Err(PlanError::Io { .. })));
}
