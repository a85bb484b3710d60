use qprobe_core::scripted::ScriptedEntries;
use qprobe_core::{ExitStatus, StageOutcome, Weight};
use qprobe_plans::catalog;
use qprobe_rust::demo::{demo_entries, DEMO_VERSION};
use qprobe_rust::{run_plan, OutputFormat, ProbeConfig};

fn demo_session() -> qprobe_rust::Session {
    let plan = catalog::builtin("perceval").expect("builtin plan");
    run_plan(&plan, &mut demo_entries(), &ProbeConfig::default()).expect("plan builds")
}

#[test]
fn demo_run_reaches_the_distribution() {
    let session = demo_session();
    let report = &session.report;

    assert_eq!(session.exit_status(), ExitStatus::Success);
    assert!(report.fatal.is_none());
    for stage in &report.stages {
        assert!(stage.outcome.is_success(), "stage {} did not succeed: {:?}", stage.stage, stage.outcome);
    }
    assert_eq!(session.plan, "perceval");
    assert_eq!(session.plan_digest.len(), 64);
}

#[test]
fn demo_negotiates_calling_conventions() {
    let session = demo_session();
    let report = &session.report;

    // add(bs) falla por aridad, add(0, bs) funciona
    let attach = report.stage("attach").expect("attach stage");
    assert_eq!(attach.attempts.len(), 2);
    assert_eq!(attach.attempts[0].outcome.kind(), "failed");
    assert_eq!(attach.attempts[1].outcome.kind(), "succeeded");

    // los nombres largos de backend se rechazan antes de "SLOS"
    let backend = report.stage("backend").expect("backend stage");
    assert_eq!(backend.attempts.len(), 3);
    match &backend.outcome {
        StageOutcome::Succeeded { call, .. } => assert!(call.contains("SLOS"), "winner was {call}"),
        other => panic!("unexpected backend outcome {other:?}"),
    }

    match &report.stage("circuit").expect("circuit stage").outcome {
        StageOutcome::Succeeded { inspected, .. } => assert_eq!(inspected, &vec!["add".to_string(), "compose".to_string()]),
        other => panic!("unexpected circuit outcome {other:?}"),
    }
}

#[test]
fn demo_reads_version_and_ranks_outcomes() {
    let session = demo_session();
    let version = session.context.get("version").and_then(|v| v.as_data()).cloned();
    assert_eq!(version, Some(serde_json::json!(DEMO_VERSION)));

    let top = session.top(5);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0], ("|1,0>".to_string(), Weight::Known(0.5)));
    assert_eq!(top[1], ("|0,1>".to_string(), Weight::Known(0.5)));
    assert_eq!(session.top(1).len(), 1);
}

#[test]
fn demo_fingerprint_is_stable_across_runs() {
    let a = demo_session();
    let b = demo_session();
    assert_ne!(a.report.run_id, b.report.run_id);
    assert_eq!(a.report.fingerprint, b.report.fingerprint);
    assert!(a.report.fingerprint.is_some());
}

#[test]
fn missing_module_is_an_import_failure() {
    let plan = catalog::builtin("perceval").expect("builtin plan");
    let session = run_plan(&plan, &mut ScriptedEntries::new(), &ProbeConfig::default()).expect("plan builds");

    assert_eq!(session.exit_status(), ExitStatus::ImportFailure);
    assert_eq!(session.exit_status().code(), 2);
    assert!(session.report.fatal.is_some());
    assert!(session.top(3).is_empty());
}

#[test]
fn renders_text_and_json() {
    let session = demo_session();

    let text = session.render(OutputFormat::Text, false, Some(1)).expect("text render");
    assert!(text.starts_with("pipeline perceval"));
    assert!(text.contains("top 1:"));
    assert!(text.contains("|1,0>"));

    let json = session.render(OutputFormat::Json, false, Some(2)).expect("json render");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["report"]["pipeline"], "perceval");
    assert_eq!(value["plan_digest"], serde_json::json!(session.plan_digest));
    assert_eq!(value["top"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["top"][0]["weight"], serde_json::json!(0.5));
}
