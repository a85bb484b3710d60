use qprobe_core::{extract, CallArgs, EntryResolver, EntrySpec, Introspect, ProbeValue, Shape};
use qprobe_python::{init, PythonEntries};
use serde_json::json;

#[test]
fn imports_first_available_alternative_and_walks_attributes() {
    init().expect("python");
    let mut entries = PythonEntries::new();
    let counter = entries.resolve(&EntrySpec::required("counter", &["no_such_module", "collections:Counter"]))
                         .expect("collections.Counter");
    assert_eq!(counter.type_name(), "type");

    let missing = entries.resolve(&EntrySpec::required("x", &["no_such_module"]))
                         .err()
                         .expect("module must not import");
    assert_eq!(missing.kind, "ModuleNotFoundError");
}

#[test]
fn calls_convert_arguments_and_plain_results() {
    init().expect("python");
    let mut entries = PythonEntries::new();
    let json_mod = entries.resolve(&EntrySpec::required("json", &["json"])).unwrap();
    let out = json_mod.invoke("dumps", &CallArgs::positional(vec![json!([1, 2]).into()])).unwrap();
    assert_eq!(out, ProbeValue::Data(json!("[1, 2]")));

    let fault = json_mod.invoke("loads", &CallArgs::positional(vec![json!("{").into()])).unwrap_err();
    assert_eq!(fault.kind, "JSONDecodeError");
    assert!(json_mod.has_member("__version__") || !json_mod.members().is_empty());
}

#[test]
fn counter_results_extract_as_direct_mapping() {
    init().expect("python");
    let mut entries = PythonEntries::new();
    let counter = entries.resolve(&EntrySpec::required("counter", &["collections:Counter"])).unwrap();
    let counts = counter.call(&CallArgs::positional(vec![json!("aab").into()])).unwrap();
    let ex = extract(&counts);
    assert_eq!(ex.outcome.shape(), Some(&Shape::DirectMapping));
    assert_eq!(ex.outcome.weights().unwrap().len(), 2);
}
