//! Catálogo de planes embebidos, uno por familia de SDK sondeado.

use log::debug;

use crate::errors::PlanError;
use crate::plan::{Plan, PlanSource};

const BUILTIN: &[(&str, &str)] = &[("perceval", include_str!("../plans/perceval.json")),
                                   ("qiskit", include_str!("../plans/qiskit.json")),
                                   ("pennylane", include_str!("../plans/pennylane.json")),
                                   ("cuquantum", include_str!("../plans/cuquantum.json")),
                                   ("dl_stack", include_str!("../plans/dl_stack.json"))];

pub fn names() -> Vec<&'static str> {
    BUILTIN.iter().map(|(n, _)| *n).collect()
}

pub fn builtin(name: &str) -> Result<Plan, PlanError> {
    let (_, text) = BUILTIN.iter()
                           .find(|(n, _)| *n == name)
                           .ok_or_else(|| PlanError::Unknown(name.to_string()))?;
    debug!("plan {name}: builtin");
    Plan::parse(text, PlanSource::Builtin)
}

pub fn all() -> Result<Vec<Plan>, PlanError> {
    names().into_iter().map(builtin).collect()
}
