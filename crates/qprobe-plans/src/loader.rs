//! Carga de planes desde disco.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::catalog;
use crate::errors::PlanError;
use crate::plan::{Plan, PlanSource};

pub fn load_plan(path: impl AsRef<Path>) -> Result<Plan, PlanError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| PlanError::Io { path: path.to_path_buf(),
                                                                    source: e })?;
    debug!("plan loaded from {}", path.display());
    Plan::parse(&text, PlanSource::File(path.to_path_buf()))
}

/// Todos los `*.json` de un directorio, en orden de nombre de archivo.
/// Los que no parsean se omiten con un warning.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<Plan>, PlanError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| PlanError::Io { path: dir.to_path_buf(),
                                                                source: e })?;
    let mut paths: Vec<_> = entries.filter_map(|e| e.ok().map(|e| e.path()))
                                   .filter(|p| p.extension().is_some_and(|x| x == "json"))
                                   .collect();
    paths.sort();
    let mut plans = Vec::new();
    for path in paths {
        match load_plan(&path) {
            Ok(plan) => plans.push(plan),
            Err(e) => warn!("skipping {}: {e}", path.display()),
        }
    }
    Ok(plans)
}

/// Resuelve `name_or_path`: un archivo existente, luego `<dir>/<name>.json`
/// en el directorio extra, y por último el catálogo embebido.
pub fn resolve(name_or_path: &str, extra_dir: Option<&Path>) -> Result<Plan, PlanError> {
    let direct = Path::new(name_or_path);
    if direct.is_file() {
        return load_plan(direct);
    }
    if let Some(dir) = extra_dir {
        let candidate = dir.join(format!("{name_or_path}.json"));
        if candidate.is_file() {
            return load_plan(candidate);
        }
    }
    catalog::builtin(name_or_path)
}
