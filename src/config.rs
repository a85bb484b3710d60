//! Configuración del binario `qprobe`.
//! Carga variables de entorno (.env) una sola vez y expone `ProbeConfig`;
//! los flags de la CLI se aplican encima con `apply_overrides`.
use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use qprobe_core::constants::DEFAULT_MAX_ITEMS;

use crate::errors::AppError;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Formato de salida del reporte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(AppError::Config(format!("QPROBE_FORMAT desconocido: '{other}' (text|json)"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Directorio extra donde buscar `<plan>.json`.
    pub plan_dir: Option<PathBuf>,
    /// Entradas que se anteponen a `sys.path` (sólo con el feature `python`).
    pub python_path: Vec<PathBuf>,
    pub format: OutputFormat,
    /// Límite de elementos al iterar valores opacos.
    pub max_items: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { plan_dir: None,
               python_path: Vec::new(),
               format: OutputFormat::Text,
               max_items: DEFAULT_MAX_ITEMS }
    }
}

impl ProbeConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();
        if let Some(dir) = lookup("QPROBE_PLAN_DIR").filter(|v| !v.trim().is_empty()) {
            config.plan_dir = Some(PathBuf::from(dir));
        }
        if let Some(paths) = lookup("QPROBE_PYTHON_PATH") {
            config.python_path = paths.split(':').filter(|p| !p.is_empty()).map(PathBuf::from).collect();
        }
        if let Some(format) = lookup("QPROBE_FORMAT") {
            config.format = format.parse()?;
        }
        if let Some(raw) = lookup("QPROBE_MAX_ITEMS") {
            config.max_items = match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(AppError::Config(format!("QPROBE_MAX_ITEMS inválido: '{raw}'"))),
            };
        }
        Ok(config)
    }

    /// Los flags explícitos de la CLI ganan sobre el entorno.
    pub fn apply_overrides(mut self, format: Option<OutputFormat>, plan_dir: Option<PathBuf>) -> Self {
        if let Some(format) = format {
            self.format = format;
        }
        if plan_dir.is_some() {
            self.plan_dir = plan_dir;
        }
        self
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = ProbeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ProbeConfig::default());
        assert_eq!(config.max_items, DEFAULT_MAX_ITEMS);
    }

    #[test]
    fn reads_all_variables() {
        let config = ProbeConfig::from_lookup(lookup(&[("QPROBE_PLAN_DIR", "/tmp/plans"),
                                                       ("QPROBE_PYTHON_PATH", "/a::/b"),
                                                       ("QPROBE_FORMAT", "JSON"),
                                                       ("QPROBE_MAX_ITEMS", "16")])).unwrap();
        assert_eq!(config.plan_dir, Some(PathBuf::from("/tmp/plans")));
        assert_eq!(config.python_path, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.max_items, 16);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(ProbeConfig::from_lookup(lookup(&[("QPROBE_FORMAT", "yaml")])), Err(AppError::Config(_))));
        assert!(matches!(ProbeConfig::from_lookup(lookup(&[("QPROBE_MAX_ITEMS", "0")])), Err(AppError::Config(_))));
    }

    #[test]
    fn cli_flags_override_environment() {
        let config = ProbeConfig::from_lookup(lookup(&[("QPROBE_FORMAT", "json")])).unwrap()
                                                                                    .apply_overrides(Some(OutputFormat::Text), None);
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.plan_dir, None);
    }
}
