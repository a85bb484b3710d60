use qprobe_plans::PlanError;
use thiserror::Error;

/// Errores del binario. Son fallos de uso o de entorno: los fallos del SDK
/// sondeado nunca llegan aquí, se reportan con `ExitStatus`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("Error serializando salida: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "python")]
    #[error(transparent)]
    Bridge(#[from] qprobe_python::BridgeError),
    #[error("Sondeo de módulos reales no disponible: compilar con --features python (o usar `qprobe demo`)")]
    PythonUnavailable,
}

impl AppError {
    /// Código de salida para errores de uso, fuera del rango de `ExitStatus`.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_variant_format() {
        let err = AppError::Config("mala configuración".into());
        assert_eq!(err.to_string(), "Error de configuración: mala configuración");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn plan_errors_are_transparent() {
        let plan = PlanError::Unknown("nope".into());
        let expected = plan.to_string();
        let err: AppError = plan.into();
        assert_eq!(err.to_string(), expected);
    }
}
