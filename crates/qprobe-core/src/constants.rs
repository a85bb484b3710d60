//! Constantes del motor de sondeo.
//!
//! `ENGINE_VERSION` forma parte del fingerprint de cada reporte: un cambio
//! incompatible en el orden de intentos o en la forma de los registros debe
//! incrementarla para que reportes de versiones distintas no se confundan.

/// Versión lógica del motor de sondeo.
pub const ENGINE_VERSION: &str = "P1.0";

/// Límite por defecto de elementos materializados al iterar un valor opaco.
/// Acota también las llamadas que expande una plantilla con varios `each`.
pub const DEFAULT_MAX_ITEMS: usize = 4096;

/// Accessors conocidos que suelen devolver un mapping resultado -> peso.
pub const WELL_KNOWN_ACCESSORS: &[&str] = &["get_counts",
                                            "as_dict",
                                            "to_dict",
                                            "get_probs",
                                            "get_probabilities",
                                            "probabilities",
                                            "probs",
                                            "weights",
                                            "get_weights",
                                            "items",
                                            "distribution"];

/// Accessors de pesos usados para emparejar posicionalmente una secuencia de etiquetas.
pub const WEIGHT_ACCESSORS: &[&str] = &["weights", "probs", "probabilities"];
