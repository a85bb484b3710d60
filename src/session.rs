//! Una ejecución de un plan: pipeline construido con la configuración,
//! reporte replayado y contexto final (para leer la distribución extraída).

use std::fmt::Write as _;

use log::info;
use qprobe_core::{CapabilityProber, EntryResolver, ExitStatus, ExtractionOutcome, PipelineContext, PipelineReport,
                  ProbeValue, RenderOptions, Weight};
use qprobe_plans::Plan;
use serde_json::json;

use crate::config::{OutputFormat, ProbeConfig};
use crate::errors::AppError;

pub struct Session {
    pub plan: String,
    /// sha256 del texto del plan ejecutado.
    pub plan_digest: String,
    pub report: PipelineReport,
    pub context: PipelineContext,
}

pub fn run_plan(plan: &Plan, resolver: &mut dyn EntryResolver, config: &ProbeConfig) -> Result<Session, AppError> {
    let prober = CapabilityProber::new().with_max_items(config.max_items);
    let mut pipeline = plan.build_with(prober)?;
    info!("plan {} ({}): {} stages, definition {}",
          plan.name(),
          plan.source,
          pipeline.stage_names().len(),
          pipeline.definition_hash());
    let (report, context) = pipeline.run_with_context(resolver, PipelineContext::new());
    Ok(Session { plan: plan.name().to_string(),
                 plan_digest: plan.digest.clone(),
                 report,
                 context })
}

/// Las `n` salidas de mayor peso de la distribución extraída por el stage
/// terminal. Vacío si el terminal no produjo una distribución.
pub fn top_outcomes(report: &PipelineReport, context: &PipelineContext, n: usize) -> Vec<(String, Weight)> {
    let Some(terminal) = report.terminal().filter(|t| t.outcome.is_success()) else {
        return Vec::new();
    };
    let Some(data) = context.get(&terminal.stage).and_then(ProbeValue::as_data) else {
        return Vec::new();
    };
    match serde_json::from_value::<ExtractionOutcome>(data.clone()) {
        Ok(outcome) => outcome.ranked().into_iter().take(n).map(|(label, w)| (label.to_string(), w)).collect(),
        Err(_) => Vec::new(),
    }
}

fn weight_text(weight: Weight) -> String {
    match weight {
        Weight::Known(w) => format!("{w:.6}"),
        Weight::Unknown => "?".to_string(),
    }
}

impl Session {
    pub fn exit_status(&self) -> ExitStatus {
        self.report.exit_status()
    }

    pub fn top(&self, n: usize) -> Vec<(String, Weight)> {
        top_outcomes(&self.report, &self.context, n)
    }

    pub fn render(&self, format: OutputFormat, verbose: bool, top: Option<usize>) -> Result<String, AppError> {
        match format {
            OutputFormat::Text => {
                let mut out = self.report.render(RenderOptions { verbose });
                if let Some(n) = top {
                    let rows = self.top(n);
                    if rows.is_empty() {
                        out.push_str("no distribution to rank\n");
                    } else {
                        let _ = writeln!(out, "top {}:", rows.len());
                        for (label, weight) in rows {
                            let _ = writeln!(out, "  {label:<24} {}", weight_text(weight));
                        }
                    }
                }
                Ok(out)
            }
            OutputFormat::Json => {
                let value = match top {
                    Some(n) => {
                        let rows: Vec<_> = self.top(n)
                                               .into_iter()
                                               .map(|(label, weight)| json!({ "label": label, "weight": weight }))
                                               .collect();
                        json!({ "plan_digest": self.plan_digest, "report": self.report, "top": rows })
                    }
                    None => json!({ "plan_digest": self.plan_digest, "report": self.report }),
                };
                Ok(serde_json::to_string_pretty(&value)? + "\n")
            }
        }
    }
}
