//! Renderizado legible del reporte (el producto visible de la herramienta).
use std::fmt::{self, Write as _};

use super::{PipelineReport, StageOutcome, StageReport};
use crate::probe::AttemptOutcome;

const SUMMARY_WIDTH: usize = 96;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Incluye también la traza de los stages exitosos.
    pub verbose: bool,
}

impl PipelineReport {
    pub fn render(&self, options: RenderOptions) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "pipeline {} (run {})", self.pipeline, self.run_id);
        for stage in &self.stages {
            render_stage(&mut out, stage, options);
        }
        if let Some(fatal) = &self.fatal {
            let _ = writeln!(out,
                             "aborted at '{}': required entry '{}' unavailable ({})",
                             fatal.stage, fatal.entry, fatal.fault);
        }
        let status = self.exit_status();
        let _ = writeln!(out, "status: {} ({})", status.label(), status.code());
        if let Some(fp) = &self.fingerprint {
            let _ = writeln!(out, "fingerprint: {fp}");
        }
        out
    }
}

fn render_stage(out: &mut String, stage: &StageReport, options: RenderOptions) {
    let head = format!("[{}] {}", stage.index + 1, stage.stage);
    let show_trace = match &stage.outcome {
        StageOutcome::Succeeded { call, summary, inspected } => {
            let _ = writeln!(out, "  {head:<28} ok       {call} -> {}", truncate(summary));
            if !inspected.is_empty() {
                let _ = writeln!(out, "        members: {}", inspected.join(", "));
            }
            options.verbose
        }
        StageOutcome::Exhausted => {
            let _ = writeln!(out, "  {head:<28} EXHAUSTED after {} attempts", stage.attempts.len());
            true
        }
        StageOutcome::Skipped(reason) => {
            let _ = writeln!(out, "  {head:<28} skipped  {reason}");
            options.verbose
        }
        StageOutcome::Pending => {
            let _ = writeln!(out, "  {head:<28} pending");
            false
        }
    };
    if show_trace {
        for a in &stage.attempts {
            let detail = match &a.outcome {
                AttemptOutcome::Absent => "not present".to_string(),
                AttemptOutcome::Failed { fault } => fault.to_string(),
                AttemptOutcome::Succeeded { summary } => format!("-> {}", truncate(summary)),
            };
            let _ = writeln!(out, "        #{:<3} {} : {}", a.index, a.call_text(), detail);
        }
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= SUMMARY_WIDTH {
        return text.to_string();
    }
    let cut: String = text.chars().take(SUMMARY_WIDTH).collect();
    format!("{cut}...")
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(RenderOptions::default()))
    }
}
