mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::pipeline::Analysis;
use miette::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// Reporter for liveness analysis results
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    show_retained: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            show_retained: true,
        }
    }

    pub fn with_retained(mut self, show: bool) -> Self {
        self.show_retained = show;
        self
    }

    pub fn report(&self, analysis: &Analysis) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => TerminalReporter::new()
                .with_retained(self.show_retained)
                .report(analysis),
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report(analysis),
        }
    }
}
