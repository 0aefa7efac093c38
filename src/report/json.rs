use crate::analysis::RetainReason;
use crate::pipeline::Analysis;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, analysis: &Analysis) -> Result<()> {
        let json = self.render(analysis)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }

    pub fn render(&self, analysis: &Analysis) -> Result<String> {
        let report = JsonReport::from_analysis(analysis);
        serde_json::to_string_pretty(&report).into_diagnostic()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    targets: &'a [String],
    deletable: Vec<JsonUnit<'a>>,
    retained: Vec<JsonRetained<'a>>,
    absent_targets: Vec<&'a str>,
    still_referenced: Vec<JsonStillReferenced<'a>>,
    reserved_skipped: Vec<&'a str>,
    skipped_files: Vec<JsonSkipped<'a>>,
    /// Names declared in more than one file, with the files that lost
    duplicates: &'a BTreeMap<String, Vec<PathBuf>>,
    cycles: Vec<&'a [String]>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonUnit<'a> {
    name: &'a str,
    file: String,
}

#[derive(Serialize)]
struct JsonRetained<'a> {
    name: &'a str,
    reason: RetainReason,
    referenced_by: &'a [String],
}

#[derive(Serialize)]
struct JsonStillReferenced<'a> {
    target: &'a str,
    referenced_by: &'a [String],
}

#[derive(Serialize)]
struct JsonSkipped<'a> {
    file: String,
    reason: &'a str,
}

#[derive(Serialize)]
struct JsonSummary {
    files: usize,
    units: usize,
    references: usize,
    candidates: usize,
    deletable: usize,
    retained: usize,
    rounds: usize,
    elapsed_ms: u128,
}

impl<'a> JsonReport<'a> {
    fn from_analysis(analysis: &'a Analysis) -> Self {
        let liveness = &analysis.liveness;

        Self {
            version: env!("CARGO_PKG_VERSION"),
            targets: &analysis.targets,
            deletable: liveness
                .deletable
                .iter()
                .map(|(name, file)| JsonUnit {
                    name,
                    file: file.to_string_lossy().to_string(),
                })
                .collect(),
            retained: liveness
                .retained
                .iter()
                .map(|r| JsonRetained {
                    name: &r.name,
                    reason: r.reason,
                    referenced_by: &r.referenced_by,
                })
                .collect(),
            absent_targets: liveness.absent_targets.iter().map(String::as_str).collect(),
            still_referenced: liveness
                .still_referenced
                .iter()
                .map(|s| JsonStillReferenced {
                    target: &s.target,
                    referenced_by: &s.referenced_by,
                })
                .collect(),
            reserved_skipped: liveness.reserved_skipped.iter().map(String::as_str).collect(),
            skipped_files: analysis
                .build
                .skipped
                .iter()
                .map(|s| JsonSkipped {
                    file: s.path.to_string_lossy().to_string(),
                    reason: &s.reason,
                })
                .collect(),
            duplicates: analysis.build.catalog.duplicates(),
            cycles: analysis.cycles.iter().map(|c| c.members.as_slice()).collect(),
            summary: JsonSummary {
                files: analysis.build.files,
                units: analysis.build.graph.unit_count(),
                references: analysis.build.graph.reference_count(),
                candidates: liveness.candidates,
                deletable: liveness.deletable.len(),
                retained: liveness.retained.len(),
                rounds: liveness.rounds,
                elapsed_ms: analysis.elapsed.as_millis(),
            },
        }
    }
}
