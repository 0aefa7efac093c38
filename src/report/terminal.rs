use crate::analysis::RetainReason;
use crate::pipeline::Analysis;
use colored::Colorize;
use miette::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// List the candidates that were kept and who keeps them
    show_retained: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            show_retained: true,
        }
    }

    pub fn with_retained(mut self, show: bool) -> Self {
        self.show_retained = show;
        self
    }

    pub fn report(&self, analysis: &Analysis) -> Result<()> {
        let liveness = &analysis.liveness;

        if liveness.deletable.is_empty() {
            println!("{}", "Nothing can be deleted for the given targets.".yellow().bold());
        } else {
            // Group by file
            let mut by_file: BTreeMap<&Path, Vec<&str>> = BTreeMap::new();
            for (name, file) in &liveness.deletable {
                by_file.entry(file.as_path()).or_default().push(name);
            }

            println!();
            println!(
                "{}",
                format!("{} classes can be deleted:", liveness.deletable.len())
                    .green()
                    .bold()
            );
            println!();

            for (file, units) in &by_file {
                println!("{}", relative(&analysis.root, file).cyan().bold());
                for unit in units {
                    let marker = if analysis.targets.iter().any(|t| t.as_str() == *unit) {
                        "target".magenta()
                    } else {
                        "unused".dimmed()
                    };
                    println!("  {} {} [{}]", "✗".red(), unit.white(), marker);
                }
            }
            println!();
        }

        if self.show_retained && !liveness.retained.is_empty() {
            println!("{}", "Kept (reachable from the targets but still needed):".yellow().bold());
            for retained in &liveness.retained {
                let detail = match retained.reason {
                    RetainReason::Referenced => format!("used by {}", retained.referenced_by.join(", ")),
                    reason => reason.to_string(),
                };
                println!("  {} {} {}", "•".yellow(), retained.name, format!("({})", detail).dimmed());
            }
            println!();
        }

        if !liveness.still_referenced.is_empty() {
            println!("{}", "⚠ Targets still referenced by surviving code:".red().bold());
            for entry in &liveness.still_referenced {
                println!(
                    "  {} {} {}",
                    "→".red(),
                    entry.target,
                    format!("(used by {})", entry.referenced_by.join(", ")).dimmed()
                );
            }
            println!();
        }

        if !liveness.absent_targets.is_empty() {
            println!("{}", "Targets not declared in the project:".yellow());
            for target in &liveness.absent_targets {
                println!("  {} {}", "?".yellow(), target);
            }
            println!();
        }

        if !liveness.reserved_skipped.is_empty() {
            println!("{}", "Skipped (reserved namespace):".dimmed());
            for name in &liveness.reserved_skipped {
                println!("  {} {}", "-".dimmed(), name.dimmed());
            }
            println!();
        }

        if !analysis.build.skipped.is_empty() {
            println!(
                "{}",
                format!(
                    "⚠ {} files could not be parsed; references from them are invisible:",
                    analysis.build.skipped.len()
                )
                .yellow()
            );
            for skipped in &analysis.build.skipped {
                println!(
                    "  {} {}",
                    relative(&analysis.root, &skipped.path),
                    format!("({})", skipped.reason).dimmed()
                );
            }
            println!();
        }

        if !analysis.cycles.is_empty() {
            println!("{}", "Dependency cycles among deletable classes:".cyan());
            for cycle in &analysis.cycles {
                println!("  {} {}", "↻".cyan(), cycle.members.join(" ↔ "));
            }
            println!();
        }

        self.print_summary(analysis);
        Ok(())
    }

    fn print_summary(&self, analysis: &Analysis) {
        let liveness = &analysis.liveness;

        println!("{}", "─".repeat(60).dimmed());
        println!(
            "Summary: {} deletable, {} kept, {} candidates ({} units, {} references)",
            liveness.deletable.len().to_string().green(),
            liveness.retained.len().to_string().yellow(),
            liveness.candidates,
            analysis.build.graph.unit_count(),
            analysis.build.graph.reference_count()
        );
        println!(
            "{}",
            format!(
                "Analyzed {} files in {:.2}s ({} filter rounds)",
                analysis.build.files,
                analysis.elapsed.as_secs_f64(),
                liveness.rounds
            )
            .dimmed()
        );

        if !liveness.deletable.is_empty() {
            println!();
            println!("{}", "Tip: Run with --delete to remove these files".dimmed());
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Path relative to the project root when possible
fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(PathBuf::from)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
