use super::{DeletionPlan, PlannedFile, UndoScript};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Outcome of executing a deletion plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionSummary {
    /// Files a removal was tried for
    pub attempted: usize,
    pub deleted: Vec<PathBuf>,
    /// Files that were already missing
    pub already_gone: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    /// Files the user chose to keep
    pub declined: usize,
}

/// Deletes the files of a plan, one at a time.
///
/// Failures are recorded per file and never stop the remaining deletions.
pub struct SafeDeleter {
    interactive: bool,
    dry_run: bool,
    undo_script_path: Option<PathBuf>,
}

impl SafeDeleter {
    pub fn new(interactive: bool, dry_run: bool, undo_script_path: Option<PathBuf>) -> Self {
        Self {
            interactive,
            dry_run,
            undo_script_path,
        }
    }

    pub fn execute(&self, plan: &DeletionPlan) -> Result<DeletionSummary> {
        let mut summary = DeletionSummary::default();

        if plan.is_empty() {
            println!("{}", "Nothing to delete.".green());
            return Ok(summary);
        }

        if self.dry_run {
            println!();
            println!("{}", "Dry run - would delete:".yellow().bold());
            for file in &plan.files {
                println!("  {} ({})", file.path.display(), file.units.join(", ").dimmed());
            }
            println!();
            println!(
                "{}",
                format!("Total: {} files would be deleted", plan.len()).dimmed()
            );
            return Ok(summary);
        }

        let selected = if self.interactive {
            self.interactive_select(plan, &mut summary)?
        } else {
            plan.files.iter().collect()
        };

        if selected.is_empty() {
            println!("{}", "No files selected for deletion.".yellow());
            return Ok(summary);
        }

        // The script is written before anything is removed
        if let Some(path) = &self.undo_script_path {
            let mut script = UndoScript::new();
            for file in &selected {
                if let Ok(contents) = std::fs::read_to_string(&file.path) {
                    script.record_file_state(&file.path, &contents);
                }
            }
            script.write(path)?;
            println!(
                "{} Undo script for {} files saved to: {}",
                "→".dimmed(),
                script.file_count(),
                path.display()
            );
        }

        println!();
        println!("{}", "Deleting files...".cyan().bold());

        for file in selected {
            summary.attempted += 1;
            match std::fs::remove_file(&file.path) {
                Ok(()) => {
                    println!("  {} Deleted {}", "✓".green(), file.path.display());
                    summary.deleted.push(file.path.clone());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("{} is already gone", file.path.display());
                    summary.already_gone.push(file.path.clone());
                }
                Err(e) => {
                    warn!("Failed to delete {}: {}", file.path.display(), e);
                    println!(
                        "  {} Failed to delete {}: {}",
                        "✗".red(),
                        file.path.display(),
                        e
                    );
                    summary.failed.push((file.path.clone(), e.to_string()));
                }
            }
        }

        println!();
        println!(
            "{}",
            format!(
                "Deleted {} of {} files ({} already gone, {} failed)",
                summary.deleted.len(),
                summary.attempted,
                summary.already_gone.len(),
                summary.failed.len()
            )
            .dimmed()
        );

        Ok(summary)
    }

    /// Confirm each file
    fn interactive_select<'p>(
        &self,
        plan: &'p DeletionPlan,
        summary: &mut DeletionSummary,
    ) -> Result<Vec<&'p PlannedFile>> {
        let mut selected = Vec::new();

        println!();
        println!("{}", "Interactive mode - confirm each deletion:".cyan().bold());
        println!();

        for file in &plan.files {
            let prompt = format!("Delete {} ({})?", file.path.display(), file.units.join(", "));

            if Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(&prompt)
                .default(false)
                .interact()
                .into_diagnostic()?
            {
                selected.push(file);
            } else {
                summary.declined += 1;
            }
        }

        Ok(selected)
    }
}
