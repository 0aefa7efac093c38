use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Bash script that recreates deleted files
pub struct UndoScript {
    /// File contents before deletion
    file_states: BTreeMap<PathBuf, String>,
}

impl UndoScript {
    pub fn new() -> Self {
        Self {
            file_states: BTreeMap::new(),
        }
    }

    /// Record a file's contents; the first recording wins
    pub fn record_file_state(&mut self, path: &Path, contents: &str) {
        self.file_states
            .entry(path.to_path_buf())
            .or_insert_with(|| contents.to_string());
    }

    /// Script text
    pub fn render(&self) -> String {
        let mut script = String::new();

        script.push_str("#!/bin/bash\n");
        script.push_str("# classprune undo script: recreates the deleted source files\n");
        script.push_str("\nset -e\n\n");

        for (file_path, contents) in &self.file_states {
            let quoted = shell_quote(&file_path.display().to_string());
            let marker = heredoc_marker(contents);

            script.push_str(&format!("# Restore {}\n", file_path.display()));
            if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                script.push_str(&format!("mkdir -p {}\n", shell_quote(&parent.display().to_string())));
            }
            // Quoted heredoc: contents are taken literally
            script.push_str(&format!("cat > {} << '{}'\n", quoted, marker));
            script.push_str(contents);
            if !contents.ends_with('\n') {
                script.push('\n');
            }
            script.push_str(&marker);
            script.push('\n');
            script.push_str(&format!("echo \"restored {}\"\n\n", file_path.display()));
        }

        script.push_str(&format!("echo \"{} file(s) restored\"\n", self.file_states.len()));
        script
    }

    /// Write the script and make it executable
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render()).into_diagnostic()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path).into_diagnostic()?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(path, perms).into_diagnostic()?;
        }

        Ok(())
    }

    pub fn file_count(&self) -> usize {
        self.file_states.len()
    }
}

impl Default for UndoScript {
    fn default() -> Self {
        Self::new()
    }
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Heredoc terminator that does not occur as a line of `contents`
fn heredoc_marker(contents: &str) -> String {
    let mut marker = String::from("CLASSPRUNE_EOF");
    while contents.lines().any(|line| line == marker) {
        marker.push('_');
    }
    marker
}
