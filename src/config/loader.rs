use crate::analysis::LivenessMode;
use crate::graph::ResolutionStrategy;
use crate::report::ReportFormat;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a classprune run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fully qualified names of the classes to delete
    pub targets: Vec<String>,

    /// Path patterns to exclude from scanning
    pub exclude: Vec<String>,

    /// How simple type names are mapped to project classes
    pub resolution: ResolutionStrategy,

    /// Fixpoint refinement or the single-pass approximation
    pub liveness: LivenessMode,

    /// Library namespaces that are never project classes
    pub excluded_namespaces: Vec<String>,

    /// Namespaces that are never deleted, whatever the graph says
    pub reserved_namespaces: Vec<String>,

    /// Treat import statements as references
    pub count_imports: bool,

    /// Directories (relative to the project root) searched when a target
    /// is not in the catalog and has to be deleted by name
    pub source_roots: Vec<PathBuf>,

    /// Worker pool configuration
    pub workers: WorkerConfig,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of worker threads; defaults to the available parallelism
    pub threads: Option<usize>,

    /// Grace period for each parallel stage, in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json
    pub format: ReportFormat,

    /// List candidates that were kept, with the classes that keep them alive
    pub show_retained: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: vec![],
            exclude: vec![
                "**/build/**".to_string(),
                "**/target/**".to_string(),
                "**/.gradle/**".to_string(),
                "**/.idea/**".to_string(),
            ],
            resolution: ResolutionStrategy::default(),
            liveness: LivenessMode::default(),
            excluded_namespaces: ["java", "javax", "jakarta", "jdk", "sun", "com.sun", "kotlin"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            reserved_namespaces: vec!["com.example.tools".to_string()],
            count_imports: true,
            source_roots: vec![
                PathBuf::new(),
                PathBuf::from("src/main/java"),
                PathBuf::from("src/test/java"),
                PathBuf::from("src"),
            ],
            workers: WorkerConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            threads: None,
            timeout_secs: 60,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Terminal,
            show_retained: true,
        }
    }
}

impl WorkerConfig {
    /// Resolved worker count, never zero
    pub fn thread_count(&self) -> usize {
        self.threads
            .filter(|&n| n > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".classprune.yml",
            ".classprune.yaml",
            ".classprune.toml",
            "classprune.yml",
            "classprune.yaml",
            "classprune.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Check if a path matches one of the exclude patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude.iter().any(|pattern| glob_match(pattern, &path_str))
    }

    /// Check if a qualified name lives in a library namespace
    pub fn is_excluded_namespace(&self, name: &str) -> bool {
        self.excluded_namespaces
            .iter()
            .any(|ns| namespace_matches(ns, name))
    }
}

/// Segment-aware namespace prefix match.
///
/// `a.b` matches `a.b` and `a.b.C` but not `a.bc.C`. A trailing `.` or `.*`
/// on the prefix is ignored.
pub fn namespace_matches(prefix: &str, name: &str) -> bool {
    let prefix = prefix.trim_end_matches(".*").trim_end_matches('.');
    if prefix.is_empty() {
        return false;
    }
    match name.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

/// Simple glob matching for patterns like "*Test.java" or "**/build/**"
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern.starts_with('*') && !pattern.starts_with("**") && !pattern.contains('/') {
        return text.ends_with(&pattern[1..]);
    }

    if pattern.ends_with('*') && !pattern.ends_with("**") && !pattern.contains('/') {
        return text.starts_with(&pattern[..pattern.len() - 1]);
    }

    if pattern.contains("**") {
        // "**/build/**" matches a whole directory name anywhere in the path
        if pattern.starts_with("**/") && pattern.ends_with("/**") {
            let dir_name = pattern
                .trim_start_matches("**/")
                .trim_end_matches("/**")
                .trim_matches('/');
            let text = text.replace('\\', "/");
            return text.contains(&format!("/{}/", dir_name))
                || text.starts_with(&format!("{}/", dir_name));
        }

        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            if prefix.is_empty() && suffix.is_empty() {
                return true;
            }

            if prefix.is_empty() {
                let suffix = suffix.trim_start_matches('*');
                return text.ends_with(suffix);
            }

            if suffix.is_empty() {
                return text.starts_with(prefix) || text.contains(&format!("{}/", prefix));
            }

            return (text.starts_with(prefix) || text.contains(&format!("/{}/", prefix)))
                && text.ends_with(suffix.trim_start_matches('*'));
        }
    }

    text == pattern
}
