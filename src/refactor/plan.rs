use crate::analysis::LivenessReport;
use crate::catalog::UnitCatalog;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A file whose every declared unit is deletable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: PathBuf,
    /// Units that disappear with the file, sorted
    pub units: Vec<String>,
}

/// A file that declares deletable units next to surviving ones; never deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFile {
    pub path: PathBuf,
    pub deletable: Vec<String>,
    pub surviving: Vec<String>,
}

/// File-level view of a liveness report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPlan {
    /// Sorted by path
    pub files: Vec<PlannedFile>,
    pub shared: Vec<SharedFile>,
    /// Absent targets with no matching file under any source root
    pub unresolved: Vec<String>,
}

impl DeletionPlan {
    /// Map deletable units to files.
    ///
    /// Targets missing from the catalog are looked up by name under each
    /// source root (`<root>/<source root>/<package path>/<Name>.java`).
    pub fn build(
        report: &LivenessReport,
        catalog: &UnitCatalog,
        root: &Path,
        source_roots: &[PathBuf],
    ) -> Self {
        let mut by_file: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
        for (name, path) in &report.deletable {
            by_file.entry(path.clone()).or_default().push(name.clone());
        }

        let mut plan = DeletionPlan::default();

        for name in &report.absent_targets {
            match path_for_name(root, source_roots, name) {
                Some(path) => {
                    debug!("Absent target {} resolved to {}", name, path.display());
                    by_file.entry(path).or_default().push(name.clone());
                }
                None => {
                    warn!("No file found for target {}", name);
                    plan.unresolved.push(name.clone());
                }
            }
        }

        for (path, mut units) in by_file {
            units.sort();
            let surviving: Vec<String> = catalog
                .units_in_file(&path)
                .iter()
                .filter(|u| !report.is_deletable(u))
                .cloned()
                .collect();

            if surviving.is_empty() {
                plan.files.push(PlannedFile { path, units });
            } else {
                warn!(
                    "Not deleting {}: it also declares {}",
                    path.display(),
                    surviving.join(", ")
                );
                plan.shared.push(SharedFile {
                    path,
                    deletable: units,
                    surviving,
                });
            }
        }

        plan
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Source file that would declare `qualified_name` under the first source
/// root where it exists
pub fn path_for_name(root: &Path, source_roots: &[PathBuf], qualified_name: &str) -> Option<PathBuf> {
    let relative = format!("{}.java", qualified_name.replace('.', "/"));
    source_roots
        .iter()
        .map(|source_root| root.join(source_root).join(&relative))
        .find(|candidate| candidate.is_file())
}
