//! Unit catalog: every top-level class declared in the project and the file
//! that declares it.
//!
//! The catalog is filled concurrently while files are scanned
//! ([`CatalogBuilder`]) and then frozen into a read-only [`UnitCatalog`] that
//! the rest of the pipeline shares without locking.

use crate::parser::UnitKind;
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::warn;

/// A project-level declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Fully qualified, dot-separated name
    pub qualified_name: String,
    /// Package of the declaring file
    pub package: Option<String>,
    pub kind: UnitKind,
    /// File that declares the unit
    pub file: PathBuf,
    /// 1-based line of the declaration
    pub line: usize,
}

impl Unit {
    pub fn new(qualified_name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        let qualified_name = qualified_name.into();
        let package = qualified_name
            .rsplit_once('.')
            .map(|(pkg, _)| pkg.to_string());
        Self {
            qualified_name,
            package,
            kind: UnitKind::Class,
            file: file.into(),
            line: 1,
        }
    }

    /// Name without the package
    pub fn simple_name(&self) -> &str {
        simple_name(&self.qualified_name)
    }
}

/// Last segment of a dotted name
pub fn simple_name(qualified_name: &str) -> &str {
    qualified_name.rsplit('.').next().unwrap_or(qualified_name)
}

/// Concurrent accumulator used during the scan stage
#[derive(Debug, Default, Clone)]
pub struct CatalogBuilder {
    units: DashMap<String, Unit>,
    duplicates: DashMap<String, Vec<PathBuf>>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration. A name declared twice keeps the last registration.
    pub fn register(&self, unit: Unit) {
        let name = unit.qualified_name.clone();
        let file = unit.file.clone();
        if let Some(previous) = self.units.insert(name.clone(), unit) {
            if previous.file != file {
                warn!(
                    "Duplicate declaration of {} in {} and {}; keeping the latter",
                    name,
                    previous.file.display(),
                    file.display()
                );
                self.duplicates.entry(name).or_default().push(previous.file);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Freeze into a read-only catalog. Must only be called after every
    /// scanning task has finished.
    pub fn freeze(self) -> UnitCatalog {
        let mut catalog = UnitCatalog::from_units(self.units.into_iter().map(|(_, unit)| unit));
        for (name, mut files) in self.duplicates {
            files.sort();
            catalog.duplicates.insert(name, files);
        }
        catalog
    }
}

/// Read-only catalog of project units
#[derive(Debug, Default, Clone)]
pub struct UnitCatalog {
    units: HashMap<String, Unit>,
    by_simple_name: HashMap<String, Vec<String>>,
    by_file: HashMap<PathBuf, Vec<String>>,
    duplicates: BTreeMap<String, Vec<PathBuf>>,
}

impl UnitCatalog {
    /// Build a catalog directly from units (later duplicates win)
    pub fn from_units(units: impl IntoIterator<Item = Unit>) -> Self {
        let mut catalog = Self::default();

        for unit in units {
            if let Some(previous) = catalog.units.insert(unit.qualified_name.clone(), unit) {
                catalog
                    .duplicates
                    .entry(previous.qualified_name.clone())
                    .or_default()
                    .push(previous.file);
            }
        }

        for unit in catalog.units.values() {
            catalog
                .by_simple_name
                .entry(unit.simple_name().to_string())
                .or_default()
                .push(unit.qualified_name.clone());
            catalog
                .by_file
                .entry(unit.file.clone())
                .or_default()
                .push(unit.qualified_name.clone());
        }

        // Sorted so that lookups are deterministic
        for names in catalog.by_simple_name.values_mut() {
            names.sort();
        }
        for names in catalog.by_file.values_mut() {
            names.sort();
        }

        catalog
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.units.contains_key(qualified_name)
    }

    /// Owning file of a unit
    pub fn location(&self, qualified_name: &str) -> Option<&Path> {
        self.units.get(qualified_name).map(|u| u.file.as_path())
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.units.keys()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// All cataloged units with the given simple name, sorted
    pub fn find_by_simple_name(&self, simple: &str) -> &[String] {
        self.by_simple_name
            .get(simple)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Units declared in a file, sorted
    pub fn units_in_file(&self, file: &Path) -> &[String] {
        self.by_file.get(file).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Names declared more than once, with the files that lost
    pub fn duplicates(&self) -> &BTreeMap<String, Vec<PathBuf>> {
        &self.duplicates
    }
}
