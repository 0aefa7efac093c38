use super::{ReferenceKind, ResolutionStrategy, Resolver};
use crate::catalog::UnitCatalog;
use crate::parser::{DeclaredUnit, ParsedFile};
use std::collections::BTreeMap;

/// Resolved outgoing references of one unit, each with the first position it
/// was seen in
pub type Dependencies = BTreeMap<String, ReferenceKind>;

/// Turns the raw names a unit mentions into the set of project units it
/// depends on.
pub struct DependencyExtractor<'a> {
    resolver: Resolver<'a>,
    count_imports: bool,
}

impl<'a> DependencyExtractor<'a> {
    pub fn new(
        catalog: &'a UnitCatalog,
        strategy: ResolutionStrategy,
        excluded_namespaces: &'a [String],
    ) -> Self {
        Self {
            resolver: Resolver::new(catalog, strategy, excluded_namespaces),
            count_imports: true,
        }
    }

    pub fn with_imports(mut self, count_imports: bool) -> Self {
        self.count_imports = count_imports;
        self
    }

    /// Dependencies of a single unit declared in `file`
    pub fn extract(&self, file: &ParsedFile, unit: &DeclaredUnit) -> Dependencies {
        let mut deps = Dependencies::new();

        for reference in &unit.references {
            if let Some(target) = self.resolver.resolve(file, &reference.name) {
                deps.entry(target).or_insert(reference.kind);
            }
        }

        // Imports sit at file level, so they count for every unit in the file
        if self.count_imports {
            for import in &file.imports {
                if let Some(target) = self.resolver.resolve_import(import) {
                    deps.entry(target).or_insert(ReferenceKind::Import);
                }
            }
        }

        deps
    }
}
