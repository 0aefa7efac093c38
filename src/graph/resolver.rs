use crate::catalog::UnitCatalog;
use crate::config::namespace_matches;
use crate::parser::{Import, ParsedFile};
use serde::{Deserialize, Serialize};

/// How an unqualified type name is mapped to a project class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    /// Imports, then the same package, then wildcard imports, then a unique
    /// catalog match on the simple name, then the own-package fallback
    #[default]
    CatalogSearch,
    /// Imports, then the own package only
    NamespaceQualify,
}

/// Resolves names written in one file against the frozen catalog.
///
/// Every name returned is a cataloged unit; anything else (library types,
/// type parameters, unknown names) resolves to `None`.
pub struct Resolver<'a> {
    catalog: &'a UnitCatalog,
    strategy: ResolutionStrategy,
    excluded_namespaces: &'a [String],
}

impl<'a> Resolver<'a> {
    pub fn new(
        catalog: &'a UnitCatalog,
        strategy: ResolutionStrategy,
        excluded_namespaces: &'a [String],
    ) -> Self {
        Self {
            catalog,
            strategy,
            excluded_namespaces,
        }
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excluded_namespaces
            .iter()
            .any(|ns| namespace_matches(ns, name))
    }

    /// Resolve a name as it appears in `file`
    pub fn resolve(&self, file: &ParsedFile, name: &str) -> Option<String> {
        if name.contains('.') {
            self.resolve_qualified(file, name)
        } else {
            self.resolve_simple(file, name)
        }
    }

    /// The unit an import statement depends on, if it is a project class.
    ///
    /// Static imports name a member (`a.B.m`) or all members (`a.B.*`) of a
    /// type. A plain wildcard (`a.b.*`) names a package, or the nested types
    /// of class `a.b`.
    pub fn resolve_import(&self, import: &Import) -> Option<String> {
        match (import.is_static, import.wildcard) {
            (true, false) => {
                let (owner, _) = import.path.rsplit_once('.')?;
                self.enclosing_unit(owner)
            }
            _ => self.enclosing_unit(&import.path),
        }
    }

    /// `com.acme.Foo`, `com.acme.Outer.Inner` or `Outer.Inner`
    fn resolve_qualified(&self, file: &ParsedFile, name: &str) -> Option<String> {
        if let Some(unit) = self.enclosing_unit(name) {
            return Some(unit);
        }
        if self.is_excluded(name) {
            return None;
        }

        let first = name.split('.').next().unwrap_or(name);
        if first.chars().next().is_some_and(|c| c.is_uppercase()) {
            return self.resolve_simple(file, first);
        }

        None
    }

    /// A fully qualified name that is a cataloged unit or nested inside one
    fn enclosing_unit(&self, name: &str) -> Option<String> {
        if self.is_excluded(name) {
            return None;
        }
        if self.catalog.contains(name) {
            return Some(name.to_string());
        }

        // Nested type of a project class: keep the enclosing top-level class
        let mut prefix = name;
        while let Some((head, _)) = prefix.rsplit_once('.') {
            if head.contains('.') && self.catalog.contains(head) {
                return Some(head.to_string());
            }
            prefix = head;
        }
        None
    }

    /// First `import a.B.*;` whose path is a project class. Names that resolve
    /// nowhere else may be nested types of that class.
    fn nested_wildcard(&self, file: &ParsedFile) -> Option<String> {
        file.imports
            .iter()
            .filter(|i| i.wildcard && !i.is_static)
            .find_map(|i| self.enclosing_unit(&i.path))
    }

    fn resolve_simple(&self, file: &ParsedFile, name: &str) -> Option<String> {
        // An explicit single-type import always decides
        if let Some(import) = file
            .imports
            .iter()
            .find(|i| !i.wildcard && !i.is_static && i.simple_name() == name)
        {
            return self.enclosing_unit(&import.path);
        }

        match self.strategy {
            ResolutionStrategy::NamespaceQualify => self
                .keep_cataloged(&file.qualify(name))
                .or_else(|| self.nested_wildcard(file)),
            ResolutionStrategy::CatalogSearch => {
                let same_package = file.qualify(name);
                if self.catalog.contains(&same_package) {
                    return Some(same_package);
                }

                for import in file.imports.iter().filter(|i| i.wildcard && !i.is_static) {
                    if self.is_excluded(&import.path) {
                        continue;
                    }
                    let candidate = format!("{}.{}", import.path, name);
                    if self.catalog.contains(&candidate) {
                        return Some(candidate);
                    }
                }

                if let [only] = self.catalog.find_by_simple_name(name) {
                    return Some(only.clone());
                }

                // Zero or several matches: a class wildcard import, then the
                // own namespace
                self.nested_wildcard(file)
                    .or_else(|| self.keep_cataloged(&same_package))
            }
        }
    }

    fn keep_cataloged(&self, name: &str) -> Option<String> {
        if self.is_excluded(name) || !self.catalog.contains(name) {
            return None;
        }
        Some(name.to_string())
    }
}
