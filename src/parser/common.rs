use crate::graph::ReferenceKind;
use miette::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of a top-level declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl UnitKind {
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(UnitKind::Class),
            "interface_declaration" => Some(UnitKind::Interface),
            "enum_declaration" => Some(UnitKind::Enum),
            "record_declaration" => Some(UnitKind::Record),
            "annotation_type_declaration" => Some(UnitKind::Annotation),
            _ => None,
        }
    }
}

/// An import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported path without the trailing `.*`
    pub path: String,
    /// `import a.b.*;`
    pub wildcard: bool,
    /// `import static ...;`
    pub is_static: bool,
    /// 1-based line
    pub line: usize,
}

impl Import {
    /// Last segment of a single-type import
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

/// A type name as written in the source, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    /// Simple (`Foo`) or dotted (`com.acme.Foo`, `Outer.Inner`) name
    pub name: String,
    /// Position the name appeared in
    pub kind: ReferenceKind,
    /// 1-based line
    pub line: usize,
}

/// A top-level type declaration and everything it mentions
#[derive(Debug, Clone)]
pub struct DeclaredUnit {
    /// Simple name
    pub name: String,
    /// Package-qualified name
    pub qualified_name: String,
    pub kind: UnitKind,
    /// 1-based line of the declaration
    pub line: usize,
    /// Raw references found anywhere inside the declaration
    pub references: Vec<TypeReference>,
}

/// Result of parsing one source file
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub path: PathBuf,
    /// Package of the file (`None` for the default package)
    pub package: Option<String>,
    pub imports: Vec<Import>,
    /// Top-level declarations, in source order
    pub units: Vec<DeclaredUnit>,
}

impl ParsedFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            package: None,
            imports: Vec::new(),
            units: Vec::new(),
        }
    }

    /// Qualify a simple name with this file's package
    pub fn qualify(&self, name: &str) -> String {
        match &self.package {
            Some(pkg) => format!("{}.{}", pkg, name),
            None => name.to_string(),
        }
    }
}

/// Trait for language-specific parsers
pub trait Parser {
    /// Parse a source file into its top-level units and their raw references
    fn parse(&self, path: &Path, contents: &str) -> Result<ParsedFile>;
}

/// Extract text from a node
pub fn node_text<'a>(node: tree_sitter::Node<'a>, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// 1-based line of a node
pub fn node_line(node: tree_sitter::Node) -> usize {
    node.start_position().row + 1
}
