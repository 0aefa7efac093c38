use super::common::{node_line, node_text, DeclaredUnit, Import, ParsedFile, Parser, TypeReference, UnitKind};
use crate::graph::ReferenceKind;
use miette::{IntoDiagnostic, Result};
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser as TsParser};

/// Names that can sit in a type position but never denote a class
const NON_CLASS_TYPES: &[&str] = &[
    "var", "void", "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

/// Java source code parser using tree-sitter
pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }

    fn ts_parser() -> Result<TsParser> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_java::language())
            .into_diagnostic()?;
        Ok(parser)
    }

    fn extract_package(&self, root: Node, source: &str) -> Option<String> {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "package_declaration" {
                let mut pkg_cursor = child.walk();
                for pkg_child in child.children(&mut pkg_cursor) {
                    if pkg_child.kind() == "scoped_identifier" || pkg_child.kind() == "identifier" {
                        return Some(strip_whitespace(node_text(pkg_child, source)));
                    }
                }
            }
        }
        None
    }

    fn extract_imports(&self, root: Node, source: &str) -> Vec<Import> {
        let mut imports = Vec::new();
        let mut cursor = root.walk();

        for child in root.children(&mut cursor) {
            if child.kind() != "import_declaration" {
                continue;
            }

            let mut path = None;
            let mut wildcard = false;
            let mut is_static = false;

            let mut import_cursor = child.walk();
            for import_child in child.children(&mut import_cursor) {
                match import_child.kind() {
                    "scoped_identifier" | "identifier" => {
                        path = Some(strip_whitespace(node_text(import_child, source)));
                    }
                    "asterisk" => wildcard = true,
                    "static" => is_static = true,
                    _ => {}
                }
            }

            if let Some(path) = path {
                imports.push(Import {
                    path,
                    wildcard,
                    is_static,
                    line: node_line(child),
                });
            }
        }

        imports
    }

    fn extract_unit(
        &self,
        node: Node,
        kind: UnitKind,
        source: &str,
        file: &ParsedFile,
    ) -> Option<DeclaredUnit> {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())?;

        let mut references = Vec::new();
        self.extract_references(node, source, &mut references);

        Some(DeclaredUnit {
            qualified_name: file.qualify(&name),
            name,
            kind,
            line: node_line(node),
            references,
        })
    }

    /// Walk every node of a declaration and collect the type names that sit in
    /// a reference position.
    fn extract_references(&self, decl: Node, source: &str, out: &mut Vec<TypeReference>) {
        let mut cursor = decl.walk();

        loop {
            let current = cursor.node();

            match current.kind() {
                "superclass" | "super_interfaces" | "extends_interfaces" | "permits" => {
                    self.collect_named_children(current, source, ReferenceKind::Inheritance, out);
                }
                "field_declaration" => {
                    self.collect_field(current, "type", source, ReferenceKind::Field, out);
                }
                "local_variable_declaration" | "enhanced_for_statement" | "resource" => {
                    self.collect_field(current, "type", source, ReferenceKind::LocalVariable, out);
                }
                "formal_parameter" => {
                    self.collect_field(current, "type", source, ReferenceKind::Parameter, out);
                }
                "spread_parameter" | "catch_type" => {
                    self.collect_named_children(current, source, ReferenceKind::Parameter, out);
                }
                "method_declaration" | "annotation_type_element_declaration" => {
                    self.collect_field(current, "type", source, ReferenceKind::ReturnType, out);
                }
                "throws" => {
                    self.collect_named_children(current, source, ReferenceKind::Throws, out);
                }
                "object_creation_expression" | "array_creation_expression" => {
                    self.collect_field(current, "type", source, ReferenceKind::Instantiation, out);
                }
                "cast_expression" => {
                    let mut type_cursor = current.walk();
                    for ty in current.children_by_field_name("type", &mut type_cursor) {
                        self.collect_type(ty, source, ReferenceKind::Cast, out);
                    }
                }
                "instanceof_expression" => {
                    self.collect_field(current, "right", source, ReferenceKind::Cast, out);
                }
                "class_literal" => {
                    if let Some(ty) = current.named_child(0) {
                        self.collect_type(ty, source, ReferenceKind::ClassLiteral, out);
                    }
                }
                "type_bound" => {
                    self.collect_named_children(current, source, ReferenceKind::TypeArgument, out);
                }
                "marker_annotation" | "annotation" => {
                    if let Some(name) = current.child_by_field_name("name") {
                        push_reference(out, node_text(name, source), ReferenceKind::Annotation, name);
                    }
                }
                "method_invocation" | "field_access" => {
                    if let Some(object) = current.child_by_field_name("object") {
                        self.collect_static_receiver(object, source, out);
                    }
                }
                "method_reference" => {
                    if let Some(receiver) = current.named_child(0) {
                        if receiver.kind() == "identifier" {
                            self.collect_static_receiver(receiver, source, out);
                        } else {
                            self.collect_type(receiver, source, ReferenceKind::StaticAccess, out);
                        }
                    }
                }
                _ => {}
            }

            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.node() == decl {
                    return;
                }
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return;
                }
            }
        }
    }

    fn collect_field(
        &self,
        node: Node,
        field: &str,
        source: &str,
        kind: ReferenceKind,
        out: &mut Vec<TypeReference>,
    ) {
        if let Some(ty) = node.child_by_field_name(field) {
            self.collect_type(ty, source, kind, out);
        }
    }

    fn collect_named_children(
        &self,
        node: Node,
        source: &str,
        kind: ReferenceKind,
        out: &mut Vec<TypeReference>,
    ) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.collect_type(child, source, kind, out);
        }
    }

    /// Collect class names from a type node, descending into generics,
    /// arrays and type lists.
    fn collect_type(&self, node: Node, source: &str, kind: ReferenceKind, out: &mut Vec<TypeReference>) {
        match node.kind() {
            "type_identifier" => {
                push_reference(out, node_text(node, source), kind, node);
            }
            "scoped_type_identifier" => {
                if has_descendant(node, "type_arguments") {
                    self.collect_named_children(node, source, kind, out);
                } else {
                    push_reference(out, node_text(node, source), kind, node);
                }
            }
            "generic_type" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if child.kind() == "type_arguments" {
                        self.collect_named_children(child, source, ReferenceKind::TypeArgument, out);
                    } else {
                        self.collect_type(child, source, kind, out);
                    }
                }
            }
            "type_arguments" => {
                self.collect_named_children(node, source, ReferenceKind::TypeArgument, out);
            }
            "array_type" => {
                if let Some(element) = node.child_by_field_name("element") {
                    self.collect_type(element, source, kind, out);
                }
            }
            "integral_type" | "floating_point_type" | "boolean_type" | "void_type" => {}
            // Annotations, identifiers and expressions are handled by the main walk
            "marker_annotation" | "annotation" | "identifier" | "dimensions" => {}
            _ => self.collect_named_children(node, source, kind, out),
        }
    }

    /// `Foo.bar()`, `Foo.CONSTANT`, `Foo::bar`: a capitalised receiver is
    /// taken to be a class name.
    fn collect_static_receiver(&self, object: Node, source: &str, out: &mut Vec<TypeReference>) {
        if object.kind() != "identifier" {
            return;
        }
        let name = node_text(object, source);
        if name.chars().next().is_some_and(|c| c.is_uppercase()) {
            push_reference(out, name, ReferenceKind::StaticAccess, object);
        }
    }
}

fn push_reference(out: &mut Vec<TypeReference>, text: &str, kind: ReferenceKind, node: Node) {
    let name = strip_whitespace(text);
    if name.is_empty() || NON_CLASS_TYPES.contains(&name.as_str()) {
        return;
    }
    out.push(TypeReference {
        name,
        kind,
        line: node_line(node),
    });
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn has_descendant(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .any(|child| child.kind() == kind || has_descendant(child, kind));
    found
}

impl Parser for JavaParser {
    fn parse(&self, path: &Path, contents: &str) -> Result<ParsedFile> {
        let mut parser = Self::ts_parser()?;

        let tree = parser
            .parse(contents, None)
            .ok_or_else(|| miette::miette!("Failed to parse Java file"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(miette::miette!("Syntax errors in {}", path.display()));
        }

        let mut result = ParsedFile::new(path.to_path_buf());
        result.package = self.extract_package(root, contents);
        result.imports = self.extract_imports(root, contents);

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if let Some(kind) = UnitKind::from_node_kind(child.kind()) {
                if let Some(unit) = self.extract_unit(child, kind, contents, &result) {
                    result.units.push(unit);
                }
            }
        }

        debug!(
            "Parsed {}: {} units, {} imports",
            path.display(),
            result.units.len(),
            result.imports.len()
        );

        Ok(result)
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}
