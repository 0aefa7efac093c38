mod common;
mod java;

pub use common::{node_line, node_text, DeclaredUnit, Import, ParsedFile, Parser, TypeReference, UnitKind};
pub use java::JavaParser;
