use serde::{Deserialize, Serialize};

/// Position in which one class mentions another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// extends/implements
    Inheritance,

    /// Field type
    Field,

    /// Local variable type (including for-each and try-with-resources)
    LocalVariable,

    /// Parameter type (including varargs and catch parameters)
    Parameter,

    /// Method return type
    ReturnType,

    /// `throws` clause
    Throws,

    /// `new Foo()` / `new Foo[n]`
    Instantiation,

    /// Cast or instanceof
    Cast,

    /// `Foo.class`
    ClassLiteral,

    /// Annotation usage
    Annotation,

    /// `Foo.bar()`, `Foo.CONSTANT`, `Foo::bar`
    StaticAccess,

    /// Generic type argument or bound (e.g., `List<Foo>`)
    TypeArgument,

    /// Import statement
    Import,
}

impl ReferenceKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ReferenceKind::Inheritance => "supertype",
            ReferenceKind::Field => "field type",
            ReferenceKind::LocalVariable => "local variable type",
            ReferenceKind::Parameter => "parameter type",
            ReferenceKind::ReturnType => "return type",
            ReferenceKind::Throws => "throws clause",
            ReferenceKind::Instantiation => "instantiation",
            ReferenceKind::Cast => "cast",
            ReferenceKind::ClassLiteral => "class literal",
            ReferenceKind::Annotation => "annotation",
            ReferenceKind::StaticAccess => "static access",
            ReferenceKind::TypeArgument => "type argument",
            ReferenceKind::Import => "import",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
