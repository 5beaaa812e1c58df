use serde::Serialize;

/// Parsed schema file: an ordered, position-tagged AST.
///
/// Declaration order is load-bearing: tables may only reference types that
/// appear earlier, and field order fixes both the binary layout and the
/// type identity.
#[derive(Debug, PartialEq, Serialize)]
pub struct Ast {
    pub namespace:  Vec<String>,
    pub enums:      Vec<EnumDecl>,
    pub tables:     Vec<TableDecl>,
    pub root_type:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub name:       String,
    pub line:       usize,
    pub column:     usize,
    /// Declared underlying scalar kind. Syntactic only: enums always occupy
    /// four bytes regardless of this.
    pub underlying: String,
    pub values:     Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDecl {
    pub name:   String,
    pub line:   usize,
    pub column: usize,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    pub name:        String,
    pub line:        usize,
    pub column:      usize,
    pub type_name:   String,
    pub cardinality: Cardinality,
    pub default:     Option<DefaultValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cardinality {
    /// `field: T;`
    Scalar,
    /// `field: [T];`
    DynamicArray,
    /// `field: [T:N];`
    StaticArray(usize),
}

/// Default literal as written. Only booleans and numeric tokens parse; the
/// numeric token is kept verbatim and type compatibility is not checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DefaultValue {
    Bool(bool),
    Number(String),
}
