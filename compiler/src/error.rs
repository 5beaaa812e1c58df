use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("grammar error at line {line}, column {column}: {msg}")]
    Grammar {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("unresolved type {type_name} referenced by field {field} of table {table}")]
    UnresolvedType {
        type_name: String,
        field:     String,
        table:     String,
    },

    #[error("the type {name} is declared twice")]
    DuplicateType { name: String },

    #[error("duplicate name {field} in {table}")]
    DuplicateField { table: String, field: String },

    #[error("unsupported default value {value} for field {field} of table {table}")]
    UnsupportedDefault {
        table: String,
        field: String,
        value: String,
    },

    #[error("field {field} of table {table} embeds {inner}, which has dynamic fields")]
    NestedDynamic {
        table: String,
        field: String,
        inner: String,
    },
}
