//! fixbuf-compiler
//!
//! This crate implements:
//!  1) A tokenizer + parser for `.fbs` IDL files,
//!  2) A type table resolving builtin scalars, enums and tables,
//!  3) A layout planner assigning byte offsets and dynamic-slot indices,
//!  4) A 128-bit type-identity hasher and schema-descriptor builder,
//!  5) A code emitter (`generate_source` → declarations + definitions),
//!  6) Error types (`CompileError`).

pub mod compiler;
pub mod descriptor;
pub mod error;
pub mod gen_rust;
pub mod identity;
pub mod layout;
pub mod model;
pub mod parser;
pub mod tokenizer;
pub mod types;
pub mod typetable;
pub mod utils;

pub use compiler::{compile_schema, CompiledSchema, CompiledTable};
pub use error::CompileError;
pub use gen_rust::{generate_combined, generate_source, GeneratedSource};
