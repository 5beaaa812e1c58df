//! fixbuf
//!
//! This crate is the facade generated code and applications link against.
//!
//! - Runtime support (re-exported from `fixbuf-runtime`): `Record`,
//!   allocators, vector views, `Uint128` identities, schema descriptors.
//! - The compiler pipeline (re-exported from `fixbuf-compiler`) for tools
//!   that embed schema compilation.
//!
//! Generated sources reference everything through `::fixbuf::…` paths, so a
//! crate holding generated code only needs this one dependency.

pub use fixbuf_runtime::{
    Allocator, FieldDescriptor, HeapAllocator, Record, RecordError, RecordVector,
    RecordVectorMut, Scalar, SchemaDescriptor, SchemaFn, StaticSubAllocator, TypedRecord,
    Uint128, Vector, VectorMut, FORMAT_VERSION, SLOT_HEADER_SIZE, VERSION_HEADER_SIZE,
};

pub use fixbuf_compiler::{
    compile_schema, generate_combined, generate_source, CompileError, CompiledSchema,
    GeneratedSource,
};

/// Compile schema text and render the parsed AST as pretty JSON, for
/// tooling that inspects schemas without generating code.
pub fn schema_to_json(text: &str) -> Result<String, CompileError> {
    let compiled = compile_schema(text)?;
    Ok(serde_json::to_string_pretty(&compiled.ast).unwrap())
}

pub mod error {
    pub use fixbuf_compiler::error::CompileError;
    pub use fixbuf_runtime::error::RecordError;
}

pub mod runtime {
    pub use fixbuf_runtime::*;
}

pub mod compiler {
    pub use fixbuf_compiler::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_to_json_round_trips_the_ast() {
        let json = schema_to_json("namespace app; table T { a: int; }").unwrap();
        assert!(json.contains("\"namespace\""));
        assert!(json.contains("\"app\""));
        assert!(json.contains("\"tables\""));
    }

    #[test]
    fn facade_exposes_the_generated_code_surface() {
        // The names generated sources reference through `::fixbuf::…`.
        let mut record = Record::new(VERSION_HEADER_SIZE + 4, 0);
        record.set::<u32>(4, 7);
        assert_eq!(record.get::<u32>(4), 7);
        assert!(Uint128::new(0, 0).is_zero());
    }
}
