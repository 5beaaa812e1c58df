use fixbuf_runtime::SchemaDescriptor;

use crate::descriptor::build_descriptor;
use crate::error::CompileError;
use crate::layout::{plan_table, TableLayout};
use crate::parser::parse_schema;
use crate::tokenizer::tokenize_schema;
use crate::typetable::{TypeCategory, TypeTable};
use crate::types::Ast;

/// Everything derived for one table: its layout and its descriptor value.
///
/// Each table gets its own context, built in declaration order and frozen
/// once emission starts; there is no compiler-global "current table" state.
#[derive(Debug, Clone)]
pub struct CompiledTable {
    pub layout: TableLayout,
    pub descriptor: SchemaDescriptor,
}

/// Result of running the full front half of the pipeline over one file.
#[derive(Debug)]
pub struct CompiledSchema {
    pub ast: Ast,
    pub tables: Vec<CompiledTable>,
}

/// Compile schema text through tokenize, parse, resolve, layout, identity
/// and descriptor assembly.
///
/// Tables are processed in declaration order against a type table that only
/// ever contains already-completed types, so forward references fail inside
/// [`plan_table`] without a fix-up pass.
pub fn compile_schema(text: &str) -> Result<CompiledSchema, CompileError> {
    let tokens = tokenize_schema(text)?;
    let ast = parse_schema(&tokens)?;

    let mut types = TypeTable::new();
    for decl in &ast.enums {
        types.register_enum(decl)?;
    }

    let mut tables = Vec::with_capacity(ast.tables.len());
    for table in &ast.tables {
        let layout = plan_table(&ast.namespace, table, &types)?;
        types.register_table(&layout.name, layout.static_size, layout.dynamic_count, layout.identity)?;
        let descriptor = build_descriptor(&layout);
        tables.push(CompiledTable { layout, descriptor });
    }

    if let Some(root) = &ast.root_type {
        let is_table = types
            .resolve(root)
            .map(|entry| entry.category == TypeCategory::Table)
            .unwrap_or(false);
        if !is_table {
            return Err(CompileError::UnresolvedType {
                type_name: root.clone(),
                field: "root_type".to_string(),
                table: "schema".to_string(),
            });
        }
    }

    Ok(CompiledSchema { ast, tables })
}
