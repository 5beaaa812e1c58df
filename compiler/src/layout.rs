use std::collections::HashSet;

use fixbuf_runtime::{Uint128, SLOT_HEADER_SIZE, VERSION_HEADER_SIZE};

use crate::error::CompileError;
use crate::identity;
use crate::typetable::{TypeCategory, TypeTable};
use crate::types::{Cardinality, FieldDecl, TableDecl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Static,
    Dynamic,
}

/// A field's resolved base type, carrying everything the later stages need
/// without another registry lookup.
#[derive(Debug, Clone)]
pub struct ResolvedBase {
    /// The referenced type name as written in the schema.
    pub name: String,
    /// Storage representation: scalar repr, `u32` for enums, `str` for
    /// strings, the table name for tables.
    pub repr: String,
    pub category: TypeCategory,
    /// Element byte width: scalar width, 4 for enums, the static size for
    /// tables, 1 for string bytes.
    pub elem_size: usize,
}

impl ResolvedBase {
    pub fn is_table(&self) -> bool {
        self.category == TypeCategory::Table
    }
}

/// One field placed in a table's image.
#[derive(Debug, Clone)]
pub struct LayoutEntry {
    pub field: FieldDecl,
    pub base: ResolvedBase,
    pub placement: Placement,
    /// Byte offset for static fields, dynamic-slot index otherwise.
    pub location: usize,
    /// Total bytes occupied in the static region; 0 for dynamic fields.
    pub byte_size: usize,
    /// Element count for bounded arrays, 0 otherwise.
    pub count: usize,
}

impl LayoutEntry {
    /// Byte offset of the field's 16-byte slot header. Dynamic fields only.
    pub fn header_offset(&self) -> usize {
        VERSION_HEADER_SIZE + self.location * SLOT_HEADER_SIZE
    }
}

/// Final layout of one table: entries in declaration order plus the derived
/// sizes and identity. Computed once, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct TableLayout {
    pub name: String,
    pub namespace: Vec<String>,
    pub entries: Vec<LayoutEntry>,
    pub static_size: usize,
    pub dynamic_count: usize,
    pub identity: Uint128,
}

/// A field is dynamic iff it is an unbounded array or a bare string.
/// Everything else is static, including table-typed scalars and bounded
/// arrays of any element type.
fn placement_of(field: &FieldDecl, base: &ResolvedBase) -> Placement {
    match field.cardinality {
        Cardinality::DynamicArray => Placement::Dynamic,
        Cardinality::Scalar if base.category == TypeCategory::Builtin && base.repr == "str" => {
            Placement::Dynamic
        }
        _ => Placement::Static,
    }
}

fn resolve_base(
    table: &TableDecl,
    field: &FieldDecl,
    types: &TypeTable,
) -> Result<ResolvedBase, CompileError> {
    let entry = types.resolve(&field.type_name).ok_or_else(|| CompileError::UnresolvedType {
        type_name: field.type_name.clone(),
        field: field.name.clone(),
        table: table.name.clone(),
    })?;

    // A table used as a field (embedded, bounded array, or dynamic array
    // element) must itself be fully static: there is no buffer region for
    // a nested record's own dynamic payloads.
    if entry.category == TypeCategory::Table && entry.dynamic_count > 0 {
        return Err(CompileError::NestedDynamic {
            table: table.name.clone(),
            field: field.name.clone(),
            inner: field.type_name.clone(),
        });
    }

    Ok(ResolvedBase {
        name: field.type_name.clone(),
        repr: entry.repr.clone(),
        category: entry.category,
        elem_size: entry.size,
    })
}

fn check_default(table: &TableDecl, field: &FieldDecl, base: &ResolvedBase) -> Result<(), CompileError> {
    if field.default.is_none() {
        return Ok(());
    }
    let supported = field.cardinality == Cardinality::Scalar
        && match base.category {
            TypeCategory::Builtin => base.repr != "str",
            TypeCategory::Enum => true,
            TypeCategory::Table => false,
        };
    if !supported {
        return Err(CompileError::UnsupportedDefault {
            table: table.name.clone(),
            field: field.name.clone(),
            value: format!("{:?}", field.default.as_ref().unwrap()),
        });
    }
    Ok(())
}

/// Plan one table: resolve every field, classify it, and assign offsets and
/// slot indices in two declaration-order passes.
///
/// Pass 1 walks the dynamic fields, handing out slot indices and reserving
/// one 16-byte header each. Pass 2 walks the static fields, packing their
/// payloads after the last header. The cursor starts at 4, past the
/// format-version word, so the image is always
/// `[version][slot headers, field order][static payloads, field order]`.
pub fn plan_table(
    namespace: &[String],
    table: &TableDecl,
    types: &TypeTable,
) -> Result<TableLayout, CompileError> {
    let mut seen = HashSet::new();
    for field in &table.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(CompileError::DuplicateField {
                table: table.name.clone(),
                field: field.name.clone(),
            });
        }
    }

    let mut entries = Vec::with_capacity(table.fields.len());
    for field in &table.fields {
        let base = resolve_base(table, field, types)?;
        check_default(table, field, &base)?;
        let placement = placement_of(field, &base);
        entries.push(LayoutEntry {
            field: field.clone(),
            base,
            placement,
            location: 0,
            byte_size: 0,
            count: 0,
        });
    }

    // Pass 1: dynamic fields take slot indices, the cursor walks over their
    // headers.
    let mut cursor = VERSION_HEADER_SIZE;
    let mut next_slot = 0;
    for entry in entries.iter_mut() {
        if entry.placement == Placement::Dynamic {
            entry.location = next_slot;
            next_slot += 1;
            cursor += SLOT_HEADER_SIZE;
        }
    }

    // Pass 2: static fields pack after the headers.
    for entry in entries.iter_mut() {
        if entry.placement == Placement::Static {
            let (count, bytes) = match entry.field.cardinality {
                Cardinality::Scalar => (0, entry.base.elem_size),
                Cardinality::StaticArray(n) => (n, n * entry.base.elem_size),
                Cardinality::DynamicArray => unreachable!("dynamic arrays are never static"),
            };
            entry.location = cursor;
            entry.count = count;
            entry.byte_size = bytes;
            cursor += bytes;
        }
    }

    let identity = identity::table_identity(namespace, &table.name, &entries);

    Ok(TableLayout {
        name: table.name.clone(),
        namespace: namespace.to_vec(),
        entries,
        static_size: cursor,
        dynamic_count: next_slot,
        identity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_schema;
    use crate::tokenizer::tokenize_schema;
    use crate::types::Ast;

    fn parse(input: &str) -> Ast {
        parse_schema(&tokenize_schema(input).unwrap()).unwrap()
    }

    fn plan_all(input: &str) -> Result<Vec<TableLayout>, CompileError> {
        let ast = parse(input);
        let mut types = TypeTable::new();
        for decl in &ast.enums {
            types.register_enum(decl)?;
        }
        let mut layouts = Vec::new();
        for table in &ast.tables {
            let layout = plan_table(&ast.namespace, table, &types)?;
            types.register_table(&layout.name, layout.static_size, layout.dynamic_count, layout.identity)?;
            layouts.push(layout);
        }
        Ok(layouts)
    }

    #[test]
    fn headers_precede_statics_regardless_of_interleaving() {
        // F1 dynamic, F2 static 4B, F3 dynamic, F4 static 8B.
        let layouts = plan_all(
            "table T { f1: [uint]; f2: int; f3: string; f4: double; }",
        )
        .unwrap();
        let layout = &layouts[0];

        assert_eq!(layout.dynamic_count, 2);
        assert_eq!(layout.static_size, 48);

        let f1 = &layout.entries[0];
        assert_eq!(f1.placement, Placement::Dynamic);
        assert_eq!(f1.location, 0);
        assert_eq!(f1.header_offset(), 4);

        let f2 = &layout.entries[1];
        assert_eq!(f2.placement, Placement::Static);
        assert_eq!(f2.location, 36);
        assert_eq!(f2.byte_size, 4);

        let f3 = &layout.entries[2];
        assert_eq!(f3.location, 1);
        assert_eq!(f3.header_offset(), 20);

        let f4 = &layout.entries[3];
        assert_eq!(f4.location, 40);
        assert_eq!(f4.byte_size, 8);
    }

    #[test]
    fn bounded_arrays_occupy_count_times_width() {
        let layouts = plan_all("table T { a: [short:3]; b: byte; }").unwrap();
        let layout = &layouts[0];
        assert_eq!(layout.dynamic_count, 0);

        let a = &layout.entries[0];
        assert_eq!(a.location, 4);
        assert_eq!(a.count, 3);
        assert_eq!(a.byte_size, 6);

        let b = &layout.entries[1];
        assert_eq!(b.location, 10);
        assert_eq!(layout.static_size, 11);
    }

    #[test]
    fn embedded_tables_are_inline_sub_images() {
        let layouts = plan_all(
            "table Inner { a: int; b: int; } table Outer { inner: Inner; }",
        )
        .unwrap();
        assert_eq!(layouts[0].static_size, 12);

        let outer = &layouts[1];
        assert_eq!(outer.static_size, 16);
        assert_eq!(outer.dynamic_count, 0);
        assert_eq!(outer.entries[0].location, 4);
        assert_eq!(outer.entries[0].byte_size, 12);
    }

    #[test]
    fn bounded_arrays_of_tables_embed_contiguously() {
        let layouts = plan_all(
            "table Inner { a: int; } table Outer { pair: [Inner:2]; tail: byte; }",
        )
        .unwrap();
        // Inner.static_size == 8; two embedded images plus the version word.
        let outer = &layouts[1];
        assert_eq!(outer.entries[0].location, 4);
        assert_eq!(outer.entries[0].byte_size, 16);
        assert_eq!(outer.entries[1].location, 20);
        assert_eq!(outer.static_size, 21);
    }

    #[test]
    fn enum_fields_occupy_four_bytes() {
        let layouts = plan_all(
            "enum Color : ubyte { Red, Green } table T { c: Color; tail: byte; }",
        )
        .unwrap();
        let layout = &layouts[0];
        assert_eq!(layout.entries[0].byte_size, 4);
        assert_eq!(layout.entries[1].location, 8);
    }

    #[test]
    fn forward_references_are_rejected() {
        let err = plan_all("table Outer { inner: Inner; } table Inner { a: int; }").unwrap_err();
        assert!(
            matches!(err, CompileError::UnresolvedType { ref type_name, .. } if type_name == "Inner"),
            "expected an unresolved-type error but got {:?}",
            err
        );
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let err = plan_all("table T { x: int; x: float; }").unwrap_err();
        assert!(matches!(err, CompileError::DuplicateField { .. }));
    }

    #[test]
    fn embedding_a_dynamic_table_is_rejected() {
        let err = plan_all(
            "table Inner { name: string; } table Outer { inner: Inner; }",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::NestedDynamic { .. }));

        let err = plan_all(
            "table Inner { name: string; } table Outer { pairs: [Inner]; }",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::NestedDynamic { .. }));
    }

    #[test]
    fn defaults_are_limited_to_scalar_builtins_and_enums() {
        assert!(plan_all("table T { x: int = 3; }").is_ok());
        assert!(plan_all("enum M : int { A } table T { m: M = 0; }").is_ok());

        let err = plan_all("table T { xs: [int:2] = 3; }").unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedDefault { .. }));

        let err = plan_all("table T { s: string = 1; }").unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedDefault { .. }));
    }

    #[test]
    fn empty_table_is_just_the_version_header() {
        let layouts = plan_all("table Empty { }").unwrap();
        assert_eq!(layouts[0].static_size, 4);
        assert_eq!(layouts[0].dynamic_count, 0);
    }
}
