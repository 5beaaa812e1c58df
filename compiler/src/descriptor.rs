use fixbuf_runtime::{FieldDescriptor, SchemaDescriptor};

use crate::layout::{LayoutEntry, Placement, TableLayout};
use crate::typetable::TypeCategory;

/// Display name used in descriptors: the storage repr for builtins and
/// enums, `record` for table-typed fields. Which table it is comes from the
/// nested-schema reference, not the tag.
pub fn display_type(entry: &LayoutEntry) -> &str {
    match entry.base.category {
        TypeCategory::Table => "record",
        _ => &entry.base.repr,
    }
}

/// Count column of a field tuple: the element count for bounded arrays, 0
/// for other static fields, and for dynamic fields the absolute byte offset
/// of the slot header's length word, a hint for generic tooling reading
/// raw buffers.
pub fn count_hint(entry: &LayoutEntry) -> usize {
    match entry.placement {
        Placement::Static => entry.count,
        Placement::Dynamic => entry.header_offset() + 8,
    }
}

/// Assemble the pure descriptor value for one table, fields in declaration
/// order.
///
/// Nested-schema references are late-bound function pointers in generated
/// code; a compiler-built descriptor has no generated accessors to point
/// at, so `nested` stays empty here and the emitter wires `Inner::schema`
/// into the rendered equivalent.
pub fn build_descriptor(layout: &TableLayout) -> SchemaDescriptor {
    let fields = layout
        .entries
        .iter()
        .map(|entry| FieldDescriptor {
            name: entry.field.name.clone(),
            base_type: display_type(entry).to_string(),
            offset_or_slot: entry.location,
            count: count_hint(entry),
            is_static: entry.placement == Placement::Static,
            nested: None,
        })
        .collect();

    SchemaDescriptor {
        name: layout.name.clone(),
        static_size: layout.static_size,
        dynamic_count: layout.dynamic_count,
        identity: layout.identity,
        fields,
    }
}
