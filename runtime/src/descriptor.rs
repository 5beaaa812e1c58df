use crate::uint128::Uint128;

/// Late-bound reference to a nested table's descriptor.
///
/// Descriptors reference each other through accessor functions rather than
/// values so mutually referential schemas resolve lazily instead of
/// recursing at construction.
pub type SchemaFn = fn() -> SchemaDescriptor;

/// One field of a [`SchemaDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Storage display name: a scalar repr such as `i32`, `u32` for enums,
    /// `str` for strings, or `record` for table-typed fields.
    pub base_type: String,
    /// Byte offset for static fields, dynamic-slot index otherwise.
    pub offset_or_slot: usize,
    /// Element count for bounded arrays, 0 for static scalars, and for
    /// dynamic fields the byte offset of the slot header's length word.
    pub count: usize,
    pub is_static: bool,
    /// Populated only when the field's base type is itself a table.
    pub nested: Option<SchemaFn>,
}

/// Purely derived, runtime-introspectable description of one table's layout.
///
/// Generated types expose this through a stateless `schema()` accessor; the
/// value is rebuilt on every call and never aliases record storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    pub name: String,
    pub static_size: usize,
    pub dynamic_count: usize,
    pub identity: Uint128,
    /// Field descriptors in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    /// Look up a field descriptor by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}
