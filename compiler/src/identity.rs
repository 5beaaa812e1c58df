use sha2::{Digest, Sha256};

use fixbuf_runtime::Uint128;

use crate::layout::{LayoutEntry, Placement};
use crate::types::Cardinality;

/// The type signature one field contributes to its table's identity.
///
/// Built from the resolved storage representation only. Field names and
/// default literals never appear, so renaming a field or changing a default
/// preserves the identity while retyping, rebounding or reordering breaks
/// it. Unbounded arrays append `Vector`; bounded arrays append their decimal
/// element count; a bare string is just its storage name.
pub fn field_signature(entry: &LayoutEntry) -> String {
    let mut signature = entry.base.repr.clone();
    match entry.field.cardinality {
        Cardinality::DynamicArray => signature.push_str("Vector"),
        Cardinality::StaticArray(bound) => signature.push_str(&bound.to_string()),
        Cardinality::Scalar => {}
    }
    debug_assert!(
        entry.placement != Placement::Dynamic
            || entry.field.cardinality == Cardinality::DynamicArray
            || entry.base.repr == "str"
    );
    signature
}

/// Digest a table's identity: each namespace component followed by `::`,
/// the table name, then every field signature in declaration order. The
/// first 16 digest bytes become the 128-bit identity, split big-endian into
/// two 64-bit halves.
pub fn table_identity(namespace: &[String], table: &str, entries: &[LayoutEntry]) -> Uint128 {
    let mut hasher = Sha256::new();
    for component in namespace {
        hasher.update(component.as_bytes());
        hasher.update(b"::");
    }
    hasher.update(table.as_bytes());
    for entry in entries {
        hasher.update(field_signature(entry).as_bytes());
    }

    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uint128::from_bytes(&bytes)
}
