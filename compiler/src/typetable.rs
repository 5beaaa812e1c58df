use std::collections::HashMap;

use fixbuf_runtime::Uint128;

use crate::error::CompileError;
use crate::types::EnumDecl;

/// Builtin type names accepted by the grammar. Eighteen fixed-width scalar
/// kinds plus the variable-width `string`.
pub const BUILTIN_NAMES: [&str; 19] = [
    "int", "uint", "float", "double", "byte", "short", "ubyte", "ushort",
    "ulong", "uint8_t", "uint16_t", "uint32_t", "uint64_t", "int8_t",
    "int16_t", "int32_t", "int64_t", "bool", "string",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Builtin,
    Enum,
    Table,
}

/// One resolvable type: a builtin scalar, a registered enum, or a table
/// that has already been laid out.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    /// Byte width: scalar width, 4 for enums, the static size for tables,
    /// and 1 for `string` (its bounded-array element width).
    pub size: usize,
    /// Storage representation name: the Rust scalar for builtins, `str` for
    /// strings, `u32` for enums, the table's own name for tables. Feeds both
    /// identity signatures and generated code.
    pub repr: String,
    pub category: TypeCategory,
    /// Dynamic-slot count for tables; 0 otherwise. Gates embedding.
    pub dynamic_count: usize,
    /// Type identity for tables.
    pub identity: Option<Uint128>,
}

impl TypeEntry {
    pub fn is_string(&self) -> bool {
        self.category == TypeCategory::Builtin && self.repr == "str"
    }

    fn builtin(size: usize, repr: &str) -> TypeEntry {
        TypeEntry {
            size,
            repr: repr.to_string(),
            category: TypeCategory::Builtin,
            dynamic_count: 0,
            identity: None,
        }
    }
}

/// Registry of every type a field reference may resolve to.
///
/// Populated in declaration order: builtins up front, each enum as it is
/// declared, each table only after its layout completes. Lookups therefore
/// reject forward references for free.
pub struct TypeTable {
    entries: HashMap<String, TypeEntry>,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        for (name, size, repr) in [
            ("int", 4, "i32"),
            ("uint", 4, "u32"),
            ("float", 4, "f32"),
            ("double", 8, "f64"),
            ("byte", 1, "i8"),
            ("short", 2, "i16"),
            ("ubyte", 1, "u8"),
            ("ushort", 2, "u16"),
            ("ulong", 8, "u64"),
            ("uint8_t", 1, "u8"),
            ("uint16_t", 2, "u16"),
            ("uint32_t", 4, "u32"),
            ("uint64_t", 8, "u64"),
            ("int8_t", 1, "i8"),
            ("int16_t", 2, "i16"),
            ("int32_t", 4, "i32"),
            ("int64_t", 8, "i64"),
            ("bool", 1, "bool"),
            ("string", 1, "str"),
        ] {
            entries.insert(name.to_string(), TypeEntry::builtin(size, repr));
        }
        TypeTable { entries }
    }

    /// Register a declared enum. Enums always occupy four bytes; the
    /// declared underlying kind is syntactic only. Value names must be
    /// unique.
    pub fn register_enum(&mut self, decl: &EnumDecl) -> Result<(), CompileError> {
        let mut seen = Vec::new();
        for value in &decl.values {
            if seen.contains(&value) {
                return Err(CompileError::DuplicateField {
                    table: decl.name.clone(),
                    field: value.clone(),
                });
            }
            seen.push(value);
        }
        self.insert(
            &decl.name,
            TypeEntry {
                size: 4,
                repr: "u32".to_string(),
                category: TypeCategory::Enum,
                dynamic_count: 0,
                identity: None,
            },
        )
    }

    /// Register a fully laid-out table so later tables can embed or array
    /// it. Byte size is the table's own static size.
    pub fn register_table(
        &mut self,
        name: &str,
        static_size: usize,
        dynamic_count: usize,
        identity: Uint128,
    ) -> Result<(), CompileError> {
        self.insert(
            name,
            TypeEntry {
                size: static_size,
                repr: name.to_string(),
                category: TypeCategory::Table,
                dynamic_count,
                identity: Some(identity),
            },
        )
    }

    fn insert(&mut self, name: &str, entry: TypeEntry) -> Result<(), CompileError> {
        if self.entries.contains_key(name) {
            return Err(CompileError::DuplicateType { name: name.to_string() });
        }
        self.entries.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<&TypeEntry> {
        self.entries.get(name)
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        TypeTable::new()
    }
}
