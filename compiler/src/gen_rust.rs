//! Rust backend: lowers compiled tables to the code model and renders the
//! declarations and definitions artifacts.
//!
//! Generated types wrap a `::fixbuf::Record` and expose the accessor surface
//! for each field category. All runtime references are fully qualified, so
//! the generated file only assumes a `fixbuf` dependency.

use crate::compiler::{CompiledSchema, CompiledTable};
use crate::descriptor::{count_hint, display_type};
use crate::layout::{LayoutEntry, Placement};
use crate::model::{
    CodeModel, ConstDef, EnumDef, ImplBlock, Item, Method, Receiver, Stmt, StructDef,
};
use crate::typetable::TypeCategory;
use crate::types::{Cardinality, DefaultValue, EnumDecl};
use crate::utils::quote;

/// Rendered output for one schema file.
#[derive(Debug, PartialEq)]
pub struct GeneratedSource {
    /// `<base>.rs`: enums, structs, namespace modules, trailing `include!`.
    pub declarations: String,
    /// `<base>_impl.rs`: every impl block.
    pub definitions: String,
}

/// Render the two-artifact form. `base` is the input's base name and names
/// the definitions file the declarations include.
pub fn generate_source(schema: &CompiledSchema, base: &str) -> GeneratedSource {
    let model = lower(schema);
    GeneratedSource {
        declarations: model.render_declarations(&format!("{}_impl.rs", base)),
        definitions: model.render_definitions(),
    }
}

/// Render the single-stream form used by combined output.
pub fn generate_combined(schema: &CompiledSchema) -> String {
    lower(schema).render_combined()
}

/// Lower a compiled schema to the code model.
pub fn lower(schema: &CompiledSchema) -> CodeModel {
    let mut items = Vec::new();
    let mut impls = Vec::new();

    for decl in &schema.ast.enums {
        items.push(Item::Enum(lower_enum(decl)));
        impls.push(lower_enum_impl(decl));
    }
    for table in &schema.tables {
        let name = to_pascal_case(&table.layout.name);
        items.push(Item::Struct(StructDef {
            name: name.clone(),
            attrs: vec!["#[derive(Debug)]".to_string()],
            fields: vec![("record".to_string(), "::fixbuf::Record".to_string())],
        }));
        impls.push(lower_table_impl(table, &name));
        impls.push(default_impl(&name));
        impls.push(clone_impl(&name));
        impls.push(typed_record_impl(&name));
    }

    CodeModel {
        namespace: schema.ast.namespace.clone(),
        uses: vec!["::fixbuf::TypedRecord as _".to_string()],
        items,
        impls,
    }
}

fn lower_enum(decl: &EnumDecl) -> EnumDef {
    EnumDef {
        name: to_pascal_case(&decl.name),
        attrs: vec![
            "#[derive(Debug, Clone, Copy, PartialEq, Eq)]".to_string(),
            "#[repr(u32)]".to_string(),
        ],
        variants: decl.values.iter().map(|value| variant_name(value)).collect(),
    }
}

fn lower_enum_impl(decl: &EnumDecl) -> ImplBlock {
    let name = to_pascal_case(&decl.name);
    let mut arms: Vec<(String, String)> = decl
        .values
        .iter()
        .enumerate()
        .map(|(raw, value)| (raw.to_string(), format!("Some({}::{})", name, variant_name(value))))
        .collect();
    arms.push(("_".to_string(), "None".to_string()));

    ImplBlock {
        target: name.clone(),
        of_trait: None,
        consts: vec![],
        methods: vec![Method {
            name: "from_raw".to_string(),
            receiver: Receiver::None,
            params: vec![("raw".to_string(), "u32".to_string())],
            ret: Some(format!("Option<{}>", name)),
            body: vec![Stmt::Match { expr: "raw".to_string(), arms }],
        }],
    }
}

fn lower_table_impl(table: &CompiledTable, name: &str) -> ImplBlock {
    let layout = &table.layout;
    let mut methods = vec![
        new_method(table, name),
        from_record_method(name),
        from_compatible_method(),
    ];
    for entry in &layout.entries {
        if entry.placement == Placement::Dynamic {
            methods.extend(dynamic_accessors(entry));
        }
    }
    for entry in &layout.entries {
        if entry.placement == Placement::Static {
            methods.extend(static_accessors(entry));
        }
    }
    methods.push(identity_method(layout.identity.high(), layout.identity.low()));
    methods.push(schema_method(table, name));

    ImplBlock {
        target: name.to_string(),
        of_trait: None,
        consts: vec![
            ConstDef {
                name: "STATIC_SIZE".to_string(),
                ty: "usize".to_string(),
                value: layout.static_size.to_string(),
            },
            ConstDef {
                name: "DYNAMIC_COUNT".to_string(),
                ty: "usize".to_string(),
                value: layout.dynamic_count.to_string(),
            },
        ],
        methods,
    }
}

/// `new()` sizes the storage and applies default literals in field order.
fn new_method(table: &CompiledTable, name: &str) -> Method {
    let defaults: Vec<&LayoutEntry> = table
        .layout
        .entries
        .iter()
        .filter(|entry| entry.field.default.is_some())
        .collect();

    let mut body = vec![Stmt::Let {
        name: "record".to_string(),
        mutable: !defaults.is_empty(),
        ty: None,
        expr: "::fixbuf::Record::new(Self::STATIC_SIZE, Self::DYNAMIC_COUNT)".to_string(),
    }];
    for entry in defaults {
        let repr = &entry.base.repr;
        let literal = default_literal(entry.field.default.as_ref().unwrap(), repr);
        body.push(Stmt::Expr(format!(
            "record.set::<{}>({}, {})",
            repr, entry.location, literal
        )));
    }
    body.push(Stmt::Tail(format!("{} {{ record }}", name)));

    Method {
        name: "new".to_string(),
        receiver: Receiver::None,
        params: vec![],
        ret: Some("Self".to_string()),
        body,
    }
}

fn from_record_method(name: &str) -> Method {
    Method {
        name: "from_record".to_string(),
        receiver: Receiver::None,
        params: vec![("record".to_string(), "::fixbuf::Record".to_string())],
        ret: Some("Self".to_string()),
        body: vec![Stmt::Tail(format!("{} {{ record }}", name))],
    }
}

/// Converting constructor: adopts any record of the same identity.
fn from_compatible_method() -> Method {
    Method {
        name: "from_compatible".to_string(),
        receiver: Receiver::None,
        params: vec![(
            "source".to_string(),
            "&dyn ::fixbuf::TypedRecord".to_string(),
        )],
        ret: Some("Result<Self, ::fixbuf::RecordError>".to_string()),
        body: vec![
            Stmt::If {
                cond: "source.type_identity() != Self::identity()".to_string(),
                then: vec![Stmt::Return(
                    "Err(::fixbuf::RecordError::IdentityMismatch { \
                     expected: Self::identity(), found: source.type_identity() })"
                        .to_string(),
                )],
            },
            Stmt::Let {
                name: "value".to_string(),
                mutable: true,
                ty: None,
                expr: "Self::new()".to_string(),
            },
            Stmt::Expr("value.record.copy_from(source.record())".to_string()),
            Stmt::Tail("Ok(value)".to_string()),
        ],
    }
}

fn identity_method(high: u64, low: u64) -> Method {
    Method {
        name: "identity".to_string(),
        receiver: Receiver::None,
        params: vec![],
        ret: Some("::fixbuf::Uint128".to_string()),
        body: vec![Stmt::Tail(format!(
            "::fixbuf::Uint128::new(0x{:016x}, 0x{:016x})",
            high, low
        ))],
    }
}

/// `schema()` rebuilds the descriptor value on every call; nested table
/// references are late-bound through the inner type's own `schema` fn.
fn schema_method(table: &CompiledTable, name: &str) -> Method {
    let entries = &table.layout.entries;
    let mut body = vec![Stmt::Let {
        name: "fields".to_string(),
        mutable: !entries.is_empty(),
        ty: None,
        expr: "Vec::new()".to_string(),
    }];
    for entry in entries {
        let nested = if entry.base.is_table() {
            format!("Some({}::schema)", to_pascal_case(&entry.base.name))
        } else {
            "None".to_string()
        };
        body.push(Stmt::Expr(format!(
            "fields.push(::fixbuf::FieldDescriptor {{ name: {}.to_string(), \
             base_type: {}.to_string(), offset_or_slot: {}, count: {}, \
             is_static: {}, nested: {} }})",
            quote(&entry.field.name),
            quote(display_type(entry)),
            entry.location,
            count_hint(entry),
            entry.placement == Placement::Static,
            nested,
        )));
    }
    body.push(Stmt::Tail(format!(
        "::fixbuf::SchemaDescriptor {{ name: {}.to_string(), \
         static_size: Self::STATIC_SIZE, dynamic_count: Self::DYNAMIC_COUNT, \
         identity: Self::identity(), fields }}",
        quote(name),
    )));

    Method {
        name: "schema".to_string(),
        receiver: Receiver::None,
        params: vec![],
        ret: Some("::fixbuf::SchemaDescriptor".to_string()),
        body,
    }
}

fn default_impl(name: &str) -> ImplBlock {
    ImplBlock {
        target: name.to_string(),
        of_trait: Some("Default".to_string()),
        consts: vec![],
        methods: vec![Method {
            name: "default".to_string(),
            receiver: Receiver::None,
            params: vec![],
            ret: Some("Self".to_string()),
            body: vec![Stmt::Tail(format!("{}::new()", name))],
        }],
    }
}

fn clone_impl(name: &str) -> ImplBlock {
    ImplBlock {
        target: name.to_string(),
        of_trait: Some("Clone".to_string()),
        consts: vec![],
        methods: vec![
            Method {
                name: "clone".to_string(),
                receiver: Receiver::Shared,
                params: vec![],
                ret: Some("Self".to_string()),
                body: vec![
                    Stmt::Let {
                        name: "value".to_string(),
                        mutable: true,
                        ty: None,
                        expr: format!("{}::new()", name),
                    },
                    Stmt::Expr("value.record.copy_from(&self.record)".to_string()),
                    Stmt::Tail("value".to_string()),
                ],
            },
            Method {
                name: "clone_from".to_string(),
                receiver: Receiver::Exclusive,
                params: vec![("source".to_string(), "&Self".to_string())],
                ret: None,
                body: vec![Stmt::Expr("self.record.copy_from(&source.record)".to_string())],
            },
        ],
    }
}

fn typed_record_impl(name: &str) -> ImplBlock {
    ImplBlock {
        target: name.to_string(),
        of_trait: Some("::fixbuf::TypedRecord".to_string()),
        consts: vec![],
        methods: vec![
            Method {
                name: "type_identity".to_string(),
                receiver: Receiver::Shared,
                params: vec![],
                ret: Some("::fixbuf::Uint128".to_string()),
                body: vec![Stmt::Tail(format!("{}::identity()", name))],
            },
            Method {
                name: "record".to_string(),
                receiver: Receiver::Shared,
                params: vec![],
                ret: Some("&::fixbuf::Record".to_string()),
                body: vec![Stmt::Tail("&self.record".to_string())],
            },
            Method {
                name: "record_mut".to_string(),
                receiver: Receiver::Exclusive,
                params: vec![],
                ret: Some("&mut ::fixbuf::Record".to_string()),
                body: vec![Stmt::Tail("&mut self.record".to_string())],
            },
        ],
    }
}

/// Accessors for one dynamic field: typed views, a materializing copy, and
/// a payload-replacing setter; strings add byte-level access.
fn dynamic_accessors(entry: &LayoutEntry) -> Vec<Method> {
    let f = to_snake_case(&entry.field.name);
    let slot = entry.location;

    if entry.base.is_table() {
        let inner = to_pascal_case(&entry.base.name);
        return vec![
            getter(
                &format!("get_{}", f),
                "::fixbuf::RecordVector<'_>",
                format!("self.record.record_vector({}, {}::STATIC_SIZE)", slot, inner),
            ),
            mut_getter(
                &format!("get_{}_mut", f),
                "::fixbuf::RecordVectorMut<'_>",
                format!("self.record.record_vector_mut({}, {}::STATIC_SIZE)", slot, inner),
            ),
            Method {
                name: format!("get_{}_vector", f),
                receiver: Receiver::Shared,
                params: vec![],
                ret: Some(format!("Vec<{}>", inner)),
                body: vec![
                    Stmt::Let {
                        name: "vec".to_string(),
                        mutable: false,
                        ty: None,
                        expr: format!("self.record.record_vector({}, {}::STATIC_SIZE)", slot, inner),
                    },
                    Stmt::Tail(format!(
                        "(0..vec.len()).filter_map(|i| vec.at(i)).map({}::from_record).collect()",
                        inner
                    )),
                ],
            },
            Method {
                name: format!("set_{}", f),
                receiver: Receiver::Exclusive,
                params: vec![("values".to_string(), format!("&[{}]", inner))],
                ret: None,
                body: vec![
                    notify(),
                    Stmt::Let {
                        name: "payload".to_string(),
                        mutable: true,
                        ty: None,
                        expr: "Vec::new()".to_string(),
                    },
                    Stmt::For {
                        pattern: "value".to_string(),
                        iter: "values".to_string(),
                        body: vec![Stmt::Expr(
                            "payload.extend_from_slice(&value.record.snapshot())".to_string(),
                        )],
                    },
                    Stmt::Expr(format!("self.record.set_dynamic({}, &payload)", slot)),
                ],
            },
        ];
    }

    if entry.field.cardinality == Cardinality::DynamicArray && entry.base.repr == "str" {
        // `[string]`: the payload is a sequence of u64-length-prefixed byte
        // runs, decoded and encoded entirely here.
        return vec![
            Method {
                name: format!("get_{}_vector", f),
                receiver: Receiver::Shared,
                params: vec![],
                ret: Some("Vec<String>".to_string()),
                body: vec![
                    Stmt::Let {
                        name: "payload".to_string(),
                        mutable: false,
                        ty: None,
                        expr: format!("self.record.dynamic_payload({})", slot),
                    },
                    Stmt::Let {
                        name: "out".to_string(),
                        mutable: true,
                        ty: None,
                        expr: "Vec::new()".to_string(),
                    },
                    Stmt::Let {
                        name: "at".to_string(),
                        mutable: true,
                        ty: None,
                        expr: "0".to_string(),
                    },
                    Stmt::While {
                        cond: "at + 8 <= payload.len()".to_string(),
                        body: vec![
                            Stmt::Let {
                                name: "word".to_string(),
                                mutable: true,
                                ty: None,
                                expr: "[0u8; 8]".to_string(),
                            },
                            Stmt::Expr("word.copy_from_slice(&payload[at..at + 8])".to_string()),
                            Stmt::Let {
                                name: "len".to_string(),
                                mutable: false,
                                ty: None,
                                expr: "u64::from_ne_bytes(word) as usize".to_string(),
                            },
                            Stmt::Expr("at += 8".to_string()),
                            Stmt::Expr(
                                "out.push(String::from_utf8_lossy(&payload[at..at + len]).into_owned())"
                                    .to_string(),
                            ),
                            Stmt::Expr("at += len".to_string()),
                        ],
                    },
                    Stmt::Tail("out".to_string()),
                ],
            },
            Method {
                name: format!("set_{}", f),
                receiver: Receiver::Exclusive,
                params: vec![("values".to_string(), "&[&str]".to_string())],
                ret: None,
                body: vec![
                    notify(),
                    Stmt::Let {
                        name: "payload".to_string(),
                        mutable: true,
                        ty: None,
                        expr: "Vec::new()".to_string(),
                    },
                    Stmt::For {
                        pattern: "value".to_string(),
                        iter: "values".to_string(),
                        body: vec![
                            Stmt::Expr(
                                "payload.extend_from_slice(&(value.len() as u64).to_ne_bytes())"
                                    .to_string(),
                            ),
                            Stmt::Expr("payload.extend_from_slice(value.as_bytes())".to_string()),
                        ],
                    },
                    Stmt::Expr(format!("self.record.set_dynamic({}, &payload)", slot)),
                ],
            },
        ];
    }

    if entry.field.cardinality == Cardinality::Scalar {
        // Bare string field.
        return vec![
            getter(
                &format!("get_{}", f),
                "::fixbuf::Vector<'_, u8>",
                format!("self.record.vector::<u8>({})", slot),
            ),
            mut_getter(
                &format!("get_{}_mut", f),
                "::fixbuf::VectorMut<'_, u8>",
                format!("self.record.vector_mut::<u8>({})", slot),
            ),
            getter(
                &format!("get_{}_vector", f),
                "Vec<u8>",
                format!("self.record.vector::<u8>({}).to_vec()", slot),
            ),
            getter(
                &format!("get_{}_string", f),
                "String",
                format!(
                    "String::from_utf8_lossy(&self.record.dynamic_payload({})).into_owned()",
                    slot
                ),
            ),
            setter(
                &format!("set_{}_string", f),
                ("value", "&str"),
                format!("self.record.set_dynamic({}, value.as_bytes())", slot),
            ),
        ];
    }

    // Unbounded array of a builtin or enum element.
    let elem = element_type(entry);
    vec![
        getter(
            &format!("get_{}", f),
            &format!("::fixbuf::Vector<'_, {}>", elem),
            format!("self.record.vector::<{}>({})", elem, slot),
        ),
        mut_getter(
            &format!("get_{}_mut", f),
            &format!("::fixbuf::VectorMut<'_, {}>", elem),
            format!("self.record.vector_mut::<{}>({})", elem, slot),
        ),
        getter(
            &format!("get_{}_vector", f),
            &format!("Vec<{}>", elem),
            format!("self.record.vector::<{}>({}).to_vec()", elem, slot),
        ),
        setter(
            &format!("set_{}", f),
            ("values", &format!("&[{}]", elem)),
            format!("self.record.set_dynamic_scalars::<{}>({}, values)", elem, slot),
        ),
    ]
}

/// Accessors for one static field.
fn static_accessors(entry: &LayoutEntry) -> Vec<Method> {
    let f = to_snake_case(&entry.field.name);
    let offset = entry.location;

    match entry.field.cardinality {
        Cardinality::Scalar => match entry.base.category {
            TypeCategory::Table => {
                let inner = to_pascal_case(&entry.base.name);
                vec![
                    getter(
                        &format!("get_{}", f),
                        &inner,
                        format!(
                            "{}::from_record(self.record.sub_record({}, {}::STATIC_SIZE).detach())",
                            inner, offset, inner
                        ),
                    ),
                    mut_getter(
                        &format!("get_{}_mut", f),
                        &inner,
                        format!(
                            "{}::from_record(self.record.sub_record({}, {}::STATIC_SIZE))",
                            inner, offset, inner
                        ),
                    ),
                    setter(
                        &format!("set_{}", f),
                        ("value", &format!("&{}", inner)),
                        format!("self.record.write_bytes({}, &value.record.snapshot())", offset),
                    ),
                ]
            }
            TypeCategory::Enum => {
                let name = to_pascal_case(&entry.base.name);
                vec![
                    getter(
                        &format!("get_{}", f),
                        &format!("Option<{}>", name),
                        format!("{}::from_raw(self.record.get::<u32>({}))", name, offset),
                    ),
                    setter(
                        &format!("set_{}", f),
                        ("value", &name),
                        format!("self.record.set::<u32>({}, value as u32)", offset),
                    ),
                ]
            }
            TypeCategory::Builtin => {
                let ty = entry.base.repr.clone();
                vec![
                    getter(
                        &format!("get_{}", f),
                        &ty,
                        format!("self.record.get::<{}>({})", ty, offset),
                    ),
                    setter(
                        &format!("set_{}", f),
                        ("value", &ty),
                        format!("self.record.set::<{}>({}, value)", ty, offset),
                    ),
                ]
            }
        },
        Cardinality::StaticArray(count) => {
            if entry.base.is_table() {
                let inner = to_pascal_case(&entry.base.name);
                let sub = format!(
                    "self.record.sub_record({} + i * {}::STATIC_SIZE, {}::STATIC_SIZE)",
                    offset, inner, inner
                );
                // No bulk setter for embedded table arrays; elements are
                // mutated through the live views.
                vec![
                    getter(
                        &format!("get_{}", f),
                        &format!("Vec<{}>", inner),
                        format!(
                            "(0..{}).map(|i| {}::from_record({}.detach())).collect()",
                            count, inner, sub
                        ),
                    ),
                    mut_getter(
                        &format!("get_{}_mut", f),
                        &format!("Vec<{}>", inner),
                        format!("(0..{}).map(|i| {}::from_record({})).collect()", count, inner, sub),
                    ),
                ]
            } else {
                let elem = element_type(entry);
                vec![
                    Method {
                        name: format!("get_{}", f),
                        receiver: Receiver::Shared,
                        params: vec![],
                        ret: Some(format!("[{}; {}]", elem, count)),
                        body: vec![
                            Stmt::Let {
                                name: "out".to_string(),
                                mutable: true,
                                ty: Some(format!("[{}; {}]", elem, count)),
                                expr: format!("[Default::default(); {}]", count),
                            },
                            Stmt::Expr(format!(
                                "out.copy_from_slice(&self.record.get_array::<{}>({}, {}))",
                                elem, offset, count
                            )),
                            Stmt::Tail("out".to_string()),
                        ],
                    },
                    getter(
                        &format!("get_{}_vector", f),
                        &format!("Vec<{}>", elem),
                        format!("self.record.get_array::<{}>({}, {})", elem, offset, count),
                    ),
                    setter(
                        &format!("set_{}", f),
                        ("value", &format!("[{}; {}]", elem, count)),
                        format!("self.record.set_array::<{}>({}, &value)", elem, offset),
                    ),
                    setter(
                        &format!("set_{}_slice", f),
                        ("values", &format!("&[{}]", elem)),
                        format!("self.record.set_bounded::<{}>({}, {}, values)", elem, offset, count),
                    ),
                    setter(
                        &format!("set_{}_str", f),
                        ("value", "&str"),
                        format!(
                            "self.record.set_bounded_bytes({}, {}, value.as_bytes())",
                            offset, entry.byte_size
                        ),
                    ),
                ]
            }
        }
        Cardinality::DynamicArray => unreachable!("dynamic arrays are never static"),
    }
}

fn getter(name: &str, ret: &str, tail: String) -> Method {
    Method {
        name: name.to_string(),
        receiver: Receiver::Shared,
        params: vec![],
        ret: Some(ret.to_string()),
        body: vec![Stmt::Tail(tail)],
    }
}

fn mut_getter(name: &str, ret: &str, tail: String) -> Method {
    Method {
        name: name.to_string(),
        receiver: Receiver::Exclusive,
        params: vec![],
        ret: Some(ret.to_string()),
        body: vec![Stmt::Tail(tail)],
    }
}

/// Setter with the dirty-notify call ahead of the mutation.
fn setter(name: &str, param: (&str, &str), mutation: String) -> Method {
    Method {
        name: name.to_string(),
        receiver: Receiver::Exclusive,
        params: vec![(param.0.to_string(), param.1.to_string())],
        ret: None,
        body: vec![notify(), Stmt::Expr(mutation)],
    }
}

fn notify() -> Stmt {
    Stmt::Expr("self.record.notify_changing()".to_string())
}

/// Rust element type for array storage: `u8` for string bytes, the raw
/// `u32` for enums, the scalar repr otherwise.
fn element_type(entry: &LayoutEntry) -> String {
    if entry.base.repr == "str" {
        "u8".to_string()
    } else {
        entry.base.repr.clone()
    }
}

/// Default literals are written as-is for booleans and cast to the storage
/// repr otherwise; an ill-typed literal surfaces when the generated code is
/// compiled.
fn default_literal(value: &DefaultValue, repr: &str) -> String {
    let token = match value {
        DefaultValue::Bool(b) => b.to_string(),
        DefaultValue::Number(n) => n.clone(),
    };
    if repr == "bool" {
        token
    } else {
        format!("{} as {}", token, repr)
    }
}

/// Schema identifier to PascalCase; interior capitals survive so acronyms
/// stay intact.
fn to_pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Schema identifier to snake_case without splitting acronym runs, so
/// `sessionID` becomes `session_id`.
fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut snake = String::new();
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                if !prev.is_uppercase() || (i + 1 < chars.len() && chars[i + 1].is_lowercase()) {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(*c);
        }
    }
    snake
}

/// PascalCase leaves `Self` as the only value name that cannot be a
/// variant identifier.
fn variant_name(value: &str) -> String {
    let name = to_pascal_case(value);
    if name == "Self" {
        "Self_".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_schema;

    const CAMERA: &str = r#"
        namespace demo.render;

        enum Mode : ubyte { Flat, Smooth }

        table Vector3f {
            x: float;
            y: float;
            z: float;
        }

        table Camera {
            tags: [uint];
            origin: Vector3f;
            mode: Mode = 1;
            name: string;
            history: [float:4];
            fov: float = 1.5;
        }

        root_type Camera;
    "#;

    fn camera_source() -> GeneratedSource {
        generate_source(&compile_schema(CAMERA).unwrap(), "camera")
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(to_pascal_case("session_id"), "SessionId");
        assert_eq!(to_pascal_case("Vector3f"), "Vector3f");
        assert_eq!(to_snake_case("sessionID"), "session_id");
        assert_eq!(to_snake_case("fovAngle"), "fov_angle");
        assert_eq!(variant_name("self"), "Self_");
    }

    #[test]
    fn test_declarations_artifact_shape() {
        let source = camera_source();
        let decls = &source.declarations;

        assert!(decls.contains("pub mod demo {"));
        assert!(decls.contains("    pub mod render {"));
        assert!(decls.contains("#[repr(u32)]"));
        assert!(decls.contains("pub enum Mode {"));
        assert!(decls.contains("pub struct Vector3f {"));
        assert!(decls.contains("pub struct Camera {"));
        assert!(decls.contains("record: ::fixbuf::Record,"));
        assert!(decls.contains("include!(\"camera_impl.rs\");"));
        assert!(!decls.contains("impl Camera"));
    }

    #[test]
    fn test_scalar_and_enum_accessors() {
        let defs = camera_source().definitions;

        assert!(defs.contains("pub fn get_fov(&self) -> f32 {"));
        assert!(defs.contains("self.record.get::<f32>(72)"));
        assert!(defs.contains("pub fn set_fov(&mut self, value: f32) {"));

        assert!(defs.contains("pub fn get_mode(&self) -> Option<Mode> {"));
        assert!(defs.contains("Mode::from_raw(self.record.get::<u32>(52))"));
        assert!(defs.contains("pub fn set_mode(&mut self, value: Mode) {"));
        assert!(defs.contains("self.record.set::<u32>(52, value as u32)"));

        assert!(defs.contains("pub fn from_raw(raw: u32) -> Option<Mode> {"));
        assert!(defs.contains("0 => Some(Mode::Flat),"));
        assert!(defs.contains("_ => None,"));
    }

    #[test]
    fn test_embedded_table_accessors() {
        let defs = camera_source().definitions;

        assert!(defs.contains("pub fn get_origin(&self) -> Vector3f {"));
        assert!(defs.contains(
            "Vector3f::from_record(self.record.sub_record(36, Vector3f::STATIC_SIZE).detach())"
        ));
        assert!(defs.contains("pub fn get_origin_mut(&mut self) -> Vector3f {"));
        assert!(defs.contains("pub fn set_origin(&mut self, value: &Vector3f) {"));
        assert!(defs.contains("self.record.write_bytes(36, &value.record.snapshot())"));
    }

    #[test]
    fn test_dynamic_and_bounded_array_accessors() {
        let defs = camera_source().definitions;

        assert!(defs.contains("pub fn get_tags(&self) -> ::fixbuf::Vector<'_, u32> {"));
        assert!(defs.contains("pub fn get_tags_mut(&mut self) -> ::fixbuf::VectorMut<'_, u32> {"));
        assert!(defs.contains("pub fn set_tags(&mut self, values: &[u32]) {"));
        assert!(defs.contains("self.record.set_dynamic_scalars::<u32>(0, values)"));

        assert!(defs.contains("pub fn get_history(&self) -> [f32; 4] {"));
        assert!(defs.contains("pub fn set_history_slice(&mut self, values: &[f32]) {"));
        assert!(defs.contains("self.record.set_bounded::<f32>(56, 4, values)"));
        assert!(defs.contains("pub fn set_history_str(&mut self, value: &str) {"));
        assert!(defs.contains("self.record.set_bounded_bytes(56, 16, value.as_bytes())"));
    }

    #[test]
    fn test_string_accessors() {
        let defs = camera_source().definitions;

        assert!(defs.contains("pub fn get_name(&self) -> ::fixbuf::Vector<'_, u8> {"));
        assert!(defs.contains("pub fn get_name_string(&self) -> String {"));
        assert!(defs.contains("pub fn set_name_string(&mut self, value: &str) {"));
        assert!(defs.contains("self.record.set_dynamic(1, value.as_bytes())"));
    }

    #[test]
    fn test_constructors_and_introspection() {
        let layout_size = compile_schema(CAMERA).unwrap().tables[1].layout.static_size;
        let defs = camera_source().definitions;

        assert!(defs.contains(&format!("pub const STATIC_SIZE: usize = {};", layout_size)));
        assert!(defs.contains("pub const DYNAMIC_COUNT: usize = 2;"));
        assert!(defs.contains("pub fn new() -> Self {"));
        // Defaults applied in field order: mode before fov.
        let mode_at = defs.find("record.set::<u32>(52, 1 as u32);").unwrap();
        let fov_at = defs.find("record.set::<f32>(72, 1.5 as f32);").unwrap();
        assert!(mode_at < fov_at);

        assert!(defs.contains("pub fn from_compatible(source: &dyn ::fixbuf::TypedRecord) -> Result<Self, ::fixbuf::RecordError> {"));
        assert!(defs.contains("impl ::fixbuf::TypedRecord for Camera {"));
        assert!(defs.contains("impl Clone for Camera {"));
        assert!(defs.contains("impl Default for Camera {"));
        assert!(defs.contains("pub fn identity() -> ::fixbuf::Uint128 {"));
    }

    #[test]
    fn test_schema_accessor_late_binds_nested_tables() {
        let defs = camera_source().definitions;

        assert!(defs.contains("pub fn schema() -> ::fixbuf::SchemaDescriptor {"));
        assert!(defs.contains("nested: Some(Vector3f::schema)"));
        assert!(defs.contains("name: \"origin\".to_string()"));
        assert!(defs.contains("base_type: \"record\".to_string()"));
    }

    #[test]
    fn test_string_array_payload_codec() {
        let compiled = compile_schema("table T { labels: [string]; }").unwrap();
        let defs = generate_source(&compiled, "t").definitions;

        assert!(defs.contains("pub fn get_labels_vector(&self) -> Vec<String> {"));
        assert!(defs.contains("while at + 8 <= payload.len() {"));
        assert!(defs.contains("pub fn set_labels(&mut self, values: &[&str]) {"));
        assert!(defs.contains("payload.extend_from_slice(&(value.len() as u64).to_ne_bytes())"));
    }

    #[test]
    fn test_table_array_accessors() {
        let compiled = compile_schema(
            "table Inner { a: int; } table Outer { pair: [Inner:2]; many: [Inner]; }",
        )
        .unwrap();
        let defs = generate_source(&compiled, "outer").definitions;

        assert!(defs.contains("pub fn get_pair(&self) -> Vec<Inner> {"));
        assert!(defs.contains("pub fn get_pair_mut(&mut self) -> Vec<Inner> {"));
        assert!(!defs.contains("pub fn set_pair("));

        assert!(defs.contains("pub fn get_many(&self) -> ::fixbuf::RecordVector<'_> {"));
        assert!(defs.contains("self.record.record_vector(0, Inner::STATIC_SIZE)"));
        assert!(defs.contains("pub fn set_many(&mut self, values: &[Inner]) {"));
    }

    #[test]
    fn test_combined_output_inlines_impls() {
        let combined = generate_combined(&compile_schema(CAMERA).unwrap());
        assert!(combined.contains("pub struct Camera {"));
        assert!(combined.contains("impl Camera {"));
        assert!(!combined.contains("include!"));
    }

    #[test]
    fn test_every_setter_notifies_before_mutating() {
        let defs = camera_source().definitions;
        for at in defs
            .match_indices("pub fn set_")
            .map(|(at, _)| at)
            .collect::<Vec<_>>()
        {
            let body = &defs[at..defs[at..].find("\n    }").map(|end| at + end).unwrap()];
            assert!(
                body.contains("self.record.notify_changing();"),
                "setter without notify: {}",
                &body[..body.find('\n').unwrap_or(body.len())]
            );
        }
    }
}
