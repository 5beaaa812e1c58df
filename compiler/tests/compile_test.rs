#![cfg(test)]

use fixbuf_compiler::{
    compile_schema, generate_combined, generate_source, error::CompileError,
    layout::Placement,
};

#[test]
fn test_compile_full_schema() {
    let input = r#"
    namespace demo.render;

    // Shading mode for a mesh.
    enum Mode : ubyte { Flat, Smooth }

    table Vector3f {
        x: float;
        y: float;
        z: float;
    }

    table Mesh {
        origin: Vector3f;
        corners: [Vector3f:2];
        vertices: [Vector3f];
        mode: Mode = 1;
        name: string;
    }

    root_type Mesh;
    "#;

    let compiled = compile_schema(input).expect("compile_schema failed");
    assert_eq!(compiled.ast.namespace, vec!["demo", "render"]);
    assert_eq!(compiled.ast.root_type.as_deref(), Some("Mesh"));
    assert_eq!(compiled.tables.len(), 2);

    // Vector3f: version word + three floats.
    let vector3f = &compiled.tables[0].layout;
    assert_eq!(vector3f.static_size, 16);
    assert_eq!(vector3f.dynamic_count, 0);

    // Mesh: two dynamic slots, then origin, corners, mode in order.
    let mesh = &compiled.tables[1].layout;
    assert_eq!(mesh.dynamic_count, 2);
    assert_eq!(mesh.entries[0].location, 36); // origin, after 4 + 2*16
    assert_eq!(mesh.entries[1].location, 52); // corners, 2 embedded images
    assert_eq!(mesh.entries[1].byte_size, 32);
    assert_eq!(mesh.entries[3].location, 84); // mode, 4-byte enum slot
    assert_eq!(mesh.static_size, 88);

    // Every field appears exactly once, in declaration order.
    let descriptor = &compiled.tables[1].descriptor;
    let names: Vec<&str> = descriptor.fields.iter().map(|field| field.name.as_str()).collect();
    assert_eq!(names, vec!["origin", "corners", "vertices", "mode", "name"]);
    assert_eq!(descriptor.identity, mesh.identity);

    let source = generate_source(&compiled, "mesh");
    assert!(source.declarations.contains("pub mod demo {"));
    assert!(source.declarations.contains("pub struct Mesh {"));
    assert!(source.declarations.contains("include!(\"mesh_impl.rs\");"));
    assert!(source.definitions.contains("impl Mesh {"));
    assert!(source.definitions.contains("pub fn get_origin(&self) -> Vector3f {"));
    assert!(source.definitions.contains("pub fn set_name_string(&mut self, value: &str) {"));
    assert!(source.definitions.contains("impl ::fixbuf::TypedRecord for Mesh {"));

    let combined = generate_combined(&compiled);
    assert!(combined.contains("impl Mesh {"));
    assert!(!combined.contains("include!"));
}

#[test]
fn test_interleaved_fields_layout() {
    // Dynamic headers pack before static payloads regardless of the
    // declaration interleaving.
    let compiled = compile_schema(
        "table T { f1: [uint]; f2: int; f3: string; f4: double; }",
    )
    .unwrap();
    let layout = &compiled.tables[0].layout;

    assert_eq!(layout.dynamic_count, 2);
    assert_eq!(layout.static_size, 48);
    assert_eq!(layout.entries[0].placement, Placement::Dynamic);
    assert_eq!(layout.entries[0].header_offset(), 4);
    assert_eq!(layout.entries[1].location, 36);
    assert_eq!(layout.entries[2].header_offset(), 20);
    assert_eq!(layout.entries[3].location, 40);
}

#[test]
fn test_identity_tracks_type_signatures_only() {
    let identity = |input: &str| compile_schema(input).unwrap().tables[0].layout.identity;

    let base = identity("table T { a: int; b: [float:4]; }");
    assert_eq!(base, identity("table T { renamed: int; other: [float:4]; }"));
    assert_eq!(base, identity("table T { a: int = 9; b: [float:4]; }"));
    assert_ne!(base, identity("table T { a: uint; b: [float:4]; }"));
    assert_ne!(base, identity("table T { b: [float:4]; a: int; }"));
}

#[test]
fn test_forward_reference_fails() {
    let err = compile_schema("table Outer { inner: Inner; } table Inner { a: int; }").unwrap_err();
    assert!(matches!(err, CompileError::UnresolvedType { .. }));
}

#[test]
fn test_layout_drives_runtime_records() {
    let compiled = compile_schema(
        "table Probe { tags: [uint]; count: int; grid: [short:4]; }",
    )
    .unwrap();
    let layout = &compiled.tables[0].layout;

    let mut record = fixbuf_runtime::Record::new(layout.static_size, layout.dynamic_count);
    let count = &layout.entries[1];
    record.set::<i32>(count.location, -7);
    assert_eq!(record.get::<i32>(count.location), -7);

    // A six-element source into the four-element region writes nothing.
    let grid = &layout.entries[2];
    record.set_bounded::<i16>(grid.location, grid.count, &[1, 2, 3, 4, 5, 6]);
    assert_eq!(record.get_array::<i16>(grid.location, 4), vec![0, 0, 0, 0]);
    record.set_bounded::<i16>(grid.location, grid.count, &[1, 2, 3, 4]);
    assert_eq!(record.get_array::<i16>(grid.location, 4), vec![1, 2, 3, 4]);

    let tags = &layout.entries[0];
    record.set_dynamic_scalars::<u32>(tags.location, &[9, 8]);
    assert_eq!(record.vector::<u32>(tags.location).to_vec(), vec![9, 8]);
    assert_eq!(record.len(), layout.static_size + 8);
}

#[test]
fn test_generated_source_is_deterministic() {
    let input = "namespace app; table T { a: int; b: [uint]; }";
    let first = generate_source(&compile_schema(input).unwrap(), "t");
    let second = generate_source(&compile_schema(input).unwrap(), "t");
    assert_eq!(first, second);
}
