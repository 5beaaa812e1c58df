// example/src/main.rs

use fixbuf::{compile_schema, generate_source, CompileError, Record};

const SCHEMA: &str = r#"
namespace demo.render;

enum Mode : ubyte { Flat, Smooth }

table Vector3f {
    x: float;
    y: float;
    z: float;
}

table Camera {
    origin: Vector3f;
    mode: Mode = 1;
    tags: [uint];
    name: string;
    history: [float:4];
}

root_type Camera;
"#;

fn main() -> Result<(), CompileError> {
    let compiled = compile_schema(SCHEMA)?;

    for table in &compiled.tables {
        let layout = &table.layout;
        println!(
            "table {}: staticSize={} dynamicCount={} identity={}",
            layout.name, layout.static_size, layout.dynamic_count, layout.identity
        );
        for field in &table.descriptor.fields {
            println!(
                "  {} : {} at {} ({})",
                field.name,
                field.base_type,
                field.offset_or_slot,
                if field.is_static { "static" } else { "dynamic" }
            );
        }
    }

    let source = generate_source(&compiled, "camera");
    println!("\n// ----- camera.rs -----\n");
    println!("{}", source.declarations);
    println!("// ----- camera_impl.rs -----\n");
    println!("{}", source.definitions);

    // Drive the computed layout directly through the runtime: write the
    // mode at its offset and a name payload into its slot, then read back.
    let camera = &compiled.tables[1];
    let mut record = Record::new(camera.layout.static_size, camera.layout.dynamic_count);
    let mode = camera.descriptor.field("mode").expect("mode field");
    let name = camera.descriptor.field("name").expect("name field");
    record.set::<u32>(mode.offset_or_slot, 1);
    record.set_dynamic(name.offset_or_slot, b"main camera");
    println!(
        "mode={} name={:?} image={}B",
        record.get::<u32>(mode.offset_or_slot),
        String::from_utf8_lossy(&record.dynamic_payload(name.offset_or_slot)),
        record.len()
    );

    Ok(())
}
