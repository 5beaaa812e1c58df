use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use clap::Parser;

use fixbuf_compiler::{compile_schema, generate_combined, generate_source, CompileError};

#[derive(Parser)]
#[command(name = "fixbufc")]
#[command(about = "Compile fixbuf schemas to Rust record accessors", long_about = None)]
struct Args {
    /// Input schema files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Prefix directory for all generated files; `-` writes combined
    /// output to stdout
    #[arg(short, long)]
    outputdir: Option<PathBuf>,
}

fn main() {
    std::process::exit(run(&Args::parse()));
}

/// Compile every input, continuing past per-file failures. Returns the
/// process exit code.
fn run(args: &Args) -> i32 {
    let mut failed = false;
    for input in &args.files {
        if let Err(err) = process_file(input, args.outputdir.as_deref()) {
            eprintln!("{}: {}", input.display(), err);
            failed = true;
        }
    }
    if failed {
        1
    } else {
        0
    }
}

/// Compile one input and write its artifacts, `<base>.rs` and
/// `<base>_impl.rs`. Nothing touches the filesystem unless the whole file
/// compiles.
fn process_file(input: &Path, outputdir: Option<&Path>) -> Result<(), CompileError> {
    let text = fs::read_to_string(input)?;
    let compiled = compile_schema(&text)?;
    let base = base_name(input);

    if outputdir == Some(Path::new("-")) {
        let combined = generate_combined(&compiled);
        std::io::stdout().write_all(combined.as_bytes())?;
        return Ok(());
    }

    let dir = match outputdir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let source = generate_source(&compiled, &base);
    let decl_path = dir.join(format!("{}.rs", base));
    let impl_path = dir.join(format!("{}_impl.rs", base));
    fs::write(&decl_path, source.declarations)?;
    fs::write(&impl_path, source.definitions)?;
    println!("Compiled {} → {}", input.display(), decl_path.display());
    Ok(())
}

fn base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "schema".to_string())
}
