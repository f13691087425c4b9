//! kiln - compile a statically-shaped MLIR tensor kernel to a native object.

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use kiln_driver::{CompileOptions, ToolOverrides, compile};
use kiln_schedule::TargetConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Compile a statically-shaped MLIR tensor kernel to a relocatable native object"
)]
struct Cli {
    /// Input MLIR file, or '-' to read from stdin
    input: String,

    /// Version suffix for the LLVM binaries (e.g. '-20' for mlir-opt-20)
    #[arg(long, default_value = "")]
    suffix: String,

    /// Keep the run's intermediate artifacts
    #[arg(long)]
    keep_intermediates: bool,

    /// Output object path (defaults to <function>.o in the output directory)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output directory for the default object path
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Path to mlir-opt (overrides --suffix)
    #[arg(long)]
    mlir_opt: Option<PathBuf>,

    /// Path to mlir-translate (overrides --suffix)
    #[arg(long)]
    mlir_translate: Option<PathBuf>,

    /// Path to llc (overrides --suffix)
    #[arg(long)]
    llc: Option<PathBuf>,

    /// Path to clang (overrides --suffix)
    #[arg(long)]
    clang: Option<PathBuf>,

    /// Target CPU for native codegen (-mcpu)
    #[arg(long)]
    mcpu: Option<String>,

    /// Target features for native codegen (-mattr)
    #[arg(long)]
    mattr: Option<String>,

    /// Disable kernel-specific tiling transforms
    #[arg(long)]
    no_tile: bool,

    /// Transform-dialect script to interpret instead of the generated default
    #[arg(long)]
    transform_script: Option<PathBuf>,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let module_text = match read_input(&cli.input) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("kiln: cannot read {}: {err}", cli.input);
            std::process::exit(3);
        }
    };

    let options = CompileOptions {
        suffix: cli.suffix,
        overrides: ToolOverrides {
            mlir_opt: cli.mlir_opt,
            mlir_translate: cli.mlir_translate,
            llc: cli.llc,
            clang: cli.clang,
        },
        out: cli.out,
        output_dir: cli.output_dir,
        keep_intermediates: cli.keep_intermediates,
        target: TargetConfig {
            mcpu: cli.mcpu,
            mattr: cli.mattr,
            tile: !cli.no_tile,
            ..TargetConfig::default()
        },
        transform_script: cli.transform_script,
    };

    match compile(&module_text, &options) {
        Ok(path) => println!("{}", path.display()),
        Err(err) => {
            eprintln!("kiln: {} failed: {err}", err.phase());
            std::process::exit(err.exit_code());
        }
    }
}

fn read_input(input: &str) -> std::io::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(input)
}
