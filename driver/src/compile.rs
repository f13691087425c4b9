//! End-to-end orchestration of one compilation run.

use std::path::PathBuf;

use kiln_codegen::generate_shim;
use kiln_ir::extract_signature;
use kiln_schedule::{TargetConfig, build_pipeline};
use snafu::ResultExt;

use crate::context::RunContext;
use crate::error::*;
use crate::resolve::ToolOverrides;
use crate::{linker, toolchain};

/// Options for one compilation run.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Version suffix for the LLVM executables (e.g. `-20`).
    pub suffix: String,
    /// Per-tool path overrides; win over suffix resolution.
    pub overrides: ToolOverrides,
    /// Explicit output path. Defaults to `<function>.o` in `output_dir`.
    pub out: Option<PathBuf>,
    /// Directory for the default output path. Empty means the current
    /// directory.
    pub output_dir: PathBuf,
    /// Persist the run directory instead of removing it.
    pub keep_intermediates: bool,
    /// Codegen target and tiling configuration.
    pub target: TargetConfig,
    /// User-supplied transform script; replaces the generated default.
    pub transform_script: Option<PathBuf>,
}

/// Compile `module_text` to a relocatable object exporting the function's
/// symbol; returns the output path.
///
/// Aborts on the first failure. Partially written outputs are deleted; the
/// run directory is removed on every exit path unless retained.
pub fn compile(module_text: &str, options: &CompileOptions) -> Result<PathBuf> {
    // Tool resolution fails before any stage runs, with its own exit code.
    let ctx = RunContext::new(&options.suffix, &options.overrides)?;

    let sig = extract_signature(module_text).context(ExtractionSnafu)?;
    tracing::info!(function = %sig.name, operands = sig.operands.len(), result = %sig.result, "extracted signature");

    let mut spec = build_pipeline(&sig, &options.target);
    if let Some(path) = &options.transform_script {
        let script = std::fs::read_to_string(path).map_err(|source| Error::Io {
            doing: format!("reading transform script {}", path.display()),
            source,
        })?;
        spec = spec.with_transform_script(script);
    }
    tracing::debug!(stages = ?spec.stages, "built pipeline");

    // The kernel is moved off the public name; the shim owns it.
    let kernel_symbol = format!("{}__kernel", sig.name);
    let shim = generate_shim(&sig, &kernel_symbol).context(UnsupportedTypeSnafu)?;

    let input = ctx.dir.artifact("input.mlir");
    std::fs::write(&input, module_text)
        .map_err(|source| Error::Io { doing: "writing input module".into(), source })?;

    let kernel_obj = toolchain::run_pipeline(&ctx, &spec, &options.target, &input)?;
    linker::redefine_symbol(&ctx, &kernel_obj, &sig.name, &kernel_symbol).context(LinkSnafu)?;

    let shim_src = ctx.dir.artifact("shim.c");
    std::fs::write(&shim_src, &shim.code)
        .map_err(|source| Error::Io { doing: "writing shim source".into(), source })?;
    let shim_obj = toolchain::compile_shim(&ctx, &shim_src, &ctx.dir.artifact("shim.o"))?;

    let linked = linker::link_objects(
        &ctx,
        &kernel_obj,
        &shim_obj,
        &shim.public_symbol,
        &ctx.dir.artifact("output.o"),
    )
    .context(LinkSnafu)?;

    let out_path = match &options.out {
        Some(path) => path.clone(),
        None => options.output_dir.join(format!("{}.o", sig.name)),
    };
    if let Err(source) = std::fs::copy(&linked, &out_path) {
        // Never leave a partial output object behind.
        let _ = std::fs::remove_file(&out_path);
        return Err(Error::Io {
            doing: format!("writing output object {}", out_path.display()),
            source,
        });
    }

    if options.keep_intermediates {
        let kept = ctx.dir.keep();
        tracing::info!(path = %kept.display(), "intermediates retained");
    }

    tracing::info!(output = %out_path.display(), symbol = %shim.public_symbol, "compilation complete");
    Ok(out_path)
}
