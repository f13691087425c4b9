//! Sequential execution of lowering stages against the external toolchain.
//!
//! Stages run strictly in order; stage N+1 never spawns before stage N's
//! artifact is confirmed present and non-empty. Invocations are blocking
//! with fully captured output. Nothing is retried: external tools are not
//! assumed side-effect-free across repeats, and a failing stage aborts the
//! run with the tool's diagnostics passed through verbatim.

use std::path::{Path, PathBuf};
use std::process::Command;

use kiln_schedule::{PipelineSpec, Stage, TargetConfig, Tool};

use crate::context::RunContext;
use crate::error::*;

/// Run every stage of `spec` over the module at `input`; returns the final
/// artifact (the lowered kernel object).
pub fn run_pipeline(
    ctx: &RunContext,
    spec: &PipelineSpec,
    target: &TargetConfig,
    input: &Path,
) -> Result<PathBuf> {
    let script = match &spec.transform_script {
        Some(text) => {
            let path = ctx.dir.artifact("transform.mlir");
            std::fs::write(&path, text)
                .map_err(|source| Error::Io { doing: "writing transform script".into(), source })?;
            Some(path)
        }
        None => None,
    };

    let mut current = input.to_path_buf();
    for stage in &spec.stages {
        current = run_stage(ctx, *stage, &current, script.as_deref(), target)?;
    }
    Ok(current)
}

fn run_stage(
    ctx: &RunContext,
    stage: Stage,
    input: &Path,
    script: Option<&Path>,
    target: &TargetConfig,
) -> Result<PathBuf> {
    let artifact = ctx.dir.artifact(stage.artifact_name());
    // Tools run inside the run directory with relative artifact names, so no
    // temporary path can leak into any artifact.
    let input = relative_to(ctx, input);

    let mut cmd = match stage.tool() {
        Tool::MlirOpt => {
            let mut cmd = Command::new(&ctx.tools.mlir_opt);
            cmd.arg(input);
            if stage == Stage::Transform {
                let script = script.expect("transform stage scheduled without a script");
                cmd.arg(format!("--transform-preload-library={}", relative_to(ctx, script).display()));
            }
            cmd.args(stage.mlir_opt_flags());
            cmd.arg("-o").arg(stage.artifact_name());
            cmd
        }
        Tool::MlirTranslate => {
            let mut cmd = Command::new(&ctx.tools.mlir_translate);
            cmd.arg(input).arg("--mlir-to-llvmir").arg("-o").arg(stage.artifact_name());
            cmd
        }
        Tool::Llc => {
            let mut cmd = Command::new(&ctx.tools.llc);
            cmd.arg("-filetype=obj").arg("-relocation-model=pic");
            if let Some(mcpu) = &target.mcpu {
                cmd.arg(format!("-mcpu={mcpu}"));
            }
            if let Some(mattr) = &target.mattr {
                cmd.arg(format!("-mattr={mattr}"));
            }
            cmd.arg(input).arg("-o").arg(stage.artifact_name());
            cmd
        }
    };
    cmd.current_dir(ctx.dir.path());

    run_tool(stage.name(), &mut cmd, &artifact)
}

/// Strip the run-directory prefix so tool command lines stay path-free.
fn relative_to<'a>(ctx: &RunContext, path: &'a Path) -> &'a Path {
    path.strip_prefix(ctx.dir.path()).unwrap_or(path)
}

/// Compile the generated shim source to an object with the resolved clang.
///
/// No debug info: the output object must stay free of run-directory paths
/// so reruns are byte-identical.
pub fn compile_shim(ctx: &RunContext, source: &Path, artifact: &Path) -> Result<PathBuf> {
    let mut cmd = Command::new(&ctx.tools.clang);
    cmd.arg("-c")
        .arg("-O2")
        .arg("-fPIC")
        .arg(relative_to(ctx, source))
        .arg("-o")
        .arg(relative_to(ctx, artifact))
        .current_dir(ctx.dir.path());
    run_tool("shim-compile", &mut cmd, artifact)
}

/// Spawn, wait, and validate one external invocation.
fn run_tool(stage: &str, cmd: &mut Command, artifact: &Path) -> Result<PathBuf> {
    tracing::debug!(stage, command = ?cmd, "spawning stage");
    let output = cmd
        .output()
        .map_err(|source| Error::Io { doing: format!("spawning stage '{stage}'"), source })?;

    if !output.status.success() {
        return Err(Error::Toolchain {
            stage: stage.to_string(),
            code: output.status.code().unwrap_or(-1),
            diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let bytes = std::fs::metadata(artifact).map(|m| m.len()).unwrap_or(0);
    if bytes == 0 {
        return Err(Error::StageProducedNothing { stage: stage.to_string() });
    }

    tracing::info!(stage, artifact = %artifact.display(), bytes, "stage complete");
    Ok(artifact.to_path_buf())
}
