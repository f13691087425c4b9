//! Object merging and symbol hygiene.
//!
//! The lowered kernel object and the compiled shim object are merged into
//! one relocatable output exporting exactly the public symbol. The merge
//! itself is the native linker's job (`ld -r`); this module owns the
//! correctness checks around it: duplicate-definition rejection before the
//! merge, localization of everything but the public symbol, and export
//! verification after.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use object::{Object, ObjectSymbol};
use snafu::Snafu;

use crate::context::RunContext;

pub type Result<T, E = LinkError> = std::result::Result<T, E>;

/// Errors from object merging and verification.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LinkError {
    /// Both inputs define the same symbol; the merge would be ambiguous.
    #[snafu(display("both objects define symbol {symbol:?}"))]
    DuplicateSymbol { symbol: String },

    /// The merged object does not export the public symbol.
    #[snafu(display("merged object does not export symbol {symbol:?}"))]
    MissingExport { symbol: String },

    /// An input or output object could not be parsed.
    #[snafu(display("cannot parse object {}: {source}", path.display()))]
    Parse { path: PathBuf, source: object::read::Error },

    /// The external merge tool failed.
    #[snafu(display("{tool} failed (exit code {code}):\n{diagnostics}"))]
    MergeTool { tool: String, code: i32, diagnostics: String },

    /// Filesystem failure around object files.
    #[snafu(display("i/o failure while {doing}: {source}"))]
    Io { doing: String, source: std::io::Error },
}

/// Merge `kernel` and `shim` into `out`, exporting exactly `public_symbol`.
pub fn link_objects(
    ctx: &RunContext,
    kernel: &Path,
    shim: &Path,
    public_symbol: &str,
    out: &Path,
) -> Result<PathBuf> {
    reject_duplicates(&defined_globals(kernel)?, &defined_globals(shim)?)?;

    // Relative names under the run directory keep artifacts path-free.
    let dir = ctx.dir.path();
    let mut merge = Command::new(&ctx.tools.ld);
    merge
        .arg("-r")
        .arg("-o")
        .arg("merged.o")
        .arg(relative_to(dir, kernel))
        .arg(relative_to(dir, shim))
        .current_dir(dir);
    run_merge_tool("ld", &mut merge)?;

    // Localize every defined symbol except the public entry point.
    let mut localize = Command::new(&ctx.tools.objcopy);
    localize
        .arg(format!("--keep-global-symbol={public_symbol}"))
        .arg("merged.o")
        .arg(relative_to(dir, out))
        .current_dir(dir);
    run_merge_tool("objcopy", &mut localize)?;

    verify_export(out, public_symbol)?;
    tracing::info!(output = %out.display(), symbol = public_symbol, "objects merged");
    Ok(out.to_path_buf())
}

/// Rename a defined symbol in place (`objcopy --redefine-sym`).
///
/// Used to move the lowered kernel off the public name before the shim,
/// which owns that name, is compiled against it.
pub fn redefine_symbol(ctx: &RunContext, object_path: &Path, from: &str, to: &str) -> Result<()> {
    let mut cmd = Command::new(&ctx.tools.objcopy);
    cmd.arg(format!("--redefine-sym={from}={to}"))
        .arg(relative_to(ctx.dir.path(), object_path))
        .current_dir(ctx.dir.path());
    run_merge_tool("objcopy", &mut cmd)
}

/// Strip the run-directory prefix so tool command lines stay path-free.
fn relative_to<'a>(dir: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(dir).unwrap_or(path)
}

/// Reject the merge when any symbol is defined on both sides.
pub fn reject_duplicates(kernel: &BTreeSet<String>, shim: &BTreeSet<String>) -> Result<()> {
    match kernel.intersection(shim).next() {
        Some(symbol) => Err(LinkError::DuplicateSymbol { symbol: symbol.clone() }),
        None => Ok(()),
    }
}

/// Names of all defined global symbols in an object file.
pub fn defined_globals(path: &Path) -> Result<BTreeSet<String>> {
    let data = std::fs::read(path)
        .map_err(|source| LinkError::Io { doing: format!("reading {}", path.display()), source })?;
    let file = object::File::parse(&*data)
        .map_err(|source| LinkError::Parse { path: path.to_path_buf(), source })?;

    let mut names = BTreeSet::new();
    for symbol in file.symbols() {
        if symbol.is_definition() && symbol.is_global() {
            if let Ok(name) = symbol.name() {
                names.insert(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Check that `path` exports `symbol` as a defined global.
pub fn verify_export(path: &Path, symbol: &str) -> Result<()> {
    if defined_globals(path)?.contains(symbol) {
        return Ok(());
    }
    Err(LinkError::MissingExport { symbol: symbol.to_string() })
}

fn run_merge_tool(tool: &str, cmd: &mut Command) -> Result<()> {
    tracing::debug!(tool, command = ?cmd, "spawning");
    let output = cmd
        .output()
        .map_err(|source| LinkError::Io { doing: format!("spawning {tool}"), source })?;
    if !output.status.success() {
        return Err(LinkError::MergeTool {
            tool: tool.to_string(),
            code: output.status.code().unwrap_or(-1),
            diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}
