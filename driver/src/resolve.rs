//! Executable resolution.
//!
//! Tool paths are fixed once per run, before any stage spawns: a missing
//! executable must fail with its own exit code, not surface later as a
//! stage failure. LLVM tools take the version suffix (`--suffix=-20` finds
//! `mlir-opt-20`); binutils do not carry LLVM version suffixes.

use std::path::{Path, PathBuf};

use crate::error::*;

/// Per-tool path overrides; an explicit path wins over suffix resolution.
#[derive(Debug, Clone, Default)]
pub struct ToolOverrides {
    pub mlir_opt: Option<PathBuf>,
    pub mlir_translate: Option<PathBuf>,
    pub llc: Option<PathBuf>,
    pub clang: Option<PathBuf>,
}

/// Absolute paths of every external tool a run may spawn.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub mlir_opt: PathBuf,
    pub mlir_translate: PathBuf,
    pub llc: PathBuf,
    pub clang: PathBuf,
    pub ld: PathBuf,
    pub objcopy: PathBuf,
}

impl Toolchain {
    /// Resolve every tool, applying `suffix` to the LLVM binaries.
    pub fn resolve(suffix: &str, overrides: &ToolOverrides) -> Result<Self> {
        Ok(Self {
            mlir_opt: resolve_tool(&format!("mlir-opt{suffix}"), overrides.mlir_opt.as_deref())?,
            mlir_translate: resolve_tool(
                &format!("mlir-translate{suffix}"),
                overrides.mlir_translate.as_deref(),
            )?,
            llc: resolve_tool(&format!("llc{suffix}"), overrides.llc.as_deref())?,
            clang: resolve_tool(&format!("clang{suffix}"), overrides.clang.as_deref())?,
            ld: resolve_tool("ld", None)?,
            objcopy: resolve_tool("objcopy", None)?,
        })
    }
}

fn resolve_tool(name: &str, overridden: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = overridden {
        if is_executable(path) {
            return Ok(path.to_path_buf());
        }
        return Err(Error::ToolResolution { name: path.display().to_string() });
    }
    find_on_path(name).ok_or_else(|| Error::ToolResolution { name: name.to_string() })
}

/// Scan `PATH` for an executable file named `name`.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).map(|dir| dir.join(name)).find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata().map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
