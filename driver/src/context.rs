//! The per-run context value.

use crate::error::*;
use crate::resolve::{ToolOverrides, Toolchain};
use crate::workspace::RunDir;

/// Everything a run holds onto: resolved tool paths and the artifact
/// directory. Constructed once, immutable, threaded explicitly through
/// every component call. There is no process-ambient state.
#[derive(Debug)]
pub struct RunContext {
    pub tools: Toolchain,
    pub dir: RunDir,
}

impl RunContext {
    /// Resolve the toolchain and create the artifact directory.
    ///
    /// Resolution happens first: a missing executable fails here, before
    /// any stage runs, with its own exit code.
    pub fn new(suffix: &str, overrides: &ToolOverrides) -> Result<Self> {
        let tools = Toolchain::resolve(suffix, overrides)?;
        let dir = RunDir::create()?;
        Ok(Self { tools, dir })
    }
}
