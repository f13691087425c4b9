//! Top-level error taxonomy.
//!
//! Every variant is unrecoverable: the run aborts, partial outputs are
//! deleted, and nothing is retried: external tool invocations are not
//! assumed idempotent, and a silent retry would mask nondeterministic
//! toolchain faults.

use snafu::Snafu;

use crate::linker::LinkError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can abort a compilation run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Signature extraction failed.
    #[snafu(display("{source}"))]
    Extraction { source: kiln_ir::Error },

    /// Shim generation hit an element kind the host ABI cannot express.
    #[snafu(display("{source}"))]
    UnsupportedType { source: kiln_codegen::Error },

    /// An external stage exited nonzero. Diagnostics are the tool's stderr,
    /// verbatim.
    #[snafu(display("stage '{stage}' failed (exit code {code}):\n{diagnostics}"))]
    Toolchain { stage: String, code: i32, diagnostics: String },

    /// A stage exited zero but its output artifact is missing or empty.
    #[snafu(display("stage '{stage}' produced no output artifact"))]
    StageProducedNothing { stage: String },

    /// Object merge or export verification failed.
    #[snafu(display("{source}"))]
    Link { source: LinkError },

    /// A required executable could not be resolved at startup.
    #[snafu(display("cannot resolve required executable {name:?} on PATH"))]
    ToolResolution { name: String },

    /// Filesystem failure around run artifacts.
    #[snafu(display("i/o failure while {doing}: {source}"))]
    Io { doing: String, source: std::io::Error },
}

impl Error {
    /// Process exit code, for scripted callers.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Dynamic/unranked shapes are ABI-representability limits, not
            // malformed input.
            Self::Extraction { source } if source.is_unsupported_shape() => 2,
            Self::Extraction { .. } => 1,
            Self::UnsupportedType { .. } => 2,
            Self::Toolchain { .. } | Self::StageProducedNothing { .. } | Self::Io { .. } => 3,
            Self::Link { .. } => 4,
            Self::ToolResolution { .. } => 5,
        }
    }

    /// The failing phase, for the one-line user-facing report.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Extraction { source } if source.is_unsupported_shape() => "type support",
            Self::Extraction { .. } => "signature extraction",
            Self::UnsupportedType { .. } => "type support",
            Self::Toolchain { .. } | Self::StageProducedNothing { .. } => "toolchain",
            Self::Link { .. } => "link",
            Self::ToolResolution { .. } => "toolchain resolution",
            Self::Io { .. } => "artifact i/o",
        }
    }
}
