//! Error types for shim generation.

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur during shim generation.
///
/// Shim generation operates over an already-validated signature, so the only
/// failure mode is an element kind the host ABI cannot express.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Element kind has no host-side equivalent.
    #[snafu(display("unsupported type {type_text}: {source}"))]
    UnsupportedType { type_text: String, source: kiln_dtype::Error },
}
