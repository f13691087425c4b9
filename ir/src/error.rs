use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors from signature extraction.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// No `func.func` definition in the module text.
    #[snafu(display("no function definition found in module"))]
    NoFunction,

    /// Function declaration without a `@name` identifier.
    #[snafu(display("function definition is missing a @name identifier"))]
    MissingName,

    /// Parameter list could not be delimited.
    #[snafu(display("malformed parameter list: {reason}"))]
    MalformedParams { reason: String },

    /// Operand or result is not a ranked tensor type.
    #[snafu(display("expected a tensor type, got {type_text:?}"))]
    NotATensor { type_text: String },

    /// Shape contains a dynamic dimension (`?`).
    ///
    /// The ABI layout must be known at generation time; dynamic shapes have
    /// no representable descriptor.
    #[snafu(display("dynamic dimension in {type_text:?}: shapes must be fully static"))]
    DynamicDim { type_text: String },

    /// Unranked tensor (`tensor<*x..>`).
    #[snafu(display("unranked tensor {type_text:?}: shapes must be fully static"))]
    Unranked { type_text: String },

    /// Dimension token is not a non-negative integer.
    #[snafu(display("invalid dimension token {token:?}"))]
    BadDim { token: String },

    /// Element type token not in the supported grammar.
    #[snafu(display("unsupported element type in {type_text:?}: {source}"))]
    Element { type_text: String, source: kiln_dtype::Error },

    /// Function has no tensor result.
    #[snafu(display("function has no result type"))]
    MissingResult,

    /// Multi-result functions are not supported.
    #[snafu(display("multi-result functions are not supported: {type_text:?}"))]
    MultiResult { type_text: String },
}

impl Error {
    /// Whether this failure is an ABI-representability limit (dynamic or
    /// unranked shape) rather than malformed input.
    ///
    /// The driver classifies these as unsupported-type failures.
    pub fn is_unsupported_shape(&self) -> bool {
        matches!(self, Self::DynamicDim { .. } | Self::Unranked { .. })
    }
}
