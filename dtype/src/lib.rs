//! Element kinds for statically-shaped kernel signatures.
//!
//! Every tensor crossing the compiled-kernel boundary carries one of the
//! kinds below. The kind decides the descriptor layout (byte width) and the
//! host-side spelling in the generated shim. Extending support is a table
//! edit here, not a conditional scattered through codegen.

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors from element-kind parsing and host mapping.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Token is not a recognized MLIR element type.
    #[snafu(display("unknown element type token: {token:?}"))]
    UnknownElement { token: String },

    /// Element kind has no defined host-side C equivalent.
    #[snafu(display("element kind {kind} has no host-side C equivalent"))]
    NoHostEquivalent { kind: ElementKind },
}

/// Scalar element kinds understood by the signature grammar.
///
/// `F16`/`BF16` are representable in MLIR modules but have no ordinary host
/// calling convention; they parse here and are rejected when the shim is
/// generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumIter, strum::EnumCount)]
pub enum ElementKind {
    I8,
    I16,
    I32,
    I64,
    F16,
    BF16,
    F32,
    F64,
}

impl ElementKind {
    /// Byte width of one element inside a packed row-major buffer.
    pub const fn bytes(&self) -> u64 {
        match self {
            Self::I8 => 1,
            Self::I16 | Self::F16 | Self::BF16 => 2,
            Self::I32 | Self::F32 => 4,
            Self::I64 | Self::F64 => 8,
        }
    }

    /// The MLIR type token, as it appears inside `tensor<...>`.
    pub const fn mlir_token(&self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F16 => "f16",
            Self::BF16 => "bf16",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Host-side C spelling, when one exists.
    ///
    /// The shim uses fixed-width `<stdint.h>` names so the flat surface is
    /// unambiguous across hosts.
    pub const fn c_style(&self) -> Option<&'static str> {
        match self {
            Self::I8 => Some("int8_t"),
            Self::I16 => Some("int16_t"),
            Self::I32 => Some("int32_t"),
            Self::I64 => Some("int64_t"),
            Self::F32 => Some("float"),
            Self::F64 => Some("double"),
            Self::F16 | Self::BF16 => None,
        }
    }

    /// Like [`c_style`](Self::c_style) but surfaces the unsupported-kind error.
    pub fn host_c_type(&self) -> Result<&'static str> {
        self.c_style().ok_or(Error::NoHostEquivalent { kind: *self })
    }

    /// Whether the kind can cross the flat host ABI at all.
    pub const fn host_representable(&self) -> bool {
        self.c_style().is_some()
    }

    /// Parse an MLIR element type token.
    pub fn parse_mlir_token(token: &str) -> Result<Self> {
        match token {
            "i8" => Ok(Self::I8),
            "i16" => Ok(Self::I16),
            "i32" => Ok(Self::I32),
            "i64" => Ok(Self::I64),
            "f16" => Ok(Self::F16),
            "bf16" => Ok(Self::BF16),
            "f32" => Ok(Self::F32),
            "f64" => Ok(Self::F64),
            _ => Err(Error::UnknownElement { token: token.to_string() }),
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mlir_token())
    }
}
