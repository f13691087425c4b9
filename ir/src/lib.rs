//! Signature-level IR for the kiln compiler.
//!
//! kiln treats the input module as opaque text plus one statically-typed
//! function signature. This crate defines the signature types and the
//! extractor that recovers them from module text.
//!
//! # Module Organization
//!
//! - [`types`] - `TensorType`, `Shape`, `FunctionSignature`
//! - [`extract`] - top-level `func.func` signature extraction
//! - [`error`] - extraction error taxonomy

pub mod error;
pub mod extract;
pub mod types;

#[cfg(test)]
pub mod test;

pub use error::{Error, Result};
pub use extract::extract_signature;
pub use types::{FunctionSignature, Shape, TensorType};
