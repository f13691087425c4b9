//! ABI shim generation for the kiln compiler.
//!
//! After lowering, the kernel expects every tensor argument as an expanded
//! memref descriptor (allocated pointer, aligned pointer, offset, sizes,
//! strides) and returns the result descriptor by value. No host program can
//! construct that surface directly. This crate emits C source for a thin
//! adapter that exposes a flat entry point and performs the repacking.
//!
//! # Module Organization
//!
//! - [`descriptor`] - the fixed memref descriptor field layout
//! - [`shim`] - the C shim generator
//! - [`error`] - unsupported-type failures

pub mod descriptor;
pub mod error;
pub mod shim;

#[cfg(test)]
pub mod test;

pub use error::{Error, Result};
pub use shim::{ShimSource, generate_shim};
