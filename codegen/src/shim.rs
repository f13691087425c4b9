//! C shim generation.
//!
//! Emits the adapter translating between the flat host calling convention
//! and the expanded-descriptor convention of the lowered kernel.
//!
//! # Host Signature
//!
//! ```c
//! void <name>(const T0* a0, const int64_t* a0_shape,
//!             ...,                /* one (data, shape) pair per operand */
//!             Tr* out);           /* caller-supplied result buffer */
//! ```
//!
//! Ranks are implied by the statically-known signature; the shape arrays are
//! part of the caller contract and are not consulted when packing.

use std::collections::BTreeMap;

use kiln_ir::FunctionSignature;

use crate::descriptor::{host_type, pack_initializer, struct_name, struct_typedef, unpacked_args};
use crate::error::*;

/// Generated adapter source plus the symbols it binds.
#[derive(Debug, Clone)]
pub struct ShimSource {
    /// The C source text.
    pub code: String,
    /// The flat entry point the shim exports; the function's own name.
    pub public_symbol: String,
    /// The renamed lowered-kernel symbol the shim calls.
    pub kernel_symbol: String,
}

/// Generate the adapter source for `sig`, calling the kernel as
/// `kernel_symbol`.
///
/// Fails only with [`Error::UnsupportedType`]; the signature's shapes were
/// already validated at extraction.
pub fn generate_shim(sig: &FunctionSignature, kernel_symbol: &str) -> Result<ShimSource> {
    let result_struct = struct_name(&sig.result);
    let result_c = host_type(&sig.result)?;

    // One typedef per distinct (rank, element kind), deterministic order.
    let mut typedefs: BTreeMap<String, String> = BTreeMap::new();
    for ty in sig.operands.iter().chain([&sig.result]) {
        typedefs.insert(struct_name(ty), struct_typedef(ty)?);
    }

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("/* Adapter for @{}: flat host entry over the expanded-descriptor", sig.name));
    lines.push(" * kernel ABI. Descriptor layout: allocated, aligned, offset, sizes[rank],".to_string());
    lines.push(" * strides[rank] (finalize-memref-to-llvm, LLVM/MLIR 19-20); re-validate on".to_string());
    lines.push(" * toolchain upgrades. Generated; do not edit. */".to_string());
    lines.push("#include <stdint.h>".to_string());
    lines.push("#include <stdlib.h>".to_string());
    lines.push("#include <string.h>".to_string());
    lines.push(String::new());

    for typedef in typedefs.values() {
        lines.push(typedef.clone());
        lines.push(String::new());
    }

    // Lowered kernel declaration: each operand expanded to scalars.
    let mut kernel_params: Vec<String> = Vec::new();
    for operand in &sig.operands {
        kernel_params.extend(crate::descriptor::kernel_param_types(operand)?);
    }
    lines.push(format!("{result_struct} {kernel_symbol}({});", kernel_params.join(", ")));
    lines.push(String::new());

    // Flat public entry point.
    let mut public_params: Vec<String> = Vec::new();
    for (i, operand) in sig.operands.iter().enumerate() {
        let c = host_type(operand)?;
        public_params.push(format!("const {c} *a{i}"));
        public_params.push(format!("const int64_t *a{i}_shape"));
    }
    public_params.push(format!("{result_c} *out"));
    lines.push(format!("void {}({}) {{", sig.name, public_params.join(", ")));

    for i in 0..sig.operands.len() {
        lines.push(format!("  (void)a{i}_shape;"));
    }
    if !sig.operands.is_empty() {
        lines.push(String::new());
    }

    for (i, operand) in sig.operands.iter().enumerate() {
        lines.push(format!("  /* operand {i}: {operand} */"));
        lines.push(format!(
            "  {} d{i} = {};",
            struct_name(operand),
            pack_initializer(&format!("a{i}"), operand)?,
        ));
    }
    lines.push(String::new());

    let mut call_args: Vec<String> = Vec::new();
    for (i, operand) in sig.operands.iter().enumerate() {
        call_args.push(unpacked_args(&format!("d{i}"), operand).join(", "));
    }
    if call_args.is_empty() {
        lines.push(format!("  {result_struct} ret = {kernel_symbol}();"));
    } else {
        lines.push(format!("  {result_struct} ret = {kernel_symbol}("));
        let last = call_args.len() - 1;
        for (i, group) in call_args.iter().enumerate() {
            let tail = if i == last { ");" } else { "," };
            lines.push(format!("      {group}{tail}"));
        }
    }
    lines.push(String::new());

    // Bufferization allocates the result with malloc and hands it back in
    // identity layout; copy it out and release it.
    lines.push(format!("  memcpy(out, ret.aligned + ret.offset, {});", sig.result.byte_size()));
    lines.push("  free(ret.allocated);".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    let code = lines.join("\n");
    tracing::debug!(function = %sig.name, operands = sig.operands.len(), "generated ABI shim");

    Ok(ShimSource {
        code,
        public_symbol: sig.name.clone(),
        kernel_symbol: kernel_symbol.to_string(),
    })
}
