//! The memref descriptor field layout.
//!
//! `finalize-memref-to-llvm` (LLVM/MLIR 19-20) lowers a rank-R memref to the
//! struct `{ allocated: ptr, aligned: ptr, offset: i64, sizes: [R x i64],
//! strides: [R x i64] }`, and `convert-func-to-llvm` expands memref arguments
//! into those scalars, in that order. Everything in this module must
//! reproduce that order and count exactly; a mismatch is silent memory
//! corruption, not a reported error. Re-validate against the toolchain on
//! every version bump.

use kiln_ir::TensorType;

use crate::error::*;

/// Number of scalar fields a rank-R descriptor expands to.
pub const fn field_count(rank: usize) -> usize {
    3 + 2 * rank
}

/// C struct name for a descriptor of the given tensor type.
pub fn struct_name(ty: &TensorType) -> String {
    format!("kiln_memref_{}d_{}", ty.rank(), ty.elem)
}

/// C typedef for the by-value descriptor struct of `ty`.
///
/// Rank-0 descriptors carry no size/stride arrays; C forbids zero-length
/// arrays in this position.
pub fn struct_typedef(ty: &TensorType) -> Result<String> {
    let c = host_type(ty)?;
    let name = struct_name(ty);
    let mut lines = vec![format!("typedef struct {{")];
    lines.push(format!("  {c} *allocated;"));
    lines.push(format!("  {c} *aligned;"));
    lines.push("  int64_t offset;".to_string());
    if ty.rank() > 0 {
        lines.push(format!("  int64_t sizes[{}];", ty.rank()));
        lines.push(format!("  int64_t strides[{}];", ty.rank()));
    }
    lines.push(format!("}} {name};"));
    Ok(lines.join("\n"))
}

/// The expanded scalar parameter list one operand contributes to the
/// lowered kernel's declaration.
pub fn kernel_param_types(ty: &TensorType) -> Result<Vec<String>> {
    let c = host_type(ty)?;
    let mut params = vec![format!("{c} *"), format!("{c} *"), "int64_t".to_string()];
    for _ in 0..ty.rank() * 2 {
        params.push("int64_t".to_string());
    }
    Ok(params)
}

/// The expanded scalar arguments read out of descriptor local `var`.
pub fn unpacked_args(var: &str, ty: &TensorType) -> Vec<String> {
    let mut args = vec![
        format!("{var}.allocated"),
        format!("{var}.aligned"),
        format!("{var}.offset"),
    ];
    for i in 0..ty.rank() {
        args.push(format!("{var}.sizes[{i}]"));
    }
    for i in 0..ty.rank() {
        args.push(format!("{var}.strides[{i}]"));
    }
    args
}

/// Brace initializer packing a flat data pointer into descriptor layout.
///
/// The aligned and allocated pointers coincide for host-provided buffers,
/// the offset is zero, sizes come from the static shape, strides are
/// row-major: the identity layout bufferization assigns.
pub fn pack_initializer(data_expr: &str, ty: &TensorType) -> Result<String> {
    let c = host_type(ty)?;
    let mut fields = vec![
        format!("({c} *){data_expr}"),
        format!("({c} *){data_expr}"),
        "0".to_string(),
    ];
    if ty.rank() > 0 {
        let sizes: Vec<String> = ty.shape.iter().map(u64::to_string).collect();
        let strides: Vec<String> = ty.row_major_strides().iter().map(u64::to_string).collect();
        fields.push(format!("{{{}}}", sizes.join(", ")));
        fields.push(format!("{{{}}}", strides.join(", ")));
    }
    Ok(format!("{{{}}}", fields.join(", ")))
}

/// Host C type of the element kind, or the unsupported-type error.
pub fn host_type(ty: &TensorType) -> Result<&'static str> {
    ty.elem
        .host_c_type()
        .map_err(|source| Error::UnsupportedType { type_text: ty.to_string(), source })
}
