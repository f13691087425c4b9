//! Default transform-script generation.
//!
//! The transform stage interprets a transform-dialect script against the
//! module. When the user supplies no script, the builder emits this tiling
//! schedule for matmul-shaped kernels.

/// Transform-dialect script tiling every `linalg.matmul` with `sizes`.
pub fn tiling_script(sizes: [u64; 3]) -> String {
    let [m, n, k] = sizes;
    format!(
        r#"module attributes {{transform.with_named_sequence}} {{
  transform.named_sequence @__transform_main(%root: !transform.any_op {{transform.readonly}}) {{
    %matmuls = transform.structured.match ops{{["linalg.matmul"]}} in %root
      : (!transform.any_op) -> !transform.any_op
    %tiled, %loops:3 = transform.structured.tile_using_for %matmuls tile_sizes [{m}, {n}, {k}]
      : (!transform.any_op) -> (!transform.any_op, !transform.any_op, !transform.any_op, !transform.any_op)
    transform.yield
  }}
}}
"#
    )
}
