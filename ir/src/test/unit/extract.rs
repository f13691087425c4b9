//! Unit tests for signature extraction.

use kiln_dtype::ElementKind;
use proptest::prelude::*;
use smallvec::smallvec;

use crate::error::Error;
use crate::extract::{extract_signature, parse_tensor_type};
use crate::types::{FunctionSignature, TensorType};

const ADD_MODULE: &str = r#"
module {
  func.func @add(%arg0: tensor<4xf32>, %arg1: tensor<4xf32>) -> tensor<4xf32> {
    %0 = tensor.empty() : tensor<4xf32>
    %1 = linalg.add ins(%arg0, %arg1 : tensor<4xf32>, tensor<4xf32>) outs(%0 : tensor<4xf32>) -> tensor<4xf32>
    return %1 : tensor<4xf32>
  }
}
"#;

const MATMUL_CHAIN_MODULE: &str = r#"
module {
  func.func @matmul_chain(%arg0: tensor<4x8xf32>, %arg1: tensor<8x16xf32>, %arg2: tensor<16x16xf32>) -> tensor<4x16xf32> {
    %0 = tensor.empty() : tensor<4x16xf32>
    %1 = linalg.matmul ins(%arg0, %arg1 : tensor<4x8xf32>, tensor<8x16xf32>) outs(%0 : tensor<4x16xf32>) -> tensor<4x16xf32>
    %2 = tensor.empty() : tensor<4x16xf32>
    %3 = linalg.matmul ins(%1, %arg2 : tensor<4x16xf32>, tensor<16x16xf32>) outs(%2 : tensor<4x16xf32>) -> tensor<4x16xf32>
    return %3 : tensor<4x16xf32>
  }
}
"#;

#[test]
fn test_extract_add() {
    let sig = extract_signature(ADD_MODULE).unwrap();
    assert_eq!(sig.name, "add");
    assert_eq!(sig.operands.len(), 2);
    assert_eq!(sig.operands[0], TensorType::new(ElementKind::F32, [4]));
    assert_eq!(sig.result, TensorType::new(ElementKind::F32, [4]));
}

#[test]
fn test_extract_matmul_chain() {
    let sig = extract_signature(MATMUL_CHAIN_MODULE).unwrap();
    assert_eq!(sig.name, "matmul_chain");
    assert_eq!(
        sig.operands,
        vec![
            TensorType::new(ElementKind::F32, [4, 8]),
            TensorType::new(ElementKind::F32, [8, 16]),
            TensorType::new(ElementKind::F32, [16, 16]),
        ]
    );
    assert_eq!(sig.result, TensorType::new(ElementKind::F32, [4, 16]));
    assert!(sig.is_matmul_shaped());
}

#[test]
fn test_extract_rank0_operand() {
    let module = "func.func @scale(%arg0: tensor<f64>) -> tensor<f64> { }";
    let sig = extract_signature(module).unwrap();
    assert_eq!(sig.operands[0].rank(), 0);
    assert_eq!(sig.operands[0].element_count(), 1);
}

#[test]
fn test_extract_private_visibility() {
    let module = "func.func private @inner(%arg0: tensor<2x2xi32>) -> tensor<2x2xi32> { }";
    let sig = extract_signature(module).unwrap();
    assert_eq!(sig.name, "inner");
}

#[test]
fn test_dynamic_dim_rejected() {
    let module = "func.func @f(%arg0: tensor<?x8xf32>) -> tensor<8xf32> { }";
    let err = extract_signature(module).unwrap_err();
    assert!(matches!(err, Error::DynamicDim { .. }), "got {err:?}");
    assert!(err.is_unsupported_shape());
}

#[test]
fn test_unranked_rejected() {
    let err = parse_tensor_type("tensor<*xf32>").unwrap_err();
    assert!(matches!(err, Error::Unranked { .. }));
    assert!(err.is_unsupported_shape());
}

#[test]
fn test_no_function() {
    assert_eq!(extract_signature("module { }"), Err(Error::NoFunction));
}

#[test]
fn test_missing_name() {
    let err = extract_signature("func.func (%arg0: tensor<4xf32>) -> tensor<4xf32>").unwrap_err();
    assert_eq!(err, Error::MissingName);
}

#[test]
fn test_non_tensor_operand() {
    let module = "func.func @f(%arg0: memref<4xf32>) -> tensor<4xf32> { }";
    let err = extract_signature(module).unwrap_err();
    assert!(matches!(err, Error::NotATensor { .. }), "got {err:?}");
}

#[test]
fn test_multi_result_rejected() {
    let module = "func.func @f(%arg0: tensor<4xf32>) -> (tensor<4xf32>, tensor<4xf32>) { }";
    let err = extract_signature(module).unwrap_err();
    assert!(matches!(err, Error::MultiResult { .. }), "got {err:?}");
}

#[test]
fn test_missing_result_rejected() {
    let module = "func.func @f(%arg0: tensor<4xf32>) { }";
    assert_eq!(extract_signature(module), Err(Error::MissingResult));
}

#[test]
fn test_unsupported_element_token() {
    let module = "func.func @f(%arg0: tensor<4xi1>) -> tensor<4xi1> { }";
    let err = extract_signature(module).unwrap_err();
    assert!(matches!(err, Error::Element { .. }), "got {err:?}");
    assert!(!err.is_unsupported_shape());
}

#[test]
fn test_result_attributes_tolerated() {
    let module = "func.func @f(%arg0: tensor<4xf32>) -> tensor<4xf32> attributes {llvm.emit_c_interface} { }";
    let sig = extract_signature(module).unwrap();
    assert_eq!(sig.result, TensorType::new(ElementKind::F32, [4]));
}

// =========================================================================
// Grammar round-trip: serialize -> extract -> identical signature
// =========================================================================

fn element_kind_strategy() -> impl Strategy<Value = ElementKind> {
    prop_oneof![
        Just(ElementKind::I8),
        Just(ElementKind::I16),
        Just(ElementKind::I32),
        Just(ElementKind::I64),
        Just(ElementKind::F16),
        Just(ElementKind::BF16),
        Just(ElementKind::F32),
        Just(ElementKind::F64),
    ]
}

fn tensor_type_strategy() -> impl Strategy<Value = TensorType> {
    (element_kind_strategy(), proptest::collection::vec(0u64..=64, 0..=4))
        .prop_map(|(elem, dims)| TensorType::new(elem, dims))
}

fn signature_strategy() -> impl Strategy<Value = FunctionSignature> {
    (
        "[a-z][a-z0-9_]{0,12}",
        proptest::collection::vec(tensor_type_strategy(), 1..=4),
        tensor_type_strategy(),
    )
        .prop_map(|(name, operands, result)| FunctionSignature { name, operands, result })
}

proptest! {
    #[test]
    fn signature_round_trips(sig in signature_strategy()) {
        let module = format!("module {{\n  {sig} {{\n  }}\n}}\n");
        let extracted = extract_signature(&module).unwrap();
        prop_assert_eq!(extracted, sig);
    }

    #[test]
    fn tensor_type_round_trips(ty in tensor_type_strategy()) {
        let parsed = parse_tensor_type(&ty.to_string()).unwrap();
        prop_assert_eq!(parsed, ty);
    }
}

#[test]
fn strategy_sanity() {
    // The Display impl must produce the exact grammar the extractor consumes.
    let ty = TensorType { elem: ElementKind::F32, shape: smallvec![4, 8] };
    assert_eq!(ty.to_string(), "tensor<4x8xf32>");
}
