//! Signature type definitions.

use kiln_dtype::ElementKind;
use smallvec::SmallVec;

/// Shape type - sequence of static dimension extents.
///
/// Uses SmallVec with inline capacity of 4 to avoid heap allocation for
/// common tensor ranks (0D-4D).
pub type Shape = SmallVec<[u64; 4]>;

/// A ranked, fully-static tensor type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorType {
    pub elem: ElementKind,
    pub shape: Shape,
}

impl TensorType {
    pub fn new(elem: ElementKind, shape: impl IntoIterator<Item = u64>) -> Self {
        Self { elem, shape: shape.into_iter().collect() }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total element count. Rank-0 tensors hold one element.
    pub fn element_count(&self) -> u64 {
        self.shape.iter().product()
    }

    /// Total byte size of a packed row-major buffer of this type.
    pub fn byte_size(&self) -> u64 {
        self.element_count() * self.elem.bytes()
    }

    /// Row-major strides, in elements, for the static shape.
    ///
    /// Matches the identity-layout strides bufferization assigns; the
    /// descriptor packing in the shim depends on this agreement.
    pub fn row_major_strides(&self) -> SmallVec<[u64; 4]> {
        let mut strides: SmallVec<[u64; 4]> = SmallVec::with_capacity(self.rank());
        let mut acc = 1u64;
        for &dim in self.shape.iter().rev() {
            strides.push(acc);
            acc *= dim.max(1);
        }
        strides.reverse();
        strides
    }
}

impl std::fmt::Display for TensorType {
    /// Prints the MLIR spelling, e.g. `tensor<4x8xf32>`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tensor<")?;
        for dim in &self.shape {
            write!(f, "{dim}x")?;
        }
        write!(f, "{}>", self.elem)
    }
}

/// The one extracted function signature of a run.
///
/// Parsed once by [`crate::extract_signature`]; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub operands: Vec<TensorType>,
    pub result: TensorType,
}

impl FunctionSignature {
    /// Whether some adjacent operand pair contracts like a matrix product
    /// (rank-2 operands with a matching inner dimension).
    ///
    /// Used only to decide whether tiling transforms apply.
    pub fn is_matmul_shaped(&self) -> bool {
        self.operands.windows(2).any(|pair| {
            pair[0].rank() == 2
                && pair[1].rank() == 2
                && pair[0].shape[1] == pair[1].shape[0]
        })
    }
}

impl std::fmt::Display for FunctionSignature {
    /// Prints the MLIR declaration header, e.g.
    /// `func.func @add(%arg0: tensor<4xf32>, %arg1: tensor<4xf32>) -> tensor<4xf32>`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "func.func @{}(", self.name)?;
        for (i, operand) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "%arg{i}: {operand}")?;
        }
        write!(f, ") -> {}", self.result)
    }
}
