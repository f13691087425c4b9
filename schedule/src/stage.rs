//! The closed set of lowering stages.
//!
//! Each stage wraps one external-tool invocation with a fixed flag list.
//! Ordering is expressed as a phase number: a stage consuming dialect D must
//! carry a strictly greater phase than the stage that eliminates D.

/// External tool a stage runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    MlirOpt,
    MlirTranslate,
    Llc,
}

/// Named lowering stages, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Tensor-level cleanup: canonicalization, fusion, CSE.
    Optimize,
    /// Optional transform-script interpretation (tiling schedules).
    Transform,
    /// Tensor-to-memref conversion across function boundaries.
    Bufferize,
    /// Structured ops and memref metadata down to explicit loops.
    LowerLoops,
    /// Everything remaining into the LLVM dialect.
    LowerToLlvm,
    /// LLVM dialect to LLVM IR.
    Translate,
    /// LLVM IR to a native relocatable object.
    Codegen,
}

impl Stage {
    /// Stable stage identifier, also used to key artifacts.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Optimize => "optimize",
            Self::Transform => "transform",
            Self::Bufferize => "bufferize",
            Self::LowerLoops => "lower-loops",
            Self::LowerToLlvm => "lower-to-llvm",
            Self::Translate => "translate",
            Self::Codegen => "codegen",
        }
    }

    /// Resolve a stage from its identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "optimize" => Some(Self::Optimize),
            "transform" => Some(Self::Transform),
            "bufferize" => Some(Self::Bufferize),
            "lower-loops" => Some(Self::LowerLoops),
            "lower-to-llvm" => Some(Self::LowerToLlvm),
            "translate" => Some(Self::Translate),
            "codegen" => Some(Self::Codegen),
            _ => None,
        }
    }

    /// Dependency phase. Later phases consume what earlier phases produce;
    /// a pipeline must be strictly increasing in phase.
    pub const fn phase(&self) -> u8 {
        match self {
            Self::Optimize => 1,
            Self::Transform => 2,
            Self::Bufferize => 3,
            Self::LowerLoops => 4,
            Self::LowerToLlvm => 5,
            Self::Translate => 6,
            Self::Codegen => 7,
        }
    }

    pub const fn tool(&self) -> Tool {
        match self {
            Self::Translate => Tool::MlirTranslate,
            Self::Codegen => Tool::Llc,
            _ => Tool::MlirOpt,
        }
    }

    /// File name of the stage's output inside the run directory.
    pub const fn artifact_name(&self) -> &'static str {
        match self {
            Self::Optimize => "optimized.mlir",
            Self::Transform => "transformed.mlir",
            Self::Bufferize => "bufferized.mlir",
            Self::LowerLoops => "loops.mlir",
            Self::LowerToLlvm => "lowered.mlir",
            Self::Translate => "kernel.ll",
            Self::Codegen => "kernel.o",
        }
    }

    /// Fixed flags for `mlir-opt` stages.
    ///
    /// The Transform stage additionally needs the script path; the driver
    /// prepends `--transform-preload-library=<file>` at run time.
    pub fn mlir_opt_flags(&self) -> &'static [&'static str] {
        match self {
            // Named ops survive this stage: the transform stage matches
            // `linalg.matmul` by name, so generalization must not precede it.
            Self::Optimize => &["--canonicalize", "--linalg-fuse-elementwise-ops", "--cse"],
            Self::Transform => &["--transform-interpreter"],
            // tensor.empty carries no data; it must become an allocation
            // before one-shot bufferization will accept the module.
            Self::Bufferize => &[
                "--empty-tensor-to-alloc-tensor",
                "--one-shot-bufferize=bufferize-function-boundaries=1",
            ],
            Self::LowerLoops => &[
                "--convert-linalg-to-loops",
                "--convert-scf-to-cf",
                "--expand-strided-metadata",
                "--lower-affine",
            ],
            Self::LowerToLlvm => &[
                "--finalize-memref-to-llvm",
                "--convert-arith-to-llvm",
                "--convert-func-to-llvm",
                "--convert-cf-to-llvm",
                "--reconcile-unrealized-casts",
            ],
            Self::Translate | Self::Codegen => &[],
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
