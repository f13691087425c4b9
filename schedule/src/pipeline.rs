//! Pipeline construction.

use kiln_ir::FunctionSignature;

use crate::stage::Stage;
use crate::transform;

/// Target configuration for the codegen stage and tiling decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    /// `-mcpu=` value for the native codegen stage.
    pub mcpu: Option<String>,
    /// `-mattr=` value (vector feature set) for the native codegen stage.
    pub mattr: Option<String>,
    /// Whether kernel-specific tiling transforms may be scheduled.
    pub tile: bool,
    /// Tile sizes (m, n, k) for matmul-shaped kernels.
    pub tile_sizes: [u64; 3],
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self { mcpu: None, mattr: None, tile: true, tile_sizes: [4, 4, 4] }
    }
}

/// An ordered, dependency-consistent lowering plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSpec {
    pub stages: Vec<Stage>,
    /// Transform-dialect script for the Transform stage, when scheduled.
    pub transform_script: Option<String>,
}

impl PipelineSpec {
    /// Assert the dependency-order invariant.
    ///
    /// A violation is a programming error in the builder, not a user-facing
    /// failure, hence the panic.
    pub fn verify(&self) {
        for pair in self.stages.windows(2) {
            assert!(
                pair[0].phase() < pair[1].phase(),
                "pipeline stage {} may not precede {}",
                pair[0],
                pair[1],
            );
        }
        assert_eq!(
            self.stages.contains(&Stage::Transform),
            self.transform_script.is_some(),
            "transform stage and transform script must be scheduled together",
        );
    }

    /// The stage that produces the native object, always last.
    pub fn final_stage(&self) -> Stage {
        *self.stages.last().expect("pipeline has at least one stage")
    }

    /// Install `script` as the transform stage's schedule, scheduling the
    /// stage at its dependency position when the builder did not.
    ///
    /// A user-supplied script replaces any generated default.
    pub fn with_transform_script(mut self, script: String) -> Self {
        if !self.stages.contains(&Stage::Transform) {
            let at = self
                .stages
                .iter()
                .position(|s| s.phase() > Stage::Transform.phase())
                .unwrap_or(self.stages.len());
            self.stages.insert(at, Stage::Transform);
        }
        self.transform_script = Some(script);
        self.verify();
        self
    }
}

/// Build the lowering plan for one signature and target.
///
/// Deterministic and pure. Tiling transforms are scheduled only for
/// matmul-shaped signatures, and always before bufferization.
pub fn build_pipeline(sig: &FunctionSignature, target: &TargetConfig) -> PipelineSpec {
    let mut stages = vec![Stage::Optimize];
    let mut transform_script = None;

    if target.tile && sig.is_matmul_shaped() {
        tracing::debug!(function = %sig.name, tile_sizes = ?target.tile_sizes, "scheduling tiling transform");
        stages.push(Stage::Transform);
        transform_script = Some(transform::tiling_script(target.tile_sizes));
    }

    stages.extend([
        Stage::Bufferize,
        Stage::LowerLoops,
        Stage::LowerToLlvm,
        Stage::Translate,
        Stage::Codegen,
    ]);

    let spec = PipelineSpec { stages, transform_script };
    spec.verify();
    spec
}
