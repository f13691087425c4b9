//! Exit-code and phase mapping tests.

use crate::error::Error;
use crate::linker::LinkError;

#[test]
fn exit_codes_distinguish_failure_categories() {
    let extraction = Error::Extraction { source: kiln_ir::Error::NoFunction };
    assert_eq!(extraction.exit_code(), 1);
    assert_eq!(extraction.phase(), "signature extraction");

    let unsupported = Error::UnsupportedType {
        source: kiln_codegen::Error::UnsupportedType {
            type_text: "tensor<4xf16>".into(),
            source: kiln_dtype::Error::NoHostEquivalent { kind: kiln_dtype::ElementKind::F16 },
        },
    };
    assert_eq!(unsupported.exit_code(), 2);

    let toolchain = Error::Toolchain {
        stage: "bufferize".into(),
        code: 1,
        diagnostics: "error: oh no".into(),
    };
    assert_eq!(toolchain.exit_code(), 3);
    assert_eq!(toolchain.phase(), "toolchain");

    let link = Error::Link { source: LinkError::MissingExport { symbol: "add".into() } };
    assert_eq!(link.exit_code(), 4);

    let resolution = Error::ToolResolution { name: "mlir-opt".into() };
    assert_eq!(resolution.exit_code(), 5);
}

#[test]
fn dynamic_shape_extraction_counts_as_unsupported_type() {
    let err = Error::Extraction {
        source: kiln_ir::Error::DynamicDim { type_text: "tensor<?x8xf32>".into() },
    };
    assert_eq!(err.exit_code(), 2);
    assert_eq!(err.phase(), "type support");
}

#[test]
fn diagnostics_pass_through_verbatim() {
    let diagnostics = "loc(\"input.mlir\":3:10): error: 'linalg.matmul' op inferred shape mismatch";
    let err = Error::Toolchain { stage: "optimize".into(), code: 1, diagnostics: diagnostics.into() };
    let rendered = err.to_string();
    assert!(rendered.contains("optimize"));
    assert!(rendered.contains(diagnostics));
}
