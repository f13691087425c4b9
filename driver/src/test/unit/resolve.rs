//! Tool-resolution tests.

use crate::context::RunContext;
use crate::error::Error;
use crate::resolve::{ToolOverrides, find_on_path};

#[test]
fn path_scan_finds_a_shell() {
    // Present on any unix test host.
    assert!(find_on_path("sh").is_some());
    assert!(find_on_path("kiln-no-such-tool-3f9").is_none());
}

#[test]
fn unresolvable_suffix_fails_before_any_stage() {
    // A bogus suffix makes the very first lookup fail, so the run dies at
    // context construction with the dedicated startup exit code.
    let err = RunContext::new("-kiln-test-missing", &ToolOverrides::default()).unwrap_err();
    match &err {
        Error::ToolResolution { name } => assert_eq!(name, "mlir-opt-kiln-test-missing"),
        other => panic!("expected tool-resolution error, got {other:?}"),
    }
    assert_eq!(err.exit_code(), 5);
    assert_eq!(err.phase(), "toolchain resolution");
}

#[test]
fn override_must_exist() {
    let overrides = ToolOverrides {
        mlir_opt: Some("/nonexistent/kiln/mlir-opt".into()),
        ..ToolOverrides::default()
    };
    let err = RunContext::new("", &overrides).unwrap_err();
    assert!(matches!(err, Error::ToolResolution { .. }), "got {err:?}");
}
