//! Compile-time tests for the `Bean` derive macro.
//!
//! Run with: cargo nextest run --package reconf trybuild

#[test]
fn compile_pass() {
    let t = trybuild::TestCases::new();
    t.pass("tests/compile_pass/derive_bean.rs");
    t.pass("tests/compile_pass/generic_bean.rs");
}
