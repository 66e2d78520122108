//! E2E test harness: compile Tova source through the real pipeline and
//! assert on the emitted JavaScript and diagnostics.
#![allow(dead_code)]

use tova_compile::{compile, compile_tolerant, Compilation, CompileError, Output};

/// Strict compile that must succeed.
pub fn compile_ok(source: &str) -> Compilation {
    match compile(source, "test.tova") {
        Ok(result) => result,
        Err(err) => panic!("expected successful compile, got:\n{}", err),
    }
}

/// Strict compile that must fail.
pub fn compile_err(source: &str) -> CompileError {
    match compile(source, "test.tova") {
        Ok(_) => panic!("expected compile error for:\n{}", source),
        Err(err) => err,
    }
}

pub fn output(source: &str) -> Output {
    compile_ok(source).output
}

pub fn shared(source: &str) -> String {
    output(source).shared
}

pub fn server(source: &str) -> String {
    output(source)
        .server
        .expect("program has no server stream")
}

pub fn client(source: &str) -> String {
    output(source)
        .client
        .expect("program has no client stream")
}

/// Warning messages from a successful strict compile, in emission order.
pub fn warnings(source: &str) -> Vec<String> {
    compile_ok(source)
        .warnings
        .iter()
        .map(|w| w.message.clone())
        .collect()
}

/// Error messages from the tolerant pipeline.
pub fn errors(source: &str) -> Vec<String> {
    compile_tolerant(source, "test.tova")
        .errors
        .iter()
        .map(|e| e.message.clone())
        .collect()
}

/// Asserts that `haystack` contains `needle`, with a readable failure.
pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "expected output to contain {:?}, got:\n{}",
        needle,
        haystack
    );
}
