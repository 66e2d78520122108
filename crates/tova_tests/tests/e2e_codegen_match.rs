//! E2E Codegen: match lowering strategies.

mod common;

use common::{assert_contains, shared};

#[test]
fn literal_match_over_identifier_is_a_ternary_chain() {
    let js = shared("v = 1\nx = match v {\n    0 => \"z\"\n    1 => \"o\"\n    _ => \"other\"\n}\nprint(x)\n");
    assert_contains(&js, "(v === 0) ? \"z\" : (v === 1) ? \"o\" : \"other\"");
    assert!(!js.contains("__match"), "ternary path must not bind __match:\n{}", js);
}

#[test]
fn range_arms_expand_to_bound_checks() {
    let js = shared("n = 5\nsize = match n {\n    0..10 => \"small\"\n    10..=99 => \"medium\"\n    _ => \"large\"\n}\nprint(size)\n");
    assert_contains(&js, "(n >= 0 && n < 10) ? \"small\"");
    assert_contains(&js, "(n >= 10 && n <= 99) ? \"medium\"");
}

#[test]
fn variant_match_uses_iife_with_field_bindings() {
    let source = "type Shape {\n    Circle(r: Float)\n    Square(s: Float)\n}\nx = Circle(2.0)\narea = match x {\n    Circle(r) => r * r\n    Square(s) => s * s\n}\nprint(area)\n";
    let js = shared(source);
    assert_contains(&js, "((__match) => {");
    assert_contains(&js, "if (__match.__tag === \"Circle\") {");
    assert_contains(&js, "const r = __match.r;");
    assert_contains(&js, "return (r * r);");
    assert_contains(&js, "})(x)");
}

#[test]
fn builtin_result_constructors_bind_value_field() {
    let source = "fn check(r) {\n    match r {\n        Ok(v) => v\n        Err(e) => e\n    }\n}\ncheck(Ok(1))\n";
    let js = shared(source);
    assert_contains(&js, "if (__match.__tag === \"Ok\") {");
    assert_contains(&js, "const v = __match.value;");
}

#[test]
fn guards_fall_through_to_later_arms() {
    let js = shared("n = 5\nd = match n {\n    x if x > 3 => \"big\"\n    _ => \"small\"\n}\nprint(d)\n");
    assert_contains(&js, "const x = __match;");
    assert_contains(&js, "if ((x > 3)) {");
    assert_contains(&js, "return \"big\";");
    assert_contains(&js, "return \"small\";");
}

#[test]
fn array_patterns_check_shape() {
    let js = shared("xs = [1, 2]\nd = match xs {\n    [a, b] => a + b\n    _ => 0\n}\nprint(d)\n");
    assert_contains(&js, "Array.isArray(__match) && __match.length === 2");
    assert_contains(&js, "const a = __match[0];");
    assert_contains(&js, "const b = __match[1];");
}

#[test]
fn nil_and_string_literal_patterns() {
    let js = shared("v = nil\nd = match v {\n    nil => \"none\"\n    \"x\" => \"letter\"\n    _ => \"other\"\n}\nprint(d)\n");
    assert_contains(&js, "(v === null) ? \"none\"");
    assert_contains(&js, "(v === \"x\") ? \"letter\"");
}

#[test]
fn block_bodied_arms_return_their_last_expression() {
    let source = "n = 2\nd = match n {\n    1 => {\n        a = 10\n        a\n    }\n    _ => 0\n}\nprint(d)\n";
    let js = shared(source);
    assert_contains(&js, "const a = 10;");
    assert_contains(&js, "return a;");
}
