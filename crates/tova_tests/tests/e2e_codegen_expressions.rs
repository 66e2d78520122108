//! E2E Codegen: expression lowering in the shared stream.

mod common;

use common::{assert_contains, shared};

#[test]
fn fresh_name_becomes_const() {
    assert_contains(&shared("x = 1\nprint(x)\n"), "const x = 1;");
}

#[test]
fn var_becomes_let_and_reassigns() {
    let js = shared("var x = 1\nx = 2\nprint(x)\n");
    assert_contains(&js, "let x = 1;");
    assert_contains(&js, "x = 2;");
}

#[test]
fn wildcard_target_emits_bare_expression() {
    assert_contains(&shared("_ = print(1)\n"), "print(1);");
}

#[test]
fn multi_target_assignment_is_atomic() {
    let js = shared("a, b = 1, 2\nprint(a)\nprint(b)\n");
    assert_contains(&js, "const [a, b] = [1, 2];");
}

#[test]
fn swap_keeps_destructuring_without_const() {
    let js = shared("var a = 1\nvar b = 2\na, b = b, a\nprint(a)\nprint(b)\n");
    assert_contains(&js, "[a, b] = [b, a];");
}

#[test]
fn let_destructuring_passes_through() {
    let js = shared("let { name, age } = person()\nprint(name)\nprint(age)\nfn person() {\n    { name: \"a\", age: 1 }\n}\n");
    assert_contains(&js, "const { name, age } = person();");
}

#[test]
fn membership_specializes_by_collection_shape() {
    let js = shared("ok = 2 in [1, 2]\nprint(ok)\n");
    assert_contains(&js, "[1, 2].includes(2)");

    let js = shared("ok = \"a\" in \"abc\"\nprint(ok)\n");
    assert_contains(&js, "\"abc\".includes(\"a\")");

    let js = shared("ok = \"k\" in { k: 1 }\nprint(ok)\n");
    assert_contains(&js, "(\"k\" in { k: 1 })");
}

#[test]
fn membership_falls_back_to_contains_helper() {
    let js = shared("xs = [1, 2]\nok = 2 in xs\nprint(ok)\n");
    assert_contains(&js, "__contains(xs, 2)");
    assert_contains(&js, "function __contains(");
}

#[test]
fn not_in_negates() {
    let js = shared("ok = 3 not in [1, 2]\nprint(ok)\n");
    assert_contains(&js, "!([1, 2].includes(3))");
}

#[test]
fn exclusive_and_inclusive_ranges() {
    let js = shared("r = 1..5\nprint(r)\n");
    assert_contains(&js, "Array.from({ length: 5 - 1 }, (_, i) => 1 + i)");

    let js = shared("r = 1..=5\nprint(r)\n");
    assert_contains(&js, "Array.from({ length: 5 - 1 + 1 }, (_, i) => 1 + i)");
}

#[test]
fn optional_chaining_is_native() {
    let js = shared("user = { name: \"a\" }\nn = user?.name\nprint(n)\n");
    assert_contains(&js, "user?.name");

    let js = shared("xs = [1]\nn = xs?.[0]\nprint(n)\n");
    assert_contains(&js, "xs?.[0]");
}

#[test]
fn propagate_lowers_to_early_return() {
    let js = shared("fn get(r) {\n    v = r?\n    v\n}\nget(Ok(1))\n");
    assert_contains(&js, "if (__prop_0 && __prop_0.__tag === \"Err\") return __prop_0;");
    assert_contains(&js, "const v = __prop_0.value;");
}

#[test]
fn chained_comparison_inlines_simple_operands() {
    let js = shared("x = 5\nok = 1 < x < 10\nprint(ok)\n");
    assert_contains(&js, "(1 < x) && (x < 10)");
}

#[test]
fn chained_comparison_uses_temps_for_complex_operands() {
    let js = shared("fn f() {\n    1\n}\nok = 0 < f() < 10\nprint(ok)\n");
    assert_contains(&js, "__cmp_0");
    assert_contains(&js, "(__cmp_0 < __cmp_1) && (__cmp_1 < __cmp_2)");
}

#[test]
fn nullish_is_nan_safe() {
    let js = shared("name = nil\nv = name ?? \"anon\"\nprint(v)\n");
    assert_contains(&js, "(name != null && name === name ? name : \"anon\")");
}

#[test]
fn pipe_substitutes_placeholder_inline() {
    let js = shared("fn double(n) {\n    n * 2\n}\nx = 4\ny = x |> double(_)\nprint(y)\n");
    assert_contains(&js, "const y = double(x);");
}

#[test]
fn pipe_without_placeholder_prepends_argument() {
    let js = shared("total = [1, 2] |> sum\nprint(total)\n");
    assert_contains(&js, "sum([1, 2])");
}

#[test]
fn pipe_complex_input_uses_temp() {
    let js = shared("fn nums() {\n    [1, 2]\n}\nfn double(n) {\n    n * 2\n}\ny = nums() |> double(_)\nprint(y)\n");
    assert_contains(&js, "((__pipe_0) => double(__pipe_0))(nums())");
}

#[test]
fn slice_forms() {
    let js = shared("xs = [1, 2, 3, 4]\ns = xs[1:3]\nprint(s)\n");
    assert_contains(&js, "xs.slice(1, 3)");

    let js = shared("xs = [1, 2, 3, 4]\ns = xs[1:]\nprint(s)\n");
    assert_contains(&js, "xs.slice(1)");

    let js = shared("xs = [1, 2, 3, 4]\ns = xs[::2]\nprint(s)\n");
    assert_contains(&js, "__slice(xs, null, null, 2)");
    assert_contains(&js, "function __slice(");
}

#[test]
fn list_comprehension_filters_then_maps() {
    let js = shared("xs = [1, 2, 3]\nys = [x * 2 for x in xs if x > 1]\nprint(ys)\n");
    assert_contains(&js, "(xs).filter((x) => (x > 1)).map((x) => (x * 2))");
}

#[test]
fn dict_comprehension_uses_from_entries() {
    let js = shared("xs = [1, 2]\nm = {x: x * x for x in xs}\nprint(m)\n");
    assert_contains(&js, "Object.fromEntries((xs).map((x) => [x, (x * x)]))");
}

#[test]
fn string_repetition_uses_repeat() {
    let js = shared("line = \"-\" * 20\nprint(line)\n");
    assert_contains(&js, "\"-\".repeat(20)");
}

#[test]
fn template_literal_lowering() {
    let js = shared("name = \"ada\"\nmsg = \"hi {name}!\"\nprint(msg)\n");
    assert_contains(&js, "`hi ${name}!`");
}

#[test]
fn named_arguments_reorder_for_known_functions() {
    let js = shared("fn greet(name, punct) {\n    name + punct\n}\nmsg = greet(punct: \"!\", name: \"ada\")\nprint(msg)\n");
    assert_contains(&js, "greet(\"ada\", \"!\")");
}

#[test]
fn named_arguments_fall_back_to_trailing_object() {
    let js = shared("handler = fetch\nr = handler(\"u\", retries: 3)\nprint(r)\n");
    assert_contains(&js, "handler(\"u\", { retries: 3 })");
}

#[test]
fn struct_types_become_constructor_functions() {
    let js = shared("type Point {\n    x: Int\n    y: Int\n}\np = Point(1, 2)\nprint(p)\n");
    assert_contains(&js, "function Point(x, y) {");
    assert_contains(&js, "return { x, y };");
}

#[test]
fn variant_types_become_tagged_constructors() {
    let js = shared("type Shape {\n    Circle(r: Float)\n    Dot\n}\ns = Circle(1.5)\nprint(s)\n");
    assert_contains(&js, "function Circle(r) {");
    assert_contains(&js, "return { __tag: \"Circle\", r };");
    assert_contains(&js, "const Dot = Object.freeze({ __tag: \"Dot\" });");
}

#[test]
fn if_expression_with_simple_branches_is_ternary() {
    let js = shared("n = 5\nlabel = if n > 3 {\n    \"big\"\n} else {\n    \"small\"\n}\nprint(label)\n");
    assert_contains(&js, "((n > 3)) ? (\"big\") : (\"small\")");
}

#[test]
fn range_for_loop_is_a_counting_loop() {
    let js = shared("fn f() {\n    for i in 0..3 {\n        print(i)\n    }\n}\nf()\n");
    assert_contains(&js, "for (let i = 0; i < 3; i++) {");
}

#[test]
fn key_value_for_loop_uses_object_entries() {
    let js = shared("m = { a: 1 }\nfor k, v in m {\n    print(k)\n    print(v)\n}\n");
    assert_contains(&js, "for (const [k, v] of Object.entries(m)) {");
}
