//! E2E Analysis: context enforcement, mutability, RPC resolution, and the
//! warning families.

mod common;

use common::{compile_err, errors, warnings};

// ── Block contexts ──────────────────────────────────────────────────────

#[test]
fn state_outside_client_block_is_an_error() {
    let errs = errors("state count = 0\n");
    assert!(errs
        .iter()
        .any(|e| e.contains("'state' can only be used inside a client block")));
}

#[test]
fn route_outside_server_block_is_an_error() {
    let errs = errors("route GET \"/x\" {\n    1\n}\n");
    assert!(errs
        .iter()
        .any(|e| e.contains("'route' can only be used inside a server block")));
}

#[test]
fn state_inside_server_function_reports_client_context() {
    let source = "server {\n    fn f() {\n        state x = 1\n    }\n}\n";
    let errs = errors(source);
    assert!(errs
        .iter()
        .any(|e| e.contains("'state' can only be used inside a client block")));
}

#[test]
fn effect_inside_component_is_fine() {
    let source = "client {\n    component App {\n        state n = 0\n        effect {\n            print(n)\n        }\n        <p>{n}</p>\n    }\n}\n";
    assert!(errors(source).is_empty());
}

// ── Mutability ──────────────────────────────────────────────────────────

#[test]
fn reassigning_immutable_binding_is_an_error() {
    let errs = errors("x = 1\nx = 2\n");
    assert!(errs
        .iter()
        .any(|e| e.contains("Cannot reassign immutable variable 'x'")));
}

#[test]
fn var_bindings_reassign_freely() {
    assert!(errors("var x = 1\nx = 2\nprint(x)\n").is_empty());
}

#[test]
fn compound_assign_requires_mutability() {
    let errs = errors("x = 1\nx += 1\n");
    assert!(errs
        .iter()
        .any(|e| e.contains("Cannot reassign immutable variable 'x'")));
}

#[test]
fn member_targets_are_always_assignable() {
    assert!(errors("obj = { n: 1 }\nobj.n = 2\nprint(obj)\n").is_empty());
}

// ── Names ───────────────────────────────────────────────────────────────

#[test]
fn undefined_identifier_reports_error() {
    let errs = errors("print(missing)\n");
    assert!(errs.iter().any(|e| e.contains("'missing' is not defined")));
}

#[test]
fn undefined_identifier_suggests_near_miss() {
    let errs = errors("counter = 1\nprint(countr)\n");
    assert!(errs
        .iter()
        .any(|e| e.contains("'countr' is not defined (hint: did you mean 'counter'?)")));
}

#[test]
fn duplicate_declaration_is_an_error() {
    let errs = errors("let x = 1\nlet x = 2\n");
    assert!(errs.iter().any(|e| e.contains("'x' is already defined")));
}

#[test]
fn aggregate_error_message_mentions_analysis_errors() {
    let err = compile_err("print(missing)\n");
    let text = err.to_string();
    assert!(text.contains("Analysis errors"));
    assert!(text.contains("test.tova:1:7"));
}

// ── Warnings ────────────────────────────────────────────────────────────

#[test]
fn unused_variable_warns() {
    let warns = warnings("fn work() {\n    junk = 1\n}\nwork()\n");
    assert!(warns.iter().any(|w| w.contains("Unused variable 'junk'")));
}

#[test]
fn underscore_names_and_main_are_exempt() {
    let warns = warnings("fn main() {\n    _scratch = 1\n}\n");
    assert!(warns.is_empty());
}

#[test]
fn shadowing_warns() {
    let source = "x = 1\nfn f() {\n    let x = 2\n    x\n}\nf()\nprint(x)\n";
    let warns = warnings(source);
    assert!(warns
        .iter()
        .any(|w| w.contains("'x' shadows an earlier declaration")));
}

#[test]
fn camel_case_function_warns_with_rename_hint() {
    let warns = warnings("fn getUser() {\n    1\n}\ngetUser()\n");
    assert!(warns.iter().any(|w| {
        w.contains("Function 'getUser' should use snake_case")
            && w.contains("(hint: Rename 'getUser' to 'get_user')")
    }));
}

#[test]
fn consecutive_capitals_do_not_split_in_rename_hint() {
    let warns = warnings("fn XMLParser() {\n    1\n}\nXMLParser()\n");
    assert!(warns
        .iter()
        .any(|w| w.contains("(hint: Rename 'XMLParser' to 'xmlparser')")));
}

#[test]
fn lowercase_type_warns_with_pascal_hint() {
    let warns = warnings("type point {\n    x: Int\n}\np = point(1)\nprint(p)\n");
    assert!(warns.iter().any(|w| {
        w.contains("Type 'point' should use PascalCase")
            && w.contains("(hint: Rename 'point' to 'Point')")
    }));
}

#[test]
fn unreachable_code_warns() {
    let warns = warnings("fn f() {\n    return 1\n    print(2)\n}\nf()\n");
    assert!(warns.iter().any(|w| w.contains("Unreachable code")));
}

#[test]
fn constant_conditions_warn_except_while_true() {
    let warns = warnings("if true {\n    print(1)\n}\n");
    assert!(warns.iter().any(|w| w.contains("Condition is always true")));

    let warns = warnings("while false {\n    print(1)\n}\n");
    assert!(warns.iter().any(|w| w.contains("Condition is always false")));

    let warns = warnings("fn f() {\n    while true {\n        break\n    }\n}\nf()\n");
    assert!(!warns.iter().any(|w| w.contains("always true")));
}

// ── Match analysis ──────────────────────────────────────────────────────

#[test]
fn non_exhaustive_match_names_missing_variant() {
    let source = "type Opt {\n    Some(v: Int)\n    None\n}\nx = Some(1)\nmatch x {\n    Some(v) => v\n}\n";
    let warns = warnings(source);
    assert!(warns
        .iter()
        .any(|w| w.contains("Non-exhaustive match") && w.contains("'None'")));
}

#[test]
fn exhaustive_match_has_no_warning() {
    let source = "type Opt {\n    Some(v: Int)\n    None\n}\nx = Some(1)\nmatch x {\n    Some(v) => v\n    None => 0\n}\n";
    let warns = warnings(source);
    assert!(!warns.iter().any(|w| w.contains("Non-exhaustive")));
}

#[test]
fn wildcard_arm_makes_match_exhaustive() {
    let source = "type Opt {\n    Some(v: Int)\n    None\n}\nx = Some(1)\nmatch x {\n    Some(v) => v\n    _ => 0\n}\n";
    assert!(!warnings(source).iter().any(|w| w.contains("Non-exhaustive")));
}

#[test]
fn arm_after_wildcard_is_unreachable() {
    let source = "n = 1\nmatch n {\n    _ => 0\n    1 => 1\n}\n";
    let warns = warnings(source);
    assert!(warns.iter().any(|w| w.contains("Unreachable match arm")));
}

// ── Inter-server RPC ────────────────────────────────────────────────────

#[test]
fn self_rpc_call_warns_first() {
    let source = "server \"api\" {\n    fn foo() {\n        api.foo()\n    }\n}\n";
    let warns = warnings(source);
    assert!(!warns.is_empty());
    assert!(warns[0].contains("Server 'api' is calling itself"));
}

#[test]
fn unknown_peer_function_is_an_error() {
    let source = "server \"api\" {\n    fn create() {\n        events.push(1)\n    }\n}\nserver \"events\" {\n    fn emit() {\n        1\n    }\n}\n";
    let errs = errors(source);
    assert!(errs
        .iter()
        .any(|e| e.contains("Server 'events' has no function 'push'")));
}

#[test]
fn known_peer_function_resolves_cleanly() {
    let source = "server \"api\" {\n    fn create() {\n        events.emit(1)\n    }\n}\nserver \"events\" {\n    fn emit(kind) {\n        kind\n    }\n}\n";
    assert!(errors(source).is_empty());
}
