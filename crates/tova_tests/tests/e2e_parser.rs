//! E2E Parser: program shape, disambiguation, and failure behavior.

use tova_language::ast::{Expr, Stmt};
use tova_language::lexer::tokenize;
use tova_language::parser::Parser;

fn parse(source: &str) -> tova_language::ast::Program {
    let tokens = tokenize(source);
    Parser::new(source, tokens, "test.tova")
        .parse()
        .expect("parse failed")
}

#[test]
fn parse_produces_program_with_positive_locations() {
    let program = parse("x = 1\nfn f(a) {\n    a\n}\n");
    assert_eq!(program.body.len(), 2);
    for stmt in &program.body {
        assert!(stmt.span().line >= 1);
        assert!(stmt.span().column >= 1);
    }
}

#[test]
fn fatal_error_carries_partial_ast() {
    let tokens = tokenize("x = 1\nfn broken(\n");
    let err = Parser::new("x = 1\nfn broken(\n", tokens, "test.tova")
        .parse()
        .unwrap_err();
    assert_eq!(err.partial.body.len(), 1);
    assert!(matches!(err.partial.body[0], Stmt::Assign { .. }));
}

#[test]
fn comparisons_do_not_become_jsx() {
    // Even in client context, infix `<` is comparison.
    let program = parse("client {\n    computed ok = a < b and c > d\n}\n");
    let Stmt::Client(block) = &program.body[0] else {
        panic!("expected client block");
    };
    let tova_language::ast::ClientDecl::Computed { value, .. } = &block.body[0] else {
        panic!("expected computed");
    };
    assert!(matches!(value, Expr::Logical { .. }));
}

#[test]
fn chained_comparison_collapses_to_nary_node() {
    let program = parse("ok = 1 < x < 10\n");
    let Stmt::Assign { values, .. } = &program.body[0] else {
        panic!("expected assignment");
    };
    let Expr::Compare { operands, ops, .. } = &values[0] else {
        panic!("expected chained comparison, got {:?}", values[0]);
    };
    assert_eq!(operands.len(), 3);
    assert_eq!(ops.len(), 2);
}

#[test]
fn arrow_lambda_backtracks_to_parenthesized_expression() {
    let program = parse("a = (1 + 2) * 3\nf = (x, y) => x + y\n");
    let Stmt::Assign { values, .. } = &program.body[0] else {
        panic!("expected assignment");
    };
    assert!(matches!(values[0], Expr::Binary { .. }));
    let Stmt::Assign { values, .. } = &program.body[1] else {
        panic!("expected assignment");
    };
    assert!(matches!(values[0], Expr::Lambda { .. }));
}

#[test]
fn subscript_on_next_line_is_new_array_literal() {
    let program = parse("a = xs\nb = [1]\n");
    assert_eq!(program.body.len(), 2);
    let Stmt::Assign { values, .. } = &program.body[1] else {
        panic!("expected assignment");
    };
    assert!(matches!(values[0], Expr::Array { .. }));
}

#[test]
fn mismatched_jsx_closing_tag_is_fatal() {
    let source = "client {\n    component T {\n        <div>\"x\"</span>\n    }\n}\n";
    let tokens = tokenize(source);
    let err = Parser::new(source, tokens, "test.tova").parse().unwrap_err();
    assert!(err.diagnostic.message.contains("Mismatched JSX closing tag"));
}

#[test]
fn missing_arrow_in_match_arm_is_fatal() {
    let source = "x = match v {\n    0 \"zero\"\n}\n";
    let tokens = tokenize(source);
    let err = Parser::new(source, tokens, "test.tova").parse().unwrap_err();
    assert!(err.diagnostic.message.contains("'=>'"));
}

#[test]
fn invalid_http_method_is_fatal() {
    let source = "server {\n    route FETCH \"/x\" {\n        1\n    }\n}\n";
    let tokens = tokenize(source);
    let err = Parser::new(source, tokens, "test.tova").parse().unwrap_err();
    assert!(err.diagnostic.message.contains("Invalid HTTP method 'FETCH'"));
}

#[test]
fn invalid_websocket_handler_is_fatal() {
    let source = "server {\n    ws \"/chat\" {\n        on_ping(socket) {\n            1\n        }\n    }\n}\n";
    let tokens = tokenize(source);
    let err = Parser::new(source, tokens, "test.tova").parse().unwrap_err();
    assert!(err.diagnostic.message.contains("Invalid WebSocket handler 'on_ping'"));
}

#[test]
fn duplicate_parameter_is_fatal() {
    let source = "fn f(a, a) {\n    a\n}\n";
    let tokens = tokenize(source);
    let err = Parser::new(source, tokens, "test.tova").parse().unwrap_err();
    assert!(err.diagnostic.message.contains("already defined"));
}

#[test]
fn unknown_auth_config_key_is_fatal() {
    let source = "server {\n    auth {\n        flavor: \"jwt\"\n    }\n}\n";
    let tokens = tokenize(source);
    let err = Parser::new(source, tokens, "test.tova").parse().unwrap_err();
    assert!(err.diagnostic.message.contains("Unknown auth config key 'flavor'"));
}

#[test]
fn tolerant_mode_recovers_and_reports() {
    let source = "x = 1\ny = )\nz = 3\n";
    let tokens = tokenize(source);
    let (program, diagnostics) =
        Parser::new(source, tokens, "test.tova").parse_tolerant();
    assert!(!diagnostics.is_empty());
    // `x` and `z` both survive recovery.
    assert!(program.body.len() >= 2);
}

#[test]
fn comments_do_not_reach_the_ast() {
    let with = parse("# header comment\nx = 1 # trailing\n");
    let without = parse("x = 1\n");
    assert_eq!(with.body.len(), without.body.len());
}
