//! E2E Invariants: determinism, empty programs, rename equivalence, and
//! scope-tree structure.

mod common;

use common::{assert_contains, compile_ok, output};
use tova_language::analysis::ScopeId;

#[test]
fn empty_program_produces_empty_streams() {
    let result = output("");
    assert!(result.shared.is_empty());
    assert!(result.server.is_none());
    assert!(result.servers.is_empty());
    assert!(result.client.is_none());
    assert!(result.cli.is_none());
    assert!(result.deploy.is_none());
    assert!(!result.multi_block);
    assert!(!result.is_cli);
}

#[test]
fn codegen_is_byte_for_byte_deterministic() {
    let source = "type Shape {\n    Circle(r: Float)\n    Dot\n}\nserver \"api\" {\n    fn area(s) {\n        match s {\n            Circle(r) => r * r\n            Dot => 0\n        }\n    }\n}\nserver \"events\" {\n    fn push(kind) {\n        kind\n    }\n}\nclient {\n    component App {\n        state n = 0\n        <button on:click={fn() n += 1}>{n}</button>\n    }\n}\n";
    let first = output(source);
    let second = output(source);
    assert_eq!(first.shared, second.shared);
    assert_eq!(first.servers, second.servers);
    assert_eq!(first.client, second.client);
}

#[test]
fn renaming_a_variable_renames_the_output() {
    let original = "count = 1\nprint(count)\n";
    let renamed = original.replace("count", "total");
    let first = output(original);
    let second = output(&renamed);
    assert_eq!(first.shared.replace("count", "total"), second.shared);
}

#[test]
fn comments_do_not_affect_codegen() {
    let with = output("# banner\nx = 1 # trailing\nprint(x)\n");
    let without = output("x = 1\nprint(x)\n");
    assert_eq!(with.shared, without.shared);
}

#[test]
fn crlf_input_is_normalized() {
    let unix = output("x = 1\nprint(x)\n");
    let windows = output("x = 1\r\nprint(x)\r\n");
    assert_eq!(unix.shared, windows.shared);
}

#[test]
fn scope_tree_links_parents_and_children() {
    let result = compile_ok("fn outer() {\n    inner = 1\n    print(inner)\n}\nouter()\n");
    let tree = &result.analysis.tree;
    for idx in 0..tree.scope_count() {
        let id = ScopeId(idx as u32);
        for &child in &tree.scope(id).children {
            assert_eq!(tree.scope(child).parent, Some(id));
        }
    }
}

#[test]
fn declarations_resolve_in_their_scope() {
    let result = compile_ok("answer = 42\nprint(answer)\n");
    let tree = &result.analysis.tree;
    let root = tree.root();
    assert!(tree.lookup_local(root, "answer").is_some());
}

#[test]
fn find_scope_at_position_returns_innermost() {
    let source = "fn outer() {\n    inner = 1\n    print(inner)\n}\nouter()\n";
    let result = compile_ok(source);
    let tree = &result.analysis.tree;
    let at_body = tree.find_scope_at(2, 5);
    assert_ne!(at_body, tree.root());
    assert!(tree.lookup(at_body, "inner").is_some());
}

#[test]
fn shared_stream_survives_alongside_blocks() {
    let source = "greeting = \"hi\"\nprint(greeting)\nserver {\n    fn ping() {\n        1\n    }\n}\n";
    let result = output(source);
    assert_contains(&result.shared, "const greeting = \"hi\";");
    assert!(result.server.is_some());
}
