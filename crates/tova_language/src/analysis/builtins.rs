//! Built-in symbol registration.
//!
//! The root scope is seeded with type names, stdlib functions, and the
//! `Result`/`Option` constructors before traversal. Each function carries its
//! parameter names so signature help and named-argument lowering have
//! something to work with.

use tova_base::Span;

use super::scope::{ScopeTree, Symbol, SymbolKind};

const TYPES: &[&str] = &[
    "Int", "Float", "String", "Bool", "Nil", "Any", "Result", "Option", "Function",
];

const FUNCTIONS: &[(&str, &[&str])] = &[
    ("print", &["values"]),
    ("range", &["start", "end"]),
    ("len", &["value"]),
    ("type_of", &["value"]),
    ("enumerate", &["items"]),
    ("zip", &["first", "second"]),
    ("map", &["items", "transform"]),
    ("filter", &["items", "predicate"]),
    ("reduce", &["items", "accumulator", "initial"]),
    ("sum", &["items"]),
    ("sorted", &["items"]),
    ("reversed", &["items"]),
    ("fetch", &["url", "options"]),
    ("db", &["query", "params"]),
    ("keys", &["object"]),
    ("values", &["object"]),
    ("entries", &["object"]),
    ("join", &["items", "separator"]),
    ("split", &["text", "separator"]),
    ("trim", &["text"]),
    ("upper", &["text"]),
    ("lower", &["text"]),
    ("replace", &["text", "from", "to"]),
    ("starts_with", &["text", "prefix"]),
    ("ends_with", &["text", "suffix"]),
    ("contains", &["collection", "item"]),
    ("push", &["items", "value"]),
    ("pop", &["items"]),
    ("abs", &["value"]),
    ("min", &["values"]),
    ("max", &["values"]),
    ("round", &["value"]),
    ("floor", &["value"]),
    ("ceil", &["value"]),
    ("random", &[]),
    ("int", &["value"]),
    ("float", &["value"]),
    ("str", &["value"]),
    ("json_parse", &["text"]),
    ("json_stringify", &["value"]),
    ("now", &[]),
];

/// Ambient server runtime objects, addressable as plain names
/// (`env.DATABASE_URL`, `session.get(...)`, `cache.set(...)`).
const RUNTIME_OBJECTS: &[&str] = &["env", "session", "cache"];

/// `(constructor, owning type, fields)`
const CONSTRUCTORS: &[(&str, &str, &[&str])] = &[
    ("Ok", "Result", &["value"]),
    ("Err", "Result", &["value"]),
    ("Some", "Option", &["value"]),
    ("None", "Option", &[]),
];

/// The variants of the built-in sum types, for exhaustiveness checks.
pub const BUILTIN_VARIANTS: &[(&str, &[&str])] =
    &[("Result", &["Ok", "Err"]), ("Option", &["Some", "None"])];

pub fn register(tree: &mut ScopeTree) {
    let root = tree.root();
    let span = Span::default();

    for name in TYPES {
        let mut sym = Symbol::new(*name, SymbolKind::Builtin, span);
        sym.exempt_unused = true;
        sym.inferred_type = Some("Type".to_string());
        let _ = tree.declare(root, sym);
    }

    for (name, params) in FUNCTIONS {
        let mut sym = Symbol::new(*name, SymbolKind::Builtin, span);
        sym.exempt_unused = true;
        sym.param_names = params.iter().map(|p| p.to_string()).collect();
        sym.param_types = vec![None; params.len()];
        let _ = tree.declare(root, sym);
    }

    for name in RUNTIME_OBJECTS {
        let mut sym = Symbol::new(*name, SymbolKind::Builtin, span);
        sym.exempt_unused = true;
        let _ = tree.declare(root, sym);
    }

    for (name, owner, fields) in CONSTRUCTORS {
        let mut sym = Symbol::new(*name, SymbolKind::Builtin, span);
        sym.exempt_unused = true;
        sym.variant_of = Some(owner.to_string());
        sym.param_names = fields.iter().map(|f| f.to_string()).collect();
        sym.param_types = vec![None; fields.len()];
        let _ = tree.declare(root, sym);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_types_functions_and_constructors() {
        let mut tree = ScopeTree::new();
        register(&mut tree);
        let root = tree.root();

        for name in ["Int", "Result", "print", "len", "Ok", "None"] {
            assert!(tree.lookup_local(root, name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn constructors_know_their_type() {
        let mut tree = ScopeTree::new();
        register(&mut tree);
        let id = tree.lookup_local(tree.root(), "Some").unwrap();
        assert_eq!(tree.symbol(id).variant_of.as_deref(), Some("Option"));
        assert_eq!(tree.symbol(id).param_names, vec!["value"]);
    }
}
