//! Deploy-stream generation.
//!
//! Purely declarative: `deploy "env" { ... }` blocks merge into one JSON
//! object per environment, with defaults applied. This stream never affects
//! the emitted JavaScript.

use serde_json::{json, Map, Value};

use tova_language::ast::{DeployBlock, DeployEntry, Expr, ObjectEntry, TemplateChunk};

pub(crate) fn generate_deploy(blocks: &[&DeployBlock]) -> Value {
    let mut root = Map::new();
    for block in blocks {
        let entry = root
            .entry(block.env.clone())
            .or_insert_with(default_environment);
        let Some(env) = entry.as_object_mut() else {
            continue;
        };
        for item in &block.entries {
            match item {
                DeployEntry::Setting { key, value, .. } => {
                    env.insert(key.clone(), expr_to_value(value));
                }
                DeployEntry::Database {
                    engine, entries, ..
                } => {
                    let mut config = Map::new();
                    for (key, value) in entries {
                        config.insert(key.clone(), expr_to_value(value));
                    }
                    if let Some(databases) =
                        env.get_mut("databases").and_then(Value::as_array_mut)
                    {
                        databases.push(json!({ "engine": engine, "config": config }));
                    }
                }
                DeployEntry::EnvVars { entries, .. } => {
                    if let Some(vars) = env.get_mut("env").and_then(Value::as_object_mut) {
                        for (key, value) in entries {
                            vars.insert(key.clone(), expr_to_value(value));
                        }
                    }
                }
            }
        }
    }
    Value::Object(root)
}

fn default_environment() -> Value {
    json!({
        "instances": 1,
        "memory": "512mb",
        "branch": "main",
        "health": "/healthz",
        "health_interval": 30,
        "keep_releases": 5,
        "restart_on_failure": true,
        "databases": [],
        "env": {},
    })
}

/// Literal conversion; non-literal expressions have no meaning in deploy
/// configuration and become null.
fn expr_to_value(expr: &Expr) -> Value {
    match expr {
        Expr::Int { value, .. } => json!(value),
        Expr::Float { value, .. } => json!(value),
        Expr::Str { value, .. } => json!(value),
        Expr::Bool { value, .. } => json!(value),
        Expr::Nil { .. } => Value::Null,
        Expr::Array { items, .. } => {
            Value::Array(items.iter().map(expr_to_value).collect())
        }
        Expr::Object { entries, .. } => {
            let mut map = Map::new();
            for entry in entries {
                if let ObjectEntry::Field { key, value, .. } = entry {
                    map.insert(key.clone(), expr_to_value(value));
                }
            }
            Value::Object(map)
        }
        Expr::Template { parts, .. } => {
            // Text-only templates degrade to strings.
            let text: String = parts
                .iter()
                .filter_map(|p| match p {
                    TemplateChunk::Text(t) => Some(t.as_str()),
                    TemplateChunk::Expr(_) => None,
                })
                .collect();
            json!(text)
        }
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tova_base::Span;

    #[test]
    fn defaults_are_applied() {
        let block = DeployBlock {
            env: "production".to_string(),
            entries: vec![DeployEntry::Setting {
                key: "domain".to_string(),
                value: Expr::Str {
                    value: "example.com".to_string(),
                    span: Span::default(),
                },
                span: Span::default(),
            }],
            span: Span::default(),
        };
        let value = generate_deploy(&[&block]);
        let env = &value["production"];
        assert_eq!(env["domain"], "example.com");
        assert_eq!(env["instances"], 1);
        assert_eq!(env["memory"], "512mb");
        assert_eq!(env["branch"], "main");
        assert_eq!(env["health"], "/healthz");
        assert_eq!(env["health_interval"], 30);
        assert_eq!(env["keep_releases"], 5);
        assert_eq!(env["restart_on_failure"], true);
    }

    #[test]
    fn databases_accumulate() {
        let block = DeployBlock {
            env: "production".to_string(),
            entries: vec![DeployEntry::Database {
                engine: "postgres".to_string(),
                entries: vec![(
                    "size".to_string(),
                    Expr::Str {
                        value: "small".to_string(),
                        span: Span::default(),
                    },
                )],
                span: Span::default(),
            }],
            span: Span::default(),
        };
        let value = generate_deploy(&[&block]);
        let databases = value["production"]["databases"].as_array().unwrap();
        assert_eq!(databases.len(), 1);
        assert_eq!(databases[0]["engine"], "postgres");
        assert_eq!(databases[0]["config"]["size"], "small");
    }
}
