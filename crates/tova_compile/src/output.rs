//! The compilation result handed to the CLI driver and deploy orchestrator.

use std::collections::BTreeMap;

use serde::Serialize;

/// All output streams of one compilation.
///
/// Codegen is deterministic: compiling the same AST twice produces
/// byte-identical streams. `servers` is a `BTreeMap` so named-server
/// iteration order is part of that guarantee.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Output {
    /// Top-level code outside any block, shared by every target.
    pub shared: String,
    /// The single (unnamed) server program, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// One self-contained program per named server block.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub servers: BTreeMap<String, String>,
    /// True when named server blocks produced `servers`.
    pub multi_block: bool,
    /// The browser-targeted module, when the program has client blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// The CLI driver, when the program has a `cli` block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cli: Option<String>,
    pub is_cli: bool,
    /// Merged deploy configuration keyed by environment name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy: Option<serde_json::Value>,
}
