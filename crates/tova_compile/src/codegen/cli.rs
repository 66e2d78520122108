//! CLI-stream generation.
//!
//! Each `fn` in a `cli` block becomes a subcommand. Parameter metadata
//! drives flag parsing and the generated `--help` text:
//!
//! - `Bool` parameters are implicit optional flags (`--done`, `--no-done`)
//! - `[T]` parameters are repeatable flags
//! - defaulted parameters are optional flags
//! - everything else is a required positional

use tova_language::ast::{CliBlock, Expr, FnDecl, TypeAnnotation};

use super::{js_string, with_helpers, Codegen, Registries, Target};

/// The argv loop, help printer, and dispatcher. Command metadata is
/// registered next to each generated function; `__cli_main` runs at load.
const DRIVER: &str = r#"function __register(name, meta, handler) {
    __cli.commands[name] = { meta, handler };
}
function __printHelp() {
    console.log(`${__cli.name} ${__cli.version}`);
    if (__cli.description) console.log(__cli.description);
    console.log("");
    console.log("Commands:");
    for (const [name, entry] of Object.entries(__cli.commands)) {
        console.log(`  ${name}`);
    }
}
function __printCommandHelp(name) {
    const entry = __cli.commands[name];
    const positionals = entry.meta.params.filter((p) => p.kind === "positional");
    const flags = entry.meta.params.filter((p) => p.kind !== "positional");
    const usage = positionals.map((p) => `<${p.name}>`).join(" ");
    console.log(`Usage: ${__cli.name} ${name} ${usage}`.trimEnd());
    if (flags.length > 0) {
        console.log("Flags:");
        for (const p of flags) {
            console.log(`  --${p.name} (${p.type})`);
        }
    }
}
function __parseValue(type, raw) {
    return type === "Int" || type === "Float" ? Number(raw) : raw;
}
async function __cli_main(argv) {
    const [command, ...rest] = argv;
    if (!command || command === "--help" || command === "-h") {
        __printHelp();
        return;
    }
    if (command === "--version" || command === "-v") {
        console.log(__cli.version);
        return;
    }
    const entry = __cli.commands[command];
    if (!entry) {
        console.error(`Unknown command: ${command}`);
        __printHelp();
        process.exit(1);
    }
    if (rest.includes("--help")) {
        __printCommandHelp(command);
        return;
    }
    const byName = {};
    for (const p of entry.meta.params) byName[p.name] = p;
    const values = {};
    const positionals = [];
    for (let i = 0; i < rest.length; i++) {
        const arg = rest[i];
        if (arg.startsWith("--no-")) {
            const name = arg.slice(5);
            if (!byName[name]) {
                console.error(`Unknown flag: --no-${name}`);
                process.exit(1);
            }
            values[name] = false;
            continue;
        }
        if (arg.startsWith("--")) {
            let name = arg.slice(2);
            let raw = null;
            const eq = name.indexOf("=");
            if (eq >= 0) {
                raw = name.slice(eq + 1);
                name = name.slice(0, eq);
            }
            const param = byName[name];
            if (!param) {
                console.error(`Unknown flag: --${name}`);
                process.exit(1);
            }
            if (param.type === "Bool" && raw === null) {
                values[name] = true;
                continue;
            }
            if (raw === null) raw = rest[++i];
            if (raw === undefined) {
                console.error(`Missing value for --${name}`);
                process.exit(1);
            }
            const parsed = __parseValue(param.type, raw);
            if (param.kind === "repeat") {
                (values[name] = values[name] ?? []).push(parsed);
            } else {
                values[name] = parsed;
            }
            continue;
        }
        positionals.push(arg);
    }
    const args = [];
    for (const p of entry.meta.params) {
        if (p.kind === "positional") {
            if (positionals.length === 0) {
                console.error(`Missing required argument: ${p.name}`);
                process.exit(1);
            }
            args.push(__parseValue(p.type, positionals.shift()));
        } else if (p.kind === "repeat") {
            args.push(values[p.name] ?? []);
        } else if (p.type === "Bool") {
            args.push(values[p.name] ?? p.default ?? false);
        } else {
            args.push(values[p.name] ?? p.default);
        }
    }
    await entry.handler(...args);
}
"#;

pub(crate) fn generate_cli(block: &CliBlock, reg: &Registries) -> String {
    let mut gen = Codegen::new(Target::Cli, reg);

    let name = config_string(block, "name").unwrap_or_else(|| "cli".to_string());
    let version = config_string(block, "version").unwrap_or_else(|| "0.1.0".to_string());
    let description = config_string(block, "description").unwrap_or_default();

    let mut out = format!(
        "const __cli = {{\n    name: {},\n    version: {},\n    description: {},\n    commands: {{}},\n}};\n",
        js_string(&name),
        js_string(&version),
        js_string(&description)
    );
    out.push_str(DRIVER);
    out.push('\n');

    let mut body = String::new();
    for command in &block.commands {
        body.push_str(&gen.function(command));
        body.push_str(&gen.cli_register(command));
    }
    out.push_str(&with_helpers(body, &gen));
    out.push_str("\n__cli_main(process.argv.slice(2));\n");
    out
}

fn config_string(block: &CliBlock, key: &str) -> Option<String> {
    block.config.iter().find_map(|(k, v)| {
        if k == key {
            if let Expr::Str { value, .. } = v {
                return Some(value.clone());
            }
        }
        None
    })
}

impl<'a> Codegen<'a> {
    fn cli_register(&mut self, command: &FnDecl) -> String {
        let mut params = Vec::new();
        for param in &command.params {
            let type_name = param
                .ty
                .as_ref()
                .map(annotation_base)
                .unwrap_or_else(|| "String".to_string());
            let is_list = matches!(param.ty, Some(TypeAnnotation::List { .. }));
            let kind = if is_list {
                "repeat"
            } else if type_name == "Bool" || param.default.is_some() {
                "flag"
            } else {
                "positional"
            };
            let mut entry = format!(
                "{{ name: {}, kind: {}, type: {}",
                js_string(&param.name),
                js_string(kind),
                js_string(&type_name)
            );
            if let Some(default) = &param.default {
                let default_js = self.expr(default);
                entry.push_str(&format!(", default: {}", default_js));
            }
            if kind == "positional" {
                entry.push_str(", required: true");
            }
            entry.push_str(" }");
            params.push(entry);
        }

        let mut out = String::new();
        self.line(
            &mut out,
            &format!(
                "__register({}, {{ params: [{}] }}, {});",
                js_string(&command.name),
                params.join(", "),
                command.name
            ),
        );
        out
    }
}

/// The base type name of an annotation; list types report their element.
fn annotation_base(ty: &TypeAnnotation) -> String {
    match ty {
        TypeAnnotation::Name { name, .. } => name.clone(),
        TypeAnnotation::List { element, .. } => annotation_base(element),
        TypeAnnotation::Optional { inner, .. } => annotation_base(inner),
    }
}
