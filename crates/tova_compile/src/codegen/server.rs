//! Server-stream generation: the HTTP scaffold, explicit routes, RPC
//! endpoints, lifecycle hooks, and (for named blocks) peer proxies for every
//! other named server in the program.

use tova_language::ast::{ConfigKind, Expr, FnDecl, ServerBlock, ServerDecl};

use super::{js_string, Codegen, Registries, Target, VarInfo, CONTAINS_HELPER, SLICE_HELPER};

const SCAFFOLD: &str = "const __routes = [];\nconst __middleware = [];\nconst __config = {};\nfunction __addRoute(method, path, handler) {\n    __routes.push({ method, path, handler });\n}\nfunction __addMiddleware(handler) {\n    __middleware.push(handler);\n}\nfunction __corsHeaders() {\n    return {\n        \"Access-Control-Allow-Origin\": \"*\",\n        \"Access-Control-Allow-Methods\": \"GET, POST, PUT, DELETE, PATCH, OPTIONS\",\n        \"Access-Control-Allow-Headers\": \"Content-Type, Authorization\",\n    };\n}\n";

#[derive(Debug, Default)]
struct Features {
    ws: bool,
    sse: bool,
    schedule: bool,
    background: bool,
    hooks: bool,
    subscriptions: bool,
    models: bool,
}

impl Features {
    fn scan(decls: &[ServerDecl], features: &mut Features) {
        for decl in decls {
            match decl {
                ServerDecl::Ws { .. } => features.ws = true,
                ServerDecl::Sse { .. } => features.sse = true,
                ServerDecl::Schedule { .. } => features.schedule = true,
                ServerDecl::Background { .. } => features.background = true,
                ServerDecl::OnStart { .. }
                | ServerDecl::OnStop { .. }
                | ServerDecl::OnError { .. } => features.hooks = true,
                ServerDecl::Subscribe { .. } => features.subscriptions = true,
                ServerDecl::Model { .. } => features.models = true,
                ServerDecl::RouteGroup { body, .. } => Self::scan(body, features),
                _ => {}
            }
        }
    }
}

/// Environment variable carrying a named server's port: `PORT_<UPPER>`.
fn port_var(name: &str) -> String {
    let upper: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("PORT_{}", upper)
}

/// Deterministic default port for a named server: sorted-name index.
fn default_port(reg: &Registries, name: &str) -> u16 {
    let index = reg
        .servers
        .keys()
        .position(|n| n == name)
        .unwrap_or_default();
    3100 + index as u16
}

pub(crate) fn generate_server(
    blocks: &[&ServerBlock],
    name: Option<&str>,
    reg: &Registries,
) -> String {
    let mut gen = Codegen::new(Target::Server, reg);

    let mut body = String::new();
    for block in blocks {
        for decl in &block.body {
            body.push_str(&gen.server_decl(decl, ""));
        }
    }

    let mut features = Features::default();
    for block in blocks {
        Features::scan(&block.body, &mut features);
    }

    let mut out = String::from("import { __serve } from \"tova/runtime/server\";\n\n");
    out.push_str(SCAFFOLD);
    out.push_str(CONTAINS_HELPER);
    if gen.needs_slice {
        out.push_str(SLICE_HELPER);
    }
    if features.ws {
        out.push_str("const __websockets = [];\nfunction __addWebSocket(path, handlers) {\n    __websockets.push({ path, handlers });\n}\n");
    }
    if features.sse {
        out.push_str("const __sse = [];\nfunction __addSSE(path, handler) {\n    __sse.push({ path, handler });\n}\n");
    }
    if features.schedule {
        out.push_str("const __schedules = [];\nfunction __addSchedule(spec, job) {\n    __schedules.push({ spec, job });\n}\n");
    }
    if features.background {
        out.push_str("const __background = [];\nfunction __addBackground(name, job) {\n    __background.push({ name, job });\n}\n");
    }
    if features.hooks {
        out.push_str("const __hooks = [];\nfunction __addHook(event, handler) {\n    __hooks.push({ event, handler });\n}\n");
    }
    if features.subscriptions {
        out.push_str("const __subscriptions = [];\nfunction __addSubscription(topic, handler) {\n    __subscriptions.push({ topic, handler });\n}\n");
    }
    if features.models {
        out.push_str("const __models = [];\nfunction __defineModel(name, fields) {\n    __models.push({ name, fields });\n}\n");
    }
    out.push('\n');

    // Peer proxies: every other named server becomes a local object whose
    // methods are JSON-RPC calls against the peer's port.
    if let Some(own_name) = name {
        for (peer, fns) in &reg.servers {
            if peer == own_name || fns.is_empty() {
                continue;
            }
            out.push_str(&peer_proxy(peer, default_port(reg, peer), fns));
        }
        out.push('\n');
    }

    out.push_str(&body);
    out.push('\n');

    let (var, fallback) = match name {
        Some(n) => (port_var(n), default_port(reg, n)),
        None => ("PORT".to_string(), 3000),
    };
    out.push_str(&format!(
        "const __port = Number(process.env.{} ?? {});\n",
        var, fallback
    ));
    out.push_str("__serve({\n    port: __port,\n    routes: __routes,\n    middleware: __middleware,\n    config: __config,\n    cors: __corsHeaders,\n");
    if features.ws {
        out.push_str("    websockets: __websockets,\n");
    }
    if features.sse {
        out.push_str("    sse: __sse,\n");
    }
    if features.schedule {
        out.push_str("    schedules: __schedules,\n");
    }
    if features.background {
        out.push_str("    background: __background,\n");
    }
    if features.hooks {
        out.push_str("    hooks: __hooks,\n");
    }
    if features.subscriptions {
        out.push_str("    subscriptions: __subscriptions,\n");
    }
    if features.models {
        out.push_str("    models: __models,\n");
    }
    out.push_str("});\n");
    out
}

fn peer_proxy(peer: &str, port: u16, fns: &[(String, Vec<String>)]) -> String {
    let env = port_var(peer);
    let mut out = format!("const {} = {{\n", peer);
    for (fn_name, _) in fns {
        out.push_str(&format!("    async {}(...args) {{\n", fn_name));
        out.push_str(&format!(
            "        const __res = await fetch(`http://localhost:${{process.env.{} ?? {}}}/rpc/{}`, {{\n",
            env, port, fn_name
        ));
        out.push_str("            method: \"POST\",\n");
        out.push_str("            headers: { \"Content-Type\": \"application/json\" },\n");
        out.push_str("            body: JSON.stringify({ __args: args }),\n");
        out.push_str("        });\n");
        out.push_str("        const __data = await __res.json();\n");
        out.push_str("        return __data.result;\n");
        out.push_str("    },\n");
    }
    out.push_str("};\n");
    out
}

impl<'a> Codegen<'a> {
    pub(crate) fn server_decl(&mut self, decl: &ServerDecl, prefix: &str) -> String {
        let mut out = String::new();
        match decl {
            ServerDecl::Fn(decl) => {
                out.push_str(&self.function(decl));
                out.push_str(&self.rpc_route(decl));
            }
            ServerDecl::Route(route) => {
                let path = format!("{}{}", prefix, route.path);
                self.line(
                    &mut out,
                    &format!(
                        "__addRoute({}, {}, async (req) => {{",
                        js_string(&route.method),
                        js_string(&path)
                    ),
                );
                self.push_scope();
                self.declare("req", VarInfo::default());
                if !route.params.is_empty() {
                    let names: Vec<&str> =
                        route.params.iter().map(|p| p.name.as_str()).collect();
                    self.indent += 1;
                    self.line(
                        &mut out,
                        &format!("const {{ {} }} = req.params;", names.join(", ")),
                    );
                    self.indent -= 1;
                    for param in &route.params {
                        self.declare(&param.name, VarInfo::default());
                    }
                }
                out.push_str(&self.block_body(&route.body, true));
                self.pop_scope();
                self.line(&mut out, "});");
            }
            ServerDecl::RouteGroup {
                prefix: group_prefix,
                body,
                ..
            } => {
                let nested = format!("{}{}", prefix, group_prefix);
                for decl in body {
                    out.push_str(&self.server_decl(decl, &nested));
                }
            }
            ServerDecl::Middleware { params, body, .. } => {
                let params_js = if params.is_empty() {
                    "req, next".to_string()
                } else {
                    self.params(params)
                };
                self.line(
                    &mut out,
                    &format!("__addMiddleware(async ({}) => {{", params_js),
                );
                self.push_scope();
                self.declare("req", VarInfo::default());
                self.declare("next", VarInfo::default());
                for param in params {
                    self.declare(&param.name, VarInfo::default());
                }
                out.push_str(&self.block_body(body, true));
                self.pop_scope();
                self.line(&mut out, "});");
            }
            ServerDecl::Ws { path, handlers, .. } => {
                self.line(
                    &mut out,
                    &format!("__addWebSocket({}, {{", js_string(path)),
                );
                self.indent += 1;
                for handler in handlers {
                    // on_open -> open, on_message -> message, ...
                    let event = handler.event.trim_start_matches("on_");
                    let params_js = if handler.params.is_empty() {
                        "socket".to_string()
                    } else {
                        self.params(&handler.params)
                    };
                    self.line(
                        &mut out,
                        &format!("{}: async ({}) => {{", event, params_js),
                    );
                    self.push_scope();
                    self.declare("socket", VarInfo::default());
                    for param in &handler.params {
                        self.declare(&param.name, VarInfo::default());
                    }
                    out.push_str(&self.block_body(&handler.body, false));
                    self.pop_scope();
                    self.line(&mut out, "},");
                }
                self.indent -= 1;
                self.line(&mut out, "});");
            }
            ServerDecl::Sse {
                path, params, body, ..
            } => {
                let params_js = if params.is_empty() {
                    "req, send".to_string()
                } else {
                    self.params(params)
                };
                self.line(
                    &mut out,
                    &format!(
                        "__addSSE({}, async ({}) => {{",
                        js_string(path),
                        params_js
                    ),
                );
                self.push_scope();
                self.declare("req", VarInfo::default());
                self.declare("send", VarInfo::default());
                for param in params {
                    self.declare(&param.name, VarInfo::default());
                }
                out.push_str(&self.block_body(body, false));
                self.pop_scope();
                self.line(&mut out, "});");
            }
            ServerDecl::Schedule { spec, body, .. } => {
                self.line(
                    &mut out,
                    &format!("__addSchedule({}, async () => {{", js_string(spec)),
                );
                out.push_str(&self.block_body(body, false));
                self.line(&mut out, "});");
            }
            ServerDecl::Background { name, body, .. } => {
                self.line(
                    &mut out,
                    &format!("__addBackground({}, async () => {{", js_string(name)),
                );
                out.push_str(&self.block_body(body, false));
                self.line(&mut out, "});");
            }
            ServerDecl::OnStart { body, .. } => {
                self.line(&mut out, "__addHook(\"start\", async () => {");
                out.push_str(&self.block_body(body, false));
                self.line(&mut out, "});");
            }
            ServerDecl::OnStop { body, .. } => {
                self.line(&mut out, "__addHook(\"stop\", async () => {");
                out.push_str(&self.block_body(body, false));
                self.line(&mut out, "});");
            }
            ServerDecl::OnError { params, body, .. } => {
                let params_js = if params.is_empty() {
                    "err, req".to_string()
                } else {
                    self.params(params)
                };
                self.line(
                    &mut out,
                    &format!("__addHook(\"error\", async ({}) => {{", params_js),
                );
                self.push_scope();
                self.declare("err", VarInfo::default());
                self.declare("req", VarInfo::default());
                for param in params {
                    self.declare(&param.name, VarInfo::default());
                }
                out.push_str(&self.block_body(body, false));
                self.pop_scope();
                self.line(&mut out, "});");
            }
            ServerDecl::Subscribe {
                topic, params, body, ..
            } => {
                let params_js = if params.is_empty() {
                    "message".to_string()
                } else {
                    self.params(params)
                };
                self.line(
                    &mut out,
                    &format!(
                        "__addSubscription({}, async ({}) => {{",
                        js_string(topic),
                        params_js
                    ),
                );
                self.push_scope();
                self.declare("message", VarInfo::default());
                for param in params {
                    self.declare(&param.name, VarInfo::default());
                }
                out.push_str(&self.block_body(body, false));
                self.pop_scope();
                self.line(&mut out, "});");
            }
            ServerDecl::Model { name, fields, .. } => {
                let field_names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
                self.line(
                    &mut out,
                    &format!("function {}({}) {{", name, field_names.join(", ")),
                );
                self.indent += 1;
                self.line(
                    &mut out,
                    &format!("return {{ {} }};", field_names.join(", ")),
                );
                self.indent -= 1;
                self.line(&mut out, "}");
                let quoted: Vec<String> =
                    field_names.iter().map(|f| js_string(f)).collect();
                self.line(
                    &mut out,
                    &format!(
                        "__defineModel({}, [{}]);",
                        js_string(name),
                        quoted.join(", ")
                    ),
                );
                self.declare(name, VarInfo::default());
            }
            ServerDecl::Env { entries, .. } => {
                for entry in entries {
                    let line = match &entry.default {
                        Some(default) => {
                            let default_js = self.expr(default);
                            format!(
                                "const {} = process.env.{} ?? {};",
                                entry.name, entry.name, default_js
                            )
                        }
                        None => format!(
                            "const {} = process.env.{};",
                            entry.name, entry.name
                        ),
                    };
                    self.line(&mut out, &line);
                    self.declare(&entry.name, VarInfo::default());
                }
            }
            ServerDecl::Config(config) => {
                let value = self.config_value(config.kind, &config.args, &config.entries);
                self.line(
                    &mut out,
                    &format!("__config.{} = {};", config.kind.keyword(), value),
                );
            }
            ServerDecl::Stmt(stmt) => out.push_str(&self.stmt(stmt)),
        }
        out
    }

    fn config_value(
        &mut self,
        kind: ConfigKind,
        args: &[Expr],
        entries: &[(String, Expr)],
    ) -> String {
        if !entries.is_empty() || (kind == ConfigKind::Db && !args.is_empty()) {
            let mut parts = Vec::new();
            if let Some(Expr::Ident { name, .. }) = args.first() {
                parts.push(format!("engine: {}", js_string(name)));
            }
            for (key, value) in entries {
                let value_js = self.expr(value);
                parts.push(format!("{}: {}", super::js_key(key), value_js));
            }
            return format!("{{ {} }}", parts.join(", "));
        }
        match args.len() {
            0 => "true".to_string(),
            1 => self.expr(&args[0]),
            _ => {
                let parts: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }

    /// The `POST /rpc/<name>` endpoint generated for every server function.
    /// Positional calls arrive as `{"__args": [...]}`, named calls as direct
    /// body properties.
    fn rpc_route(&mut self, decl: &FnDecl) -> String {
        let mut out = String::new();
        self.line(
            &mut out,
            &format!(
                "__addRoute(\"POST\", \"/rpc/{}\", async (req) => {{",
                decl.name
            ),
        );
        self.indent += 1;
        self.line(&mut out, "const __body = await req.json().catch(() => ({}));");
        let named: Vec<String> = decl
            .params
            .iter()
            .map(|p| format!("__body.{}", p.name))
            .collect();
        self.line(
            &mut out,
            &format!(
                "const __args = Array.isArray(__body.__args) ? __body.__args : [{}];",
                named.join(", ")
            ),
        );
        self.line(
            &mut out,
            &format!("return {{ result: await {}(...__args) }};", decl.name),
        );
        self.indent -= 1;
        self.line(&mut out, "});");
        out
    }
}
