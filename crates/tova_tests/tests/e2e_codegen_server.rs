//! E2E Codegen: server stream - RPC, routes, scaffolding, peer proxies.

mod common;

use common::{assert_contains, output, server};

#[test]
fn server_functions_get_rpc_routes() {
    let js = server("server {\n    fn get_users() {\n        []\n    }\n}\n");
    assert_contains(&js, "function get_users() {");
    assert_contains(&js, "__addRoute(\"POST\", \"/rpc/get_users\", async (req) => {");
    assert!(!js.contains("Hono"), "no framework reference expected:\n{}", js);
}

#[test]
fn rpc_dispatch_supports_positional_and_named_bodies() {
    let js = server("server {\n    fn create(name, age) {\n        name\n    }\n}\n");
    assert_contains(&js, "Array.isArray(__body.__args) ? __body.__args : [__body.name, __body.age]");
    assert_contains(&js, "return { result: await create(...__args) };");
}

#[test]
fn scaffold_includes_cors_and_contains_helpers() {
    let js = server("server {\n    fn ping() {\n        1\n    }\n}\n");
    assert_contains(&js, "function __addRoute(method, path, handler) {");
    assert_contains(&js, "function __corsHeaders() {");
    assert_contains(&js, "Access-Control-Allow-Origin");
    assert_contains(&js, "function __contains(");
    assert_contains(&js, "__serve({");
}

#[test]
fn unnamed_server_uses_port_env() {
    let js = server("server {\n    fn ping() {\n        1\n    }\n}\n");
    assert_contains(&js, "const __port = Number(process.env.PORT ?? 3000);");
}

#[test]
fn explicit_routes_with_path_params() {
    let source = "server {\n    route GET \"/users/:id\" (id) {\n        id\n    }\n}\n";
    let js = server(source);
    assert_contains(&js, "__addRoute(\"GET\", \"/users/:id\", async (req) => {");
    assert_contains(&js, "const { id } = req.params;");
    assert_contains(&js, "return id;");
}

#[test]
fn route_groups_prefix_paths() {
    let source = "server {\n    routes \"/api\" {\n        route GET \"/users\" {\n            []\n        }\n    }\n}\n";
    let js = server(source);
    assert_contains(&js, "__addRoute(\"GET\", \"/api/users\", async (req) => {");
}

#[test]
fn middleware_registers_handler() {
    let source = "server {\n    middleware {\n        next(req)\n    }\n}\n";
    let js = server(source);
    assert_contains(&js, "__addMiddleware(async (req, next) => {");
}

#[test]
fn websocket_handlers_map_events() {
    let source = "server {\n    ws \"/chat\" {\n        on_open(socket) {\n            print(\"open\")\n        }\n        on_message(socket, msg) {\n            print(msg)\n        }\n    }\n}\n";
    let js = server(source);
    assert_contains(&js, "__addWebSocket(\"/chat\", {");
    assert_contains(&js, "open: async (socket) => {");
    assert_contains(&js, "message: async (socket, msg) => {");
    assert_contains(&js, "websockets: __websockets,");
}

#[test]
fn lifecycle_hooks_and_schedules() {
    let source = "server {\n    on_start {\n        print(\"up\")\n    }\n    schedule \"*/5 * * * *\" {\n        print(\"tick\")\n    }\n    background worker {\n        print(\"work\")\n    }\n}\n";
    let js = server(source);
    assert_contains(&js, "__addHook(\"start\", async () => {");
    assert_contains(&js, "__addSchedule(\"*/5 * * * *\", async () => {");
    assert_contains(&js, "__addBackground(\"worker\", async () => {");
}

#[test]
fn env_entries_read_process_env() {
    let source = "server {\n    env {\n        DATABASE_URL\n        PORT: 3000\n    }\n}\n";
    let js = server(source);
    assert_contains(&js, "const DATABASE_URL = process.env.DATABASE_URL;");
    assert_contains(&js, "const PORT = process.env.PORT ?? 3000;");
}

#[test]
fn config_declarations_fill_config_object() {
    let source = "server {\n    cors {\n        origins: [\"*\"]\n    }\n    max_body \"10mb\"\n    compression\n    db postgres {\n        url: \"pg://local\"\n    }\n}\n";
    let js = server(source);
    assert_contains(&js, "__config.cors = { origins: [\"*\"] };");
    assert_contains(&js, "__config.max_body = \"10mb\";");
    assert_contains(&js, "__config.compression = true;");
    assert_contains(&js, "__config.db = { engine: \"postgres\", url: \"pg://local\" };");
}

#[test]
fn models_define_constructor_and_registration() {
    let source = "server {\n    model User {\n        id: Int\n        email: String\n    }\n}\n";
    let js = server(source);
    assert_contains(&js, "function User(id, email) {");
    assert_contains(&js, "__defineModel(\"User\", [\"id\", \"email\"]);");
}

#[test]
fn named_servers_get_peer_proxies() {
    let source = "server \"api\" {\n    fn create(name) {\n        name\n    }\n}\nserver \"events\" {\n    fn push(kind) {\n        kind\n    }\n}\n";
    let result = output(source);
    assert!(result.multi_block);
    assert!(result.server.is_none());

    let api = result.servers.get("api").expect("api stream");
    assert_contains(api, "const events = {");
    assert_contains(api, "async push(...args)");
    assert_contains(api, "PORT_EVENTS");
    assert_contains(api, "JSON.stringify({ __args: args })");
    assert_contains(api, "const __port = Number(process.env.PORT_API ??");

    let events = result.servers.get("events").expect("events stream");
    assert_contains(events, "const api = {");
    assert_contains(events, "async create(...args)");
    assert_contains(events, "PORT_API");
}

#[test]
fn peer_proxies_return_the_result_field() {
    let source = "server \"api\" {\n    fn create(name) {\n        name\n    }\n}\nserver \"events\" {\n    fn push(kind) {\n        api.create(kind)\n    }\n}\n";
    let result = output(source);
    let events = result.servers.get("events").expect("events stream");
    assert_contains(events, "const __data = await __res.json();");
    assert_contains(events, "return __data.result;");
}

#[test]
fn sse_and_subscriptions_register() {
    let source = "server {\n    sse \"/feed\" {\n        send(1)\n    }\n    subscribe \"orders\" (msg) {\n        print(msg)\n    }\n}\n";
    let js = server(source);
    assert_contains(&js, "__addSSE(\"/feed\", async (req, send) => {");
    assert_contains(&js, "__addSubscription(\"orders\", async (msg) => {");
}
