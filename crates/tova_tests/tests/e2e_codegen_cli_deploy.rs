//! E2E Codegen: CLI driver and deploy configuration streams.

mod common;

use common::{assert_contains, output};

#[test]
fn cli_block_produces_auto_invoked_driver() {
    let source = "cli {\n    name: \"todo\"\n    version: \"1.0.0\"\n    description: \"a todo manager\"\n    fn add(title) {\n        print(title)\n    }\n}\n";
    let result = output(source);
    assert!(result.is_cli);
    let js = result.cli.expect("cli stream");
    assert_contains(&js, "name: \"todo\"");
    assert_contains(&js, "version: \"1.0.0\"");
    assert_contains(&js, "function add(title) {");
    assert_contains(&js, "__register(\"add\"");
    assert_contains(&js, "__cli_main(process.argv.slice(2));");
}

#[test]
fn cli_params_classify_into_positionals_and_flags() {
    let source = "cli {\n    name: \"todo\"\n    fn add(title, done: Bool, tags: [String], limit: Int = 10) {\n        print(title)\n    }\n}\n";
    let js = output(source).cli.expect("cli stream");
    assert_contains(&js, "{ name: \"title\", kind: \"positional\", type: \"String\", required: true }");
    assert_contains(&js, "{ name: \"done\", kind: \"flag\", type: \"Bool\" }");
    assert_contains(&js, "{ name: \"tags\", kind: \"repeat\", type: \"String\" }");
    assert_contains(&js, "{ name: \"limit\", kind: \"flag\", type: \"Int\", default: 10 }");
}

#[test]
fn cli_driver_reports_argument_errors() {
    let source = "cli {\n    name: \"t\"\n    fn go(target) {\n        print(target)\n    }\n}\n";
    let js = output(source).cli.expect("cli stream");
    assert_contains(&js, "Missing required argument");
    assert_contains(&js, "Unknown flag");
    assert_contains(&js, "--no-");
    assert_contains(&js, "Unknown command");
}

#[test]
fn deploy_block_merges_with_defaults() {
    let source = "deploy \"production\" {\n    server: \"1.2.3.4\"\n    domain: \"example.com\"\n    instances: 2\n    db postgres {\n        size: \"small\"\n    }\n    env {\n        API_KEY: \"secret\"\n    }\n}\n";
    let deploy = output(source).deploy.expect("deploy value");
    let env = &deploy["production"];
    assert_eq!(env["server"], "1.2.3.4");
    assert_eq!(env["domain"], "example.com");
    assert_eq!(env["instances"], 2);
    assert_eq!(env["memory"], "512mb");
    assert_eq!(env["branch"], "main");
    assert_eq!(env["health"], "/healthz");
    assert_eq!(env["health_interval"], 30);
    assert_eq!(env["keep_releases"], 5);
    assert_eq!(env["restart_on_failure"], true);
    assert_eq!(env["databases"][0]["engine"], "postgres");
    assert_eq!(env["databases"][0]["config"]["size"], "small");
    assert_eq!(env["env"]["API_KEY"], "secret");
}

#[test]
fn later_deploy_blocks_override_earlier_settings() {
    let source = "deploy \"staging\" {\n    instances: 1\n}\ndeploy \"staging\" {\n    instances: 4\n}\n";
    let deploy = output(source).deploy.expect("deploy value");
    assert_eq!(deploy["staging"]["instances"], 4);
}

#[test]
fn deploy_does_not_touch_code_streams() {
    let source = "x = 1\nprint(x)\ndeploy \"production\" {\n    domain: \"example.com\"\n}\n";
    let result = output(source);
    assert_contains(&result.shared, "const x = 1;");
    assert!(result.server.is_none());
    assert!(result.client.is_none());
}
