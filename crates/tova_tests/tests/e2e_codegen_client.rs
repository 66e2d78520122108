//! E2E Codegen: client stream - signals, components, stores, JSX.

mod common;

use common::{assert_contains, client};

#[test]
fn reactive_counter_end_to_end() {
    let source = "client {\n    component Counter {\n        state count = 0\n        <button on:click={fn() count += 1}>\"+\"</button>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "function Counter() {");
    assert_contains(&js, "const [count, setCount] = createSignal(0);");
    assert_contains(&js, "onClick: () =>");
    assert_contains(&js, "setCount(__lux_p => __lux_p + 1);");
    assert_contains(&js, "lux_el(\"button\"");
}

#[test]
fn client_stream_imports_the_runtime() {
    let js = client("client {\n    state n = 0\n    effect {\n        print(n)\n    }\n}\n");
    assert_contains(&js, "import { createSignal, createEffect, createComputed");
    assert_contains(&js, "lux_inject_css");
    assert_contains(&js, "from \"tova/runtime\";");
}

#[test]
fn state_assignment_becomes_setter_call() {
    let js = client("client {\n    state n = 0\n    effect {\n        n = 5\n    }\n}\n");
    assert_contains(&js, "setN(5);");
}

#[test]
fn signal_reads_become_getter_calls() {
    let js = client("client {\n    state n = 0\n    effect {\n        print(n)\n    }\n}\n");
    assert_contains(&js, "print(n())");
}

#[test]
fn computed_wraps_expression() {
    let js = client("client {\n    state n = 1\n    computed doubled = n * 2\n    effect {\n        print(doubled)\n    }\n}\n");
    assert_contains(&js, "const doubled = createComputed(() => (n() * 2));");
    assert_contains(&js, "print(doubled())");
}

#[test]
fn effect_wraps_body() {
    let js = client("client {\n    effect {\n        print(1)\n    }\n}\n");
    assert_contains(&js, "createEffect(() => {");
    assert_contains(&js, "});");
}

#[test]
fn component_params_destructure() {
    let source = "client {\n    component Greeting(name, punct) {\n        <p>{name}</p>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "function Greeting({ name, punct }) {");
}

#[test]
fn multiple_jsx_roots_become_a_fragment() {
    let source = "client {\n    component Two {\n        <p>\"a\"</p>\n        <p>\"b\"</p>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "return lux_fragment([");
}

#[test]
fn store_exposes_getters_setters_and_actions() {
    let source = "client {\n    store Counter {\n        state value = 0\n        fn increment() {\n            value += 1\n        }\n    }\n    component App {\n        <p>{Counter.value}</p>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "const Counter = (() => {");
    assert_contains(&js, "get value() { return value(); },");
    assert_contains(&js, "set value(v) { setValue(v); },");
    assert_contains(&js, "increment,");
    assert_contains(&js, "})();");
    // Store member reads in JSX are reactive.
    assert_contains(&js, "() => Counter.value");
}

#[test]
fn jsx_event_and_class_directives() {
    let source = "client {\n    component Row {\n        state selected = false\n        <div class=\"item\" class:active={selected} on:click={fn() selected = true}>\"x\"</div>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "onClick: () =>");
    assert_contains(
        &js,
        "className: () => [\"item\", (selected()) && \"active\"].filter(Boolean).join(\" \")",
    );
}

#[test]
fn bind_value_on_input_uses_on_input() {
    let source = "client {\n    component Form {\n        state name = \"\"\n        <input bind:value={name}/>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "value: () => name()");
    assert_contains(&js, "onInput: (e) => setName(e.target.value)");
}

#[test]
fn bind_value_on_select_uses_on_change() {
    let source = "client {\n    component Pick {\n        state choice = \"\"\n        <select bind:value={choice}></select>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "onChange: (e) => setChoice(e.target.value)");
}

#[test]
fn bind_checked_uses_target_checked() {
    let source = "client {\n    component Toggle {\n        state on = false\n        <input type=\"checkbox\" bind:checked={on}/>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "checked: () => on()");
    assert_contains(&js, "onChange: (e) => setOn(e.target.checked)");
}

#[test]
fn bind_group_radio_compares_value() {
    let source = "client {\n    component Pick {\n        state mode = \"a\"\n        <input type=\"radio\" value=\"a\" bind:group={mode}/>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "checked: () => mode() === \"a\"");
    assert_contains(&js, "onChange: () => setMode(\"a\")");
}

#[test]
fn bind_group_checkbox_toggles_membership() {
    let source = "client {\n    component Pick {\n        state tags = []\n        <input type=\"checkbox\" value=\"x\" bind:group={tags}/>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "checked: () => tags().includes(\"x\")");
    assert_contains(&js, "setTags(__lux_p => __lux_p.includes(\"x\") ? __lux_p.filter((x) => x !== \"x\") : [...__lux_p, \"x\"])");
}

#[test]
fn jsx_conditional_lowers_to_reactive_ternary() {
    let source = "client {\n    component Gate {\n        state show = true\n        <div>\n            {if show {\n                <p>\"yes\"</p>\n            } else {\n                <p>\"no\"</p>\n            }}\n        </div>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "() => (show()) ?");
}

#[test]
fn jsx_loop_lowers_to_map_with_keying() {
    let source = "client {\n    component List {\n        state items = []\n        <ul>\n            {for item in items {\n                <li key={item.id}>{item.name}</li>\n            }}\n        </ul>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "() => (items()).map((item) =>");
    assert_contains(&js, "lux_keyed(item.id, lux_el(\"li\"");
}

#[test]
fn scoped_styles_inject_and_tag_host_elements() {
    let source = "client {\n    component Card {\n        style {\n            .card { color: red; }\n        }\n        <div class=\"card\">\"hi\"</div>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "lux_inject_css(");
    assert_contains(&js, "[data-lux-");
    assert_contains(&js, "\"data-lux-");
}

#[test]
fn style_hash_depends_on_content_not_name() {
    let a = client("client {\n    component A {\n        style {\n            p { color: red; }\n        }\n        <p>\"x\"</p>\n    }\n}\n");
    let b = client("client {\n    component B {\n        style {\n            p { color: red; }\n        }\n        <p>\"x\"</p>\n}\n}\n");
    let hash_of = |js: &str| {
        let idx = js.find("lux_inject_css(\"").expect("no inject") + "lux_inject_css(\"".len();
        js[idx..idx + 6].to_string()
    };
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn inner_html_is_blocked() {
    let source = "client {\n    component Raw {\n        <div innerHTML=\"<b>x</b>\"></div>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "console.error(\"innerHTML is blocked");
}

#[test]
fn slot_children_become_named_props() {
    let source = "client {\n    component Page {\n        <Layout>\n            <h1 slot=\"header\">\"title\"</h1>\n            <p>\"body\"</p>\n        </Layout>\n    }\n    component Layout(header, children) {\n        <div>{header}</div>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "header: [lux_el(\"h1\"");
    assert_contains(&js, "children: [lux_el(\"p\"");
}

#[test]
fn component_invocation_passes_props_object() {
    let source = "client {\n    component App {\n        <Badge label=\"new\"/>\n    }\n    component Badge(label) {\n        <span>{label}</span>\n    }\n}\n";
    let js = client(source);
    assert_contains(&js, "Badge({ label: \"new\" })");
}
