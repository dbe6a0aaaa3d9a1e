use proptest::prelude::*;
use regex::Regex;
use serde_json::{json, Map, Value};

use screentest_codegen::render::{is_truthy, render, stringify, validate_syntax, RenderContext};

/// Reference resolver for conditionals only: rewrite innermost blocks (bodies
/// free of further block tags) until nothing changes, then substitute names.
fn fixpoint_reference(template: &str, bindings: &Map<String, Value>) -> String {
    let innermost =
        Regex::new(r"\{\{#(if|unless) ([A-Za-z_][A-Za-z0-9_]*)\}\}((?:[^{]|\{[^{]|\{\{[^#/])*?)\{\{/(if|unless)\}\}")
            .unwrap();
    let variable = Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").unwrap();

    let mut current = template.to_string();
    loop {
        let next = innermost
            .replace(&current, |caps: &regex::Captures| {
                let truthy = is_truthy(bindings.get(&caps[2]));
                let keep = if &caps[1] == "if" { truthy } else { !truthy };
                if keep {
                    caps[3].to_string()
                } else {
                    String::new()
                }
            })
            .into_owned();
        if next == current {
            break;
        }
        current = next;
    }

    variable
        .replace_all(&current, |caps: &regex::Captures| {
            bindings.get(&caps[1]).map(stringify).unwrap_or_default()
        })
        .into_owned()
}

const NESTED_FIXTURES: &[&str] = &[
    "{{#if a}}A{{#if b}}B{{/if}}C{{/if}}",
    "{{#if a}}{{#if a}}twice{{/if}}{{/if}}",
    "{{#if a}}1{{#unless b}}2{{#if c}}3{{/if}}4{{/unless}}5{{/if}}",
    "{{#unless a}}x{{#unless b}}y{{/unless}}z{{/unless}}",
    "{{#if a}}[{{name}}]{{/if}}{{#if b}}{{#if c}}<{{name}}>{{/if}}{{/if}}",
    "pre {{#if a}}{{#if b}}{{#if c}}deep{{/if}}{{/if}}{{/if}} post",
];

fn bindings(a: bool, b: bool, c: bool) -> Map<String, Value> {
    let value = json!({"a": a, "b": b, "c": c, "name": "n"});
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn nested_conditionals_agree_with_fixpoint_reference() {
    for fixture in NESTED_FIXTURES {
        validate_syntax(fixture).unwrap();
        for mask in 0..8u8 {
            let map = bindings(mask & 1 != 0, mask & 2 != 0, mask & 4 != 0);
            let context = RenderContext::from(map.clone());
            assert_eq!(
                render(fixture, &context).unwrap(),
                fixpoint_reference(fixture, &map),
                "fixture {:?} with a={} b={} c={}",
                fixture,
                mask & 1 != 0,
                mask & 2 != 0,
                mask & 4 != 0
            );
        }
    }
}

#[test]
fn falsy_outer_block_drops_nested_content() {
    let context = RenderContext::from(bindings(false, true, true));
    assert_eq!(
        render("{{#if a}}A{{#if b}}B{{/if}}C{{/if}}", &context).unwrap(),
        ""
    );
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z {}#/]{0,12}".prop_map(Value::String),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..3)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn template() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        "[a-z ,]{0,6}",
        Just("{{a}}".to_string()),
        Just("{{b}}".to_string()),
        Just("{{#each a}}[{{this}}|{{b}}]{{/each}}".to_string()),
        Just("{{#if a}}yes{{/if}}".to_string()),
        Just("{{#unless b}}no{{/unless}}".to_string()),
        Just("{{upper c}}".to_string()),
        Just("{{kebabCase c}}".to_string()),
        Just("{{#if a}}{{#unless b}}{{c}}{{/unless}}{{/if}}".to_string()),
    ];
    prop::collection::vec(piece, 0..8).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn render_is_deterministic(template in template(), a in value(), b in value(), c in value()) {
        let context = RenderContext::new().with("a", a).with("b", b).with("c", c);
        let first = render(&template, &context).unwrap();
        let second = render(&template, &context).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn text_without_tags_renders_unchanged(text in "[^{}]{0,64}") {
        prop_assert_eq!(render(&text, &RenderContext::new()).unwrap(), text);
    }
}
