use infodocs_template::{Node, TemplateError, parse, render};
use serde_json::json;

fn rendered(source: &str, context: serde_json::Value) -> String {
    render(source, &context).expect("template renders")
}

#[test]
fn conditional_picks_branch_by_truthiness() {
    let source = "{{#if x}}A{{else}}B{{/if}}";
    assert_eq!(rendered(source, json!({ "x": true })), "A");
    assert_eq!(rendered(source, json!({})), "B");
    assert_eq!(rendered(source, json!({ "x": 0 })), "B");
    assert_eq!(rendered(source, json!({ "x": "0" })), "A");
    assert_eq!(rendered("{{#if x}}A{{/if}}", json!({ "x": [] })), "");
}

#[test]
fn conditional_follows_dotted_paths() {
    let source = "{{#if spa.logo}}<img src=\"{{spa.logo}}\">{{/if}}";
    assert_eq!(
        rendered(source, json!({ "spa": { "logo": "/media/logo.png" } })),
        "<img src=\"/media/logo.png\">"
    );
    assert_eq!(rendered(source, json!({ "spa": null })), "");
}

#[test]
fn loop_over_mappings_uses_item_scope() {
    let source = "{{#each items}}[{{n}}]{{/each}}";
    let context = json!({ "items": [{ "n": 1 }, { "n": 2 }, { "n": 3 }], "n": 9 });
    assert_eq!(rendered(source, context), "[1][2][3]");
}

#[test]
fn loop_over_scalars_exposes_this() {
    let source = "<ul>{{#each names}}<li>{{this}}</li>{{/each}}</ul>";
    assert_eq!(
        rendered(source, json!({ "names": ["a", "b"] })),
        "<ul><li>a</li><li>b</li></ul>"
    );
}

#[test]
fn loop_over_non_sequence_emits_nothing() {
    let source = "x{{#each items}}[{{n}}]{{/each}}y";
    assert_eq!(rendered(source, json!({ "items": "nope" })), "xy");
    assert_eq!(rendered(source, json!({ "items": [] })), "xy");
    assert_eq!(rendered(source, json!({})), "xy");
}

#[test]
fn blocks_nest() {
    let source = "{{#each rows}}{{#if paid}}+{{else}}-{{/if}}{{name}};{{/each}}";
    let context = json!({
        "rows": [
            { "name": "a", "paid": true },
            { "name": "b", "paid": false },
        ]
    });
    assert_eq!(rendered(source, context), "+a;-b;");

    let source = "{{#if show}}{{#each xs}}{{this}}{{/each}}{{/if}}";
    assert_eq!(rendered(source, json!({ "show": 1, "xs": [1, 2] })), "12");
}

#[test]
fn unresolved_tokens_never_leak() {
    assert_eq!(rendered("{{missing}}", json!({})), "");
    assert_eq!(rendered("a{{ spa.nothing.here }}b", json!({ "spa": {} })), "ab");
    assert_eq!(rendered("a{{}}b{{#unless x}}c", json!({})), "abc");
}

#[test]
fn unbalanced_tags_are_dropped_and_text_kept() {
    assert_eq!(rendered("a{{/if}}b{{else}}c{{/each}}", json!({})), "abc");
    assert_eq!(rendered("{{#if x}}A{{else}}B", json!({ "x": true })), "AB");
    assert_eq!(rendered("{{#each xs}}[{{n}}]", json!({ "xs": [1] })), "[]");
    assert_eq!(
        rendered("{{#if x}}{{#each xs}}X{{/if}}", json!({ "x": true, "xs": [1, 2] })),
        "X"
    );
}

#[test]
fn values_stringify_predictably() {
    let context = json!({
        "s": "<b>bold</b>",
        "n": 1500,
        "f": 12.5,
        "t": true,
        "z": null,
        "list": [1, "a"],
    });
    assert_eq!(
        rendered("{{s}}|{{n}}|{{f}}|{{t}}|{{z}}|{{list}}", context),
        "<b>bold</b>|1500|12.5|true||[1,\"a\"]"
    );
}

#[test]
fn tags_tolerate_inner_whitespace() {
    let source = "{{  #if   flag }}{{ name }}{{ / if }}";
    // `/ if` is not a closer, so the block stays open and is flattened.
    assert_eq!(rendered(source, json!({ "flag": true, "name": "n" })), "n");
    assert_eq!(
        rendered("{{#if   flag }}{{ name }}{{/if}}", json!({ "flag": true, "name": "n" })),
        "n"
    );
}

#[test]
fn unterminated_braces_stay_literal() {
    assert_eq!(rendered("price {{ 10", json!({})), "price {{ 10");
    assert_eq!(rendered("{{ a {{name}}", json!({ "name": "x" })), "{{ a x");
}

#[test]
fn empty_template_is_an_error() {
    assert!(matches!(render("", &json!({})), Err(TemplateError::Empty)));
    assert!(matches!(render("  \n ", &json!({})), Err(TemplateError::Empty)));
}

#[test]
fn parse_produces_a_tree() {
    let nodes = parse("Hi {{#if a}}{{b}}{{/if}}").expect("parses");
    assert_eq!(
        nodes,
        vec![
            Node::Text("Hi ".into()),
            Node::If {
                path: "a".into(),
                then: vec![Node::Var("b".into())],
                otherwise: vec![],
            },
        ]
    );
}

#[test]
fn rendering_is_deterministic() {
    let source = "{{#each items}}{{name}}={{qty}} {{/each}}{{total}}";
    let context = json!({ "items": [{ "name": "a", "qty": 2 }], "total": "2.00" });
    assert_eq!(rendered(source, context.clone()), rendered(source, context));
}

#[test]
fn this_never_prints_a_mapping() {
    let context = json!({ "spa_name": "Lotus", "mode": "final", "items": [{ "n": 1 }] });
    assert_eq!(rendered("[{{this}}]", context.clone()), "[]");
    assert_eq!(rendered("{{#each items}}[{{this}}]{{/each}}", context.clone()), "[]");
    assert_eq!(rendered("{{#each items}}[{{this.n}}]{{/each}}", context.clone()), "[1]");
    assert_eq!(rendered("{{this.spa_name}}", context), "Lotus");
}
