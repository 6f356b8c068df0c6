use graphmirror::queries::{field, field_with, inline_fragment, selection_set, Value};

#[test]
fn leaf_field_renders_bare_name() {
    assert_eq!(field("name").to_string(), "name");
}

#[test]
fn field_with_arguments_renders_in_order() {
    let selection = field_with(
        "issues",
        vec![
            ("first".to_string(), Value::Int(10)),
            ("after".to_string(), Value::String("c1".to_string())),
        ],
        vec![field("totalCount")],
    );
    assert_eq!(
        selection.to_string(),
        "issues(first: 10, after: \"c1\") { totalCount }"
    );
}

#[test]
fn null_and_enum_values_render_unquoted() {
    let selection = field_with(
        "things",
        vec![
            ("after".to_string(), Value::Null),
            ("orderBy".to_string(), Value::Enum("CREATED_AT".to_string())),
        ],
        Vec::new(),
    );
    assert_eq!(selection.to_string(), "things(after: null, orderBy: CREATED_AT)");
}

#[test]
fn inline_fragment_renders_type_condition() {
    let selection = inline_fragment("Issue", vec![field("id")]);
    assert_eq!(selection.to_string(), "... on Issue { id }");
}

#[test]
fn selection_set_braces_and_spaces_members() {
    let selections = vec![field("__typename"), field("id")];
    assert_eq!(selection_set(&selections), "{ __typename id }");
}

#[test]
fn nested_selections_render_recursively() {
    let selection = field_with(
        "pageInfo",
        Vec::new(),
        vec![field("endCursor"), field("hasNextPage")],
    );
    assert_eq!(selection.to_string(), "pageInfo { endCursor hasNextPage }");
}

#[test]
fn string_values_are_escaped() {
    let selection = field_with(
        "search",
        vec![(
            "query".to_string(),
            Value::String("say \"hi\" \\ bye\n".to_string()),
        )],
        Vec::new(),
    );
    assert_eq!(
        selection.to_string(),
        "search(query: \"say \\\"hi\\\" \\\\ bye\\n\")"
    );
}
