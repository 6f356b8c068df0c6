use graphmirror::{FieldType, MirrorError, Schema, SchemaIndex, TypeDef};
use graphmirror::schema::TypeIndex;

fn tracker_schema() -> Schema {
    Schema::new()
        .with_type(
            "Repo",
            TypeDef::object([
                ("id", FieldType::Id),
                ("name", FieldType::Primitive),
                ("description", FieldType::Primitive),
                ("owner", FieldType::node("User")),
                ("issues", FieldType::connection("Issue")),
                ("pulls", FieldType::connection("Issue")),
            ]),
        )
        .with_type(
            "Issue",
            TypeDef::object([
                ("id", FieldType::Id),
                ("title", FieldType::Primitive),
                ("author", FieldType::node("Actor")),
            ]),
        )
        .with_type(
            "User",
            TypeDef::object([("id", FieldType::Id), ("login", FieldType::Primitive)]),
        )
        .with_type(
            "Bot",
            TypeDef::object([("id", FieldType::Id), ("login", FieldType::Primitive)]),
        )
        .with_type("Actor", TypeDef::union(["User", "Bot"]))
}

#[test]
fn decomposes_object_fields_into_disjoint_sequences() {
    let index = SchemaIndex::build(&tracker_schema()).expect("index");
    let repo = index.object("Repo").expect("Repo");
    assert_eq!(repo.primitive_fields, vec!["description", "name"]);
    assert_eq!(repo.link_fields, vec!["owner"]);
    assert_eq!(repo.connection_fields, vec!["issues", "pulls"]);
    // The ID field stays in the field map but in none of the sequences.
    assert!(repo.fields.contains_key("id"));
}

#[test]
fn decomposes_union_clauses_in_sorted_order() {
    let index = SchemaIndex::build(&tracker_schema()).expect("index");
    match index.types.get("Actor") {
        Some(TypeIndex::Union(union)) => assert_eq!(union.clauses, vec!["Bot", "User"]),
        other => panic!("expected union index, got {other:?}"),
    }
}

#[test]
fn object_lookup_distinguishes_unknown_and_union() {
    let index = SchemaIndex::build(&tracker_schema()).expect("index");
    assert!(matches!(
        index.object("Ghost").expect_err("unknown"),
        MirrorError::UnknownType(_)
    ));
    assert!(matches!(
        index.object("Actor").expect_err("union"),
        MirrorError::NonObjectType(_)
    ));
}

#[test]
fn rejects_object_without_id_field() {
    let schema = Schema::new().with_type("Tag", TypeDef::object([("name", FieldType::Primitive)]));
    let err = SchemaIndex::build(&schema).expect_err("no id");
    assert!(matches!(err, MirrorError::SchemaError(_)));
}

#[test]
fn rejects_field_referencing_unknown_type() {
    let schema = Schema::new().with_type(
        "Repo",
        TypeDef::object([("id", FieldType::Id), ("issues", FieldType::connection("Ghost"))]),
    );
    let err = SchemaIndex::build(&schema).expect_err("unknown element");
    assert!(matches!(err, MirrorError::SchemaError(_)));
}

#[test]
fn rejects_union_with_unknown_clause() {
    let schema = Schema::new().with_type("Actor", TypeDef::union(["Ghost"]));
    let err = SchemaIndex::build(&schema).expect_err("unknown clause");
    assert!(matches!(err, MirrorError::SchemaError(_)));
}

#[test]
fn rejects_union_clause_that_is_a_union() {
    let schema = Schema::new()
        .with_type("User", TypeDef::object([("id", FieldType::Id)]))
        .with_type("Actor", TypeDef::union(["User"]))
        .with_type("Anyone", TypeDef::union(["Actor"]));
    let err = SchemaIndex::build(&schema).expect_err("union clause");
    assert!(matches!(err, MirrorError::SchemaError(_)));
}

#[test]
fn node_fields_may_reference_union_types() {
    let index = SchemaIndex::build(&tracker_schema()).expect("index");
    let issue = index.object("Issue").expect("Issue");
    assert_eq!(issue.link_fields, vec!["author"]);
}
