use std::time::{Duration, SystemTime, UNIX_EPOCH};

use graphmirror::{
    ConnectionPage, EndCursor, FieldType, Mirror, NodeStub, PageInfo, Schema, TypeDef,
};

fn repo_schema() -> Schema {
    Schema::new()
        .with_type(
            "Repo",
            TypeDef::object([
                ("id", FieldType::Id),
                ("name", FieldType::Primitive),
                ("issues", FieldType::connection("Issue")),
            ]),
        )
        .with_type(
            "Issue",
            TypeDef::object([("id", FieldType::Id), ("title", FieldType::Primitive)]),
        )
}

fn object_ids(plan: &graphmirror::QueryPlan) -> Vec<&str> {
    plan.objects.iter().map(|o| o.id.as_str()).collect()
}

#[test]
fn fresh_object_and_connection_are_outdated() {
    let mirror = Mirror::open_in_memory(&repo_schema()).expect("open");
    mirror.register_object("Repo", "r1").expect("register");
    let plan = mirror.find_outdated(UNIX_EPOCH).expect("plan");
    assert_eq!(object_ids(&plan), vec!["r1"]);
    assert_eq!(plan.connections.len(), 1);
    let connection = &plan.connections[0];
    assert_eq!(connection.object_id, "r1");
    assert_eq!(connection.fieldname, "issues");
    assert_eq!(connection.end_cursor, EndCursor::Unfetched);
}

#[test]
fn everything_older_than_threshold_is_planned() {
    let mirror = Mirror::open_in_memory(&repo_schema()).expect("open");
    mirror.register_object("Repo", "r1").expect("register");
    let update = mirror.create_update(SystemTime::now()).expect("update");
    mirror
        .update_connection(
            update,
            "r1",
            "issues",
            &ConnectionPage {
                total_count: 5,
                page_info: PageInfo {
                    has_next_page: true,
                    end_cursor: Some("c1".to_string()),
                },
                nodes: vec![
                    Some(NodeStub::new("Issue", "i1")),
                    None,
                    Some(NodeStub::new("Issue", "i2")),
                ],
            },
        )
        .expect("ingest");

    let since = SystemTime::now() + Duration::from_secs(1);
    let plan = mirror.find_outdated(since).expect("plan");
    assert_eq!(object_ids(&plan), vec!["r1", "i1", "i2"]);
    assert_eq!(plan.connections.len(), 1);
    assert_eq!(
        plan.connections[0].end_cursor,
        EndCursor::Fetched(Some("c1".to_string()))
    );
}

#[test]
fn fresh_connection_without_next_page_is_not_planned() {
    let mirror = Mirror::open_in_memory(&repo_schema()).expect("open");
    mirror.register_object("Repo", "r1").expect("register");
    let update = mirror.create_update(SystemTime::now()).expect("update");
    mirror
        .update_connection(
            update,
            "r1",
            "issues",
            &ConnectionPage {
                total_count: 0,
                page_info: PageInfo {
                    has_next_page: false,
                    end_cursor: None,
                },
                nodes: vec![],
            },
        )
        .expect("ingest");

    let plan = mirror.find_outdated(UNIX_EPOCH).expect("plan");
    assert!(plan.connections.is_empty());
    // The object itself stays stale: nothing in this core writes own data.
    assert_eq!(object_ids(&plan), vec!["r1"]);
}

#[test]
fn incomplete_pagination_keeps_connection_planned_even_when_fresh() {
    let mirror = Mirror::open_in_memory(&repo_schema()).expect("open");
    mirror.register_object("Repo", "r1").expect("register");
    let update = mirror.create_update(SystemTime::now()).expect("update");
    mirror
        .update_connection(
            update,
            "r1",
            "issues",
            &ConnectionPage {
                total_count: 9,
                page_info: PageInfo {
                    has_next_page: true,
                    end_cursor: Some("c3".to_string()),
                },
                nodes: vec![],
            },
        )
        .expect("ingest");

    let plan = mirror.find_outdated(UNIX_EPOCH).expect("plan");
    assert_eq!(plan.connections.len(), 1);
    assert_eq!(
        plan.connections[0].end_cursor,
        EndCursor::Fetched(Some("c3".to_string()))
    );
}

#[test]
fn fetched_null_cursor_is_distinguished_from_unfetched() {
    let mirror = Mirror::open_in_memory(&repo_schema()).expect("open");
    mirror.register_object("Repo", "r1").expect("register");
    let update = mirror.create_update(SystemTime::now()).expect("update");
    mirror
        .update_connection(
            update,
            "r1",
            "issues",
            &ConnectionPage {
                total_count: 2,
                page_info: PageInfo {
                    has_next_page: true,
                    end_cursor: None,
                },
                nodes: vec![],
            },
        )
        .expect("ingest");

    let plan = mirror.find_outdated(UNIX_EPOCH).expect("plan");
    assert_eq!(plan.connections.len(), 1);
    assert_eq!(plan.connections[0].end_cursor, EndCursor::Fetched(None));
}

#[test]
fn stale_update_time_is_strictly_less_than_threshold() {
    let mirror = Mirror::open_in_memory(&repo_schema()).expect("open");
    mirror.register_object("Repo", "r1").expect("register");
    let instant = UNIX_EPOCH + Duration::from_millis(5_000);
    let update = mirror.create_update(instant).expect("update");
    mirror
        .update_connection(
            update,
            "r1",
            "issues",
            &ConnectionPage {
                total_count: 0,
                page_info: PageInfo {
                    has_next_page: false,
                    end_cursor: None,
                },
                nodes: vec![],
            },
        )
        .expect("ingest");

    // Exactly-equal threshold is not stale.
    let plan = mirror.find_outdated(instant).expect("plan");
    assert!(plan.connections.is_empty());
    // One millisecond later it is.
    let plan = mirror
        .find_outdated(instant + Duration::from_millis(1))
        .expect("plan");
    assert_eq!(plan.connections.len(), 1);
}
