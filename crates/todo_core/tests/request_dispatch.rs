use serde_json::json;
use todo_core::{
    dispatch, dispatch_json, DocumentBackend, MemoryKeyValueStore, Request, Response,
    StatusCategory, StoreConfig, TodoStore,
};

fn store() -> TodoStore<DocumentBackend<MemoryKeyValueStore>> {
    TodoStore::new(
        DocumentBackend::new(MemoryKeyValueStore::new()),
        StoreConfig::with_max_todo_items(2).unwrap(),
    )
}

fn body(response: &Response) -> serde_json::Value {
    serde_json::to_value(response).unwrap()
}

#[test]
fn full_lifecycle_over_requests() {
    let store = store();

    let created = dispatch(&store, Request::new("create").with_name("Work"));
    assert_eq!(created.status, StatusCategory::Created);
    assert_eq!(created.status.http_status(), 201);

    let added = dispatch(
        &store,
        Request::new("update")
            .with_name("Work")
            .with_todo(json!({"id": 1, "title": "write report"})),
    );
    assert_eq!(added.status, StatusCategory::Ok);
    assert!(body(&added.response)["message"]
        .as_str()
        .unwrap()
        .contains("added"));

    let read = dispatch(&store, Request::new("read"));
    assert_eq!(
        body(&read.response),
        json!({"todoList": [{"name": "Work", "todos": [{"id": 1, "title": "write report"}]}]})
    );

    let deleted = dispatch(&store, Request::new("delete").with_name("Work"));
    assert_eq!(deleted.status, StatusCategory::Ok);
    let read = dispatch(&store, Request::new("read"));
    assert_eq!(body(&read.response), json!({"todoList": []}));
}

#[test]
fn read_can_be_narrowed_by_name() {
    let store = store();
    dispatch(&store, Request::new("create").with_name("A"));
    dispatch(&store, Request::new("create").with_name("B"));

    let only_a = dispatch(&store, Request::new("read").with_name("A"));
    assert_eq!(body(&only_a.response), json!({"todoList": [{"name": "A", "todos": []}]}));

    let none = dispatch(&store, Request::new("read").with_name("Z"));
    assert_eq!(none.status, StatusCategory::Ok);
    assert_eq!(body(&none.response), json!({"todoList": []}));
}

#[test]
fn whitespace_name_is_a_real_list_not_a_read_all() {
    let store = store();
    dispatch(&store, Request::new("create").with_name("Work"));
    let created = dispatch(&store, Request::new("create").with_name(" "));
    assert_eq!(created.status, StatusCategory::Created);

    let only_blank = dispatch(&store, Request::new("read").with_name(" "));
    assert_eq!(
        body(&only_blank.response),
        json!({"todoList": [{"name": " ", "todos": []}]})
    );

    let everything = dispatch(&store, Request::new("read").with_name(""));
    assert_eq!(body(&everything.response)["todoList"].as_array().unwrap().len(), 2);
}

#[test]
fn missing_fields_are_bad_requests() {
    let store = store();

    for request in [
        Request::default(),
        Request::new("create"),
        Request::new("delete"),
        Request::new("update").with_name("Work"),
        Request::new("update").with_todo(json!({"id": 1})),
    ] {
        let reply = dispatch(&store, request.clone());
        assert_eq!(reply.status, StatusCategory::BadRequest, "{request:?}");
        assert!(!reply.response.is_success());
    }

    dispatch(&store, Request::new("create").with_name("Work"));
    for todo in [json!(null), json!({"title": "no id"}), json!("text"), json!({"id": false})] {
        let reply = dispatch(&store, Request::new("update").with_name("Work").with_todo(todo));
        assert_eq!(reply.status, StatusCategory::BadRequest);
    }
}

#[test]
fn error_kinds_map_to_status_categories() {
    let store = store();

    let unknown = dispatch(&store, Request::new("archive").with_name("Work"));
    assert_eq!(unknown.status, StatusCategory::BadRequest);
    assert!(body(&unknown.response)["error"]
        .as_str()
        .unwrap()
        .contains("archive"));

    let ghost = dispatch(
        &store,
        Request::new("update")
            .with_name("Ghost")
            .with_todo(json!({"id": 1})),
    );
    assert_eq!(ghost.status, StatusCategory::NotFound);

    dispatch(&store, Request::new("create").with_name("Work"));
    let duplicate = dispatch(&store, Request::new("create").with_name("Work"));
    assert_eq!(duplicate.status, StatusCategory::Conflict);

    for id in 0..2 {
        let reply = dispatch(
            &store,
            Request::new("update")
                .with_name("Work")
                .with_todo(json!({ "id": id })),
        );
        assert_eq!(reply.status, StatusCategory::Ok);
    }
    let full = dispatch(
        &store,
        Request::new("update")
            .with_name("Work")
            .with_todo(json!({"id": 99})),
    );
    assert_eq!(full.status, StatusCategory::ResourceExhausted);
}

#[test]
fn json_lines_are_parsed_and_dispatched() {
    let store = store();

    let reply = dispatch_json(&store, r#"{"operation":"create","name":"Work"}"#);
    assert_eq!(reply.status, StatusCategory::Created);

    let reply = dispatch_json(
        &store,
        r#"{"operation":"update","name":"Work","todo":{"id":"a","done":true}}"#,
    );
    assert_eq!(reply.status, StatusCategory::Ok);

    let reply = dispatch_json(&store, r#"{"operation":"read"}"#);
    assert_eq!(
        body(&reply.response),
        json!({"todoList": [{"name": "Work", "todos": [{"id": "a", "done": true}]}]})
    );

    let reply = dispatch_json(&store, "{oops");
    assert_eq!(reply.status, StatusCategory::BadRequest);
    assert!(body(&reply.response).get("error").is_some());
}
