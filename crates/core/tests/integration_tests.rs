//! Integration tests for the command API
//!
//! These tests verify:
//! - A full user session through `api::call`
//! - Admin curation of the square and copying templates
//! - State surviving a restart on the SQLite backend
//! - Corrupt stored documents under both load policies

use promptdeck_core::{api, App, Config, LoadPolicy, SqliteStore, Storage};
use serde_json::{json, Value};
use tempfile::tempdir;

fn memory_app() -> App {
    api::setup(json!({"backend": "memory"})).expect("in-memory setup")
}

fn ok(app: &mut App, command: &str, args: Value) -> Value {
    let result = api::call(app, command, args);
    assert!(!api::is_error(&result), "{} failed: {}", command, result);
    result
}

#[test]
fn test_user_session_flow() {
    println!("\n=== Test: User Session Flow ===");
    let mut app = memory_app();

    let user = ok(&mut app, "auth.register", json!({"username": "alice", "password": "pw"}));
    assert_eq!(user["user"]["username"], json!("alice"));
    assert_eq!(user["user"]["isAdmin"], json!(false));

    let created = ok(
        &mut app,
        "prompts.create",
        json!({"title": "Standup", "category": "Work", "content": "Yesterday I..."}),
    );
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["versions"][0]["name"], json!("Initial"));
    println!("Created prompt {}", id);

    ok(&mut app, "prompts.add_version", json!({"id": id, "name": "Short", "content": "Y:"}));
    ok(&mut app, "prompts.add_version", json!({"id": id, "name": "Long", "content": "..."}));
    ok(&mut app, "prompts.switch_version", json!({"id": id, "index": 1}));

    // Deleting an earlier version keeps the index, which now shows the next one
    let p = ok(&mut app, "prompts.delete_version", json!({"id": id, "index": 0}));
    assert_eq!(p["versions"].as_array().unwrap().len(), 2);
    assert_eq!(p["currentVersion"], json!(1));
    assert_eq!(p["versions"][1]["name"], json!("Long"));

    // Version ids are never handed out twice
    let p = ok(&mut app, "prompts.add_version", json!({"id": id, "name": "Again", "content": ""}));
    let ids: Vec<&str> = p["versions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["v2", "v3", "v4"]);

    let err = api::call(&mut app, "prompts.switch_version", json!({"id": id, "index": 9}));
    assert!(api::is_error(&err));
    assert_eq!(err["category"], json!("validation"));

    ok(&mut app, "auth.logout", json!({}));
    let current = ok(&mut app, "auth.current", json!({}));
    assert_eq!(current["user"], Value::Null);

    let denied = api::call(&mut app, "prompts.list", json!({}));
    assert_eq!(denied["category"], json!("auth"));
    println!("✅ Session flow complete");
}

#[test]
fn test_admin_curates_square_and_user_copies() {
    println!("\n=== Test: Square Curation ===");
    let mut app = memory_app();

    ok(&mut app, "auth.login", json!({"username": "admin", "password": "admin123"}));
    ok(&mut app, "square.add_category", json!({"name": "Research"}));
    let template = ok(
        &mut app,
        "square.upsert",
        json!({
            "title": "Paper Summariser",
            "category": "Research",
            "versions": [{"id": "v1", "name": "Default", "content": "Summarise this paper"}],
        }),
    );
    let square_id = template["id"].as_str().unwrap().to_string();

    let blocked = api::call(&mut app, "square.remove_category", json!({"index": 5}));
    assert_eq!(blocked["category"], json!("validation"));

    ok(&mut app, "auth.login", json!({"username": "user", "password": "user123"}));
    let denied = api::call(&mut app, "square.delete", json!({"id": square_id}));
    assert_eq!(denied["category"], json!("auth"));

    let copy = ok(&mut app, "prompts.use_template", json!({"squareId": square_id}));
    assert_eq!(copy["userId"], json!("user"));
    assert_eq!(copy["title"], json!("Paper Summariser"));
    assert_eq!(copy["category"], json!("Research"));

    let research = ok(&mut app, "prompts.list", json!({"category": "Research"}));
    assert_eq!(research["prompts"].as_array().unwrap().len(), 1);

    // The copy is independent of the template
    ok(&mut app, "auth.login", json!({"username": "admin", "password": "admin123"}));
    ok(&mut app, "square.delete", json!({"id": square_id}));
    ok(&mut app, "auth.login", json!({"username": "user", "password": "user123"}));
    let mine = ok(&mut app, "prompts.list", json!({}));
    assert_eq!(mine["prompts"].as_array().unwrap().len(), 1);
    println!("✅ Square curation complete");
}

#[test]
fn test_state_survives_restart() {
    println!("\n=== Test: SQLite Restart ===");
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("nested").join("deck.db");
    let config = json!({"dbPath": db_path});

    let id = {
        let mut app = api::setup(config.clone()).unwrap();
        ok(&mut app, "auth.register", json!({"username": "bob", "password": "hunter2"}));
        let created = ok(&mut app, "prompts.create", json!({"title": "Kept", "content": "body"}));
        ok(&mut app, "square.list", json!({}));
        created["id"].as_str().unwrap().to_string()
    };
    assert!(db_path.exists());

    let mut app = api::setup(config).unwrap();
    let current = ok(&mut app, "auth.current", json!({}));
    assert_eq!(current["user"]["username"], json!("bob"));

    let prompt = ok(&mut app, "prompts.get", json!({"id": id}));
    assert_eq!(prompt["versions"][0]["content"], json!("body"));

    let users = SqliteStore::open(&db_path).unwrap();
    let stored_keys = users.keys().unwrap();
    for key in ["currentUser", "users", "prompts", "squarePrompts", "squareCategories"] {
        assert!(stored_keys.contains(&key.to_string()), "missing key {}", key);
    }
    assert!(!stored_keys.contains(&"categories".to_string()));
    println!("✅ Restart complete");
}

#[test]
fn test_corrupt_documents_follow_load_policy() {
    println!("\n=== Test: Corrupt Documents ===");
    let storage = Storage::in_memory();
    storage.set_raw("prompts", "{not json").unwrap();

    let strict = Config {
        load_policy: LoadPolicy::Strict,
        ..Config::in_memory()
    };
    let err = App::with_storage(storage.clone(), strict).unwrap_err();
    assert_eq!(err.category(), "corrupt_data");

    let mut app = App::with_storage(storage.clone(), Config::in_memory()).unwrap();
    ok(&mut app, "auth.login", json!({"username": "user", "password": "user123"}));
    let mine = ok(&mut app, "prompts.list", json!({}));
    assert!(mine["prompts"].as_array().unwrap().is_empty());

    // The bad document is replaced on the next write
    ok(&mut app, "prompts.create", json!({"title": "Fresh"}));
    let raw = storage.get_raw("prompts").unwrap().unwrap();
    assert!(serde_json::from_str::<Value>(&raw).is_ok());
    println!("✅ Corrupt documents handled");
}
