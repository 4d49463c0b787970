use analyst_assistant::models::chat::{ ChatMessage, Role };
use analyst_assistant::store::{ ProjectStore, StoreError, CHAT_HISTORY_FILE };
use chrono::NaiveDate;
use std::fs;
use tempfile::tempdir;

#[test]
fn acme_intake_conversation_keeps_order() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path());

    let id = store.create("Acme Intake").unwrap();
    assert_eq!(id, "acme_intake");
    store.append_message(&id, Role::User, "hello").unwrap();
    store.append_message(&id, Role::Assistant, "hi there").unwrap();

    assert_eq!(
        store.load_messages(&id).unwrap(),
        vec![ChatMessage::user("hello"), ChatMessage::assistant("hi there")]
    );
}

#[test]
fn create_is_idempotent_and_keeps_history() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path());

    let id = store.create("Acme Intake").unwrap();
    store.append_message(&id, Role::User, "keep me").unwrap();

    assert_eq!(store.create("Acme Intake").unwrap(), id);
    assert_eq!(store.create("ACME Intake").unwrap(), id);
    assert_eq!(store.load_messages(&id).unwrap(), vec![ChatMessage::user("keep me")]);
}

#[test]
fn append_grows_log_by_one() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path());
    let id = store.create("growth").unwrap();

    for i in 0..5 {
        let before = store.load_messages(&id).unwrap().len();
        let content = format!("message {}", i);
        store.append_message(&id, Role::User, &content).unwrap();

        let after = store.load_messages(&id).unwrap();
        assert_eq!(after.len(), before + 1);
        assert_eq!(after.last(), Some(&ChatMessage::user(content)));
    }
}

#[test]
fn missing_locations_read_as_empty() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path().join("not-created-yet"));

    assert!(store.load_messages("nobody").unwrap().is_empty());
    assert!(store.list_projects().unwrap().is_empty());
    assert!(store.list_documents().unwrap().is_empty());
}

#[test]
fn fresh_project_has_empty_log() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path());
    let id = store.create("quiet").unwrap();
    assert!(store.load_messages(&id).unwrap().is_empty());
}

#[test]
fn lists_projects_but_not_documents() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path());
    store.create("Beta").unwrap();
    store.create("Alpha Project").unwrap();
    store.write_document(Some("Alpha"), "# doc").unwrap();

    assert_eq!(store.list_projects().unwrap(), vec!["alpha_project", "beta"]);
    assert_eq!(store.list_documents().unwrap().len(), 1);
}

#[test]
fn document_round_trip_is_byte_identical() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path());
    let content = "# 📄 BRD: X\n\nline with trailing spaces   \n\n";

    let filename = store.write_document(Some("X"), content).unwrap();
    assert!(filename.starts_with("X_") && filename.ends_with(".md"));
    assert_eq!(store.read_document(&filename).unwrap(), content);
    assert_eq!(store.list_documents().unwrap(), vec![filename]);
}

#[test]
fn same_minute_documents_overwrite() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path());
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    let first = store
        .write_document_at(Some("X"), "first", day.and_hms_opt(10, 15, 2).unwrap())
        .unwrap();
    let second = store
        .write_document_at(Some("X"), "second", day.and_hms_opt(10, 15, 58).unwrap())
        .unwrap();

    assert_eq!(first, "X_20240601_1015.md");
    assert_eq!(first, second);
    assert_eq!(store.list_documents().unwrap(), vec![first.clone()]);
    assert_eq!(store.read_document(&first).unwrap(), "second");
}

#[test]
fn read_document_rejects_escaping_names() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path().join("root"));
    let err = store.read_document("../secret.md").unwrap_err();
    assert!(matches!(err, StoreError::InvalidName(_)));
}

#[test]
fn legacy_message_field_is_read() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path());
    let id = store.create("legacy").unwrap();
    fs::write(
        dir.path().join(&id).join(CHAT_HISTORY_FILE),
        r#"[{"role":"user","message":"old style"}]"#
    ).unwrap();

    store.append_message(&id, Role::Assistant, "new style").unwrap();
    assert_eq!(
        store.load_messages(&id).unwrap(),
        vec![ChatMessage::user("old style"), ChatMessage::assistant("new style")]
    );
    let raw = fs::read_to_string(dir.path().join(&id).join(CHAT_HISTORY_FILE)).unwrap();
    assert!(!raw.contains("\"message\""));
}

#[test]
fn corrupt_log_surfaces_parse_error() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path());
    let id = store.create("broken").unwrap();
    fs::write(dir.path().join(&id).join(CHAT_HISTORY_FILE), r#"[{"role":"user","con"#).unwrap();

    assert!(matches!(store.load_messages(&id), Err(StoreError::Json { .. })));
    assert!(matches!(store.append_message(&id, Role::User, "x"), Err(StoreError::Json { .. })));
}

#[test]
fn export_transcript_writes_snapshot() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path());
    let id = store.create("Snap").unwrap();
    store.append_message(&id, Role::User, "hello").unwrap();

    let filename = store.export_transcript(&id).unwrap();
    assert!(filename.starts_with("snap_") && filename.ends_with(".json"));
    let raw = fs::read_to_string(dir.path().join(&filename)).unwrap();
    let messages: Vec<ChatMessage> = serde_json::from_str(&raw).unwrap();
    assert_eq!(messages, vec![ChatMessage::user("hello")]);
    assert!(store.list_documents().unwrap().is_empty());
}

#[test]
fn names_with_dots_or_separators_create_projects() {
    let dir = tempdir().unwrap();
    let store = ProjectStore::new(dir.path());

    let dotted = store.create("Q3... review").unwrap();
    assert_eq!(dotted, "q3_._review");
    let slashed = store.create("Sales/Marketing").unwrap();
    assert_eq!(slashed, "sales_marketing");

    store.append_message(&slashed, Role::User, "hello").unwrap();
    assert_eq!(store.load_messages(&slashed).unwrap(), vec![ChatMessage::user("hello")]);
    assert_eq!(store.list_projects().unwrap(), vec![dotted, slashed]);
    assert!(!dir.path().join("sales").exists());
}
