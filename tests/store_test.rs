use chrono::Utc;
use ecell_portal::dashboard::finalize;
use ecell_portal::error::StoreError;
use ecell_portal::model::{StartupStage, Submission, SubmissionForm};
use ecell_portal::session::{SessionRepository, StoreRepository, SubmissionRepository};
use ecell_portal::store::{
    JsonFileStore, KeyValueStore, MemoryStore, SUBMISSION_KEY, USER_KEY, load_json_file,
    save_json_file,
};
use std::collections::HashMap;
use ecell_portal::demo_user;
use std::sync::Arc;

fn sample_submission() -> Submission {
    let form = SubmissionForm {
        idea_title: "Campus Bikes".to_string(),
        startup_stage: Some(StartupStage::Idea),
        ..SubmissionForm::default()
    };
    finalize(form, Utc::now())
}

#[test]
fn test_memory_store_scopes_are_isolated() {
    let store = MemoryStore::new();
    store.set("alpha", USER_KEY, "{}".to_string()).unwrap();

    assert_eq!(store.get("alpha", USER_KEY).unwrap().as_deref(), Some("{}"));
    assert_eq!(store.get("beta", USER_KEY).unwrap(), None);

    store.set("alpha", USER_KEY, "[]".to_string()).unwrap();
    assert_eq!(store.get("alpha", USER_KEY).unwrap().as_deref(), Some("[]"));
    println!("✓ Last write wins inside a scope, other scopes untouched");
}

#[test]
fn test_memory_store_set_if_absent() {
    let store = MemoryStore::new();
    assert!(store.set_if_absent("s", SUBMISSION_KEY, "1".to_string()).unwrap());
    assert!(!store.set_if_absent("s", SUBMISSION_KEY, "2".to_string()).unwrap());
    assert_eq!(store.get("s", SUBMISSION_KEY).unwrap().as_deref(), Some("1"));

    store.remove("s", SUBMISSION_KEY).unwrap();
    assert_eq!(store.get("s", SUBMISSION_KEY).unwrap(), None);
    assert_eq!(store.scope_count(), 0);
}

#[test]
fn test_json_file_store_reloads_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("sessions.json");

    {
        let store = JsonFileStore::open(&path).unwrap();
        store.set("abc", USER_KEY, "{\"name\":\"x\"}".to_string()).unwrap();
        store.set("abc", SUBMISSION_KEY, "{}".to_string()).unwrap();
        store.remove("abc", SUBMISSION_KEY).unwrap();
    }

    assert!(path.exists());
    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(
        reopened.get("abc", USER_KEY).unwrap().as_deref(),
        Some("{\"name\":\"x\"}")
    );
    assert_eq!(reopened.get("abc", SUBMISSION_KEY).unwrap(), None);
    println!("✓ File store survives a reopen");
}

#[test]
fn test_json_file_store_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "not json").unwrap();

    match JsonFileStore::open(&path) {
        Err(StoreError::Serialization(_)) => println!("✓ Corrupt store file reported"),
        other => panic!("expected a serialization error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_json_file_helpers_create_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data.json");

    let empty: HashMap<String, String> = load_json_file(&path).unwrap();
    assert!(empty.is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

    let mut values = HashMap::new();
    values.insert("k".to_string(), "v".to_string());
    save_json_file(&path, &values).unwrap();

    let reloaded: HashMap<String, String> = load_json_file(&path).unwrap();
    assert_eq!(reloaded, values);
    println!("✓ JSON file helpers create, write and reload");
}

#[test]
fn test_repository_user_round_trip_and_clear() {
    let repo = StoreRepository::new(Arc::new(MemoryStore::new()));
    let user = demo_user();

    assert_eq!(repo.load_user("s1").unwrap(), None);
    repo.save_user("s1", &user).unwrap();
    assert_eq!(repo.load_user("s1").unwrap(), Some(user.clone()));

    repo.create_submission("s1", &sample_submission()).unwrap();
    repo.clear("s1").unwrap();

    assert_eq!(repo.load_user("s1").unwrap(), None);
    assert_eq!(repo.load_submission("s1").unwrap(), None);
    println!("✓ Clearing a session drops both user and submission");
}

#[test]
fn test_repository_keeps_first_submission() {
    let store = Arc::new(MemoryStore::new());
    let repo = StoreRepository::new(store.clone());
    let first = sample_submission();
    let second = Submission {
        form: SubmissionForm {
            idea_title: "Another Idea".to_string(),
            ..first.form.clone()
        },
        ..first.clone()
    };

    repo.create_submission("s1", &first).unwrap();
    match repo.create_submission("s1", &second) {
        Err(StoreError::AlreadyExists(key)) => assert_eq!(key, SUBMISSION_KEY),
        other => panic!("expected AlreadyExists, got {:?}", other),
    }
    assert_eq!(repo.load_submission("s1").unwrap(), Some(first));

    // stored layout uses camelCase keys and an ISO timestamp
    let raw = store.get("s1", SUBMISSION_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["ideaTitle"], "Campus Bikes");
    assert!(json["submittedAt"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_user_layout_in_store() {
    let store = Arc::new(MemoryStore::new());
    let repo = StoreRepository::new(store.clone());
    repo.save_user("s1", &demo_user()).unwrap();

    let raw = store.get("s1", USER_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["rollNumber"], "21CS101");
    assert_eq!(json["email"], "ganesh@raghuenggcollege.in");
    assert_eq!(json["phone"], "9876543210");
}
