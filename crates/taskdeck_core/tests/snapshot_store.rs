use chrono::{TimeZone, Utc};
use taskdeck_core::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, PersistenceError, SqliteKeyValueStore,
    Task, TaskId, TaskSnapshotStore, DEFAULT_STORAGE_KEY,
};

fn sample_tasks() -> Vec<Task> {
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let due = Utc.with_ymd_and_hms(2024, 5, 3, 17, 45, 0).unwrap();

    let mut done = Task::new(TaskId::new("b"), "file taxes", Some(due), created_at).unwrap();
    done.completed = true;
    vec![
        Task::new(TaskId::new("c"), "undated", None, created_at).unwrap(),
        done,
        Task::new(
            TaskId::new("a"),
            "later",
            None,
            created_at + chrono::Duration::seconds(1),
        )
        .unwrap(),
    ]
}

fn assert_round_trip<S: KeyValueStore>(backend: S) {
    let mut store = TaskSnapshotStore::with_default_key(backend);
    let tasks = sample_tasks();

    store.save(&tasks).unwrap();

    assert_eq!(store.load(), tasks);
    assert_eq!(store.try_load().unwrap(), Some(tasks));
}

#[test]
fn memory_backend_round_trips_order_and_fields() {
    assert_round_trip(MemoryKeyValueStore::new());
}

#[test]
fn file_backend_round_trips_order_and_fields() {
    let dir = tempfile::tempdir().unwrap();
    assert_round_trip(FileKeyValueStore::new(dir.path()));
}

#[test]
fn sqlite_backend_round_trips_order_and_fields() {
    assert_round_trip(SqliteKeyValueStore::open_in_memory().unwrap());
}

#[test]
fn empty_collection_round_trips() {
    let mut store = TaskSnapshotStore::with_default_key(MemoryKeyValueStore::new());
    store.save(&[]).unwrap();
    assert_eq!(store.try_load().unwrap(), Some(Vec::new()));
}

#[test]
fn missing_key_loads_as_empty() {
    let store = TaskSnapshotStore::with_default_key(MemoryKeyValueStore::new());

    assert!(store.load().is_empty());
    assert_eq!(store.try_load().unwrap(), None);
}

#[test]
fn malformed_snapshot_loads_as_empty() {
    for raw in ["{not json", "{\"id\":\"a\"}", "[{\"text\":\"no id\"}", ""] {
        let backend = MemoryKeyValueStore::new().with_entry(DEFAULT_STORAGE_KEY, raw);
        let store = TaskSnapshotStore::with_default_key(backend);

        assert!(store.load().is_empty(), "raw snapshot: {raw:?}");
        assert!(matches!(
            store.try_load().unwrap_err(),
            PersistenceError::Decode(_)
        ));
    }
}

#[test]
fn snapshot_is_a_json_array_with_wire_field_names() {
    let mut store = TaskSnapshotStore::new(MemoryKeyValueStore::new(), "k");
    store.save(&sample_tasks()).unwrap();

    let raw = store.backend().raw("k").unwrap();
    let value: serde_json::Value = serde_json::from_slice(raw).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["id"], "c");
    assert!(records[0]["datetime"].is_null());
    assert_eq!(records[1]["datetime"], "2024-05-03T17:45:00Z");
    assert_eq!(records[1]["completed"], true);
    assert_eq!(records[1]["createdAt"], "2024-05-01T08:00:00Z");
}

#[test]
fn sqlite_snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.sqlite3");

    {
        let mut store = TaskSnapshotStore::with_default_key(SqliteKeyValueStore::open(&path).unwrap());
        store.save(&sample_tasks()).unwrap();
        store.save(&sample_tasks()[..1]).unwrap();
    }

    let store = TaskSnapshotStore::with_default_key(SqliteKeyValueStore::open(&path).unwrap());
    assert_eq!(store.load(), sample_tasks()[..1].to_vec());

    let rows: i64 = store
        .backend()
        .connection()
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn different_keys_do_not_share_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let mut work = TaskSnapshotStore::new(FileKeyValueStore::new(dir.path()), "work");
    work.save(&sample_tasks()).unwrap();

    let home = TaskSnapshotStore::new(FileKeyValueStore::new(dir.path()), "home");
    assert!(home.load().is_empty());
    assert_eq!(work.load().len(), 3);
}

#[test]
fn unreadable_record_is_skipped_and_next_save_keeps_the_rest() {
    let raw = r#"[
        {"id":"keep","text":"Buy milk","datetime":"2024-06-02T12:30:00Z","completed":false,"createdAt":"2024-06-01T08:00:00Z"},
        {"id":"broken","text":"Bad","datetime":"","completed":false,"createdAt":"2024-06-01T08:00:00Z"}
    ]"#;
    let backend = MemoryKeyValueStore::new().with_entry(DEFAULT_STORAGE_KEY, raw);
    let mut store = TaskSnapshotStore::with_default_key(backend);

    let tasks = store.load();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id.as_str(), "keep");

    store.save(&tasks).unwrap();
    let reloaded = store.load();
    assert_eq!(reloaded, tasks);
}
