use serde_json::json;
use std::cell::Cell;
use taskdeck_core::storage::{open_db, open_db_in_memory, DbError, StorageResult};
use taskdeck_core::{
    decode_tasks, encode_tasks, Category, FixedClock, KeyValueStore, MemoryKeyValueStore,
    NewTask, Priority, SequentialIds, SqliteKeyValueStore, SteppingClock, StorageError,
    StoreError, TaskRecord, TaskStore, STORAGE_KEY,
};

/// Memory storage whose reads and writes can be switched to fail.
#[derive(Default)]
struct FlakyStorage {
    inner: MemoryKeyValueStore,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl FlakyStorage {
    fn seeded(payload: &str) -> Self {
        Self {
            inner: MemoryKeyValueStore::with_entry(STORAGE_KEY, payload),
            ..Self::default()
        }
    }
}

fn sqlite_failure() -> StorageError {
    StorageError::Db(DbError::Sqlite(rusqlite::Error::InvalidQuery))
}

impl KeyValueStore for FlakyStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_reads.get() {
            return Err(sqlite_failure());
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.get() {
            return Err(sqlite_failure());
        }
        self.inner.set(key, value)
    }
}

fn seed_task(id: &str) -> TaskRecord {
    TaskRecord {
        id: id.to_string(),
        title: format!("seeded {id}"),
        description: String::new(),
        completed: false,
        category: Category::Work,
        priority: Priority::Medium,
        due_date: String::new(),
        created_at: 100,
    }
}

fn memory_store(seed: Option<&str>) -> TaskStore<MemoryKeyValueStore> {
    let storage = seed
        .map(|payload| MemoryKeyValueStore::with_entry(STORAGE_KEY, payload))
        .unwrap_or_default();
    let mut store = TaskStore::with_sources(
        storage,
        Box::new(SteppingClock::starting_at(1_700_000_000_000)),
        Box::new(SequentialIds::new("task")),
    );
    store.load();
    store
}

fn stored_tasks<S: KeyValueStore>(storage: &S) -> Vec<TaskRecord> {
    let payload = storage.get(STORAGE_KEY).unwrap().expect("slot written");
    serde_json::from_str(&payload).unwrap()
}

#[test]
fn add_to_empty_store_creates_incomplete_task() {
    let mut store = memory_store(None);

    let id = store
        .add(NewTask {
            title: "Buy milk".to_string(),
            description: String::new(),
            category: Category::Life,
            priority: Priority::Medium,
            due_date: String::new(),
        })
        .unwrap()
        .expect("task created");

    assert_eq!(store.len(), 1);
    let task = &store.tasks()[0];
    assert_eq!(task.id, id);
    assert_eq!(task.title, "Buy milk");
    assert!(!task.completed);
    assert_eq!(task.created_at, 1_700_000_000_000);
    assert_eq!(stored_tasks(store.storage()), store.tasks());
}

#[test]
fn add_rejects_empty_and_whitespace_titles() {
    let mut store = memory_store(None);
    store.add(NewTask::titled("existing")).unwrap();
    let before = store.tasks().to_vec();
    let stored_before = store.storage().get(STORAGE_KEY).unwrap();

    assert_eq!(store.add(NewTask::titled("")).unwrap(), None);
    assert_eq!(store.add(NewTask::titled("   ")).unwrap(), None);

    assert_eq!(store.tasks(), before.as_slice());
    assert_eq!(store.storage().get(STORAGE_KEY).unwrap(), stored_before);
}

#[test]
fn toggle_flips_only_completed_and_delete_removes_one() {
    let mut store = memory_store(None);
    store.add(NewTask::titled("keep")).unwrap();
    let target = store
        .add(NewTask {
            title: "target".to_string(),
            description: "details".to_string(),
            category: Category::Study,
            priority: Priority::High,
            due_date: "2024-01-10".to_string(),
        })
        .unwrap()
        .unwrap();
    let original = store.get(&target).unwrap().clone();

    assert!(store.toggle(&target).unwrap());
    let toggled = store.get(&target).unwrap().clone();
    assert_eq!(
        toggled,
        TaskRecord {
            completed: true,
            ..original.clone()
        }
    );
    assert!(stored_tasks(store.storage())
        .iter()
        .any(|task| task.id == target && task.completed));

    assert!(store.toggle(&target).unwrap());
    assert_eq!(store.get(&target), Some(&original));

    assert!(store.delete(&target).unwrap());
    assert_eq!(store.len(), 1);
    assert!(store.get(&target).is_none());
    assert_eq!(store.tasks()[0].title, "keep");
    assert_eq!(stored_tasks(store.storage()).len(), 1);
}

#[test]
fn load_coerces_invalid_fields_to_defaults() {
    let store = memory_store(Some(r#"[{"title":"x","category":"Invalid"}]"#));

    assert_eq!(store.len(), 1);
    let task = &store.tasks()[0];
    assert_eq!(task.title, "x");
    assert_eq!(task.category, Category::Life);
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.due_date, "");
    assert!(!task.completed);
    assert!(!task.id.is_empty());
}

#[test]
fn load_treats_malformed_payloads_as_empty() {
    for payload in ["", "not json", "{\"title\":\"x\"}", "42", "null", "[{]"] {
        let store = memory_store(Some(payload));
        assert!(store.is_empty(), "payload {payload:?}");
    }
}

#[test]
fn serialized_tasks_round_trip_through_load() {
    let tasks = vec![
        TaskRecord {
            id: "b".to_string(),
            title: "second".to_string(),
            description: "with notes".to_string(),
            completed: true,
            category: Category::Work,
            priority: Priority::High,
            due_date: "2024-02-29".to_string(),
            created_at: 20,
        },
        TaskRecord {
            id: "a".to_string(),
            title: "first".to_string(),
            description: String::new(),
            completed: false,
            category: Category::Life,
            priority: Priority::Low,
            due_date: String::new(),
            created_at: 10,
        },
    ];

    let payload = encode_tasks(&tasks).unwrap();
    let ids = SequentialIds::new("unused");
    assert_eq!(decode_tasks(&payload, &FixedClock(0), &ids), Some(tasks.clone()));

    let store = memory_store(Some(payload.as_str()));
    assert_eq!(store.tasks(), tasks.as_slice());
}

#[test]
fn legacy_records_without_new_fields_load() {
    let legacy = json!([
        { "id": "old-1", "title": "from v1", "completed": true, "createdAt": 5 },
        { "id": "old-2", "title": "also v1" }
    ])
    .to_string();

    let store = memory_store(Some(legacy.as_str()));
    assert_eq!(store.len(), 2);
    assert_eq!(store.tasks()[0].id, "old-1");
    assert!(store.tasks()[0].completed);
    assert_eq!(store.tasks()[0].created_at, 5);
    assert_eq!(store.tasks()[1].category, Category::Life);
}

#[test]
fn sqlite_storage_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskdeck.sqlite3");

    let created_id = {
        let mut store = TaskStore::new(SqliteKeyValueStore::new(open_db(&path).unwrap()));
        assert_eq!(store.load(), 0);
        store.add(NewTask::titled("durable")).unwrap();
        store.add(NewTask::titled("second")).unwrap().unwrap()
    };

    let mut reopened = TaskStore::new(SqliteKeyValueStore::new(open_db(&path).unwrap()));
    assert_eq!(reopened.load(), 2);
    assert_eq!(reopened.tasks()[0].id, created_id);
    assert_eq!(reopened.tasks()[1].title, "durable");
}

#[test]
fn sqlite_store_discards_corrupted_slot() {
    let storage = SqliteKeyValueStore::new(open_db_in_memory().unwrap());
    storage.set(STORAGE_KEY, "{corrupted").unwrap();

    let mut store = TaskStore::new(&storage);
    assert_eq!(store.load(), 0);

    store.add(NewTask::titled("fresh start")).unwrap();
    let payload = storage.get(STORAGE_KEY).unwrap().unwrap();
    assert!(payload.starts_with('['));
}

#[test]
fn load_writes_back_generated_ids_and_timestamps() {
    let storage = MemoryKeyValueStore::with_entry(STORAGE_KEY, r#"[{"title":"legacy"}]"#);

    let mut first_session = TaskStore::new(&storage);
    assert_eq!(first_session.load(), 1);
    let loaded = first_session.tasks()[0].clone();
    assert_eq!(stored_tasks(&storage), vec![loaded.clone()]);

    let mut second_session = TaskStore::new(&storage);
    assert_eq!(second_session.load(), 1);
    assert_eq!(second_session.tasks(), first_session.tasks());
    assert!(second_session.toggle(&loaded.id).unwrap());
    assert_eq!(stored_tasks(&storage)[0].created_at, loaded.created_at);
}

#[test]
fn load_leaves_canonical_payload_untouched() {
    let payload = encode_tasks(&[seed_task("a")]).unwrap();
    let storage = FlakyStorage::seeded(&payload);
    storage.fail_writes.set(true);

    let mut store = TaskStore::new(&storage);
    assert_eq!(store.load(), 1);
    assert_eq!(storage.inner.get(STORAGE_KEY).unwrap(), Some(payload));
}

#[test]
fn load_succeeds_when_write_back_fails() {
    let storage = FlakyStorage::seeded(r#"[{"title":"read only"}]"#);
    storage.fail_writes.set(true);

    let mut store = TaskStore::new(&storage);
    assert_eq!(store.load(), 1);
    assert_eq!(store.tasks()[0].title, "read only");
    assert_eq!(
        storage.inner.get(STORAGE_KEY).unwrap().as_deref(),
        Some(r#"[{"title":"read only"}]"#)
    );
}

#[test]
fn load_treats_read_failure_as_no_prior_data() {
    let payload = encode_tasks(&[seed_task("a"), seed_task("b")]).unwrap();
    let storage = FlakyStorage::seeded(&payload);
    storage.fail_reads.set(true);

    let mut store = TaskStore::new(&storage);
    assert_eq!(store.load(), 0);
    assert!(store.is_empty());
    assert_eq!(storage.inner.get(STORAGE_KEY).unwrap(), Some(payload));
}

#[test]
fn write_failures_return_storage_error_and_keep_mutation() {
    let payload = encode_tasks(&[seed_task("seed")]).unwrap();
    let storage = FlakyStorage::seeded(&payload);
    let mut store = TaskStore::with_sources(
        &storage,
        Box::new(SteppingClock::starting_at(500)),
        Box::new(SequentialIds::new("task")),
    );
    assert_eq!(store.load(), 1);
    storage.fail_writes.set(true);

    let err = store.add(NewTask::titled("unsaved")).unwrap_err();
    assert!(matches!(err, StoreError::Storage(StorageError::Db(_))));
    assert_eq!(store.len(), 2);
    assert_eq!(store.tasks()[0].id, "task-1");

    let err = store.toggle("seed").unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
    assert!(store.get("seed").unwrap().completed);

    let err = store.delete("seed").unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
    assert!(store.get("seed").is_none());
    assert_eq!(store.len(), 1);

    assert_eq!(storage.inner.get(STORAGE_KEY).unwrap(), Some(payload));

    storage.fail_writes.set(false);
    assert!(store.toggle("task-1").unwrap());
    assert_eq!(stored_tasks(&storage), store.tasks());
}
