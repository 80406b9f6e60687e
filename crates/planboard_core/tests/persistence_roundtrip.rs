use chrono::NaiveDate;
use planboard_core::db::{open_db, open_db_in_memory};
use planboard_core::service::persistence::{NOTES_KEY, PROJECTS_KEY, TODOS_KEY};
use planboard_core::{
    BlobStatus, BlobStore, BoardSession, FixedClock, Note, PersistenceAdapter, RecordStore,
    SqliteBlobStore,
};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn populated_store() -> RecordStore {
    let mut store = RecordStore::new();
    let website = store.add_project("Website", "marketing site");
    let blog = store.add_project("Blog", "");
    store.add_todo("Fix bug", date(15), &website.id).unwrap();
    let done = store.add_todo("Draft post", date(16), &blog.id).unwrap();
    store.toggle_todo(&done.id);
    let mut note = Note::draft(website.id.clone(), date(15));
    note.content = "Launch checklist\n- DNS".to_string();
    store.save_note(note).unwrap();
    store
}

#[test]
fn reload_from_file_yields_equal_collections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    let store = populated_store();

    {
        let blobs = SqliteBlobStore::try_new(open_db(&path).unwrap()).unwrap();
        let mut adapter = PersistenceAdapter::new(blobs);
        adapter.save(&store.snapshot()).unwrap();
    }

    let blobs = SqliteBlobStore::try_new(open_db(&path).unwrap()).unwrap();
    let loaded = PersistenceAdapter::new(blobs).load();
    assert_eq!(loaded.projects, BlobStatus::Loaded(2));
    assert_eq!(loaded.todos, BlobStatus::Loaded(2));
    assert_eq!(loaded.notes, BlobStatus::Loaded(1));
    assert_eq!(RecordStore::from_snapshot(loaded.snapshot), store);
}

#[test]
fn persisted_blobs_use_camel_case_fields_and_iso_dates() {
    let store = populated_store();
    let mut adapter =
        PersistenceAdapter::new(SqliteBlobStore::try_new(open_db_in_memory().unwrap()).unwrap());
    adapter.save(&store.snapshot()).unwrap();

    let todos_raw = adapter.blob_store().get_blob(TODOS_KEY).unwrap().unwrap();
    let todos: serde_json::Value = serde_json::from_slice(&todos_raw).unwrap();
    let first = &todos[0];
    assert_eq!(first["text"], "Fix bug");
    assert_eq!(first["date"], "2024-01-15");
    assert_eq!(first["completed"], false);
    assert_eq!(first["projectId"], store.projects()[0].id.as_str());

    let notes_raw = adapter.blob_store().get_blob(NOTES_KEY).unwrap().unwrap();
    let notes: serde_json::Value = serde_json::from_slice(&notes_raw).unwrap();
    assert!(notes[0].get("projectId").is_some());
    assert!(notes[0].get("project_id").is_none());
}

#[test]
fn legacy_timestamp_ids_load_unchanged() {
    let mut blobs = SqliteBlobStore::try_new(open_db_in_memory().unwrap()).unwrap();
    blobs
        .put_blobs(&[
            (
                PROJECTS_KEY,
                br#"[{"id":"1700000000000","name":"Old","description":""}]"#.to_vec(),
            ),
            (
                TODOS_KEY,
                br#"[{"id":"1700000000001","text":"Legacy","completed":true,"date":"2023-11-14","projectId":"1700000000000"}]"#
                    .to_vec(),
            ),
        ])
        .unwrap();

    let loaded = PersistenceAdapter::new(blobs).load();
    assert_eq!(loaded.notes, BlobStatus::Missing);
    let store = RecordStore::from_snapshot(loaded.snapshot);
    let todos = store.query_todos_for_date(
        "1700000000000",
        NaiveDate::from_ymd_opt(2023, 11, 14).unwrap(),
    );
    assert_eq!(todos.len(), 1);
    assert!(todos[0].completed);
}

#[test]
fn garbage_blobs_start_empty_instead_of_failing() {
    let mut blobs = SqliteBlobStore::try_new(open_db_in_memory().unwrap()).unwrap();
    blobs
        .put_blobs(&[
            (PROJECTS_KEY, vec![0xff, 0xfe, 0x00]),
            (TODOS_KEY, b"null".to_vec()),
            (NOTES_KEY, b"[{\"id\":1}]".to_vec()),
        ])
        .unwrap();

    let loaded = PersistenceAdapter::new(blobs).load();
    assert!(loaded.snapshot.is_empty());
    assert_eq!(loaded.recovered_keys(), [PROJECTS_KEY, TODOS_KEY, NOTES_KEY]);
}

#[test]
fn first_write_after_bad_load_keeps_original_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    let legacy = br#"[{"id":"1","text":"cleared date","completed":false,"date":"","projectId":"9"}]"#;
    {
        let mut blobs = SqliteBlobStore::try_new(open_db(&path).unwrap()).unwrap();
        blobs.put_blobs(&[(TODOS_KEY, legacy.to_vec())]).unwrap();
    }

    {
        let blobs = SqliteBlobStore::try_new(open_db(&path).unwrap()).unwrap();
        let mut session = BoardSession::open_with_clock(blobs, FixedClock(date(20)));
        assert_eq!(session.recovered_keys(), [TODOS_KEY]);
        assert!(session.add_project("Fresh", "").unwrap().is_persisted());
    }

    let blobs = SqliteBlobStore::try_new(open_db(&path).unwrap()).unwrap();
    assert_eq!(
        blobs.get_blob("todos.malformed").unwrap().as_deref(),
        Some(&legacy[..])
    );
    assert_eq!(blobs.get_blob(TODOS_KEY).unwrap().as_deref(), Some(&b"[]"[..]));
}
