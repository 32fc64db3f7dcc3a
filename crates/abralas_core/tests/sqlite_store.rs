use abralas_core::db::migrations::latest_version;
use abralas_core::db::{open_db, open_db_in_memory, DbError};
use abralas_core::{
    KeyValueStore, SqliteKeyValueStore, StorageCapability, StorageError, StoryStore, FEED_KEY,
    RITUAL_STATE_KEY, SEED_STORY_ID,
};
use rusqlite::Connection;

#[test]
fn migrations_set_latest_user_version() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn open_rejects_store_from_newer_binary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.sqlite3");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
            .unwrap();
    }

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version, latest_supported }
            if db_version == latest_version() + 1 && latest_supported == latest_version()
    ));
}

#[test]
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    match SqliteKeyValueStore::try_new(&conn) {
        Err(StorageError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn read_missing_key_is_none_and_write_replaces_value() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();

    assert_eq!(kv.read(FEED_KEY).unwrap(), None);
    kv.write(FEED_KEY, "[]").unwrap();
    kv.write(FEED_KEY, "[1]").unwrap();
    assert_eq!(kv.read(FEED_KEY).unwrap().as_deref(), Some("[1]"));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn feed_survives_reopening_the_device_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.sqlite3");

    let submitted = {
        let conn = open_db(&path).unwrap();
        let store = StoryStore::new(StorageCapability::Available(
            SqliteKeyValueStore::try_new(&conn).unwrap(),
        ));
        let story = store.submit(Some("Rubi"), Some("guardado no disco")).unwrap();
        store.endorse(&story.id).unwrap();
        story
    };

    let conn = open_db(&path).unwrap();
    let store = StoryStore::new(StorageCapability::Available(
        SqliteKeyValueStore::try_new(&conn).unwrap(),
    ));
    let feed = store.load();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].id, submitted.id);
    assert_eq!(feed[0].energy, 1);
    assert_eq!(feed[1].id, SEED_STORY_ID);
}

#[test]
fn store_never_populates_ritual_state_key() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();
    let store = StoryStore::new(StorageCapability::Available(&kv));

    let story = store.submit(None, Some("rito")).unwrap();
    store.endorse(&story.id).unwrap();

    assert_eq!(kv.read(RITUAL_STATE_KEY).unwrap(), None);
}
