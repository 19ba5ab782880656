//! JSON file-backed work record store.
//!
//! All units live in a single `work-db.json` document keyed by work key.
//! Writes go to a temporary file that is renamed over the document, so a
//! reader never observes a half-written registry.

use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};

use crate::work::{
    domain::{WorkKey, WorkUnit},
    ports::{WorkRecordStore, WorkRecordStoreError, WorkRecordStoreResult},
};

const DOCUMENT_NAME: &str = "work-db.json";
const STAGING_NAME: &str = "work-db.json.tmp";

type Document = BTreeMap<WorkKey, WorkUnit>;

/// Work record store persisting to a directory on disk.
#[derive(Debug, Clone)]
pub struct FileWorkRecordStore {
    dir: Arc<Dir>,
    write_lock: Arc<Mutex<()>>,
}

impl FileWorkRecordStore {
    /// Opens the store in `path`, creating the directory when missing.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the directory cannot be created or
    /// opened.
    pub fn open(path: &Utf8Path) -> WorkRecordStoreResult<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())
            .map_err(WorkRecordStoreError::persistence)?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(WorkRecordStoreError::persistence)?;
        Ok(Self {
            dir: Arc::new(dir),
            write_lock: Arc::new(Mutex::new(())),
        })
    }
}

fn read_document(dir: &Dir) -> WorkRecordStoreResult<Document> {
    let contents = match dir.read_to_string(DOCUMENT_NAME) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Document::new()),
        Err(err) => return Err(WorkRecordStoreError::persistence(err)),
    };
    if contents.trim().is_empty() {
        return Ok(Document::new());
    }
    serde_json::from_str(&contents).map_err(|err| WorkRecordStoreError::Corrupt(err.to_string()))
}

fn write_document(dir: &Dir, document: &Document) -> WorkRecordStoreResult<()> {
    let contents = serde_json::to_string_pretty(document)
        .map_err(|err| WorkRecordStoreError::Corrupt(err.to_string()))?;
    dir.write(STAGING_NAME, contents)
        .map_err(WorkRecordStoreError::persistence)?;
    dir.rename(STAGING_NAME, dir, DOCUMENT_NAME)
        .map_err(WorkRecordStoreError::persistence)
}

async fn run_blocking<F, T>(f: F) -> WorkRecordStoreResult<T>
where
    F: FnOnce() -> WorkRecordStoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(WorkRecordStoreError::persistence)?
}

#[async_trait]
impl WorkRecordStore for FileWorkRecordStore {
    async fn get(&self, key: &WorkKey) -> WorkRecordStoreResult<Option<WorkUnit>> {
        let dir = Arc::clone(&self.dir);
        let wanted = key.clone();
        run_blocking(move || {
            let mut document = read_document(&dir)?;
            Ok(document.remove(&wanted))
        })
        .await
    }

    async fn put(&self, key: &WorkKey, unit: &WorkUnit) -> WorkRecordStoreResult<()> {
        let dir = Arc::clone(&self.dir);
        let write_lock = Arc::clone(&self.write_lock);
        let record_key = key.clone();
        let record = unit.clone();
        run_blocking(move || {
            let _guard = write_lock.lock().map_err(|err| {
                WorkRecordStoreError::persistence(io::Error::other(err.to_string()))
            })?;
            let mut document = read_document(&dir)?;
            document.insert(record_key, record);
            write_document(&dir, &document)
        })
        .await
    }
}
