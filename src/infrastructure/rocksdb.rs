use crate::domain::ports::LedgerStore;
use crate::domain::project::Project;
use crate::error::{EscrowError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing project records.
pub const CF_PROJECTS: &str = "projects";
/// Column Family for ledger metadata (the id counter).
pub const CF_META: &str = "meta";

const NEXT_ID_KEY: &[u8] = b"next_project_id";

/// A persistent ledger implementation using RocksDB.
///
/// Project records live in the `projects` Column Family; the monotonic id
/// counter is persisted under the `meta` Column Family so ids survive
/// process restarts and are never reused.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
/// Id reservation is serialized through a mutex so no two callers can be
/// handed the same id.
#[derive(Clone)]
pub struct RocksDbLedger {
    db: Arc<DB>,
    id_lock: Arc<Mutex<()>>,
}

impl RocksDbLedger {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("projects" and "meta")
    /// exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_projects = ColumnFamilyDescriptor::new(CF_PROJECTS, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_projects, cf_meta])?;

        Ok(Self {
            db: Arc::new(db),
            id_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf_handle(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            EscrowError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn read_next_id(&self) -> Result<u64> {
        let cf = self.cf_handle(CF_META)?;
        match self.db.get_cf(&cf, NEXT_ID_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    EscrowError::InternalError(Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "corrupt id counter",
                    )))
                })?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(1),
        }
    }
}

#[async_trait]
impl LedgerStore for RocksDbLedger {
    async fn put(&self, project: Project) -> Result<()> {
        let cf = self.cf_handle(CF_PROJECTS)?;

        let key = project.id.to_be_bytes();
        let value = serde_json::to_vec(&project).map_err(|e| {
            EscrowError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("serialization error: {e}"),
            )))
        })?;

        self.db.put_cf(&cf, key, value)?;

        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<Project>> {
        let cf = self.cf_handle(CF_PROJECTS)?;

        let key = id.to_be_bytes();
        let result = self.db.get_cf(&cf, key)?;

        if let Some(bytes) = result {
            let project = serde_json::from_slice(&bytes).map_err(|e| {
                EscrowError::InternalError(Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("deserialization error: {e}"),
                )))
            })?;
            Ok(Some(project))
        } else {
            Ok(None)
        }
    }

    async fn next_id(&self) -> Result<u64> {
        let _guard = self.id_lock.lock().await;
        let id = self.read_next_id()?;
        let cf = self.cf_handle(CF_META)?;
        self.db.put_cf(&cf, NEXT_ID_KEY, (id + 1).to_be_bytes())?;
        Ok(id)
    }

    async fn peek_next_id(&self) -> Result<u64> {
        let _guard = self.id_lock.lock().await;
        self.read_next_id()
    }

    async fn all_projects(&self) -> Result<Vec<Project>> {
        let cf = self.cf_handle(CF_PROJECTS)?;

        let mut projects = Vec::new();
        let iter = self.db.iterator_cf(cf, rocksdb::IteratorMode::Start);

        for item in iter {
            let (_key, value) = item.map_err(|e| {
                EscrowError::InternalError(Box::new(std::io::Error::other(format!(
                    "RocksDB iteration error: {e}"
                ))))
            })?;
            let project: Project = serde_json::from_slice(&value).map_err(|e| {
                EscrowError::InternalError(Box::new(std::io::Error::other(format!(
                    "failed to deserialize project: {e}"
                ))))
            })?;
            projects.push(project);
        }

        // Big-endian keys iterate in id order already; keep the guarantee
        // explicit for the writer.
        projects.sort_by_key(|p| p.id);
        Ok(projects)
    }
}
