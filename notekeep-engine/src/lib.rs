//! Storage engine implementation using fjall

use fjall::{Batch, Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use notekeep_core::*;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub mod keys;
pub mod notes;
pub mod users;

pub use notes::*;
pub use users::*;

const USERS_PARTITION: &str = "users";
const NOTES_PARTITION: &str = "notes";
const META_PARTITION: &str = "meta";

/// Id sequences kept in the meta partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sequence {
    Users,
    Notes,
}

impl Sequence {
    fn key(self) -> &'static [u8] {
        match self {
            Sequence::Users => b"seq:users",
            Sequence::Notes => b"seq:notes",
        }
    }
}

/// Storage engine wrapping a fjall keyspace.
///
/// Cloning is cheap; every clone shares the same partitions and write lock.
#[derive(Clone)]
pub struct StorageEngine {
    keyspace: Arc<Keyspace>,
    users: PartitionHandle,
    notes: PartitionHandle,
    meta: PartitionHandle,
    write_lock: Arc<Mutex<()>>,
}

impl StorageEngine {
    /// Open (or create) the store at the given path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let keyspace = Config::new(path)
            .open()
            .map_err(|e| NotekeepError::Storage(e.to_string()))?;

        let open = |name: &str| {
            keyspace
                .open_partition(name, PartitionCreateOptions::default())
                .map_err(|e| NotekeepError::Storage(e.to_string()))
        };
        let users = open(USERS_PARTITION)?;
        let notes = open(NOTES_PARTITION)?;
        let meta = open(META_PARTITION)?;

        Ok(StorageEngine {
            keyspace: Arc::new(keyspace),
            users,
            notes,
            meta,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Create temporary storage engine for testing
    #[cfg(any(test, feature = "test-utils"))]
    pub fn temp() -> Result<(Self, tempfile::TempDir)> {
        let temp_dir = tempfile::tempdir()
            .map_err(|e| NotekeepError::Internal(e.to_string()))?;
        let engine = Self::new(temp_dir.path())?;
        Ok((engine, temp_dir))
    }

    /// Credential store view of this engine
    pub fn users(&self) -> UserPartition {
        UserPartition::new(self.clone())
    }

    /// Note store view of this engine
    pub fn notes(&self) -> NotePartition {
        NotePartition::new(self.clone())
    }

    /// Persist all changes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(|e| NotekeepError::Storage(e.to_string()))
    }

    pub(crate) fn users_partition(&self) -> &PartitionHandle {
        &self.users
    }

    pub(crate) fn notes_partition(&self) -> &PartitionHandle {
        &self.notes
    }

    pub(crate) fn batch(&self) -> Batch {
        self.keyspace.batch()
    }

    /// Serialize check-then-write sequences.
    ///
    /// The lock guards no data of its own, so a poisoned lock is still usable.
    pub(crate) fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserve the next id of a sequence, staging the new counter in `batch`.
    /// Callers must hold the write guard until the batch commits.
    pub(crate) fn allocate_id(&self, batch: &mut Batch, sequence: Sequence) -> Result<u64> {
        let current = match self
            .meta
            .get(sequence.key())
            .map_err(|e| NotekeepError::Storage(e.to_string()))?
        {
            Some(bytes) => keys::decode_u64(&bytes)?,
            None => 0,
        };

        let next = current + 1;
        batch.insert(&self.meta, sequence.key(), next.to_be_bytes().to_vec());
        Ok(next)
    }

    /// Commit a batch and flush it to disk
    pub(crate) fn commit(&self, batch: Batch) -> Result<()> {
        batch
            .commit()
            .map_err(|e| NotekeepError::Storage(e.to_string()))?;
        self.persist()
    }
}
