//! Owner-scoped note store backed by the `notes` partition

use crate::{keys, Sequence, StorageEngine};
use notekeep_core::*;
use tracing::debug;

/// fjall implementation of [`NoteStore`]
#[derive(Clone)]
pub struct NotePartition {
    engine: StorageEngine,
}

impl NotePartition {
    pub(crate) fn new(engine: StorageEngine) -> Self {
        NotePartition { engine }
    }

    fn get(&self, owner_id: UserId, note_id: NoteId) -> Result<Option<Note>> {
        match self.engine.notes_partition().get(keys::note_key(owner_id, note_id)) {
            Ok(Some(data)) => {
                let note: Note = serde_json::from_slice(&data)
                    .map_err(NotekeepError::Serialization)?;
                Ok(Some(note))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(NotekeepError::Storage(e.to_string())),
        }
    }

    /// Lowest-id owned note with exactly this title
    fn find_by_title(&self, owner_id: UserId, title: &str) -> Result<Option<Note>> {
        for item in self.engine.notes_partition().prefix(keys::owner_prefix(owner_id)) {
            let (_key, value) = item.map_err(|e| NotekeepError::Storage(e.to_string()))?;
            let note: Note = serde_json::from_slice(&value)
                .map_err(NotekeepError::Serialization)?;
            if note.title == title {
                return Ok(Some(note));
            }
        }

        Ok(None)
    }

    fn resolve(&self, owner_id: UserId, selector: &NoteSelector) -> Result<Option<Note>> {
        if let Some(id) = selector.id() {
            if let Some(note) = self.get(owner_id, id)? {
                return Ok(Some(note));
            }
        }

        match selector.title() {
            Some(title) => self.find_by_title(owner_id, title),
            None => Ok(None),
        }
    }
}

impl NoteStore for NotePartition {
    fn save(&self, owner_id: UserId, title: &NoteTitle, content: &str) -> Result<Note> {
        let _guard = self.engine.write_guard();

        // Owner may have been deleted after its token was resolved
        let owner_exists = self
            .engine
            .users_partition()
            .get(keys::user_key(owner_id))
            .map_err(|e| NotekeepError::Storage(e.to_string()))?
            .is_some();
        if !owner_exists {
            debug!("Refused note for missing user {}", owner_id);
            return Err(NotekeepError::Unauthorized);
        }

        let mut batch = self.engine.batch();
        let id = NoteId::new(self.engine.allocate_id(&mut batch, Sequence::Notes)?);
        let note = Note {
            id,
            owner_id,
            title: title.as_str().to_string(),
            content: content.to_string(),
        };

        let record = serde_json::to_vec(&note).map_err(NotekeepError::Serialization)?;
        batch.insert(self.engine.notes_partition(), keys::note_key(owner_id, id), record);
        self.engine.commit(batch)?;

        debug!("Saved note {} for user {}", id, owner_id);
        Ok(note)
    }

    fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<Note>> {
        let mut notes = Vec::new();

        // Zero-padded keys make the prefix range ascend by note id
        for item in self.engine.notes_partition().prefix(keys::owner_prefix(owner_id)) {
            let (_key, value) = item.map_err(|e| NotekeepError::Storage(e.to_string()))?;
            let note: Note = serde_json::from_slice(&value)
                .map_err(NotekeepError::Serialization)?;
            notes.push(note);
        }

        Ok(notes)
    }

    fn delete(&self, owner_id: UserId, selector: &NoteSelector) -> Result<Note> {
        let _guard = self.engine.write_guard();

        let note = self
            .resolve(owner_id, selector)?
            .ok_or(NotekeepError::NoteNotFound)?;

        let mut batch = self.engine.batch();
        batch.remove(self.engine.notes_partition(), keys::note_key(owner_id, note.id));
        self.engine.commit(batch)?;

        debug!("Deleted note {} ({}) for user {}", note.id, selector, owner_id);
        Ok(note)
    }
}
