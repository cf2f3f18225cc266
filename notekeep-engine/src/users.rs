//! Credential store backed by the `users` partition

use crate::{keys, Sequence, StorageEngine};
use notekeep_core::*;
use tracing::debug;

/// fjall implementation of [`CredentialStore`]
#[derive(Clone)]
pub struct UserPartition {
    engine: StorageEngine,
}

impl UserPartition {
    pub(crate) fn new(engine: StorageEngine) -> Self {
        UserPartition { engine }
    }
}

impl CredentialStore for UserPartition {
    fn create_user(&self, username: &Username, password_hash: &str) -> Result<User> {
        let users = self.engine.users_partition();
        let name_key = keys::username_key(username.as_str());

        let _guard = self.engine.write_guard();

        let taken = users
            .get(&name_key)
            .map_err(|e| NotekeepError::Storage(e.to_string()))?
            .is_some();
        if taken {
            return Err(NotekeepError::Conflict(username.to_string()));
        }

        let mut batch = self.engine.batch();
        let id = UserId::new(self.engine.allocate_id(&mut batch, Sequence::Users)?);
        let user = User {
            id,
            username: username.clone(),
            password_hash: password_hash.to_string(),
        };

        let record = serde_json::to_vec(&user).map_err(NotekeepError::Serialization)?;
        batch.insert(users, keys::user_key(id), record);
        batch.insert(users, name_key, id.get().to_be_bytes().to_vec());
        self.engine.commit(batch)?;

        debug!("Created user {} ({})", id, username);
        Ok(user)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let index = self
            .engine
            .users_partition()
            .get(keys::username_key(username))
            .map_err(|e| NotekeepError::Storage(e.to_string()))?;

        match index {
            Some(bytes) => self.find_by_id(UserId::new(keys::decode_u64(&bytes)?)),
            None => Ok(None),
        }
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        match self.engine.users_partition().get(keys::user_key(id)) {
            Ok(Some(data)) => {
                let user: User = serde_json::from_slice(&data)
                    .map_err(NotekeepError::Serialization)?;
                Ok(Some(user))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(NotekeepError::Storage(e.to_string())),
        }
    }

    fn delete_user(&self, id: UserId) -> Result<bool> {
        let _guard = self.engine.write_guard();

        let Some(user) = self.find_by_id(id)? else {
            return Ok(false);
        };

        let users = self.engine.users_partition();
        let notes = self.engine.notes_partition();
        let mut batch = self.engine.batch();
        batch.remove(users, keys::user_key(id));
        batch.remove(users, keys::username_key(user.username.as_str()));

        // Cascade: every note under the owner prefix goes in the same batch
        let mut removed_notes = 0usize;
        for item in notes.prefix(keys::owner_prefix(id)) {
            let (key, _value) = item.map_err(|e| NotekeepError::Storage(e.to_string()))?;
            batch.remove(notes, key);
            removed_notes += 1;
        }

        self.engine.commit(batch)?;

        debug!("Deleted user {} and {} notes", id, removed_notes);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_find_user() {
        let (engine, _temp) = StorageEngine::temp().unwrap();
        let users = engine.users();

        let alice = users
            .create_user(&Username::new("alice").unwrap(), "$argon2id$digest")
            .unwrap();
        assert_eq!(alice.id, UserId::new(1));

        let by_name = users.find_by_username("alice").unwrap().unwrap();
        assert_eq!(by_name, alice);

        let by_id = users.find_by_id(alice.id).unwrap().unwrap();
        assert_eq!(by_id.password_hash, "$argon2id$digest");

        assert!(users.find_by_username("bob").unwrap().is_none());
        assert!(users.find_by_id(UserId::new(2)).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_conflicts() {
        let (engine, _temp) = StorageEngine::temp().unwrap();
        let users = engine.users();
        let name = Username::new("alice").unwrap();

        users.create_user(&name, "first").unwrap();
        let err = users.create_user(&name, "second").unwrap_err();
        assert!(matches!(err, NotekeepError::Conflict(_)));

        // The failed attempt must not burn an id or overwrite the record
        let bob = users.create_user(&Username::new("bob").unwrap(), "x").unwrap();
        assert_eq!(bob.id, UserId::new(2));
        assert_eq!(users.find_by_username("alice").unwrap().unwrap().password_hash, "first");
    }

    #[test]
    fn test_delete_user_cascades_to_notes() {
        let (engine, _temp) = StorageEngine::temp().unwrap();
        let users = engine.users();
        let notes = engine.notes();

        let alice = users.create_user(&Username::new("alice").unwrap(), "a").unwrap();
        let bob = users.create_user(&Username::new("bob").unwrap(), "b").unwrap();
        let title = NoteTitle::new("t").unwrap();
        notes.save(alice.id, &title, "one").unwrap();
        notes.save(alice.id, &title, "two").unwrap();
        notes.save(bob.id, &title, "bob's").unwrap();

        assert!(users.delete_user(alice.id).unwrap());
        assert!(users.find_by_id(alice.id).unwrap().is_none());
        assert!(users.find_by_username("alice").unwrap().is_none());
        assert!(notes.list_for_owner(alice.id).unwrap().is_empty());
        assert_eq!(notes.list_for_owner(bob.id).unwrap().len(), 1);

        assert!(!users.delete_user(alice.id).unwrap());
    }

    #[test]
    fn test_username_reusable_after_delete() {
        let (engine, _temp) = StorageEngine::temp().unwrap();
        let users = engine.users();
        let name = Username::new("alice").unwrap();

        let first = users.create_user(&name, "a").unwrap();
        users.delete_user(first.id).unwrap();

        let second = users.create_user(&name, "b").unwrap();
        assert_ne!(first.id, second.id);
    }
}
