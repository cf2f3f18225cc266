//! Key layout inside the fjall partitions
//!
//! Numeric ids are zero-padded to 20 digits so lexicographic key order matches
//! numeric order. Notes are keyed owner-first, which makes an owner's notes a
//! single ordered prefix range and bakes ownership into every point lookup.

use notekeep_core::{NoteId, NotekeepError, Result, UserId};

/// `users` partition: record key for a user id
pub fn user_key(id: UserId) -> Vec<u8> {
    format!("id:{:020}", id.get()).into_bytes()
}

/// `users` partition: unique index entry for a username
pub fn username_key(username: &str) -> Vec<u8> {
    format!("name:{}", username).into_bytes()
}

/// `notes` partition: record key for one owned note
pub fn note_key(owner_id: UserId, note_id: NoteId) -> Vec<u8> {
    format!("{:020}/{:020}", owner_id.get(), note_id.get()).into_bytes()
}

/// `notes` partition: prefix covering every note of one owner
pub fn owner_prefix(owner_id: UserId) -> Vec<u8> {
    format!("{:020}/", owner_id.get()).into_bytes()
}

/// Decode a big-endian u64 stored by the engine
pub fn decode_u64(bytes: &[u8]) -> Result<u64> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| NotekeepError::Storage(format!("corrupt u64 value of {} bytes", bytes.len())))?;
    Ok(u64::from_be_bytes(array))
}
