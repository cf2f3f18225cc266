//! Integration tests for durability across reopen

use notekeep_core::*;
use notekeep_engine::*;

#[test]
fn reopen_preserves_users_notes_and_sequences() {
    let dir = tempfile::tempdir().unwrap();

    let (alice_id, note_id) = {
        let engine = StorageEngine::new(dir.path()).unwrap();
        let alice = engine
            .users()
            .create_user(&Username::new("alice").unwrap(), "digest")
            .unwrap();
        let note = engine
            .notes()
            .save(alice.id, &NoteTitle::new("t1").unwrap(), "c1")
            .unwrap();
        (alice.id, note.id)
    };

    let engine = StorageEngine::new(dir.path()).unwrap();
    let users = engine.users();
    let notes = engine.notes();

    let alice = users.find_by_username("alice").unwrap().unwrap();
    assert_eq!(alice.id, alice_id);

    let listed = notes.list_for_owner(alice_id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, note_id);
    assert_eq!(listed[0].content, "c1");

    // Sequences continue instead of reusing ids
    let bob = users.create_user(&Username::new("bob").unwrap(), "d").unwrap();
    assert!(bob.id > alice_id);
    let next = notes
        .save(alice_id, &NoteTitle::new("t2").unwrap(), "")
        .unwrap();
    assert!(next.id > note_id);
}

#[test]
fn deleted_ids_are_not_reused() {
    let (engine, _temp) = StorageEngine::temp().unwrap();
    let notes = engine.notes();
    let owner = engine
        .users()
        .create_user(&Username::new("alice").unwrap(), "digest")
        .unwrap()
        .id;
    let title = NoteTitle::new("t").unwrap();

    let first = notes.save(owner, &title, "").unwrap();
    notes.delete(owner, &NoteSelector::Id(first.id)).unwrap();

    let second = notes.save(owner, &title, "").unwrap();
    assert!(second.id > first.id);
}
