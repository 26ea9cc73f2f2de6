use super::*;
use shared::domain::MessageState;

fn store_with(texts: &[&str]) -> (MessageStore, Vec<MessageId>) {
    let mut store = MessageStore::new();
    let mut ids = Vec::new();
    for text in texts {
        let message = Message::user(*text);
        ids.push(message.id.clone());
        store.append(message).expect("append");
    }
    (store, ids)
}

#[test]
fn append_rejects_duplicate_ids() {
    let (mut store, ids) = store_with(&["first"]);
    let mut duplicate = Message::user("again");
    duplicate.id = ids[0].clone();

    let err = store.append(duplicate).expect_err("duplicate must fail");
    assert_eq!(err, DomainError::DuplicateId(ids[0].clone()));
    assert_eq!(store.len(), 1);
}

#[test]
fn update_text_changes_only_the_text_of_one_entry() {
    let (mut store, ids) = store_with(&["one", "two", "three"]);
    let before = store.messages().to_vec();

    store.update_text(&ids[1], "deux").expect("update");

    let after = store.messages();
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(after[1].text, "deux");
    assert_eq!(after[1].id, before[1].id);
    assert_eq!(after[1].timestamp, before[1].timestamp);
    assert_eq!(after[1].author, before[1].author);
    assert_eq!(after[1].state, before[1].state);
}

#[test]
fn remove_keeps_order_of_remaining_entries() {
    let (mut store, ids) = store_with(&["one", "two", "three"]);

    let removed = store.remove(&ids[1]).expect("removed");
    assert_eq!(removed.text, "two");

    let remaining: Vec<_> = store.iter().map(|message| message.id.clone()).collect();
    assert_eq!(remaining, vec![ids[0].clone(), ids[2].clone()]);
    assert!(store.remove(&ids[1]).is_none());
}

#[test]
fn resolve_unknown_id_is_an_error() {
    let mut store = MessageStore::new();
    let id = MessageId::from("missing");
    let err = store
        .resolve(
            &id,
            GenerationOutcome::Failed {
                message: "nope".to_string(),
            },
        )
        .expect_err("unknown id");
    assert_eq!(err, DomainError::UnknownMessage(id));
}

#[test]
fn resolve_marks_placeholder_failed() {
    let mut store = MessageStore::new();
    let placeholder = Message::placeholder();
    let id = placeholder.id.clone();
    store.append(placeholder).expect("append");

    let resolved = store
        .resolve(
            &id,
            GenerationOutcome::Failed {
                message: "too long".to_string(),
            },
        )
        .expect("resolve");
    assert_eq!(resolved.state, MessageState::Failed);
    assert_eq!(resolved.text, "too long");
    assert!(resolved.video_url().is_none());
}

#[test]
fn replace_all_rejects_duplicates_and_keeps_previous_contents() {
    let (mut store, _) = store_with(&["kept"]);
    let message = Message::user("dup");
    let copy = message.clone();

    assert!(store.replace_all(vec![message, copy]).is_err());
    assert_eq!(store.len(), 1);
    assert_eq!(store.messages()[0].text, "kept");
}
