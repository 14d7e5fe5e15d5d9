//! Integration tests for the contact directory and assignee resolution.
//!
//! Covers lookup by id, name and email, malformed contact entries, every
//! stored assignee shape, and how resolved ids flow into the editor.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use kanban::board::BoardStore;
use kanban::contacts::{AssigneeRef, Directory, resolve, resolve_contacts, resolve_text};
use kanban::detail::DetailOverlay;
use kanban_proto::task::TaskId;
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn team() -> Directory {
    Directory::build(Some(&json!({
        "c1": {"name": "Anna Muster", "email": "anna@example.com", "initials": "AM"},
        "c2": {"name": "Ben Braun", "email": "Ben@Example.com"},
        "c3": {"name": "Cleo Stein"}
    })))
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

#[test]
fn name_case_and_id_all_resolve_to_the_same_contact() {
    let directory = Directory::build(Some(&json!({"c1": {"name": "Anna Muster"}})));
    for raw in ["Anna Muster", "anna muster", "c1"] {
        assert_eq!(resolve(&json!(raw), &directory), vec!["c1"], "{raw}");
    }
}

#[test]
fn null_contact_entries_are_excluded_everywhere() {
    let directory = Directory::build(Some(&json!({
        "c1": {"name": "Anna Muster", "email": "anna@example.com"},
        "ghost": null
    })));
    assert_eq!(directory.len(), 1);
    assert_eq!(directory.name_count(), 1);
    assert_eq!(directory.email_count(), 1);
    assert!(!directory.contains_id("ghost"));
    assert!(resolve(&json!("ghost"), &directory).is_empty());
}

#[test]
fn missing_and_non_object_snapshots_build_empty_directories() {
    for snapshot in [None, Some(json!(null)), Some(json!([1, 2])), Some(json!("contacts"))] {
        assert!(Directory::build(snapshot.as_ref()).is_empty());
    }
}

#[test]
fn contacts_without_display_fields_get_defaults() {
    let directory = team();
    let cleo = directory.contact("c3").unwrap();
    assert_eq!(cleo.initials, "?");
    assert_eq!(cleo.color, "#999");
    assert!(cleo.email.is_empty());
    assert_eq!(directory.email_count(), 2);
}

#[test]
fn duplicate_names_resolve_to_the_later_contact() {
    let directory = Directory::build(Some(&json!({
        "a": {"name": "Sam"},
        "b": {"name": "sam"}
    })));
    assert_eq!(directory.id_for_name("SAM"), Some("b"));
    assert_eq!(directory.len(), 2);
}

// ---------------------------------------------------------------------------
// Stored shapes
// ---------------------------------------------------------------------------

#[test]
fn every_stored_shape_resolves() {
    let directory = team();
    let cases: Vec<(Value, Vec<&str>)> = vec![
        (json!("c2"), vec!["c2"]),
        (json!("ben@example.com"), vec!["c2"]),
        (json!("Anna Muster, cleo stein"), vec!["c1", "c3"]),
        (json!(["c3", "anna@example.com"]), vec!["c3", "c1"]),
        (json!([{"id": "c2"}, {"email": "ANNA@example.com"}]), vec!["c2", "c1"]),
        (json!({"contactId": "c3"}), vec!["c3"]),
        (json!({"name": "Ben Braun"}), vec!["c2"]),
        (json!({"0": "c1", "1": {"id": "c2"}}), vec!["c1", "c2"]),
    ];
    for (raw, expected) in cases {
        assert_eq!(resolve(&raw, &directory), expected, "{raw}");
    }
}

#[test]
fn unresolvable_entries_are_dropped_silently() {
    let directory = team();
    let raw = json!(["nobody", "", null, 42, {"id": "c9"}, {"color": "#fff"}, "c1"]);
    assert_eq!(resolve(&raw, &directory), vec!["c1"]);
    assert!(resolve(&json!(null), &directory).is_empty());
    assert!(resolve(&json!(""), &directory).is_empty());
}

#[test]
fn raw_objects_prefer_id_then_email_then_name() {
    let directory = team();
    let raw = json!({"id": "c9", "email": "ben@example.com", "name": "Anna Muster"});
    assert_eq!(resolve(&raw, &directory), vec!["c2"]);
    let refs = AssigneeRef::from_value(&raw, &directory);
    assert!(matches!(refs.as_slice(), [AssigneeRef::Raw(_)]));
}

#[test]
fn duplicates_keep_first_occurrence() {
    let directory = team();
    let raw = json!(["Ben Braun", "c1", "ben@example.com", {"id": "c1"}]);
    assert_eq!(resolve(&raw, &directory), vec!["c2", "c1"]);
}

#[test]
fn resolution_is_idempotent() {
    let directory = team();
    let raw = json!(["anna muster", {"email": "ben@example.com"}, "Cleo Stein"]);
    let once = resolve(&raw, &directory);
    let twice = resolve(&json!(once), &directory);
    assert_eq!(once, twice);
}

#[test]
fn free_text_and_contact_lookup() {
    let directory = team();
    assert_eq!(resolve_text(" ben@example.com ,c3 ", &directory), vec!["c2", "c3"]);
    let names: Vec<&str> = resolve_contacts(&json!("c1, c3"), &directory)
        .into_iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Anna Muster", "Cleo Stein"]);
}

// ---------------------------------------------------------------------------
// Editor integration
// ---------------------------------------------------------------------------

#[test]
fn saving_an_edited_task_writes_canonical_ids() {
    let directory = team();
    let mut store = BoardStore::new();
    store.merge(Some(&json!({
        "todo": {"t1": {"order": 0, "title": "Plan", "assignees": "Anna Muster"}}
    })));

    let mut overlay = DetailOverlay::new();
    overlay.open(TaskId::new("t1"), &store).unwrap();
    overlay.begin_edit(&store, &directory).unwrap();
    let draft = overlay.draft_mut().unwrap();
    assert_eq!(draft.assignees, vec!["c1"]);
    draft.set_assignee_text("c1, Ben Braun, stranger", &directory);

    let write = overlay.save(&mut store, 256).unwrap();
    assert_eq!(write.path, "todo/t1");
    assert_eq!(write.value["assignees"], json!(["c1", "c2"]));
    let stored = store.task(&TaskId::new("t1")).unwrap();
    assert_eq!(resolve(stored.assignees.raw(), &directory), vec!["c1", "c2"]);
}
