use std::sync::Arc;

use super::*;
use crate::test_utils::at;
use crate::test_utils::bug_info;
use crate::Bug;
use crate::Status;
use crate::TransportError;
use crate::WatchEvent;

fn bug(
    id: u64,
    changed: i64,
) -> Bug {
    Bug::from(bug_info(id, at(0), at(changed)))
}

#[test]
fn test_replace_drops_missing_keys() {
    let store = BugStore::new();
    store.replace(vec![bug(1, 0), bug(2, 0), bug(3, 0)]);
    assert_eq!(store.len(), 3);

    store.replace(vec![bug(2, 5), bug(4, 5)]);

    let mut keys = store.keys();
    keys.sort();
    assert_eq!(keys, vec!["2".to_string(), "4".to_string()]);
    assert_eq!(store.get_by_key("2").map(|b| b.last_change_time()), Some(at(5)));
}

#[test]
fn test_upsert_returns_previous() {
    let store = BugStore::new();
    assert!(store.upsert(bug(1, 0)).is_none());

    let previous = store.upsert(bug(1, 9)).expect("previous entry");
    assert_eq!(previous.last_change_time(), at(0));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_apply_added_and_modified() {
    let store = BugStore::new();

    assert!(store.apply(&WatchEvent::Added(bug(7, 1))));
    assert!(store.apply(&WatchEvent::Modified(bug(7, 2))));

    let cached = store.get_by_key("7").expect("bug 7 cached");
    assert_eq!(cached.last_change_time(), at(2));
}

#[test]
fn test_apply_ignores_stale_change() {
    let store = BugStore::new();
    store.upsert(bug(7, 10));

    assert!(!store.apply(&WatchEvent::Modified(bug(7, 3))));
    assert_eq!(store.get_by_key("7").map(|b| b.last_change_time()), Some(at(10)));
}

#[test]
fn test_apply_ignores_error_events() {
    let store = BugStore::new();
    let event = WatchEvent::Error(Status::internal_error(&TransportError::Request("boom".into())));

    assert!(!store.apply(&event));
    assert!(store.is_empty());
}

#[test]
fn test_lister_get_missing_is_not_found() {
    let lister = BugLister::new(Arc::new(BugStore::new()));

    let err = lister.get(42).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "bugs.search.bugzilla.org \"42\" not found");
}

#[test]
fn test_lister_sees_store_updates() {
    let store = Arc::new(BugStore::new());
    let lister = BugLister::new(store.clone());

    store.upsert(bug(3, 0));

    assert_eq!(lister.get(3).expect("bug 3").id(), 3);
}

#[test]
fn test_lister_list_filters_and_orders_by_id() {
    let store = Arc::new(BugStore::new());
    store.replace(vec![bug(9, 1), bug(2, 1), bug(5, 8), bug(4, 1)]);
    let lister = BugLister::new(store);

    let ids: Vec<u64> = lister
        .list(|b| b.last_change_time() == at(1))
        .iter()
        .map(|b| b.id())
        .collect();
    assert_eq!(ids, vec![2, 4, 9]);
    assert_eq!(lister.list(|_| true).len(), 4);
}
