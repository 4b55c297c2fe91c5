use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::test_utils::at;
use crate::test_utils::bug_info;
use crate::test_utils::ScriptedSearchClient;
use crate::BugInfo;
use crate::Error;
use crate::ListOptions;
use crate::MockSearchClient;
use crate::ResourceVersion;
use crate::SearchBugsArgs;
use crate::TransportError;
use crate::WatchConfig;
use crate::WatchEvent;

fn watch_config() -> WatchConfig {
    WatchConfig {
        poll_interval_ms: 1_000,
        max_watch_duration_ms: 3_600_000,
        event_buffer_size: 10,
    }
}

fn product_args(options: &ListOptions) -> SearchBugsArgs {
    SearchBugsArgs {
        products: options.labels.get("product").cloned().into_iter().collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_list_filters_items_but_not_resource_version() {
    let client = ScriptedSearchClient::with_batches(vec![vec![
        bug_info(1, at(0), at(10)),
        bug_info(2, at(0), at(30)),
        bug_info(3, at(0), at(20)),
    ]]);
    let lw = ListWatcher::new(client.clone(), watch_config())
        .with_include_fn(|b: &BugInfo| b.id != 2);

    let list = lw.list(&ListOptions::default()).await.expect("list should succeed");

    let ids: Vec<u64> = list.items.iter().map(|b| b.id()).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(list.resource_version, ResourceVersion::new(at(30)).to_string());
    // a snapshot has no change-time cutoff
    assert_eq!(client.cutoffs(), vec![None]);
}

#[tokio::test]
async fn test_list_uses_args_fn() {
    let client = ScriptedSearchClient::with_batches(vec![vec![]]);
    let lw = ListWatcher::new(client.clone(), watch_config()).with_args_fn(product_args);

    let mut options = ListOptions::default();
    options.labels.insert("product".to_string(), "Networking".to_string());
    lw.list(&options).await.expect("list should succeed");

    assert_eq!(client.calls()[0].products, vec!["Networking".to_string()]);
}

#[tokio::test]
async fn test_empty_list_reports_caller_token() {
    let client = ScriptedSearchClient::with_batches(vec![vec![]]);
    let lw = ListWatcher::new(client, watch_config());
    let token = ResourceVersion::new(at(42)).to_string();

    let list = lw
        .list(&ListOptions::with_resource_version(token.clone()))
        .await
        .expect("list should succeed");

    assert!(list.is_empty());
    assert_eq!(list.resource_version, token);
}

#[tokio::test]
async fn test_empty_list_without_token_reports_now() {
    let client = ScriptedSearchClient::with_batches(vec![vec![]]);
    let lw = ListWatcher::new(client, watch_config());

    let before = ResourceVersion::now();
    let list = lw.list(&ListOptions::default()).await.expect("list should succeed");
    let after = ResourceVersion::now();

    let rv = ResourceVersion::parse(&list.resource_version).expect("valid resource version");
    assert!(rv >= before && rv <= after);
}

#[tokio::test]
async fn test_list_surfaces_transport_error() {
    let mut client = MockSearchClient::new();
    client
        .expect_search_bugs()
        .times(1)
        .returning(|_| Err(TransportError::Timeout(Duration::from_secs(5))));
    let lw = ListWatcher::new(Arc::new(client), watch_config());

    let err = lw.list(&ListOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Timeout(_))));
}

#[tokio::test]
async fn test_watch_rejects_malformed_token() {
    let mut client = MockSearchClient::new();
    client.expect_search_bugs().never();
    let lw = ListWatcher::new(Arc::new(client), watch_config());

    let err = lw
        .watch(&ListOptions::with_resource_version("yesterday"))
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test(start_paused = true)]
async fn test_watch_resumes_after_token_with_built_args() {
    let client = ScriptedSearchClient::with_batches(vec![vec![bug_info(5, at(-60), at(12))]]);
    let lw = ListWatcher::new(client.clone(), watch_config()).with_args_fn(product_args);

    let mut options = ListOptions::with_resource_version(ResourceVersion::new(at(10)).to_string());
    options.labels.insert("product".to_string(), "Storage".to_string());
    let mut watcher = lw.watch(&options).expect("watch should start");

    match watcher.recv().await {
        Some(WatchEvent::Modified(bug)) => assert_eq!(bug.id(), 5),
        other => panic!("unexpected event {other:?}"),
    }
    watcher.stop();

    let calls = client.calls();
    assert_eq!(calls[0].last_change_time, Some(at(11)));
    assert_eq!(calls[0].products, vec!["Storage".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_watch_without_token_starts_at_beginning_of_time() {
    let client = ScriptedSearchClient::with_batches(vec![vec![bug_info(8, at(0), at(0))]]);
    let lw = ListWatcher::new(client.clone(), watch_config());

    let mut watcher = lw.watch(&ListOptions::default()).expect("watch should start");

    assert!(matches!(watcher.recv().await, Some(WatchEvent::Added(_))));
    watcher.stop();

    let epoch = ResourceVersion::parse("").expect("empty token").time();
    assert_eq!(
        client.cutoffs()[0],
        Some(epoch + chrono::TimeDelta::seconds(1))
    );
}
