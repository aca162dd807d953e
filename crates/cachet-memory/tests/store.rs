use std::collections::HashSet;
use std::time::Duration;

use cachet_memory::{MemoryBackend, Outcome, Store, Ttl};

const NAME: &str = "testStore";

fn test_store() -> Store {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Store::new(NAME, MemoryBackend::new())
}

async fn seed(store: &Store) {
    for (key, value) in [("key1", "value1"), ("key2", "value2")] {
        assert!(store.set(key, value, None).await.unwrap());
    }
}

fn sorted(mut keys: Vec<String>) -> Vec<String> {
    keys.sort();
    keys
}

// ---------------------------------------------------------------------------
// name / get / set
// ---------------------------------------------------------------------------

#[test]
fn name_returns_configured_name() {
    let store = Store::new(NAME, MemoryBackend::new());
    assert_eq!(store.name(), NAME);
}

#[tokio::test]
async fn get_returns_stored_value() {
    let store = test_store();
    assert!(store.set("chuck-norris", "superman", None).await.unwrap());
    assert_eq!(
        store.get("chuck-norris").await.unwrap().as_deref(),
        Some("superman")
    );
}

#[tokio::test]
async fn get_unknown_key_is_none() {
    let store = test_store();
    assert!(store.get("unknownKey").await.unwrap().is_none());
}

#[tokio::test]
async fn set_overwrites_value() {
    let store = test_store();
    store.set("k", "v1", None).await.unwrap();
    store.set("k", "v2", None).await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
}

#[tokio::test(start_paused = true)]
async fn set_without_ttl_never_expires() {
    let store = test_store();
    store.set("key", "neverExpire", None).await.unwrap();

    tokio::time::sleep(Duration::from_secs(3600)).await;

    assert_eq!(store.get("key").await.unwrap().as_deref(), Some("neverExpire"));
    assert_eq!(store.ttl_in_seconds("key").await.unwrap(), Some(Ttl::Persistent));
}

#[tokio::test(start_paused = true)]
async fn set_with_ttl_expires() {
    let store = test_store();
    store.set("shortLivedKey", "expireIn1s", Some(1)).await.unwrap();
    assert_eq!(
        store.get("shortLivedKey").await.unwrap().as_deref(),
        Some("expireIn1s")
    );

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert!(store.get("shortLivedKey").await.unwrap().is_none());
    assert!(store.ttl_in_seconds("shortLivedKey").await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn set_without_ttl_clears_previous_ttl() {
    let store = test_store();
    store.set("k", "short", Some(1)).await.unwrap();
    store.set("k", "forever", None).await.unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("forever"));
}

#[tokio::test(start_paused = true)]
async fn set_with_ttl_resets_countdown() {
    let store = test_store();
    store.set("k", "v", Some(2)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    store.set("k", "v", Some(2)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test(start_paused = true)]
async fn zero_ttl_means_no_expiry() {
    let store = test_store();
    store.set("k", "v", Some(0)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
}

// ---------------------------------------------------------------------------
// del
// ---------------------------------------------------------------------------

#[tokio::test]
async fn del_existing_key() {
    let store = test_store();
    store.set("key", "neverExpire", None).await.unwrap();

    assert_eq!(store.del("key").await.unwrap(), Outcome::Applied);
    assert!(store.get("key").await.unwrap().is_none());
    assert_eq!(store.del("key").await.unwrap(), Outcome::Missing);
}

#[tokio::test]
async fn del_unknown_key_is_missing() {
    let store = test_store();
    assert_eq!(store.del("unknownKey").await.unwrap(), Outcome::Missing);
}

#[tokio::test(start_paused = true)]
async fn del_expired_key_is_missing() {
    let store = test_store();
    store.set("k", "v", Some(1)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(store.del("k").await.unwrap(), Outcome::Missing);
}

// ---------------------------------------------------------------------------
// expire / ttl
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn expire_existing_key() {
    let store = test_store();
    store.set("key", "make it expire", None).await.unwrap();

    assert_eq!(store.expire("key", 1).await.unwrap(), Outcome::Applied);
    assert_eq!(store.ttl_in_seconds("key").await.unwrap(), Some(Ttl::Expires(1)));

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(store.get("key").await.unwrap().is_none());
}

#[tokio::test]
async fn expire_unknown_key_is_missing() {
    let store = test_store();
    assert_eq!(store.expire("unknownKey", 10).await.unwrap(), Outcome::Missing);
    assert!(store.get("unknownKey").await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn expire_overwrites_ttl() {
    let store = test_store();
    store.set("k", "v", Some(100)).await.unwrap();
    store.expire("k", 5).await.unwrap();
    assert_eq!(store.ttl_in_seconds("k").await.unwrap(), Some(Ttl::Expires(5)));
}

#[tokio::test(start_paused = true)]
async fn ttl_reports_remaining_seconds() {
    let store = test_store();
    store.set("key", "make it expire", Some(10)).await.unwrap();
    assert_eq!(store.ttl_in_seconds("key").await.unwrap(), Some(Ttl::Expires(10)));

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(store.ttl_in_seconds("key").await.unwrap(), Some(Ttl::Expires(6)));
}

#[tokio::test]
async fn ttl_unknown_key_is_none() {
    let store = test_store();
    assert!(store.ttl_in_seconds("unknownKey").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// keys
// ---------------------------------------------------------------------------

#[tokio::test]
async fn keys_returns_all_keys() {
    let store = test_store();
    seed(&store).await;
    assert_eq!(sorted(store.keys(None).await.unwrap()), ["key1", "key2"]);
}

#[tokio::test]
async fn keys_filters_by_pattern() {
    let store = test_store();
    seed(&store).await;
    store.set("other", "x", None).await.unwrap();

    assert_eq!(store.keys(Some("key[2]")).await.unwrap(), ["key2"]);
    assert_eq!(sorted(store.keys(Some("key?")).await.unwrap()), ["key1", "key2"]);
    assert!(store.keys(Some("nope*")).await.unwrap().is_empty());
}

#[tokio::test]
async fn keys_class_range_may_end_in_bracket() {
    let store = test_store();
    for key in ["]", "-", "a", "b"] {
        store.set(key, "x", None).await.unwrap();
    }

    assert_eq!(sorted(store.keys(Some("[a-]")).await.unwrap()), ["]", "a"]);
    assert_eq!(store.keys(Some(r"[\-]")).await.unwrap(), ["-"]);
}

#[tokio::test(start_paused = true)]
async fn keys_skips_expired() {
    let store = test_store();
    seed(&store).await;
    store.set("temp", "x", Some(1)).await.unwrap();

    tokio::time::sleep(Duration::from_secs(2)).await;

    let keys: HashSet<_> = store.keys(None).await.unwrap().into_iter().collect();
    assert_eq!(keys, HashSet::from(["key1".to_string(), "key2".to_string()]));
}

// ---------------------------------------------------------------------------
// delete_all
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_all_empties_store() {
    let store = test_store();
    seed(&store).await;

    assert!(store.delete_all(None).await.unwrap());
    assert!(store.keys(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_all_with_pattern_keeps_others() {
    let store = test_store();
    seed(&store).await;

    assert!(store.delete_all(Some("key[2]")).await.unwrap());
    assert_eq!(store.keys(None).await.unwrap(), ["key1"]);
}

#[tokio::test]
async fn delete_all_without_matches_succeeds() {
    let store = test_store();
    seed(&store).await;

    assert!(store.delete_all(None).await.unwrap());
    assert!(store.delete_all(Some("nonExistingKey")).await.unwrap());
    assert!(store.delete_all(None).await.unwrap());
}

// ---------------------------------------------------------------------------
// sharing / teardown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clones_share_backend() {
    let store = test_store();
    let other = store.clone();
    store.set("shared", "yes", None).await.unwrap();
    assert_eq!(other.get("shared").await.unwrap().as_deref(), Some("yes"));
}

#[tokio::test]
async fn concurrent_writers_all_land() {
    let store = test_store();
    let handles: Vec<_> = (0..32)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.set(&format!("k{i}"), "v", None).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap());
    }
    assert_eq!(store.keys(Some("k*")).await.unwrap().len(), 32);
}

#[tokio::test]
async fn close_succeeds() {
    let store = test_store();
    store.close().await.unwrap();
}
