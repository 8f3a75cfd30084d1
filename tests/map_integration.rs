//! Namespaced map integration tests

mod common;

use common::skip_if_no_redis;
use redlease::RedisMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Account {
    owner: String,
    balance: i64,
}

#[tokio::test]
async fn insert_then_get_round_trips() {
    skip_if_no_redis!();
    let map: RedisMap<String, Account> =
        RedisMap::new(common::client(), common::random_key("accounts"));

    let account = Account {
        owner: "ada".to_string(),
        balance: 250,
    };
    map.insert(&"acct-1".to_string(), &account).await.unwrap();

    let fetched = map.get(&"acct-1".to_string()).await.unwrap();
    assert_eq!(fetched, Some(account));
}

#[tokio::test]
async fn get_missing_key_returns_none() {
    skip_if_no_redis!();
    let map: RedisMap<String, Account> =
        RedisMap::new(common::client(), common::random_key("missing"));

    assert_eq!(map.get(&"nobody".to_string()).await.unwrap(), None);
}

#[tokio::test]
async fn insert_overwrites_existing_value() {
    skip_if_no_redis!();
    let map: RedisMap<String, i64> =
        RedisMap::new(common::client(), common::random_key("counters"));

    map.insert(&"hits".to_string(), &1).await.unwrap();
    map.insert(&"hits".to_string(), &2).await.unwrap();

    assert_eq!(map.get(&"hits".to_string()).await.unwrap(), Some(2));
}

#[tokio::test]
async fn remove_deletes_and_is_idempotent() {
    skip_if_no_redis!();
    let map: RedisMap<String, i64> =
        RedisMap::new(common::client(), common::random_key("remove"));

    map.insert(&"gone".to_string(), &7).await.unwrap();
    map.remove(&"gone".to_string()).await.unwrap();
    assert_eq!(map.get(&"gone".to_string()).await.unwrap(), None);

    // Removing again is a no-op.
    map.remove(&"gone".to_string()).await.unwrap();
}

#[tokio::test]
async fn namespaces_are_isolated() {
    skip_if_no_redis!();
    let client = common::client();
    let left: RedisMap<String, i64> = RedisMap::new(client.clone(), common::random_key("left"));
    let right: RedisMap<String, i64> = RedisMap::new(client, common::random_key("right"));

    left.insert(&"shared".to_string(), &1).await.unwrap();

    assert_eq!(left.get(&"shared".to_string()).await.unwrap(), Some(1));
    assert_eq!(right.get(&"shared".to_string()).await.unwrap(), None);
}
