//! Embedded data-structure store
//!
//! The single system of record for the service: Redis-shaped commands over
//! hashes, sets, sorted sets, lists, TTL'd strings, JSON documents, bloom
//! filters, and full-text indexes, all behind one async handle.
//!
//! Commands are individually consistent but never grouped: a handler that
//! issues a read-compute-write sequence across commands gets no isolation,
//! matching the semantics of talking to an external store.

mod bloom;
mod errors;
mod value;

pub use bloom::BloomFilter;
pub use errors::{StoreError, StoreResult};

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::search::{SearchHit, SearchResults, TextIndex};
use value::{StringValue, Value};

// Redis-compatible defaults for filters created implicitly by bf_add.
const DEFAULT_BLOOM_ERROR_RATE: f64 = 0.01;
const DEFAULT_BLOOM_CAPACITY: usize = 100;

#[derive(Default)]
struct StoreInner {
    entries: HashMap<String, Value>,
    indexes: HashMap<String, TextIndex>,
}

/// The embedded store. One instance is shared across all requests.
#[derive(Default)]
pub struct Store {
    inner: RwLock<StoreInner>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================
    // Generic commands
    // ==================

    /// Returns whether a key holds a live value.
    pub async fn exists(&self, key: &str) -> bool {
        let inner = self.inner.read().await;
        live_entry(&inner.entries, key).is_some()
    }

    /// Deletes a key. Returns whether it existed.
    pub async fn del(&self, key: &str) -> bool {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;
        for index in inner.indexes.values_mut() {
            if index.covers(key) {
                index.remove(key);
            }
        }
        inner.entries.remove(key).is_some()
    }

    // ==================
    // String commands
    // ==================

    /// Reads a string value, treating expired entries as missing.
    pub async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let inner = self.inner.read().await;
        match live_entry(&inner.entries, key) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.value.clone())),
            Some(other) => Err(StoreError::wrong_type(key, "string", other.type_name())),
        }
    }

    /// Writes a string value that lapses after `ttl`.
    pub async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;
        for index in inner.indexes.values_mut() {
            if index.covers(key) {
                index.remove(key);
            }
        }
        inner.entries.insert(
            key.to_string(),
            Value::Str(StringValue {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            }),
        );
        Ok(())
    }

    // ==================
    // Hash commands
    // ==================

    /// Sets hash fields, creating the hash if needed.
    ///
    /// Returns the number of fields that did not exist before. Writes under
    /// a registered index prefix refresh that key's index entry.
    pub async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> StoreResult<usize> {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;
        let hash = hash_entry(&mut inner.entries, key)?;
        let mut added = 0;
        for (field, value) in fields {
            if hash.insert(field.to_string(), value.to_string()).is_none() {
                added += 1;
            }
        }
        reindex_key(&inner.entries, &mut inner.indexes, key);
        Ok(added)
    }

    /// Reads one hash field.
    pub async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let inner = self.inner.read().await;
        match live_entry(&inner.entries, key) {
            None => Ok(None),
            Some(Value::Hash(hash)) => Ok(hash.get(field).cloned()),
            Some(other) => Err(StoreError::wrong_type(key, "hash", other.type_name())),
        }
    }

    /// Reads all fields of a hash; missing keys yield an empty map.
    pub async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        let inner = self.inner.read().await;
        match live_entry(&inner.entries, key) {
            None => Ok(HashMap::new()),
            Some(Value::Hash(hash)) => Ok(hash.clone()),
            Some(other) => Err(StoreError::wrong_type(key, "hash", other.type_name())),
        }
    }

    /// Adds a signed integer to a hash field, creating it at zero.
    pub async fn hincrby(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64> {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;
        let hash = hash_entry(&mut inner.entries, key)?;
        let current: i64 = match hash.get(field) {
            None => 0,
            Some(raw) => raw.parse().map_err(|_| StoreError::NotANumber {
                key: key.to_string(),
                field: field.to_string(),
            })?,
        };
        let next = current + delta;
        hash.insert(field.to_string(), next.to_string());
        reindex_key(&inner.entries, &mut inner.indexes, key);
        Ok(next)
    }

    /// Adds a float to a hash field, creating it at zero.
    pub async fn hincrbyfloat(&self, key: &str, field: &str, delta: f64) -> StoreResult<f64> {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;
        let hash = hash_entry(&mut inner.entries, key)?;
        let current: f64 = match hash.get(field) {
            None => 0.0,
            Some(raw) => raw.parse().map_err(|_| StoreError::NotANumber {
                key: key.to_string(),
                field: field.to_string(),
            })?,
        };
        let next = current + delta;
        hash.insert(field.to_string(), next.to_string());
        reindex_key(&inner.entries, &mut inner.indexes, key);
        Ok(next)
    }

    // ==================
    // Set commands
    // ==================

    /// Adds a member to a set. Returns whether it was newly added.
    pub async fn sadd(&self, key: &str, member: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        purge_expired(&mut inner.entries, key);
        let entry = inner
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::Set(Default::default()));
        match entry {
            Value::Set(set) => Ok(set.insert(member.to_string())),
            other => Err(StoreError::wrong_type(key, "set", other.type_name())),
        }
    }

    /// Reads all members of a set, sorted so replies are deterministic.
    pub async fn smembers(&self, key: &str) -> StoreResult<Vec<String>> {
        let inner = self.inner.read().await;
        match live_entry(&inner.entries, key) {
            None => Ok(Vec::new()),
            Some(Value::Set(set)) => {
                let mut members: Vec<String> = set.iter().cloned().collect();
                members.sort();
                Ok(members)
            }
            Some(other) => Err(StoreError::wrong_type(key, "set", other.type_name())),
        }
    }

    // ==================
    // List commands
    // ==================

    /// Pushes a value onto the head of a list. Returns the new length.
    pub async fn lpush(&self, key: &str, element: &str) -> StoreResult<usize> {
        let mut inner = self.inner.write().await;
        purge_expired(&mut inner.entries, key);
        let entry = inner
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::List(Default::default()));
        match entry {
            Value::List(list) => {
                list.push_front(element.to_string());
                Ok(list.len())
            }
            other => Err(StoreError::wrong_type(key, "list", other.type_name())),
        }
    }

    /// Reads the inclusive window `[start, stop]` from the head of a list.
    pub async fn lrange(&self, key: &str, start: usize, stop: usize) -> StoreResult<Vec<String>> {
        let inner = self.inner.read().await;
        match live_entry(&inner.entries, key) {
            None => Ok(Vec::new()),
            Some(Value::List(list)) => {
                if start >= list.len() || stop < start {
                    return Ok(Vec::new());
                }
                Ok(list
                    .iter()
                    .skip(start)
                    .take(stop - start + 1)
                    .cloned()
                    .collect())
            }
            Some(other) => Err(StoreError::wrong_type(key, "list", other.type_name())),
        }
    }

    /// Removes every occurrence of an element. Returns the removed count.
    pub async fn lrem(&self, key: &str, element: &str) -> StoreResult<usize> {
        let mut inner = self.inner.write().await;
        purge_expired(&mut inner.entries, key);
        match inner.entries.get_mut(key) {
            None => Ok(0),
            Some(Value::List(list)) => {
                let before = list.len();
                list.retain(|e| e != element);
                Ok(before - list.len())
            }
            Some(other) => Err(StoreError::wrong_type(key, "list", other.type_name())),
        }
    }

    // ==================
    // Sorted-set commands
    // ==================

    /// Adds or re-scores a member. Returns whether it was newly added.
    pub async fn zadd(&self, key: &str, score: f64, member: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        purge_expired(&mut inner.entries, key);
        let entry = inner
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::SortedSet(Default::default()));
        match entry {
            Value::SortedSet(zset) => Ok(zset.insert(member.to_string(), score).is_none()),
            other => Err(StoreError::wrong_type(key, "sorted set", other.type_name())),
        }
    }

    /// Reads the inclusive window `[start, stop]` ordered by score
    /// descending, ties broken by member descending.
    pub async fn zrevrange(&self, key: &str, start: usize, stop: usize) -> StoreResult<Vec<String>> {
        let inner = self.inner.read().await;
        match live_entry(&inner.entries, key) {
            None => Ok(Vec::new()),
            Some(Value::SortedSet(zset)) => {
                let mut members: Vec<(&String, &f64)> = zset.iter().collect();
                members.sort_by(|a, b| {
                    b.1.partial_cmp(a.1)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| b.0.cmp(a.0))
                });
                if start >= members.len() || stop < start {
                    return Ok(Vec::new());
                }
                Ok(members
                    .into_iter()
                    .skip(start)
                    .take(stop - start + 1)
                    .map(|(member, _)| member.clone())
                    .collect())
            }
            Some(other) => Err(StoreError::wrong_type(key, "sorted set", other.type_name())),
        }
    }

    // ==================
    // JSON document commands
    // ==================

    /// Stores a whole JSON document, replacing any previous one.
    pub async fn json_set(&self, key: &str, document: serde_json::Value) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        purge_expired(&mut inner.entries, key);
        match inner.entries.get(key) {
            None | Some(Value::Json(_)) => {
                inner.entries.insert(key.to_string(), Value::Json(document));
                Ok(())
            }
            Some(other) => Err(StoreError::wrong_type(key, "json", other.type_name())),
        }
    }

    /// Reads a stored JSON document.
    pub async fn json_get(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        let inner = self.inner.read().await;
        match live_entry(&inner.entries, key) {
            None => Ok(None),
            Some(Value::Json(doc)) => Ok(Some(doc.clone())),
            Some(other) => Err(StoreError::wrong_type(key, "json", other.type_name())),
        }
    }

    // ==================
    // Bloom filter commands
    // ==================

    /// Creates a bloom filter sized for the given rate and capacity,
    /// replacing any existing filter at the key.
    pub async fn bf_reserve(&self, key: &str, error_rate: f64, capacity: usize) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .entries
            .insert(key.to_string(), Value::Bloom(BloomFilter::new(error_rate, capacity)));
        Ok(())
    }

    /// Marks an item as seen, creating a default-sized filter if needed.
    pub async fn bf_add(&self, key: &str, item: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        purge_expired(&mut inner.entries, key);
        let entry = inner.entries.entry(key.to_string()).or_insert_with(|| {
            Value::Bloom(BloomFilter::new(DEFAULT_BLOOM_ERROR_RATE, DEFAULT_BLOOM_CAPACITY))
        });
        match entry {
            Value::Bloom(filter) => {
                filter.insert(item);
                Ok(())
            }
            other => Err(StoreError::wrong_type(key, "bloom filter", other.type_name())),
        }
    }

    /// Returns whether an item may have been seen before. Missing filters
    /// have seen nothing.
    pub async fn bf_exists(&self, key: &str, item: &str) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        match live_entry(&inner.entries, key) {
            None => Ok(false),
            Some(Value::Bloom(filter)) => Ok(filter.contains(item)),
            Some(other) => Err(StoreError::wrong_type(key, "bloom filter", other.type_name())),
        }
    }

    // ==================
    // Full-text search commands
    // ==================

    /// Registers a text index over one field of the hashes under a key
    /// prefix and backfills it from existing entries.
    pub async fn ft_create(&self, name: &str, prefix: &str, field: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;
        let mut index = TextIndex::new(prefix, field);
        for (key, entry) in &inner.entries {
            if let Value::Hash(hash) = entry {
                if index.covers(key) {
                    if let Some(text) = hash.get(field) {
                        index.upsert(key, text);
                    }
                }
            }
        }
        inner.indexes.insert(name.to_string(), index);
        Ok(())
    }

    /// Runs a query against a registered index, hydrating each hit from
    /// its stored hash.
    pub async fn ft_search(&self, name: &str, query: &str) -> StoreResult<SearchResults> {
        let inner = self.inner.read().await;
        let index = inner
            .indexes
            .get(name)
            .ok_or_else(|| StoreError::UnknownIndex(name.to_string()))?;

        let documents: Vec<SearchHit> = index
            .search(query)
            .into_iter()
            .map(|(key, score)| {
                let value = match inner.entries.get(&key) {
                    Some(Value::Hash(hash)) => hash.clone(),
                    _ => HashMap::new(),
                };
                SearchHit { id: key, score, value }
            })
            .collect();

        Ok(SearchResults {
            total: documents.len(),
            documents,
        })
    }
}

/// Resolves a key to its entry, treating expired strings as missing.
fn live_entry<'a>(entries: &'a HashMap<String, Value>, key: &str) -> Option<&'a Value> {
    match entries.get(key) {
        Some(Value::Str(s)) if s.is_expired() => None,
        other => other,
    }
}

/// Drops a lapsed string entry so a typed write can reclaim the key.
fn purge_expired(entries: &mut HashMap<String, Value>, key: &str) {
    if let Some(Value::Str(s)) = entries.get(key) {
        if s.is_expired() {
            entries.remove(key);
        }
    }
}

/// Resolves a key to its hash for writing, creating an empty hash if needed.
fn hash_entry<'a>(
    entries: &'a mut HashMap<String, Value>,
    key: &str,
) -> StoreResult<&'a mut HashMap<String, String>> {
    purge_expired(entries, key);
    let entry = entries
        .entry(key.to_string())
        .or_insert_with(|| Value::Hash(Default::default()));
    match entry {
        Value::Hash(hash) => Ok(hash),
        other => Err(StoreError::wrong_type(key, "hash", other.type_name())),
    }
}

/// Refreshes every index covering a key from its current hash state.
fn reindex_key(
    entries: &HashMap<String, Value>,
    indexes: &mut HashMap<String, TextIndex>,
    key: &str,
) {
    let Some(Value::Hash(hash)) = entries.get(key) else {
        return;
    };
    for index in indexes.values_mut() {
        if index.covers(key) {
            match hash.get(index.field()) {
                Some(text) => index.upsert(key, text),
                None => index.remove(key),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let store = Store::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
        assert!(!store.exists("nope").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_ex_expires_after_ttl() {
        let store = Store::new();
        store.set_ex("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert!(store.exists("k").await);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(!store.exists("k").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_key_can_be_reclaimed_by_other_type() {
        let store = Store::new();
        store.set_ex("k", "v", Duration::from_secs(1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        store.sadd("k", "member").await.unwrap();
        assert_eq!(store.smembers("k").await.unwrap(), vec!["member"]);
    }

    #[tokio::test]
    async fn test_hset_and_hgetall() {
        let store = Store::new();
        let added = store
            .hset("h", &[("id", "1"), ("name", "Taco Hut")])
            .await
            .unwrap();
        assert_eq!(added, 2);

        let hash = store.hgetall("h").await.unwrap();
        assert_eq!(hash.get("name").map(String::as_str), Some("Taco Hut"));
        assert_eq!(store.hget("h", "id").await.unwrap(), Some("1".to_string()));
        assert_eq!(store.hget("h", "missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_hincrby_counts_from_zero() {
        let store = Store::new();
        assert_eq!(store.hincrby("h", "viewCount", 1).await.unwrap(), 1);
        assert_eq!(store.hincrby("h", "viewCount", 1).await.unwrap(), 2);
        assert_eq!(
            store.hget("h", "viewCount").await.unwrap(),
            Some("2".to_string())
        );
    }

    #[tokio::test]
    async fn test_hincrbyfloat_accumulates() {
        let store = Store::new();
        assert_eq!(store.hincrbyfloat("h", "totalStars", 4.0).await.unwrap(), 4.0);
        assert_eq!(store.hincrbyfloat("h", "totalStars", 3.5).await.unwrap(), 7.5);
    }

    #[tokio::test]
    async fn test_hincrby_rejects_non_numeric_field() {
        let store = Store::new();
        store.hset("h", &[("n", "abc")]).await.unwrap();
        let err = store.hincrby("h", "n", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotANumber { .. }));
    }

    #[tokio::test]
    async fn test_wrong_type_is_an_error() {
        let store = Store::new();
        store.sadd("s", "x").await.unwrap();
        assert!(matches!(
            store.get("s").await.unwrap_err(),
            StoreError::WrongType { .. }
        ));
        assert!(matches!(
            store.lpush("s", "x").await.unwrap_err(),
            StoreError::WrongType { .. }
        ));
    }

    #[tokio::test]
    async fn test_sadd_is_idempotent() {
        let store = Store::new();
        assert!(store.sadd("s", "a").await.unwrap());
        assert!(!store.sadd("s", "a").await.unwrap());
        store.sadd("s", "b").await.unwrap();
        assert_eq!(store.smembers("s").await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_lpush_returns_length_and_orders_newest_first() {
        let store = Store::new();
        assert_eq!(store.lpush("l", "first").await.unwrap(), 1);
        assert_eq!(store.lpush("l", "second").await.unwrap(), 2);
        assert_eq!(
            store.lrange("l", 0, 9).await.unwrap(),
            vec!["second", "first"]
        );
    }

    #[tokio::test]
    async fn test_lrange_windows() {
        let store = Store::new();
        for i in 0..5 {
            store.lpush("l", &i.to_string()).await.unwrap();
        }
        // list is 4,3,2,1,0
        assert_eq!(store.lrange("l", 1, 2).await.unwrap(), vec!["3", "2"]);
        assert_eq!(store.lrange("l", 4, 9).await.unwrap(), vec!["0"]);
        assert!(store.lrange("l", 5, 9).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lrem_removes_all_occurrences() {
        let store = Store::new();
        for e in ["a", "b", "a"] {
            store.lpush("l", e).await.unwrap();
        }
        assert_eq!(store.lrem("l", "a").await.unwrap(), 2);
        assert_eq!(store.lrange("l", 0, 9).await.unwrap(), vec!["b"]);
        assert_eq!(store.lrem("l", "missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zrevrange_orders_by_score_descending() {
        let store = Store::new();
        store.zadd("z", 3.0, "mid").await.unwrap();
        store.zadd("z", 5.0, "top").await.unwrap();
        store.zadd("z", 1.0, "low").await.unwrap();
        assert_eq!(
            store.zrevrange("z", 0, 9).await.unwrap(),
            vec!["top", "mid", "low"]
        );
        assert_eq!(store.zrevrange("z", 1, 1).await.unwrap(), vec!["mid"]);
    }

    #[tokio::test]
    async fn test_zadd_rescores_existing_member() {
        let store = Store::new();
        assert!(store.zadd("z", 0.0, "a").await.unwrap());
        store.zadd("z", 2.0, "b").await.unwrap();
        assert!(!store.zadd("z", 5.0, "a").await.unwrap());
        assert_eq!(store.zrevrange("z", 0, 9).await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_json_set_and_get() {
        let store = Store::new();
        let doc = serde_json::json!({"links": [], "contact": {"phone": "555"}});
        store.json_set("d", doc.clone()).await.unwrap();
        assert_eq!(store.json_get("d").await.unwrap(), Some(doc));
        assert_eq!(store.json_get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bloom_round_trip_through_store() {
        let store = Store::new();
        store.bf_reserve("bf", 0.0001, 1000).await.unwrap();
        assert!(!store.bf_exists("bf", "Taco Hut:1,1").await.unwrap());
        store.bf_add("bf", "Taco Hut:1,1").await.unwrap();
        assert!(store.bf_exists("bf", "Taco Hut:1,1").await.unwrap());
    }

    #[tokio::test]
    async fn test_bf_exists_on_missing_filter_is_false() {
        let store = Store::new();
        assert!(!store.bf_exists("missing", "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_del_removes_any_type() {
        let store = Store::new();
        store.hset("h", &[("a", "1")]).await.unwrap();
        assert!(store.del("h").await);
        assert!(!store.del("h").await);
        assert!(store.hgetall("h").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ft_search_tracks_hash_writes() {
        let store = Store::new();
        store.ft_create("idx", "items:", "name").await.unwrap();
        store
            .hset("items:1", &[("id", "1"), ("name", "Taco Hut")])
            .await
            .unwrap();
        store
            .hset("items:2", &[("id", "2"), ("name", "Burger Palace")])
            .await
            .unwrap();

        let results = store.ft_search("idx", "taco").await.unwrap();
        assert_eq!(results.total, 1);
        assert_eq!(results.documents[0].id, "items:1");
        assert_eq!(
            results.documents[0].value.get("name").map(String::as_str),
            Some("Taco Hut")
        );
    }

    #[tokio::test]
    async fn test_ft_create_backfills_existing_hashes() {
        let store = Store::new();
        store
            .hset("items:1", &[("name", "Noodle Bar")])
            .await
            .unwrap();
        store.ft_create("idx", "items:", "name").await.unwrap();
        assert_eq!(store.ft_search("idx", "noodle").await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_ft_search_drops_deleted_keys() {
        let store = Store::new();
        store.ft_create("idx", "items:", "name").await.unwrap();
        store.hset("items:1", &[("name", "Taco Hut")]).await.unwrap();
        store.del("items:1").await;
        assert_eq!(store.ft_search("idx", "taco").await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_ft_search_unknown_index_is_an_error() {
        let store = Store::new();
        assert!(matches!(
            store.ft_search("nope", "q").await.unwrap_err(),
            StoreError::UnknownIndex(_)
        ));
    }
}
