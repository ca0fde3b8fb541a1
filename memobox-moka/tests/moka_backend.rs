//! Store behavior of the Moka backend through the typed cache layer.

use std::time::Duration;

use chrono::Utc;
use memobox_backend::format::JsonFormat;
use memobox_backend::{Backend, CacheBackend, DeleteStatus};
use memobox_core::{CacheKey, CacheValue, FunctionIdentity, Raw, Value};
use memobox_moka::{EvictionPolicy, MokaBackend, MokaBackendBuilder};

fn key(name: &str, arg: u8) -> CacheKey {
    CacheKey::new(FunctionIdentity::function(name), Raw::from(vec![arg]))
}

#[test]
fn stores_and_fetches_values() {
    let backend = MokaBackend::builder().max_bytes(1024 * 1024).build();
    let now = Utc::now();
    let value = Value::List(vec![Value::Int(1), Value::str("two")]);

    backend.store(&key("f", 1), &value, None, now).unwrap();

    assert_eq!(backend.fetch(&key("f", 1), now).unwrap(), Some(value));
    assert_eq!(backend.fetch(&key("f", 2), now).unwrap(), None);
}

#[test]
fn counts_hits_misses_and_inserts() {
    let backend = MokaBackend::builder().max_entries(100).build();
    let now = Utc::now();

    backend.fetch(&key("f", 1), now).unwrap();
    backend.store(&key("f", 1), &Value::Int(7), None, now).unwrap();
    backend.fetch(&key("f", 1), now).unwrap();
    backend.fetch(&key("f", 1), now).unwrap();

    let info = backend.info(true).unwrap();
    assert_eq!(info.hits, 2);
    assert_eq!(info.misses, 1);
    assert_eq!(info.inserts, 1);
    assert_eq!(info.entries, 1);
    assert!(info.entry_list.is_none());
}

#[test]
fn logically_expired_entries_count_as_misses() {
    let backend = MokaBackend::builder().max_entries(100).build();
    let now = Utc::now();
    backend
        .store(&key("f", 1), &Value::Int(1), Some(Duration::from_secs(1)), now)
        .unwrap();

    let later = now + chrono::Duration::seconds(2);
    assert_eq!(backend.fetch(&key("f", 1), later).unwrap(), None);
    assert!(backend.read(&key("f", 1)).unwrap().is_none());
    assert_eq!(backend.info(true).unwrap().misses, 1);
}

#[test]
fn default_ttl_applies_when_none_is_given() {
    let backend = MokaBackend::builder()
        .max_entries(100)
        .default_ttl(Some(Duration::from_secs(30)))
        .build();
    let now = Utc::now();

    backend.store(&key("f", 1), &Value::Null, None, now).unwrap();
    backend
        .store(&key("f", 2), &Value::Null, Some(Duration::from_secs(5)), now)
        .unwrap();

    let first = backend.read(&key("f", 1)).unwrap().unwrap();
    let second = backend.read(&key("f", 2)).unwrap().unwrap();
    assert_eq!(first.expire(), Some(now + chrono::Duration::seconds(30)));
    assert_eq!(second.expire(), Some(now + chrono::Duration::seconds(5)));
    assert_eq!(
        backend.info(true).unwrap().default_ttl,
        Some(Duration::from_secs(30))
    );
}

#[test]
fn segments_share_one_keyspace() {
    let backend = MokaBackend::builder()
        .max_bytes(4 * 1024 * 1024)
        .segments(8)
        .entries_hint(64)
        .build();
    let now = Utc::now();

    for i in 0..64u8 {
        backend.store(&key("f", i), &Value::Int(i.into()), None, now).unwrap();
    }
    for i in 0..64u8 {
        assert_eq!(
            backend.fetch(&key("f", i), now).unwrap(),
            Some(Value::Int(i.into()))
        );
    }

    let info = backend.info(true).unwrap();
    assert_eq!(info.segments, 8);
    assert_eq!(info.entries, 64);
}

#[test]
fn full_info_lists_every_entry() {
    let backend = MokaBackend::builder()
        .label("memoize")
        .max_bytes(1024 * 1024)
        .segments(2)
        .build();
    let now = Utc::now();
    backend.store(&key("a", 1), &Value::Int(1), None, now).unwrap();
    backend
        .store(&key("b", 2), &Value::Int(2), Some(Duration::from_secs(10)), now)
        .unwrap();

    let info = backend.info(false).unwrap();
    let list = info.entry_list.unwrap();

    assert_eq!(info.label, "memoize");
    assert_eq!(list.len(), 2);
    assert!(list.iter().any(|entry| entry.key.starts_with("a#01")));
    assert!(list.iter().any(|entry| entry.key.starts_with("b#02")));
    assert!(list.iter().all(|entry| entry.size > 0 && entry.created == now));
    assert_eq!(info.memory_size, list.iter().map(|entry| entry.size).sum::<u64>());
}

#[test]
fn remove_and_clear() {
    let backend = MokaBackend::builder().max_entries(100).segments(3).build();
    let now = Utc::now();
    for i in 0..10u8 {
        backend.store(&key("f", i), &Value::Int(0), None, now).unwrap();
    }

    assert_eq!(backend.remove(&key("f", 0)).unwrap(), DeleteStatus::Deleted(1));
    assert_eq!(backend.remove(&key("f", 0)).unwrap(), DeleteStatus::Missing);

    backend.clear().unwrap();
    assert_eq!(backend.info(true).unwrap().entries, 0);
    assert_eq!(backend.fetch(&key("f", 5), now).unwrap(), None);
}

#[test]
fn byte_capacity_evicts_to_budget() {
    let now = Utc::now();
    let entry = CacheValue::new(Raw::from(vec![0u8; 100]), now, None);
    let single = key("f", 1).memory_size() + entry.memory_size();

    let backend = MokaBackendBuilder::default()
        .max_bytes((single * 3) as u64)
        .build();
    for i in 1..=4u8 {
        backend.write(&key("f", i), entry.clone()).unwrap();
        backend.run_pending_tasks();
    }

    assert_eq!(backend.entry_count(), 3);
    assert!(backend.weighted_size() <= (single * 3) as u64);
    assert!(backend.read(&key("f", 4)).unwrap().is_some());
}

#[test]
fn custom_value_format_is_used() {
    let backend = MokaBackend::builder()
        .max_entries(10)
        .value_format(JsonFormat)
        .build();
    let now = Utc::now();
    backend.store(&key("f", 1), &Value::Bool(true), None, now).unwrap();

    let raw = backend.read(&key("f", 1)).unwrap().unwrap();
    assert_eq!(raw.data().as_ref(), br#"{"Bool":true}"#);
}

#[test]
fn explicit_eviction_policy_applies_to_every_segment() {
    let entries = MokaBackend::builder()
        .max_entries(64)
        .segments(4)
        .eviction_policy(EvictionPolicy::lru())
        .build();
    let bytes = MokaBackend::builder()
        .max_bytes(1 << 16)
        .segments(4)
        .eviction_policy(EvictionPolicy::tiny_lfu())
        .build();
    let now = Utc::now();

    for backend in [&entries, &bytes] {
        assert_eq!(backend.segments(), 4);
        for i in 0..16u8 {
            backend.store(&key("f", i), &Value::Int(i.into()), None, now).unwrap();
        }
        for i in 0..16u8 {
            assert_eq!(backend.fetch(&key("f", i), now).unwrap(), Some(Value::Int(i.into())));
        }
    }
}

#[test]
fn lagging_writer_clock_keeps_the_full_ttl() {
    let backend = MokaBackend::builder().max_entries(100).build();
    let written = Utc::now() - chrono::Duration::seconds(10);

    backend
        .store(&key("f", 1), &Value::Int(1), Some(Duration::from_secs(5)), written)
        .unwrap();
    backend.run_pending_tasks();

    assert_eq!(backend.entry_count(), 1);
    assert_eq!(backend.fetch(&key("f", 1), written).unwrap(), Some(Value::Int(1)));
}
