use std::time::Duration;

use saveclip::store::TtlCache;

#[test]
fn test_roundtrips_values_inside_ttl() {
    let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(60));

    cache.insert("key", "value".to_string());

    assert_eq!(cache.get("key"), Some("value".to_string()));
    assert_eq!(cache.get("missing"), None);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_insert_overwrites_existing_entry() {
    let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));

    cache.insert("key", 1);
    cache.insert("key", 2);

    assert_eq!(cache.get("key"), Some(2));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_expired_entry_reads_as_miss_and_is_purged() {
    let cache: TtlCache<u32> = TtlCache::new(Duration::from_millis(30));

    cache.insert("key", 7);
    std::thread::sleep(Duration::from_millis(50));

    assert_eq!(cache.get("key"), None);
    assert!(cache.is_empty());
}

#[test]
fn test_sweep_counts_only_expired_entries() {
    let cache: TtlCache<u32> = TtlCache::new(Duration::from_millis(60));

    cache.insert("old", 1);
    std::thread::sleep(Duration::from_millis(90));
    cache.insert("new", 2);

    assert_eq!(cache.sweep_expired(), 1);
    assert_eq!(cache.get("new"), Some(2));
}

#[test]
fn test_remove_and_clear() {
    let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));

    cache.insert("a", 1);
    cache.insert("b", 2);

    cache.remove("a");
    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}
