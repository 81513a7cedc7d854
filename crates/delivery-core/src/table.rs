//! # Concurrent Keyed Table
//!
//! This module defines [`KeyedTable`], the shared-state primitive behind the
//! in-memory stores. It wraps a sharded concurrent map and exposes one extra
//! capability the stores rely on: [`KeyedTable::modify`], a per-key atomic
//! read-modify-write.
//!
//! # Architecture Note
//! Records in different keys are independent resources, so the table must not
//! serialize unrelated writes behind one lock. The sharded map gives
//! lock-per-shard granularity; `modify` holds a single entry's guard for the
//! duration of the closure, which is what makes compare-and-set operations on
//! one record atomic without ever blocking the rest of the table.

use dashmap::DashMap;
use std::hash::Hash;

/// A concurrent keyed collection with per-key atomic updates.
///
/// Values are cloned out on read; the table never hands out references that
/// outlive its internal locks.
pub struct KeyedTable<K, V> {
    entries: DashMap<K, V>,
}

impl<K, V> KeyedTable<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Inserts a value, replacing and returning any previous value under the
    /// same key.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Returns a clone of the value under `key`, if present.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Applies `op` to the value under `key` as one atomic step.
    ///
    /// The entry guard is held across the whole call, so no other writer can
    /// observe or change the value while `op` runs. `op` works on a draft
    /// clone: the table commits the draft only when `op` returns `Ok`, so a
    /// failed update leaves the stored value untouched.
    ///
    /// Returns `None` when the key is absent.
    ///
    /// `op` must not call back into the same table; doing so can deadlock on
    /// the shard lock.
    pub fn modify<R, E>(&self, key: &K, op: impl FnOnce(&mut V) -> Result<R, E>) -> Option<Result<R, E>> {
        let mut entry = self.entries.get_mut(key)?;
        let mut draft = entry.value().clone();
        match op(&mut draft) {
            Ok(out) => {
                *entry.value_mut() = draft;
                Some(Ok(out))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Returns clones of every value matching `pred`, in unspecified order.
    pub fn scan(&self, pred: impl Fn(&V) -> bool) -> Vec<V> {
        self.entries
            .iter()
            .filter(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Removes and returns the value under `key`, if present.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for KeyedTable<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn insert_replaces_previous_value() {
        let table = KeyedTable::new();
        assert_eq!(table.insert("k", 1), None);
        assert_eq!(table.insert("k", 2), Some(1));
        assert_eq!(table.get(&"k"), Some(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn modify_commits_only_on_ok() {
        let table = KeyedTable::new();
        table.insert("k", 10);

        let ok: Option<Result<i32, &str>> = table.modify(&"k", |v| {
            *v += 5;
            Ok(*v)
        });
        assert_eq!(ok, Some(Ok(15)));
        assert_eq!(table.get(&"k"), Some(15));

        let err: Option<Result<i32, &str>> = table.modify(&"k", |v| {
            *v += 100;
            Err("rejected")
        });
        assert_eq!(err, Some(Err("rejected")));
        // Failed update must not leak the draft mutation.
        assert_eq!(table.get(&"k"), Some(15));
    }

    #[test]
    fn modify_missing_key_returns_none() {
        let table: KeyedTable<&str, i32> = KeyedTable::new();
        let out: Option<Result<(), ()>> = table.modify(&"missing", |_| Ok(()));
        assert!(out.is_none());
    }

    #[test]
    fn modify_is_atomic_under_contention() {
        let table = Arc::new(KeyedTable::new());
        table.insert(0u32, 0u64);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let table = Arc::clone(&table);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    table
                        .modify(&0, |v: &mut u64| -> Result<(), ()> {
                            *v += 1;
                            Ok(())
                        })
                        .unwrap()
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(table.get(&0), Some(8_000));
    }

    #[test]
    fn scan_filters_values() {
        let table = KeyedTable::new();
        for n in 0..10 {
            table.insert(n, n);
        }
        let mut even = table.scan(|v| v % 2 == 0);
        even.sort_unstable();
        assert_eq!(even, vec![0, 2, 4, 6, 8]);
    }
}
