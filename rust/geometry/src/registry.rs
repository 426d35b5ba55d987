// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Insertion-ordered keyed storage.
//!
//! Backs the session-wide material, geometry and object registries and the
//! per-element bucket map. Entries keep the position of their first insertion,
//! so iteration order is deterministic for identical input.

use rustc_hash::FxHashMap;

/// Keyed store preserving first-insertion order.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    index: FxHashMap<String, usize>,
    entries: Vec<T>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            entries: Vec::new(),
        }
    }

    /// Return the entry for `key`, creating it with `create` if absent.
    ///
    /// Idempotent: `create` runs at most once per key.
    pub fn get_or_insert_with(&mut self, key: &str, create: impl FnOnce() -> T) -> &mut T {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.entries.push(create());
                self.index.insert(key.to_string(), i);
                i
            }
        };
        &mut self.entries[i]
    }

    /// Insert or overwrite the entry for `key`.
    ///
    /// An overwritten entry keeps its original position; the old value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: T) -> Option<T> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i], value)),
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(value);
                None
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i]),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn into_values(self) -> Vec<T> {
        self.entries
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_insert_creates_once() {
        let mut registry = Registry::new();
        let mut calls = 0;

        *registry.get_or_insert_with("a", || {
            calls += 1;
            1
        }) += 10;
        let value = *registry.get_or_insert_with("a", || {
            calls += 1;
            100
        });

        assert_eq!(value, 11);
        assert_eq!(calls, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn insert_overwrites_in_place() {
        let mut registry = Registry::new();
        registry.insert("a", 1);
        registry.insert("b", 2);
        assert_eq!(registry.insert("a", 3), Some(1));

        let values: Vec<_> = registry.iter().copied().collect();
        assert_eq!(values, vec![3, 2]);
        assert!(registry.contains("b"));
        assert_eq!(registry.get("c"), None);
    }

    #[test]
    fn preserves_insertion_order() {
        let mut registry = Registry::new();
        for key in ["z", "m", "a"] {
            registry.get_or_insert_with(key, || key.to_string());
        }
        assert_eq!(registry.into_values(), vec!["z", "m", "a"]);
    }
}
