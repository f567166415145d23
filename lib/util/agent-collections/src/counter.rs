/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! A mapping that reads missing keys as zero.

use std::borrow::Borrow;
use std::hash::Hash;

use num_traits::Num;
use rustc_hash::FxHashMap;

use crate::Float;

/// Counter is a hash map whose lookups never fail: a key that was never set reads as zero. Value
/// tables and feature vectors are both counters, and a feature vector times a weight vector is
/// [`Counter::dot`].
#[derive(Debug, Clone, PartialEq)]
pub struct Counter<K, V = Float>
where
    K: Eq + Hash,
{
    values: FxHashMap<K, V>,
}

impl<K, V> Default for Counter<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            values: FxHashMap::default(),
        }
    }
}

impl<K, V> Counter<K, V>
where
    K: Eq + Hash,
    V: Num + Copy,
{
    /// Create an empty counter. Every key reads as zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `key`, or zero if it was never set.
    pub fn get<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.values.get(key).copied().unwrap_or_else(V::zero)
    }

    /// Overwrite the value for `key`.
    pub fn set(&mut self, key: K, value: V) {
        self.values.insert(key, value);
    }

    /// Add `delta` to the value for `key`, starting from zero if it was never set.
    pub fn add(&mut self, key: K, delta: V) {
        let entry = self.values.entry(key).or_insert_with(V::zero);
        *entry = *entry + delta;
    }

    /// Whether `key` has been explicitly set.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.values.contains_key(key)
    }

    /// Sum of all stored values.
    pub fn total(&self) -> V {
        self.values.values().fold(V::zero(), |acc, v| acc + *v)
    }

    /// Sum over keys of `self[key] * other[key]`. Keys missing on either side contribute zero.
    pub fn dot(&self, other: &Counter<K, V>) -> V {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        smaller
            .values
            .iter()
            .fold(V::zero(), |acc, (key, value)| acc + *value * larger.get(key))
    }

    /// Key with the largest value, or None for an empty counter. Ties resolve to an arbitrary
    /// maximal key.
    pub fn arg_max(&self) -> Option<&K>
    where
        V: PartialOrd,
    {
        let mut best: Option<(&K, V)> = None;
        for (key, value) in &self.values {
            let improves = match best {
                None => true,
                Some((_, best_value)) => *value > best_value,
            };
            if improves {
                best = Some((key, *value));
            }
        }
        best.map(|(key, _)| key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key has been stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over stored entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.values.iter()
    }

    /// Iterate over stored keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.values.keys()
    }
}

impl<K, V> FromIterator<(K, V)> for Counter<K, V>
where
    K: Eq + Hash,
    V: Num + Copy,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut counter = Counter::new();
        for (key, value) in iter {
            counter.set(key, value);
        }
        counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_reads_as_zero() {
        let counter: Counter<&str> = Counter::new();
        assert_eq!(counter.get("anything"), 0.0);
        assert!(counter.is_empty());
        assert!(!counter.contains_key("anything"));
    }

    #[test]
    fn test_add_starts_from_zero() {
        let mut counter: Counter<&str, i32> = Counter::new();
        counter.add("food", 3);
        counter.add("food", 4);
        counter.add("ghost", -1);
        assert_eq!(counter.get("food"), 7);
        assert_eq!(counter.get("ghost"), -1);
        assert_eq!(counter.total(), 6);
    }

    #[test]
    fn test_set_overwrites() {
        let mut counter: Counter<u32> = Counter::new();
        counter.set(1, 2.5);
        counter.set(1, -1.0);
        assert_eq!(counter.get(&1), -1.0);
        assert_eq!(counter.len(), 1);
    }

    #[test]
    fn test_dot_ignores_keys_missing_on_one_side() {
        let features: Counter<&str> = [("score", 10.0), ("distance", 3.0), ("stop", 1.0)]
            .into_iter()
            .collect();
        let weights: Counter<&str> = [("score", 100.0), ("distance", -1.0), ("reverse", -2.0)]
            .into_iter()
            .collect();
        assert_eq!(features.dot(&weights), 1000.0 - 3.0);
        assert_eq!(weights.dot(&features), 1000.0 - 3.0);
    }

    #[test]
    fn test_arg_max() {
        let empty: Counter<&str> = Counter::new();
        assert_eq!(empty.arg_max(), None);

        let counter: Counter<&str> = [("a", 1.0), ("b", 5.0), ("c", -2.0)].into_iter().collect();
        assert_eq!(counter.arg_max(), Some(&"b"));
    }
}
