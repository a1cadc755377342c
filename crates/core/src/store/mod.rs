//! Keyed entity table with derived secondary indices.
//!
//! Indices are patched synchronously inside every mutating call, so a reader
//! can never observe an index that disagrees with the entries.

pub mod index;

pub use index::{Extractor, IndexObserver, ReactiveIndex};

use indexmap::IndexMap;
use std::hash::Hash;

pub struct ReactiveDb<K, V, I = ()> {
    entries: IndexMap<K, V>,
    indices: I,
}

impl<K, V, I> ReactiveDb<K, V, I>
where
    K: Eq + Hash + Clone,
    I: IndexObserver<K, V>,
{
    pub fn new(indices: I) -> Self {
        Self {
            entries: IndexMap::new(),
            indices,
        }
    }

    /// Insert or replace `key`, returning the previous value.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.entries.insert(key.clone(), value);
        self.indices.observe(&key, self.entries.get(&key));
        previous
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Mutate an entry in place and reindex it. Returns `false` if absent.
    pub fn update(&mut self, key: &K, f: impl FnOnce(&mut V)) -> bool {
        let Some(value) = self.entries.get_mut(key) else {
            return false;
        };
        f(value);
        self.indices.observe(key, self.entries.get(key));
        true
    }

    pub fn delete(&mut self, key: &K) -> Option<V> {
        let removed = self.entries.swap_remove(key)?;
        self.indices.observe(key, None);
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.indices.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn indices(&self) -> &I {
        &self.indices
    }
}

impl<K, V, I> Default for ReactiveDb<K, V, I>
where
    K: Eq + Hash + Clone,
    I: IndexObserver<K, V> + Default,
{
    fn default() -> Self {
        Self::new(I::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Words = ReactiveDb<
        u32,
        String,
        (
            ReactiveIndex<u32, String, usize, u32>,
            ReactiveIndex<u32, String, char, u32>,
        ),
    >;

    fn by_len(id: &u32, word: &String) -> Vec<(usize, u32)> {
        vec![(word.len(), *id)]
    }

    fn by_letters(id: &u32, word: &String) -> Vec<(char, u32)> {
        word.chars().map(|c| (c, *id)).collect()
    }

    fn words() -> Words {
        ReactiveDb::new((ReactiveIndex::new(by_len), ReactiveIndex::new(by_letters)))
    }

    #[test]
    fn test_set_and_delete_keep_indices_in_sync() {
        let mut db = words();
        db.set(1, "cat".to_string());
        db.set(2, "dog".to_string());
        db.set(3, "horse".to_string());

        let (by_len, by_letter) = db.indices();
        assert_eq!(by_len.lookup(&3), vec![1, 2]);
        assert_eq!(by_letter.lookup(&'o'), vec![2, 3]);

        db.delete(&2);
        let (by_len, by_letter) = db.indices();
        assert_eq!(by_len.lookup(&3), vec![1]);
        assert_eq!(by_letter.lookup(&'o'), vec![3]);
        assert!(by_letter.lookup(&'g').is_empty());
    }

    #[test]
    fn test_replace_and_update_reindex() {
        let mut db = words();
        assert_eq!(db.set(1, "cat".to_string()), None);
        assert_eq!(db.set(1, "lion".to_string()), Some("cat".to_string()));
        assert!(db.indices().0.lookup(&3).is_empty());
        assert_eq!(db.indices().0.lookup(&4), vec![1]);

        assert!(db.update(&1, |w| w.push('s')));
        assert_eq!(db.indices().0.lookup(&5), vec![1]);
        assert!(!db.update(&9, |w| w.clear()));
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut db = words();
        db.set(1, "cat".to_string());
        db.clear();
        assert!(db.is_empty());
        assert!(db.indices().0.is_empty());
        assert!(db.indices().1.is_empty());
    }
}
