use indexmap::IndexSet;
use std::collections::HashMap;
use std::hash::Hash;

/// Something that derives data from the rows of a [`ReactiveDb`](super::ReactiveDb).
///
/// `observe` is called synchronously after every change of `key`, with the
/// new value or `None` when the key was deleted.
pub trait IndexObserver<K, V> {
    fn observe(&mut self, key: &K, value: Option<&V>);
    fn clear(&mut self);
}

impl<K, V> IndexObserver<K, V> for () {
    fn observe(&mut self, _key: &K, _value: Option<&V>) {}
    fn clear(&mut self) {}
}

macro_rules! tuple_observer {
    ($($name:ident),+) => {
        impl<K, V, $($name: IndexObserver<K, V>),+> IndexObserver<K, V> for ($($name,)+) {
            #[allow(non_snake_case)]
            fn observe(&mut self, key: &K, value: Option<&V>) {
                let ($($name,)+) = self;
                $($name.observe(key, value);)+
            }

            #[allow(non_snake_case)]
            fn clear(&mut self) {
                let ($($name,)+) = self;
                $($name.clear();)+
            }
        }
    };
}

tuple_observer!(A);
tuple_observer!(A, B);
tuple_observer!(A, B, C);
tuple_observer!(A, B, C, D);

/// Rows an entry contributes to an index.
pub type Extractor<K, V, IK, IV> = fn(&K, &V) -> Vec<(IK, IV)>;

/// A many-to-many index derived from store entries.
///
/// Each entry contributes `(index key, member)` rows through the extractor.
/// On change only that entry's rows are recomputed and diffed against what it
/// contributed before, so the cost is proportional to the rows of one entry.
/// Rows contributed by several entries are reference counted.
pub struct ReactiveIndex<K, V, IK, IV> {
    extractor: Extractor<K, V, IK, IV>,
    forward: HashMap<IK, IndexSet<IV>>,
    reverse: HashMap<IV, IndexSet<IK>>,
    row_counts: HashMap<(IK, IV), usize>,
    contributed: HashMap<K, Vec<(IK, IV)>>,
}

impl<K, V, IK, IV> ReactiveIndex<K, V, IK, IV>
where
    K: Eq + Hash + Clone,
    IK: Eq + Hash + Clone,
    IV: Eq + Hash + Clone,
{
    pub fn new(extractor: Extractor<K, V, IK, IV>) -> Self {
        Self {
            extractor,
            forward: HashMap::new(),
            reverse: HashMap::new(),
            row_counts: HashMap::new(),
            contributed: HashMap::new(),
        }
    }

    /// Members stored under `key`, in insertion order. Empty if none.
    pub fn lookup(&self, key: &IK) -> Vec<IV> {
        self.forward
            .get(key)
            .map(|bucket| bucket.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The first member stored under `key`.
    pub fn first(&self, key: &IK) -> Option<IV> {
        self.forward.get(key).and_then(|b| b.first()).cloned()
    }

    /// Index keys under which `member` is stored.
    pub fn reverse_lookup(&self, member: &IV) -> Vec<IK> {
        self.reverse
            .get(member)
            .map(|bucket| bucket.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains_key(&self, key: &IK) -> bool {
        self.forward.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &IK> {
        self.forward.keys()
    }

    /// Number of distinct index keys.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    fn add_row(&mut self, row: (IK, IV)) {
        let count = self.row_counts.entry(row.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            return;
        }
        let (key, member) = row;
        self.reverse
            .entry(member.clone())
            .or_default()
            .insert(key.clone());
        self.forward.entry(key).or_default().insert(member);
    }

    fn remove_row(&mut self, row: &(IK, IV)) {
        let Some(count) = self.row_counts.get_mut(row) else {
            return;
        };
        *count -= 1;
        if *count > 0 {
            return;
        }
        self.row_counts.remove(row);
        let (key, member) = row;
        if let Some(bucket) = self.forward.get_mut(key) {
            bucket.shift_remove(member);
            if bucket.is_empty() {
                self.forward.remove(key);
            }
        }
        if let Some(bucket) = self.reverse.get_mut(member) {
            bucket.shift_remove(key);
            if bucket.is_empty() {
                self.reverse.remove(member);
            }
        }
    }
}

impl<K, V, IK, IV> IndexObserver<K, V> for ReactiveIndex<K, V, IK, IV>
where
    K: Eq + Hash + Clone,
    IK: Eq + Hash + Clone,
    IV: Eq + Hash + Clone,
{
    fn observe(&mut self, key: &K, value: Option<&V>) {
        let mut rows: Vec<(IK, IV)> = Vec::new();
        if let Some(value) = value {
            for row in (self.extractor)(key, value) {
                if !rows.contains(&row) {
                    rows.push(row);
                }
            }
        }
        let previous = self.contributed.remove(key).unwrap_or_default();

        for row in previous.iter().filter(|row| !rows.contains(row)) {
            self.remove_row(row);
        }
        for row in rows.iter().filter(|row| !previous.contains(row)) {
            self.add_row(row.clone());
        }

        if !rows.is_empty() {
            self.contributed.insert(key.clone(), rows);
        }
    }

    fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
        self.row_counts.clear();
        self.contributed.clear();
    }
}
