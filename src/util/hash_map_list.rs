use std::{collections::HashMap, hash::Hash};

/// Simple wrapper to make functionality easier for interfacing with `HashMap<K, Vec<V>>`. Key
/// collisions append the value to the [Vec] for that key rather than overwriting it, which is what
/// allows several watchers to observe the same state path.
///
/// Iteration visits keys in the order they were first inserted, so watchers always run in the
/// order they were registered.
pub struct HashMapList<K, V> {
    values: HashMap<K, Vec<V>>,
    order: Vec<K>,
}

impl<K, V> HashMapList<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty [HashMapList].
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Retrieves the values stored against a key, in insertion order. Will return [None] if
    /// nothing has been inserted for the key.
    pub fn get(&self, k: &K) -> Option<&[V]> {
        self.values.get(k).map(|v| v.as_slice())
    }

    /// Inserts a value with a given key into the collection. If there is no existing [Vec] for the
    /// key, an empty one will be initialised before the value is inserted.
    pub fn insert(&mut self, k: K, v: V) {
        if !self.values.contains_key(&k) {
            self.order.push(k.clone());
        }

        self.values.entry(k).or_default().push(v);
    }

    /// Iterate every `(key, value)` pair, visiting all values of one key before moving on.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            keys: self.order.iter(),
            current: None,
        }
    }
}

impl<K, V> Default for HashMapList<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K, V> IntoIterator for &'a HashMapList<K, V>
where
    K: Eq + Hash + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

pub struct Iter<'a, K, V> {
    list: &'a HashMapList<K, V>,
    keys: std::slice::Iter<'a, K>,
    current: Option<(&'a K, std::slice::Iter<'a, V>)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Eq + Hash + Clone,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, values)) = self.current.as_mut() {
                if let Some(value) = values.next() {
                    return Some((*key, value));
                }
            }

            // Current list exhausted, move to the next key
            let key = self.keys.next()?;
            let values = self.list.get(key).unwrap_or_default();
            self.current = Some((key, values.iter()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collisions_append() {
        let mut list = HashMapList::new();
        list.insert("count", 1);
        list.insert("count", 2);
        list.insert("name", 3);

        assert_eq!(list.get(&"count"), Some(&[1, 2][..]));
        assert_eq!(list.get(&"missing"), None);
    }

    #[test]
    fn iterates_in_first_insertion_order() {
        let mut list = HashMapList::new();
        for (i, key) in ["m", "z", "a", "m", "q", "b", "z"].into_iter().enumerate() {
            list.insert(key, i);
        }

        assert_eq!(
            list.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
            vec![("m", 0), ("m", 3), ("z", 1), ("z", 6), ("a", 2), ("q", 4), ("b", 5)]
        );
    }

    #[test]
    fn empty_iterates_nothing() {
        let list = HashMapList::<&str, usize>::default();
        assert_eq!(list.iter().count(), 0);
    }
}
