use std::collections::HashSet;
use std::hash::Hash;

/// Partition of two keyed collections into three disjoint sets.
///
/// `entering` and `continuing` follow the order of the new collection,
/// `exiting` follows the order of the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedDiff<K> {
    pub entering: Vec<K>,
    pub continuing: Vec<K>,
    pub exiting: Vec<K>,
}

impl<K> KeyedDiff<K> {
    pub fn is_unchanged(&self) -> bool {
        self.entering.is_empty() && self.exiting.is_empty()
    }
}

/// Compare the keys currently in a scene against the keys of the next data set.
pub fn diff_keyed<K, P, N>(previous: P, next: N) -> KeyedDiff<K>
where
    K: Eq + Hash + Clone,
    P: IntoIterator<Item = K>,
    N: IntoIterator<Item = K>,
{
    let previous: Vec<K> = previous.into_iter().collect();
    let next: Vec<K> = next.into_iter().collect();
    let before: HashSet<&K> = previous.iter().collect();
    let after: HashSet<&K> = next.iter().collect();

    let (continuing, entering): (Vec<K>, Vec<K>) =
        next.iter().cloned().partition(|key| before.contains(key));
    let exiting = previous.iter().filter(|key| !after.contains(key)).cloned().collect();

    KeyedDiff { entering, continuing, exiting }
}
