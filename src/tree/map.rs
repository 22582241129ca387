use allocator_api2::alloc::{ Allocator, Global };
use crate::{
    error::TreeResult,
    tree::{
        compare::{ CompareLess, KeyCompare },
        iter::{ Iter, IterMut, Keys, Range, Values, ValuesMut },
        node::TreeNode,
        rb_tree::Tree
    },
    utility::pair::Pair
};
use std::{
    fmt::Debug,
    ops::Index
};

/// Ordered map with unique keys (std::map).
pub struct TreeMap<K, V, C = CompareLess, A = Global>
where A: Allocator
{
    tree: Tree<K, V, C, A>
}

impl<K, V> TreeMap<K, V, CompareLess, Global>
where K: Ord
{
    pub fn new() -> Self { Self { tree: Tree::new() } }
}

impl<K, V, C, A> TreeMap<K, V, C, A>
where A: Allocator
{
    pub fn with_compare_in(compare: C, alloc: A) -> Self { Self { tree: Tree::with_compare_in(compare, alloc) } }
    pub fn len(&self) -> usize { self.tree.len() }
    pub fn is_empty(&self) -> bool { self.tree.is_empty() }
    pub fn clear(&mut self) { self.tree.clear() }
    pub fn iter(&self) -> Iter<'_, K, V> { self.tree.iter() }
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> { self.tree.iter_mut() }
    pub fn keys(&self) -> Keys<'_, K, V> { self.tree.keys() }
    pub fn values(&self) -> Values<'_, K, V> { self.tree.values() }
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> { self.tree.values_mut() }
    pub fn first_key_value(&self) -> Option<(&K, &V)> { self.tree.first() }
    pub fn last_key_value(&self) -> Option<(&K, &V)> { self.tree.last() }
    pub fn pop_first(&mut self) -> Option<(K, V)> { self.tree.pop_first().map(Pair::into_parts) }
    pub fn pop_last(&mut self) -> Option<(K, V)> { self.tree.pop_last().map(Pair::into_parts) }
    pub fn as_tree(&self) -> &Tree<K, V, C, A> { &self.tree }
    pub fn as_tree_mut(&mut self) -> &mut Tree<K, V, C, A> { &mut self.tree }
    pub fn into_tree(self) -> Tree<K, V, C, A> { self.tree }
}

impl<K, V, C, A> TreeMap<K, V, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    /// Insert or overwrite. Returns the previous value for the key, if there was one; the
    /// previously stored key is kept.
    pub fn insert(&mut self, key: K, value: V) -> TreeResult<Option<V>> {
        let (node, rejected) = self.tree.insert_unique_pair(Pair::new(key, value))?;
        Ok(rejected.map(|pair| {
            // SAFETY: a rejected pair comes with the node holding the equivalent key
            let existing = unsafe { TreeNode::<K, V>::from_base_mut(node) };
            existing.pair_mut().replace_value(pair.into_value())
        }))
    }

    /// Insert only if the key is absent. Returns whether the value was stored.
    pub fn try_insert(&mut self, key: K, value: V) -> TreeResult<bool> {
        self.tree.insert_unique(key, value).map(|(_, inserted)| inserted)
    }

    pub fn get(&self, key: &K) -> Option<&V> { self.tree.get(key) }
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> { self.tree.get_mut(key) }
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> { self.tree.find(key).entry() }
    pub fn contains_key(&self, key: &K) -> bool { self.tree.contains_key(key) }
    pub fn remove(&mut self, key: &K) -> Option<V> { self.tree.remove_entry(key).map(Pair::into_value) }
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> { self.tree.remove_entry(key).map(Pair::into_parts) }
    pub fn range(&self, lower: &K, upper: &K) -> Range<'_, K, V> { self.tree.range(lower, upper) }
}

impl<K, V, C> Default for TreeMap<K, V, C, Global>
where C: Default
{
    fn default() -> Self { Self { tree: Tree::default() } }
}

impl<K, V, C, A> Clone for TreeMap<K, V, C, A>
where K: Clone,
      V: Clone,
      C: Clone,
      A: Allocator + Clone
{
    fn clone(&self) -> Self { Self { tree: self.tree.clone() } }
}

impl<K, V, C, A> Debug for TreeMap<K, V, C, A>
where K: Debug,
      V: Debug,
      A: Allocator
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.tree.fmt(f) }
}

impl<K, V, C, A> PartialEq for TreeMap<K, V, C, A>
where K: PartialEq,
      V: PartialEq,
      A: Allocator
{
    fn eq(&self, other: &Self) -> bool { self.tree == other.tree }
}

impl<K, V, C, A> Index<&K> for TreeMap<K, V, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    type Output = V;
    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key not present in TreeMap")
        }
    }
}

// Later values overwrite earlier ones for the same key
impl<K, V, C, A> Extend<(K, V)> for TreeMap<K, V, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            if let Err(e) = self.insert(k, v) { e.abort() }
        }
    }
}

impl<K, V, C> FromIterator<(K, V)> for TreeMap<K, V, C, Global>
where C: KeyCompare<K> + Default
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, C, A> IntoIterator for &'a TreeMap<K, V, C, A>
where A: Allocator
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter { self.tree.iter() }
}

impl<K, V, C, A> IntoIterator for TreeMap<K, V, C, A>
where A: Allocator
{
    type Item = (K, V);
    type IntoIter = crate::tree::iter::IntoIter<K, V, C, A>;
    fn into_iter(self) -> Self::IntoIter { self.tree.into_iter() }
}

/// Ordered map allowing several values per key (std::multimap). Values for one key iterate in
/// insertion order.
pub struct TreeMultiMap<K, V, C = CompareLess, A = Global>
where A: Allocator
{
    tree: Tree<K, V, C, A>
}

impl<K, V> TreeMultiMap<K, V, CompareLess, Global>
where K: Ord
{
    pub fn new() -> Self { Self { tree: Tree::new() } }
}

impl<K, V, C, A> TreeMultiMap<K, V, C, A>
where A: Allocator
{
    pub fn with_compare_in(compare: C, alloc: A) -> Self { Self { tree: Tree::with_compare_in(compare, alloc) } }
    pub fn len(&self) -> usize { self.tree.len() }
    pub fn is_empty(&self) -> bool { self.tree.is_empty() }
    pub fn clear(&mut self) { self.tree.clear() }
    pub fn iter(&self) -> Iter<'_, K, V> { self.tree.iter() }
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> { self.tree.iter_mut() }
    pub fn as_tree(&self) -> &Tree<K, V, C, A> { &self.tree }
}

impl<K, V, C, A> TreeMultiMap<K, V, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    pub fn insert(&mut self, key: K, value: V) -> TreeResult<()> {
        self.tree.insert_equal(key, value).map(|_| ())
    }
    pub fn count(&self, key: &K) -> usize { self.tree.count(key) }
    pub fn contains_key(&self, key: &K) -> bool { self.tree.contains_key(key) }
    /// Every value stored under `key`, oldest first.
    pub fn get_all(&self, key: &K) -> impl DoubleEndedIterator<Item = &V> + '_ {
        let (lo, hi) = self.tree.equal_range(key);
        lo.until(hi).map(|(_, v)| v)
    }
    pub fn remove_all(&mut self, key: &K) -> usize { self.tree.erase(key) }
    pub fn range(&self, lower: &K, upper: &K) -> Range<'_, K, V> { self.tree.range(lower, upper) }
}

impl<K, V, C> Default for TreeMultiMap<K, V, C, Global>
where C: Default
{
    fn default() -> Self { Self { tree: Tree::default() } }
}

impl<K, V, C, A> Debug for TreeMultiMap<K, V, C, A>
where K: Debug,
      V: Debug,
      A: Allocator
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.tree.fmt(f) }
}

impl<K, V, C, A> Extend<(K, V)> for TreeMultiMap<K, V, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            if let Err(e) = self.insert(k, v) { e.abort() }
        }
    }
}

impl<K, V, C> FromIterator<(K, V)> for TreeMultiMap<K, V, C, Global>
where C: KeyCompare<K> + Default
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}
