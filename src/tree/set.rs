use allocator_api2::alloc::{ Allocator, Global };
use crate::{
    error::TreeResult,
    tree::{
        compare::{ CompareLess, KeyCompare },
        iter::Keys,
        rb_tree::Tree
    },
    utility::pair::Pair
};
use std::fmt::Debug;

/// Ordered set of unique keys (std::set), stored as a tree with unit values.
pub struct TreeSet<K, C = CompareLess, A = Global>
where A: Allocator
{
    tree: Tree<K, (), C, A>
}

impl<K> TreeSet<K, CompareLess, Global>
where K: Ord
{
    pub fn new() -> Self { Self { tree: Tree::new() } }
}

impl<K, C, A> TreeSet<K, C, A>
where A: Allocator
{
    pub fn with_compare_in(compare: C, alloc: A) -> Self { Self { tree: Tree::with_compare_in(compare, alloc) } }
    pub fn len(&self) -> usize { self.tree.len() }
    pub fn is_empty(&self) -> bool { self.tree.is_empty() }
    pub fn clear(&mut self) { self.tree.clear() }
    pub fn iter(&self) -> Keys<'_, K, ()> { self.tree.keys() }
    pub fn first(&self) -> Option<&K> { self.tree.begin().key() }
    pub fn last(&self) -> Option<&K> { self.tree.end().predecessor().key() }
    pub fn pop_first(&mut self) -> Option<K> { self.tree.pop_first().map(|p| p.into_parts().0) }
    pub fn pop_last(&mut self) -> Option<K> { self.tree.pop_last().map(|p| p.into_parts().0) }
    pub fn as_tree(&self) -> &Tree<K, (), C, A> { &self.tree }
}

impl<K, C, A> TreeSet<K, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    /// Returns whether the key was new.
    pub fn insert(&mut self, key: K) -> TreeResult<bool> {
        self.tree.insert_unique_pair(Pair::new(key, ())).map(|(_, rejected)| rejected.is_none())
    }
    pub fn contains(&self, key: &K) -> bool { self.tree.contains_key(key) }
    pub fn get(&self, key: &K) -> Option<&K> { self.tree.find(key).key() }
    pub fn remove(&mut self, key: &K) -> bool { self.tree.erase(key) > 0 }
    pub fn take(&mut self, key: &K) -> Option<K> { self.tree.remove_entry(key).map(|p| p.into_parts().0) }
    pub fn range(&self, lower: &K, upper: &K) -> impl DoubleEndedIterator<Item = &K> + '_ {
        self.tree.range(lower, upper).map(|(k, _)| k)
    }
}

impl<K, C> Default for TreeSet<K, C, Global>
where C: Default
{
    fn default() -> Self { Self { tree: Tree::default() } }
}

impl<K, C, A> Clone for TreeSet<K, C, A>
where K: Clone,
      C: Clone,
      A: Allocator + Clone
{
    fn clone(&self) -> Self { Self { tree: self.tree.clone() } }
}

impl<K, C, A> Debug for TreeSet<K, C, A>
where K: Debug,
      A: Allocator
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, C, A> PartialEq for TreeSet<K, C, A>
where K: PartialEq,
      A: Allocator
{
    fn eq(&self, other: &Self) -> bool { self.tree == other.tree }
}

impl<K, C, A> Extend<K> for TreeSet<K, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        for k in iter {
            if let Err(e) = self.insert(k) { e.abort() }
        }
    }
}

impl<K, C> FromIterator<K> for TreeSet<K, C, Global>
where C: KeyCompare<K> + Default
{
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<'a, K, C, A> IntoIterator for &'a TreeSet<K, C, A>
where A: Allocator
{
    type Item = &'a K;
    type IntoIter = Keys<'a, K, ()>;
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

#[cfg(test)]
pub mod tests {
    use crate::tree::compare::CompareGreater;
    use super::TreeSet;
    use std::error::Error;

    type TestReturn = Result<(), Box<dyn Error>>;

    #[test]
    pub fn set_basics() -> TestReturn {
        let mut set: TreeSet<u32> = TreeSet::new();
        assert!(set.insert(5)? && set.insert(1)? && set.insert(3)?, "New keys should insert");
        assert!(!set.insert(3)?, "Duplicate key should be rejected");
        assert!(set.len() == 3 && set.contains(&1) && !set.contains(&2), "Unexpected contents {:?}", set);
        assert!(set.first() == Some(&1) && set.last() == Some(&5), "Bounds should be 1 and 5");
        let keys: Vec<u32> = set.iter().copied().collect();
        assert!(keys == vec![1, 3, 5], "Keys should be sorted: {:?}", keys);
        assert!(set.remove(&3) && !set.remove(&3), "3 should be removed exactly once");
        assert!(set.pop_last() == Some(5) && set.pop_first() == Some(1), "Pops should drain both ends");
        assert!(set.is_empty(), "Set should be empty");
        set.as_tree().validate()?;
        Ok(())
    }

    #[test]
    pub fn set_with_reverse_order() -> TestReturn {
        let set: TreeSet<i64, CompareGreater> = [4, -2, 9, 4, 0].into_iter().collect();
        let keys: Vec<i64> = set.iter().copied().collect();
        assert!(keys == vec![9, 4, 0, -2], "Keys should be descending: {:?}", keys);
        let between: Vec<i64> = set.range(&9, &0).copied().collect();
        assert!(between == vec![9, 4], "range(9, 0) should follow the set order: {:?}", between);
        assert!(format!("{:?}", set) == "{9, 4, 0, -2}", "Unexpected debug output {:?}", set);
        Ok(())
    }
}
