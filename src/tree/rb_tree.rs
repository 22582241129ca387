use allocator_api2::alloc::{ Allocator, Global };
use crate::{
    error::TreeResult,
    tree::{
        balance,
        compare::{ CompareLess, KeyCompare, KeyOrder },
        header::Header,
        iter::{ self, Cursor, CursorMut, IntoIter, Iter, IterMut, Keys, Range, Values, ValuesMut },
        node::{ BasePtr, NodeBase, NodeDirection, TreeNode }
    },
    utility::pair::Pair
};
use log::debug;
use std::{
    fmt::Debug,
    marker::PhantomData,
    ptr::NonNull
};

// Red-black tree keyed by K, storing Pair<K, V> payloads. The header (see header.rs) anchors the
// root and doubles as the end position; it is allocated separately so that moving a Tree value
// around is free.
pub struct Tree<K, V, C = CompareLess, A = Global>
where A: Allocator
{
    head: NonNull<Header>,
    order: KeyOrder<C>,
    _allocator: A,
    _marker: PhantomData<TreeNode<K, V>>
}

unsafe impl<K, V, C, A> Send for Tree<K, V, C, A>
where K: Send,
      V: Send,
      C: Send,
      A: Allocator + Send
{}

unsafe impl<K, V, C, A> Sync for Tree<K, V, C, A>
where K: Sync,
      V: Sync,
      C: Sync,
      A: Allocator + Sync
{}

impl<K, V> Tree<K, V, CompareLess, Global>
where K: Ord
{
    pub fn new() -> Self { Self::with_compare_in(CompareLess, Global) }
}

impl<K, V, C> Tree<K, V, C, Global> {
    pub fn with_compare(compare: C) -> Self { Self::with_compare_in(compare, Global) }
}

impl<K, V, C, A> Tree<K, V, C, A>
where A: Allocator
{
    pub fn new_in(alloc: A) -> Self
    where C: Default
    {
        Self::with_compare_in(C::default(), alloc)
    }

    pub fn with_compare_in(compare: C, alloc: A) -> Self {
        match Self::try_with_compare_in(compare, alloc) {
            Ok(v) => v,
            Err(e) => e.abort()
        }
    }

    pub fn try_with_compare_in(compare: C, alloc: A) -> TreeResult<Self> {
        let head = Header::new_in(&alloc)?;
        Ok(Self { head, order: KeyOrder::new(compare), _allocator: alloc, _marker: PhantomData })
    }

    pub fn len(&self) -> usize { self.header().len() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
    pub fn key_order(&self) -> &KeyOrder<C> { &self.order }
    pub fn allocator(&self) -> &A { &self._allocator }

    // SAFETY: self.head always points to the header allocated in try_with_compare_in
    fn header(&self) -> &Header { unsafe { self.head.as_ref() } }
    pub(crate) fn sentinel(&self) -> BasePtr { Header::sentinel(self.head) }
    pub(crate) fn root(&self) -> BasePtr { unsafe { Header::root(self.head.as_ptr()) } }
    fn leftmost(&self) -> BasePtr { unsafe { Header::leftmost(self.head.as_ptr()) } }

    pub fn begin(&self) -> Cursor<'_, K, V> { Cursor::new(self.leftmost(), self.sentinel()) }
    pub fn end(&self) -> Cursor<'_, K, V> { Cursor::new(self.sentinel(), self.sentinel()) }
    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V, C, A> {
        let first = self.leftmost();
        CursorMut::new(first, self)
    }
    pub fn end_mut(&mut self) -> CursorMut<'_, K, V, C, A> {
        let end = self.sentinel();
        CursorMut::new(end, self)
    }

    pub fn first(&self) -> Option<(&K, &V)> { self.begin().entry() }
    pub fn last(&self) -> Option<(&K, &V)> {
        let max = unsafe { Header::rightmost(self.head.as_ptr()) };
        Cursor::new(max, self.sentinel()).entry()
    }

    pub fn pop_first(&mut self) -> Option<Pair<K, V>> { self.begin_mut().remove_current() }
    pub fn pop_last(&mut self) -> Option<Pair<K, V>> {
        let mut cursor = self.end_mut();
        cursor.move_prev();
        cursor.remove_current()
    }

    pub fn iter(&self) -> Iter<'_, K, V> { Iter::new(self.begin(), self.end(), self.len()) }
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> { IterMut::new(self.sentinel(), self.len()) }
    pub fn keys(&self) -> Keys<'_, K, V> { Keys(self.iter()) }
    pub fn values(&self) -> Values<'_, K, V> { Values(self.iter()) }
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> { ValuesMut(self.iter_mut()) }

    /// Free every node and return to the empty state.
    pub fn clear(&mut self) {
        // a partially built clone has a root but no count yet
        if self.root().is_null() { return; }
        debug!("clearing {} nodes", self.len());
        unsafe {
            self.erase_subtree(self.root());
            Header::reset(self.head.as_ptr());
        }
    }

    // Post-order release without rebalancing; recursion only follows right links, so its depth
    // is bounded by the tree height.
    unsafe fn erase_subtree(&self, mut x: BasePtr) {
        while !x.is_null() {
            self.erase_subtree((*x).right);
            let left = (*x).left;
            TreeNode::<K, V>::destroy_in(&self._allocator, x);
            x = left;
        }
    }

    /// Move every element into a new tree, leaving this one empty. If the new header cannot be
    /// allocated this tree keeps all of its elements.
    pub fn take(&mut self) -> TreeResult<Self>
    where C: Clone,
          A: Clone
    {
        let new = Self::try_with_compare_in(self.order.comparator().clone(), self._allocator.clone())?;
        debug!("moving {} nodes into a new tree", self.len());
        unsafe { Header::move_data(new.head.as_ptr(), self.head.as_ptr()) };
        Ok(new)
    }

    pub fn swap(&mut self, other: &mut Self) {
        debug!("swapping trees of {} and {} nodes", self.len(), other.len());
        std::mem::swap(self, other);
    }

    // SAFETY: z must be a node of this tree (not the header)
    pub(crate) unsafe fn erase_node(&mut self, z: BasePtr) -> Pair<K, V> {
        let node = balance::rebalance_for_erase(z, self.sentinel());
        Header::decrement_count(self.head.as_ptr());
        TreeNode::take_in(&self._allocator, node)
    }

    // Allocation comes first so that a failure leaves the tree untouched.
    fn link_new(&mut self, parent: BasePtr, insert_left: bool, pair: Pair<K, V>) -> TreeResult<BasePtr> {
        let node = TreeNode::allocate_in(&self._allocator, pair)?;
        unsafe {
            balance::insert_and_rebalance(insert_left, node, parent, self.sentinel());
            Header::increment_count(self.head.as_ptr());
        }
        Ok(node)
    }
}

impl<K, V, C, A> Tree<K, V, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    fn key_at(&self, n: BasePtr) -> &K { unsafe { TreeNode::<K, V>::key_of(n) } }

    // First node whose key does not precede `key`, or the header
    fn lower_bound_node(&self, key: &K) -> BasePtr {
        let mut x = self.root();
        let mut y = self.sentinel();
        while !x.is_null() {
            if !self.order.precedes(self.key_at(x), key) {
                y = x;
                x = unsafe { (*x).left };
            } else {
                x = unsafe { (*x).right };
            }
        }
        y
    }

    // First node whose key `key` precedes, or the header
    fn upper_bound_node(&self, key: &K) -> BasePtr {
        let mut x = self.root();
        let mut y = self.sentinel();
        while !x.is_null() {
            if self.order.precedes(key, self.key_at(x)) {
                y = x;
                x = unsafe { (*x).left };
            } else {
                x = unsafe { (*x).right };
            }
        }
        y
    }

    fn find_node(&self, key: &K) -> BasePtr {
        let j = self.lower_bound_node(key);
        match j == self.sentinel() || self.order.precedes(key, self.key_at(j)) {
            true => self.sentinel(),
            false => j
        }
    }

    /// Position of the first element equivalent to `key`, or the end position.
    pub fn find(&self, key: &K) -> Cursor<'_, K, V> { Cursor::new(self.find_node(key), self.sentinel()) }
    pub fn find_mut(&mut self, key: &K) -> CursorMut<'_, K, V, C, A> {
        let node = self.find_node(key);
        CursorMut::new(node, self)
    }
    pub fn contains_key(&self, key: &K) -> bool { !self.find(key).is_end() }
    pub fn get(&self, key: &K) -> Option<&V> { self.find(key).value() }
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> { self.find_mut(key).into_value_mut() }

    pub fn lower_bound(&self, key: &K) -> Cursor<'_, K, V> {
        Cursor::new(self.lower_bound_node(key), self.sentinel())
    }
    pub fn upper_bound(&self, key: &K) -> Cursor<'_, K, V> {
        Cursor::new(self.upper_bound_node(key), self.sentinel())
    }
    pub fn lower_bound_mut(&mut self, key: &K) -> CursorMut<'_, K, V, C, A> {
        let node = self.lower_bound_node(key);
        CursorMut::new(node, self)
    }
    pub fn upper_bound_mut(&mut self, key: &K) -> CursorMut<'_, K, V, C, A> {
        let node = self.upper_bound_node(key);
        CursorMut::new(node, self)
    }
    pub fn equal_range(&self, key: &K) -> (Cursor<'_, K, V>, Cursor<'_, K, V>) {
        (self.lower_bound(key), self.upper_bound(key))
    }
    pub fn count(&self, key: &K) -> usize {
        let (lo, hi) = self.equal_range(key);
        lo.distance_to(&hi)
    }
    /// Elements with keys in `[lower, upper)`.
    pub fn range(&self, lower: &K, upper: &K) -> Range<'_, K, V> {
        let front = self.lower_bound(lower);
        match self.order.precedes(upper, lower) {
            // an inverted range is empty rather than wrapping around the end
            true => Range::between(front, front),
            false => Range::between(front, self.lower_bound(upper))
        }
    }

    // Ok((parent, insert_left)) for a new key, Err(node) for the node already holding it
    fn get_insert_unique_pos(&self, key: &K) -> Result<(BasePtr, bool), BasePtr> {
        let mut x = self.root();
        let mut y = self.sentinel();
        let mut went_left = true;
        while !x.is_null() {
            y = x;
            went_left = self.order.precedes(key, self.key_at(x));
            x = unsafe { NodeBase::child(x, if went_left { NodeDirection::Left } else { NodeDirection::Right }) };
        }
        // the only candidate for an equivalent key is the in-order predecessor of the insertion point
        let mut j = y;
        if went_left {
            if j == self.leftmost() { return Ok((y, true)); }
            j = unsafe { NodeBase::decrement(j) };
        }
        match self.order.precedes(self.key_at(j), key) {
            true => Ok((y, went_left)),
            false => Err(j)
        }
    }

    // Equal keys descend to the right, so a new key lands after every equivalent one
    fn get_insert_equal_pos(&self, key: &K) -> (BasePtr, bool) {
        let mut x = self.root();
        let mut y = self.sentinel();
        while !x.is_null() {
            y = x;
            x = match self.order.precedes(key, self.key_at(x)) {
                true => unsafe { (*x).left },
                false => unsafe { (*x).right }
            };
        }
        let insert_left = y == self.sentinel() || self.order.precedes(key, self.key_at(y));
        (y, insert_left)
    }

    // Hands back the pair that was not inserted, if any
    pub(crate) fn insert_unique_pair(&mut self, pair: Pair<K, V>) -> TreeResult<(BasePtr, Option<Pair<K, V>>)> {
        match self.get_insert_unique_pos(pair.get_key()) {
            Ok((parent, insert_left)) => Ok((self.link_new(parent, insert_left, pair)?, None)),
            Err(existing) => Ok((existing, Some(pair)))
        }
    }

    /// Insert unless an equivalent key already exists. Returns the position of the element with
    /// that key and whether it was inserted; a rejected key and value are dropped.
    pub fn insert_unique(&mut self, key: K, value: V) -> TreeResult<(CursorMut<'_, K, V, C, A>, bool)> {
        let (node, rejected) = self.insert_unique_pair(Pair::new(key, value))?;
        Ok((CursorMut::new(node, self), rejected.is_none()))
    }

    /// Always insert, after any elements with an equivalent key.
    pub fn insert_equal(&mut self, key: K, value: V) -> TreeResult<CursorMut<'_, K, V, C, A>> {
        let (parent, insert_left) = self.get_insert_equal_pos(&key);
        let node = self.link_new(parent, insert_left, Pair::new(key, value))?;
        Ok(CursorMut::new(node, self))
    }

    /// Remove every element equivalent to `key`, returning how many were removed.
    pub fn erase(&mut self, key: &K) -> usize {
        let lo = self.lower_bound_node(key);
        let hi = self.upper_bound_node(key);
        if lo == self.leftmost() && hi == self.sentinel() {
            let count = self.len();
            self.clear();
            return count;
        }
        let mut count = 0;
        let mut current = lo;
        while current != hi {
            unsafe {
                let next = iter::step_next(current, self.sentinel());
                self.erase_node(current);
                current = next;
            }
            count += 1;
        }
        count
    }

    /// Remove the first element equivalent to `key`.
    pub fn remove_entry(&mut self, key: &K) -> Option<Pair<K, V>> {
        self.find_mut(key).remove_current()
    }
}

impl<K, V, C, A> Tree<K, V, C, A>
where K: Clone,
      V: Clone,
      C: Clone,
      A: Allocator + Clone
{
    /// Structural copy: same shape and colors, no comparisons or rebalancing.
    pub fn try_clone(&self) -> TreeResult<Self> {
        let mut new = Self::try_with_compare_in(self.order.comparator().clone(), self._allocator.clone())?;
        if self.is_empty() { return Ok(new); }
        let dst = new.sentinel();
        unsafe {
            // every copied node is linked before the next allocation, so on failure `new` is a
            // well formed (if lopsided) tree and its Drop frees what was copied
            let src = self.root();
            let root = TreeNode::allocate_in(&new._allocator, TreeNode::<K, V>::from_base(src).pair().clone())?;
            (*root).color = (*src).color;
            (*root).parent = dst;
            (*dst).parent = root;
            new.clone_children(src, root)?;
            (*dst).left = NodeBase::minimum(root);
            (*dst).right = NodeBase::maximum(root);
            Header::set_count(new.head.as_ptr(), self.len());
        }
        Ok(new)
    }

    unsafe fn clone_children(&mut self, src: BasePtr, dst: BasePtr) -> TreeResult<()> {
        for dir in [NodeDirection::Left, NodeDirection::Right] {
            let child = NodeBase::child(src, dir);
            if child.is_null() { continue; }
            let copy = TreeNode::allocate_in(&self._allocator, TreeNode::<K, V>::from_base(child).pair().clone())?;
            (*copy).color = (*child).color;
            (*copy).parent = dst;
            NodeBase::set_child(dst, dir, copy);
            self.clone_children(child, copy)?;
        }
        Ok(())
    }
}

impl<K, V, C, A> Clone for Tree<K, V, C, A>
where K: Clone,
      V: Clone,
      C: Clone,
      A: Allocator + Clone
{
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(v) => v,
            Err(e) => e.abort()
        }
    }
}

impl<K, V, C, A> Drop for Tree<K, V, C, A>
where A: Allocator
{
    fn drop(&mut self) {
        self.clear();
        // SAFETY: This is the last time that the header can be accessed
        unsafe { Header::free_in(&self._allocator, self.head) };
    }
}

impl<K, V, C> Default for Tree<K, V, C, Global>
where C: Default
{
    fn default() -> Self { Self::with_compare(C::default()) }
}

impl<K, V, C, A> Debug for Tree<K, V, C, A>
where K: Debug,
      V: Debug,
      A: Allocator
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C, A> PartialEq for Tree<K, V, C, A>
where K: PartialEq,
      V: PartialEq,
      A: Allocator
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V, C, A> Eq for Tree<K, V, C, A>
where K: Eq,
      V: Eq,
      A: Allocator
{}

// Keeps the first of several equivalent keys, matching insert_unique
impl<K, V, C, A> Extend<(K, V)> for Tree<K, V, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            if let Err(e) = self.insert_unique_pair(Pair::new(k, v)) { e.abort() }
        }
    }
}

impl<K, V, C> FromIterator<(K, V)> for Tree<K, V, C, Global>
where C: KeyCompare<K> + Default
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<'a, K, V, C, A> IntoIterator for &'a Tree<K, V, C, A>
where A: Allocator
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl<'a, K, V, C, A> IntoIterator for &'a mut Tree<K, V, C, A>
where A: Allocator
{
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter { self.iter_mut() }
}

impl<K, V, C, A> IntoIterator for Tree<K, V, C, A>
where A: Allocator
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, C, A>;
    fn into_iter(self) -> Self::IntoIter { IntoIter::new(self) }
}
