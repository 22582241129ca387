use allocator_api2::alloc::Allocator;
use crate::{
    tree::{
        node::{ BasePtr, NodeBase, NodeColor, TreeNode },
        rb_tree::Tree
    },
    utility::pair::Pair
};
use std::{
    fmt::Debug,
    iter::FusedIterator,
    marker::PhantomData
};

// Positions form a ring: first -> ... -> last -> end -> first. Stepping never needs more memory
// than the current node pointer.
// SAFETY: sentinel is the header of a live tree, current is the sentinel or one of its nodes
pub(crate) unsafe fn step_next(current: BasePtr, sentinel: BasePtr) -> BasePtr {
    match current == sentinel {
        true => (*sentinel).left,
        false => NodeBase::increment(current)
    }
}

pub(crate) unsafe fn step_prev(current: BasePtr, sentinel: BasePtr) -> BasePtr {
    match current != sentinel && current == (*sentinel).left {
        true => sentinel,
        false => NodeBase::decrement(current)
    }
}

/// A read-only position in a tree: either an element or the end sentinel. Cursors are cheap to
/// copy and stay valid across any number of reads of the same tree.
pub struct Cursor<'a, K, V> {
    current: BasePtr,
    sentinel: BasePtr,
    _marker: PhantomData<&'a TreeNode<K, V>>
}

unsafe impl<'a, K: Sync, V: Sync> Send for Cursor<'a, K, V> {}
unsafe impl<'a, K: Sync, V: Sync> Sync for Cursor<'a, K, V> {}

impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self { *self }
}
impl<'a, K, V> Copy for Cursor<'a, K, V> {}

impl<'a, K, V> PartialEq for Cursor<'a, K, V> {
    fn eq(&self, other: &Self) -> bool { std::ptr::eq(self.current, other.current) }
}
impl<'a, K, V> Eq for Cursor<'a, K, V> {}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn new(current: BasePtr, sentinel: BasePtr) -> Self {
        Self { current, sentinel, _marker: PhantomData }
    }
    #[cfg(test)]
    pub(crate) fn node_ptr(&self) -> BasePtr { self.current }

    pub fn is_end(&self) -> bool { self.current == self.sentinel }

    fn node(&self) -> Option<&'a TreeNode<K, V>> {
        match self.is_end() {
            true => None,
            false => Some(unsafe { TreeNode::from_base(self.current) })
        }
    }
    pub fn pair(&self) -> Option<&'a Pair<K, V>> { self.node().map(|n| n.pair()) }
    pub fn key(&self) -> Option<&'a K> { self.node().map(|n| n.key()) }
    pub fn value(&self) -> Option<&'a V> { self.node().map(|n| n.value()) }
    pub fn entry(&self) -> Option<(&'a K, &'a V)> { self.node().map(|n| n.pair().parts()) }
    pub fn color(&self) -> Option<NodeColor> { self.node().map(|n| n.color()) }

    /// Step to the in-order successor. Stepping past the last element lands on the end
    /// position, stepping from the end wraps to the first element.
    pub fn move_next(&mut self) {
        self.current = unsafe { step_next(self.current, self.sentinel) };
    }
    /// Step to the in-order predecessor. From the end this is the last element, from the first
    /// element it is the end.
    pub fn move_prev(&mut self) {
        self.current = unsafe { step_prev(self.current, self.sentinel) };
    }
    pub fn successor(&self) -> Self {
        let mut out = *self;
        out.move_next();
        out
    }
    pub fn predecessor(&self) -> Self {
        let mut out = *self;
        out.move_prev();
        out
    }
    pub fn peek_next(&self) -> Option<(&'a K, &'a V)> { self.successor().entry() }
    pub fn peek_prev(&self) -> Option<(&'a K, &'a V)> { self.predecessor().entry() }

    /// Move `n` positions, backwards for negative `n`. The end position counts as a step.
    pub fn advance(&mut self, n: isize) {
        for _ in 0..n.unsigned_abs() {
            match n < 0 {
                true => self.move_prev(),
                false => self.move_next()
            }
        }
    }

    /// Number of `move_next` calls that take this cursor to `other`. Both cursors must belong to
    /// the same tree.
    pub fn distance_to(&self, other: &Self) -> usize {
        let mut steps = 0;
        let mut walk = *self;
        while walk != *other {
            walk.move_next();
            steps += 1;
        }
        steps
    }

    /// Iterate from this position up to (not including) `end`.
    pub fn until(self, end: Self) -> Range<'a, K, V> { Range::between(self, end) }
}

impl<'a, K, V> Debug for Cursor<'a, K, V>
where K: Debug,
      V: Debug
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.entry() {
            Some((k, v)) => f.debug_tuple("Cursor").field(k).field(v).finish(),
            None => f.write_str("Cursor(end)")
        }
    }
}

/// A position with exclusive access to its tree, able to modify the value it points at and to
/// remove it.
pub struct CursorMut<'a, K, V, C, A>
where A: Allocator
{
    current: BasePtr,
    tree: &'a mut Tree<K, V, C, A>
}

impl<'a, K, V, C, A> CursorMut<'a, K, V, C, A>
where A: Allocator
{
    pub(crate) fn new(current: BasePtr, tree: &'a mut Tree<K, V, C, A>) -> Self {
        Self { current, tree }
    }

    pub fn is_end(&self) -> bool { self.current == self.tree.sentinel() }

    pub fn as_cursor(&self) -> Cursor<'_, K, V> { Cursor::new(self.current, self.tree.sentinel()) }

    pub fn pair(&self) -> Option<&Pair<K, V>> { self.as_cursor().pair() }
    pub fn key(&self) -> Option<&K> { self.as_cursor().key() }
    pub fn value(&self) -> Option<&V> { self.as_cursor().value() }
    pub fn entry(&self) -> Option<(&K, &V)> { self.as_cursor().entry() }

    fn node_mut(&mut self) -> Option<&mut TreeNode<K, V>> {
        match self.is_end() {
            true => None,
            false => Some(unsafe { TreeNode::from_base_mut(self.current) })
        }
    }
    pub fn value_mut(&mut self) -> Option<&mut V> { self.node_mut().map(|n| n.value_mut()) }
    pub fn entry_mut(&mut self) -> Option<(&K, &mut V)> { self.node_mut().map(|n| n.pair_mut().parts_mut()) }

    pub fn into_value_mut(self) -> Option<&'a mut V> {
        match self.current == self.tree.sentinel() {
            true => None,
            false => Some(unsafe { TreeNode::<K, V>::from_base_mut(self.current) }.value_mut())
        }
    }

    pub fn move_next(&mut self) {
        self.current = unsafe { step_next(self.current, self.tree.sentinel()) };
    }
    pub fn move_prev(&mut self) {
        self.current = unsafe { step_prev(self.current, self.tree.sentinel()) };
    }
    pub fn peek_next(&self) -> Option<(&K, &V)> { self.as_cursor().peek_next() }
    pub fn peek_prev(&self) -> Option<(&K, &V)> { self.as_cursor().peek_prev() }

    /// Remove the element under the cursor and return it; the cursor moves on to the successor.
    /// Returns `None` at the end position.
    pub fn remove_current(&mut self) -> Option<Pair<K, V>> {
        if self.is_end() { return None; }
        let target = self.current;
        // node identities survive erasure, so the successor computed up front stays valid
        self.current = unsafe { step_next(target, self.tree.sentinel()) };
        Some(unsafe { self.tree.erase_node(target) })
    }
}

impl<'a, K, V, C, A> Debug for CursorMut<'a, K, V, C, A>
where K: Debug,
      V: Debug,
      A: Allocator
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.entry() {
            Some((k, v)) => f.debug_tuple("CursorMut").field(k).field(v).finish(),
            None => f.write_str("CursorMut(end)")
        }
    }
}

pub struct Iter<'a, K, V> {
    front: Cursor<'a, K, V>,
    back: Cursor<'a, K, V>,
    remaining: usize
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(first: Cursor<'a, K, V>, end: Cursor<'a, K, V>, len: usize) -> Self {
        Self { front: first, back: end, remaining: len }
    }
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self { Self { ..*self } }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 { return None; }
        self.remaining -= 1;
        let out = self.front.entry();
        self.front.move_next();
        out
    }
    fn size_hint(&self) -> (usize, Option<usize>) { (self.remaining, Some(self.remaining)) }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 { return None; }
        self.remaining -= 1;
        self.back.move_prev();
        self.back.entry()
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

pub struct IterMut<'a, K, V> {
    front: BasePtr,
    back: BasePtr,
    sentinel: BasePtr,
    remaining: usize,
    _marker: PhantomData<&'a mut TreeNode<K, V>>
}

unsafe impl<'a, K: Sync, V: Send> Send for IterMut<'a, K, V> {}
unsafe impl<'a, K: Sync, V: Sync> Sync for IterMut<'a, K, V> {}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(sentinel: BasePtr, len: usize) -> Self {
        Self {
            front: unsafe { (*sentinel).left },
            back: sentinel,
            sentinel,
            remaining: len,
            _marker: PhantomData
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 { return None; }
        self.remaining -= 1;
        let node = self.front;
        self.front = unsafe { step_next(node, self.sentinel) };
        // every node is handed out at most once
        Some(unsafe { TreeNode::<K, V>::from_base_mut(node) }.pair_mut().parts_mut())
    }
    fn size_hint(&self) -> (usize, Option<usize>) { (self.remaining, Some(self.remaining)) }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 { return None; }
        self.remaining -= 1;
        self.back = unsafe { step_prev(self.back, self.sentinel) };
        Some(unsafe { TreeNode::<K, V>::from_base_mut(self.back) }.pair_mut().parts_mut())
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}
impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}

/// Elements between two cursors, `[front, back)`.
pub struct Range<'a, K, V> {
    front: Cursor<'a, K, V>,
    back: Cursor<'a, K, V>
}

impl<'a, K, V> Range<'a, K, V> {
    /// `back` must not precede `front`
    pub fn between(front: Cursor<'a, K, V>, back: Cursor<'a, K, V>) -> Self {
        Self { front, back }
    }
    pub fn is_empty(&self) -> bool { self.front == self.back }
}

impl<'a, K, V> Clone for Range<'a, K, V> {
    fn clone(&self) -> Self { Self { ..*self } }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back { return None; }
        let out = self.front.entry()?;
        self.front.move_next();
        Some(out)
    }
}

impl<'a, K, V> DoubleEndedIterator for Range<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back { return None; }
        self.back.move_prev();
        self.back.entry()
    }
}

impl<'a, K, V> FusedIterator for Range<'a, K, V> {}

pub struct Keys<'a, K, V>(pub(crate) Iter<'a, K, V>);
impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    fn next(&mut self) -> Option<Self::Item> { self.0.next().map(|(k, _)| k) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}
impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> { self.0.next_back().map(|(k, _)| k) }
}
impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

pub struct Values<'a, K, V>(pub(crate) Iter<'a, K, V>);
impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<Self::Item> { self.0.next().map(|(_, v)| v) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}
impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> { self.0.next_back().map(|(_, v)| v) }
}
impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}

pub struct ValuesMut<'a, K, V>(pub(crate) IterMut<'a, K, V>);
impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;
    fn next(&mut self) -> Option<Self::Item> { self.0.next().map(|(_, v)| v) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}
impl<'a, K, V> DoubleEndedIterator for ValuesMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> { self.0.next_back().map(|(_, v)| v) }
}
impl<'a, K, V> ExactSizeIterator for ValuesMut<'a, K, V> {}

/// Owning iterator, each step unlinks the smallest (or largest) remaining element.
pub struct IntoIter<K, V, C, A>
where A: Allocator
{
    tree: Tree<K, V, C, A>
}

impl<K, V, C, A> IntoIter<K, V, C, A>
where A: Allocator
{
    pub(crate) fn new(tree: Tree<K, V, C, A>) -> Self { Self { tree } }
}

impl<K, V, C, A> Iterator for IntoIter<K, V, C, A>
where A: Allocator
{
    type Item = (K, V);
    fn next(&mut self) -> Option<Self::Item> { self.tree.pop_first().map(Pair::into_parts) }
    fn size_hint(&self) -> (usize, Option<usize>) { (self.tree.len(), Some(self.tree.len())) }
}

impl<K, V, C, A> DoubleEndedIterator for IntoIter<K, V, C, A>
where A: Allocator
{
    fn next_back(&mut self) -> Option<Self::Item> { self.tree.pop_last().map(Pair::into_parts) }
}

impl<K, V, C, A> ExactSizeIterator for IntoIter<K, V, C, A> where A: Allocator {}
impl<K, V, C, A> FusedIterator for IntoIter<K, V, C, A> where A: Allocator {}
