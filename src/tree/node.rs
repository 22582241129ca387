use allocator_api2::alloc::Allocator;
use crate::{
    error::{ TreeError, TreeResult },
    utility::pair::Pair
};
use std::{
    alloc::Layout,
    ptr::NonNull
};

pub(crate) type BasePtr = *mut NodeBase;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeColor {
    Red = 0,
    Black
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeDirection {
    Left = 0,
    Right
}

impl NodeDirection {
    pub fn opposite(self) -> Self {
        match self {
            NodeDirection::Left => NodeDirection::Right,
            NodeDirection::Right => NodeDirection::Left
        }
    }
}

// Link part shared by every tree node and by the header. Absent children are null and count as
// black. The root's parent is the header, the header's parent is the root (null when empty).
#[repr(C)]
#[derive(Debug)]
pub struct NodeBase {
    pub(crate) color: NodeColor,
    pub(crate) parent: BasePtr,
    pub(crate) left: BasePtr,
    pub(crate) right: BasePtr
}

impl NodeBase {
    pub(crate) const fn new(color: NodeColor) -> Self {
        Self {
            color,
            parent: std::ptr::null_mut(),
            left: std::ptr::null_mut(),
            right: std::ptr::null_mut()
        }
    }
    pub fn color(&self) -> NodeColor { self.color }

    // SAFETY (for everything below): pointers must be null or point to live nodes of one tree

    pub(crate) unsafe fn is_red(n: BasePtr) -> bool {
        !n.is_null() && (*n).color == NodeColor::Red
    }
    pub(crate) unsafe fn is_black(n: BasePtr) -> bool { !Self::is_red(n) }

    pub(crate) unsafe fn child(n: BasePtr, dir: NodeDirection) -> BasePtr {
        match dir {
            NodeDirection::Left => (*n).left,
            NodeDirection::Right => (*n).right
        }
    }
    pub(crate) unsafe fn set_child(n: BasePtr, dir: NodeDirection, child: BasePtr) {
        match dir {
            NodeDirection::Left => (*n).left = child,
            NodeDirection::Right => (*n).right = child
        }
    }
    // NOTE: Assume that n->parent is valid
    pub(crate) unsafe fn direction(n: BasePtr) -> NodeDirection {
        match (*(*n).parent).left == n {
            true => NodeDirection::Left,
            false => NodeDirection::Right
        }
    }

    // NOTE: n must not be null
    pub(crate) unsafe fn minimum(mut n: BasePtr) -> BasePtr {
        while !(*n).left.is_null() { n = (*n).left }
        n
    }
    pub(crate) unsafe fn maximum(mut n: BasePtr) -> BasePtr {
        while !(*n).right.is_null() { n = (*n).right }
        n
    }

    // In-order successor. Returns the header after the maximum node. n must be a real node (not
    // the header).
    pub(crate) unsafe fn increment(mut n: BasePtr) -> BasePtr {
        if !(*n).right.is_null() {
            return Self::minimum((*n).right);
        }
        let mut parent = (*n).parent;
        while n == (*parent).right {
            n = parent;
            parent = (*parent).parent;
        }
        // climbing out of the root ends at the header, whose parent is the root. If the root had
        // no right subtree, n is already the header at this point.
        if (*n).right != parent { n = parent }
        n
    }

    // In-order predecessor. The header (red, and its parent's parent is itself) steps back to the
    // cached maximum, which is the header again for an empty tree.
    pub(crate) unsafe fn decrement(mut n: BasePtr) -> BasePtr {
        if (*n).color == NodeColor::Red
            && ((*n).parent.is_null() || (*(*n).parent).parent == n) {
            return (*n).right;
        }
        if !(*n).left.is_null() {
            return Self::maximum((*n).left);
        }
        let mut parent = (*n).parent;
        while n == (*parent).left {
            n = parent;
            parent = (*parent).parent;
        }
        parent
    }
}

#[repr(C)]
pub struct TreeNode<K, V> {
    base: NodeBase,
    data: Pair<K, V>
}

impl<K, V> TreeNode<K, V> {
    const LAYOUT: Layout = Layout::new::<Self>();

    // _Tree_node::_Buynode. Nodes start out red and unlinked.
    pub(crate) fn allocate_in<A: Allocator>(alloc: &A, data: Pair<K, V>) -> TreeResult<BasePtr> {
        let node = match alloc.allocate(Self::LAYOUT) {
            Ok(v) => v.cast::<Self>().as_ptr(),
            Err(_) => {
                log::warn!("node allocation of {} bytes failed", Self::LAYOUT.size());
                return Err(TreeError::AllocationFailed { layout: Self::LAYOUT })
            }
        };
        unsafe { std::ptr::write(node, Self { base: NodeBase::new(NodeColor::Red), data }) };
        Ok(node.cast())
    }

    // SAFETY: node must come from allocate_in with the same allocator and be unlinked
    pub(crate) unsafe fn take_in<A: Allocator>(alloc: &A, node: BasePtr) -> Pair<K, V> {
        let node = node.cast::<Self>();
        let data = std::ptr::read(&raw const (*node).data);
        alloc.deallocate(NonNull::new_unchecked(node).cast(), Self::LAYOUT);
        data
    }

    pub(crate) unsafe fn destroy_in<A: Allocator>(alloc: &A, node: BasePtr) {
        drop(Self::take_in::<A>(alloc, node));
    }

    // SAFETY: n must point to a TreeNode<K, V>, never to the header
    pub(crate) unsafe fn from_base<'a>(n: BasePtr) -> &'a Self { &*n.cast::<Self>() }
    pub(crate) unsafe fn from_base_mut<'a>(n: BasePtr) -> &'a mut Self { &mut *n.cast::<Self>() }
    pub(crate) unsafe fn key_of<'a>(n: BasePtr) -> &'a K
    where V: 'a
    {
        Self::from_base(n).data.get_key()
    }

    pub fn color(&self) -> NodeColor { self.base.color }
    pub fn pair(&self) -> &Pair<K, V> { &self.data }
    pub fn pair_mut(&mut self) -> &mut Pair<K, V> { &mut self.data }
    pub fn key(&self) -> &K { self.data.get_key() }
    pub fn value(&self) -> &V { self.data.get_value() }
    pub fn value_mut(&mut self) -> &mut V { self.data.get_value_mut() }
}
