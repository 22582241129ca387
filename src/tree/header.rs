use allocator_api2::alloc::Allocator;
use crate::{
    error::{ TreeError, TreeResult },
    tree::node::{ BasePtr, NodeBase, NodeColor }
};
use std::{
    alloc::Layout,
    ptr::NonNull
};

// Tree-wide anchor and end sentinel. The header is permanently red so that `decrement` can tell
// it apart from the (always black) root, which is the only other node whose parent's parent can
// point back at it.
//
//  parent -> root (null if empty)
//  left   -> leftmost node (self if empty)
//  right  -> rightmost node (self if empty)
//
// Lives in its own allocation, so moving the owning tree never invalidates root->parent.
#[repr(C)]
pub struct Header {
    base: NodeBase,
    node_count: usize
}

impl Header {
    const LAYOUT: Layout = Layout::new::<Self>();

    // _Tree_node::_Buyheadnode
    pub(crate) fn new_in<A: Allocator>(alloc: &A) -> TreeResult<NonNull<Self>> {
        let head = alloc.allocate(Self::LAYOUT)
            .map_err(|_| TreeError::AllocationFailed { layout: Self::LAYOUT })?
            .cast::<Self>();
        unsafe {
            std::ptr::write(head.as_ptr(), Self { base: NodeBase::new(NodeColor::Red), node_count: 0 });
            Self::reset(head.as_ptr());
        }
        Ok(head)
    }

    // SAFETY: every node hanging off the header must already be freed
    pub(crate) unsafe fn free_in<A: Allocator>(alloc: &A, this: NonNull<Self>) {
        alloc.deallocate(this.cast(), Self::LAYOUT);
    }

    pub(crate) fn sentinel(this: NonNull<Self>) -> BasePtr { this.as_ptr().cast() }

    /// Return to the empty self-loop state. Does not free anything.
    pub(crate) unsafe fn reset(this: *mut Self) {
        let s: BasePtr = this.cast();
        (*s).parent = std::ptr::null_mut();
        (*s).left = s;
        (*s).right = s;
        (*this).node_count = 0;
    }

    /// Transfer root, bounds and count from `from` into `this`, rewiring the root's back reference.
    /// `from` ends up empty. `this` must not own any nodes beforehand.
    pub(crate) unsafe fn move_data(this: *mut Self, from: *mut Self) {
        let (to, src): (BasePtr, BasePtr) = (this.cast(), from.cast());
        if (*src).parent.is_null() {
            Self::reset(this);
            return;
        }
        (*to).color = (*src).color;
        (*to).parent = (*src).parent;
        (*to).left = (*src).left;
        (*to).right = (*src).right;
        (*(*to).parent).parent = to;
        (*this).node_count = (*from).node_count;
        Self::reset(from);
    }

    pub fn len(&self) -> usize { self.node_count }
    pub fn is_empty(&self) -> bool { self.node_count == 0 }
    pub(crate) unsafe fn increment_count(this: *mut Self) { (*this).node_count += 1 }
    pub(crate) unsafe fn decrement_count(this: *mut Self) { (*this).node_count -= 1 }
    pub(crate) unsafe fn set_count(this: *mut Self, count: usize) { (*this).node_count = count }

    pub(crate) unsafe fn root(this: *mut Self) -> BasePtr { (*this.cast::<NodeBase>()).parent }
    pub(crate) unsafe fn leftmost(this: *mut Self) -> BasePtr { (*this.cast::<NodeBase>()).left }
    pub(crate) unsafe fn rightmost(this: *mut Self) -> BasePtr { (*this.cast::<NodeBase>()).right }
}
