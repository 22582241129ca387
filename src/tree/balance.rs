// Rotations and red-black fixups. Everything in here works on bare links and colors, the payload
// is never touched, so node identity (and any cursor pointing at a node) survives rebalancing.
//
// SAFETY (for every function): `header` is the sentinel of a well formed tree and all other
// pointers are null or nodes of that tree.
use crate::tree::node::{ BasePtr, NodeBase, NodeColor, NodeDirection };
use log::trace;

//
//      p           p
//     /           /
//    n           r
//   / \    =>   / \
//  x   r       n   y
//     / \     / \
//    o  y    x   o
//
// NOTE: Assume that r and p are valid.
pub(crate) unsafe fn rotate_left(n: BasePtr, header: BasePtr) {
    trace!("rotate left at {:p}", n);
    let p = (*n).parent;
    let r = (*n).right;
    let o = (*r).left;
    (*n).right = o;
    if !o.is_null() { (*o).parent = n }
    (*r).left = n;
    (*n).parent = r;
    (*r).parent = p;
    replace_child(p, n, r, header);
}

//
//        p           p
//       /           /
//      n           r
//     / \    =>   / \
//    r   y       x   n
//   / \             / \
//  x  o            o  y
//
// NOTE: Assume that r and p are valid.
pub(crate) unsafe fn rotate_right(n: BasePtr, header: BasePtr) {
    trace!("rotate right at {:p}", n);
    let p = (*n).parent;
    let r = (*n).left;
    let o = (*r).right;
    (*n).left = o;
    if !o.is_null() { (*o).parent = n }
    (*r).right = n;
    (*n).parent = r;
    (*r).parent = p;
    replace_child(p, n, r, header);
}

// Rotating "left" moves n down to the left
pub(crate) unsafe fn rotate(n: BasePtr, dir: NodeDirection, header: BasePtr) {
    match dir {
        NodeDirection::Left => rotate_left(n, header),
        NodeDirection::Right => rotate_right(n, header)
    }
}

// Point whichever link of p referenced `old` at `new`. The header only owns the root through its
// parent link, its left/right are the min/max caches.
unsafe fn replace_child(p: BasePtr, old: BasePtr, new: BasePtr, header: BasePtr) {
    if p == header {
        (*header).parent = new;
    } else if (*p).left == old {
        (*p).left = new;
    } else {
        (*p).right = new;
    }
}

/// Link the fresh red leaf `x` under `p` and restore the red-black properties.
pub(crate) unsafe fn insert_and_rebalance(insert_left: bool, x: BasePtr, p: BasePtr, header: BasePtr) {
    (*x).parent = p;
    (*x).left = std::ptr::null_mut();
    (*x).right = std::ptr::null_mut();
    (*x).color = NodeColor::Red;
    if insert_left {
        // also sets header->left when p is the header (first node)
        (*p).left = x;
        if p == header {
            (*header).parent = x;
            (*header).right = x;
        } else if p == (*header).left {
            (*header).left = x;
        }
    } else {
        (*p).right = x;
        if p == (*header).right {
            (*header).right = x;
        }
    }
    post_insert_maintain_rbt(x, header);
}

unsafe fn post_insert_maintain_rbt(mut node: BasePtr, header: BasePtr) {
    // a red parent is never the root, so the grandparent is a real (black) node
    while node != (*header).parent && NodeBase::is_red((*node).parent) {
        let parent = (*node).parent;
        let grandparent = (*parent).parent;
        let side = NodeBase::direction(parent);
        let uncle = NodeBase::child(grandparent, side.opposite());
        if NodeBase::is_red(uncle) {
            trace!("insert fixup: red uncle, recolor and move up");
            (*parent).color = NodeColor::Black;
            (*uncle).color = NodeColor::Black;
            (*grandparent).color = NodeColor::Red;
            // travel up 2 tree levels
            node = grandparent;
        } else {
            // zig-zag: turn the inner grandchild into an outer one first
            if node == NodeBase::child(parent, side.opposite()) {
                trace!("insert fixup: inner grandchild");
                node = parent;
                rotate(node, side, header);
            }
            trace!("insert fixup: outer grandchild, rotate grandparent");
            (*(*node).parent).color = NodeColor::Black;
            (*grandparent).color = NodeColor::Red;
            rotate(grandparent, side.opposite(), header);
            break;
        }
    }
    (*(*header).parent).color = NodeColor::Black;
}

/// Unlink `z` from the tree and rebalance. Returns `z`, which the caller frees.
///
/// A node with two children is replaced by its in-order successor, which is relinked into z's
/// position (taking z's color). Payloads never move between nodes.
pub(crate) unsafe fn rebalance_for_erase(z: BasePtr, header: BasePtr) -> BasePtr {
    let mut y = z;
    let x: BasePtr;
    let x_parent: BasePtr;
    if (*y).left.is_null() {
        x = (*y).right;
    } else if (*y).right.is_null() {
        x = (*y).left;
    } else {
        y = NodeBase::minimum((*y).right);
        x = (*y).right;
    }

    if y != z {
        // successor y takes z's place, z's left subtree goes under y
        (*(*z).left).parent = y;
        (*y).left = (*z).left;
        if y != (*z).right {
            x_parent = (*y).parent;
            if !x.is_null() { (*x).parent = (*y).parent }
            (*(*y).parent).left = x;
            (*y).right = (*z).right;
            (*(*z).right).parent = y;
        } else {
            x_parent = y;
        }
        replace_child((*z).parent, z, y, header);
        (*y).parent = (*z).parent;
        std::mem::swap(&mut (*y).color, &mut (*z).color);
        // from here on y names the node that left the tree (z), carrying the color that was spliced out
        y = z;
    } else {
        x_parent = (*y).parent;
        if !x.is_null() { (*x).parent = (*y).parent }
        replace_child((*z).parent, z, x, header);
        if (*header).left == z {
            (*header).left = match (*z).right.is_null() {
                true => (*z).parent,
                false => NodeBase::minimum(x)
            };
        }
        if (*header).right == z {
            (*header).right = match (*z).left.is_null() {
                true => (*z).parent,
                false => NodeBase::maximum(x)
            };
        }
    }

    if (*y).color == NodeColor::Black {
        post_erase_maintain_rbt(x, x_parent, header);
    }
    y
}

// x is one black short. x may be null (an absent child), so its position is tracked via x_parent.
unsafe fn post_erase_maintain_rbt(mut x: BasePtr, mut x_parent: BasePtr, header: BasePtr) {
    while x != (*header).parent && NodeBase::is_black(x) {
        let side = match (*x_parent).left == x {
            true => NodeDirection::Left,
            false => NodeDirection::Right
        };
        let far = side.opposite();
        // x is short a black, so its sibling subtree holds at least one black: w exists
        let mut w = NodeBase::child(x_parent, far);
        if NodeBase::is_red(w) {
            trace!("erase fixup: red sibling");
            (*w).color = NodeColor::Black;
            (*x_parent).color = NodeColor::Red;
            rotate(x_parent, side, header);
            w = NodeBase::child(x_parent, far);
        }
        if NodeBase::is_black((*w).left) && NodeBase::is_black((*w).right) {
            trace!("erase fixup: black sibling with black children, move up");
            (*w).color = NodeColor::Red;
            x = x_parent;
            x_parent = (*x_parent).parent;
        } else {
            if NodeBase::is_black(NodeBase::child(w, far)) {
                trace!("erase fixup: near nephew red");
                (*NodeBase::child(w, side)).color = NodeColor::Black;
                (*w).color = NodeColor::Red;
                rotate(w, far, header);
                w = NodeBase::child(x_parent, far);
            }
            trace!("erase fixup: far nephew red");
            (*w).color = (*x_parent).color;
            (*x_parent).color = NodeColor::Black;
            let far_nephew = NodeBase::child(w, far);
            if !far_nephew.is_null() { (*far_nephew).color = NodeColor::Black }
            rotate(x_parent, side, header);
            break;
        }
    }
    if !x.is_null() { (*x).color = NodeColor::Black }
}

#[cfg(test)]
pub mod tests {
    use allocator_api2::alloc::Global;
    use crate::{
        tree::{
            header::Header,
            node::{ BasePtr, NodeBase, NodeColor, TreeNode }
        },
        utility::pair::Pair
    };
    use super::{ insert_and_rebalance, rebalance_for_erase, rotate_left, rotate_right };
    use std::error::Error;

    type TestReturn = Result<(), Box<dyn Error>>;
    type Node = TreeNode<u32, ()>;

    // Plain BST descent without any container around it: ties go right
    unsafe fn insert(header: BasePtr, key: u32) -> Result<BasePtr, Box<dyn Error>> {
        let node = Node::allocate_in(&Global, Pair::new(key, ()))?;
        let mut parent = header;
        let mut cur = (*header).parent;
        let mut left = true;
        while !cur.is_null() {
            parent = cur;
            left = key < *Node::key_of(cur);
            cur = if left { (*cur).left } else { (*cur).right };
        }
        insert_and_rebalance(parent == header || left, node, parent, header);
        Ok(node)
    }

    unsafe fn keys(header: BasePtr) -> Vec<u32> {
        let mut out = vec![];
        let mut cur = (*header).left;
        while cur != header {
            out.push(*Node::key_of(cur));
            cur = NodeBase::increment(cur);
        }
        out
    }

    #[test]
    pub fn rotations_preserve_order() -> TestReturn {
        let head = Header::new_in(&Global)?;
        let h = Header::sentinel(head);
        unsafe {
            let nodes: Vec<BasePtr> = [4, 2, 6, 1, 3, 5, 7].into_iter()
                .map(|k| insert(h, k))
                .collect::<Result<_, _>>()?;
            let root = (*h).parent;
            assert!(*Node::key_of(root) == 4, "Root should be 4");
            rotate_left(root, h);
            assert!(*Node::key_of((*h).parent) == 6, "Root should be 6 after rotating left");
            assert!((*(*h).parent).parent == h, "New root should link back to the header");
            assert!(keys(h) == vec![1, 2, 3, 4, 5, 6, 7], "Rotation must keep the in-order sequence");
            rotate_right((*h).parent, h);
            rotate_right((*h).parent, h);
            assert!(*Node::key_of((*h).parent) == 2, "Root should be 2 after rotating right twice");
            assert!(keys(h) == vec![1, 2, 3, 4, 5, 6, 7], "Rotation must keep the in-order sequence");
            for n in nodes { Node::destroy_in(&Global, n) }
            Header::free_in(&Global, head);
        }
        Ok(())
    }

    #[test]
    pub fn three_ascending_inserts() -> TestReturn {
        // 10, 20, 30 in order: single left rotation at 10
        //
        //      20B
        //     /   \
        //   10R   30R
        let head = Header::new_in(&Global)?;
        let h = Header::sentinel(head);
        unsafe {
            let n10 = insert(h, 10)?;
            let n20 = insert(h, 20)?;
            let n30 = insert(h, 30)?;
            assert!((*h).parent == n20, "20 should be the root");
            assert!((*n20).color == NodeColor::Black, "Root should be black");
            assert!((*n10).color == NodeColor::Red && (*n30).color == NodeColor::Red, "Leaves should be red");
            assert!((*n20).left == n10 && (*n20).right == n30, "10 and 30 should be children of 20");
            assert!((*h).left == n10 && (*h).right == n30, "Header should cache 10 and 30");

            // erase the root: successor 30 is spliced into its place
            let gone = rebalance_for_erase(n20, h);
            assert!(gone == n20, "The erased node should be handed back");
            assert!((*h).parent == n30, "30 should replace 20 as root");
            assert!((*n30).color == NodeColor::Black, "Replacement root should take the root's color");
            assert!((*n30).left == n10 && (*n10).parent == n30, "10 should hang off 30");
            assert!(keys(h) == vec![10, 30], "In-order keys should be 10, 30");
            Node::destroy_in(&Global, gone);

            let gone = rebalance_for_erase(n30, h);
            assert!((*h).parent == n10 && (*h).left == n10 && (*h).right == n10, "10 should be the only node");
            assert!((*n10).color == NodeColor::Black, "Last node should be black");
            Node::destroy_in(&Global, gone);

            let gone = rebalance_for_erase(n10, h);
            assert!((*h).parent.is_null(), "Tree should have no root");
            assert!((*h).left == h && (*h).right == h, "Header should be back in its self-loop state");
            Node::destroy_in(&Global, gone);
            Header::free_in(&Global, head);
        }
        Ok(())
    }
}
