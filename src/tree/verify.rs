use allocator_api2::alloc::Allocator;
use crate::{
    error::{ TreeResult, Violation },
    tree::{
        compare::KeyCompare,
        node::{ BasePtr, NodeBase, NodeColor },
        rb_tree::Tree
    }
};
use log::trace;

impl<K, V, C, A> Tree<K, V, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    /// Walk the whole tree and check every structural rule: black root, no red node with a red
    /// child, equal black height on all root-to-leaf paths, consistent parent links, correct
    /// header caches and count, and non-decreasing key order. Returns the black height (root
    /// counted, empty children not).
    pub fn validate(&self) -> TreeResult<usize> {
        let head = self.sentinel();
        let root = self.root();
        let black_height = unsafe {
            if root.is_null() {
                if (*head).left != head || (*head).right != head { return Err(Violation::EmptyHeader.into()); }
                if self.len() != 0 { return Err(Violation::Count { counted: self.len(), found: 0 }.into()); }
                return Ok(0);
            }
            if (*root).color != NodeColor::Black { return Err(Violation::RedRoot.into()); }
            if (*root).parent != head { return Err(Violation::RootLink.into()); }
            let mut found = 0;
            let black_height = check_subtree(root, 0, &mut found)?;
            if found != self.len() {
                return Err(Violation::Count { counted: self.len(), found }.into());
            }
            if (*head).left != NodeBase::minimum(root) { return Err(Violation::Leftmost.into()); }
            if (*head).right != NodeBase::maximum(root) { return Err(Violation::Rightmost.into()); }
            black_height
        };
        let mut keys = self.keys();
        if let Some(mut prev) = keys.next() {
            for (index, key) in keys.enumerate() {
                if self.key_order().precedes(key, prev) {
                    return Err(Violation::Order { index: index + 1 }.into());
                }
                prev = key;
            }
        }
        trace!("validated {} nodes, black height {}", self.len(), black_height);
        Ok(black_height)
    }
}

// Black height of the subtree at n, or the first violation found below it
unsafe fn check_subtree(n: BasePtr, depth: usize, found: &mut usize) -> TreeResult<usize> {
    if n.is_null() { return Ok(0); }
    *found += 1;
    let (left, right) = ((*n).left, (*n).right);
    for child in [left, right] {
        if child.is_null() { continue; }
        if (*child).parent != n { return Err(Violation::ParentLink { depth: depth + 1 }.into()); }
        if (*n).color == NodeColor::Red && (*child).color == NodeColor::Red {
            return Err(Violation::RedRed { depth }.into());
        }
    }
    let expected = check_subtree(left, depth + 1, found)?;
    let right_height = check_subtree(right, depth + 1, found)?;
    if expected != right_height {
        return Err(Violation::BlackHeight { depth, expected, found: right_height }.into());
    }
    Ok(expected + NodeBase::is_black(n) as usize)
}

unsafe fn depth_of(n: BasePtr) -> usize {
    match n.is_null() {
        true => 0,
        false => 1 + depth_of((*n).left).max(depth_of((*n).right))
    }
}

impl<K, V, C, A> Tree<K, V, C, A>
where A: Allocator
{
    /// Number of nodes on the longest root-to-leaf path (0 for an empty tree).
    pub fn height(&self) -> usize { unsafe { depth_of(self.root()) } }
}

#[cfg(test)]
pub mod tests {
    use crate::{
        error::{ TreeError, Violation },
        tree::{ node::NodeColor, rb_tree::Tree }
    };
    use std::error::Error;

    type TestReturn = Result<(), Box<dyn Error>>;

    fn sample() -> Result<Tree<u32, ()>, Box<dyn Error>> {
        let mut tree = Tree::new();
        for k in 1..=15 { tree.insert_unique(k, ())?; }
        Ok(tree)
    }

    #[test]
    pub fn valid_trees() -> TestReturn {
        let empty: Tree<u32, ()> = Tree::new();
        assert!(empty.validate()? == 0 && empty.height() == 0, "Empty tree has no height");
        let tree = sample()?;
        let black_height = tree.validate()?;
        assert!(black_height >= 2, "15 nodes need a black height of at least 2, got {}", black_height);
        // longest path is at most twice the black height
        assert!(tree.height() <= 2 * black_height, "Height {} exceeds twice the black height", tree.height());
        Ok(())
    }

    #[test]
    pub fn detect_red_root() -> TestReturn {
        let tree = sample()?;
        unsafe { (*tree.root()).color = NodeColor::Red };
        let result = tree.validate();
        unsafe { (*tree.root()).color = NodeColor::Black };
        assert!(result == Err(TreeError::InvariantViolation(Violation::RedRoot)), "Expected a red root error: {:?}", result);
        Ok(())
    }

    #[test]
    pub fn detect_black_height_mismatch() -> TestReturn {
        let tree = sample()?;
        let node = tree.find(&1).node_ptr();
        let old = unsafe { (*node).color };
        // flipping a leaf changes the black height of exactly one path
        unsafe { (*node).color = if old == NodeColor::Red { NodeColor::Black } else { NodeColor::Red } };
        let result = tree.validate();
        unsafe { (*node).color = old };
        assert!(matches!(result, Err(TreeError::InvariantViolation(Violation::BlackHeight { .. }))
            | Err(TreeError::InvariantViolation(Violation::RedRed { .. }))),
            "Recoloring a leaf should break the tree: {:?}", result);
        tree.validate()?;
        Ok(())
    }

    #[test]
    pub fn detect_stale_leftmost() -> TestReturn {
        let tree = sample()?;
        let head = tree.sentinel();
        let old = unsafe { (*head).left };
        unsafe { (*head).left = tree.find(&2).node_ptr() };
        let result = tree.validate();
        unsafe { (*head).left = old };
        assert!(result == Err(TreeError::InvariantViolation(Violation::Leftmost)), "Expected a leftmost error: {:?}", result);
        Ok(())
    }
}
