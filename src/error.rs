use std::alloc::{ handle_alloc_error, Layout };
use thiserror::Error;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The allocator refused to hand out memory for a node. The tree that was being modified is
    /// left exactly as it was before the call.
    #[error("failed to allocate tree node ({} bytes, align {})", .layout.size(), .layout.align())]
    AllocationFailed { layout: Layout },
    #[error("red-black invariant violated: {0}")]
    InvariantViolation(#[from] Violation)
}

impl TreeError {
    // Used by the trait impls (Clone, Extend, ...) that have no way to report a failure
    pub(crate) fn abort(self) -> ! {
        match self {
            TreeError::AllocationFailed { layout } => handle_alloc_error(layout),
            TreeError::InvariantViolation(v) => panic!("red-black invariant violated: {}", v)
        }
    }
}

/// Structural problems reported by `Tree::validate`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("root node is red")]
    RedRoot,
    #[error("root does not link back to the header")]
    RootLink,
    #[error("red node at depth {depth} has a red child")]
    RedRed { depth: usize },
    #[error("black height {found} at depth {depth} differs from sibling black height {expected}")]
    BlackHeight { depth: usize, expected: usize, found: usize },
    #[error("child at depth {depth} does not link back to its parent")]
    ParentLink { depth: usize },
    #[error("header does not cache the leftmost node")]
    Leftmost,
    #[error("header does not cache the rightmost node")]
    Rightmost,
    #[error("empty header is not in its self-loop state")]
    EmptyHeader,
    #[error("header counts {counted} nodes but {found} are linked")]
    Count { counted: usize, found: usize },
    #[error("keys out of order at in-order position {index}")]
    Order { index: usize }
}
