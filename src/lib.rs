pub mod error;
pub mod utility {
    pub mod pair;
}
pub mod tree {
    pub(crate) mod balance;
    pub mod compare;
    pub mod header;
    pub mod iter;
    pub mod map;
    pub mod node;
    pub mod rb_tree;
    pub mod set;
    pub mod verify;
}

pub use error::{ TreeError, TreeResult, Violation };
pub use tree::{
    compare::{ CompareBy, CompareGreater, CompareLess, KeyCompare, KeyOrder },
    iter::{ Cursor, CursorMut },
    map::{ TreeMap, TreeMultiMap },
    node::NodeColor,
    rb_tree::Tree,
    set::TreeSet
};
pub use utility::pair::{ make_pair, Pair };

#[cfg(test)]
pub(crate) mod test_support {
    use simplelog::*;

    // Shared by every test module; later calls find the logger already set and do nothing
    pub fn init_logger() {
        let _ = TestLogger::init(LevelFilter::Trace, Config::default());
    }
}
