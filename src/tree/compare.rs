use std::fmt::Debug;

/// Strict weak ordering over keys. `less` must be irreflexive and transitive; a comparator that
/// isn't leaves every tree using it in an unspecified (but memory safe) order.
pub trait KeyCompare<K: ?Sized> {
    fn less(&self, lhs: &K, rhs: &K) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareLess; // std::less
impl<K> KeyCompare<K> for CompareLess
where K: Ord + ?Sized
{
    fn less(&self, lhs: &K, rhs: &K) -> bool { lhs < rhs }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareGreater; // std::greater
impl<K> KeyCompare<K> for CompareGreater
where K: Ord + ?Sized
{
    fn less(&self, lhs: &K, rhs: &K) -> bool { lhs > rhs }
}

/// Adapts a closure `Fn(&K, &K) -> bool` into a comparator.
#[derive(Clone, Copy, Default)]
pub struct CompareBy<F>(pub F);
impl<K, F> KeyCompare<K> for CompareBy<F>
where K: ?Sized,
      F: Fn(&K, &K) -> bool
{
    fn less(&self, lhs: &K, rhs: &K) -> bool { (self.0)(lhs, rhs) }
}

impl<F> Debug for CompareBy<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CompareBy(..)")
    }
}

/// The ordering policy a tree consults for every ordering decision. It owns the user's
/// comparator and never touches tree state.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyOrder<C> {
    compare: C
}

impl<C> KeyOrder<C> {
    pub fn new(compare: C) -> Self { Self { compare } }
    pub fn comparator(&self) -> &C { &self.compare }
    pub fn into_inner(self) -> C { self.compare }

    /// Whether `lhs` strictly precedes `rhs`.
    pub fn precedes<K>(&self, lhs: &K, rhs: &K) -> bool
    where C: KeyCompare<K>,
          K: ?Sized
    {
        self.compare.less(lhs, rhs)
    }

    /// Neither key precedes the other.
    pub fn equivalent<K>(&self, lhs: &K, rhs: &K) -> bool
    where C: KeyCompare<K>,
          K: ?Sized
    {
        !self.compare.less(lhs, rhs) && !self.compare.less(rhs, lhs)
    }
}

#[cfg(test)]
pub mod tests {
    use super::{ CompareBy, CompareGreater, CompareLess, KeyOrder };
    use std::error::Error;

    type TestReturn = Result<(), Box<dyn Error>>;

    #[test]
    pub fn builtin_comparators() -> TestReturn {
        let less = KeyOrder::new(CompareLess);
        let greater = KeyOrder::new(CompareGreater);
        assert!(less.precedes(&1, &2), "1 should precede 2 with CompareLess");
        assert!(!less.precedes(&2, &2), "CompareLess must be irreflexive");
        assert!(greater.precedes(&2, &1), "2 should precede 1 with CompareGreater");
        assert!(less.precedes("abc", "abd"), "Unsized keys should be comparable");
        assert!(less.equivalent(&7, &7) && !less.equivalent(&7, &8), "Equivalence should follow the order");
        Ok(())
    }

    #[test]
    pub fn closure_comparator() -> TestReturn {
        // case-insensitive ordering: "a" and "A" are equivalent
        let order = KeyOrder::new(CompareBy(|a: &String, b: &String| a.to_lowercase() < b.to_lowercase()));
        let (a, upper_a, b) = (String::from("a"), String::from("A"), String::from("b"));
        assert!(order.equivalent(&a, &upper_a), "Case-insensitive keys should be equivalent");
        assert!(order.precedes(&upper_a, &b), "A should precede b");
        let default_order: KeyOrder<CompareLess> = KeyOrder::default();
        assert!(*default_order.comparator() == CompareLess, "Default order should wrap the default comparator");
        Ok(())
    }
}
