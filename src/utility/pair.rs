use std::{
    cmp::Ordering,
    fmt::{ Debug, Display },
    hash::{ Hash, Hasher }
};

// Key/value payload stored in every tree node. Comparisons are lexicographic (key first, then
// value), the tree itself only ever looks at the key.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct Pair<K, V> {
    key: K,
    value: V
}

impl<K, V> Pair<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
    pub fn get_key(&self) -> &K { &self.key }
    pub fn get_value(&self) -> &V { &self.value }
    pub fn get_value_mut(&mut self) -> &mut V { &mut self.value }
    // The key stays immutable so that a pair living inside a tree can't be reordered in place
    pub fn parts(&self) -> (&K, &V) { (&self.key, &self.value) }
    pub fn parts_mut(&mut self) -> (&K, &mut V) { (&self.key, &mut self.value) }
    pub fn into_parts(self) -> (K, V) { (self.key, self.value) }
    pub fn into_value(self) -> V { self.value }
    pub fn replace_value(&mut self, value: V) -> V { std::mem::replace(&mut self.value, value) }
}

pub fn make_pair<K, V>(key: K, value: V) -> Pair<K, V> { Pair::new(key, value) }

impl<K, V> From<(K, V)> for Pair<K, V> {
    fn from(value: (K, V)) -> Self { Self::new(value.0, value.1) }
}

impl<K, V> From<Pair<K, V>> for (K, V) {
    fn from(value: Pair<K, V>) -> Self { value.into_parts() }
}

impl<K, V> PartialEq for Pair<K, V>
where K: PartialEq,
      V: PartialEq
{
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl<K, V> Eq for Pair<K, V>
where K: Eq,
      V: Eq
{}

impl<K, V> PartialOrd for Pair<K, V>
where K: PartialOrd,
      V: PartialOrd
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.key.partial_cmp(&other.key) {
            Some(Ordering::Equal) => self.value.partial_cmp(&other.value),
            ord => ord
        }
    }
}

impl<K, V> Ord for Pair<K, V>
where K: Ord,
      V: Ord
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key).then_with(|| self.value.cmp(&other.value))
    }
}

impl<K, V> Hash for Pair<K, V>
where K: Hash,
      V: Hash
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.value.hash(state);
    }
}

impl<K, V> Debug for Pair<K, V>
where K: Debug,
      V: Debug
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Pair").field(&self.key).field(&self.value).finish()
    }
}

impl<K, V> Display for Pair<K, V>
where K: Display,
      V: Display
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.key, self.value)
    }
}

#[cfg(test)]
pub mod tests {
    use super::{ make_pair, Pair };
    use std::error::Error;

    type TestReturn = Result<(), Box<dyn Error>>;

    #[test]
    pub fn pair_ordering() -> TestReturn {
        let a = make_pair(1, "b");
        let b = make_pair(1, "c");
        let c = make_pair(2, "a");
        assert!(a < b, "Equal keys should fall back to comparing values");
        assert!(b < c, "Smaller key should win regardless of value");
        assert!(a == Pair::new(1, "b"), "Pairs with identical parts should be equal");
        assert!(a != b, "Pairs with different values should not be equal");
        assert!(c >= b && c > a, "Greater-than should mirror less-than");
        Ok(())
    }

    #[test]
    pub fn pair_conversion() -> TestReturn {
        let mut pair: Pair<u32, String> = (5, String::from("five")).into();
        assert!(*pair.get_key() == 5, "Key should be 5 instead of {}", pair.get_key());
        let old = pair.replace_value(String::from("FIVE"));
        assert!(old == "five", "Replaced value should be returned, got {}", old);
        pair.get_value_mut().push('!');
        let (k, v): (u32, String) = pair.into();
        assert!(k == 5 && v == "FIVE!", "Unexpected parts ({}, {})", k, v);
        assert!(format!("{}", make_pair(1, 2)) == "(1, 2)", "Display should print as a tuple");
        Ok(())
    }
}
