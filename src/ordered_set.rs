use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;
use std::ops::Deref;

/// A set that iterates in insertion order.
///
/// Equality is order-sensitive: two column lists with the same fields in a
/// different order render differently. See [`SelectionSet`] for the
/// order-blind variant.
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    items: Vec<T>,
    index: HashSet<T>,
}

impl<T: Clone + Eq + Hash> OrderedSet<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashSet::new(),
        }
    }

    /// Appends `value` if absent. Returns whether it was added.
    pub fn insert(&mut self, value: T) -> bool {
        if !self.index.insert(value.clone()) {
            return false;
        }
        self.items.push(value);
        true
    }

    pub fn remove(&mut self, value: &T) -> bool {
        if !self.index.remove(value) {
            return false;
        }
        self.items.retain(|v| v != value);
        true
    }

    /// Flips membership. Returns true if `value` is now present.
    pub fn toggle(&mut self, value: T) -> bool {
        if self.remove(&value) {
            false
        } else {
            self.insert(value)
        }
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains(value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    /// Same members, order ignored.
    pub fn same_members(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T: Clone + Eq + Hash> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Clone + Eq + Hash> Eq for OrderedSet<T> {}

impl<T: Clone + Eq + Hash> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<'a, T: Clone + Eq + Hash> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Serialize> Serialize for OrderedSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

/// Selected candidate emails.
///
/// Keeps insertion order for display, but two selections are equal when
/// they hold the same emails, so toggling an email twice restores the
/// original value wherever it sat.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SelectionSet(OrderedSet<String>);

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, email: String) -> bool {
        self.0.toggle(email)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl Deref for SelectionSet {
    type Target = OrderedSet<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.same_members(&other.0)
    }
}

impl Eq for SelectionSet {}

impl FromIterator<String> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position() {
        let mut set = OrderedSet::new();
        assert!(set.insert("b"));
        assert!(set.insert("a"));
        assert!(!set.insert("b"));
        assert_eq!(set.as_slice(), &["b", "a"]);
    }

    #[test]
    fn toggle_reinserts_at_end() {
        let mut set: OrderedSet<&str> = ["a", "b", "c"].into_iter().collect();
        assert!(!set.toggle("a"));
        assert!(set.toggle("a"));
        assert_eq!(set.as_slice(), &["b", "c", "a"]);
    }

    #[test]
    fn collect_drops_duplicates() {
        let set: OrderedSet<u8> = [3, 1, 3, 2, 1].into_iter().collect();
        assert_eq!(set.as_slice(), &[3, 1, 2]);
        assert_eq!(set.len(), 3);
        assert!(set.contains(&2));
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut set: OrderedSet<u8> = [1, 2].into_iter().collect();
        assert!(!set.remove(&9));
        assert_eq!(set.as_slice(), &[1, 2]);
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn ordered_equality_depends_on_order() {
        let ab: OrderedSet<u8> = [1, 2].into_iter().collect();
        let ba: OrderedSet<u8> = [2, 1].into_iter().collect();
        assert_ne!(ab, ba);
        assert!(ab.same_members(&ba));
    }

    #[test]
    fn selection_equality_ignores_order() {
        let before: SelectionSet = ["a@x.com".to_string(), "b@x.com".to_string()]
            .into_iter()
            .collect();
        let mut after = before.clone();
        after.toggle("a@x.com".to_string());
        after.toggle("a@x.com".to_string());
        assert_eq!(after.as_slice(), &["b@x.com", "a@x.com"]);
        assert_eq!(after, before);
        assert!(after.contains("a@x.com"));
    }

    #[test]
    fn serializes_as_sequence() {
        let set: OrderedSet<&str> = ["b", "a"].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["b","a"]"#);
    }
}
