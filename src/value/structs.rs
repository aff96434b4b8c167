//! Ordered container of struct members.

use super::Value;
use std::slice;
use std::vec;

/// An XML-RPC struct whose members are kept in insertion order.
///
/// This is the target of a struct mapped without a concrete [`Record`] type.
/// Unlike a hash map it reproduces the member order of the wire struct, so a
/// struct that is read and written back keeps its shape.
///
/// Lookups are linear: XML-RPC structs are small.
///
/// ```
/// use quick_xmlrpc::{Struct, Value};
///
/// let mut s = Struct::new();
/// s.insert("name", Value::String("Egypt".into()));
/// s.insert("code", Value::Int(20));
///
/// let keys: Vec<_> = s.keys().collect();
/// assert_eq!(keys, ["name", "code"]);
/// assert_eq!(s.get("code"), Some(&Value::Int(20)));
/// ```
///
/// [`Record`]: crate::Record
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Struct {
    members: Vec<(String, Value)>,
}

impl Struct {
    /// Creates an empty struct.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the struct has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sets the value of member `key`.
    ///
    /// A new member is appended at the end. The value of an existing member is
    /// replaced in place and the old value is returned.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: Value) -> Option<Value> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.members.push((key, value));
                None
            }
        }
    }

    /// Returns the value of member `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.members.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the value of member `key` for modification.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.members
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the struct has member `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes member `key`, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.members.iter().position(|(k, _)| k == key)?;
        Some(self.members.remove(index).1)
    }

    /// Removes all members.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Iterates over the members in order.
    pub fn iter(&self) -> Iter {
        Iter(self.members.iter())
    }

    /// Iterates over the member names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over the member values in order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.members.iter().map(|(_, v)| v)
    }
}

/// Iterator over the members of a [`Struct`].
pub struct Iter<'a>(slice::Iter<'a, (String, Value)>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> IntoIterator for &'a Struct {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl IntoIterator for Struct {
    type Item = (String, Value);
    type IntoIter = vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Struct {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut result = Struct::new();
        for (k, v) in iter {
            result.insert(k, v);
        }
        result
    }
}
