use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// The failing rule keys of one node.
///
/// Keys keep the declaration order of the rules that produced them, so the
/// first key belongs to the earliest declared failing rule. A key appears at
/// most once. Serialises as `{ "<key>": true, ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSet {
    keys: Vec<String>,
}

impl ErrorSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key, keeping the first position if already present.
    pub fn insert(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.contains(&key) {
            self.keys.push(key);
        }
    }

    /// Returns `true` if the rule with this key currently fails.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Returns `true` if no rule fails.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of failing rules.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Failing keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// The earliest declared failing key.
    pub fn first(&self) -> Option<&str> {
        self.keys.first().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ErrorSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = Self::new();
        for key in iter {
            set.insert(key);
        }
        set
    }
}

impl Serialize for ErrorSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.keys.len()))?;
        for key in &self.keys {
            map.serialize_entry(key, &true)?;
        }
        map.end()
    }
}
