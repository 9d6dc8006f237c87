use std::fmt;
use std::path::PathBuf;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A value bound to one generic of the design under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GenericValue {
    Int(i64),
    Bool(bool),
    Str(String),
    Path(PathBuf),
}

impl GenericValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            GenericValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

/// The form used in configuration names; booleans read `True`/`False`.
impl fmt::Display for GenericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericValue::Int(v) => write!(f, "{v}"),
            GenericValue::Bool(true) => f.write_str("True"),
            GenericValue::Bool(false) => f.write_str("False"),
            GenericValue::Str(v) => f.write_str(v),
            GenericValue::Path(v) => write!(f, "{}", v.display()),
        }
    }
}

impl From<i64> for GenericValue {
    fn from(v: i64) -> Self {
        GenericValue::Int(v)
    }
}

impl From<i32> for GenericValue {
    fn from(v: i32) -> Self {
        GenericValue::Int(v.into())
    }
}

impl From<u32> for GenericValue {
    fn from(v: u32) -> Self {
        GenericValue::Int(v.into())
    }
}

impl From<bool> for GenericValue {
    fn from(v: bool) -> Self {
        GenericValue::Bool(v)
    }
}

impl From<&str> for GenericValue {
    fn from(v: &str) -> Self {
        GenericValue::Str(v.to_string())
    }
}

impl From<String> for GenericValue {
    fn from(v: String) -> Self {
        GenericValue::Str(v)
    }
}

impl From<PathBuf> for GenericValue {
    fn from(v: PathBuf) -> Self {
        GenericValue::Path(v)
    }
}

/// Generic bindings in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generics(Vec<(String, GenericValue)>);

impl Generics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, replacing an earlier binding in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<GenericValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&GenericValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GenericValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Generics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
