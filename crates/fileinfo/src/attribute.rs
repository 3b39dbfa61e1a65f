//! Self-describing attribute container returned by the collectors.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use crate::escape::escape_bytes;

/// Key under which the base name is stored.
pub const STANDARD_NAME: &str = "standard:name";
/// Key under which the hidden-file flag is stored.
pub const STANDARD_IS_HIDDEN: &str = "standard:is-hidden";
/// Key under which the symlink target is stored.
pub const STANDARD_SYMLINK_TARGET: &str = "standard:symlink-target";
/// Key under which the security label is stored.
pub const SELINUX_CONTEXT: &str = "selinux:context";

/// Typed value stored in an [`AttributeBag`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttributeValue {
    /// Printable text.
    String(String),
    /// Raw bytes such as file names or symlink targets.
    ByteString(Vec<u8>),
    /// Boolean flag.
    Boolean(bool),
    /// Unsigned 32-bit integer.
    Uint32(u32),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 64-bit integer.
    Uint64(u64),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Point in time relative to the Unix epoch.
    Timestamp {
        /// Whole seconds since the epoch; negative before it.
        seconds: i64,
        /// Sub-second part in nanoseconds.
        nanoseconds: u32,
    },
}

impl AttributeValue {
    /// Returns the value as text when it is a [`AttributeValue::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the raw bytes when the value is a [`AttributeValue::ByteString`].
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::ByteString(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the flag when the value is a [`AttributeValue::Boolean`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns any unsigned integer variant widened to `u64`.
    #[must_use]
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint32(value) => Some(*value as u64),
            Self::Uint64(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the type name used in textual renderings.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::ByteString(_) => "bytestring",
            Self::Boolean(_) => "boolean",
            Self::Uint32(_) => "uint32",
            Self::Int32(_) => "int32",
            Self::Uint64(_) => "uint64",
            Self::Int64(_) => "int64",
            Self::Timestamp { .. } => "timestamp",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::ByteString(value) => f.write_str(&escape_bytes(value)),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Uint32(value) => write!(f, "{value}"),
            Self::Int32(value) => write!(f, "{value}"),
            Self::Uint64(value) => write!(f, "{value}"),
            Self::Int64(value) => write!(f, "{value}"),
            Self::Timestamp {
                seconds,
                nanoseconds,
            } => write!(f, "{seconds}.{nanoseconds:09}"),
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        Self::Uint32(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        Self::Uint64(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

/// Per-target mapping from qualified `namespace:name` keys to typed values.
///
/// A fresh bag is built for every collected target and handed to the caller;
/// the collectors keep no reference to it afterwards.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AttributeBag {
    entries: BTreeMap<String, AttributeValue>,
}

impl AttributeBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any earlier value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries.get(key)
    }

    /// Reports whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.entries.remove(key)
    }

    /// Number of stored attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the bag holds no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the attributes in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, AttributeValue> {
        self.entries.iter()
    }

    /// Iterates over the stored keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the stored base name, if requested and known.
    #[must_use]
    pub fn name(&self) -> Option<&[u8]> {
        self.get(STANDARD_NAME).and_then(AttributeValue::as_bytes)
    }

    /// Returns the hidden-file flag, if requested.
    #[must_use]
    pub fn is_hidden(&self) -> Option<bool> {
        self.get(STANDARD_IS_HIDDEN).and_then(AttributeValue::as_bool)
    }

    /// Returns the symlink target, if requested and resolvable.
    #[must_use]
    pub fn symlink_target(&self) -> Option<&[u8]> {
        self.get(STANDARD_SYMLINK_TARGET)
            .and_then(AttributeValue::as_bytes)
    }

    /// Returns the security label, if requested and available.
    #[must_use]
    pub fn security_context(&self) -> Option<&str> {
        self.get(SELINUX_CONTEXT).and_then(AttributeValue::as_str)
    }

    /// Consumes the bag and returns the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, AttributeValue> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a AttributeBag {
    type Item = (&'a String, &'a AttributeValue);
    type IntoIter = btree_map::Iter<'a, String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for AttributeBag {
    type Item = (String, AttributeValue);
    type IntoIter = btree_map::IntoIter<String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::{AttributeBag, AttributeValue, escape_bytes};
    use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

    impl Serialize for AttributeValue {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::String(value) => serializer.serialize_str(value),
                Self::ByteString(value) => serializer.serialize_str(&escape_bytes(value)),
                Self::Boolean(value) => serializer.serialize_bool(*value),
                Self::Uint32(value) => serializer.serialize_u32(*value),
                Self::Int32(value) => serializer.serialize_i32(*value),
                Self::Uint64(value) => serializer.serialize_u64(*value),
                Self::Int64(value) => serializer.serialize_i64(*value),
                Self::Timestamp {
                    seconds,
                    nanoseconds,
                } => {
                    let mut state = serializer.serialize_struct("Timestamp", 2)?;
                    state.serialize_field("seconds", seconds)?;
                    state.serialize_field("nanoseconds", nanoseconds)?;
                    state.end()
                }
            }
        }
    }

    impl Serialize for AttributeBag {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (key, value) in self {
                map.serialize_entry(key, value)?;
            }
            map.end()
        }
    }
}
