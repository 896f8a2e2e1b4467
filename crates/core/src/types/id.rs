//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! Cart-builders and the document store do not agree on a single id shape:
//! some emit `"42"`, some emit `42`. IDs deserialize from either, compare by
//! their text, and serialize back in the shape they arrived in.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`RawId`] with:
/// - `Serialize`/`Deserialize` as a JSON string or integer, shape preserved
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord` by text
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>`, `From<&str>`, `From<u64>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use threadline_core::define_id;
/// define_id!(ItemKey);
/// define_id!(OrderKey);
///
/// let item = ItemKey::new("sku-1");
/// let order = OrderKey::from(7_u64);
/// assert_eq!(order, OrderKey::new("7"));
///
/// // These are different types, so this won't compile:
/// // let _: ItemKey = order;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($crate::types::id::RawId);

        impl $name {
            /// Create a new textual ID.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self($crate::types::id::RawId::text(id))
            }

            /// Get the ID as text (integers in decimal).
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.0.as_str())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self($crate::types::id::RawId::integer(id))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.into_string()
            }
        }
    };
}

/// ID storage shared by every `define_id!` type.
///
/// Equality, ordering and hashing use the text only, so `42` and `"42"` name
/// the same entity. The integer form, when present, is what gets serialized.
#[derive(Debug, Clone)]
pub struct RawId {
    text: String,
    integer: Option<Number>,
}

impl RawId {
    /// A textual id.
    #[must_use]
    pub fn text(id: impl Into<String>) -> Self {
        Self {
            text: id.into(),
            integer: None,
        }
    }

    /// An id that serializes as a JSON integer.
    #[must_use]
    pub fn integer(id: impl Into<Number>) -> Self {
        let integer = id.into();
        Self {
            text: integer.to_string(),
            integer: Some(integer),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl PartialEq for RawId {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for RawId {}

impl Hash for RawId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialOrd for RawId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RawId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl Serialize for RawId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.integer {
            Some(integer) => integer.serialize(serializer),
            None => serializer.serialize_str(&self.text),
        }
    }
}

impl<'de> Deserialize<'de> for RawId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawIdVisitor)
    }
}

/// Visitor accepting a JSON string or integer as an id.
struct RawIdVisitor;

impl Visitor<'_> for RawIdVisitor {
    type Value = RawId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer id")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<RawId, E> {
        Ok(RawId::text(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<RawId, E> {
        Ok(RawId::text(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<RawId, E> {
        Ok(RawId::integer(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<RawId, E> {
        Ok(RawId::integer(value))
    }
}

// Define standard entity IDs
define_id!(ItemId);
define_id!(ProductId);
