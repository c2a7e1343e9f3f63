//! Key normalization.
//!
//! Every key passes through [`KeyMode::normalize`] on the write path and [`KeyMode::lookup`] on
//! the read path, so both sides always agree on how a key addresses storage:
//!
//! * [`KeyMode::Strict`] stores the key as-is. Scalars compare by value, object keys by instance.
//! * [`KeyMode::Structural`] stores the compact canonical JSON text of every key, so object keys
//!   with equal content collide into the same entry.
//!
//! The canonical text never leaves this module; [`StorageKey::denormalize`] rebuilds a [`Key`]
//! from the stored source key before anything is handed back to callers.

use crate::key::{self, Key, KeyRef, ObjectKey, Scalar, ScalarRef};
use indexmap::Equivalent;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use tracing::warn;

/// How keys of a collection are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    /// Scalars by value, object keys by instance identity.
    #[default]
    Strict,
    /// Every key by its canonical serialized form.
    Structural,
}

impl KeyMode {
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }

    pub(crate) fn normalize(self, key: Key) -> StorageKey {
        match (self, key) {
            (Self::Strict, Key::Scalar(s)) => StorageKey::Scalar(s),
            (Self::Strict, Key::Object(o)) => StorageKey::Identity(o),
            (Self::Structural, key) => StorageKey::Canonical {
                text: canonical(key.as_key_ref()).into_boxed_str(),
                source: key,
            },
        }
    }

    pub(crate) fn lookup(self, key: KeyRef<'_>) -> LookupKey<'_> {
        match (self, key) {
            (Self::Strict, KeyRef::Scalar(s)) => LookupKey::Scalar(s),
            (Self::Strict, KeyRef::Object(o)) => LookupKey::Identity(o),
            (Self::Structural, key) => LookupKey::Canonical(Cow::Owned(canonical(key))),
        }
    }
}

/// Compact JSON text of a key. Object members come out sorted by name because
/// `serde_json::Map` is ordered, so property insertion order never matters. Integral
/// numbers are written as integers at any depth, so `1.0` and `1` agree.
fn canonical(key: KeyRef<'_>) -> String {
    match key {
        KeyRef::Object(o) => canonical_value(o.value()),
        KeyRef::Scalar(s) => s.to_value().to_string(),
    }
}

fn canonical_value(value: &Value) -> String {
    serde_json::to_string(&CanonicalValue(value)).unwrap_or_else(|err| {
        warn!(error = %err, "Failed to canonicalize key, using its plain text");
        value.to_string()
    })
}

struct CanonicalValue<'a>(&'a Value);

impl Serialize for CanonicalValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Number(n) => match key::integral(n) {
                Some(i) => serializer.serialize_i64(i),
                None => n.serialize(serializer),
            },
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&CanonicalValue(item))?;
                }
                seq.end()
            },
            Value::Object(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (name, member) in members {
                    map.serialize_entry(name, &CanonicalValue(member))?;
                }
                map.end()
            },
            other => other.serialize(serializer),
        }
    }
}

/// The key actually stored in a collection.
#[derive(Debug, Clone)]
pub(crate) enum StorageKey {
    Scalar(Scalar),
    /// Holding the handle keeps the allocation alive, so its address cannot be reused
    /// by another key while the entry exists.
    Identity(ObjectKey),
    /// Canonical text plus the key it was built from, kept for denormalization.
    Canonical { text: Box<str>, source: Key },
}

impl StorageKey {
    fn as_lookup(&self) -> LookupKey<'_> {
        match self {
            Self::Scalar(s) => LookupKey::Scalar(s.as_borrowed()),
            Self::Identity(o) => LookupKey::Identity(o),
            Self::Canonical { text, .. } => LookupKey::Canonical(Cow::Borrowed(&**text)),
        }
    }

    /// Rebuilds the caller-facing key. Identity keys come back as the same instance;
    /// canonical keys come back as fresh values with equal content.
    pub(crate) fn denormalize(&self) -> Key {
        match self {
            Self::Scalar(s) => Key::Scalar(s.clone()),
            Self::Identity(o) => Key::Object(o.clone()),
            Self::Canonical { source: Key::Scalar(s), .. } => Key::Scalar(s.clone()),
            Self::Canonical { source: Key::Object(o), .. } => {
                Key::Object(ObjectKey::new(o.value().clone()))
            },
        }
    }
}

impl PartialEq for StorageKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_lookup() == other.as_lookup()
    }
}

impl Eq for StorageKey {}

impl Hash for StorageKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_lookup().hash(state);
    }
}

/// Borrowed counterpart of [`StorageKey`]; hashes identically so maps can be probed
/// without building an owned key.
#[derive(Debug)]
pub(crate) enum LookupKey<'a> {
    Scalar(ScalarRef<'a>),
    Identity(&'a ObjectKey),
    Canonical(Cow<'a, str>),
}

impl PartialEq for LookupKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Identity(a), Self::Identity(b)) => ObjectKey::ptr_eq(a, b),
            (Self::Canonical(a), Self::Canonical(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for LookupKey<'_> {}

impl Hash for LookupKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Scalar(s) => {
                state.write_u8(0);
                s.hash(state);
            },
            Self::Identity(o) => {
                state.write_u8(1);
                state.write_usize(o.addr());
            },
            Self::Canonical(text) => {
                state.write_u8(2);
                text.hash(state);
            },
        }
    }
}

impl Equivalent<StorageKey> for LookupKey<'_> {
    fn equivalent(&self, key: &StorageKey) -> bool {
        *self == key.as_lookup()
    }
}
