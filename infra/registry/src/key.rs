//! Key model shared by collections and registries.
//!
//! A [`Key`] is either a plain [`Scalar`] or a structured [`ObjectKey`]. Scalars always compare
//! by value. Object keys carry both an *identity* (the shared allocation behind the handle) and
//! a *content* (the structured value); which of the two addresses an entry is decided by the
//! [`KeyMode`](crate::KeyMode) of the owning collection.

use crate::error::{RegistryError, RegistryErrorExt};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::sync::Arc;

/// A plain scalar key compared by value.
///
/// Integral numbers that fit `i64` are always [`Scalar::Int`], whatever their source
/// representation, so `1` and `1.0` are the same key. [`Scalar::Number`] holds the rest:
/// fractions and integers beyond `i64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Number(Number),
    Str(String),
}

impl Scalar {
    /// Borrowed view of this scalar.
    #[must_use]
    pub fn as_borrowed(&self) -> ScalarRef<'_> {
        match self {
            Self::Null => ScalarRef::Null,
            Self::Bool(b) => ScalarRef::Bool(*b),
            Self::Int(i) => ScalarRef::Int(*i),
            Self::Number(n) => ScalarRef::Number(n),
            Self::Str(s) => ScalarRef::Str(s),
        }
    }

    /// Builds a numeric scalar, folding integral values into [`Scalar::Int`].
    #[must_use]
    pub fn from_number(number: Number) -> Self {
        match integral(&number) {
            Some(i) => Self::Int(i),
            None => Self::Number(number),
        }
    }
}

/// The `i64` value of `number` if it is integral and fits, e.g. `7`, `-0.0` or `3.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
pub(crate) fn integral(number: &Number) -> Option<i64> {
    if let Some(i) = number.as_i64() {
        return Some(i);
    }
    let f = number.as_f64()?;
    (number.is_f64() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64)
        .then_some(f as i64)
}

/// Borrowed form of a [`Scalar`], used for allocation-free lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarRef<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Number(&'a Number),
    Str(&'a str),
}

impl ScalarRef<'_> {
    #[must_use]
    pub fn to_scalar(self) -> Scalar {
        match self {
            Self::Null => Scalar::Null,
            Self::Bool(b) => Scalar::Bool(b),
            Self::Int(i) => Scalar::Int(i),
            Self::Number(n) => Scalar::Number(n.clone()),
            Self::Str(s) => Scalar::Str(s.to_owned()),
        }
    }

    pub(crate) fn to_value(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(b),
            Self::Int(i) => Value::from(i),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Str(s) => Value::String(s.to_owned()),
        }
    }
}

/// A shared, immutable structured key.
///
/// Cloning an `ObjectKey` hands out another handle to the *same instance*, while building a new
/// one from equal data produces a *distinct instance*. Under strict key mode only the same
/// instance finds an entry again; under structural key mode any key with equal content does.
///
/// `PartialEq` compares content. Use [`ObjectKey::ptr_eq`] to test identity.
#[derive(Clone)]
pub struct ObjectKey(Arc<Value>);

impl ObjectKey {
    /// Wraps an already structured value as a new key instance.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(Arc::new(value))
    }

    /// Builds a new key instance from any serializable data.
    ///
    /// # Errors
    /// Returns [`RegistryError::Serialize`] if `data` cannot be represented as a structured
    /// value, e.g. a map whose keys are not strings.
    pub fn from_serialize<T>(data: &T) -> Result<Self, RegistryError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(data).context("Failed to build object key")?;
        Ok(Self::new(value))
    }

    /// The structured content of this key.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Returns `true` if both handles point to the same key instance.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).addr()
    }
}

impl PartialEq for ObjectKey {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || self.0 == other.0
    }
}

impl Eq for ObjectKey {}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectKey").field(&*self.0).finish()
    }
}

impl From<Value> for ObjectKey {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// A registry key: a scalar or a structured object.
///
/// Serializes as its plain JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Key {
    Scalar(Scalar),
    Object(ObjectKey),
}

impl Key {
    /// Builds an object key from any serializable data.
    ///
    /// # Errors
    /// See [`ObjectKey::from_serialize`].
    pub fn from_serialize<T>(data: &T) -> Result<Self, RegistryError>
    where
        T: Serialize + ?Sized,
    {
        ObjectKey::from_serialize(data).map(Self::Object)
    }

    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Object(_) => None,
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectKey> {
        match self {
            Self::Object(o) => Some(o),
            Self::Scalar(_) => None,
        }
    }

    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Borrowed view used for lookups.
    #[must_use]
    pub fn as_key_ref(&self) -> KeyRef<'_> {
        KeyRef::from(self)
    }

    /// The key as a plain structured value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.as_key_ref().to_value()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(Scalar::Str(s)) => f.write_str(s),
            Self::Scalar(s) => write!(f, "{}", s.as_borrowed().to_value()),
            Self::Object(o) => write!(f, "{}", o.value()),
        }
    }
}

/// Null, booleans, numbers and strings become scalars. Arrays and objects become a new
/// object key instance.
impl From<Value> for Key {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::String(s) => Self::Scalar(Scalar::Str(s)),
            Value::Number(n) => Self::Scalar(Scalar::from_number(n)),
            other @ (Value::Array(_) | Value::Object(_)) => Self::Object(ObjectKey::new(other)),
        }
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Scalar(Scalar::Str(s)) => Self::String(s),
            Key::Scalar(s) => s.as_borrowed().to_value(),
            Key::Object(o) => Arc::unwrap_or_clone(o.0),
        }
    }
}

impl From<Scalar> for Key {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<ObjectKey> for Key {
    fn from(object: ObjectKey) -> Self {
        Self::Object(object)
    }
}

impl From<&ObjectKey> for Key {
    fn from(object: &ObjectKey) -> Self {
        Self::Object(object.clone())
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::Str(s.to_owned()))
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::Str(s))
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Self::Scalar(Scalar::Int(i))
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Self::Scalar(Scalar::Int(i.into()))
    }
}

impl From<u32> for Key {
    fn from(i: u32) -> Self {
        Self::Scalar(Scalar::Int(i.into()))
    }
}

/// Non-finite values have no structured form and become [`Scalar::Null`].
impl From<f64> for Key {
    fn from(f: f64) -> Self {
        Self::from(Value::from(f))
    }
}

impl From<u64> for Key {
    fn from(i: u64) -> Self {
        Self::Scalar(Scalar::from_number(Number::from(i)))
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl From<()> for Key {
    fn from((): ()) -> Self {
        Self::Scalar(Scalar::Null)
    }
}

/// Borrowed key accepted by every lookup operation.
///
/// Anything that converts into a [`Key`] by value also has a borrowed form here, so lookups
/// such as `collection.get("name")` or `collection.get(&object_key)` never clone the key.
#[derive(Debug, Clone, Copy)]
pub enum KeyRef<'a> {
    Scalar(ScalarRef<'a>),
    Object(&'a ObjectKey),
}

impl KeyRef<'_> {
    #[must_use]
    pub fn to_key(self) -> Key {
        match self {
            Self::Scalar(s) => Key::Scalar(s.to_scalar()),
            Self::Object(o) => Key::Object(o.clone()),
        }
    }

    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::Scalar(s) => s.to_value(),
            Self::Object(o) => o.value().clone(),
        }
    }
}

impl<'a> From<&'a Key> for KeyRef<'a> {
    fn from(key: &'a Key) -> Self {
        match key {
            Key::Scalar(s) => Self::Scalar(s.as_borrowed()),
            Key::Object(o) => Self::Object(o),
        }
    }
}

impl<'a> From<&'a Scalar> for KeyRef<'a> {
    fn from(scalar: &'a Scalar) -> Self {
        Self::Scalar(scalar.as_borrowed())
    }
}

impl<'a> From<&'a ObjectKey> for KeyRef<'a> {
    fn from(object: &'a ObjectKey) -> Self {
        Self::Object(object)
    }
}

impl<'a> From<&'a str> for KeyRef<'a> {
    fn from(s: &'a str) -> Self {
        Self::Scalar(ScalarRef::Str(s))
    }
}

impl<'a> From<&'a String> for KeyRef<'a> {
    fn from(s: &'a String) -> Self {
        Self::Scalar(ScalarRef::Str(s))
    }
}

impl From<i64> for KeyRef<'_> {
    fn from(i: i64) -> Self {
        Self::Scalar(ScalarRef::Int(i))
    }
}

impl From<i32> for KeyRef<'_> {
    fn from(i: i32) -> Self {
        Self::Scalar(ScalarRef::Int(i.into()))
    }
}

impl From<u32> for KeyRef<'_> {
    fn from(i: u32) -> Self {
        Self::Scalar(ScalarRef::Int(i.into()))
    }
}

impl From<bool> for KeyRef<'_> {
    fn from(b: bool) -> Self {
        Self::Scalar(ScalarRef::Bool(b))
    }
}

impl From<()> for KeyRef<'_> {
    fn from((): ()) -> Self {
        Self::Scalar(ScalarRef::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_identity_but_rebuilds_do_not() {
        let a = ObjectKey::new(json!({ "a": "x" }));
        let b = a.clone();
        let c = ObjectKey::new(json!({ "a": "x" }));

        assert!(ObjectKey::ptr_eq(&a, &b));
        assert!(!ObjectKey::ptr_eq(&a, &c));
        assert_eq!(a, c, "content equality ignores identity");
    }

    #[test]
    fn value_conversion_splits_scalars_and_objects() {
        assert_eq!(Key::from(json!("k")), Key::from("k"));
        assert_eq!(Key::from(json!(7)), Key::from(7));
        assert_eq!(Key::from(json!(null)), Key::from(()));
        assert!(Key::from(json!([1, 2])).is_object());
        assert!(!Key::from(json!(1.5)).is_object());
        assert!(!Key::from(json!(u64::MAX)).is_object());
    }

    #[test]
    fn numbers_are_scalars_compared_by_value() {
        assert_eq!(Key::from(json!(3.0)), Key::from(3));
        assert_eq!(Key::from(-0.0), Key::from(0));
        assert_eq!(Key::from(1.5), Key::from(json!(1.5)));
        assert_eq!(Key::from(u64::MAX), Key::from(json!(u64::MAX)));
        assert_eq!(Key::from(f64::NAN), Key::from(()));

        let Key::Scalar(Scalar::Number(n)) = Key::from(json!(2.5)) else {
            panic!("expected a numeric scalar")
        };
        assert_eq!(n.as_f64(), Some(2.5));
    }

    #[test]
    fn serde_uses_plain_json() {
        let key = Key::from_serialize(&json!({ "x": 1 })).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"{"x":1}"#);

        let back: Key = serde_json::from_str(r#""name""#).unwrap();
        assert_eq!(back, Key::from("name"));
    }

    #[test]
    fn non_string_map_keys_fail_to_serialize() {
        let mut data = std::collections::BTreeMap::new();
        data.insert((1, 2), "point");

        let err = ObjectKey::from_serialize(&data).unwrap_err();
        assert!(matches!(err, RegistryError::Serialize { context: Some(_), .. }));
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(Key::from("plain").to_string(), "plain");
        assert_eq!(Key::from(3).to_string(), "3");
        assert_eq!(Key::from(json!({ "b": 2 })).to_string(), r#"{"b":2}"#);
    }
}
