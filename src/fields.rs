//! Typed access to message metadata.
//!
//! Lookups never fall back to a zero value: the caller always learns
//! whether a field was present and whether it had the requested type.

use serde_json::{Map, Value};

/// Dynamic metadata attached to a [`Message`](crate::message::Message).
pub type Fields = Map<String, Value>;

/// Outcome of a typed field lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldLookup<T> {
    Found(T),
    WrongType { expected: &'static str },
    Missing,
}

impl<T> FieldLookup<T> {
    /// The value when it was present with the requested type.
    pub fn found(self) -> Option<T> {
        match self {
            FieldLookup::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldLookup::Missing)
    }
}

/// Types that can be read out of a JSON field value.
pub trait FromField<'a>: Sized {
    /// Name reported in [`FieldLookup::WrongType`].
    const EXPECTED: &'static str;

    fn from_value(value: &'a Value) -> Option<Self>;
}

impl<'a> FromField<'a> for &'a str {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

impl<'a> FromField<'a> for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_i64()
    }
}

impl<'a> FromField<'a> for f64 {
    const EXPECTED: &'static str = "number";

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_f64()
    }
}

impl<'a> FromField<'a> for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_bool()
    }
}

impl<'a> FromField<'a> for &'a Fields {
    const EXPECTED: &'static str = "object";

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object()
    }
}

/// Look `name` up in `fields` as a `T`.
pub fn field<'a, T: FromField<'a>>(fields: &'a Fields, name: &str) -> FieldLookup<T> {
    match fields.get(name) {
        None => FieldLookup::Missing,
        Some(value) => T::from_value(value)
            .map(FieldLookup::Found)
            .unwrap_or(FieldLookup::WrongType {
                expected: T::EXPECTED,
            }),
    }
}
