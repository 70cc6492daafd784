//! Presence or absence, as a [`TaggedUnion`] of a value and [`Unit`].

use std::{borrow::Cow, fmt};

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, TaggedUnion, Unit, Variant};

/// Either some `T` or nothing.
///
/// Absence is stored as [`Unit`] in the second slot, so [`is_none`] and
/// [`is_some`] are exact complements.
///
/// [`is_none`]: Maybe::is_none
/// [`is_some`]: Maybe::is_some
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Maybe<T>(TaggedUnion<T, Unit>);

impl<T> Maybe<T> {
    pub fn some(value: T) -> Self {
        Maybe(TaggedUnion::val1(value))
    }

    pub fn none() -> Self {
        Maybe(TaggedUnion::val2(Unit))
    }

    pub fn is_some(&self) -> bool {
        self.0.is_val1()
    }

    pub fn is_none(&self) -> bool {
        self.0.is_val2()
    }

    pub fn value(&self) -> Option<&T> {
        match self.0.as_variant() {
            Variant::Val1(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self.0.into_variant() {
            Variant::Val1(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_union(&self) -> &TaggedUnion<T, Unit> {
        &self.0
    }

    pub fn into_union(self) -> TaggedUnion<T, Unit> {
        self.0
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Maybe<U> {
        self.into_option().map(f).into()
    }

    pub fn bind<U>(self, f: impl FnOnce(T) -> Maybe<U>) -> Maybe<U> {
        match self.into_option() {
            Some(value) => f(value),
            None => Maybe::none(),
        }
    }

    pub fn select_many<U, V>(
        self,
        bind: impl FnOnce(&T) -> Maybe<U>,
        project: impl FnOnce(T, U) -> V,
    ) -> Maybe<V> {
        self.bind(|value| bind(&value).map(|next| project(value, next)))
    }

    /// Keeps the value only if `predicate` accepts it.
    pub fn filter(self, predicate: impl FnOnce(&T) -> bool) -> Self {
        self.into_option().filter(predicate).into()
    }

    pub fn get_value_or_default(self, fallback: T) -> T {
        self.into_option().unwrap_or(fallback)
    }

    /// Returns the value, or [`Error::Missing`] carrying `message`.
    pub fn get_value_or_throw(self, message: impl Into<Cow<'static, str>>) -> Result<T, Error> {
        self.into_option().ok_or_else(|| Error::Missing(message.into()))
    }

    pub fn match_with<R>(self, on_some: impl FnOnce(T) -> R, on_none: impl FnOnce() -> R) -> R {
        match self.into_option() {
            Some(value) => on_some(value),
            None => on_none(),
        }
    }
}

impl<T> Default for Maybe<T> {
    fn default() -> Self {
        Maybe::none()
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(option: Option<T>) -> Self {
        match option {
            Some(value) => Maybe::some(value),
            None => Maybe::none(),
        }
    }
}

impl<T> From<Maybe<T>> for Option<T> {
    fn from(maybe: Maybe<T>) -> Self {
        maybe.into_option()
    }
}

impl<T> TryFrom<TaggedUnion<T, Unit>> for Maybe<T> {
    type Error = Error;

    fn try_from(union: TaggedUnion<T, Unit>) -> Result<Self, Error> {
        if union.is_empty() {
            return Err(Error::InvalidState);
        }
        Ok(Maybe(union))
    }
}

impl<T: fmt::Debug> fmt::Debug for Maybe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_variant() {
            Variant::Val1(value) => f.debug_tuple("Some").field(value).finish(),
            Variant::Val2(_) => f.write_str("None"),
            Variant::Empty => f.write_str("Empty"),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Maybe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<T: Serialize> Serialize for Maybe<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Maybe<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        TaggedUnion::<T, Unit>::deserialize(deserializer).map(Maybe)
    }
}
