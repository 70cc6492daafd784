//! Success or failure, as a [`TaggedUnion`] of a value and an error.

use std::{error::Error as StdError, fmt};

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, TaggedUnion, Variant};

/// Either a value of type `T` or an error of type `E`.
///
/// An outcome is never empty: every way of building one (the factories,
/// `From<Result<T, E>>`, [`TryFrom<TaggedUnion>`], deserialization) yields a
/// value or an error.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Outcome<T, E: StdError>(TaggedUnion<T, E>);

impl<T, E: StdError> Outcome<T, E> {
    pub fn ok(value: T) -> Self {
        Outcome(TaggedUnion::val1(value))
    }

    pub fn error(error: E) -> Self {
        Outcome(TaggedUnion::val2(error))
    }

    pub fn is_ok(&self) -> bool {
        self.0.is_val1()
    }

    pub fn is_error(&self) -> bool {
        self.0.is_val2()
    }

    pub fn value(&self) -> Option<&T> {
        match self.0.as_variant() {
            Variant::Val1(value) => Some(value),
            _ => None,
        }
    }

    pub fn error_ref(&self) -> Option<&E> {
        match self.0.as_variant() {
            Variant::Val2(error) => Some(error),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self.0.into_variant() {
            Variant::Val1(value) => Ok(value),
            Variant::Val2(error) => Err(error),
            Variant::Empty => unreachable!("an outcome always holds a value or an error"),
        }
    }

    pub fn as_union(&self) -> &TaggedUnion<T, E> {
        &self.0
    }

    pub fn into_union(self) -> TaggedUnion<T, E> {
        self.0
    }

    /// Applies `f` to the value. Errors pass through untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        self.into_result().map(f).into()
    }

    pub fn map_error<F: StdError>(self, f: impl FnOnce(E) -> F) -> Outcome<T, F> {
        self.into_result().map_err(f).into()
    }

    /// Chains a computation that may itself fail, short-circuiting on the
    /// first error.
    pub fn bind<U>(self, f: impl FnOnce(T) -> Outcome<U, E>) -> Outcome<U, E> {
        match self.into_result() {
            Ok(value) => f(value),
            Err(error) => Outcome::error(error),
        }
    }

    /// Binds a dependent step, then combines the value with the step's result.
    ///
    /// ```rust
    /// use duet::Outcome;
    ///
    /// let total = Outcome::<u32, std::fmt::Error>::ok(40)
    ///     .select_many(|_| Outcome::ok(2), |a, b| a + b);
    /// assert_eq!(total, Outcome::ok(42));
    /// ```
    pub fn select_many<U, V>(
        self,
        bind: impl FnOnce(&T) -> Outcome<U, E>,
        project: impl FnOnce(T, U) -> V,
    ) -> Outcome<V, E> {
        self.bind(|value| bind(&value).map(|next| project(value, next)))
    }

    /// Returns the value, or the stored error exactly as it was stored.
    pub fn get_value_or_throw(self) -> Result<T, E> {
        self.into_result()
    }

    pub fn get_value_or_default(self, fallback: T) -> T {
        self.into_result().unwrap_or(fallback)
    }

    pub fn match_with<R>(self, on_ok: impl FnOnce(T) -> R, on_error: impl FnOnce(E) -> R) -> R {
        match self.into_result() {
            Ok(value) => on_ok(value),
            Err(error) => on_error(error),
        }
    }

    pub fn switch_on(&self, on_ok: impl FnOnce(&T), on_error: impl FnOnce(&E)) {
        match self.0.as_variant() {
            Variant::Val1(value) => on_ok(value),
            Variant::Val2(error) => on_error(error),
            Variant::Empty => {}
        }
    }
}

impl<F, E: StdError> Outcome<F, E> {
    /// Applies a wrapped function to a wrapped argument. The function's error
    /// wins when both sides failed.
    pub fn apply<T, U>(self, arg: Outcome<T, E>) -> Outcome<U, E>
    where
        F: FnOnce(T) -> U,
    {
        self.bind(|f| arg.map(f))
    }
}

impl<T, E: StdError> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::ok(value),
            Err(error) => Outcome::error(error),
        }
    }
}

impl<T, E: StdError> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        outcome.into_result()
    }
}

impl<T, E: StdError> TryFrom<TaggedUnion<T, E>> for Outcome<T, E> {
    type Error = Error;

    fn try_from(union: TaggedUnion<T, E>) -> Result<Self, Error> {
        if union.is_empty() {
            return Err(Error::InvalidState);
        }
        Ok(Outcome(union))
    }
}

impl<T: fmt::Debug, E: StdError> fmt::Debug for Outcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_variant() {
            Variant::Val1(value) => f.debug_tuple("Ok").field(value).finish(),
            Variant::Val2(error) => f.debug_tuple("Error").field(error).finish(),
            Variant::Empty => f.write_str("Empty"),
        }
    }
}

impl<T: fmt::Display, E: StdError> fmt::Display for Outcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<T: Serialize, E: StdError + Serialize> Serialize for Outcome<T, E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T, E> Deserialize<'de> for Outcome<T, E>
where
    T: DeserializeOwned,
    E: StdError + DeserializeOwned,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        TaggedUnion::<T, E>::deserialize(deserializer).map(Outcome)
    }
}
