//! The self-describing wire format.
//!
//! A non-empty union crosses a serialization boundary as a record with two
//! fields:
//!
//! ```json
//! { "$type": "i32", "value": 42 }
//! ```
//!
//! `$type` is the discriminator: the wire name of the active variant's
//! declared type, as produced by a [`Naming`] policy. `value` is the payload
//! in whatever shape the payload type serializes to.
//!
//! Decoding applies these rules in order:
//!
//! 1. no `$type`: [`WireError::MissingField`];
//! 2. no `value`: [`WireError::MissingField`];
//! 3. `$type` names `T1`: decode `value` as `T1`;
//! 4. `$type` names `T2`: decode `value` as `T2`;
//! 5. otherwise [`WireError::UnknownDiscriminator`].
//!
//! Fields other than these two are ignored. Empty unions have no wire form,
//! and neither do unions whose two types share a wire name: such a record
//! could not say which slot it came from, so both directions fail with
//! [`WireError::AmbiguousDiscriminator`].
//!
//! The serde impls on [`TaggedUnion`], [`Outcome`](crate::Outcome) and
//! [`Maybe`](crate::Maybe) always use [`SimpleName`]. Self-describing formats
//! read the two named fields in any order; formats that lay structs out
//! positionally read `$type` and then `value`. When `$type` comes first the
//! payload is decoded straight into its type, otherwise it is buffered as a
//! [`serde_json::Value`], which needs `deserialize_any` from the format.
//! [`WireCodec`] goes through [`serde_json::Value`] and lets the caller choose
//! the naming policy. Numbers keep their full precision, so `u128` and `i128`
//! payloads survive both paths.

use std::{borrow::Cow, fmt, marker::PhantomData};

use serde::{
    de::{self, DeserializeOwned, IgnoredAny, MapAccess, SeqAccess, Visitor},
    ser::{self, SerializeStruct},
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{Map, Value};

pub use crate::name::{Discriminator, Naming, QualifiedName, Registered, SimpleName};
use crate::{TaggedUnion, Variant};

/// The discriminator field.
pub const DISCRIMINATOR: &str = "$type";

/// The payload field.
pub const PAYLOAD: &str = "value";

const FIELDS: &[&str] = &[DISCRIMINATOR, PAYLOAD];

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WireError {
    #[error("an empty union has no wire form")]
    Empty,

    #[error("expected a wire record, found {0}")]
    NotARecord(&'static str),

    #[error("wire record has no `{0}` field")]
    MissingField(&'static str),

    #[error("unknown discriminator `{found}`, expected `{first}` or `{second}`")]
    UnknownDiscriminator {
        found: String,
        first: Cow<'static, str>,
        second: Cow<'static, str>,
    },

    #[error("both variants are named `{0}` on the wire")]
    AmbiguousDiscriminator(Cow<'static, str>),

    #[error("cannot decode payload of `{discriminator}`")]
    Payload {
        discriminator: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl WireError {
    /// Whether the record itself was malformed, as opposed to naming a type
    /// the codec does not know.
    pub fn is_format(&self) -> bool {
        matches!(self, WireError::NotARecord(_) | WireError::MissingField(_))
    }
}

/// Encodes and decodes unions through [`serde_json::Value`] under the naming
/// policy `N`.
///
/// ```rust
/// use duet::{wire::Registered, Maybe, WireCodec};
///
/// let record = WireCodec::<Registered>::encode(Maybe::some(42_i32).as_union()).unwrap();
/// assert_eq!(record.to_string(), r#"{"$type":"Int32","value":42}"#);
/// ```
pub struct WireCodec<N = SimpleName>(PhantomData<N>);

impl<N> WireCodec<N> {
    pub fn encode<T1, T2>(union: &TaggedUnion<T1, T2>) -> Result<Value, WireError>
    where
        T1: Serialize,
        T2: Serialize,
        N: Naming<T1> + Naming<T2>,
    {
        if union.is_empty() {
            return Err(WireError::Empty);
        }
        let (first, second) = names::<T1, T2, N>()?;
        let (discriminator, payload) = match union.as_variant() {
            Variant::Val1(value) => (first, serde_json::to_value(value)?),
            Variant::Val2(value) => (second, serde_json::to_value(value)?),
            Variant::Empty => return Err(WireError::Empty),
        };

        let mut record = Map::new();
        record.insert(DISCRIMINATOR.to_owned(), Value::String(discriminator.into_owned()));
        record.insert(PAYLOAD.to_owned(), payload);
        Ok(Value::Object(record))
    }

    pub fn decode<T1, T2>(record: Value) -> Result<TaggedUnion<T1, T2>, WireError>
    where
        T1: DeserializeOwned,
        T2: DeserializeOwned,
        N: Naming<T1> + Naming<T2>,
    {
        let mut record = match record {
            Value::Object(record) => record,
            other => return Err(WireError::NotARecord(kind(&other))),
        };
        let discriminator = record.remove(DISCRIMINATOR).map(|found| match found {
            Value::String(name) => name,
            other => other.to_string(),
        });
        resolve::<T1, T2, N>(discriminator, record.remove(PAYLOAD))
    }

    pub fn to_string<T1, T2>(union: &TaggedUnion<T1, T2>) -> Result<String, WireError>
    where
        T1: Serialize,
        T2: Serialize,
        N: Naming<T1> + Naming<T2>,
    {
        Ok(Self::encode(union)?.to_string())
    }

    pub fn from_str<T1, T2>(s: &str) -> Result<TaggedUnion<T1, T2>, WireError>
    where
        T1: DeserializeOwned,
        T2: DeserializeOwned,
        N: Naming<T1> + Naming<T2>,
    {
        Self::decode(serde_json::from_str(s)?)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The wire names of both slots, provided they differ.
fn names<T1, T2, N>() -> Result<(Cow<'static, str>, Cow<'static, str>), WireError>
where
    N: Naming<T1> + Naming<T2>,
{
    let first = <N as Naming<T1>>::name();
    let second = <N as Naming<T2>>::name();
    if first == second {
        return Err(WireError::AmbiguousDiscriminator(first));
    }
    Ok((first, second))
}

enum Slot {
    First,
    Second,
}

fn pick<T1, T2, N>(discriminator: &str) -> Result<Slot, WireError>
where
    N: Naming<T1> + Naming<T2>,
{
    let (first, second) = names::<T1, T2, N>()?;
    if first == discriminator {
        #[cfg(feature = "tracing")]
        tracing::trace!(discriminator, "decoding first variant");
        return Ok(Slot::First);
    }
    if second == discriminator {
        #[cfg(feature = "tracing")]
        tracing::trace!(discriminator, "decoding second variant");
        return Ok(Slot::Second);
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(discriminator, %first, %second, "unknown discriminator");
    Err(WireError::UnknownDiscriminator {
        found: discriminator.to_owned(),
        first,
        second,
    })
}

fn resolve<T1, T2, N>(
    discriminator: Option<String>,
    payload: Option<Value>,
) -> Result<TaggedUnion<T1, T2>, WireError>
where
    T1: DeserializeOwned,
    T2: DeserializeOwned,
    N: Naming<T1> + Naming<T2>,
{
    let discriminator = discriminator.ok_or(WireError::MissingField(DISCRIMINATOR))?;
    let payload = payload.ok_or(WireError::MissingField(PAYLOAD))?;

    let decoded = match pick::<T1, T2, N>(&discriminator)? {
        Slot::First => serde_json::from_value(payload).map(TaggedUnion::val1),
        Slot::Second => serde_json::from_value(payload).map(TaggedUnion::val2),
    };
    decoded.map_err(|source| WireError::Payload { discriminator, source })
}

fn to_de_error<E: de::Error>(err: WireError) -> E {
    match err {
        WireError::MissingField(field) => E::missing_field(field),
        other => E::custom(other),
    }
}

impl<T1: Serialize, T2: Serialize> Serialize for TaggedUnion<T1, T2> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_empty() {
            return Err(ser::Error::custom(WireError::Empty));
        }
        let (first, second) = names::<T1, T2, SimpleName>().map_err(ser::Error::custom)?;
        match self.as_variant() {
            Variant::Val1(value) => write_record(serializer, &first, value),
            Variant::Val2(value) => write_record(serializer, &second, value),
            Variant::Empty => Err(ser::Error::custom(WireError::Empty)),
        }
    }
}

fn write_record<S, T>(serializer: S, discriminator: &str, payload: &T) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + ?Sized,
{
    let mut record = serializer.serialize_struct("TaggedUnion", FIELDS.len())?;
    record.serialize_field(DISCRIMINATOR, discriminator)?;
    record.serialize_field(PAYLOAD, payload)?;
    record.end()
}

impl<'de, T1: DeserializeOwned, T2: DeserializeOwned> Deserialize<'de> for TaggedUnion<T1, T2> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_struct("TaggedUnion", FIELDS, RecordVisitor(PhantomData))
    }
}

struct RecordVisitor<T1, T2>(PhantomData<fn() -> (T1, T2)>);

enum Pending<T1, T2> {
    Decoded(TaggedUnion<T1, T2>),
    Buffered(Value),
}

impl<'de, T1: DeserializeOwned, T2: DeserializeOwned> Visitor<'de> for RecordVisitor<T1, T2> {
    type Value = TaggedUnion<T1, T2>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a record with `$type` and `value` fields")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let discriminator: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let payload = match pick::<T1, T2, SimpleName>(&discriminator).map_err(to_de_error)? {
            Slot::First => seq.next_element::<T1>()?.map(TaggedUnion::val1),
            Slot::Second => seq.next_element::<T2>()?.map(TaggedUnion::val2),
        };
        payload.ok_or_else(|| de::Error::invalid_length(1, &self))
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let mut discriminator: Option<String> = None;
        let mut payload: Option<Pending<T1, T2>> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                DISCRIMINATOR => {
                    if discriminator.is_some() {
                        return Err(de::Error::duplicate_field(DISCRIMINATOR));
                    }
                    discriminator = Some(map.next_value()?);
                }
                PAYLOAD => {
                    if payload.is_some() {
                        return Err(de::Error::duplicate_field(PAYLOAD));
                    }
                    // Without a discriminator yet the payload type is unknown.
                    let pending = match discriminator.as_deref() {
                        None => Pending::Buffered(map.next_value()?),
                        Some(name) => {
                            let slot = pick::<T1, T2, SimpleName>(name).map_err(to_de_error)?;
                            Pending::Decoded(match slot {
                                Slot::First => TaggedUnion::val1(map.next_value::<T1>()?),
                                Slot::Second => TaggedUnion::val2(map.next_value::<T2>()?),
                            })
                        }
                    };
                    payload = Some(pending);
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        let payload = match payload {
            Some(Pending::Decoded(union)) => return Ok(union),
            Some(Pending::Buffered(value)) => Some(value),
            None => None,
        };
        resolve::<T1, T2, SimpleName>(discriminator, payload).map_err(to_de_error)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Maybe, Outcome, Unit};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
    #[error("order {id} rejected: {reason}")]
    struct OrderError {
        id: u32,
        reason: String,
    }

    type U = TaggedUnion<i32, String>;
    type Json = WireCodec<SimpleName>;

    #[test]
    fn encode_records() {
        let record = Json::encode(&U::val1(7)).unwrap();
        assert_eq!(record, json!({ "$type": "i32", "value": 7 }));

        let record = Json::encode(&U::val2("hi".into())).unwrap();
        assert_eq!(record, json!({ "$type": "String", "value": "hi" }));

        let record = WireCodec::<QualifiedName>::encode(&U::val2("hi".into())).unwrap();
        assert_eq!(record, json!({ "$type": "alloc::string::String", "value": "hi" }));

        assert!(matches!(
            Json::encode(&U::empty()),
            Err(WireError::Empty)
        ));
    }

    #[test]
    fn decode_records() {
        let u: U = Json::decode(json!({ "$type": "i32", "value": 7 })).unwrap();
        assert_eq!(u, U::val1(7));

        let u: U = Json::decode(json!({ "value": "x", "$type": "String", "extra": 1 }))
            .unwrap();
        assert_eq!(u, U::val2("x".into()));
    }

    #[test]
    fn decode_failures() {
        let err = Json::decode::<i32, String>(json!({ "value": 1 })).unwrap_err();
        assert!(matches!(err, WireError::MissingField(DISCRIMINATOR)));
        assert!(err.is_format());

        let err = Json::decode::<i32, String>(json!({ "$type": "i32" })).unwrap_err();
        assert!(matches!(err, WireError::MissingField(PAYLOAD)));

        let err = Json::decode::<i32, String>(json!([1, 2])).unwrap_err();
        assert!(matches!(err, WireError::NotARecord("an array")));

        let err = Json::decode::<i32, Unit>(json!({ "$type": "Bogus", "value": 1 }))
            .unwrap_err();
        match err {
            WireError::UnknownDiscriminator { found, first, second } => {
                assert_eq!(found, "Bogus");
                assert_eq!(first, "i32");
                assert_eq!(second, "Unit");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = Json::decode::<i32, String>(json!({ "$type": "i32", "value": "seven" }))
            .unwrap_err();
        assert!(matches!(
            err,
            WireError::Payload { ref discriminator, .. } if discriminator == "i32"
        ));
        assert!(!err.is_format());
    }

    #[test]
    fn registered_names() {
        let json = WireCodec::<Registered>::to_string(&U::val1(1)).unwrap();
        assert_eq!(json, r#"{"$type":"Int32","value":1}"#);
        let u: U = WireCodec::<Registered>::from_str(&json).unwrap();
        assert_eq!(u, U::val1(1));

        // A simple name is not a registered one.
        let err = WireCodec::<Registered>::from_str::<i32, String>(r#"{"$type":"i32","value":1}"#)
            .unwrap_err();
        assert!(matches!(err, WireError::UnknownDiscriminator { .. }));
    }

    #[test]
    fn serde_impls() {
        let json = serde_json::to_string(&Maybe::some(42)).unwrap();
        assert_eq!(json, r#"{"$type":"i32","value":42}"#);
        let back: Maybe<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Maybe::some(42));

        let json = serde_json::to_string(&Maybe::<i32>::none()).unwrap();
        assert_eq!(json, r#"{"$type":"Unit","value":null}"#);
        let back: Maybe<i32> = serde_json::from_str(&json).unwrap();
        assert!(back.is_none());

        let err = serde_json::from_str::<Maybe<i32>>(r#"{"$type":"Bogus","value":1}"#).unwrap_err();
        assert!(err.to_string().contains("unknown discriminator `Bogus`"));

        let err = serde_json::from_str::<Maybe<i32>>(r#"{"$type":"i32"}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `value`"));

        let err = serde_json::from_str::<Maybe<i32>>(r#"{"$type":"i32","$type":"i32","value":1}"#)
            .unwrap_err();
        assert!(err.to_string().contains("duplicate field `$type`"));

        assert!(serde_json::to_string(&U::empty()).is_err());
    }

    #[test]
    fn wide_integers_keep_their_precision() {
        type Wide = TaggedUnion<u128, i128>;

        for u in [Wide::val1(u128::MAX), Wide::val2(i128::MIN)] {
            let record = Json::encode(&u).unwrap();
            assert_eq!(Json::decode::<u128, i128>(record).unwrap(), u);

            let json = serde_json::to_string(&u).unwrap();
            assert_eq!(serde_json::from_str::<Wide>(&json).unwrap(), u);

            let json = WireCodec::<Registered>::to_string(&u).unwrap();
            assert_eq!(WireCodec::<Registered>::from_str::<u128, i128>(&json).unwrap(), u);
        }

        assert_eq!(
            Json::to_string(&Wide::val1(u128::MAX)).unwrap(),
            r#"{"$type":"u128","value":340282366920938463463374607431768211455}"#
        );

        // Payload ahead of the discriminator goes through the buffered path.
        let back: Wide = serde_json::from_str(
            r#"{"value":-170141183460469231731687303715884105728,"$type":"i128"}"#,
        )
        .unwrap();
        assert_eq!(back, Wide::val2(i128::MIN));
    }

    mod left {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct Id(pub u8);
    }

    mod right {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct Id(pub u8);
    }

    #[test]
    fn shared_wire_names_are_rejected() {
        type Twin = TaggedUnion<u8, u8>;

        let u = Twin::val2(9);
        match Json::encode(&u) {
            Err(WireError::AmbiguousDiscriminator(name)) => assert_eq!(name, "u8"),
            other => panic!("unexpected result: {other:?}"),
        }
        let err = serde_json::to_string(&u).unwrap_err();
        assert!(err.to_string().contains("both variants are named `u8`"));

        let err = Json::decode::<u8, u8>(json!({ "$type": "u8", "value": 9 })).unwrap_err();
        assert!(matches!(err, WireError::AmbiguousDiscriminator(_)));
        assert!(!err.is_format());
        assert!(serde_json::from_str::<Twin>(r#"{"$type":"u8","value":9}"#).is_err());
        assert!(serde_json::from_str::<Twin>(r#"{"value":9,"$type":"u8"}"#).is_err());

        // Distinct types with the same simple name collide too.
        let ids = TaggedUnion::<left::Id, right::Id>::val2(right::Id(3));
        assert!(matches!(
            Json::encode(&ids),
            Err(WireError::AmbiguousDiscriminator(_))
        ));
        let json = WireCodec::<QualifiedName>::to_string(&ids).unwrap();
        let back = WireCodec::<QualifiedName>::from_str::<left::Id, right::Id>(&json).unwrap();
        assert_eq!(back, ids);
    }

    #[test]
    fn positional_records() {
        let u: U = serde_json::from_str(r#"["i32", 7]"#).unwrap();
        assert_eq!(u, U::val1(7));
        let u: U = serde_json::from_value(json!(["String", "x"])).unwrap();
        assert_eq!(u, U::val2("x".into()));

        let err = serde_json::from_str::<U>(r#"["i32"]"#).unwrap_err();
        assert!(err.to_string().contains("invalid length 1"));
        let err = serde_json::from_str::<U>(r#"["Bogus", 7]"#).unwrap_err();
        assert!(err.to_string().contains("unknown discriminator `Bogus`"));
    }

    #[test]
    fn outcome_round_trip() {
        let failed: Outcome<u64, OrderError> = Outcome::error(OrderError {
            id: 9,
            reason: "out of stock".into(),
        });
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(
            json,
            json!({ "$type": "OrderError", "value": { "id": 9, "reason": "out of stock" } })
        );
        let back: Outcome<u64, OrderError> = serde_json::from_value(json).unwrap();
        assert_eq!(back, failed);

        let nested: Outcome<Maybe<String>, OrderError> = Outcome::ok(Maybe::some("a".into()));
        let json = serde_json::to_value(&nested).unwrap();
        assert_eq!(
            json,
            json!({ "$type": "Maybe<String>", "value": { "$type": "String", "value": "a" } })
        );
        let back: Outcome<Maybe<String>, OrderError> = serde_json::from_value(json).unwrap();
        assert_eq!(back, nested);
    }
}
