use std::cell::Cell;

use duet::{Error, Maybe, Outcome, TaggedUnion, Unit, WireCodec, WireError};
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
#[error("order {0} failed")]
struct OrderError(u16);

type U = TaggedUnion<i64, String>;
type Json = WireCodec<duet::wire::SimpleName>;

fn any_union() -> impl Strategy<Value = U> {
    prop_oneof![
        Just(U::empty()),
        any::<i64>().prop_map(U::val1),
        ".{0,12}".prop_map(U::val2),
    ]
}

proptest! {
    #[test]
    fn wrap_then_narrow_round_trips(v in any::<i64>()) {
        let u: U = TaggedUnion::new(v);
        prop_assert_eq!(u.cast::<i64, _>(), Ok(&v));
        prop_assert_eq!(u.try_unwrap::<i64, _>().ok(), Some(v));
    }

    #[test]
    fn match_invokes_exactly_one_handler(u in any_union()) {
        let first = Cell::new(0);
        let second = Cell::new(0);
        let result = u.match_ref(
            |v| {
                first.set(first.get() + 1);
                v.to_string()
            },
            |s| {
                second.set(second.get() + 1);
                s.clone()
            },
        );

        match u.as_variant() {
            duet::Variant::Empty => {
                prop_assert_eq!(result, Err(Error::InvalidState));
                prop_assert_eq!(first.get() + second.get(), 0);
            }
            duet::Variant::Val1(v) => {
                prop_assert_eq!(result, Ok(v.to_string()));
                prop_assert_eq!((first.get(), second.get()), (1, 0));
            }
            duet::Variant::Val2(s) => {
                prop_assert_eq!(result, Ok(s.clone()));
                prop_assert_eq!((first.get(), second.get()), (0, 1));
            }
        }
    }

    #[test]
    fn equality_is_an_equivalence(a in any_union(), b in any_union(), c in any_union()) {
        prop_assert_eq!(&a, &a.clone());
        prop_assert_eq!(a == b, b == a);
        if a == b && b == c {
            prop_assert_eq!(&a, &c);
        }
        prop_assert_eq!(a == b, a.tag() == b.tag() && a.as_variant() == b.as_variant());
    }

    #[test]
    fn outcome_map_never_touches_errors(code in any::<u16>(), k in any::<i32>()) {
        let failed = Outcome::<i32, OrderError>::error(OrderError(code));
        prop_assert_eq!(failed.clone().map(|x| x.wrapping_add(k)), failed.clone());
        prop_assert_eq!(failed.clone().bind(|x| Outcome::ok(x)), failed);
        prop_assert_eq!(
            Outcome::<i32, OrderError>::ok(k).map(|x| x.wrapping_add(1)),
            Outcome::ok(k.wrapping_add(1))
        );
    }

    #[test]
    fn wire_round_trip(u in any_union().prop_filter("non-empty", |u| !u.is_empty())) {
        let record = Json::encode(&u).unwrap();
        let back: U = Json::decode(record).unwrap();
        prop_assert_eq!(&back, &u);

        let json = serde_json::to_string(&u).unwrap();
        prop_assert_eq!(serde_json::from_str::<U>(&json).unwrap(), u);
    }

    #[test]
    fn missing_payload_is_a_format_error(
        name in prop_oneof![Just("i64"), Just("String"), Just("Bogus")]
    ) {
        let err = Json::decode::<i64, String>(serde_json::json!({ "$type": name })).unwrap_err();
        prop_assert!(matches!(err, WireError::MissingField("value")));
    }
}

#[test]
fn option_wire_round_trip() {
    let some = Maybe::some(42);
    let json = serde_json::to_string(&some).unwrap();
    assert_eq!(serde_json::from_str::<Maybe<i32>>(&json).unwrap(), some);

    let err = Json::decode::<i32, Unit>(serde_json::json!({ "$type": "Bogus", "value": 1 }))
        .unwrap_err();
    assert!(matches!(err, WireError::UnknownDiscriminator { .. }));
}

#[test]
fn outcome_unwraps_the_stored_error() {
    let failed = Outcome::<i32, OrderError>::error(OrderError(404));
    assert_eq!(failed.get_value_or_throw(), Err(OrderError(404)));
}
