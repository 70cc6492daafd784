//! Declared-type names, as used by [`TaggedUnion::variant_name`] and by the
//! wire discriminator.
//!
//! The default discriminator is the *simple* name of a type: every module path
//! is stripped, including inside generic arguments. Two distinct types that
//! share a simple name (say `billing::Error` and `shipping::Error`) are
//! therefore indistinguishable on the wire. Codecs that cannot live with that
//! pick [`QualifiedName`] or [`Registered`] instead.
//!
//! [`TaggedUnion::variant_name`]: crate::TaggedUnion::variant_name

use std::{any, borrow::Cow};

use crate::Unit;

/// Returns the simple name of `T`.
///
/// ```rust
/// use duet::name::simple_name;
///
/// assert_eq!(simple_name::<String>(), "String");
/// assert_eq!(simple_name::<Vec<Option<String>>>(), "Vec<Option<String>>");
/// ```
pub fn simple_name<T: ?Sized>() -> Cow<'static, str> {
    strip_paths(any::type_name::<T>())
}

fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ':'
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

fn strip_paths(full: &'static str) -> Cow<'static, str> {
    if !full.contains("::") {
        return Cow::Borrowed(full);
    }
    if full.chars().all(is_path_char) {
        return Cow::Borrowed(last_segment(full));
    }

    let mut out = String::with_capacity(full.len());
    let mut rest = full;
    while let Some(c) = rest.chars().next() {
        match rest.find(|c: char| !is_path_char(c)).unwrap_or(rest.len()) {
            0 => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
            run => {
                out.push_str(last_segment(&rest[..run]));
                rest = &rest[run..];
            }
        }
    }
    Cow::Owned(out)
}

/// A policy mapping a type to its wire discriminator.
pub trait Naming<T: ?Sized> {
    fn name() -> Cow<'static, str>;
}

/// Module paths stripped: `Vec<String>`, `OrderError`, `i32`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleName;

/// The full [`std::any::type_name`], e.g. `alloc::string::String`.
///
/// The exact text is not guaranteed stable across compiler releases.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualifiedName;

/// Names registered through [`Discriminator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Registered;

/// An explicitly registered wire name.
pub trait Discriminator {
    const NAME: &'static str;
}

impl<T: ?Sized> Naming<T> for SimpleName {
    fn name() -> Cow<'static, str> {
        simple_name::<T>()
    }
}

impl<T: ?Sized> Naming<T> for QualifiedName {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed(any::type_name::<T>())
    }
}

impl<T: Discriminator + ?Sized> Naming<T> for Registered {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed(T::NAME)
    }
}

macro_rules! discriminators {
    [$($t:ty => $name:literal),* $(,)?] => {
        $(impl Discriminator for $t {
            const NAME: &'static str = $name;
        })*
    };
}

discriminators![
    bool => "Boolean",
    char => "Char",
    i8 => "SByte",
    i16 => "Int16",
    i32 => "Int32",
    i64 => "Int64",
    i128 => "Int128",
    u8 => "Byte",
    u16 => "UInt16",
    u32 => "UInt32",
    u64 => "UInt64",
    u128 => "UInt128",
    f32 => "Single",
    f64 => "Double",
    String => "String",
    Unit => "Unit",
];
