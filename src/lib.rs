#![doc = include_str!("../README.md")]
#![deny(future_incompatible)]
#![deny(rust_2018_idioms)]

use std::{
    any::{self, Any, TypeId},
    borrow::Cow,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    mem::ManuallyDrop,
    ptr,
};

mod error;
pub mod maybe;
pub mod name;
pub mod outcome;
pub mod repr;
pub mod tag;
mod unit;
pub mod wire;

pub use self::{
    error::Error,
    maybe::Maybe,
    outcome::Outcome,
    tag::Tag,
    unit::Unit,
    wire::{WireCodec, WireError},
};
use self::{
    repr::{Select, Slots},
    tag::Index,
};

/// A value holding exactly one of `T1` or `T2`, or nothing at all.
///
/// The empty state is what [`Default`] produces. It is a real, observable
/// value: every operation that needs a payload reports
/// [`Error::InvalidState`] instead of panicking.
///
/// `T1` and `T2` should be distinct types. When they are equal, every method
/// taking a slot index `I` needs it spelled out ([`tag::V1`] or
/// [`tag::V2`]), since the compiler cannot pick a slot from the type alone.
/// Such a union has no wire form either: see [`WireError::AmbiguousDiscriminator`].
pub struct TaggedUnion<T1, T2> {
    tag: Tag,
    slots: Slots<T1, T2>,
}

/// A borrowed or owned view of a [`TaggedUnion`] as a plain Rust enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variant<T1, T2> {
    Empty,
    Val1(T1),
    Val2(T2),
}

impl<T1, T2> TaggedUnion<T1, T2> {
    pub const fn empty() -> Self {
        TaggedUnion {
            tag: Tag::Empty,
            slots: Slots::empty(),
        }
    }

    /// Constructs a union from a value of either variant type, picking the
    /// slot from the value's type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use duet::TaggedUnion;
    ///
    /// let u: TaggedUnion<i32, String> = TaggedUnion::new(42);
    /// assert_eq!(u.get::<i32, _>(), Some(&42));
    /// ```
    pub fn new<T, I>(value: T) -> Self
    where
        Slots<T1, T2>: Select<T, I>,
        I: Index,
    {
        TaggedUnion {
            tag: I::TAG,
            slots: <Slots<T1, T2> as Select<T, I>>::from_data(value),
        }
    }

    pub fn val1(value: T1) -> Self {
        Self::new::<T1, tag::V1>(value)
    }

    pub fn val2(value: T2) -> Self {
        Self::new::<T2, tag::V2>(value)
    }

    /// Like [`new`](Self::new), but rejects an absent payload with
    /// [`Error::Construction`].
    pub fn from_option<T, I>(value: Option<T>) -> Result<Self, Error>
    where
        Slots<T1, T2>: Select<T, I>,
        I: Index,
    {
        value.map(Self::new::<T, I>).ok_or(Error::Construction)
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn is_empty(&self) -> bool {
        self.tag.is_empty()
    }

    pub fn is_val1(&self) -> bool {
        self.tag == Tag::Val1
    }

    pub fn is_val2(&self) -> bool {
        self.tag == Tag::Val2
    }

    /// Whether the active variant is the declared type `T`.
    ///
    /// The slot for `T` is resolved at compile time, so asking for a type that
    /// is neither `T1` nor `T2` does not compile. An empty union is never any
    /// `T`.
    pub fn is<T, I>(&self) -> bool
    where
        Slots<T1, T2>: Select<T, I>,
        I: Index,
    {
        self.tag == I::TAG
    }

    pub fn get<T, I>(&self) -> Option<&T>
    where
        Slots<T1, T2>: Select<T, I>,
        I: Index,
    {
        // SAFETY: the tag says slot `I` is initialized.
        (self.tag == I::TAG)
            .then(|| unsafe { <Slots<T1, T2> as Select<T, I>>::get(&self.slots) })
    }

    pub fn get_mut<T, I>(&mut self) -> Option<&mut T>
    where
        Slots<T1, T2>: Select<T, I>,
        I: Index,
    {
        if self.tag != I::TAG {
            return None;
        }
        // SAFETY: the tag says slot `I` is initialized.
        Some(unsafe { <Slots<T1, T2> as Select<T, I>>::get_mut(&mut self.slots) })
    }

    /// Narrows the union to `T`, failing with [`Error::Cast`] when another
    /// variant (or nothing) is active.
    pub fn cast<T, I>(&self) -> Result<&T, Error>
    where
        Slots<T1, T2>: Select<T, I>,
        I: Index,
    {
        self.get::<T, I>().ok_or_else(|| Error::Cast {
            requested: name::simple_name::<T>(),
            active: self.variant_name(),
        })
    }

    pub fn try_unwrap<T, I>(self) -> Result<T, Self>
    where
        Slots<T1, T2>: Select<T, I>,
        I: Index,
    {
        if self.tag != I::TAG {
            return Err(self);
        }
        let (_, slots) = self.into_raw();
        // SAFETY: the tag said slot `I` is initialized, and `into_raw` gave up
        // ownership of it.
        Ok(unsafe { <Slots<T1, T2> as Select<T, I>>::take(slots) })
    }

    fn into_raw(self) -> (Tag, Slots<T1, T2>) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the slots are moved out once.
        (this.tag, unsafe { ptr::read(&this.slots) })
    }

    pub fn as_variant(&self) -> Variant<&T1, &T2> {
        // SAFETY: the tag names the initialized slot.
        unsafe {
            match self.tag {
                Tag::Empty => Variant::Empty,
                Tag::Val1 => Variant::Val1(&*self.slots.val1),
                Tag::Val2 => Variant::Val2(&*self.slots.val2),
            }
        }
    }

    pub fn into_variant(self) -> Variant<T1, T2> {
        let (tag, slots) = self.into_raw();
        // SAFETY: the tag names the initialized slot, which is moved out once.
        unsafe {
            match tag {
                Tag::Empty => Variant::Empty,
                Tag::Val1 => Variant::Val1(ManuallyDrop::into_inner(slots.val1)),
                Tag::Val2 => Variant::Val2(ManuallyDrop::into_inner(slots.val2)),
            }
        }
    }

    pub fn by_ref(&self) -> TaggedUnion<&T1, &T2> {
        self.as_variant().into()
    }

    /// Consumes the union, passing the payload to exactly one handler.
    pub fn match_with<R>(
        self,
        on_val1: impl FnOnce(T1) -> R,
        on_val2: impl FnOnce(T2) -> R,
    ) -> Result<R, Error> {
        match self.into_variant() {
            Variant::Empty => Err(Error::InvalidState),
            Variant::Val1(value) => Ok(on_val1(value)),
            Variant::Val2(value) => Ok(on_val2(value)),
        }
    }

    pub fn match_ref<'a, R>(
        &'a self,
        on_val1: impl FnOnce(&'a T1) -> R,
        on_val2: impl FnOnce(&'a T2) -> R,
    ) -> Result<R, Error> {
        match self.as_variant() {
            Variant::Empty => Err(Error::InvalidState),
            Variant::Val1(value) => Ok(on_val1(value)),
            Variant::Val2(value) => Ok(on_val2(value)),
        }
    }

    pub fn switch_on(
        &self,
        on_val1: impl FnOnce(&T1),
        on_val2: impl FnOnce(&T2),
    ) -> Result<(), Error> {
        self.match_ref(on_val1, on_val2)
    }

    /// Dispatches the payload by position: `handlers[0]` receives a `T1`,
    /// `handlers[1]` a `T2`, both erased to `&dyn Any`.
    ///
    /// # Escape hatch
    ///
    /// Nothing ties the handlers to `T1` and `T2`. A handler downcasting to the
    /// wrong type only finds out at runtime, and swapping the two handlers
    /// compiles fine. Reach for [`match_ref`](Self::match_ref) unless the
    /// handlers really are heterogeneous. Fails with [`Error::HandlerCount`]
    /// unless exactly two handlers are given.
    pub fn match_any<R>(
        &self,
        handlers: &mut [&mut dyn FnMut(&dyn Any) -> R],
    ) -> Result<R, Error>
    where
        T1: 'static,
        T2: 'static,
    {
        let found = handlers.len();
        let [on_val1, on_val2] = handlers else {
            return Err(Error::HandlerCount { expected: 2, found });
        };
        match self.as_variant() {
            Variant::Empty => Err(Error::InvalidState),
            Variant::Val1(value) => Ok((*on_val1)(value)),
            Variant::Val2(value) => Ok((*on_val2)(value)),
        }
    }

    pub fn map_val1<U>(self, f: impl FnOnce(T1) -> U) -> TaggedUnion<U, T2> {
        match self.into_variant() {
            Variant::Empty => TaggedUnion::empty(),
            Variant::Val1(value) => TaggedUnion::val1(f(value)),
            Variant::Val2(value) => TaggedUnion::val2(value),
        }
    }

    pub fn map_val2<U>(self, f: impl FnOnce(T2) -> U) -> TaggedUnion<T1, U> {
        match self.into_variant() {
            Variant::Empty => TaggedUnion::empty(),
            Variant::Val1(value) => TaggedUnion::val1(value),
            Variant::Val2(value) => TaggedUnion::val2(f(value)),
        }
    }

    pub fn inspect<T, I, F>(self, f: F) -> Self
    where
        Slots<T1, T2>: Select<T, I>,
        I: Index,
        F: FnOnce(&T),
    {
        if let Some(value) = self.get::<T, I>() {
            f(value);
        }
        self
    }

    /// The simple name of the active declared type, or `"Empty"`.
    pub fn variant_name(&self) -> Cow<'static, str> {
        match self.tag {
            Tag::Empty => Cow::Borrowed("Empty"),
            Tag::Val1 => name::simple_name::<T1>(),
            Tag::Val2 => name::simple_name::<T2>(),
        }
    }

    pub fn type_name(&self) -> Option<&'static str> {
        match self.tag {
            Tag::Empty => None,
            Tag::Val1 => Some(any::type_name::<T1>()),
            Tag::Val2 => Some(any::type_name::<T2>()),
        }
    }
}

impl<T1: 'static, T2: 'static> TaggedUnion<T1, T2> {
    pub fn type_id(&self) -> Option<TypeId> {
        match self.tag {
            Tag::Empty => None,
            Tag::Val1 => Some(TypeId::of::<T1>()),
            Tag::Val2 => Some(TypeId::of::<T2>()),
        }
    }

    /// The runtime form of [`is`](Self::is): compares against the declared
    /// type of the active variant.
    pub fn is_type_id(&self, id: TypeId) -> bool {
        self.type_id() == Some(id)
    }

    pub fn as_any(&self) -> Option<&dyn Any> {
        match self.as_variant() {
            Variant::Empty => None,
            Variant::Val1(value) => Some(value),
            Variant::Val2(value) => Some(value),
        }
    }
}

impl<T1, T2> From<Variant<T1, T2>> for TaggedUnion<T1, T2> {
    fn from(variant: Variant<T1, T2>) -> Self {
        match variant {
            Variant::Empty => TaggedUnion::empty(),
            Variant::Val1(value) => TaggedUnion::val1(value),
            Variant::Val2(value) => TaggedUnion::val2(value),
        }
    }
}

impl<T1, T2> From<TaggedUnion<T1, T2>> for Variant<T1, T2> {
    fn from(union: TaggedUnion<T1, T2>) -> Self {
        union.into_variant()
    }
}

impl<T1, T2> Default for TaggedUnion<T1, T2> {
    fn default() -> Self {
        TaggedUnion::empty()
    }
}

impl<T1, T2> Drop for TaggedUnion<T1, T2> {
    fn drop(&mut self) {
        // SAFETY: the tag names the initialized slot.
        unsafe { self.slots.drop_in_place(self.tag) }
    }
}

impl<T1: Clone, T2: Clone> Clone for TaggedUnion<T1, T2> {
    fn clone(&self) -> Self {
        match self.as_variant() {
            Variant::Empty => TaggedUnion::empty(),
            Variant::Val1(value) => TaggedUnion::val1(value.clone()),
            Variant::Val2(value) => TaggedUnion::val2(value.clone()),
        }
    }
}

impl<T1: PartialEq, T2: PartialEq> PartialEq for TaggedUnion<T1, T2> {
    fn eq(&self, other: &Self) -> bool {
        self.as_variant() == other.as_variant()
    }
}

impl<T1: Eq, T2: Eq> Eq for TaggedUnion<T1, T2> {}

impl<T1: PartialOrd, T2: PartialOrd> PartialOrd for TaggedUnion<T1, T2> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_variant().partial_cmp(&other.as_variant())
    }
}

impl<T1: Ord, T2: Ord> Ord for TaggedUnion<T1, T2> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_variant().cmp(&other.as_variant())
    }
}

impl<T1: Hash, T2: Hash> Hash for TaggedUnion<T1, T2> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_variant().hash(state)
    }
}

impl<T1: fmt::Debug, T2: fmt::Debug> fmt::Debug for TaggedUnion<T1, T2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_variant() {
            Variant::Empty => f.write_str("Empty"),
            Variant::Val1(value) => f.debug_tuple("Val1").field(value).finish(),
            Variant::Val2(value) => f.debug_tuple("Val2").field(value).finish(),
        }
    }
}

impl<T1: fmt::Display, T2: fmt::Display> fmt::Display for TaggedUnion<T1, T2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_variant() {
            Variant::Empty => f.write_str("Empty"),
            Variant::Val1(value) => write!(f, "Val1({value})"),
            Variant::Val2(value) => write!(f, "Val2({value})"),
        }
    }
}
