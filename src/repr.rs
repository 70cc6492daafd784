//! The module dealing with the underlying representation of the
//! [`TaggedUnion`] type.
//!
//! # Implementation details
//!
//! A union is a discriminant next to a hand-written untagged union of both
//! payloads:
//!
//! ```rust,no_run
//! # use core::mem::ManuallyDrop;
//! // For example only. Not actually defined.
//! struct RawTaggedUnion<T1, T2> {
//!     tag: u8,
//!     slots: Slots<T1, T2>,
//! }
//!
//! union Slots<T1, T2> {
//!     val1: ManuallyDrop<T1>,
//!     val2: ManuallyDrop<T2>,
//!     empty: (),
//! }
//! ```
//!
//! The tag is the single source of truth about which slot is initialized.
//! Every access here is `unsafe` and relies on the caller having checked it.
//!
//! [`TaggedUnion`]: crate::TaggedUnion

use std::mem::ManuallyDrop;

use crate::tag::{Index, Tag, V1, V2};

/// The untagged storage of a [`TaggedUnion`].
///
/// [`TaggedUnion`]: crate::TaggedUnion
pub union Slots<T1, T2> {
    pub(crate) val1: ManuallyDrop<T1>,
    pub(crate) val2: ManuallyDrop<T2>,
    pub(crate) empty: (),
}

impl<T1, T2> Slots<T1, T2> {
    pub(crate) const fn empty() -> Self {
        Slots { empty: () }
    }

    /// # Safety
    ///
    /// `tag` must name the initialized slot, and the slots must not be used
    /// afterwards.
    pub(crate) unsafe fn drop_in_place(&mut self, tag: Tag) {
        match tag {
            Tag::Empty => {}
            Tag::Val1 => unsafe { ManuallyDrop::drop(&mut self.val1) },
            Tag::Val2 => unsafe { ManuallyDrop::drop(&mut self.val2) },
        }
    }
}

/// The trait that slot storage implements to support manipulating the variant
/// of type `T` living at slot index `I`.
///
/// Both impls are disjoint only when `T1` and `T2` differ. For `T1 == T2` the
/// index cannot be inferred and must be named explicitly, which is how an
/// ambiguous construction becomes a compile error rather than a silent pick.
pub trait Select<T, I: Index>: Sized {
    #[doc(hidden)]
    fn from_data(data: T) -> Self;

    #[doc(hidden)]
    unsafe fn get(&self) -> &T;

    #[doc(hidden)]
    unsafe fn get_mut(&mut self) -> &mut T;

    #[doc(hidden)]
    unsafe fn take(self) -> T;
}

impl<T1, T2> Select<T1, V1> for Slots<T1, T2> {
    fn from_data(data: T1) -> Self {
        Slots {
            val1: ManuallyDrop::new(data),
        }
    }

    unsafe fn get(&self) -> &T1 {
        unsafe { &self.val1 }
    }

    unsafe fn get_mut(&mut self) -> &mut T1 {
        unsafe { &mut self.val1 }
    }

    unsafe fn take(self) -> T1 {
        unsafe { ManuallyDrop::into_inner(self.val1) }
    }
}

impl<T1, T2> Select<T2, V2> for Slots<T1, T2> {
    fn from_data(data: T2) -> Self {
        Slots {
            val2: ManuallyDrop::new(data),
        }
    }

    unsafe fn get(&self) -> &T2 {
        unsafe { &self.val2 }
    }

    unsafe fn get_mut(&mut self) -> &mut T2 {
        unsafe { &mut self.val2 }
    }

    unsafe fn take(self) -> T2 {
        unsafe { ManuallyDrop::into_inner(self.val2) }
    }
}
