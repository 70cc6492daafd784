//! Variant tags, at runtime and at the type level.

/// The runtime discriminant of a [`TaggedUnion`].
///
/// [`TaggedUnion`]: crate::TaggedUnion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Tag {
    /// No payload. This is what [`Default`] produces.
    #[default]
    Empty,
    /// The first slot is occupied.
    Val1,
    /// The second slot is occupied.
    Val2,
}

impl Tag {
    pub const fn is_empty(self) -> bool {
        matches!(self, Tag::Empty)
    }
}

/// A type-level slot index.
///
/// Slot indices let the compiler pick the slot that a requested type lives in,
/// so `union.get::<String, _>()` never needs a runtime type query.
pub trait Index {
    const TAG: Tag;
}

/// The index of the first slot.
pub enum V1 {}

/// The index of the second slot.
pub enum V2 {}

impl Index for V1 {
    const TAG: Tag = Tag::Val1;
}

impl Index for V2 {
    const TAG: Tag = Tag::Val2;
}
