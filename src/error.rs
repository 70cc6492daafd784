use std::borrow::Cow;

/// Failures raised by the union and its wrappers.
///
/// Wire failures live in [`WireError`](crate::WireError).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The operation needs a payload but the union is empty.
    #[error("the union is empty")]
    InvalidState,

    #[error("cannot narrow `{active}` to `{requested}`")]
    Cast {
        requested: Cow<'static, str>,
        active: Cow<'static, str>,
    },

    #[error("cannot construct a union from an absent payload")]
    Construction,

    #[error("expected {expected} handlers, found {found}")]
    HandlerCount { expected: usize, found: usize },

    /// A [`Maybe`](crate::Maybe) was asked for a value it does not hold.
    #[error("{0}")]
    Missing(Cow<'static, str>),
}
