use std::fmt;

use serde::{Deserialize, Serialize};

/// The "no value" marker held by [`Maybe::none`](crate::Maybe::none).
///
/// Serializes as a unit (`null` in JSON).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Unit;

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("()")
    }
}

impl From<()> for Unit {
    fn from((): ()) -> Self {
        Unit
    }
}
