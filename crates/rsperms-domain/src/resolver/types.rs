//! Result types for permission checks.

use std::fmt;

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tristate {
    /// Granted.
    True,
    /// Explicitly denied.
    False,
    /// No node decides; callers apply their own default.
    Undefined,
}

impl Tristate {
    /// Returns the decision, or `None` if undefined.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Tristate::True => Some(true),
            Tristate::False => Some(false),
            Tristate::Undefined => None,
        }
    }

    /// Returns true only for [`Tristate::True`].
    pub fn is_granted(self) -> bool {
        self == Tristate::True
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        if value {
            Tristate::True
        } else {
            Tristate::False
        }
    }
}

impl fmt::Display for Tristate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tristate::True => write!(f, "true"),
            Tristate::False => write!(f, "false"),
            Tristate::Undefined => write!(f, "undefined"),
        }
    }
}
