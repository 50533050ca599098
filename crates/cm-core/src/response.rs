//! Rise and settling times that may never complete.

use serde::{Deserialize, Serialize};

use crate::numeric::Real;

/// Time for a response to rise or settle.
///
/// `Infinite` means the response never completed inside the window being
/// analysed. It is rendered as the configured sentinel on output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "seconds", rename_all = "snake_case")]
pub enum ResponseTime {
    Finite(Real),
    Infinite,
}

impl ResponseTime {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Seconds, if the response completed.
    pub fn seconds(&self) -> Option<Real> {
        match self {
            Self::Finite(s) => Some(*s),
            Self::Infinite => None,
        }
    }

    /// Infinite always exceeds; finite compares strictly.
    pub fn exceeds(&self, threshold_s: Real) -> bool {
        match self {
            Self::Finite(s) => *s > threshold_s,
            Self::Infinite => true,
        }
    }

    /// Numeric form with `sentinel` standing in for infinity.
    pub fn or_sentinel(&self, sentinel: Real) -> Real {
        self.seconds().unwrap_or(sentinel)
    }
}

impl std::fmt::Display for ResponseTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(s) => write!(f, "{s:.3}s"),
            Self::Infinite => write!(f, "INFINITY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_exceeds_any_threshold() {
        assert!(ResponseTime::Infinite.exceeds(1e9));
        assert!(!ResponseTime::Finite(2.0).exceeds(2.0));
        assert!(ResponseTime::Finite(2.1).exceeds(2.0));
    }

    #[test]
    fn sentinel_rendering() {
        assert_eq!(ResponseTime::Infinite.or_sentinel(-999.0), -999.0);
        assert_eq!(ResponseTime::Finite(1.5).or_sentinel(-999.0), 1.5);
        assert_eq!(ResponseTime::Infinite.to_string(), "INFINITY");
    }
}
