use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity band for an extreme precipitation event, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Moderate,
    Strong,
    VeryStrong,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Moderate, Tier::Strong, Tier::VeryStrong];

    /// Key used in exports and event subset files.
    pub fn key(&self) -> &'static str {
        match self {
            Tier::Moderate => "moderate",
            Tier::Strong => "strong",
            Tier::VeryStrong => "very_strong",
        }
    }

    /// Number of standard deviations above the median where the tier starts.
    pub fn std_offset(&self) -> f64 {
        match self {
            Tier::Moderate => 0.0,
            Tier::Strong => 1.0,
            Tier::VeryStrong => 2.0,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Moderate => write!(f, "Moderate"),
            Tier::Strong => write!(f, "Strong"),
            Tier::VeryStrong => write!(f, "Very strong"),
        }
    }
}
