//! Cost tiers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named cost preset selected by caller intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Lower cost, for interactive logins and other latency-sensitive paths
    Quick,
    /// Higher cost, for credentials that must resist offline brute force
    Strong,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Quick, Tier::Strong];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Quick => "quick",
            Tier::Strong => "strong",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
