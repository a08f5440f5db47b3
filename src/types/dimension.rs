//! The three fixed rhetorical dimensions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A rhetorical dimension along which opinions are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Credibility and authority.
    Ethos,
    /// Logical reasoning.
    Logos,
    /// Vivid emotional and transformative impact.
    Energeia,
}

impl Dimension {
    /// All dimensions, in canonical order.
    pub const ALL: [Dimension; 3] = [Dimension::Ethos, Dimension::Logos, Dimension::Energeia];

    /// Lowercase key, as used in JSON and prompts.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Ethos => "ethos",
            Self::Logos => "logos",
            Self::Energeia => "energeia",
        }
    }

    /// Uppercase label used for emphasis inside prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ethos => "ETHOS",
            Self::Logos => "LOGOS",
            Self::Energeia => "ENERGEIA",
        }
    }

    /// What the dimension measures.
    pub fn definition(&self) -> &'static str {
        match self {
            Self::Ethos => "credibility, authority, and trustworthiness",
            Self::Logos => "logical reasoning, evidence, and rational argumentation",
            Self::Energeia => "vivid impact, emotional energy, and transformative potential",
        }
    }

    /// Questions that keep a comparison on this dimension.
    pub fn focus(&self) -> &'static str {
        match self {
            Self::Ethos => {
                "How does each opinion establish credibility? What sources of authority do they \
                 invoke? How do they build trust with their audience?"
            }
            Self::Logos => {
                "What logical structure does each opinion use? What evidence or reasoning \
                 patterns do they employ? How do they construct their rational arguments?"
            }
            Self::Energeia => {
                "What emotional energy does each opinion generate? How vivid and impactful is \
                 their presentation? What transformative potential do they convey?"
            }
        }
    }

    /// Concrete features worth considering on this dimension.
    pub fn examples(&self) -> &'static str {
        match self {
            Self::Ethos => {
                "expertise claims, institutional authority, moral authority, experiential \
                 credibility, traditional vs. innovative authority"
            }
            Self::Logos => {
                "cause-and-effect reasoning, empirical evidence, logical fallacies, deductive vs. \
                 inductive reasoning, evidence types"
            }
            Self::Energeia => {
                "emotional intensity, vivid imagery, urgency, inspirational power, transformative \
                 vision"
            }
        }
    }

    /// Short gloss used in the analysis prompt.
    pub(crate) fn gloss(&self) -> &'static str {
        match self {
            Self::Ethos => "credibility/authority",
            Self::Logos => "logical reasoning",
            Self::Energeia => "vivid impact",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ethos" => Ok(Self::Ethos),
            "logos" => Ok(Self::Logos),
            "energeia" => Ok(Self::Energeia),
            other => Err(format!("unknown rhetorical dimension '{}'", other)),
        }
    }
}
