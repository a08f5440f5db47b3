//! Rhetorical profile of a single opinion.

use serde::{Deserialize, Serialize};

use super::dimension::Dimension;

/// An opinion together with a short qualitative description per dimension.
///
/// `content` is always the analyzed opinion verbatim. The dimension fields
/// may be empty when the profile came from a degraded extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RhetoricalProfile {
    pub content: String,
    pub ethos: String,
    pub logos: String,
    pub energeia: String,
}

impl RhetoricalProfile {
    /// A profile with no dimension descriptions.
    pub fn empty(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ethos: String::new(),
            logos: String::new(),
            energeia: String::new(),
        }
    }

    /// The description for `dimension`.
    pub fn describe(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Ethos => &self.ethos,
            Dimension::Logos => &self.logos,
            Dimension::Energeia => &self.energeia,
        }
    }

    /// Whether every dimension description is empty.
    pub fn is_blank(&self) -> bool {
        Dimension::ALL.iter().all(|d| self.describe(*d).is_empty())
    }
}

/// Outcome of extracting a profile from a model response.
///
/// Both variants carry a usable profile; `Degraded` additionally says why the
/// dimension descriptions are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileExtraction {
    Parsed(RhetoricalProfile),
    Degraded {
        profile: RhetoricalProfile,
        reason: String,
    },
}

impl ProfileExtraction {
    pub fn profile(&self) -> &RhetoricalProfile {
        match self {
            Self::Parsed(profile) | Self::Degraded { profile, .. } => profile,
        }
    }

    pub fn into_profile(self) -> RhetoricalProfile {
        match self {
            Self::Parsed(profile) | Self::Degraded { profile, .. } => profile,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// The degradation reason, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Parsed(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}
