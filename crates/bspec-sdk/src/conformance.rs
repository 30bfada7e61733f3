use std::fmt;

use serde::{Deserialize, Serialize};

/// Completeness tiers for an archive, measured by document count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConformanceLevel {
    /// Minimum viable business spec.
    Bronze,
    /// Investment ready.
    Silver,
    /// Operational excellence.
    Gold,
}

impl ConformanceLevel {
    /// All levels, lowest first.
    pub const ALL: [Self; 3] = [Self::Bronze, Self::Silver, Self::Gold];

    /// Documents an archive must hold to reach this level.
    pub fn min_documents(&self) -> usize {
        match self {
            Self::Bronze => 12,
            Self::Silver => 25,
            Self::Gold => 45,
        }
    }

    /// Highest level reached with `document_count` documents.
    pub fn achieved(document_count: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .rev()
            .find(|level| document_count >= level.min_documents())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for ConformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        assert_eq!(ConformanceLevel::Bronze.min_documents(), 12);
        assert_eq!(ConformanceLevel::Silver.min_documents(), 25);
        assert_eq!(ConformanceLevel::Gold.min_documents(), 45);
    }

    #[test]
    fn achieved_picks_highest_level_met() {
        assert_eq!(ConformanceLevel::achieved(0), None);
        assert_eq!(ConformanceLevel::achieved(11), None);
        assert_eq!(ConformanceLevel::achieved(12), Some(ConformanceLevel::Bronze));
        assert_eq!(ConformanceLevel::achieved(30), Some(ConformanceLevel::Silver));
        assert_eq!(ConformanceLevel::achieved(45), Some(ConformanceLevel::Gold));
        assert_eq!(ConformanceLevel::achieved(1000), Some(ConformanceLevel::Gold));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ConformanceLevel::Silver).unwrap(), "\"silver\"");
        assert_eq!(ConformanceLevel::Gold.to_string(), "gold");
        assert!(ConformanceLevel::Bronze < ConformanceLevel::Gold);
    }
}
