//! The fixed, ordered list of intake stages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of the case-intake sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Details,
    Upload,
    Explain,
    Analyze,
    Reference,
    Lawsuit,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Details,
        Stage::Upload,
        Stage::Explain,
        Stage::Analyze,
        Stage::Reference,
        Stage::Lawsuit,
    ];

    pub fn first() -> Self {
        Self::ALL[0]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Details => "details",
            Self::Upload => "upload",
            Self::Explain => "explain",
            Self::Analyze => "analyze",
            Self::Reference => "reference",
            Self::Lawsuit => "lawsuit",
        }
    }

    /// Heading shown for the stage in the wizard.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Details => "Case Details",
            Self::Upload => "Upload Documents",
            Self::Explain => "Explain Case",
            Self::Analyze => "AI Analysis",
            Self::Reference => "Legal References",
            Self::Lawsuit => "Generate Lawsuit",
        }
    }

    /// Completion percentage when this stage is current, rounded.
    pub fn progress_percent(self) -> u8 {
        let total = Self::ALL.len();
        (((self.index() + 1) * 100 + total / 2) / total) as u8
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_matches_intake_sequence() {
        let names: Vec<_> = Stage::ALL.iter().map(Stage::as_str).collect();
        assert_eq!(
            names,
            ["details", "upload", "explain", "analyze", "reference", "lawsuit"]
        );
    }

    #[test]
    fn first_has_no_previous() {
        assert_eq!(Stage::first(), Stage::Details);
        assert!(Stage::Details.previous().is_none());
        assert_eq!(Stage::Upload.previous(), Some(Stage::Details));
    }

    #[test]
    fn last_has_no_next() {
        assert!(Stage::Lawsuit.is_last());
        assert!(Stage::Lawsuit.next().is_none());
        assert_eq!(Stage::Reference.next(), Some(Stage::Lawsuit));
    }

    #[test]
    fn progress() {
        assert_eq!(Stage::Details.progress_percent(), 17);
        assert_eq!(Stage::Explain.progress_percent(), 50);
        assert_eq!(Stage::Lawsuit.progress_percent(), 100);
    }
}
