use std::fmt;
use std::str::FromStr;
use anyhow::{anyhow, Result};

use crate::verification::{VerificationItem, VerificationStatus};

/// Which review items are visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    /// `correct` and `corrected` lines
    Correct,
    MinorIssue,
    Incorrect,
    /// Lines whose timing drifted, whatever their status
    TimestampMismatch,
}

impl StatusFilter {
    pub fn matches(&self, item: &VerificationItem) -> bool {
        match self {
            Self::All => true,
            Self::Correct => item.status.is_resolved(),
            Self::MinorIssue => item.status == VerificationStatus::MinorIssue,
            Self::Incorrect => item.status == VerificationStatus::Incorrect,
            Self::TimestampMismatch => item.timestamp_mismatch,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Correct => "correct",
            Self::MinorIssue => "minor_issue",
            Self::Incorrect => "incorrect",
            Self::TimestampMismatch => "timestamp_mismatch",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "all" => Ok(Self::All),
            "correct" => Ok(Self::Correct),
            "minor_issue" | "minor" => Ok(Self::MinorIssue),
            "incorrect" => Ok(Self::Incorrect),
            "timestamp_mismatch" | "timestamp" | "timing" => Ok(Self::TimestampMismatch),
            _ => Err(anyhow!("Unknown filter: {}", s)),
        }
    }
}

/// Items matching `filter`, in their original order
pub fn filter_items(items: &[VerificationItem], filter: StatusFilter) -> Vec<&VerificationItem> {
    items.iter().filter(|item| filter.matches(item)).collect()
}
