/*!
 * Verification records and their status vocabulary.
 */

use std::fmt;
use std::str::FromStr;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::subtitle_processor::TimedBlock;

/// Review status of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Correct,
    MinorIssue,
    Incorrect,
    /// Set only by a point edit of the translated text
    Corrected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::MinorIssue => "minor_issue",
            Self::Incorrect => "incorrect",
            Self::Corrected => "corrected",
        }
    }

    /// Whether the line counts as resolved for filtering purposes
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Correct | Self::Corrected)
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "corrected" => Ok(Self::Corrected),
            other => AssignableStatus::from_str(other).map(Self::from),
        }
    }
}

/// Statuses an assessor or a bulk action may assign.
///
/// Only editing a line's text produces `corrected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignableStatus {
    Correct,
    MinorIssue,
    Incorrect,
}

impl From<AssignableStatus> for VerificationStatus {
    fn from(status: AssignableStatus) -> Self {
        match status {
            AssignableStatus::Correct => Self::Correct,
            AssignableStatus::MinorIssue => Self::MinorIssue,
            AssignableStatus::Incorrect => Self::Incorrect,
        }
    }
}

impl fmt::Display for AssignableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", VerificationStatus::from(*self))
    }
}

impl FromStr for AssignableStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "correct" => Ok(Self::Correct),
            "minor_issue" => Ok(Self::MinorIssue),
            "incorrect" => Ok(Self::Incorrect),
            _ => Err(anyhow!("Invalid status: {}", s)),
        }
    }
}

/// One row of the review workset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationItem {
    pub id: u32,
    pub status: VerificationStatus,
    pub feedback: String,
    pub source_text: String,
    pub translated_text: String,
    /// Source start timecode; never edited
    pub start_time: String,
    /// Source end timecode; never edited
    pub end_time: String,
    pub timestamp_mismatch: bool,
}

impl VerificationItem {
    /// Caption block carrying the current translation on source timing
    pub fn to_block(&self) -> TimedBlock {
        TimedBlock::new(self.id, &self.start_time, &self.end_time, &self.translated_text)
    }
}

/// Quality band of an overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

/// Result of one verification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// Externally supplied score, 0-100
    pub overall_score: u8,
    pub summary: String,
    /// Items in source order
    pub items: Vec<VerificationItem>,
    /// Lines whose timing drifted, fixed at merge time
    pub timestamp_mismatch_count: usize,
    /// Source IDs left out because the target lacks them
    #[serde(default)]
    pub dropped_source_ids: Vec<u32>,
    /// Target IDs the source does not have
    #[serde(default)]
    pub unmatched_target_ids: Vec<u32>,
}

impl VerificationResult {
    pub fn lines_analyzed(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, id: u32) -> Option<&VerificationItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn score_band(&self) -> ScoreBand {
        match self.overall_score {
            90..=100 => ScoreBand::Good,
            70..=89 => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }
}
