use std::fmt;
use std::fs;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

// @module: SRT parsing and serialization

// @const: SRT timecode line regex
static TIMECODE_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2},\d{3}) --> (\d{2}:\d{2}:\d{2},\d{3})$").unwrap()
});

// @struct: Single caption unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedBlock {
    // @field: Line identity, the join key between source and target
    pub id: u32,

    // @field: Start timecode, HH:MM:SS,mmm
    pub start_time: String,

    // @field: End timecode, HH:MM:SS,mmm
    pub end_time: String,

    // @field: Caption text, possibly multi-line
    pub text: String,

    // @field: Text as first parsed, before any translation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
}

impl TimedBlock {
    /// Creates a block without an original-text annotation
    pub fn new(id: u32, start_time: impl Into<String>, end_time: impl Into<String>, text: impl Into<String>) -> Self {
        TimedBlock {
            id,
            start_time: start_time.into(),
            end_time: end_time.into(),
            text: text.into(),
            original_text: None,
        }
    }

    /// Returns a copy of this block carrying different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        TimedBlock {
            text: text.into(),
            ..self.clone()
        }
    }

    /// Text to feed a translator: the pre-translation text when known
    pub fn source_text(&self) -> &str {
        self.original_text.as_deref().unwrap_or(&self.text)
    }

    /// Start time in milliseconds, if the timecode is well formed
    pub fn start_ms(&self) -> Option<u64> {
        Self::parse_timestamp(&self.start_time).ok()
    }

    /// End time in milliseconds, if the timecode is well formed
    pub fn end_ms(&self) -> Option<u64> {
        Self::parse_timestamp(&self.end_time).ok()
    }

    /// Parse an SRT timestamp to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ','][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for TimedBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.id)?;
        writeln!(f, "{} --> {}", self.start_time, self.end_time)?;
        writeln!(f, "{}", self.text)
    }
}

/// Parse SRT content into timed blocks.
///
/// Never fails: groups of lines that do not form an index line, a timecode
/// line and at least one text line are dropped. An input without a single
/// well-formed block yields an empty vector; deciding whether that is an
/// error is up to the caller.
pub fn parse_srt(content: &str) -> Vec<TimedBlock> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let normalized = content.replace("\r\n", "\n");

    let mut blocks = Vec::new();
    let mut skipped = 0usize;
    let mut group: Vec<&str> = Vec::new();

    let lines: Vec<&str> = normalized.split('\n').collect();
    for (index, &line) in lines.iter().enumerate() {
        if is_block_break(&lines, index) {
            if !group.is_empty() {
                match parse_block(&group) {
                    Some(block) => blocks.push(block),
                    None => skipped += 1,
                }
                group.clear();
            }
            continue;
        }
        group.push(line);
    }

    if !group.is_empty() {
        match parse_block(&group) {
            Some(block) => blocks.push(block),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Dropped {} malformed subtitle block(s)", skipped);
    }

    blocks
}

/// An empty line always ends a block. A whitespace-only line is caption text
/// unless the next block's index and timecode lines follow it.
fn is_block_break(lines: &[&str], index: usize) -> bool {
    let line = lines[index];
    if line.is_empty() {
        return true;
    }
    if !line.trim().is_empty() {
        return false;
    }
    match (lines.get(index + 1), lines.get(index + 2)) {
        (Some(next), Some(timecode)) => {
            parse_index_line(next).is_some() && TIMECODE_LINE_REGEX.is_match(timecode.trim_end())
        }
        _ => true,
    }
}

/// Parse one blank-line-delimited group of lines.
///
/// Stray lines ahead of the index line are skipped so that a block glued to
/// leading garbage is still recovered.
fn parse_block(lines: &[&str]) -> Option<TimedBlock> {
    for start in 0..lines.len().saturating_sub(2) {
        let Some(id) = parse_index_line(lines[start]) else {
            continue;
        };
        let Some(caps) = TIMECODE_LINE_REGEX.captures(lines[start + 1].trim_end()) else {
            continue;
        };

        let text = lines[start + 2..].join("\n").trim().to_string();
        if text.is_empty() {
            return None;
        }

        return Some(TimedBlock {
            id,
            start_time: caps[1].to_string(),
            end_time: caps[2].to_string(),
            original_text: Some(text.clone()),
            text,
        });
    }

    None
}

fn parse_index_line(line: &str) -> Option<u32> {
    let trimmed = line.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u32>().ok().filter(|id| *id > 0)
}

/// Serialize blocks to SRT, in the order given.
///
/// Each block is emitted as `id\nstart --> end\ntext\n`, separated by a
/// blank line. `original_text` is not part of the wire format.
pub fn to_srt(blocks: &[TimedBlock]) -> String {
    blocks
        .iter()
        .map(|block| block.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary figures for a caption file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleStats {
    /// Number of parsed blocks
    pub block_count: usize,

    /// End timecode of the last block
    pub duration: Option<String>,

    /// Total characters of caption text
    pub total_chars: usize,
}

/// A named caption file with its raw content and parsed blocks
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// File name, used in messages and output naming
    pub name: String,

    /// Raw file content
    pub content: String,

    /// Parsed blocks, in file order
    pub blocks: Vec<TimedBlock>,
}

impl SubtitleCollection {
    /// Parse a collection from in-memory content
    pub fn from_string(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let blocks = parse_srt(&content);
        SubtitleCollection {
            name: name.into(),
            content,
            blocks,
        }
    }

    /// Read and parse an SRT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;

        let name = path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let collection = Self::from_string(name, content);
        if collection.blocks.is_empty() {
            warn!("No valid subtitle blocks found in {}", path.display());
        }
        Ok(collection)
    }

    /// Whether the file yielded no blocks at all
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Serialize the blocks back to SRT
    pub fn to_srt(&self) -> String {
        to_srt(&self.blocks)
    }

    /// Write the blocks to an SRT file, creating parent directories as needed
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        fs::write(path, self.to_srt())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))
    }

    /// Block count, duration and character count
    pub fn stats(&self) -> SubtitleStats {
        SubtitleStats {
            block_count: self.blocks.len(),
            duration: self.blocks.last().map(|block| block.end_time.clone()),
            total_chars: self.blocks.iter().map(|block| block.text.chars().count()).sum(),
        }
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {}", self.name)?;
        writeln!(f, "Entries: {}", self.blocks.len())?;
        Ok(())
    }
}
