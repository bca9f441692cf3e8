use anyhow::{Result, anyhow};
use isolang::Language;
use std::fmt;

/// Language utilities for ISO language code handling
///
/// This module resolves the language settings accepted on the command line
/// and in the config file (ISO 639-1/639-2 codes, English names, `auto`
/// and romanized variants) into the labels used in provider prompts.

/// ISO 639-2/B codes that differ from their 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"), ("ger", "deu"), ("dut", "nld"), ("gre", "ell"),
    ("chi", "zho"), ("cze", "ces"), ("ice", "isl"), ("alb", "sqi"),
    ("arm", "hye"), ("baq", "eus"), ("bur", "mya"), ("per", "fas"),
    ("geo", "kat"), ("may", "msa"), ("mac", "mkd"), ("rum", "ron"),
    ("slo", "slk"), ("wel", "cym"),
];

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => {
            if let Some(lang) = Language::from_639_1(&normalized_code) {
                return Ok(lang.to_639_3().to_string());
            }
        }
        3 => {
            if Language::from_639_3(&normalized_code).is_some() {
                return Ok(normalized_code);
            }
            if let Some((_, terminology)) = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(bibliographic, _)| *bibliographic == normalized_code)
            {
                return Ok(terminology.to_string());
            }
        }
        _ => {}
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// A resolved language setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSpec {
    /// Let the provider detect the language (source side only)
    Auto,
    /// A regular language, written in its usual script
    Named {
        /// English name, e.g. "French"
        name: String,
        /// ISO 639-2/T code
        code: String,
    },
    /// A language written in Latin script instead of its usual one
    Romanized {
        /// English name of the base language
        name: String,
        /// ISO 639-2/T code of the base language
        code: String,
    },
}

impl LanguageSpec {
    /// Resolve a language setting.
    ///
    /// Accepts `auto`/`Auto Detect`, ISO codes (`fr`, `fra`, `fre`), English
    /// names (`French`) and romanized variants (`hi-Latn`, `Hindi (Romanized)`).
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let lower = trimmed.to_lowercase();

        if matches!(lower.as_str(), "auto" | "auto detect" | "auto-detect") {
            return Ok(Self::Auto);
        }

        if let Some(base) = lower.strip_suffix("-latn") {
            let (name, code) = resolve_base(base)?;
            return Ok(Self::Romanized { name, code });
        }

        if let Some(base) = lower.strip_suffix("(romanized)") {
            let (name, code) = resolve_base(base.trim())?;
            return Ok(Self::Romanized { name, code });
        }

        let (name, code) = resolve_base(trimmed)?;
        Ok(Self::Named { name, code })
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// ISO 639-2/T code, if the language is known
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Auto => None,
            Self::Named { code, .. } | Self::Romanized { code, .. } => Some(code),
        }
    }

    /// Label used inside provider prompts
    pub fn prompt_label(&self) -> String {
        match self {
            Self::Auto => "Auto Detect".to_string(),
            Self::Named { name, .. } => name.clone(),
            Self::Romanized { name, code } if code == "hin" => {
                format!("{} (written in Roman script/Hinglish)", name)
            }
            Self::Romanized { name, .. } => format!("{} (written in Roman script)", name),
        }
    }

    /// Short tag used in output file names, e.g. `fr` or `hi-latn`
    pub fn file_tag(&self) -> String {
        match self {
            Self::Auto => "auto".to_string(),
            Self::Named { code, .. } => short_code(code),
            Self::Romanized { code, .. } => format!("{}-latn", short_code(code)),
        }
    }
}

impl fmt::Display for LanguageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "Auto Detect"),
            Self::Named { name, .. } => write!(f, "{}", name),
            Self::Romanized { name, .. } => write!(f, "{} (Romanized)", name),
        }
    }
}

/// Resolve an ISO code or English name into (name, 639-2/T code)
fn resolve_base(input: &str) -> Result<(String, String)> {
    let input = input.trim();

    if let Ok(code) = normalize_to_part2t(input) {
        let name = get_language_name(&code)?;
        return Ok((name, code));
    }

    let lang = Language::from_name(input)
        .or_else(|| Language::from_name(&title_case(input)))
        .ok_or_else(|| anyhow!("Unknown language: {}", input))?;

    Ok((lang.to_name().to_string(), lang.to_639_3().to_string()))
}

fn title_case(input: &str) -> String {
    let lower = input.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn short_code(code: &str) -> String {
    Language::from_639_3(code)
        .and_then(|lang| lang.to_639_1())
        .map(|c| c.to_string())
        .unwrap_or_else(|| code.to_string())
}
