/*!
 * Batch translation processing.
 *
 * Blocks are sent as `[ID:n] text` lines, split into chunks bounded by the
 * provider's payload size and translated one chunk after another. Reply lines
 * are matched back to blocks by ID; anything unmatched keeps its text.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::errors::TranslationError;
use crate::language_utils::LanguageSpec;
use crate::subtitle_processor::TimedBlock;

use super::core::{CompletionRequest, LanguageModel};
use super::prompts::TranslationPromptBuilder;

/// Line break marker inside a single payload line
pub const LINE_BREAK_MARKER: &str = "<br>";

static REPLY_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[ID:(\d+)\]\s*(.*)$").unwrap()
});

/// Payload line for one block, built from its pre-translation text
pub fn format_payload_line(block: &TimedBlock) -> String {
    let text = block
        .source_text()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(&format!(" {} ", LINE_BREAK_MARKER));
    format!("[ID:{}] {}", block.id, text)
}

/// Newline-joined payload for a chunk of blocks
pub fn build_payload(blocks: &[TimedBlock]) -> String {
    blocks
        .iter()
        .map(format_payload_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split blocks into chunks whose payload stays within `max_chars`.
///
/// A single block larger than the limit still gets a chunk of its own.
pub fn split_into_chunks(blocks: &[TimedBlock], max_chars: usize) -> Vec<&[TimedBlock]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut size = 0;

    for (index, block) in blocks.iter().enumerate() {
        let line_len = format_payload_line(block).chars().count() + 1;
        if index > start && size + line_len > max_chars {
            chunks.push(&blocks[start..index]);
            start = index;
            size = 0;
        }
        size += line_len;
    }

    if start < blocks.len() {
        chunks.push(&blocks[start..]);
    }

    chunks
}

/// Extract `ID -> translated text` from a reply.
///
/// Lines without a parseable `[ID:n]` prefix are ignored, as are empty
/// translations. Later lines for the same ID win.
pub fn parse_translation_reply(reply: &str) -> HashMap<u32, String> {
    let mut translations = HashMap::new();

    for line in reply.lines() {
        let Some(captures) = REPLY_LINE_REGEX.captures(line.trim()) else {
            continue;
        };
        let Ok(id) = captures[1].parse::<u32>() else {
            continue;
        };

        let text = captures[2]
            .split(LINE_BREAK_MARKER)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if !text.is_empty() {
            translations.insert(id, text);
        }
    }

    translations
}

/// Apply translations by ID; blocks without one keep their text
pub fn apply_translations(blocks: &[TimedBlock], translations: &HashMap<u32, String>) -> Vec<TimedBlock> {
    blocks
        .iter()
        .map(|block| match translations.get(&block.id) {
            Some(text) => block.with_text(text.as_str()),
            None => block.clone(),
        })
        .collect()
}

/// Translates subtitle blocks chunk by chunk through a language model
pub struct BatchTranslator<'a, M: LanguageModel + ?Sized> {
    /// The model every chunk is sent to
    model: &'a M,

    /// Prompt builder for the language pair
    prompts: TranslationPromptBuilder,

    /// Payload budget per request
    max_chars_per_request: usize,

    /// Sampling temperature
    temperature: Option<f32>,
}

impl<'a, M: LanguageModel + ?Sized> BatchTranslator<'a, M> {
    /// Create a new batch translator
    pub fn new(model: &'a M, source_language: &LanguageSpec, target_language: &LanguageSpec) -> Self {
        Self {
            model,
            prompts: TranslationPromptBuilder::new(source_language, target_language),
            max_chars_per_request: 4000,
            temperature: None,
        }
    }

    pub fn with_max_chars(mut self, max_chars_per_request: usize) -> Self {
        self.max_chars_per_request = max_chars_per_request.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Use a custom system prompt template
    pub fn with_system_template(mut self, template: &str) -> Self {
        self.prompts = self.prompts.with_system_template(template);
        self
    }

    /// Translate all blocks, reporting `(chunks_done, chunks_total)` after each chunk.
    ///
    /// Any failed request fails the whole translation; no partial result is returned.
    pub async fn translate_blocks(
        &self,
        blocks: &[TimedBlock],
        progress_callback: impl Fn(usize, usize),
    ) -> Result<Vec<TimedBlock>, TranslationError> {
        let chunks = split_into_chunks(blocks, self.max_chars_per_request);
        let total = chunks.len();
        let mut translations = HashMap::new();

        for (index, chunk) in chunks.iter().enumerate() {
            let start_time = Instant::now();
            let (system, user) = self.prompts.build(&build_payload(chunk));
            let mut request = CompletionRequest::new(system, user);
            if let Some(temperature) = self.temperature {
                request = request.temperature(temperature);
            }

            let reply = self.model.generate(request).await?;
            let chunk_ids: HashSet<u32> = chunk.iter().map(|b| b.id).collect();
            let (parsed, foreign): (HashMap<u32, String>, HashMap<u32, String>) = parse_translation_reply(&reply)
                .into_iter()
                .partition(|(id, _)| chunk_ids.contains(id));
            if !foreign.is_empty() {
                warn!("Chunk {}/{}: ignoring {} line(s) with IDs outside the chunk", index + 1, total, foreign.len());
            }

            let missing = chunk.iter().filter(|b| !parsed.contains_key(&b.id)).count();
            if missing > 0 {
                warn!("Chunk {}/{}: {} of {} lines came back untranslated", index + 1, total, missing, chunk.len());
            }
            debug!("Chunk {}/{} translated in {:?}", index + 1, total, start_time.elapsed());

            translations.extend(parsed);
            progress_callback(index + 1, total);
        }

        Ok(apply_translations(blocks, &translations))
    }
}
