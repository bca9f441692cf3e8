/*!
 * Prompt templates for subtitle translation, assessment and suggestion.
 */

use crate::language_utils::LanguageSpec;

/// System prompt template with `{source_language}`/`{target_language}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for subtitle translation.
    pub const SUBTITLE_TRANSLATOR: &'static str = "You are an expert subtitle translator working from {source_language} to {target_language}. Translate dialogue naturally and keep lines short enough for their display time.";

    /// The system prompt for translation quality assessment.
    pub const QUALITY_REVIEWER: &'static str = "You are a professional subtitle quality assurance specialist reviewing {target_language} translations of {source_language} dialogue. Reply with JSON only.";

    /// The system prompt for single-line improvements.
    pub const LINE_EDITOR: &'static str = "You are a professional subtitle translator polishing {target_language} translations of {source_language} dialogue.";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default subtitle translator template.
    pub fn subtitle_translator() -> Self {
        Self::new(Self::SUBTITLE_TRANSLATOR)
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

/// `Target Language: ...` line shared by every prompt
fn language_instruction(target: &LanguageSpec, conversational_hint: bool) -> String {
    match target {
        LanguageSpec::Romanized { .. } if conversational_hint => {
            format!("Target Language: {}. Use natural conversational style.", target.prompt_label())
        }
        _ => format!("Target Language: {}", target.prompt_label()),
    }
}

/// Builds the prompts for a `[ID:n] text` translation request
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    source_language: LanguageSpec,
    target_language: LanguageSpec,
    system_template: PromptTemplate,
}

impl TranslationPromptBuilder {
    pub fn new(source_language: &LanguageSpec, target_language: &LanguageSpec) -> Self {
        Self {
            source_language: source_language.clone(),
            target_language: target_language.clone(),
            system_template: PromptTemplate::subtitle_translator(),
        }
    }

    /// Replace the system prompt template, e.g. from the config file
    pub fn with_system_template(mut self, template: &str) -> Self {
        self.system_template = PromptTemplate::new(template);
        self
    }

    pub fn build_system_prompt(&self) -> String {
        self.system_template.render(
            &self.source_language.prompt_label(),
            &self.target_language.prompt_label(),
        )
    }

    /// User prompt wrapping an already formatted payload
    pub fn build_user_prompt(&self, payload: &str) -> String {
        format!(
            "Source Language: {source}\n\
             {target}\n\n\
             Translate the following subtitle lines into the target language.\n\n\
             RULES:\n\
             1. Keep exactly one output line per input line.\n\
             2. Never merge or split lines.\n\
             3. Keep every [ID:n] prefix unchanged.\n\
             4. Keep translations concise enough for subtitle timing.\n\
             5. Keep <br> markers where the line breaks.\n\
             6. Output only the translated lines with their ID prefixes.\n\n\
             Input:\n{payload}",
            source = self.source_language.prompt_label(),
            target = language_instruction(&self.target_language, true),
            payload = payload,
        )
    }

    /// (system, user) prompt pair
    pub fn build(&self, payload: &str) -> (String, String) {
        (self.build_system_prompt(), self.build_user_prompt(payload))
    }
}

/// Builds the prompts for a JSON quality assessment
#[derive(Debug, Clone)]
pub struct AssessmentPromptBuilder {
    source_language: LanguageSpec,
    target_language: LanguageSpec,
}

impl AssessmentPromptBuilder {
    pub fn new(source_language: &LanguageSpec, target_language: &LanguageSpec) -> Self {
        Self {
            source_language: source_language.clone(),
            target_language: target_language.clone(),
        }
    }

    pub fn build_system_prompt(&self) -> String {
        PromptTemplate::new(PromptTemplate::QUALITY_REVIEWER).render(
            &self.source_language.prompt_label(),
            &self.target_language.prompt_label(),
        )
    }

    /// User prompt for pre-formatted `ID/Source/Translation` pairs
    pub fn build_user_prompt(&self, pairs: &str) -> String {
        format!(
            "Source Language: {source}\n\
             {target}\n\n\
             Check the translation of each subtitle pair below for:\n\
             1. Meaning accuracy.\n\
             2. Tone and context.\n\n\
             Give every pair a status of \"correct\", \"minor_issue\" or \"incorrect\" \
             with brief feedback for any problem, then an overall score from 0 to 100 \
             and a short summary of the translation quality.\n\n\
             Reply with a JSON object of this shape:\n\
             {{\"overallScore\": 0, \"summary\": \"\", \"items\": [{{\"id\": 1, \"status\": \"correct\", \"feedback\": \"\"}}]}}\n\n\
             Input Pairs:\n{pairs}",
            source = self.source_language.prompt_label(),
            target = language_instruction(&self.target_language, false),
            pairs = pairs,
        )
    }

    pub fn build(&self, pairs: &str) -> (String, String) {
        (self.build_system_prompt(), self.build_user_prompt(pairs))
    }
}

/// Builds the prompts asking for one improved line
#[derive(Debug, Clone)]
pub struct SuggestionPromptBuilder {
    source_language: LanguageSpec,
    target_language: LanguageSpec,
}

impl SuggestionPromptBuilder {
    pub fn new(source_language: &LanguageSpec, target_language: &LanguageSpec) -> Self {
        Self {
            source_language: source_language.clone(),
            target_language: target_language.clone(),
        }
    }

    pub fn build(&self, source_text: &str, current_translation: &str) -> (String, String) {
        let system = PromptTemplate::new(PromptTemplate::LINE_EDITOR).render(
            &self.source_language.prompt_label(),
            &self.target_language.prompt_label(),
        );
        let user = format!(
            "Source Language: {source}\n\
             {target}\n\n\
             Original Text: \"{original}\"\n\
             Current Translation: \"{current}\"\n\n\
             Give one improved translation that is more accurate, natural and concise, \
             fixing grammar and awkward phrasing. \
             Return only the translated text, without quotes or explanations.",
            source = self.source_language.prompt_label(),
            target = language_instruction(&self.target_language, false),
            original = source_text,
            current = current_translation,
        );
        (system, user)
    }
}
