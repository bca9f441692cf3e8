use anyhow::{Result, Context, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, warn, info, debug};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::app_config::Config;
use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::language_utils::LanguageSpec;
use crate::review::{BulkStatus, ReviewSession, StatusFilter, SuggestionOutcome};
use crate::subtitle_processor::{SubtitleCollection, TimedBlock};
use crate::translation::{BatchTranslator, LanguageModel, TranslationService, request_suggestion};
use crate::verification::{self, ScoreBand, VerificationResult};

// @module: Application controller for subtitle translation and verification

/// Options of the `verify` command
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// Write the (reviewed) translation to this path
    pub export_path: Option<PathBuf>,
    /// Print the result as JSON instead of a table
    pub json: bool,
    /// Open an interactive review session on stdin
    pub interactive: bool,
    /// Overwrite an existing export file
    pub force_overwrite: bool,
}

/// Outcome counts of a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// One command of the interactive review loop
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewCommand {
    List,
    Filter(StatusFilter),
    Bulk(bool),
    Select(u32),
    SelectAll,
    Mark(BulkStatus),
    Edit(u32, String),
    Suggest(u32),
    Apply(u32),
    Dismiss(u32),
    /// Write the corrected SRT; `force` replaces an existing file
    Export { path: PathBuf, force: bool },
    Stats,
    Help,
    Quit,
}

impl ReviewCommand {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let id = || -> Result<u32> {
            rest.split_whitespace()
                .next()
                .ok_or_else(|| anyhow!("Missing line ID"))?
                .parse::<u32>()
                .map_err(|_| anyhow!("Invalid line ID: {}", rest))
        };

        match verb.to_lowercase().as_str() {
            "list" | "ls" => Ok(Self::List),
            "filter" => Ok(Self::Filter(rest.parse()?)),
            "bulk" => match rest.to_lowercase().as_str() {
                "on" => Ok(Self::Bulk(true)),
                "off" => Ok(Self::Bulk(false)),
                _ => Err(anyhow!("Usage: bulk on|off")),
            },
            "select" => Ok(Self::Select(id()?)),
            "select-all" => Ok(Self::SelectAll),
            "mark" => Ok(Self::Mark(rest.parse()?)),
            "edit" => {
                let (id_part, text) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("Usage: edit <id> <text>"))?;
                let id = id_part.parse::<u32>()
                    .map_err(|_| anyhow!("Invalid line ID: {}", id_part))?;
                // `\n` in the typed text stands for a line break
                Ok(Self::Edit(id, text.trim().replace("\\n", "\n")))
            }
            "suggest" => Ok(Self::Suggest(id()?)),
            "apply" => Ok(Self::Apply(id()?)),
            "dismiss" => Ok(Self::Dismiss(id()?)),
            "export" => {
                let (force, path) = match rest.strip_prefix("-f") {
                    Some(path) if path.is_empty() || path.starts_with(char::is_whitespace) => (true, path.trim()),
                    _ => (false, rest),
                };
                if path.is_empty() {
                    return Err(anyhow!("Usage: export [-f] <path>"));
                }
                Ok(Self::Export { path: PathBuf::from(path), force })
            }
            "stats" => Ok(Self::Stats),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(anyhow!("Unknown command: {} (type 'help')", other)),
        }
    }
}

const REVIEW_HELP: &str = "\
Commands:
  list                    show visible lines
  filter <f>              all | correct | minor_issue | incorrect | timestamp_mismatch
  bulk on|off             enter or leave bulk mode (clears the selection)
  select <id>             toggle one line's selection (bulk mode)
  select-all              toggle every visible line (bulk mode)
  mark <status>           set correct | minor_issue | incorrect on the selection
  edit <id> <text>        replace a translation (\\n for a line break)
  suggest <id>            ask for an improved translation
  apply <id>              apply the pending suggestion
  dismiss <id>            drop the pending suggestion
  export [-f] <path>      write the corrected SRT (-f replaces an existing file)
  stats                   status counts
  quit                    end the session";

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parsed (source, target) languages
    pub fn languages(&self) -> Result<(LanguageSpec, LanguageSpec)> {
        Ok((self.config.source_spec()?, self.config.target_spec()?))
    }

    /// Provider-backed language model for the configured provider
    pub fn language_model(&self) -> Result<TranslationService> {
        TranslationService::new(self.config.translation.clone())
            .context("Failed to create translation service")
    }

    fn spinner(message: impl Into<String>) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.into());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Load and parse a subtitle file, failing when it holds no valid block
    pub fn load_subtitles(path: &Path) -> Result<SubtitleCollection> {
        let collection = SubtitleCollection::from_file(path)?;
        if collection.is_empty() {
            return Err(SubtitleError::NoBlocks(path.display().to_string()).into());
        }
        Ok(collection)
    }

    // =========================================================================
    // Translate
    // =========================================================================

    /// Translate a file or every `.srt` file beneath a directory
    pub async fn run(&self, input_path: PathBuf, output_path: Option<PathBuf>, force_overwrite: bool) -> Result<()> {
        if input_path.is_dir() {
            if output_path.is_some() {
                warn!("Output path is ignored in folder mode; files are written next to their sources");
            }
            self.run_folder(input_path, force_overwrite).await?;
            return Ok(());
        }

        if !input_path.is_file() {
            return Err(anyhow!("Input path does not exist: {:?}", input_path));
        }

        let model = self.language_model()?;
        let output_path = match output_path {
            Some(path) => path,
            None => self.default_output_path(&input_path)?,
        };
        FileManager::check_writable(&output_path, force_overwrite)?;

        let multi_progress = MultiProgress::new();
        self.translate_file(&model, &input_path, &output_path, &multi_progress).await?;
        Ok(())
    }

    fn default_output_path(&self, input_file: &Path) -> Result<PathBuf> {
        let (_, target) = self.languages()?;
        let output_dir = input_file.parent().unwrap_or(Path::new("."));
        Ok(FileManager::generate_output_path(input_file, output_dir, &target.file_tag()))
    }

    /// Translate one file with the given model and write the result
    pub async fn translate_file<M: LanguageModel + ?Sized>(
        &self,
        model: &M,
        input_file: &Path,
        output_file: &Path,
        multi_progress: &MultiProgress,
    ) -> Result<PathBuf> {
        let start_time = Instant::now();
        let (source, target) = self.languages()?;

        let collection = Self::load_subtitles(input_file)?;
        log_stats(&collection);

        let translated = self
            .translate_blocks(model, &collection.blocks, &source, &target, multi_progress)
            .await
            .with_context(|| format!("Failed to translate {:?}", input_file))?;

        let output = SubtitleCollection {
            name: output_file.display().to_string(),
            content: String::new(),
            blocks: translated,
        };
        output.write_to_srt(output_file)?;

        info!(
            "Translation completed in {}: {:?}",
            Self::format_duration(start_time.elapsed()),
            output_file
        );
        Ok(output_file.to_path_buf())
    }

    /// Translate blocks chunk by chunk, showing a progress bar
    pub async fn translate_blocks<M: LanguageModel + ?Sized>(
        &self,
        model: &M,
        blocks: &[TimedBlock],
        source: &LanguageSpec,
        target: &LanguageSpec,
        multi_progress: &MultiProgress,
    ) -> Result<Vec<TimedBlock>> {
        let common = &self.config.translation.common;
        let mut translator = BatchTranslator::new(model, source, target)
            .with_max_chars(self.config.translation.get_max_chars_per_request())
            .with_temperature(common.temperature);
        if let Some(template) = &common.system_prompt {
            translator = translator.with_system_template(template);
        }

        info!("Translating {} lines to {} with {}", blocks.len(), target, model.describe());

        let progress_bar = multi_progress.add(ProgressBar::new(0));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style);
        progress_bar.set_message("Translating");

        let pb = progress_bar.clone();
        let result = translator
            .translate_blocks(blocks, move |done, total| {
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            })
            .await;

        progress_bar.finish_and_clear();
        Ok(result?)
    }

    /// Translate every `.srt` file beneath a directory; existing outputs are skipped unless forced
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = Instant::now();
        let model = self.language_model()?;
        let (_, target) = self.languages()?;
        let tag = target.file_tag();
        let suffix = format!(".{}.srt", tag);

        // Skip our own outputs from earlier runs
        let files: Vec<PathBuf> = FileManager::find_srt_files(&input_dir)?
            .into_iter()
            .filter(|path| {
                !path.file_name()
                    .map(|name| name.to_string_lossy().to_lowercase().ends_with(&suffix))
                    .unwrap_or(false)
            })
            .collect();

        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style);

        let mut summary = FolderSummary::default();

        for file in &files {
            let file_name = file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = file.parent().unwrap_or(&input_dir);
            let output_path = FileManager::generate_output_path(file, output_dir, &tag);
            if output_path.exists() && !force_overwrite {
                warn!("Skipping {}, translation already exists (use -f to force overwrite)", file_name);
                summary.skipped += 1;
                folder_pb.inc(1);
                continue;
            }

            match self.translate_file(&model, file, &output_path, &multi_progress).await {
                Ok(_) => summary.processed += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.errors += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Folder processing completed in {}: {} processed, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.skipped,
            summary.errors
        );

        Ok(summary)
    }

    // =========================================================================
    // Verify
    // =========================================================================

    /// Parse both files and run a verification with the given model.
    ///
    /// Empty or non-overlapping inputs fail before the model is contacted.
    pub async fn verify_files<M: LanguageModel + ?Sized>(
        &self,
        model: &M,
        source_path: &Path,
        target_path: &Path,
    ) -> Result<VerificationResult> {
        let (source_lang, target_lang) = self.languages()?;
        let source = Self::load_subtitles(source_path)?;
        let target = Self::load_subtitles(target_path)?;
        log_stats(&source);
        log_stats(&target);

        let spinner = Self::spinner(format!("Verifying with {}", model.describe()));
        let result = verification::verify(model, &source.blocks, &target.blocks, &source_lang, &target_lang).await;
        spinner.finish_and_clear();

        result.with_context(|| format!("Failed to verify {:?} against {:?}", target_path, source_path))
    }

    /// The `verify` command: verify, report, optionally review and export
    pub async fn run_verify(&self, source_path: &Path, target_path: &Path, options: VerifyOptions) -> Result<()> {
        let model = self.language_model()?;
        let result = self.verify_files(&model, source_path, target_path).await?;

        let mut stdout = std::io::stdout();
        if options.json {
            writeln!(stdout, "{}", serde_json::to_string_pretty(&result).context("Failed to serialize result")?)?;
        } else {
            write_report(&result, &mut stdout)?;
        }

        let mut session = ReviewSession::new(result);

        if options.interactive {
            let (source_lang, target_lang) = self.languages()?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            review_loop(&mut session, &model, &source_lang, &target_lang, stdin, &mut stdout).await?;
        }

        match &options.export_path {
            Some(path) if path.as_os_str() == "-" => write!(stdout, "{}", session.export_srt())?,
            Some(path) => {
                FileManager::check_writable(path, options.force_overwrite)?;
                export_session(&session, path)?;
            }
            None => {}
        }

        Ok(())
    }
}

fn log_stats(collection: &SubtitleCollection) {
    let stats = collection.stats();
    info!(
        "{}: {} blocks, {} characters, ends at {}",
        collection.name,
        stats.block_count,
        stats.total_chars,
        stats.duration.as_deref().unwrap_or("-")
    );
}

/// Write the corrected SRT of a session
pub fn export_session(session: &ReviewSession, path: &Path) -> Result<()> {
    FileManager::write_to_file(path, &session.export_srt())?;
    info!("Exported {} line(s) to {:?}", session.items().len(), path);
    Ok(())
}

fn band_label(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Good => "good",
        ScoreBand::Fair => "fair",
        ScoreBand::Poor => "poor",
    }
}

/// Human-readable verification summary followed by one row per line
pub fn write_report(result: &VerificationResult, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Overall score: {}/100 ({})", result.overall_score, band_label(result.score_band()))?;
    writeln!(out, "Summary: {}", result.summary)?;
    writeln!(out, "Lines analyzed: {}", result.lines_analyzed())?;
    writeln!(out, "Timestamp mismatches: {}", result.timestamp_mismatch_count)?;
    if !result.dropped_source_ids.is_empty() {
        writeln!(out, "Missing from target: {:?}", result.dropped_source_ids)?;
    }
    if !result.unmatched_target_ids.is_empty() {
        writeln!(out, "Not in source: {:?}", result.unmatched_target_ids)?;
    }
    writeln!(out)?;

    for item in &result.items {
        write_item_row(item, false, out)?;
    }
    Ok(())
}

fn write_item_row(item: &verification::VerificationItem, selected: bool, out: &mut impl Write) -> Result<()> {
    let marker = if selected { "[x] " } else { "" };
    let drift = if item.timestamp_mismatch { " [timing]" } else { "" };
    writeln!(
        out,
        "{}#{} {} --> {} [{}]{}",
        marker, item.id, item.start_time, item.end_time, item.status, drift
    )?;
    writeln!(out, "    source: {}", item.source_text.replace('\n', " / "))?;
    writeln!(out, "    target: {}", item.translated_text.replace('\n', " / "))?;
    writeln!(out, "    note:   {}", item.feedback)?;
    Ok(())
}

/// Run review commands read line by line until `quit` or end of input
pub async fn review_loop<M, R, W>(
    session: &mut ReviewSession,
    model: &M,
    source_language: &LanguageSpec,
    target_language: &LanguageSpec,
    reader: R,
    out: &mut W,
) -> Result<()>
where
    M: LanguageModel + ?Sized,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    info!("Review session {} started; type 'help' for commands", session.short_id());
    let mut lines = reader.lines();

    loop {
        write!(out, "review> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read command")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match ReviewCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        if command == ReviewCommand::Quit {
            break;
        }
        debug!("Session {}: {:?}", session.short_id(), command);

        if let Err(e) = execute_command(session, command, model, source_language, target_language, out).await {
            writeln!(out, "Error: {:#}", e)?;
        }
    }

    info!("Review session {} ended", session.short_id());
    Ok(())
}

/// Apply one review command to a session
pub async fn execute_command<M, W>(
    session: &mut ReviewSession,
    command: ReviewCommand,
    model: &M,
    source_language: &LanguageSpec,
    target_language: &LanguageSpec,
    out: &mut W,
) -> Result<()>
where
    M: LanguageModel + ?Sized,
    W: Write,
{
    match command {
        ReviewCommand::List => {
            let visible = session.visible_items();
            writeln!(out, "{} line(s), filter: {}", visible.len(), session.filter())?;
            for item in visible {
                write_item_row(item, session.is_selected(item.id), out)?;
                if let Some(pending) = session.pending_suggestion(item.id) {
                    writeln!(out, "    suggestion: {}", pending)?;
                }
            }
        }
        ReviewCommand::Filter(filter) => {
            session.set_filter(filter);
            writeln!(out, "Filter: {} ({} visible)", filter, session.visible_items().len())?;
        }
        ReviewCommand::Bulk(on) => {
            if on {
                session.enter_bulk_mode();
            } else {
                session.exit_bulk_mode();
            }
            writeln!(out, "Bulk mode {}", if on { "on" } else { "off" })?;
        }
        ReviewCommand::Select(id) => {
            if !session.is_bulk_mode() {
                writeln!(out, "Enable bulk mode first: bulk on")?;
            } else if session.item(id).is_none() {
                writeln!(out, "No line {}", id)?;
            } else {
                let selected = session.toggle_selection(id);
                writeln!(out, "Line {} {}", id, if selected { "selected" } else { "deselected" })?;
            }
        }
        ReviewCommand::SelectAll => {
            if !session.is_bulk_mode() {
                writeln!(out, "Enable bulk mode first: bulk on")?;
            } else {
                session.toggle_select_all();
                writeln!(out, "{} selected", session.selection().len())?;
            }
        }
        ReviewCommand::Mark(status) => {
            let updated = session.apply_bulk_status(status);
            writeln!(out, "Marked {} line(s) {}", updated, status)?;
        }
        ReviewCommand::Edit(id, text) => {
            if session.edit_text(id, text) {
                writeln!(out, "Line {} corrected", id)?;
            } else {
                writeln!(out, "No line {}", id)?;
            }
        }
        ReviewCommand::Suggest(id) => {
            let Some(ticket) = session.begin_suggestion(id) else {
                writeln!(out, "No line {}", id)?;
                return Ok(());
            };

            let spinner = Controller::spinner(format!("Asking for a better line {}", id));
            let reply = request_suggestion(
                model,
                &ticket.source_text,
                &ticket.snapshot,
                source_language,
                target_language,
            )
            .await;
            spinner.finish_and_clear();

            let text = reply.with_context(|| format!("Suggestion for line {} failed; text unchanged", id))?;
            match session.receive_suggestion(&ticket, text) {
                SuggestionOutcome::Stored => {
                    let pending = session.pending_suggestion(id).unwrap_or_default();
                    writeln!(out, "Suggestion for line {}: {}", id, pending)?;
                    writeln!(out, "Use 'apply {}' or 'dismiss {}'", id, id)?;
                }
                SuggestionOutcome::Stale => writeln!(out, "Line {} changed meanwhile; suggestion discarded", id)?,
                SuggestionOutcome::UnknownItem => writeln!(out, "No line {}", id)?,
            }
        }
        ReviewCommand::Apply(id) => {
            if session.apply_suggestion(id) {
                writeln!(out, "Suggestion applied to line {}", id)?;
            } else {
                writeln!(out, "No pending suggestion for line {}", id)?;
            }
        }
        ReviewCommand::Dismiss(id) => {
            if session.dismiss_suggestion(id) {
                writeln!(out, "Suggestion for line {} dismissed", id)?;
            } else {
                writeln!(out, "No pending suggestion for line {}", id)?;
            }
        }
        ReviewCommand::Export { path, force } => {
            FileManager::check_writable(&path, force)?;
            export_session(session, &path)?;
            writeln!(out, "Exported to {}", path.display())?;
        }
        ReviewCommand::Stats => {
            let counts = session.status_counts();
            writeln!(
                out,
                "correct: {}, minor_issue: {}, incorrect: {}, corrected: {}, timing: {}",
                counts.correct, counts.minor_issue, counts.incorrect, counts.corrected, counts.timestamp_mismatch
            )?;
        }
        ReviewCommand::Help => writeln!(out, "{}", REVIEW_HELP)?,
        ReviewCommand::Quit => {}
    }
    Ok(())
}
