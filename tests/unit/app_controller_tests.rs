/*!
 * Tests for review commands, the review loop and the text report
 */

use std::path::PathBuf;
use anyhow::Result;

use subcheck::app_controller::{ReviewCommand, review_loop, write_report};
use subcheck::language_utils::LanguageSpec;
use subcheck::providers::mock::MockProvider;
use subcheck::review::{BulkStatus, ReviewSession, StatusFilter};
use subcheck::verification::VerificationStatus;
use crate::common;

fn languages() -> (LanguageSpec, LanguageSpec) {
    (LanguageSpec::parse("en").unwrap(), LanguageSpec::parse("fr").unwrap())
}

async fn run_script(session: &mut ReviewSession, model: &MockProvider, script: &str) -> Result<String> {
    let (source, target) = languages();
    let mut out = Vec::new();
    review_loop(session, model, &source, &target, script.as_bytes(), &mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn test_reviewCommand_parse_shouldRecognizeCommands() {
    assert_eq!(ReviewCommand::parse("list").unwrap(), ReviewCommand::List);
    assert_eq!(ReviewCommand::parse("filter minor").unwrap(), ReviewCommand::Filter(StatusFilter::MinorIssue));
    assert_eq!(ReviewCommand::parse("bulk ON").unwrap(), ReviewCommand::Bulk(true));
    assert_eq!(ReviewCommand::parse("select 12").unwrap(), ReviewCommand::Select(12));
    assert_eq!(ReviewCommand::parse("mark minor_issue").unwrap(), ReviewCommand::Mark(BulkStatus::MinorIssue));
    assert_eq!(
        ReviewCommand::parse("edit 4 Salut\\ntoi").unwrap(),
        ReviewCommand::Edit(4, "Salut\ntoi".to_string())
    );
    assert_eq!(
        ReviewCommand::parse("export out/fixed.srt").unwrap(),
        ReviewCommand::Export { path: PathBuf::from("out/fixed.srt"), force: false }
    );
    assert_eq!(
        ReviewCommand::parse("export -f out/fixed.srt").unwrap(),
        ReviewCommand::Export { path: PathBuf::from("out/fixed.srt"), force: true }
    );
    assert_eq!(ReviewCommand::parse("q").unwrap(), ReviewCommand::Quit);
}

#[test]
fn test_reviewCommand_parse_shouldRejectBadInput() {
    assert!(ReviewCommand::parse("mark corrected").is_err());
    assert!(ReviewCommand::parse("select one").is_err());
    assert!(ReviewCommand::parse("edit 4").is_err());
    assert!(ReviewCommand::parse("bulk maybe").is_err());
    assert!(ReviewCommand::parse("export").is_err());
    assert!(ReviewCommand::parse("export -f").is_err());
    assert!(ReviewCommand::parse("frobnicate").is_err());
}

#[test]
fn test_writeReport_shouldListSummaryAndRows() -> Result<()> {
    let mut result = common::mixed_result();
    result.dropped_source_ids = vec![9];

    let mut out = Vec::new();
    write_report(&result, &mut out)?;
    let report = String::from_utf8(out)?;

    assert!(report.contains("Overall score: 80/100 (fair)"));
    assert!(report.contains("Timestamp mismatches: 1"));
    assert!(report.contains("Missing from target: [9]"));
    assert!(report.contains("#3 00:00:06,000 --> 00:00:06,500 [incorrect] [timing]"));
    Ok(())
}

#[tokio::test]
async fn test_reviewLoop_withBulkAndEdits_shouldMutateSession() -> Result<()> {
    let model = MockProvider::working();
    let mut session = ReviewSession::new(common::mixed_result());

    let script = "bulk on\nselect 1\nselect 2\nmark incorrect\nedit 3 new\\ntext\nstats\nquit\nedit 4 ignored\n";
    let output = run_script(&mut session, &model, script).await?;

    assert_eq!(session.item(1).unwrap().status, VerificationStatus::Incorrect);
    assert_eq!(session.item(2).unwrap().status, VerificationStatus::Incorrect);
    assert_eq!(session.item(3).unwrap().translated_text, "new\ntext");
    assert_eq!(session.item(3).unwrap().status, VerificationStatus::Corrected);
    assert_eq!(session.item(4).unwrap().translated_text, "target 4");
    assert!(output.contains("Marked 2 line(s) incorrect"));
    assert_eq!(model.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_reviewLoop_selectOutsideBulkMode_shouldBeRefused() -> Result<()> {
    let model = MockProvider::working();
    let mut session = ReviewSession::new(common::mixed_result());

    let output = run_script(&mut session, &model, "select 1\nmark correct\n").await?;

    assert!(output.contains("Enable bulk mode first"));
    assert!(output.contains("Marked 0 line(s) correct"));
    assert_eq!(session.item(2).unwrap().status, VerificationStatus::MinorIssue);
    Ok(())
}

#[tokio::test]
async fn test_reviewLoop_suggestThenApply_shouldUseModelReply() -> Result<()> {
    let model = MockProvider::replying("\"better four\"");
    let mut session = ReviewSession::new(common::mixed_result());

    let output = run_script(&mut session, &model, "suggest 4\napply 4\n").await?;

    assert_eq!(model.request_count(), 1);
    assert!(output.contains("Suggestion for line 4: better four"));
    assert_eq!(session.item(4).unwrap().translated_text, "better four");
    assert_eq!(session.item(4).unwrap().status, VerificationStatus::Corrected);
    Ok(())
}

#[tokio::test]
async fn test_reviewLoop_failedSuggestion_shouldKeepTextAndContinue() -> Result<()> {
    let model = MockProvider::failing();
    let mut session = ReviewSession::new(common::mixed_result());

    let output = run_script(&mut session, &model, "suggest 1\nedit 1 still working\n").await?;

    assert!(output.contains("Error: Suggestion for line 1 failed"));
    assert_eq!(session.item(1).unwrap().translated_text, "still working");
    assert!(session.pending_suggestion(1).is_none());
    Ok(())
}

#[tokio::test]
async fn test_reviewLoop_export_shouldWriteCorrectedFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("fixed.srt");
    let model = MockProvider::working();
    let mut session = ReviewSession::new(common::mixed_result());

    let script = format!("edit 1 one\nexport {}\n", path.display());
    run_script(&mut session, &model, &script).await?;

    let written = std::fs::read_to_string(&path)?;
    assert!(written.starts_with("1\n00:00:02,000 --> 00:00:02,500\none\n"));
    Ok(())
}

#[tokio::test]
async fn test_reviewLoop_exportOverExistingFile_shouldRefuseUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "fixed.srt", "keep me")?;
    let model = MockProvider::working();
    let mut session = ReviewSession::new(common::mixed_result());

    let output = run_script(&mut session, &model, &format!("export {}\n", path.display())).await?;
    assert!(output.contains("Error: Output file already exists"));
    assert_eq!(std::fs::read_to_string(&path)?, "keep me");

    run_script(&mut session, &model, &format!("export -f {}\n", path.display())).await?;
    assert!(std::fs::read_to_string(&path)?.starts_with("1\n00:00:02,000 --> 00:00:02,500\n"));
    Ok(())
}
