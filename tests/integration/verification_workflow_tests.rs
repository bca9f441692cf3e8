/*!
 * Integration tests for the verify, review and export workflow
 */

use anyhow::Result;

use subcheck::app_controller::{Controller, export_session};
use subcheck::errors::{SubtitleError, TranslationError};
use subcheck::language_utils::LanguageSpec;
use subcheck::providers::mock::MockProvider;
use subcheck::review::{BulkStatus, ReviewSession, StatusFilter};
use subcheck::subtitle_processor::{SubtitleCollection, parse_srt};
use subcheck::verification::{self, VerificationStatus};
use crate::common;

fn languages() -> (LanguageSpec, LanguageSpec) {
    (LanguageSpec::parse("en").unwrap(), LanguageSpec::parse("fr").unwrap())
}

#[tokio::test]
async fn test_verify_withJudgment_shouldMergeStatusesAndTiming() -> Result<()> {
    let model = MockProvider::replying(common::JUDGMENT_JSON);
    let (source_lang, target_lang) = languages();

    let result = verification::verify(
        &model,
        &parse_srt(common::SOURCE_SRT),
        &parse_srt(common::TARGET_SRT),
        &source_lang,
        &target_lang,
    )
    .await?;

    assert_eq!(model.request_count(), 1);
    assert_eq!(result.overall_score, 85);
    assert_eq!(result.summary, "Mostly accurate, slightly informal.");
    assert_eq!(result.timestamp_mismatch_count, 1);

    let second = result.item(2).unwrap();
    assert_eq!(second.status, VerificationStatus::MinorIssue);
    assert_eq!(second.end_time, "00:00:07,000");
    assert!(second.timestamp_mismatch);

    // Line 3 was left out of the judgment
    let third = result.item(3).unwrap();
    assert_eq!(third.status, VerificationStatus::Correct);
    assert_eq!(third.feedback, "No issues found");
    Ok(())
}

#[tokio::test]
async fn test_verify_shouldSendPairsInJsonMode() -> Result<()> {
    let model = MockProvider::replying(common::JUDGMENT_JSON);
    let (source_lang, target_lang) = languages();

    verification::verify(
        &model,
        &parse_srt(common::SOURCE_SRT),
        &parse_srt(common::TARGET_SRT),
        &source_lang,
        &target_lang,
    )
    .await?;

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].json_response);
    assert!(requests[0].prompt.contains("ID: 2\nSource: How are you?\nTranslation: Comment vas-tu ?"));
    Ok(())
}

#[tokio::test]
async fn test_verify_withGarbledJudgment_shouldFallBackToDefaults() -> Result<()> {
    let model = MockProvider::replying("I'm sorry, I cannot produce JSON today.");
    let (source_lang, target_lang) = languages();

    let result = verification::verify(
        &model,
        &parse_srt(common::SOURCE_SRT),
        &parse_srt(common::TARGET_SRT),
        &source_lang,
        &target_lang,
    )
    .await?;

    assert_eq!(result.overall_score, 0);
    assert_eq!(result.summary, "Analysis completed.");
    assert!(result.items.iter().all(|item| item.status == VerificationStatus::Correct));
    assert_eq!(result.item(2).unwrap().feedback, "Timestamp mismatch detected");
    Ok(())
}

#[tokio::test]
async fn test_verify_withEmptyTarget_shouldFailBeforeAnyRequest() {
    let model = MockProvider::replying(common::JUDGMENT_JSON);
    let (source_lang, target_lang) = languages();

    let error = verification::verify(&model, &parse_srt(common::SOURCE_SRT), &[], &source_lang, &target_lang)
        .await
        .unwrap_err();

    assert!(matches!(error, TranslationError::Subtitle(SubtitleError::NoBlocks(_))));
    assert_eq!(model.request_count(), 0);
}

#[tokio::test]
async fn test_verify_withDisjointIds_shouldFailBeforeAnyRequest() {
    let model = MockProvider::replying(common::JUDGMENT_JSON);
    let (source_lang, target_lang) = languages();
    let target = parse_srt("10\n00:00:01,000 --> 00:00:04,000\nBonjour.\n");

    let error = verification::verify(&model, &parse_srt(common::SOURCE_SRT), &target, &source_lang, &target_lang)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        TranslationError::Subtitle(SubtitleError::NoAlignedLines { source_count: 3, target_count: 1 })
    ));
    assert_eq!(model.request_count(), 0);
}

#[test]
fn test_verify_withProviderFailure_shouldFailWholeRun() {
    let model = MockProvider::failing();
    let (source_lang, target_lang) = languages();

    let error = tokio_test::block_on(verification::verify(
        &model,
        &parse_srt(common::SOURCE_SRT),
        &parse_srt(common::TARGET_SRT),
        &source_lang,
        &target_lang,
    ))
    .unwrap_err();

    assert!(matches!(error, TranslationError::Provider(_)));
}

#[tokio::test]
async fn test_verifyFiles_withUnparseableTarget_shouldFailBeforeAnyRequest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.srt", common::SOURCE_SRT)?;
    let target = common::create_test_file(temp_dir.path(), "movie.fr.srt", "not a subtitle file")?;
    let model = MockProvider::replying(common::JUDGMENT_JSON);
    let controller = Controller::with_config(common::test_config())?;

    let result = controller.verify_files(&model, &source, &target).await;

    assert!(result.is_err());
    assert_eq!(model.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_verifyReviewExport_endToEnd_shouldWriteSourceTimedCorrections() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.srt", common::SOURCE_SRT)?;
    let target = common::create_test_file(temp_dir.path(), "movie.fr.srt", common::TARGET_SRT)?;
    let model = MockProvider::replying(common::JUDGMENT_JSON);
    let controller = Controller::with_config(common::test_config())?;

    let result = controller.verify_files(&model, &source, &target).await?;
    let mut session = ReviewSession::new(result);

    session.set_filter(StatusFilter::TimestampMismatch);
    assert_eq!(session.visible_items().len(), 1);

    session.edit_text(2, "Comment allez-vous ?");
    session.enter_bulk_mode();
    session.set_filter(StatusFilter::All);
    session.toggle_selection(3);
    session.apply_bulk_status(BulkStatus::MinorIssue);

    let export_path = temp_dir.path().join("export/movie.fixed.srt");
    export_session(&session, &export_path)?;

    let exported = SubtitleCollection::from_file(&export_path)?;
    assert_eq!(exported.blocks.len(), 3);
    assert_eq!(exported.blocks[1].text, "Comment allez-vous ?");
    assert_eq!(exported.blocks[1].end_time, "00:00:07,000");
    assert_eq!(exported.blocks[2].text, "Je vais bien,\nmerci.");

    let counts = session.status_counts();
    assert_eq!(counts.corrected, 1);
    assert_eq!(counts.minor_issue, 1);
    assert_eq!(counts.timestamp_mismatch, 1);
    Ok(())
}
