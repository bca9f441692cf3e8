/*!
 * Integration tests for the translation workflow
 */

use anyhow::Result;
use indicatif::MultiProgress;

use subcheck::app_controller::{Controller, FolderSummary};
use subcheck::language_utils::LanguageSpec;
use subcheck::providers::mock::MockProvider;
use subcheck::subtitle_processor::{SubtitleCollection, parse_srt};
use subcheck::translation::BatchTranslator;
use crate::common;

#[tokio::test]
async fn test_translateFile_withMockModel_shouldKeepTimingAndTranslateText() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "movie.srt", common::SOURCE_SRT)?;
    let output = temp_dir.path().join("movie.fr.srt");
    let model = MockProvider::working();
    let controller = Controller::with_config(common::test_config())?;

    controller.translate_file(&model, &input, &output, &MultiProgress::new()).await?;

    let translated = SubtitleCollection::from_file(&output)?;
    assert_eq!(translated.blocks.len(), 3);
    assert_eq!(translated.blocks[0].text, "[TRANSLATED] Hello there.");
    assert_eq!(translated.blocks[2].text, "[TRANSLATED] I'm fine,\nthank you.");
    assert_eq!(translated.blocks[2].start_time, "00:00:08,000");
    assert_eq!(model.request_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withProviderFailure_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "movie.srt", common::SOURCE_SRT)?;
    let output = temp_dir.path().join("movie.fr.srt");
    let model = MockProvider::failing();
    let controller = Controller::with_config(common::test_config())?;

    let result = controller.translate_file(&model, &input, &output, &MultiProgress::new()).await;

    assert!(result.is_err());
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withEmptyInput_shouldFailBeforeAnyRequest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "empty.srt", "\n\n")?;
    let model = MockProvider::working();
    let controller = Controller::with_config(common::test_config())?;

    let result = controller
        .translate_file(&model, &input, &temp_dir.path().join("empty.fr.srt"), &MultiProgress::new())
        .await;

    assert!(result.is_err());
    assert_eq!(model.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_batchTranslator_withSmallBudget_shouldSendOneRequestPerChunk() -> Result<()> {
    let model = MockProvider::working();
    let source = LanguageSpec::parse("en")?;
    let target = LanguageSpec::parse("fr")?;
    let blocks = parse_srt(common::SOURCE_SRT);

    let progress = std::sync::Mutex::new(Vec::new());
    let translated = BatchTranslator::new(&model, &source, &target)
        .with_max_chars(30)
        .translate_blocks(&blocks, |done, total| progress.lock().unwrap().push((done, total)))
        .await?;

    assert_eq!(model.request_count(), 3);
    assert_eq!(*progress.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
    assert!(translated.iter().all(|block| block.text.starts_with("[TRANSLATED]")));
    Ok(())
}

#[tokio::test]
async fn test_batchTranslator_withIntermittentFailure_shouldFailWholeRun() -> Result<()> {
    let model = MockProvider::intermittent(2);
    let source = LanguageSpec::parse("en")?;
    let target = LanguageSpec::parse("fr")?;
    let blocks = parse_srt(common::SOURCE_SRT);

    let result = BatchTranslator::new(&model, &source, &target)
        .with_max_chars(30)
        .translate_blocks(&blocks, |_, _| {})
        .await;

    assert!(result.is_err());
    assert_eq!(model.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_batchTranslator_withReplyNamingEarlierChunk_shouldIgnoreForeignLines() -> Result<()> {
    let model = MockProvider::with_responder(|request| {
        if request.prompt.contains("[ID:2]") {
            "[ID:2] deux\n[ID:1] STALE".to_string()
        } else {
            "[ID:1] un".to_string()
        }
    });
    let source = LanguageSpec::parse("en")?;
    let target = LanguageSpec::parse("fr")?;
    let blocks = parse_srt("1\n00:00:01,000 --> 00:00:02,000\none\n\n2\n00:00:03,000 --> 00:00:04,000\ntwo\n");

    let translated = BatchTranslator::new(&model, &source, &target)
        .with_max_chars(10)
        .translate_blocks(&blocks, |_, _| {})
        .await?;

    assert_eq!(model.request_count(), 2);
    let texts: Vec<&str> = translated.iter().map(|block| block.text.as_str()).collect();
    assert_eq!(texts, vec!["un", "deux"]);
    Ok(())
}

#[tokio::test]
async fn test_batchTranslator_withEmptyReply_shouldKeepSourceText() -> Result<()> {
    let model = MockProvider::empty();
    let source = LanguageSpec::parse("en")?;
    let target = LanguageSpec::parse("fr")?;
    let blocks = parse_srt(common::SOURCE_SRT);

    let translated = BatchTranslator::new(&model, &source, &target)
        .translate_blocks(&blocks, |_, _| {})
        .await?;

    assert_eq!(translated, blocks);
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withExistingOutputs_shouldSkipWithoutTranslating() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "episode1.srt", common::SOURCE_SRT)?;
    common::create_test_file(temp_dir.path(), "episode1.fr.srt", common::TARGET_SRT)?;
    let controller = Controller::with_config(common::test_config())?;

    let summary = controller.run_folder(temp_dir.path().to_path_buf(), false).await?;

    assert_eq!(summary, FolderSummary { processed: 0, skipped: 1, errors: 0 });
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withoutSubtitles_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "notes.txt", "nothing here")?;
    let controller = Controller::with_config(common::test_config())?;

    assert!(controller.run_folder(temp_dir.path().to_path_buf(), false).await.is_err());
    Ok(())
}
