/*!
 * Tests for SRT parsing and serialization
 */

use anyhow::Result;
use subcheck::subtitle_processor::{SubtitleCollection, TimedBlock, parse_srt, to_srt};
use crate::common;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = TimedBlock::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = TimedBlock::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

#[test]
fn test_timestamp_parsing_withOutOfRangeComponents_shouldFail() {
    assert!(TimedBlock::parse_timestamp("00:61:00,000").is_err());
    assert!(TimedBlock::parse_timestamp("00:00:00.000").is_err());
}

#[test]
fn test_parseSrt_withWellFormedContent_shouldKeepOrderAndMultilineText() {
    let blocks = parse_srt(common::SOURCE_SRT);

    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(blocks[2].text, "I'm fine,\nthank you.");
    assert_eq!(blocks[2].end_time, "00:00:10,500");
    assert_eq!(blocks[0].original_text.as_deref(), Some("Hello there."));
}

#[test]
fn test_parseSrt_withMalformedBlocks_shouldOmitThemSilently() {
    let content = "1
00:00:01,000 --> 00:00:02,000
Kept

two
00:00:03,000 --> 00:00:04,000
Bad index

3
00:00:05,000 -> 00:00:06,000
Bad arrow

4
00:00:07,000 --> 00:00:08,000

5
00:00:09,000 --> 00:00:10,000
Also kept";

    let blocks = parse_srt(content);
    assert_eq!(blocks.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 5]);
    assert_eq!(blocks[1].text, "Also kept");
}

#[test]
fn test_parseSrt_withNoValidBlock_shouldReturnEmpty() {
    assert!(parse_srt("").is_empty());
    assert!(parse_srt("just some prose\nwithout timecodes\n").is_empty());
}

#[test]
fn test_parseSrt_withByteOrderMark_shouldParseFirstBlock() {
    let content = format!("\u{feff}{}", common::SOURCE_SRT);
    assert_eq!(parse_srt(&content)[0].id, 1);
}

#[test]
fn test_toSrt_shouldEmitBlocksInGivenOrder() {
    let blocks = vec![
        TimedBlock::new(2, "00:00:05,000", "00:00:07,000", "second"),
        TimedBlock::new(1, "00:00:01,000", "00:00:02,000", "first"),
    ];

    let srt = to_srt(&blocks);
    assert_eq!(
        srt,
        "2\n00:00:05,000 --> 00:00:07,000\nsecond\n\n1\n00:00:01,000 --> 00:00:02,000\nfirst\n"
    );
}

#[test]
fn test_serializeThenParse_shouldReproduceBlocksExceptOriginalText() {
    let blocks = vec![
        TimedBlock::new(1, "00:00:01,000", "00:00:02,000", "one\ntwo"),
        TimedBlock::new(9, "00:01:00,000", "00:01:02,250", "nine"),
    ];

    let reparsed = parse_srt(&to_srt(&blocks));
    assert_eq!(reparsed.len(), blocks.len());
    for (original, parsed) in blocks.iter().zip(&reparsed) {
        assert_eq!(parsed.id, original.id);
        assert_eq!(parsed.start_time, original.start_time);
        assert_eq!(parsed.end_time, original.end_time);
        assert_eq!(parsed.text, original.text);
    }
}

#[test]
fn test_serializeThenParse_withWhitespaceOnlyInnerLine_shouldKeepWholeText() {
    let blocks = vec![
        TimedBlock::new(1, "00:00:01,000", "00:00:02,000", "a\n \nb"),
        TimedBlock::new(2, "00:00:03,000", "00:00:04,000", "c"),
    ];

    let reparsed = parse_srt(&to_srt(&blocks));

    assert_eq!(reparsed.len(), 2);
    assert_eq!(reparsed[0].text, "a\n \nb");
    assert_eq!(reparsed[1].text, "c");
}

#[test]
fn test_parseSrt_withWhitespaceOnlySeparator_shouldStillSplitBlocks() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nfirst\n   \n2\n00:00:03,000 --> 00:00:04,000\nsecond\n";

    let blocks = parse_srt(content);

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].text, "first");
    assert_eq!(blocks[1].text, "second");
}

#[test]
fn test_collection_fromFile_andWrite_shouldPersistBlocks() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "movie.srt", common::SOURCE_SRT)?;

    let collection = SubtitleCollection::from_file(&path)?;
    assert_eq!(collection.name, "movie.srt");
    assert_eq!(collection.blocks.len(), 3);

    let stats = collection.stats();
    assert_eq!(stats.block_count, 3);
    assert_eq!(stats.duration.as_deref(), Some("00:00:10,500"));

    let output = temp_dir.path().join("nested/out.srt");
    collection.write_to_srt(&output)?;
    let reloaded = SubtitleCollection::from_file(&output)?;
    assert_eq!(reloaded.blocks.len(), 3);
    Ok(())
}

#[test]
fn test_collection_fromFile_withMissingFile_shouldFail() {
    assert!(SubtitleCollection::from_file("/definitely/not/here.srt").is_err());
}
