/*!
 * Tests for judgment parsing and the verification merge
 */

use subcheck::alignment::{AlignmentRecord, align};
use subcheck::subtitle_processor::parse_srt;
use subcheck::verification::merge::{DEFAULT_SUMMARY, FEEDBACK_NO_ISSUES, FEEDBACK_TIMESTAMP_MISMATCH};
use subcheck::verification::{
    Judgment, ScoreBand, VerificationStatus, merge, merge_alignment,
};
use crate::common;

fn record(id: u32, mismatch: bool) -> AlignmentRecord {
    AlignmentRecord {
        id,
        source_text: format!("source {}", id),
        translated_text: format!("target {}", id),
        start_time: "00:00:01,000".to_string(),
        end_time: "00:00:02,000".to_string(),
        timestamp_mismatch: mismatch,
    }
}

#[test]
fn test_merge_withEmptyJudgment_shouldApplyDefaults() {
    let records = vec![record(1, false), record(2, true)];

    let result = merge(&records, &Judgment::default());

    assert_eq!(result.overall_score, 0);
    assert_eq!(result.summary, DEFAULT_SUMMARY);
    assert_eq!(result.items[0].status, VerificationStatus::Correct);
    assert_eq!(result.items[0].feedback, FEEDBACK_NO_ISSUES);
    assert_eq!(result.items[1].status, VerificationStatus::Correct);
    assert_eq!(result.items[1].feedback, FEEDBACK_TIMESTAMP_MISMATCH);
    assert_eq!(result.timestamp_mismatch_count, 1);
}

#[test]
fn test_merge_withJudgmentForUnknownIds_shouldIgnoreThem() {
    let records = vec![record(1, false)];
    let judgment = Judgment::parse(
        r#"{"items": [{"id": 1, "status": "incorrect", "feedback": "Wrong"}, {"id": 99, "status": "incorrect"}]}"#,
    );

    let result = merge(&records, &judgment);

    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].status, VerificationStatus::Incorrect);
    assert_eq!(result.items[0].feedback, "Wrong");
}

#[test]
fn test_merge_shouldKeepStructuralFieldsFromAlignment() {
    let records = vec![record(5, true)];
    // A judgment cannot override texts, timing or the mismatch flag
    let judgment = Judgment::parse(
        r#"{"items": [{"id": 5, "status": "correct", "translatedText": "hijacked", "timestampMismatch": false, "startTime": "99:00:00,000"}]}"#,
    );

    let item = &merge(&records, &judgment).items[0];

    assert_eq!(item.translated_text, "target 5");
    assert_eq!(item.start_time, "00:00:01,000");
    assert!(item.timestamp_mismatch);
    assert_eq!(item.status, VerificationStatus::Correct);
}

#[test]
fn test_merge_withCorrectedStatusFromJudgment_shouldFallBackToCorrect() {
    let judgment = Judgment::parse(r#"{"items": [{"id": 1, "status": "corrected"}]}"#);
    let result = merge(&[record(1, false)], &judgment);
    assert_eq!(result.items[0].status, VerificationStatus::Correct);
}

#[test]
fn test_mergeAlignment_withFixtures_shouldCarryUnpairedIds() {
    let mut target = parse_srt(common::TARGET_SRT);
    target.remove(2);
    let alignment = align(&parse_srt(common::SOURCE_SRT), &target);

    let result = merge_alignment(&alignment, &Judgment::parse(common::JUDGMENT_JSON));

    assert_eq!(result.overall_score, 85);
    assert_eq!(result.lines_analyzed(), 2);
    assert_eq!(result.dropped_source_ids, vec![3]);
    assert_eq!(result.item(2).map(|i| i.status), Some(VerificationStatus::MinorIssue));
    assert_eq!(result.score_band(), ScoreBand::Fair);
}

#[test]
fn test_scoreBand_boundaries() {
    let mut result = common::result_with(Vec::new());
    result.overall_score = 90;
    assert_eq!(result.score_band(), ScoreBand::Good);
    result.overall_score = 70;
    assert_eq!(result.score_band(), ScoreBand::Fair);
    result.overall_score = 69;
    assert_eq!(result.score_band(), ScoreBand::Poor);
}

#[test]
fn test_result_shouldSerializeWithCamelCaseFields() {
    let result = common::result_with(vec![common::item(1, VerificationStatus::MinorIssue)]);
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["overallScore"], 80);
    assert_eq!(json["items"][0]["status"], "minor_issue");
    assert_eq!(json["items"][0]["translatedText"], "target 1");
    assert_eq!(json["timestampMismatchCount"], 0);
}
