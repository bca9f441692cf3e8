/*!
 * Tests for error types
 */

use subcheck::errors::{AppError, ProviderError, SubtitleError, TranslationError};

#[test]
fn test_fromStatus_shouldClassifyAuthAndRateLimits() {
    assert!(matches!(ProviderError::from_status(401, "bad key"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, "forbidden"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(429, "slow down"), ProviderError::RateLimitExceeded(_)));
    assert!(matches!(
        ProviderError::from_status(502, "bad gateway"),
        ProviderError::ApiError { status_code: 502, .. }
    ));
}

#[test]
fn test_subtitleErrors_shouldDescribeTheProblem() {
    let error = SubtitleError::NoAlignedLines { source_count: 3, target_count: 2 };
    assert_eq!(
        error.to_string(),
        "Source and target share no subtitle IDs (3 source lines, 2 target lines)"
    );
    assert_eq!(
        SubtitleError::NoBlocks("target".to_string()).to_string(),
        "No valid subtitle blocks found in target"
    );
}

#[test]
fn test_errorConversions_shouldWrapInnerErrors() {
    let translation: TranslationError = ProviderError::ConnectionError("refused".to_string()).into();
    assert_eq!(translation.to_string(), "Provider error: Connection error: refused");

    let app: AppError = translation.into();
    assert!(matches!(app, AppError::Translation(TranslationError::Provider(_))));

    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(AppError::from(io), AppError::File(_)));
}
