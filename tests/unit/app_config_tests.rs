/*!
 * Tests for application configuration
 */

use anyhow::Result;
use subcheck::app_config::{Config, LogLevel, TranslationProvider};
use crate::common;

#[test]
fn test_default_config_shouldBeValidForLocalProvider() {
    let config = Config::default();

    assert_eq!(config.source_language, "auto");
    assert_eq!(config.target_language, "en");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.available_providers.len(), 4);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withCloudProviderAndNoKey_shouldFail() {
    let mut config = common::test_config();
    config.translation.provider = TranslationProvider::Anthropic;
    assert!(config.validate().is_err());

    if let Some(entry) = config.translation.available_providers.iter_mut()
        .find(|p| p.provider_type == "anthropic")
    {
        entry.api_key = "test-key".to_string();
    }
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withAutoTarget_shouldFail() {
    let mut config = common::test_config();
    config.target_language = "auto".to_string();
    assert!(config.validate().is_err());
    assert!(config.target_spec().is_err());
}

#[test]
fn test_validate_withTemperatureOutOfRange_shouldFail() {
    let mut config = common::test_config();
    config.translation.common.temperature = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_providerAccessors_shouldFallBackToDefaults() {
    let mut config = common::test_config();
    config.translation.available_providers.clear();

    assert_eq!(config.translation.get_model(), "llama3");
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.translation.get_max_chars_per_request(), 4000);

    config.translation.provider = TranslationProvider::Anthropic;
    assert_eq!(config.translation.get_timeout_secs(), 60);
}

#[test]
fn test_setModel_shouldTargetActiveProvider() {
    let mut config = common::test_config();
    config.translation.provider = TranslationProvider::OpenAI;
    config.translation.set_model("gpt-4o");

    assert_eq!(config.translation.get_model(), "gpt-4o");
    let ollama = config.translation.get_provider_config(TranslationProvider::Ollama).unwrap();
    assert_eq!(ollama.model, "llama3");
}

#[test]
fn test_fromFile_withPartialJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"target_language": "de", "translation": {"provider": "lmstudio"}}"#,
    )?;

    let config = Config::from_file(&path)?;
    assert_eq!(config.source_language, "auto");
    assert_eq!(config.target_language, "de");
    assert_eq!(config.translation.provider, TranslationProvider::LMStudio);
    assert_eq!(config.translation.get_endpoint(), "http://localhost:1234/v1");
    assert!((config.translation.common.temperature - 0.3).abs() < f32::EPSILON);
    Ok(())
}

#[test]
fn test_saveThenLoad_shouldPreserveSettings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = common::test_config();
    config.translation.common.system_prompt = Some("Translate {source_language} to {target_language}".to_string());
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded.target_language, "fr");
    assert_eq!(loaded.translation.common.system_prompt, config.translation.common.system_prompt);
    Ok(())
}

#[test]
fn test_parse_providerAndLogLevel_fromStrings() {
    assert_eq!("LM-Studio".parse::<TranslationProvider>().unwrap(), TranslationProvider::LMStudio);
    assert!("bard".parse::<TranslationProvider>().is_err());
    assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
}
