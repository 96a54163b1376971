use taxchat::config::Config;

fn base_config() -> Config {
    Config {
        api_key: Some("sk-test".to_string()),
        assistant_id: "asst_123".to_string(),
        api_url: "https://api.openai.com/v1".to_string(),
        temperature: 1.0,
    }
}

#[test]
fn test_remote_endpoint_with_key_and_assistant_id_validates() {
    assert!(base_config().validate().is_ok());
}

#[test]
fn test_remote_endpoint_requires_api_key() {
    let config = Config {
        api_key: None,
        ..base_config()
    };
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("OPENAI_API_KEY"));
}

#[test]
fn test_remote_endpoint_requires_asst_prefix() {
    let config = Config {
        assistant_id: "my-assistant".to_string(),
        ..base_config()
    };
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("asst_"));
}

#[test]
fn test_local_endpoint_needs_no_key_or_prefix() {
    let config = Config {
        api_key: None,
        assistant_id: "anything".to_string(),
        api_url: "http://localhost:8000/v1".to_string(),
        ..base_config()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_assistant_id_is_rejected_even_locally() {
    let config = Config {
        assistant_id: String::new(),
        api_url: "http://127.0.0.1:11434/v1".to_string(),
        ..base_config()
    };
    assert!(config.validate().is_err());
}
