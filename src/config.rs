use crate::util::is_local_endpoint_url;
use anyhow::{bail, Context, Result};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub assistant_id: String,
    pub api_url: String,
    pub temperature: f32,
}

impl Config {
    pub fn load() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let assistant_id = std::env::var("TAXCHAT_ASSISTANT_ID")
            .context("TAXCHAT_ASSISTANT_ID not set")?
            .trim()
            .to_string();

        let api_url = std::env::var("TAXCHAT_API_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let temperature = std::env::var("TAXCHAT_TEMPERATURE")
            .ok()
            .and_then(|v| v.trim().parse::<f32>().ok())
            .unwrap_or(1.0)
            .clamp(0.0, 2.0);

        Ok(Self {
            api_key,
            assistant_id,
            api_url,
            temperature,
        })
    }

    pub fn validate(&self) -> Result<()> {
        let local = is_local_endpoint_url(&self.api_url);

        if self.assistant_id.is_empty() {
            bail!("assistant id must not be empty");
        }

        // Local endpoints accept any identifier and run without a key.
        if local {
            return Ok(());
        }

        if self.api_key.is_none() {
            bail!(
                "OPENAI_API_KEY not set; required for remote endpoint '{}'",
                self.api_url
            );
        }

        if !self.assistant_id.starts_with("asst_") {
            bail!(
                "'{}' does not look like an assistant id (expected an 'asst_' prefix)",
                self.assistant_id
            );
        }

        Ok(())
    }
}
