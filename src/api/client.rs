use super::logging::{debug_payload_enabled, emit_debug_payload};
use crate::config::Config;
use crate::types::ToolOutput;
use crate::util::is_local_endpoint_url;
use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use std::pin::Pin;
#[cfg(test)]
use std::sync::Arc;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

const ASSISTANTS_BETA: &str = "assistants=v2";

/// Scripted replacement for the remote collaborator in tests: hands out
/// pre-framed SSE streams and records submitted tool-output batches.
#[cfg(test)]
pub trait MockStreamProducer: Send + Sync {
    fn next_stream(&self) -> Result<ByteStream>;
    fn record_tool_outputs(&self, run_id: &str, outputs: &[ToolOutput]);
}

/// HTTP client for the hosted assistant's thread/run API.
#[derive(Clone)]
pub struct AssistantClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    assistant_id: String,
    temperature: f32,
    #[cfg(test)]
    mock_stream_producer: Option<Arc<dyn MockStreamProducer>>,
}

impl AssistantClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            assistant_id: config.assistant_id.clone(),
            temperature: config.temperature,
            #[cfg(test)]
            mock_stream_producer: None,
        }
    }

    #[cfg(test)]
    pub fn new_mock(producer: Arc<dyn MockStreamProducer>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: None,
            api_url: "http://localhost:8000/v1".to_string(),
            assistant_id: "asst_mock".to_string(),
            temperature: 1.0,
            #[cfg(test)]
            mock_stream_producer: Some(producer),
        }
    }

    /// Create the remote thread backing one session. Called once per
    /// session; the id is reused for every subsequent turn.
    pub async fn create_thread(&self) -> Result<String> {
        #[cfg(test)]
        {
            if self.mock_stream_producer.is_some() {
                return Ok("thread_mock".to_string());
            }
        }

        let url = self.endpoint("threads");
        let response = self.post_json(&url, &json!({})).await?;
        response
            .get("id")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .context("thread creation response carried no id")
    }

    pub async fn create_message(&self, thread_id: &str, text: &str) -> Result<()> {
        #[cfg(test)]
        {
            if self.mock_stream_producer.is_some() {
                return Ok(());
            }
        }

        let url = self.endpoint(&format!("threads/{thread_id}/messages"));
        let payload = json!({ "role": "user", "content": text });
        self.post_json(&url, &payload).await?;
        Ok(())
    }

    /// Open a streaming run on `thread_id`, registering `tools` as the wire
    /// contract for local execution requests.
    pub async fn create_run_stream(&self, thread_id: &str, tools: &Value) -> Result<ByteStream> {
        #[cfg(test)]
        {
            if let Some(producer) = &self.mock_stream_producer {
                return producer.next_stream();
            }
        }

        let url = self.endpoint(&format!("threads/{thread_id}/runs"));
        let payload = json!({
            "assistant_id": self.assistant_id,
            "stream": true,
            "temperature": self.temperature,
            "tools": tools,
        });
        self.post_stream(&url, &payload).await
    }

    /// Submit one atomic batch of tool outputs and open the nested
    /// resumption stream.
    pub async fn submit_tool_outputs_stream(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<ByteStream> {
        #[cfg(test)]
        {
            if let Some(producer) = &self.mock_stream_producer {
                producer.record_tool_outputs(run_id, outputs);
                return producer.next_stream();
            }
        }

        let url = self.endpoint(&format!(
            "threads/{thread_id}/runs/{run_id}/submit_tool_outputs"
        ));
        let payload = json!({ "tool_outputs": outputs, "stream": true });
        self.post_stream(&url, &payload).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }

    fn request(&self, url: &str, payload: &Value) -> reqwest::RequestBuilder {
        if debug_payload_enabled() {
            emit_debug_payload(url, payload);
        }

        let mut request = self
            .http
            .post(url)
            .header("content-type", "application/json")
            .header("openai-beta", ASSISTANTS_BETA)
            .json(payload);
        if let Some(api_key) = &self.api_key {
            request = request.header("authorization", format!("Bearer {api_key}"));
        }
        request
    }

    async fn post_json(&self, url: &str, payload: &Value) -> Result<Value> {
        let response = self
            .request(url, payload)
            .send()
            .await
            .map_err(|error| map_api_request_error(error, url))?
            .error_for_status()
            .map_err(|error| map_api_request_error(error, url))?;

        response
            .json::<Value>()
            .await
            .map_err(|error| map_api_request_error(error, url))
    }

    async fn post_stream(&self, url: &str, payload: &Value) -> Result<ByteStream> {
        let response = self
            .request(url, payload)
            .send()
            .await
            .map_err(|error| map_api_request_error(error, url))?
            .error_for_status()
            .map_err(|error| map_api_request_error(error, url))?;

        let url_for_stream = url.to_string();
        let stream = response
            .bytes_stream()
            .map(move |item| item.map_err(|error| map_api_request_error(error, &url_for_stream)));
        Ok(Box::pin(stream))
    }
}

fn map_api_request_error(error: reqwest::Error, request_url: &str) -> anyhow::Error {
    if error.is_connect() && is_local_endpoint_url(request_url) {
        return anyhow!(
            "cannot reach local API endpoint '{}': {}. Start your local server or update TAXCHAT_API_URL.",
            request_url,
            error
        );
    }
    if error.is_connect() {
        return anyhow!("cannot reach API endpoint '{}': {}", request_url, error);
    }
    if error.is_timeout() {
        return anyhow!("API request to '{}' timed out: {}", request_url, error);
    }
    if let Some(status) = error.status() {
        return anyhow!(
            "API endpoint '{}' returned HTTP {}: {}",
            request_url,
            status,
            error
        );
    }
    anyhow!("API request to '{}' failed: {}", request_url, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(api_url: &str) -> Config {
        Config {
            api_key: Some("test-key".to_string()),
            assistant_id: "asst_123".to_string(),
            api_url: api_url.to_string(),
            temperature: 1.0,
        }
    }

    #[test]
    fn test_endpoint_joins_against_trimmed_base() {
        let client = AssistantClient::new(&test_config("https://api.openai.com/v1/"));
        assert_eq!(
            client.endpoint("threads"),
            "https://api.openai.com/v1/threads"
        );
        assert_eq!(
            client.endpoint("threads/thread_1/runs/run_1/submit_tool_outputs"),
            "https://api.openai.com/v1/threads/thread_1/runs/run_1/submit_tool_outputs"
        );
    }

    #[test]
    fn test_submit_payload_shape() {
        use crate::types::ToolOutputPayload;

        let outputs = vec![
            ToolOutput {
                tool_call_id: "call_a".to_string(),
                payload: ToolOutputPayload::Output("6000".to_string()),
            },
            ToolOutput {
                tool_call_id: "call_b".to_string(),
                payload: ToolOutputPayload::Error("bad revenue".to_string()),
            },
        ];
        let payload = json!({ "tool_outputs": outputs, "stream": true });

        assert_eq!(payload["stream"], true);
        assert_eq!(payload["tool_outputs"][0]["output"], "6000");
        assert_eq!(payload["tool_outputs"][1]["error"], "bad revenue");
        assert!(payload["tool_outputs"][1].get("output").is_none());
    }
}
