//! OpenAI chat completions client.

use async_trait::async_trait;
use mailspark_core::providers::{ChatPrompt, CompletionProvider, ProviderError};
use serde::Deserialize;

use crate::http::send_json;

const PROVIDER: &str = "openai";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, prompt: &ChatPrompt) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user }
            ],
            "response_format": { "type": "json_object" }
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

/// Text of the first choice.
fn first_choice_text(completion: ChatCompletion) -> Result<String, ProviderError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::InvalidResponse {
            provider: PROVIDER,
            message: "completion has no message content".to_string(),
        })
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ProviderError> {
        tracing::debug!(model = %self.model, "Requesting chat completion");

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt));

        let completion: ChatCompletion = send_json(PROVIDER, request).await?;
        first_choice_text(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_asks_for_json_object() {
        let client = OpenAiClient::new("sk-test".into(), DEFAULT_MODEL.into());
        let body = client.request_body(&ChatPrompt {
            system: "sys".into(),
            user: "usr".into(),
        });
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "usr");
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn extracts_first_choice() {
        let completion: ChatCompletion = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{\"a\":1}"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_text(completion).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn empty_choices_is_invalid() {
        let completion: ChatCompletion = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            first_choice_text(completion),
            Err(ProviderError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = OpenAiClient::new("k".into(), "m".into())
            .with_base_url("http://localhost:8080/v1/".into());
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }
}
