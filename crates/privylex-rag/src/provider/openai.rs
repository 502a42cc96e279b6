use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use privylex_core::{GenerationError, GenerationRequest, Generator};

pub struct OpenAiProvider {
    api_key: String,
    model: String,
    endpoint: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, base_url: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build OpenAI HTTP client")?;
        let endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        Ok(Self { api_key, model, endpoint, client })
    }

    fn headers(&self) -> Result<HeaderMap, GenerationError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|_| GenerationError::Transport("invalid API key header".into()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl Generator for OpenAiProvider {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.model,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            messages: vec![
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
        };
        debug!(endpoint = %self.endpoint, model = %self.model, "calling chat completions");
        let resp = self
            .client
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(GenerationError::Status { status, body });
        }
        let parsed: ChatResponse = resp.json().map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        parsed.into_answer()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl ChatResponse {
    /// Content of the first choice.
    fn into_answer(self) -> Result<String, GenerationError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::MalformedResponse("response has no message content".into()))
    }
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url() {
        let p = OpenAiProvider::new("k".into(), "m".into(), "http://localhost:9/v1/".into(), 1).unwrap();
        assert_eq!(p.endpoint, "http://localhost:9/v1/chat/completions");
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_error() {
        let p = OpenAiProvider::new("k".into(), "m".into(), "http://127.0.0.1:9/v1".into(), 2).unwrap();
        let req = GenerationRequest { system: "s".into(), user: "u".into(), max_tokens: 8, temperature: 0.0 };
        assert!(matches!(p.generate(&req), Err(GenerationError::Transport(_))));
    }

    #[test]
    fn response_without_content_is_malformed() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"role":"assistant"}}]}"#,
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        ] {
            let parsed: ChatResponse = serde_json::from_str(body).unwrap();
            assert!(matches!(parsed.into_answer(), Err(GenerationError::MalformedResponse(_))), "body={body}");
        }
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"Notice is sixty days."}}]}"#).unwrap();
        assert_eq!(parsed.into_answer().unwrap(), "Notice is sixty days.");
    }
}
