//! Model invocation boundary.
//!
//! The [`ModelClient`] trait decouples the agents from the actual LLM backend
//! (currently an OpenAI-compatible chat completions endpoint). Tests use
//! scripted clients that return predetermined text without network access.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::io::config::SdrConfig;
use crate::io::credentials::Credentials;

/// JSON Schema the reply must conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    /// Identifier sent to the backend (`[A-Za-z0-9_-]+`).
    pub name: String,
    pub schema: Value,
}

/// Parameters for one agent invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// Name of the invoking agent, for logs and test doubles.
    pub agent: String,
    pub model: String,
    /// System instructions rendered for the agent.
    pub instructions: String,
    /// User message the agent responds to.
    pub input: String,
    /// When set, the reply must be JSON matching this schema.
    pub output_schema: Option<OutputSchema>,
}

/// Abstraction over model backends.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Run one completion and return the reply text.
    async fn complete(&self, request: &ModelRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

fn completion_body(request: &ModelRequest) -> ChatCompletionBody<'_> {
    let response_format = request.output_schema.as_ref().map(|schema| {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "strict": true,
                "schema": schema.schema,
            }
        })
    });
    ChatCompletionBody {
        model: &request.model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: &request.instructions,
            },
            ChatMessage {
                role: "user",
                content: &request.input,
            },
        ],
        response_format,
    }
}

fn extract_reply(completion: ChatCompletion) -> Result<String> {
    let reply = completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| anyhow!("model returned no choices"))?;
    if let Some(refusal) = reply.refusal.filter(|r| !r.trim().is_empty()) {
        return Err(anyhow!("model refused: {refusal}"));
    }
    reply
        .content
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| anyhow!("model returned an empty reply"))
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(config: &SdrConfig, credentials: &Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("build model http client")?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/chat/completions",
                config.openai_base_url.trim_end_matches('/')
            ),
            api_key: credentials.openai_api_key.clone(),
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    #[instrument(skip_all, fields(agent = %request.agent, model = %request.model))]
    async fn complete(&self, request: &ModelRequest) -> Result<String> {
        debug!(
            input_bytes = request.input.len(),
            structured = request.output_schema.is_some(),
            "calling model"
        );
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&completion_body(request))
            .send()
            .await
            .with_context(|| format!("call model for {}", request.agent))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "model call failed");
            return Err(anyhow!(
                "model call for {} failed with status {}: {}",
                request.agent,
                status,
                body.chars().take(500).collect::<String>()
            ));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .with_context(|| format!("parse model response for {}", request.agent))?;
        let text = extract_reply(completion)
            .with_context(|| format!("model response for {}", request.agent))?;
        debug!(reply_bytes = text.len(), "model replied");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(schema: Option<OutputSchema>) -> ModelRequest {
        ModelRequest {
            agent: "Subject Writer".to_string(),
            model: "gpt-4.1-mini".to_string(),
            instructions: "write a subject".to_string(),
            input: "body".to_string(),
            output_schema: schema,
        }
    }

    #[test]
    fn body_carries_system_and_user_messages() {
        let req = request(None);
        let value = serde_json::to_value(completion_body(&req)).expect("serialize");
        assert_eq!(value["model"], "gpt-4.1-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "write a subject");
        assert_eq!(value["messages"][1]["role"], "user");
        assert!(value.get("response_format").is_none());
    }

    #[test]
    fn schema_becomes_strict_response_format() {
        let req = request(Some(OutputSchema {
            name: "verdict".to_string(),
            schema: json!({"type": "object"}),
        }));
        let value = serde_json::to_value(completion_body(&req)).expect("serialize");
        assert_eq!(value["response_format"]["type"], "json_schema");
        assert_eq!(value["response_format"]["json_schema"]["name"], "verdict");
        assert_eq!(value["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn reply_text_is_extracted() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello"}}]
        }))
        .expect("parse");
        assert_eq!(extract_reply(completion).expect("reply"), "Hello");
    }

    #[test]
    fn empty_or_missing_reply_is_an_error() {
        let empty: ChatCompletion =
            serde_json::from_value(json!({"choices": [{"message": {"content": "  "}}]}))
                .expect("parse");
        assert!(extract_reply(empty).is_err());

        let none: ChatCompletion = serde_json::from_value(json!({"choices": []})).expect("parse");
        let err = extract_reply(none).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn refusal_is_surfaced() {
        let refused: ChatCompletion = serde_json::from_value(json!({
            "choices": [{"message": {"content": null, "refusal": "cannot help"}}]
        }))
        .expect("parse");
        let err = extract_reply(refused).unwrap_err();
        assert!(err.to_string().contains("cannot help"));
    }
}
