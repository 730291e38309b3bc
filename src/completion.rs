use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CompletionConfig;

/// Base64 image attached to a completion prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePayload {
    pub media_type: String,
    pub data: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion service returned status {status}")]
    Status { status: u16, body: String },
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion response contained no choices")]
    Empty,
}

/// Prompt in, raw completion text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        image: Option<&ImagePayload>,
    ) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a ImagePayload>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

#[derive(Clone)]
pub struct HttpCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpCompletionClient {
    pub fn new(config: &CompletionConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("build completion http client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        image: Option<&ImagePayload>,
    ) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            prompt,
            max_tokens,
            image,
        };
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "completion request rejected");
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = res.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or(CompletionError::Empty)?;
        debug!(max_tokens, chars = text.len(), "completion received");
        Ok(text)
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Prompt as seen by [`ScriptedCompletion`].
    #[derive(Debug, Clone)]
    pub struct SeenPrompt {
        pub prompt: String,
        pub max_tokens: u32,
        pub image: Option<ImagePayload>,
    }

    /// Replies with a fixed text, or with a 503 when built with `failing`.
    pub struct ScriptedCompletion {
        reply: Option<String>,
        pub seen: Mutex<Vec<SeenPrompt>>,
    }

    impl ScriptedCompletion {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn last(&self) -> Option<SeenPrompt> {
            self.seen.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedCompletion {
        async fn complete(
            &self,
            prompt: &str,
            max_tokens: u32,
            image: Option<&ImagePayload>,
        ) -> Result<String, CompletionError> {
            self.seen.lock().unwrap().push(SeenPrompt {
                prompt: prompt.to_string(),
                max_tokens,
                image: image.cloned(),
            });
            self.reply.clone().ok_or(CompletionError::Status {
                status: 503,
                body: "overloaded".into(),
            })
        }
    }
}
