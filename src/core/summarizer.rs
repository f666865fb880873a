use crate::config::toml_config::SummarizeSettings;
use crate::core::prompt::render_prompt;
use crate::utils::error::{DigestError, Result};
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// OpenAI 相容的 chat completion 客戶端；每次執行只呼叫一次，不重試
pub struct ChatSummarizer {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_seconds: u64,
    api_key: Option<String>,
    api_key_env: String,
    template: String,
}

impl fmt::Debug for ChatSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSummarizer")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ChatSummarizer {
    pub fn new(settings: &SummarizeSettings, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", settings.api_base.trim_end_matches('/')),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout_seconds: settings.timeout_seconds,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_key_env: settings.api_key_env.clone(),
            template: settings.prompt_template().to_string(),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn summarize(&self, report_text: &str, now: &DateTime<FixedOffset>) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DigestError::MissingCredentialError {
                env_var: self.api_key_env.clone(),
            })?;

        let prompt = render_prompt(&self.template, report_text, now);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::info!(
            "🤖 Requesting briefing from {} ({} prompt chars)",
            self.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DigestError::from_request(&self.endpoint, self.timeout_seconds, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::debug!("Completion error body: {}", detail);
            return Err(DigestError::HttpStatusError {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DigestError::from_request(&self.endpoint, self.timeout_seconds, e))?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes)?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DigestError::CompletionError {
                message: "response has no choices[0].message.content".to_string(),
            })?;

        if content.trim().is_empty() {
            return Err(DigestError::CompletionError {
                message: "model returned an empty briefing".to_string(),
            });
        }

        tracing::info!("✅ Briefing received ({} chars)", content.chars().count());
        Ok(content)
    }
}
