//! Minimal OpenAI client backing both oracles.
//!
//! We only call chat.completions and request a strict JSON object.
//! Calls are instrumented and log model names, latencies and token usage (not contents).
//!
//! NOTE: We never log the API key.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::{OracleSettings, Prompts};
use crate::error::OracleError;
use crate::oracle::{accept_in_range, DifficultyOracle, SemanticOracle};
use crate::util::fill_template;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub prompts: Prompts,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(prompts: &Prompts, settings: &OracleSettings) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(settings.timeout_secs))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model, prompts: prompts.clone() })
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "debug", target = "oracle", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(&self, system: &str, user: &str) -> Result<T, OracleError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      // Scores must be reproducible across calls.
      temperature: 0.0,
      response_format: ResponseFormat { r#type: "json_object".into() },
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "labq-engine/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(OracleError::Http { status, message });
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| OracleError::Malformed(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(target: "oracle", elapsed = ?start.elapsed(), prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, "OpenAI usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();

    serde_json::from_str::<T>(&text).map_err(|e| OracleError::Malformed(format!("JSON parse error: {e}")))
  }
}

#[async_trait]
impl SemanticOracle for OpenAI {
  fn name(&self) -> &str {
    "openai"
  }

  #[instrument(level = "debug", target = "oracle", skip(self, a, b), fields(a_len = a.len(), b_len = b.len()))]
  async fn estimate_semantic_similarity(&self, a: &str, b: &str) -> Result<f64, OracleError> {
    #[derive(Deserialize)]
    struct Sem { similarity: f64 }

    let user = fill_template(&self.prompts.semantic_user_template, &[("a", a), ("b", b)]);
    let s: Sem = self.chat_json(&self.prompts.semantic_system, &user).await?;
    debug!(target: "oracle", raw = s.similarity, "Semantic similarity estimated");
    accept_in_range(s.similarity, 0.0, 1.0)
  }
}

#[async_trait]
impl DifficultyOracle for OpenAI {
  fn name(&self) -> &str {
    "openai"
  }

  #[instrument(level = "debug", target = "oracle", skip(self, question), fields(question_len = question.len(), %subject))]
  async fn estimate_difficulty(&self, question: &str, subject: &str) -> Result<f64, OracleError> {
    #[derive(Deserialize)]
    struct Diff { difficulty: f64 }

    let user = fill_template(
      &self.prompts.difficulty_user_template,
      &[("question", question), ("subject", subject)],
    );
    let d: Diff = self.chat_json(&self.prompts.difficulty_system, &user).await?;
    debug!(target: "oracle", raw = d.difficulty, "Difficulty estimated");
    accept_in_range(d.difficulty, 1.0, 10.0)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  response_format: ResponseFormat,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_error_message() {
    let body = r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Rate limit reached"));
    assert_eq!(extract_openai_error("<html>bad gateway</html>"), None);
  }

  #[tokio::test]
  async fn unreachable_endpoint_is_a_transport_error() {
    let oa = OpenAI {
      client: reqwest::Client::builder().timeout(Duration::from_millis(500)).build().unwrap(),
      api_key: "test".into(),
      // Port 9 (discard) on localhost: connection refused on any test machine.
      base_url: "http://127.0.0.1:9/v1".into(),
      model: "gpt-4o-mini".into(),
      prompts: Prompts::default(),
    };
    let err = oa.estimate_semantic_similarity("a", "b").await.unwrap_err();
    assert!(matches!(err, OracleError::Transport(_)));
  }
}
