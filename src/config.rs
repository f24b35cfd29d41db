//! Loading engine configuration (oracle limits, prompts, difficulty fallback) from TOML.
//!
//! See `EngineConfig` for the expected schema. Every section is optional.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct EngineConfig {
  #[serde(default)]
  pub oracle: OracleSettings,
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub difficulty: DifficultySettings,
}

/// Limits applied to calls against the external oracles.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
  /// Maximum number of pairwise comparisons in flight at once.
  pub concurrency: usize,
  pub timeout_secs: u64,
}

impl Default for OracleSettings {
  fn default() -> Self {
    Self { concurrency: 8, timeout_secs: 20 }
  }
}

impl OracleSettings {
  /// Concurrency limit, never below one.
  pub fn concurrency_limit(&self) -> usize {
    self.concurrency.max(1)
  }
}

/// What `analyze_difficulty` returns when the difficulty oracle fails.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyFallback {
  /// The caller's target if given, else 5.0.
  #[default]
  TargetOrDefault,
  /// The rule-based score, still pulled toward the target.
  RuleBased,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DifficultySettings {
  pub fallback: DifficultyFallback,
}

/// Prompts used by the OpenAI oracle client.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub semantic_system: String,
  pub semantic_user_template: String,
  pub difficulty_system: String,
  pub difficulty_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      semantic_system: "You compare STEM lab questions for semantic overlap. Respond ONLY with strict JSON.".into(),
      semantic_user_template: "Question A: {a}\nQuestion B: {b}\n\nReturn JSON {\"similarity\": number} where 0 means unrelated and 1 means the questions ask the same thing.".into(),
      difficulty_system: "You rate the difficulty of STEM lab questions for students. Respond ONLY with strict JSON.".into(),
      difficulty_user_template: "Subject: {subject}\nQuestion: {question}\n\nReturn JSON {\"difficulty\": number} on a scale from 1 (trivial recall) to 10 (research level).".into(),
    }
  }
}

/// Parse a TOML document into `EngineConfig`.
pub fn parse_engine_config(s: &str) -> Result<EngineConfig, toml::de::Error> {
  toml::from_str::<EngineConfig>(s)
}

/// Attempt to load `EngineConfig` from LABQ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_engine_config_from_env() -> Option<EngineConfig> {
  let path = std::env::var("LABQ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_engine_config(&s) {
      Ok(cfg) => {
        info!(target: "labq_engine", %path, "Loaded engine config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "labq_engine", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "labq_engine", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
