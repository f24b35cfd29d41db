//! Request dispatch shared by every transport: parse one line, run the operation, build the reply.

use tracing::{debug, instrument};

use crate::difficulty::{difficulty_distribution, validate_difficulty_balance};
use crate::error::EngineError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::Engine;
use crate::util::trunc_for_log;

/// Parse a JSON request line.
pub fn parse_request(line: &str) -> Result<ClientMessage, EngineError> {
  serde_json::from_str::<ClientMessage>(line).map_err(|e| EngineError::Protocol(e.to_string()))
}

#[instrument(level = "info", target = "labq_engine", skip_all)]
pub async fn handle_request(engine: &Engine, msg: ClientMessage) -> ServerMessage {
  match msg {
    ClientMessage::Ping => ServerMessage::Pong,

    ClientMessage::Similarity { a, b } => {
      let breakdown = engine.similarity.similarity_breakdown(&a, &b).await;
      ServerMessage::Similarity { score: breakdown.combined, breakdown }
    }

    ClientMessage::Uniqueness { candidate, corpus } => {
      let report = engine.similarity.check_uniqueness(&candidate, &corpus).await;
      ServerMessage::Uniqueness { report }
    }

    ClientMessage::FindSimilar { candidate, corpus, threshold } => {
      let matches = engine.similarity.find_similar(&candidate, &corpus, threshold).await;
      ServerMessage::SimilarQuestions { matches }
    }

    ClientMessage::ValidateQuestionSet { questions } => {
      let report = engine.detector.validate_question_set(&questions).await;
      ServerMessage::QuestionSet { report }
    }

    ClientMessage::IdentifyPlagiarism { answers } => {
      let findings = engine.detector.identify_plagiarism(&answers).await;
      ServerMessage::Plagiarism { findings }
    }

    ClientMessage::AnalyzeDifficulty { text, subject, target_difficulty } => {
      let assessment = engine.difficulty.assess_difficulty(&text, &subject, target_difficulty).await;
      ServerMessage::Difficulty { assessment }
    }

    ClientMessage::DifficultyDistribution { scores } => {
      ServerMessage::Distribution { distribution: difficulty_distribution(&scores) }
    }

    ClientMessage::DifficultyBalance { scores, target } => {
      ServerMessage::Balance { report: validate_difficulty_balance(&scores, target) }
    }
  }
}

/// Full round trip for one input line; always yields a reply.
pub async fn handle_line(engine: &Engine, line: &str) -> ServerMessage {
  match parse_request(line) {
    Ok(msg) => {
      debug!(target: "labq_engine", request = %trunc_for_log(&format!("{msg:?}"), 200), "Request received");
      handle_request(engine, msg).await
    }
    Err(e) => ServerMessage::Error { message: e.to_string() },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn reply(line: &str) -> serde_json::Value {
    let engine = Engine::default();
    serde_json::to_value(handle_line(&engine, line).await).unwrap()
  }

  #[tokio::test]
  async fn ping_pongs() {
    assert_eq!(reply(r#"{"type":"ping"}"#).await["type"], "pong");
  }

  #[tokio::test]
  async fn invalid_json_is_an_error_reply() {
    let v = reply("{not json").await;
    assert_eq!(v["type"], "error");
    assert!(v["message"].as_str().unwrap().starts_with("invalid request"));
  }

  #[tokio::test]
  async fn similarity_of_identical_texts() {
    let v = reply(r#"{"type":"similarity","a":"Find the mass.","b":"Find the mass."}"#).await;
    assert_eq!(v["score"], 1.0);
    assert_eq!(v["breakdown"]["semantic_source"], "identical");
  }

  #[tokio::test]
  async fn uniqueness_against_empty_corpus() {
    let v = reply(r#"{"type":"uniqueness","candidate":"Find the mass.","corpus":[]}"#).await;
    assert_eq!(v["type"], "uniqueness");
    assert_eq!(v["score"], 1.0);
    assert_eq!(v["isUnique"], true);
  }

  #[tokio::test]
  async fn difficulty_without_oracle_defaults() {
    let v = reply(r#"{"type":"analyze_difficulty","text":"Name the organelle.","subject":"biology"}"#).await;
    assert_eq!(v["score"], 5.0);
    assert_eq!(v["source"], "default_fallback");
  }

  #[tokio::test]
  async fn balance_reports_recommendations() {
    let v = reply(r#"{"type":"difficulty_balance","scores":[9,9,9,9]}"#).await;
    assert_eq!(v["isBalanced"], false);
    assert_eq!(v["recommendations"].as_array().unwrap().len(), 3);
  }
}
