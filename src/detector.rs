//! Near-duplicate detection across a question set and plagiarism screening across answers.
//!
//! Both scans compare every unordered pair, so cost grows quadratically with the number of
//! items. That is fine for class-sized sets; past a few hundred items the pair count (and the
//! number of oracle calls) becomes the bottleneck.

use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use crate::domain::{Answer, DuplicatePair, PlagiarismFinding, QuestionSetReport, RiskLevel};
use crate::error::EngineError;
use crate::similarity::{SimilarityEngine, HIGH_SIMILARITY_THRESHOLD, SIMILARITY_THRESHOLD};

/// Similarity above which a pair of answers is a medium plagiarism risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.7;

/// Classify an answer pair by similarity.
pub fn risk_level(similarity: f64) -> RiskLevel {
  if similarity > HIGH_SIMILARITY_THRESHOLD {
    RiskLevel::High
  } else if similarity > MEDIUM_RISK_THRESHOLD {
    RiskLevel::Medium
  } else {
    RiskLevel::Low
  }
}

#[derive(Clone, Default)]
pub struct DuplicateDetector {
  engine: SimilarityEngine,
}

impl DuplicateDetector {
  pub fn new(engine: SimilarityEngine) -> Self {
    Self { engine }
  }

  pub fn engine(&self) -> &SimilarityEngine {
    &self.engine
  }

  /// Similarity of every (i, j) with i < j that `keep` accepts, sorted by (i, j).
  async fn pairwise<F>(&self, texts: &[&str], keep: F) -> Vec<(usize, usize, f64)>
  where
    F: Fn(usize, usize) -> bool,
  {
    let n = texts.len();
    let pairs = (0..n)
      .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
      .filter(|&(i, j)| keep(i, j));
    let mut scored: Vec<(usize, usize, f64)> = stream::iter(pairs)
      .map(|(i, j)| async move { (i, j, self.engine.similarity(texts[i], texts[j]).await) })
      .buffer_unordered(self.engine.concurrency())
      .collect()
      .await;
    scored.sort_by_key(|&(i, j, _)| (i, j));
    scored
  }

  #[instrument(level = "info", target = "detector", skip(self, questions), fields(questions = questions.len()))]
  pub async fn validate_question_set(&self, questions: &[String]) -> QuestionSetReport {
    let texts: Vec<&str> = questions.iter().map(String::as_str).collect();
    let scored = self.pairwise(&texts, |_, _| true).await;

    let duplicates: Vec<DuplicatePair> = scored
      .iter()
      .filter(|&&(_, _, s)| s > HIGH_SIMILARITY_THRESHOLD)
      .map(|&(index_a, index_b, similarity)| DuplicatePair { index_a, index_b, similarity })
      .collect();

    let avg_uniqueness = if scored.is_empty() {
      1.0
    } else {
      scored.iter().map(|&(_, _, s)| 1.0 - s).sum::<f64>() / scored.len() as f64
    };

    let mut recommendations = Vec::new();
    if !duplicates.is_empty() {
      let listed = duplicates
        .iter()
        .map(|d| format!("#{} and #{}", d.index_a + 1, d.index_b + 1))
        .collect::<Vec<_>>()
        .join(", ");
      recommendations.push(format!(
        "Remove or rewrite {} near-duplicate question pair(s): {}.",
        duplicates.len(),
        listed
      ));
    }
    if avg_uniqueness < SIMILARITY_THRESHOLD {
      recommendations.push(format!(
        "Average uniqueness {:.2} is below {:.2}; vary topics, quantities or question structure.",
        avg_uniqueness, SIMILARITY_THRESHOLD
      ));
    }

    let is_valid = duplicates.is_empty() && avg_uniqueness >= SIMILARITY_THRESHOLD;
    info!(target: "detector", pairs = scored.len(), duplicates = duplicates.len(), avg_uniqueness, is_valid, "Question set validated");
    QuestionSetReport { is_valid, duplicates, avg_uniqueness, recommendations }
  }

  /// Pairs of answers from different owners above the low-risk tier, sorted by pair position.
  /// Answers sharing an owner are never compared.
  #[instrument(level = "info", target = "detector", skip(self, answers), fields(answers = answers.len()))]
  pub async fn identify_plagiarism(&self, answers: &[Answer]) -> Vec<PlagiarismFinding> {
    let texts: Vec<&str> = answers.iter().map(|a| a.text.as_str()).collect();
    let findings: Vec<PlagiarismFinding> = self
      .pairwise(&texts, |i, j| answers[i].owner_id != answers[j].owner_id)
      .await
      .into_iter()
      .filter_map(|(i, j, similarity)| {
        let risk_level = risk_level(similarity);
        (risk_level > RiskLevel::Low).then(|| PlagiarismFinding {
          owner_a: answers[i].owner_id.clone(),
          owner_b: answers[j].owner_id.clone(),
          similarity,
          risk_level,
        })
      })
      .collect();

    let high = findings.iter().filter(|f| f.risk_level == RiskLevel::High).count();
    info!(target: "detector", findings = findings.len(), high, "Plagiarism screening done");
    findings
  }

  /// `validate_question_set`, abandoned as soon as `cancel` resolves.
  pub async fn validate_question_set_until<C>(&self, questions: &[String], cancel: C) -> Result<QuestionSetReport, EngineError>
  where
    C: Future<Output = ()>,
  {
    tokio::select! {
      report = self.validate_question_set(questions) => Ok(report),
      _ = cancel => {
        warn!(target: "detector", questions = questions.len(), "Question set validation cancelled");
        Err(EngineError::Cancelled)
      }
    }
  }

  /// `identify_plagiarism`, abandoned as soon as `cancel` resolves.
  pub async fn identify_plagiarism_until<C>(&self, answers: &[Answer], cancel: C) -> Result<Vec<PlagiarismFinding>, EngineError>
  where
    C: Future<Output = ()>,
  {
    tokio::select! {
      findings = self.identify_plagiarism(answers) => Ok(findings),
      _ = cancel => {
        warn!(target: "detector", answers = answers.len(), "Plagiarism screening cancelled");
        Err(EngineError::Cancelled)
      }
    }
  }
}
