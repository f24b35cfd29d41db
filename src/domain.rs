//! Value types returned by the engine. All of them are derived and ephemeral;
//! identifiers belong to whoever owns the stored questions and answers.

use serde::{Deserialize, Serialize};

/// Where the semantic sub-score came from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SemanticSource {
  Oracle,
  ConceptOverlap,
  Identical,
}

/// The three sub-scores and their weighted combination.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SimilarityBreakdown {
  pub lexical: f64,
  pub structural: f64,
  pub semantic: f64,
  pub semantic_source: SemanticSource,
  pub combined: f64,
}

/// A corpus item close to a candidate.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SimilarMatch {
  pub index: usize,
  pub similarity: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UniquenessReport {
  pub score: f64,
  pub is_unique: bool,
  pub most_similar: Option<SimilarMatch>,
}

/// Two questions of a set that are near-identical.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct DuplicatePair {
  pub index_a: usize,
  pub index_b: usize,
  pub similarity: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSetReport {
  pub is_valid: bool,
  pub duplicates: Vec<DuplicatePair>,
  pub avg_uniqueness: f64,
  pub recommendations: Vec<String>,
}

/// A free-text answer and whoever submitted it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
  pub owner_id: String,
  pub text: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
  Low,
  Medium,
  High,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismFinding {
  pub owner_a: String,
  pub owner_b: String,
  pub similarity: f64,
  pub risk_level: RiskLevel,
}

/// Rule-based contributions, before and after clamping.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RuleFactors {
  pub length: f64,
  pub vocabulary: f64,
  pub structure: f64,
  pub subject: f64,
  pub mathematical: f64,
  /// Base plus all factors, clamped to [1, 10].
  pub total: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DifficultySource {
  Blended,
  TargetFallback,
  DefaultFallback,
  RuleFallback,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyAssessment {
  pub score: f64,
  pub ai_score: Option<f64>,
  pub rule_score: f64,
  pub source: DifficultySource,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyBucket {
  Easy,
  Medium,
  Hard,
}

impl DifficultyBucket {
  pub const ALL: [DifficultyBucket; 3] = [DifficultyBucket::Easy, DifficultyBucket::Medium, DifficultyBucket::Hard];

  /// Easy up to 3, Medium up to 6, Hard above.
  pub fn from_score(score: f64) -> Self {
    if score <= 3.0 {
      DifficultyBucket::Easy
    } else if score <= 6.0 {
      DifficultyBucket::Medium
    } else {
      DifficultyBucket::Hard
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      DifficultyBucket::Easy => "easy",
      DifficultyBucket::Medium => "medium",
      DifficultyBucket::Hard => "hard",
    }
  }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DifficultyDistribution {
  pub easy: usize,
  pub medium: usize,
  pub hard: usize,
}

impl DifficultyDistribution {
  pub fn total(&self) -> usize {
    self.easy + self.medium + self.hard
  }

  pub fn count(&self, bucket: DifficultyBucket) -> usize {
    match bucket {
      DifficultyBucket::Easy => self.easy,
      DifficultyBucket::Medium => self.medium,
      DifficultyBucket::Hard => self.hard,
    }
  }
}

/// Target share of each bucket; expected to sum to 1.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct DifficultyRatios {
  pub easy: f64,
  pub medium: f64,
  pub hard: f64,
}

impl Default for DifficultyRatios {
  fn default() -> Self {
    Self { easy: 0.25, medium: 0.5, hard: 0.25 }
  }
}

impl DifficultyRatios {
  pub fn ratio(&self, bucket: DifficultyBucket) -> f64 {
    match bucket {
      DifficultyBucket::Easy => self.easy,
      DifficultyBucket::Medium => self.medium,
      DifficultyBucket::Hard => self.hard,
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
  pub is_balanced: bool,
  pub distribution: DifficultyDistribution,
  pub actual: DifficultyRatios,
  pub target: DifficultyRatios,
  pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bucket_boundaries() {
    assert_eq!(DifficultyBucket::from_score(1.0), DifficultyBucket::Easy);
    assert_eq!(DifficultyBucket::from_score(3.0), DifficultyBucket::Easy);
    assert_eq!(DifficultyBucket::from_score(3.1), DifficultyBucket::Medium);
    assert_eq!(DifficultyBucket::from_score(6.0), DifficultyBucket::Medium);
    assert_eq!(DifficultyBucket::from_score(6.1), DifficultyBucket::Hard);
    assert_eq!(DifficultyBucket::from_score(10.0), DifficultyBucket::Hard);
  }

  #[test]
  fn risk_levels_are_ordered() {
    assert!(RiskLevel::High > RiskLevel::Medium);
    assert!(RiskLevel::Medium > RiskLevel::Low);
  }

  #[test]
  fn answer_uses_camel_case_on_the_wire() {
    let a: Answer = serde_json::from_str(r#"{"ownerId":"s1","text":"hello"}"#).unwrap();
    assert_eq!(a.owner_id, "s1");
  }
}
