//! Composite 1–10 difficulty scoring and difficulty-mix balance checks.
//!
//! final = 0.7 * ai + 0.3 * rules, then pulled 20% toward the caller's target, clamped to
//! [1, 10] and rounded to one decimal. When the difficulty oracle fails the blend is skipped
//! and the configured fallback decides the result.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::config::DifficultyFallback;
use crate::domain::{
  BalanceReport, DifficultyAssessment, DifficultyBucket, DifficultyDistribution, DifficultyRatios, DifficultySource,
  RuleFactors,
};
use crate::oracle::DifficultyOracle;
use crate::util::round1;

pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;
pub const DEFAULT_DIFFICULTY: f64 = 5.0;
pub const RULE_BASE_SCORE: f64 = 5.0;

pub const AI_WEIGHT: f64 = 0.7;
pub const RULE_WEIGHT: f64 = 0.3;
/// Share of the distance to the target that the score moves.
pub const TARGET_PULL: f64 = 0.2;
/// Largest tolerated gap between observed and target bucket ratios.
pub const BALANCE_TOLERANCE: f64 = 0.15;

const MAX_LENGTH_FACTOR: f64 = 2.0;
const MAX_VOCABULARY_FACTOR: f64 = 1.5;
const MAX_STRUCTURE_FACTOR: f64 = 1.0;
const MAX_MATH_FACTOR: f64 = 2.0;
const LONG_WORD_CHARS: usize = 8;
const MATH_MATCH_WEIGHT: f64 = 0.3;
const MULTI_STEP_BONUS: f64 = 0.5;

/// (subject, keyword, bonus). Every matching row for the subject counts.
const SUBJECT_BONUSES: &[(&str, &str, f64)] = &[
  ("chemistry", "equilibrium", 1.0),
  ("chemistry", "kinetics", 1.0),
  ("chemistry", "thermodynamic", 1.5),
  ("chemistry", "electrochemi", 1.0),
  ("physics", "quantum", 2.0),
  ("physics", "relativity", 2.0),
  ("physics", "electromagnetic", 1.0),
  ("biology", "molecular", 1.5),
  ("biology", "genetic", 1.0),
  ("computer_science", "complexity", 1.5),
  ("computer_science", "recursion", 1.0),
  ("mathematics", "proof", 1.5),
  ("mathematics", "differential", 1.0),
];

static ARITHMETIC: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?\s*[-+*/×÷^=]\s*\d+(?:\.\d+)?").expect("static regex"));
static MATH_FUNCTIONS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\b(?:log|ln|sin|cos|tan|sqrt|exp|integral|derivative|limit)\b").expect("static regex")
});
static MATH_CONCEPTS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\b(?:matrix|matrices|vectors?|differential|eigenvalues?|tensor|gradient|fourier|laplace)\b")
    .expect("static regex")
});
static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^()]*\)").expect("static regex"));
static MATH_SYMBOLS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[∫∑∏√∂∇±≤≥≠≈∞πΔ]").expect("static regex"));

fn normalize_subject(subject: &str) -> String {
  let s = subject.trim().to_lowercase().replace(['-', ' '], "_");
  match s.as_str() {
    "cs" | "computing" => "computer_science".into(),
    "math" | "maths" => "mathematics".into(),
    _ => s,
  }
}

fn subject_adjustment(text_lower: &str, subject: &str) -> f64 {
  let subject = normalize_subject(subject);
  SUBJECT_BONUSES
    .iter()
    .filter(|(s, keyword, _)| *s == subject && text_lower.contains(keyword))
    .map(|(_, _, bonus)| bonus)
    .sum()
}

fn mathematical_complexity(text: &str, text_lower: &str) -> f64 {
  let matches: usize = [&*ARITHMETIC, &*MATH_FUNCTIONS, &*MATH_CONCEPTS, &*PARENTHETICAL, &*MATH_SYMBOLS]
    .iter()
    .map(|re| re.find_iter(text).count())
    .sum();
  let mut score = matches as f64 * MATH_MATCH_WEIGHT;
  if ["step", "calculate", "solve"].iter().any(|k| text_lower.contains(k)) {
    score += MULTI_STEP_BONUS;
  }
  score.min(MAX_MATH_FACTOR)
}

/// Local heuristic contributions for a question.
pub fn rule_based_factors(text: &str, subject: &str) -> RuleFactors {
  let words: Vec<&str> = text.split_whitespace().collect();
  let word_count = words.len() as f64;
  let text_lower = text.to_lowercase();

  let length = (word_count / 50.0).min(MAX_LENGTH_FACTOR);

  let vocabulary = if words.is_empty() {
    0.0
  } else {
    let long = words.iter().filter(|w| w.chars().count() >= LONG_WORD_CHARS).count() as f64;
    (long / word_count * 10.0).min(MAX_VOCABULARY_FACTOR)
  };

  let sentences = text.split(['.', '!', '?']).filter(|s| !s.trim().is_empty()).count();
  let structure = if sentences == 0 {
    0.0
  } else {
    (word_count / sentences as f64 / 15.0).min(MAX_STRUCTURE_FACTOR)
  };

  let subject = subject_adjustment(&text_lower, subject);
  let mathematical = mathematical_complexity(text, &text_lower);

  let total = (RULE_BASE_SCORE + length + vocabulary + structure + subject + mathematical)
    .clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
  RuleFactors { length, vocabulary, structure, subject, mathematical, total }
}

pub fn rule_based_score(text: &str, subject: &str) -> f64 {
  rule_based_factors(text, subject).total
}

/// Move `score` 20% of the way toward `target` (if any) and clamp to [1, 10].
pub fn pull_toward_target(score: f64, target: Option<f64>) -> f64 {
  let pulled = match target {
    Some(t) => score + (t - score) * TARGET_PULL,
    None => score,
  };
  pulled.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

#[derive(Clone, Default)]
pub struct DifficultyAnalyzer {
  oracle: Option<Arc<dyn DifficultyOracle>>,
  fallback: DifficultyFallback,
}

impl DifficultyAnalyzer {
  pub fn new(oracle: Option<Arc<dyn DifficultyOracle>>, fallback: DifficultyFallback) -> Self {
    Self { oracle, fallback }
  }

  async fn ai_score(&self, text: &str, subject: &str) -> Option<f64> {
    let oracle = self.oracle.as_ref()?;
    match oracle.estimate_difficulty(text, subject).await {
      Ok(v) => Some(v),
      Err(e) => {
        warn!(target: "difficulty", oracle = oracle.name(), error = %e, "Difficulty oracle failed; degrading.");
        None
      }
    }
  }

  /// Full assessment: final score, both inputs, and which path produced the score.
  #[instrument(level = "info", target = "difficulty", skip(self, text), fields(text_len = text.len(), %subject, target_difficulty = ?target))]
  pub async fn assess_difficulty(&self, text: &str, subject: &str, target: Option<f64>) -> DifficultyAssessment {
    let target = match target {
      Some(t) if !t.is_finite() => {
        warn!(target: "difficulty", "Ignoring non-finite target difficulty");
        None
      }
      t => t,
    };

    let rule_score = rule_based_score(text, subject);
    let ai_score = self.ai_score(text, subject).await;

    let (score, source) = match ai_score {
      Some(ai) => {
        let blended = AI_WEIGHT * ai + RULE_WEIGHT * rule_score;
        (pull_toward_target(blended, target), DifficultySource::Blended)
      }
      None => match (self.fallback, target) {
        (DifficultyFallback::TargetOrDefault, Some(t)) => {
          (t.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY), DifficultySource::TargetFallback)
        }
        (DifficultyFallback::TargetOrDefault, None) => (DEFAULT_DIFFICULTY, DifficultySource::DefaultFallback),
        (DifficultyFallback::RuleBased, t) => (pull_toward_target(rule_score, t), DifficultySource::RuleFallback),
      },
    };

    let score = round1(score);
    info!(target: "difficulty", score, ?ai_score, rule_score, ?source, "Difficulty assessed");
    DifficultyAssessment { score, ai_score, rule_score, source }
  }

  pub async fn analyze_difficulty(&self, text: &str, subject: &str, target: Option<f64>) -> f64 {
    self.assess_difficulty(text, subject, target).await.score
  }
}

/// Count scores per bucket. Non-finite scores are skipped.
pub fn difficulty_distribution(scores: &[f64]) -> DifficultyDistribution {
  let mut dist = DifficultyDistribution::default();
  for &s in scores.iter().filter(|s| s.is_finite()) {
    match DifficultyBucket::from_score(s) {
      DifficultyBucket::Easy => dist.easy += 1,
      DifficultyBucket::Medium => dist.medium += 1,
      DifficultyBucket::Hard => dist.hard += 1,
    }
  }
  dist
}

/// Compare the observed bucket ratios against `target` (default 25/50/25).
///
/// With no finite scores there is no mix to judge: the report is balanced, all observed
/// ratios are zero and there are no recommendations.
pub fn validate_difficulty_balance(scores: &[f64], target: Option<DifficultyRatios>) -> BalanceReport {
  let target = target.unwrap_or_default();
  let distribution = difficulty_distribution(scores);
  let total = distribution.total();
  if total == 0 {
    // Nothing to weigh against the target mix.
    debug!(target: "difficulty", "Difficulty balance checked on an empty score set");
    let actual = DifficultyRatios { easy: 0.0, medium: 0.0, hard: 0.0 };
    return BalanceReport { is_balanced: true, distribution, actual, target, recommendations: Vec::new() };
  }
  let ratio = |bucket| distribution.count(bucket) as f64 / total as f64;
  let actual = DifficultyRatios {
    easy: ratio(DifficultyBucket::Easy),
    medium: ratio(DifficultyBucket::Medium),
    hard: ratio(DifficultyBucket::Hard),
  };

  let mut recommendations = Vec::new();
  for bucket in DifficultyBucket::ALL {
    let (observed, wanted) = (actual.ratio(bucket), target.ratio(bucket));
    let diff = observed - wanted;
    if diff.abs() > BALANCE_TOLERANCE {
      let verb = if diff < 0.0 { "Need more" } else { "Too many" };
      recommendations.push(format!(
        "{verb} {} questions ({:.0}% vs target {:.0}%)",
        bucket.label(),
        observed * 100.0,
        wanted * 100.0
      ));
    }
  }

  debug!(target: "difficulty", total, ?distribution, imbalanced = recommendations.len(), "Difficulty balance checked");
  BalanceReport { is_balanced: recommendations.is_empty(), distribution, actual, target, recommendations }
}
