//! External oracle capabilities and the local stand-in for semantic similarity.
//!
//! The engine holds an optional remote oracle per capability. A failed call is caught at the
//! call site and replaced by the local computation; nothing here panics or retries.

use async_trait::async_trait;

use crate::distance::jaccard;
use crate::error::OracleError;
use crate::features::extract_concepts;

/// Best-effort semantic similarity of two texts, in [0, 1].
#[async_trait]
pub trait SemanticOracle: Send + Sync {
  fn name(&self) -> &str;
  async fn estimate_semantic_similarity(&self, a: &str, b: &str) -> Result<f64, OracleError>;
}

/// Best-effort difficulty of a question for a subject, in [1, 10].
#[async_trait]
pub trait DifficultyOracle: Send + Sync {
  fn name(&self) -> &str;
  async fn estimate_difficulty(&self, question: &str, subject: &str) -> Result<f64, OracleError>;
}

/// Local semantic heuristic: Jaccard index over extracted domain concepts.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConceptOverlap;

impl ConceptOverlap {
  pub fn similarity(&self, a: &str, b: &str) -> f64 {
    jaccard(&extract_concepts(a), &extract_concepts(b))
  }
}

#[async_trait]
impl SemanticOracle for ConceptOverlap {
  fn name(&self) -> &str {
    "concept_overlap"
  }

  async fn estimate_semantic_similarity(&self, a: &str, b: &str) -> Result<f64, OracleError> {
    Ok(self.similarity(a, b))
  }
}

/// Validate a raw oracle number: non-finite is malformed, finite values are clamped.
pub fn accept_in_range(raw: f64, min: f64, max: f64) -> Result<f64, OracleError> {
  if !raw.is_finite() {
    return Err(OracleError::Malformed(format!("non-finite value {raw}")));
  }
  Ok(raw.clamp(min, max))
}


#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn concept_overlap_matches_shared_terms() {
    let oracle = ConceptOverlap;
    let sim = oracle
      .estimate_semantic_similarity(
        "Calculate the pressure of the gas in atm.",
        "Determine the pressure of the gas in kPa.",
      )
      .await
      .unwrap();
    // {calculate, pressure, atm} vs {determine, pressure, kpa}: 1 shared of 5.
    assert!((sim - 0.2).abs() < 1e-12);
  }

  #[test]
  fn concept_overlap_empty_conventions() {
    let oracle = ConceptOverlap;
    assert_eq!(oracle.similarity("hello there", "good morning"), 1.0);
    assert_eq!(oracle.similarity("the pressure rises", "good morning"), 0.0);
  }

  #[test]
  fn accept_in_range_clamps_and_rejects_nan() {
    assert_eq!(accept_in_range(1.4, 0.0, 1.0).unwrap(), 1.0);
    assert_eq!(accept_in_range(-3.0, 1.0, 10.0).unwrap(), 1.0);
    assert_eq!(accept_in_range(7.5, 1.0, 10.0).unwrap(), 7.5);
    assert!(matches!(accept_in_range(f64::NAN, 0.0, 1.0), Err(OracleError::Malformed(_))));
  }
}
