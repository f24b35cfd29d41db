//! Multi-signal question similarity and corpus uniqueness.
//!
//! similarity = 0.3 * lexical + 0.3 * structural + 0.4 * semantic
//!
//! - lexical: Jaccard over `tokenize` sets
//! - structural: normalized Levenshtein over `extract_structure` skeletons
//! - semantic: the semantic oracle when it answers, otherwise Jaccard over concept sets
//!
//! The score is reflexive (identical texts short-circuit to 1.0) and symmetric (the oracle
//! always sees the pair in canonical order).

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, instrument, warn};

use crate::config::OracleSettings;
use crate::distance::{jaccard, normalized_edit_similarity};
use crate::domain::{SemanticSource, SimilarMatch, SimilarityBreakdown, UniquenessReport};
use crate::features::{extract_structure, tokenize};
use crate::oracle::{ConceptOverlap, SemanticOracle};

pub const LEXICAL_WEIGHT: f64 = 0.3;
pub const STRUCTURAL_WEIGHT: f64 = 0.3;
pub const SEMANTIC_WEIGHT: f64 = 0.4;

/// Minimum uniqueness for a question (or a set, on average) to count as unique.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;
/// Similarity above which two texts are treated as duplicates.
pub const HIGH_SIMILARITY_THRESHOLD: f64 = 0.9;

#[derive(Clone)]
pub struct SimilarityEngine {
  oracle: Option<Arc<dyn SemanticOracle>>,
  fallback: ConceptOverlap,
  concurrency: usize,
}

impl SimilarityEngine {
  pub fn new(oracle: Option<Arc<dyn SemanticOracle>>, concurrency: usize) -> Self {
    Self { oracle, fallback: ConceptOverlap, concurrency: concurrency.max(1) }
  }

  /// Engine without a remote oracle: semantic scores always come from concept overlap.
  pub fn local() -> Self {
    Self::new(None, OracleSettings::default().concurrency_limit())
  }

  pub fn concurrency(&self) -> usize {
    self.concurrency
  }

  async fn semantic(&self, a: &str, b: &str) -> (f64, SemanticSource) {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    if let Some(oracle) = &self.oracle {
      match oracle.estimate_semantic_similarity(first, second).await {
        Ok(v) => return (v, SemanticSource::Oracle),
        Err(e) => {
          warn!(target: "similarity", oracle = oracle.name(), error = %e, "Semantic oracle failed; using concept overlap.");
        }
      }
    }
    (self.fallback.similarity(first, second), SemanticSource::ConceptOverlap)
  }

  /// All three sub-scores plus the weighted combination.
  #[instrument(level = "debug", target = "similarity", skip(self, a, b), fields(a_len = a.len(), b_len = b.len()))]
  pub async fn similarity_breakdown(&self, a: &str, b: &str) -> SimilarityBreakdown {
    if a == b {
      return SimilarityBreakdown {
        lexical: 1.0,
        structural: 1.0,
        semantic: 1.0,
        semantic_source: SemanticSource::Identical,
        combined: 1.0,
      };
    }

    let lexical = jaccard(&tokenize(a), &tokenize(b));
    let structural = normalized_edit_similarity(&extract_structure(a), &extract_structure(b));
    let (semantic, semantic_source) = self.semantic(a, b).await;
    let combined =
      (LEXICAL_WEIGHT * lexical + STRUCTURAL_WEIGHT * structural + SEMANTIC_WEIGHT * semantic).clamp(0.0, 1.0);

    debug!(target: "similarity", lexical, structural, semantic, ?semantic_source, combined, "Similarity computed");
    SimilarityBreakdown { lexical, structural, semantic, semantic_source, combined }
  }

  pub async fn similarity(&self, a: &str, b: &str) -> f64 {
    self.similarity_breakdown(a, b).await.combined
  }

  /// Similarity of `candidate` to every corpus item, in corpus order.
  async fn score_against(&self, candidate: &str, corpus: &[String]) -> Vec<SimilarMatch> {
    let mut matches: Vec<SimilarMatch> = stream::iter(corpus.iter().enumerate())
      .map(|(index, text)| async move {
        SimilarMatch { index, similarity: self.similarity(candidate, text).await }
      })
      .buffer_unordered(self.concurrency)
      .collect()
      .await;
    matches.sort_by_key(|m| m.index);
    matches
  }

  /// Uniqueness score, verdict and closest corpus item.
  #[instrument(level = "info", target = "similarity", skip(self, candidate, corpus), fields(candidate_len = candidate.len(), corpus_len = corpus.len()))]
  pub async fn check_uniqueness(&self, candidate: &str, corpus: &[String]) -> UniquenessReport {
    let matches = self.score_against(candidate, corpus).await;
    // First maximum wins, so ties resolve to the lowest index.
    let most_similar = matches
      .into_iter()
      .fold(None, |best: Option<SimilarMatch>, m| match best {
        Some(b) if b.similarity >= m.similarity => Some(b),
        _ => Some(m),
      });
    let score = most_similar.map_or(1.0, |m| (1.0 - m.similarity).max(0.0));
    debug!(target: "similarity", score, ?most_similar, "Uniqueness computed");
    UniquenessReport { score, is_unique: score >= SIMILARITY_THRESHOLD, most_similar }
  }

  /// `1 - max similarity` against the corpus; 1.0 for an empty corpus.
  pub async fn uniqueness(&self, candidate: &str, corpus: &[String]) -> f64 {
    self.check_uniqueness(candidate, corpus).await.score
  }

  /// Corpus items at or above `threshold`, most similar first (ties by index).
  #[instrument(level = "info", target = "similarity", skip(self, candidate, corpus), fields(candidate_len = candidate.len(), corpus_len = corpus.len()))]
  pub async fn find_similar(&self, candidate: &str, corpus: &[String], threshold: f64) -> Vec<SimilarMatch> {
    let mut matches: Vec<SimilarMatch> = self
      .score_against(candidate, corpus)
      .await
      .into_iter()
      .filter(|m| m.similarity >= threshold)
      .collect();
    matches.sort_by(|x, y| y.similarity.total_cmp(&x.similarity).then(x.index.cmp(&y.index)));
    matches
  }
}

impl Default for SimilarityEngine {
  fn default() -> Self {
    Self::local()
  }
}
