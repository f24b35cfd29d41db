use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;

use labq_engine::config::DifficultyFallback;
use labq_engine::difficulty::{pull_toward_target, rule_based_score};
use labq_engine::distance::levenshtein;
use labq_engine::{DifficultyAnalyzer, DifficultyOracle, OracleError, SimilarityEngine};

fn block_on<F: std::future::Future>(f: F) -> F::Output {
  tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .unwrap()
    .block_on(f)
}

struct ConstantDifficulty(f64);

#[async_trait]
impl DifficultyOracle for ConstantDifficulty {
  fn name(&self) -> &str {
    "constant"
  }
  async fn estimate_difficulty(&self, _q: &str, _s: &str) -> Result<f64, OracleError> {
    Ok(self.0)
  }
}

const TEXT: &str = "[A-Za-z0-9 .,?()+=]{0,60}";

proptest! {
  #[test]
  fn similarity_is_symmetric_and_bounded(a in TEXT, b in TEXT) {
    let engine = SimilarityEngine::local();
    let (ab, ba) = block_on(async { (engine.similarity(&a, &b).await, engine.similarity(&b, &a).await) });
    prop_assert_eq!(ab, ba);
    prop_assert!((0.0..=1.0).contains(&ab));
  }

  #[test]
  fn similarity_is_reflexive(t in TEXT) {
    let engine = SimilarityEngine::local();
    prop_assert_eq!(block_on(engine.similarity(&t, &t)), 1.0);
  }

  #[test]
  fn uniqueness_is_bounded(candidate in TEXT, corpus in proptest::collection::vec(TEXT, 0..5)) {
    let engine = SimilarityEngine::local();
    let u = block_on(engine.uniqueness(&candidate, &corpus));
    prop_assert!((0.0..=1.0).contains(&u));
    if corpus.is_empty() {
      prop_assert_eq!(u, 1.0);
    }
    if corpus.contains(&candidate) {
      prop_assert_eq!(u, 0.0);
    }
  }

  #[test]
  fn levenshtein_is_a_metric(a in "[a-c]{0,8}", b in "[a-c]{0,8}", c in "[a-c]{0,8}") {
    prop_assert_eq!(levenshtein(&a, &a), 0);
    prop_assert_eq!(levenshtein(&a, &b), levenshtein(&b, &a));
    prop_assert!(levenshtein(&a, &c) <= levenshtein(&a, &b) + levenshtein(&b, &c));
    prop_assert!(levenshtein(&a, &b) <= a.len().max(b.len()));
  }

  #[test]
  fn difficulty_stays_in_range(text in TEXT, subject in "(physics|chemistry|biology|art)", ai in -5.0f64..20.0, target in proptest::option::of(-5.0f64..20.0)) {
    let blended = DifficultyAnalyzer::new(Some(Arc::new(ConstantDifficulty(ai.clamp(1.0, 10.0)))), DifficultyFallback::TargetOrDefault);
    let local = DifficultyAnalyzer::new(None, DifficultyFallback::RuleBased);
    for analyzer in [blended, local] {
      let score = block_on(analyzer.analyze_difficulty(&text, &subject, target));
      prop_assert!((1.0..=10.0).contains(&score));
      prop_assert_eq!((score * 10.0).round() / 10.0, score);
    }
    let rule = rule_based_score(&text, &subject);
    prop_assert!((1.0..=10.0).contains(&rule));
  }

  #[test]
  fn target_pull_moves_toward_and_never_past(score in 1.0f64..=10.0, t1 in 1.0f64..=10.0, t2 in 1.0f64..=10.0) {
    let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
    let pulled_lo = pull_toward_target(score, Some(lo));
    let pulled_hi = pull_toward_target(score, Some(hi));
    prop_assert!(pulled_lo <= pulled_hi);
    for (t, p) in [(lo, pulled_lo), (hi, pulled_hi)] {
      prop_assert!((p - score).abs() <= (t - score).abs() + 1e-12);
      prop_assert!((p - t).abs() <= (score - t).abs() + 1e-12);
    }
  }
}

#[test]
fn more_shared_words_never_lowers_similarity() {
  let engine = SimilarityEngine::local();
  let base = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"];
  let replacements = ["xray", "yankee", "zulu", "whiskey", "victor", "uniform"];
  let a = base.join(" ");

  let mut previous = f64::INFINITY;
  for replaced in 0..=base.len() {
    let b: Vec<&str> = (0..base.len())
      .map(|i| if i < replaced { replacements[i] } else { base[i] })
      .collect();
    let s = block_on(engine.similarity(&a, &b.join(" ")));
    assert!(s <= previous, "similarity rose from {previous} to {s} at {replaced} replacements");
    previous = s;
  }
}

#[test]
fn higher_target_never_lowers_the_blend() {
  let analyzer = DifficultyAnalyzer::new(Some(Arc::new(ConstantDifficulty(6.0))), DifficultyFallback::TargetOrDefault);
  let text = "Calculate the equilibrium constant for the reaction at 298 K.";
  let mut previous = 0.0;
  for target in 1..=10 {
    let score = block_on(analyzer.analyze_difficulty(text, "chemistry", Some(target as f64)));
    assert!(score >= previous);
    previous = score;
  }
}
