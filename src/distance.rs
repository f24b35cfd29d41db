//! Set and string distance primitives used by the similarity engine.

use std::collections::BTreeSet;

/// Jaccard index |A ∩ B| / |A ∪ B|.
///
/// Two empty sets are identical (1.0); exactly one empty set shares nothing (0.0).
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
  if a.is_empty() && b.is_empty() {
    return 1.0;
  }
  let intersection = a.intersection(b).count();
  let union = a.len() + b.len() - intersection;
  intersection as f64 / union as f64
}

/// Exact Levenshtein distance over Unicode scalar values, unit costs.
pub fn levenshtein(a: &str, b: &str) -> usize {
  let a: Vec<char> = a.chars().collect();
  let b: Vec<char> = b.chars().collect();
  if a.is_empty() {
    return b.len();
  }
  if b.is_empty() {
    return a.len();
  }

  // Two rolling rows of the DP table: prev = row i-1, curr = row i.
  let mut prev: Vec<usize> = (0..=b.len()).collect();
  let mut curr = vec![0usize; b.len() + 1];
  for (i, ca) in a.iter().enumerate() {
    curr[0] = i + 1;
    for (j, cb) in b.iter().enumerate() {
      let substitution = prev[j] + usize::from(ca != cb);
      let deletion = prev[j + 1] + 1;
      let insertion = curr[j] + 1;
      curr[j + 1] = substitution.min(deletion).min(insertion);
    }
    std::mem::swap(&mut prev, &mut curr);
  }
  prev[b.len()]
}

/// `1 - distance / max_len`, with two empty strings defined as identical.
pub fn normalized_edit_similarity(a: &str, b: &str) -> f64 {
  let max_len = a.chars().count().max(b.chars().count());
  if max_len == 0 {
    return 1.0;
  }
  1.0 - levenshtein(a, b) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
  use super::*;

  fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn levenshtein_known_values() {
    assert_eq!(levenshtein("kitten", "sitting"), 3);
    assert_eq!(levenshtein("", ""), 0);
    assert_eq!(levenshtein("abc", "abc"), 0);
    assert_eq!(levenshtein("", "abc"), 3);
    assert_eq!(levenshtein("abc", ""), 3);
    assert_eq!(levenshtein("flaw", "lawn"), 2);
    assert_eq!(levenshtein("saturday", "sunday"), 3);
  }

  #[test]
  fn levenshtein_counts_chars_not_bytes() {
    assert_eq!(levenshtein("°C", "°F"), 1);
  }

  #[test]
  fn jaccard_empty_conventions() {
    assert_eq!(jaccard(&set(&[]), &set(&[])), 1.0);
    assert_eq!(jaccard(&set(&["mol"]), &set(&[])), 0.0);
    assert_eq!(jaccard(&set(&[]), &set(&["mol"])), 0.0);
  }

  #[test]
  fn jaccard_partial_overlap() {
    let a = set(&["force", "mass", "acceleration"]);
    let b = set(&["force", "mass", "velocity", "energy"]);
    assert!((jaccard(&a, &b) - 2.0 / 5.0).abs() < 1e-12);
  }

  #[test]
  fn normalized_edit_similarity_bounds() {
    assert_eq!(normalized_edit_similarity("", ""), 1.0);
    assert_eq!(normalized_edit_similarity("word", "word"), 1.0);
    assert_eq!(normalized_edit_similarity("abc", ""), 0.0);
    assert!((normalized_edit_similarity("kitten", "sitting") - (1.0 - 3.0 / 7.0)).abs() < 1e-12);
  }
}
