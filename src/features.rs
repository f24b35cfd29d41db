//! Text feature extraction: lexical token sets, structural skeletons and domain concepts.
//!
//! Everything here is a pure function of the input text. The regexes are compiled once.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Lower-cased word tokens longer than two characters, duplicates collapsed.
pub type TokenSet = BTreeSet<String>;

/// Normalized domain terms (units, action verbs, scientific nouns, formulas).
pub type ConceptSet = BTreeSet<String>;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("static regex"));
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("static regex"));
static CAPITALIZED_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z][a-z]+").expect("static regex"));
static LOWERCASE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]+").expect("static regex"));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

// Concept vocabularies. Units must start the text or follow whitespace, a digit or an
// opening bracket, so "Newton's" and "I'm" contribute no unit.
static UNITS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?i)(?:^|[\s\d(\[])(mol/l|m/s2|m/s|g/ml|mol|moles?|molar|mmol|g|kg|mg|l|ml|m|cm|mm|km|nm|s|ms|min|h|k|kelvin|celsius|j|kj|cal|kcal|n|pa|kpa|atm|bar|torr|v|mv|ma|amp|w|kw|hz|ohms?)\b",
  )
  .expect("static regex")
});
static ACTION_VERBS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\b(calculate|solve|find|determine|compute|derive|integrate|differentiate)\b")
    .expect("static regex")
});
static SCIENTIFIC_NOUNS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?i)\b(concentration|pressure|temperature|velocity|acceleration|force|energy|ph|equilibrium|momentum|mass|volume|density|molarity|reaction|enthalpy|entropy|voltage|current|resistance|frequency|wavelength|photosynthesis|enzyme|cell|dna|gene|protein)\b",
  )
  .expect("static regex")
});
static CHEMICAL_FORMULA: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\b(?:[A-Z][a-z]?\d*)+\b").expect("static regex"));

/// Lower-case, strip punctuation, split on whitespace and keep tokens longer than two characters.
pub fn tokenize(text: &str) -> TokenSet {
  let lowered = text.to_lowercase();
  let cleaned = NON_WORD.replace_all(&lowered, " ");
  cleaned
    .split_whitespace()
    .filter(|t| t.chars().count() > 2)
    .map(str::to_string)
    .collect()
}

/// Replace digit runs with `NUM`, capitalized words with `WORD`, remaining lowercase runs
/// with `word`, then collapse whitespace.
///
/// The passes run in that order: no later pattern can match a marker produced by an
/// earlier one (`NUM` and `WORD` have no lowercase tail, `word` is produced last).
pub fn extract_structure(text: &str) -> String {
  let s = DIGIT_RUN.replace_all(text, "NUM");
  let s = CAPITALIZED_RUN.replace_all(&s, "WORD");
  let s = LOWERCASE_RUN.replace_all(&s, "word");
  WHITESPACE_RUN.replace_all(&s, " ").trim().to_string()
}

/// Collect domain terms. Vocabulary hits are lower-cased; formula-like tokens keep their case.
pub fn extract_concepts(text: &str) -> ConceptSet {
  let mut concepts = ConceptSet::new();
  concepts.extend(UNITS.captures_iter(text).filter_map(|c| c.get(1)).map(|m| m.as_str().to_lowercase()));
  for re in [&*ACTION_VERBS, &*SCIENTIFIC_NOUNS] {
    concepts.extend(re.find_iter(text).map(|m| m.as_str().to_lowercase()));
  }
  concepts.extend(CHEMICAL_FORMULA.find_iter(text).map(|m| m.as_str().to_string()));
  concepts
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokenize_strips_punctuation_and_short_tokens() {
    let tokens = tokenize("Calculate the pH, of a 0.1 M HCl solution!");
    let expected: TokenSet = ["calculate", "the", "hcl", "solution"]
      .into_iter()
      .map(String::from)
      .collect();
    assert_eq!(tokens, expected);
  }

  #[test]
  fn tokenize_collapses_duplicates_and_ignores_case() {
    let tokens = tokenize("Force FORCE force");
    assert_eq!(tokens.len(), 1);
    assert!(tokens.contains("force"));
  }

  #[test]
  fn tokenize_empty_input() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("a, b; c.").is_empty());
  }

  #[test]
  fn structure_replaces_in_order() {
    assert_eq!(
      extract_structure("Calculate the mass of 12 grams"),
      "WORD word word word NUM word"
    );
  }

  #[test]
  fn structure_keeps_punctuation_and_collapses_whitespace() {
    assert_eq!(extract_structure("  Find   x = 42.  "), "WORD word = NUM.");
  }

  #[test]
  fn structure_does_not_rematch_markers() {
    // "NaCl" is two capitalized runs; the lone "O" after NUM has no lowercase tail.
    assert_eq!(extract_structure("NaCl H2O"), "WORDWORD HNUMO");
  }

  #[test]
  fn concepts_cover_all_vocabularies() {
    let concepts = extract_concepts("Determine the pressure of 2 mol CO2 at 300 K.");
    assert!(concepts.contains("determine"));
    assert!(concepts.contains("pressure"));
    assert!(concepts.contains("mol"));
    assert!(concepts.contains("k"));
    assert!(concepts.contains("CO2"));
  }

  #[test]
  fn concepts_keep_formula_case() {
    let concepts = extract_concepts("Dissolve NaCl in water");
    assert!(concepts.contains("NaCl"));
    assert!(!concepts.contains("nacl"));
  }

  #[test]
  fn units_need_a_quantity_or_space_before_them() {
    let concepts = extract_concepts("State Newton's second law. I'm sure it holds.");
    assert!(!concepts.contains("s"));
    assert!(!concepts.contains("m"));

    let concepts = extract_concepts("The cart moves 3 m in 2s (m/s).");
    assert!(concepts.contains("m"));
    assert!(concepts.contains("s"));
    assert!(concepts.contains("m/s"));
  }

  #[test]
  fn concepts_empty_input() {
    assert!(extract_concepts("").is_empty());
  }
}
