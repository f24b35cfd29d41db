//! Question uniqueness and difficulty scoring for generated STEM lab questions.
//!
//! - `similarity`: lexical + structural + semantic similarity, corpus uniqueness
//! - `detector`: near-duplicate questions and answer plagiarism tiers
//! - `difficulty`: AI/rule blended 1–10 difficulty and difficulty-mix balance
//!
//! Remote oracles are optional; every operation degrades to a local result when they fail.

pub mod config;
pub mod detector;
pub mod difficulty;
pub mod distance;
pub mod domain;
pub mod error;
pub mod features;
pub mod logic;
pub mod openai;
pub mod oracle;
pub mod protocol;
pub mod similarity;
pub mod state;
pub mod telemetry;
pub mod util;

pub use config::EngineConfig;
pub use detector::DuplicateDetector;
pub use difficulty::{difficulty_distribution, validate_difficulty_balance, DifficultyAnalyzer};
pub use error::{EngineError, OracleError};
pub use oracle::{ConceptOverlap, DifficultyOracle, SemanticOracle};
pub use similarity::SimilarityEngine;
pub use state::Engine;
