//! Engine state: configuration, the optional OpenAI oracle, and the three analyzers.
//!
//! This module owns:
//!   - the loaded `EngineConfig` (or defaults)
//!   - the similarity engine (semantic oracle + concept-overlap fallback)
//!   - the duplicate/plagiarism detector built on it
//!   - the difficulty analyzer (difficulty oracle + configured fallback)
//!
//! Without OPENAI_API_KEY every analyzer runs on local heuristics only.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::{load_engine_config_from_env, EngineConfig};
use crate::detector::DuplicateDetector;
use crate::difficulty::DifficultyAnalyzer;
use crate::oracle::{DifficultyOracle, SemanticOracle};
use crate::openai::OpenAI;
use crate::similarity::SimilarityEngine;

#[derive(Clone)]
pub struct Engine {
    pub config: EngineConfig,
    pub similarity: SimilarityEngine,
    pub detector: DuplicateDetector,
    pub difficulty: DifficultyAnalyzer,
}

impl Engine {
    /// Wire the analyzers around the given oracles.
    pub fn new(
        config: EngineConfig,
        semantic: Option<Arc<dyn SemanticOracle>>,
        difficulty: Option<Arc<dyn DifficultyOracle>>,
    ) -> Self {
        let similarity = SimilarityEngine::new(semantic, config.oracle.concurrency_limit());
        let detector = DuplicateDetector::new(similarity.clone());
        let difficulty = DifficultyAnalyzer::new(difficulty, config.difficulty.fallback);
        Self { config, similarity, detector, difficulty }
    }

    /// Engine with no remote oracles.
    pub fn local(config: EngineConfig) -> Self {
        Self::new(config, None, None)
    }

    /// Build from env: load config, init OpenAI if a key is present.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let config = load_engine_config_from_env().unwrap_or_default();

        let openai = OpenAI::from_env(&config.prompts, &config.oracle).map(Arc::new);
        match &openai {
            Some(oa) => {
                info!(target: "labq_engine", base_url = %oa.base_url, model = %oa.model, concurrency = config.oracle.concurrency_limit(), "OpenAI oracles enabled.");
            }
            None => {
                info!(target: "labq_engine", "OpenAI disabled (no OPENAI_API_KEY). Using local heuristics.");
            }
        }

        let semantic = openai.clone().map(|oa| oa as Arc<dyn SemanticOracle>);
        let difficulty = openai.map(|oa| oa as Arc<dyn DifficultyOracle>);
        Self::new(config, semantic, difficulty)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::local(EngineConfig::default())
    }
}
