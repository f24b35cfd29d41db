//! JSON-lines protocol for the `labq` driver (serde ready).
//! One request object per input line, one response object per output line.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Answer, BalanceReport, DifficultyAssessment, DifficultyDistribution, DifficultyRatios, PlagiarismFinding,
    QuestionSetReport, SimilarMatch, SimilarityBreakdown, UniquenessReport,
};

/// Requests a client can send.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
    Similarity {
        a: String,
        b: String,
    },
    Uniqueness {
        candidate: String,
        corpus: Vec<String>,
    },
    FindSimilar {
        candidate: String,
        corpus: Vec<String>,
        #[serde(default = "default_find_threshold")]
        threshold: f64,
    },
    ValidateQuestionSet {
        questions: Vec<String>,
    },
    IdentifyPlagiarism {
        answers: Vec<Answer>,
    },
    AnalyzeDifficulty {
        text: String,
        subject: String,
        #[serde(default, rename = "targetDifficulty")]
        target_difficulty: Option<f64>,
    },
    DifficultyDistribution {
        scores: Vec<f64>,
    },
    DifficultyBalance {
        scores: Vec<f64>,
        #[serde(default)]
        target: Option<DifficultyRatios>,
    },
}

fn default_find_threshold() -> f64 {
    crate::similarity::SIMILARITY_THRESHOLD
}

/// Responses the driver writes back.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Pong,
    Similarity {
        score: f64,
        breakdown: SimilarityBreakdown,
    },
    Uniqueness {
        #[serde(flatten)]
        report: UniquenessReport,
    },
    SimilarQuestions {
        matches: Vec<SimilarMatch>,
    },
    QuestionSet {
        #[serde(flatten)]
        report: QuestionSetReport,
    },
    Plagiarism {
        findings: Vec<PlagiarismFinding>,
    },
    Difficulty {
        #[serde(flatten)]
        assessment: DifficultyAssessment,
    },
    Distribution {
        #[serde(flatten)]
        distribution: DifficultyDistribution,
    },
    Balance {
        #[serde(flatten)]
        report: BalanceReport,
    },
    Error {
        message: String,
    },
}
