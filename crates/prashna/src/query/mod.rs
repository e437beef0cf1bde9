//! Query pipeline stages: normalization, classification, complexity
//! scoring, decomposition, rewriting and sub-question answering.

pub mod answerer;
pub mod complexity;
pub mod decomposer;
pub mod processor;
pub mod rewriter;

pub use answerer::{combine_answers, IntervalGate, SubQuestionAnswerer, NO_ANSWER_SENTINEL};
pub use complexity::{is_complex, score_complexity, DEFAULT_COMPLEXITY_THRESHOLD};
pub use decomposer::Decomposer;
pub use processor::{classify, extract_keywords, sanitize, QueryType, MAX_QUERY_CHARS};
pub use rewriter::Rewriter;
