//! Evaluation
//!
//! Retrieval-quality metrics over a question/answer evaluation set.

pub mod retrieval;

pub use retrieval::{
    evaluate_retrieval, load_eval_set, sweep, EvalSample, GridPoint, RetrievalReport,
};
