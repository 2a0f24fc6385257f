//! Application services built on storage and the drill algorithms

pub mod drill;
pub mod learning;

pub use drill::{review_exercises, AnswerOutcome, DrillSession, SessionSummary};
pub use learning::{load_learning_path, load_scenarios, save_learning_path, save_scenarios};
