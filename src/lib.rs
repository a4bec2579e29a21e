//! quiztrack - Quiz Evaluation Session Tracking
//!
//! Tracks a human evaluator's progress through quiz-style dataset rows:
//! answers and their correctness, bookmarks, the cursor, and archived
//! attempts that can be resumed or reported on later.
//!
//! # Architecture
//!
//! - **session**: state model, persistence, recording, navigation, statistics
//! - **quiz**: lifecycle controller a front end drives
//! - **report**: read-only console reports
//! - **cli**: arguments and configuration for the reporting binary

pub mod errors;
pub mod session;
pub mod quiz;
pub mod report;
pub mod cli;

// Re-export commonly used types
pub use errors::{QuizError, Result};
pub use quiz::{QuizSession, Row, RowSource};
pub use session::{Direction, Session, SessionStats, SessionStore};
