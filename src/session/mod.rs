// Session state tracking for quiz-style evaluation
//
// Components:
// - Model: Session, AnswerRecord and the bookmark set
// - Migration: upgrades older session documents at load time
// - Persistence: live session slot plus immutable archives
// - Recorder: record-once and record-with-change answer policies
// - Bookmarks / Navigator: cursor-side helpers
// - Statistics: read-only derived numbers and CSV export

pub mod model;
pub mod migration;
pub mod persistence;
pub mod recorder;
pub mod bookmarks;
pub mod navigator;
pub mod statistics;

// Re-export key types
pub use model::{AnswerRecord, BookmarkSet, Session};
pub use persistence::{ArchiveSummary, PersistenceConfig, SessionStore};
pub use recorder::{AnswerInput, RecordOutcome};
pub use navigator::Direction;
pub use statistics::{SessionStats, TagStats};
