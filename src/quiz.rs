//! Session lifecycle driven by a quiz front end
//!
//! `QuizSession` is what a UI adapter calls: it binds sessions to a row
//! source, moves the cursor, records answers and bookmarks, and handles
//! starting, finishing and resuming attempts. The live `Session` value is
//! always owned by the caller; every mutating call persists it before
//! returning.

use std::path::PathBuf;

use crate::errors::{QuizError, Result};
use crate::session::navigator::{self, Direction};
use crate::session::recorder::{self, AnswerInput, RecordOutcome};
use crate::session::{bookmarks, Session, SessionStats, SessionStore};

/// Number of archived ids offered when a lookup misses
const RESUME_HINT_LIMIT: usize = 5;

/// One row as provided by the external dataset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub question: String,
    pub choices: Vec<String>,
    pub correct_answer: String,
    /// Grouping tag, empty when the dataset has none
    pub tag: String,
}

/// External source of quiz rows
pub trait RowSource {
    fn row_count(&self) -> usize;
    fn get_row(&self, index: usize) -> Result<Row>;
}

/// In-memory row source
impl RowSource for Vec<Row> {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn get_row(&self, index: usize) -> Result<Row> {
        self.get(index).cloned().ok_or_else(|| {
            QuizError::RowSourceError(format!("row {index} out of range (0..{})", self.len()))
        })
    }
}

/// Result of finishing an attempt
#[derive(Debug, Clone)]
pub struct Finished {
    pub stats: SessionStats,
    /// Archive location, when anything was answered
    pub archive: Option<PathBuf>,
}

/// Lifecycle operations over a session store
pub struct QuizSession<'a> {
    store: &'a SessionStore,
}

/// Refresh the row count, pulling the cursor and bookmarks back into range
fn bind_total(session: &mut Session, total: usize) {
    session.total_questions = total;
    session.current_row = navigator::clamp_row(session.current_row as i64, total);
    let dropped = session.bookmarks.retain_below(total);
    if dropped > 0 {
        tracing::info!(id = %session.id, dropped, total, "dropped bookmarks past the last row");
    }
}

impl<'a> QuizSession<'a> {
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SessionStore {
        self.store
    }

    /// Resume the live session if it is bound to this dataset split,
    /// otherwise start a fresh one.
    pub fn open(&self, dataset: &str, split_subset: &str, total: usize) -> Result<Session> {
        let mut session = match self.store.load_current() {
            Some(existing) if existing.is_bound_to(dataset, split_subset) => existing,
            Some(existing) => {
                tracing::info!(
                    previous_dataset = %existing.dataset,
                    previous_split = %existing.split_subset,
                    dataset,
                    split_subset,
                    "live session bound elsewhere, starting fresh"
                );
                Session::new(dataset, split_subset)
            }
            None => Session::new(dataset, split_subset),
        };

        bind_total(&mut session, total);
        self.store.save_current(&mut session)?;
        Ok(session)
    }

    /// Move the cursor to a row, clamped into range
    pub fn goto(&self, session: &mut Session, row: i64) -> Result<usize> {
        session.current_row = navigator::clamp_row(row, session.total_questions);
        self.store.save_current(session)?;
        Ok(session.current_row)
    }

    /// Move the cursor to the next unanswered row in `direction`
    pub fn step_unanswered(&self, session: &mut Session, direction: Direction) -> Result<usize> {
        let next = navigator::skip_to_unanswered(
            session,
            session.current_row,
            direction,
            session.total_questions,
        );
        self.move_cursor(session, next)
    }

    /// Move the cursor to the next answered row in `direction`,
    /// staying put when nothing is answered
    pub fn step_answered(&self, session: &mut Session, direction: Direction) -> Result<usize> {
        let next = navigator::jump_to_answered(session, session.current_row, direction)
            .unwrap_or(session.current_row);
        self.move_cursor(session, next)
    }

    fn move_cursor(&self, session: &mut Session, row: usize) -> Result<usize> {
        session.current_row = row;
        self.store.save_current(session)?;
        Ok(row)
    }

    /// Record (or change) the evaluator's answer for a row
    pub fn answer(
        &self,
        session: &mut Session,
        source: &dyn RowSource,
        row: usize,
        user_answer: &str,
    ) -> Result<RecordOutcome> {
        let data = source.get_row(row)?;
        let input = AnswerInput::new(row, data.question, user_answer.trim(), data.correct_answer.trim())
            .tagged(data.tag);
        recorder::record_with_change(self.store, session, input)
    }

    /// Flip the bookmark on a row
    pub fn toggle_bookmark(&self, session: &mut Session, row: usize) -> Result<bool> {
        bookmarks::toggle(self.store, session, row)
    }

    /// Archive the current attempt if it has answers, then start and save a new one
    pub fn start_new(
        &self,
        current: Option<&Session>,
        dataset: &str,
        split_subset: &str,
        total: usize,
    ) -> Result<Session> {
        if let Some(current) = current.filter(|s| s.answered_count > 0) {
            let path = self.store.archive(current)?;
            tracing::info!(id = %current.id, path = %path.display(), "archived session");
        }

        let mut session = Session::new(dataset, split_subset).with_total(total);
        self.store.save_current(&mut session)?;
        Ok(session)
    }

    /// Final statistics, archiving the attempt when anything was answered
    pub fn finish(&self, session: &Session) -> Result<Finished> {
        let stats = SessionStats::from_session(session);
        let archive = if stats.answered > 0 {
            Some(self.store.archive(session)?)
        } else {
            None
        };

        Ok(Finished { stats, archive })
    }

    /// Make an archived session the live one again
    pub fn resume(&self, query: &str, total: usize) -> Result<Session> {
        let Some(mut session) = self.store.find_by_id(query) else {
            return Err(QuizError::SessionNotFound {
                query: query.trim().to_string(),
                known: self.store.recent_ids(RESUME_HINT_LIMIT),
            });
        };

        session.archived_at = None;
        bind_total(&mut session, total);
        self.store.save_current(&mut session)?;
        Ok(session)
    }
}
