// Answer recording with aggregate count maintenance
use crate::errors::Result;
use crate::session::model::{AnswerRecord, Session};
use crate::session::persistence::SessionStore;

/// One evaluator response, before it becomes an AnswerRecord
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerInput {
    pub row: usize,
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub query_object: String,
}

impl AnswerInput {
    pub fn new(
        row: usize,
        question: impl Into<String>,
        user_answer: impl Into<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            row,
            question: question.into(),
            user_answer: user_answer.into(),
            correct_answer: correct_answer.into(),
            query_object: String::new(),
        }
    }

    /// Attach a grouping tag
    pub fn tagged(mut self, query_object: impl Into<String>) -> Self {
        self.query_object = query_object.into();
        self
    }

    fn into_record(self) -> (usize, AnswerRecord) {
        let record = AnswerRecord::new(
            self.question,
            self.user_answer,
            self.correct_answer,
            self.query_object,
        );
        (self.row, record)
    }
}

/// What `record_with_change` did to the row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First answer for the row
    Added { is_correct: bool },
    /// Existing answer replaced
    Changed {
        previously_correct: bool,
        is_correct: bool,
    },
}

impl RecordOutcome {
    pub fn is_correct(&self) -> bool {
        match self {
            RecordOutcome::Added { is_correct } => *is_correct,
            RecordOutcome::Changed { is_correct, .. } => *is_correct,
        }
    }
}

fn bump(session: &mut Session, is_correct: bool) {
    if is_correct {
        session.correct_count += 1;
    } else {
        session.incorrect_count += 1;
    }
}

fn unbump(session: &mut Session, was_correct: bool) {
    let bucket = if was_correct {
        &mut session.correct_count
    } else {
        &mut session.incorrect_count
    };
    if *bucket == 0 {
        tracing::warn!(
            id = %session.id,
            was_correct,
            "count already zero while replacing an answer, clamping"
        );
    }
    *bucket = bucket.saturating_sub(1);
}

/// Insert the answer unless the row already has one.
/// Returns whether the session changed.
pub fn apply_once(session: &mut Session, input: AnswerInput) -> bool {
    if session.is_answered(input.row) {
        return false;
    }

    let (row, record) = input.into_record();
    let is_correct = record.is_correct;
    session.answers.insert(row, record);
    session.answered_count = session.answers.len();
    bump(session, is_correct);
    session.repair_counts();
    true
}

/// Insert or replace the answer, moving the row between count buckets
pub fn apply_change(session: &mut Session, input: AnswerInput) -> RecordOutcome {
    let (row, record) = input.into_record();
    let is_correct = record.is_correct;

    let previous = session.answers.insert(row, record);
    if let Some(previous) = &previous {
        unbump(session, previous.is_correct);
    }
    bump(session, is_correct);
    session.answered_count = session.answers.len();
    session.repair_counts();

    match previous {
        Some(previous) => RecordOutcome::Changed {
            previously_correct: previous.is_correct,
            is_correct,
        },
        None => RecordOutcome::Added { is_correct },
    }
}

/// Record-once policy: the first answer for a row locks in.
/// Persists only when the session changed.
pub fn record_once(store: &SessionStore, session: &mut Session, input: AnswerInput) -> Result<bool> {
    let row = input.row;
    if !apply_once(session, input) {
        tracing::debug!(row, "row already answered, keeping first answer");
        return Ok(false);
    }

    store.save_current(session)?;
    Ok(true)
}

/// Record-with-change policy: always writes the new answer and persists
pub fn record_with_change(
    store: &SessionStore,
    session: &mut Session,
    input: AnswerInput,
) -> Result<RecordOutcome> {
    let outcome = apply_change(session, input);
    store.save_current(session)?;
    Ok(outcome)
}
