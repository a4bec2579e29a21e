// Session state model: one evaluation attempt over a bound dataset split
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::session::migration::SCHEMA_VERSION;

/// One evaluator response to one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Prompt text shown when the answer was given
    pub question: String,
    /// Choice label picked by the evaluator
    pub user_answer: String,
    /// Expected choice label
    pub correct_answer: String,
    /// Whether the answer matched at recording time
    pub is_correct: bool,
    /// Grouping tag for reports, empty when untagged
    #[serde(default)]
    pub query_object: String,
    /// Time of the last recording
    pub timestamp: DateTime<Utc>,
}

impl AnswerRecord {
    /// Create a record, deriving correctness from the two labels
    pub fn new(
        question: impl Into<String>,
        user_answer: impl Into<String>,
        correct_answer: impl Into<String>,
        query_object: impl Into<String>,
    ) -> Self {
        let user_answer = user_answer.into();
        let correct_answer = correct_answer.into();
        let is_correct = user_answer.trim() == correct_answer.trim();

        Self {
            question: question.into(),
            user_answer,
            correct_answer,
            is_correct,
            query_object: query_object.into(),
            timestamp: Utc::now(),
        }
    }

    /// Tag used for grouped reporting
    pub fn tag(&self) -> &str {
        if self.query_object.is_empty() {
            "unknown"
        } else {
            &self.query_object
        }
    }
}

/// Insertion-ordered set of bookmarked row indices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<usize>", into = "Vec<usize>")]
pub struct BookmarkSet {
    rows: Vec<usize>,
}

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    /// Returns false if the row was already present
    pub fn insert(&mut self, row: usize) -> bool {
        if self.contains(row) {
            return false;
        }
        self.rows.push(row);
        true
    }

    /// Returns false if the row was not present
    pub fn remove(&mut self, row: usize) -> bool {
        let before = self.rows.len();
        self.rows.retain(|&r| r != row);
        before != self.rows.len()
    }

    /// Flip membership, returning whether the row is now bookmarked
    pub fn toggle(&mut self, row: usize) -> bool {
        if self.remove(row) {
            false
        } else {
            self.rows.push(row);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in the order they were bookmarked
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }

    pub fn sorted(&self) -> Vec<usize> {
        let mut rows = self.rows.clone();
        rows.sort_unstable();
        rows
    }

    /// Drop rows at or past `total`, returning how many were removed
    pub fn retain_below(&mut self, total: usize) -> usize {
        let before = self.rows.len();
        self.rows.retain(|&r| r < total);
        before - self.rows.len()
    }
}

impl From<Vec<usize>> for BookmarkSet {
    fn from(rows: Vec<usize>) -> Self {
        let mut set = BookmarkSet::new();
        for row in rows {
            if !set.insert(row) {
                tracing::debug!(row, "dropping duplicate bookmark");
            }
        }
        set
    }
}

impl From<BookmarkSet> for Vec<usize> {
    fn from(set: BookmarkSet) -> Self {
        set.rows
    }
}

impl FromIterator<usize> for BookmarkSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        BookmarkSet::from(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Persisted state of one evaluation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Document schema version
    pub schema_version: u32,
    /// Time-derived identifier, `YYYYMMDD_HHMMSS`
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every save
    pub updated_at: DateTime<Utc>,
    /// Set on archived copies only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    /// Bound row source
    pub dataset: String,
    pub split_subset: String,
    /// Row count of the bound source
    pub total_questions: usize,
    pub answered_count: usize,
    pub correct_count: usize,
    pub incorrect_count: usize,
    /// Row index -> answer
    pub answers: BTreeMap<usize, AnswerRecord>,
    pub bookmarks: BookmarkSet,
    /// Row index last displayed
    pub current_row: usize,
}

impl Session {
    /// Create an empty session bound to a dataset split
    pub fn new(dataset: impl Into<String>, split_subset: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            schema_version: SCHEMA_VERSION,
            id: Local::now().format("%Y%m%d_%H%M%S").to_string(),
            created_at: now,
            updated_at: now,
            archived_at: None,
            dataset: dataset.into(),
            split_subset: split_subset.into(),
            total_questions: 0,
            answered_count: 0,
            correct_count: 0,
            incorrect_count: 0,
            answers: BTreeMap::new(),
            bookmarks: BookmarkSet::new(),
            current_row: 0,
        }
    }

    /// Set the row count of the bound source
    pub fn with_total(mut self, total_questions: usize) -> Self {
        self.total_questions = total_questions;
        self
    }

    /// Check whether this session is bound to the given source
    pub fn is_bound_to(&self, dataset: &str, split_subset: &str) -> bool {
        self.dataset == dataset && self.split_subset == split_subset
    }

    pub fn is_answered(&self, row: usize) -> bool {
        self.answers.contains_key(&row)
    }

    pub fn answer(&self, row: usize) -> Option<&AnswerRecord> {
        self.answers.get(&row)
    }

    pub fn is_bookmarked(&self, row: usize) -> bool {
        self.bookmarks.contains(row)
    }

    pub fn has_answers(&self) -> bool {
        !self.answers.is_empty()
    }

    /// Answered row indices in ascending order
    pub fn answered_rows(&self) -> Vec<usize> {
        self.answers.keys().copied().collect()
    }

    /// Check `answered == correct + incorrect == |answers|` and that
    /// `correct` matches the answers flagged correct
    pub fn counts_consistent(&self) -> bool {
        let correct = self.answers.values().filter(|a| a.is_correct).count();
        self.answered_count == self.answers.len()
            && self.correct_count == correct
            && self.correct_count + self.incorrect_count == self.answered_count
    }

    /// Recompute the counts if they drifted from the answers.
    /// Returns whether anything was repaired.
    pub fn repair_counts(&mut self) -> bool {
        if self.counts_consistent() {
            return false;
        }
        tracing::warn!(
            id = %self.id,
            answered = self.answered_count,
            correct = self.correct_count,
            incorrect = self.incorrect_count,
            answers = self.answers.len(),
            "stored counts disagree with answers, recomputing"
        );
        self.reconcile_counts();
        true
    }

    /// Recompute all aggregate counts from the stored answers
    pub fn reconcile_counts(&mut self) {
        let correct = self.answers.values().filter(|a| a.is_correct).count();
        self.answered_count = self.answers.len();
        self.correct_count = correct;
        self.incorrect_count = self.answered_count - correct;
    }
}
