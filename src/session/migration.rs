// Session schema migration, applied once when a document is read from disk
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::{QuizError, Result};
use crate::session::model::{AnswerRecord, BookmarkSet, Session};

/// Current on-disk schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Version 0 document: written before `schema_version` existed.
/// Any field may be missing and timestamps are naive ISO strings.
#[derive(Debug, Deserialize)]
struct LegacySession {
    id: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
    archived_at: Option<String>,
    #[serde(default)]
    dataset: String,
    #[serde(default)]
    split_subset: String,
    #[serde(default)]
    total_questions: usize,
    answered_count: Option<usize>,
    correct_count: Option<usize>,
    incorrect_count: Option<usize>,
    #[serde(default)]
    answers: BTreeMap<String, LegacyAnswer>,
    #[serde(default)]
    bookmarks: Vec<usize>,
    #[serde(default)]
    current_row: usize,
}

#[derive(Debug, Deserialize)]
struct LegacyAnswer {
    #[serde(default)]
    question: String,
    #[serde(default)]
    user_answer: String,
    #[serde(default)]
    correct_answer: String,
    #[serde(default)]
    is_correct: bool,
    query_object: Option<String>,
    timestamp: Option<String>,
}

/// Parse an RFC 3339 timestamp, or a naive ISO one interpreted as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn timestamp_or_epoch(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(parse_timestamp).unwrap_or_default()
}

impl LegacySession {
    fn upgrade(self) -> Session {
        let mut answers = BTreeMap::new();
        for (key, legacy) in self.answers {
            let Ok(row) = key.trim().parse::<usize>() else {
                tracing::warn!(key = %key, "dropping answer with non-numeric row key");
                continue;
            };
            answers.insert(
                row,
                AnswerRecord {
                    question: legacy.question,
                    user_answer: legacy.user_answer,
                    correct_answer: legacy.correct_answer,
                    is_correct: legacy.is_correct,
                    query_object: legacy.query_object.unwrap_or_default(),
                    timestamp: timestamp_or_epoch(legacy.timestamp.as_deref()),
                },
            );
        }

        let created_at = timestamp_or_epoch(self.created_at.as_deref());
        let id = self
            .id
            .unwrap_or_else(|| created_at.format("%Y%m%d_%H%M%S").to_string());

        let mut session = Session {
            schema_version: SCHEMA_VERSION,
            id,
            created_at,
            updated_at: self
                .updated_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(created_at),
            archived_at: self.archived_at.as_deref().and_then(parse_timestamp),
            dataset: self.dataset,
            split_subset: self.split_subset,
            total_questions: self.total_questions,
            answered_count: 0,
            correct_count: 0,
            incorrect_count: 0,
            answers,
            bookmarks: BookmarkSet::from(self.bookmarks),
            current_row: self.current_row,
        };

        match (self.answered_count, self.correct_count, self.incorrect_count) {
            (Some(answered), Some(correct), Some(incorrect)) => {
                session.answered_count = answered;
                session.correct_count = correct;
                session.incorrect_count = incorrect;
                session.repair_counts();
            }
            _ => {
                tracing::debug!(id = %session.id, "deriving missing counts from answers");
                session.reconcile_counts();
            }
        }

        session
    }
}

/// Bring any supported session document up to the current schema
pub fn migrate(value: Value) -> Result<Session> {
    let version = value
        .get("schema_version")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    match version {
        0 => {
            let legacy: LegacySession = serde_json::from_value(value)?;
            Ok(legacy.upgrade())
        }
        v if v == u64::from(SCHEMA_VERSION) => {
            let mut session: Session = serde_json::from_value(value)?;
            session.repair_counts();
            Ok(session)
        }
        found => Err(QuizError::MigrationError {
            found,
            supported: u64::from(SCHEMA_VERSION),
        }),
    }
}

/// Decode and migrate a session document from JSON text
pub fn from_json(text: &str) -> Result<Session> {
    let value: Value = serde_json::from_str(text)?;
    migrate(value)
}
