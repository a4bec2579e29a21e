// Read-only statistics derived from a session
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use crate::errors::Result;
use crate::session::model::{AnswerRecord, Session};

/// Display statistics for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub correct: usize,
    pub incorrect: usize,
    /// Percent of answered rows that were correct
    pub accuracy: f64,
    /// Percent of rows answered
    pub progress: f64,
    pub bookmarks: usize,
}

impl SessionStats {
    pub fn from_session(session: &Session) -> Self {
        let total = session.total_questions;
        let answered = session.answered_count;
        let correct = session.correct_count;

        Self {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            correct,
            incorrect: session.incorrect_count,
            accuracy: percent(correct, answered),
            progress: percent(answered, total),
            bookmarks: session.bookmarks.len(),
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

/// Correct/incorrect counts for one tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStats {
    pub tag: String,
    pub correct: usize,
    pub incorrect: usize,
}

impl TagStats {
    pub fn accuracy(&self) -> f64 {
        percent(self.correct, self.correct + self.incorrect)
    }
}

/// Per-tag breakdown, most incorrect first
pub fn tag_breakdown(session: &Session) -> Vec<TagStats> {
    let mut by_tag: BTreeMap<&str, TagStats> = BTreeMap::new();

    for record in session.answers.values() {
        let stats = by_tag.entry(record.tag()).or_insert_with(|| TagStats {
            tag: record.tag().to_string(),
            correct: 0,
            incorrect: 0,
        });
        if record.is_correct {
            stats.correct += 1;
        } else {
            stats.incorrect += 1;
        }
    }

    let mut tags: Vec<TagStats> = by_tag.into_values().collect();
    tags.sort_by(|a, b| b.incorrect.cmp(&a.incorrect).then_with(|| a.tag.cmp(&b.tag)));
    tags
}

/// Whether any answer carries a tag
pub fn has_tags(session: &Session) -> bool {
    session.answers.values().any(|a| !a.query_object.is_empty())
}

/// Incorrect answers grouped by tag, rows ascending within each tag
pub fn incorrect_by_tag(session: &Session) -> BTreeMap<String, Vec<(usize, &AnswerRecord)>> {
    let mut groups: BTreeMap<String, Vec<(usize, &AnswerRecord)>> = BTreeMap::new();
    for (&row, record) in session.answers.iter().filter(|(_, a)| !a.is_correct) {
        groups.entry(record.tag().to_string()).or_default().push((row, record));
    }
    groups
}

/// Row indices whose answers match `is_correct`, ascending
pub fn rows_where(session: &Session, is_correct: bool) -> Vec<usize> {
    session
        .answers
        .iter()
        .filter(|(_, a)| a.is_correct == is_correct)
        .map(|(&row, _)| row)
        .collect()
}

/// Answer and bookmark state of a single row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowStatus {
    /// `Some(correct)` once answered
    pub answered: Option<bool>,
    pub bookmarked: bool,
}

pub fn row_status(session: &Session, row: usize) -> RowStatus {
    RowStatus {
        answered: session.answer(row).map(|a| a.is_correct),
        bookmarked: session.is_bookmarked(row),
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut marks = Vec::new();
        match self.answered {
            Some(true) => marks.push("✓"),
            Some(false) => marks.push("✗"),
            None => {}
        }
        if self.bookmarked {
            marks.push("🔖");
        }
        write!(f, "{}", marks.join(" "))
    }
}

/// Text progress bar, e.g. `[██████░░░░] 3/5 (60.0%)`
pub fn progress_bar(stats: &SessionStats, width: usize) -> String {
    let filled = ((width as f64 * stats.progress / 100.0) as usize).min(width);
    format!(
        "[{}{}] {}/{} ({:.1}%)",
        "█".repeat(filled),
        "░".repeat(width - filled),
        stats.answered,
        stats.total,
        stats.progress
    )
}

/// CSV header of the answer export
pub const EXPORT_HEADER: [&str; 7] = [
    "row_idx",
    "question",
    "user_answer",
    "correct_answer",
    "is_correct",
    "query_object",
    "timestamp",
];

/// Write all answers as CSV, one row per answered index in ascending order
pub fn export_csv<W: Write>(session: &Session, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(EXPORT_HEADER)?;

    for (row, record) in &session.answers {
        csv.write_record([
            row.to_string().as_str(),
            record.question.as_str(),
            record.user_answer.as_str(),
            record.correct_answer.as_str(),
            if record.is_correct { "True" } else { "False" },
            record.query_object.as_str(),
            record.timestamp.to_rfc3339().as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_session() -> Session {
        let mut session = Session::new("d", "s").with_total(8);
        let rows = [
            (0, "A", "A", "Mug"),
            (1, "B", "A", "Mug"),
            (2, "C", "A", "Lamp"),
            (5, "D", "A", "Mug"),
            (6, "A", "A", ""),
        ];
        for (row, user, correct, tag) in rows {
            session
                .answers
                .insert(row, AnswerRecord::new(format!("q{row}"), user, correct, tag));
        }
        session.reconcile_counts();
        session.bookmarks.insert(5);
        session.bookmarks.insert(7);
        session
    }

    #[test]
    fn test_stats_from_session() {
        let stats = SessionStats::from_session(&create_test_session());
        assert_eq!(stats.total, 8);
        assert_eq!(stats.answered, 5);
        assert_eq!(stats.remaining, 3);
        assert_eq!(stats.correct, 2);
        assert_eq!(stats.incorrect, 3);
        assert_eq!(stats.accuracy, 40.0);
        assert_eq!(stats.progress, 62.5);
        assert_eq!(stats.bookmarks, 2);
    }

    #[test]
    fn test_stats_empty_session() {
        let stats = SessionStats::from_session(&Session::new("d", "s"));
        assert_eq!(stats.accuracy, 0.0);
        assert_eq!(stats.progress, 0.0);
        assert_eq!(stats.remaining, 0);
    }

    #[test]
    fn test_tag_breakdown_sorted_by_incorrect() {
        let tags = tag_breakdown(&create_test_session());
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].tag, "Mug");
        assert_eq!(tags[0].incorrect, 2);
        assert_eq!(tags[0].correct, 1);
        assert_eq!(tags[1].tag, "Lamp");
        assert_eq!(tags[2].tag, "unknown");
        assert_eq!(tags[2].accuracy(), 100.0);
    }

    #[test]
    fn test_incorrect_by_tag() {
        let session = create_test_session();
        let groups = incorrect_by_tag(&session);
        let mug: Vec<usize> = groups["Mug"].iter().map(|(row, _)| *row).collect();
        assert_eq!(mug, vec![1, 5]);
        assert_eq!(groups["Lamp"].len(), 1);
        assert!(!groups.contains_key("unknown"));
    }

    #[test]
    fn test_rows_where() {
        let session = create_test_session();
        assert_eq!(rows_where(&session, true), vec![0, 6]);
        assert_eq!(rows_where(&session, false), vec![1, 2, 5]);
    }

    #[test]
    fn test_row_status_display() {
        let session = create_test_session();
        assert_eq!(row_status(&session, 0).to_string(), "✓");
        assert_eq!(row_status(&session, 5).to_string(), "✗ 🔖");
        assert_eq!(row_status(&session, 7).to_string(), "🔖");
        assert_eq!(row_status(&session, 3).to_string(), "");
    }

    #[test]
    fn test_progress_bar() {
        let stats = SessionStats::from_session(&create_test_session());
        let bar = progress_bar(&stats, 8);
        assert_eq!(bar, "[█████░░░] 5/8 (62.5%)");
    }

    #[test]
    fn test_export_csv_escapes_question() {
        let mut session = Session::new("d", "s").with_total(3);
        session.answers.insert(
            2,
            AnswerRecord::new("Is the \"red\" mug, or the cup, closer?", "B", "A", "Mug"),
        );
        session.answers.insert(0, AnswerRecord::new("plain", "A", "A", ""));
        session.reconcile_counts();

        let mut out = Vec::new();
        export_csv(&session, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], EXPORT_HEADER.join(","));
        assert!(lines[1].starts_with("0,plain,A,A,True,,"));
        assert!(lines[2].starts_with("2,\"Is the \"\"red\"\" mug, or the cup, closer?\",B,A,False,Mug,"));

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][1], "Is the \"red\" mug, or the cup, closer?");
    }
}
