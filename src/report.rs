//! Console reports over stored sessions
//!
//! Everything here renders to a `String` from already-loaded sessions and
//! never touches the store, so the reporting CLI cannot modify state.

use colored::Colorize;
use std::fmt::Write;

use crate::session::statistics::{self, SessionStats};
use crate::session::{ArchiveSummary, Session};

const RULE_WIDE: usize = 70;
const RULE_NARROW: usize = 40;
const DATASET_COLUMN: usize = 33;

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "-".repeat(RULE_NARROW));
    let _ = writeln!(out, "{}", title.bold());
    let _ = writeln!(out, "{}", "-".repeat(RULE_NARROW));
}

fn row_list(rows: &[usize]) -> String {
    let rows: Vec<String> = rows.iter().map(usize::to_string).collect();
    format!("[{}]", rows.join(", "))
}

/// Table of the live session (if any) followed by all archives
pub fn render_listing(current: Option<&Session>, archived: &[ArchiveSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "=".repeat(RULE_WIDE));
    let _ = writeln!(out, "{}", "AVAILABLE SESSIONS".bold());
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDE));

    let count = archived.len() + usize::from(current.is_some());
    if count == 0 {
        let _ = writeln!(out, "No sessions found.");
        return out;
    }

    let _ = writeln!(
        out,
        "\n{:<20} {:<35} {:<12} {:<10} {:<10}",
        "ID", "Dataset", "Answered", "Accuracy", "Bookmarks"
    );
    let _ = writeln!(out, "{}", "-".repeat(90));

    if let Some(session) = current {
        let stats = SessionStats::from_session(session);
        let _ = writeln!(
            out,
            "{:<20} {:<35} {:<12} {:>6.1}%    {:<10}",
            "current",
            truncate(&session.dataset, DATASET_COLUMN),
            format!("{}/{}", stats.answered, stats.total),
            stats.accuracy,
            stats.bookmarks
        );
    }

    for summary in archived {
        let _ = writeln!(
            out,
            "{:<20} {:<35} {:<12} {:>6.1}%    {:<10}",
            summary.id,
            truncate(&summary.dataset, DATASET_COLUMN),
            format!("{}/{}", summary.answered_count, summary.total_questions),
            summary.accuracy(),
            summary.bookmark_count
        );
    }

    let _ = writeln!(out, "{}", "-".repeat(90));
    let _ = writeln!(out, "Total sessions: {count}");
    out
}

/// Full analysis report for one session
pub fn render_report(session: &Session, verbose: bool) -> String {
    let mut out = String::new();
    let stats = SessionStats::from_session(session);

    let _ = writeln!(out, "\n{}", "=".repeat(RULE_WIDE));
    let _ = writeln!(out, "{}", "SESSION ANALYSIS REPORT".bold());
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDE));

    let _ = writeln!(out, "\nSession ID: {}", session.id);
    let _ = writeln!(out, "Dataset: {}", session.dataset);
    let _ = writeln!(out, "Split/Subset: {}", session.split_subset);
    let _ = writeln!(out, "Created: {}", session.created_at.to_rfc3339());
    let _ = writeln!(out, "Last Updated: {}", session.updated_at.to_rfc3339());
    if let Some(archived_at) = session.archived_at {
        let _ = writeln!(out, "Archived: {}", archived_at.to_rfc3339());
    }

    section(&mut out, "SUMMARY STATISTICS");
    let _ = writeln!(out, "Total Questions: {}", stats.total);
    let _ = writeln!(out, "Answered: {} ({:.1}%)", stats.answered, stats.progress);
    let _ = writeln!(out, "Remaining: {}", stats.remaining);
    let _ = writeln!(out, "Correct: {}", stats.correct.to_string().green());
    let _ = writeln!(out, "Incorrect: {}", stats.incorrect.to_string().red());
    let _ = writeln!(out, "Accuracy: {:.1}%", stats.accuracy);
    let _ = writeln!(out, "Bookmarks: {}", stats.bookmarks);
    let _ = writeln!(out, "Progress: {}", statistics::progress_bar(&stats, 30));

    if session.has_answers() {
        render_answers(&mut out, session, verbose);
    }

    if !session.bookmarks.is_empty() {
        render_bookmarks(&mut out, session);
    }

    let _ = writeln!(out, "\n{}", "=".repeat(RULE_WIDE));
    out
}

fn render_answers(out: &mut String, session: &Session, verbose: bool) {
    section(out, "ANSWER BREAKDOWN");

    let incorrect = statistics::rows_where(session, false);
    if !incorrect.is_empty() {
        let _ = writeln!(
            out,
            "\n{}",
            format!("✗ INCORRECT ANSWERS ({}):", incorrect.len()).red()
        );
        let _ = writeln!(out, "{}", "-".repeat(RULE_NARROW));

        for (tag, rows) in statistics::incorrect_by_tag(session) {
            let _ = writeln!(out, "\n  {tag}:");
            for (row, record) in rows {
                let _ = writeln!(
                    out,
                    "    Row {}: You={}, Correct={}",
                    row + 1,
                    record.user_answer,
                    record.correct_answer
                );
            }
        }

        let _ = writeln!(out, "\n  All incorrect row indices: {}", row_list(&incorrect));
    }

    let correct = statistics::rows_where(session, true);
    if !correct.is_empty() && verbose {
        let _ = writeln!(
            out,
            "\n{}",
            format!("✓ CORRECT ANSWERS ({}):", correct.len()).green()
        );
        let _ = writeln!(out, "  Row indices: {}", row_list(&correct));
    }

    if statistics::has_tags(session) {
        section(out, "ACCURACY BY OBJECT TYPE");
        let _ = writeln!(
            out,
            "\n{:<25} {:<10} {:<10} {:<10}",
            "Object", "Correct", "Incorrect", "Accuracy"
        );
        let _ = writeln!(out, "{}", "-".repeat(55));
        for tag in statistics::tag_breakdown(session) {
            let _ = writeln!(
                out,
                "{:<25} {:<10} {:<10} {:>6.1}%",
                tag.tag,
                tag.correct,
                tag.incorrect,
                tag.accuracy()
            );
        }
    }
}

fn render_bookmarks(out: &mut String, session: &Session) {
    let rows = session.bookmarks.sorted();
    section(out, &format!("BOOKMARKED ROWS ({})", rows.len()));
    let _ = writeln!(out, "Indices: {}", row_list(&rows));

    let _ = writeln!(out, "\nBookmark details:");
    for row in rows {
        let status = statistics::row_status(session, row);
        match session.answer(row) {
            Some(record) => {
                let _ = writeln!(out, "  Row {}: {} {}", row + 1, status, record.query_object);
            }
            None => {
                let _ = writeln!(out, "  Row {}: {} (not answered)", row + 1, status);
            }
        }
    }
}

/// Message shown when a session lookup misses
pub fn render_not_found(query: &str, known: &[String]) -> String {
    if known.is_empty() {
        format!("Session not found: {query}. No archived sessions.")
    } else {
        format!("Session not found: {query}. Available: {}", known.join(", "))
    }
}
