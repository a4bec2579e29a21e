//! Property tests for session invariants

use quickcheck_macros::quickcheck;

use quiztrack::session::{
    migration,
    navigator::{self, Direction},
    recorder::{self, AnswerInput},
    Session,
};

const ROWS: usize = 12;
const LABELS: [&str; 4] = ["A", "B", "C", "D"];

fn input(row: u8, pick: u8) -> AnswerInput {
    let row = row as usize % ROWS;
    AnswerInput::new(row, format!("q{row}"), LABELS[pick as usize % 4], LABELS[row % 4])
}

#[quickcheck]
fn prop_counts_hold_under_changes(ops: Vec<(u8, u8)>) -> bool {
    let mut session = Session::new("d", "s").with_total(ROWS);
    ops.into_iter().all(|(row, pick)| {
        recorder::apply_change(&mut session, input(row, pick));
        session.counts_consistent()
    })
}

#[quickcheck]
fn prop_counts_hold_when_mixing_policies(ops: Vec<(u8, u8, bool)>) -> bool {
    let mut session = Session::new("d", "s").with_total(ROWS);
    for (row, pick, once) in ops {
        if once {
            recorder::apply_once(&mut session, input(row, pick));
        } else {
            recorder::apply_change(&mut session, input(row, pick));
        }
    }
    session.counts_consistent()
        && session.correct_count == session.answers.values().filter(|a| a.is_correct).count()
}

#[quickcheck]
fn prop_record_once_never_overwrites(first: u8, second: u8, row: u8) -> bool {
    let mut session = Session::new("d", "s").with_total(ROWS);
    recorder::apply_once(&mut session, input(row, first));
    let snapshot = session.clone();
    let wrote = recorder::apply_once(&mut session, input(row, second));
    !wrote && session == snapshot
}

#[quickcheck]
fn prop_toggle_is_its_own_inverse(initial: Vec<u8>, row: u8) -> bool {
    let mut session = Session::new("d", "s").with_total(256);
    for r in initial {
        session.bookmarks.toggle(r as usize);
    }
    let before = session.bookmarks.sorted();

    session.bookmarks.toggle(row as usize);
    session.bookmarks.toggle(row as usize);

    session.bookmarks.sorted() == before
}

#[quickcheck]
fn prop_skip_lands_on_unanswered_or_stays(answered: Vec<u8>, current: u8, backward: bool) -> bool {
    let mut session = Session::new("d", "s").with_total(ROWS);
    for row in answered {
        recorder::apply_once(&mut session, input(row, 0));
    }
    let current = current as usize % ROWS;
    let direction = if backward { Direction::Backward } else { Direction::Forward };

    let next = navigator::skip_to_unanswered(&session, current, direction, ROWS);
    if session.answered_count == ROWS {
        next == current
    } else {
        next < ROWS && !session.is_answered(next)
    }
}

#[quickcheck]
fn prop_jump_lands_on_answered(answered: Vec<u8>, current: u8, backward: bool) -> bool {
    let mut session = Session::new("d", "s").with_total(ROWS);
    for row in answered {
        recorder::apply_once(&mut session, input(row, 0));
    }
    let direction = if backward { Direction::Backward } else { Direction::Forward };

    match navigator::jump_to_answered(&session, current as usize % ROWS, direction) {
        Some(row) => session.is_answered(row),
        None => session.answers.is_empty(),
    }
}

#[quickcheck]
fn prop_serialization_round_trip(answers: Vec<(u8, u8)>, marks: Vec<u8>, cursor: u8) -> bool {
    let mut session = Session::new("d", "s").with_total(ROWS);
    for (row, pick) in answers {
        recorder::apply_change(&mut session, input(row, pick).tagged("Chair"));
    }
    for mark in marks {
        session.bookmarks.toggle(mark as usize % ROWS);
    }
    session.current_row = cursor as usize % ROWS;

    let json = serde_json::to_string(&session).unwrap();
    migration::from_json(&json).map(|restored| restored == session).unwrap_or(false)
}
