//! Row navigation over a session
//!
//! Two traversal domains share the index space `[0, total)`:
//! stepping to the next unanswered row with wraparound, and jumping
//! between answered rows in sorted order. Both are pure; moving the
//! cursor and persisting it is the caller's job.

use crate::session::model::Session;

/// Traversal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Interpret a signed step; negative means backward
    pub fn from_step(step: i64) -> Self {
        if step < 0 {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }

    fn advance(self, idx: usize, total: usize) -> usize {
        match self {
            Direction::Forward => (idx + 1) % total,
            Direction::Backward => (idx + total - 1) % total,
        }
    }
}

/// First unanswered row after `current` in `direction`, wrapping around.
/// Returns `current` when every row is answered.
pub fn skip_to_unanswered(session: &Session, current: usize, direction: Direction, total: usize) -> usize {
    if total == 0 {
        return current;
    }

    let mut idx = current % total;
    for _ in 0..total {
        idx = direction.advance(idx, total);
        if !session.is_answered(idx) {
            return idx;
        }
    }

    current
}

/// Nearest answered row strictly past `current`, wrapping to the other end.
/// `None` when nothing has been answered.
pub fn jump_to_answered(session: &Session, current: usize, direction: Direction) -> Option<usize> {
    let answered = session.answered_rows();

    match direction {
        Direction::Forward => answered
            .iter()
            .copied()
            .find(|&idx| idx > current)
            .or_else(|| answered.first().copied()),
        Direction::Backward => answered
            .iter()
            .rev()
            .copied()
            .find(|&idx| idx < current)
            .or_else(|| answered.last().copied()),
    }
}

/// Clamp a requested row into `[0, total - 1]`
pub fn clamp_row(index: i64, total: usize) -> usize {
    if total == 0 || index <= 0 {
        return 0;
    }
    usize::try_from(index).map_or(total - 1, |idx| idx.min(total - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::AnswerRecord;

    fn session_with_answers(total: usize, rows: &[usize]) -> Session {
        let mut session = Session::new("d", "s").with_total(total);
        for &row in rows {
            session.answers.insert(row, AnswerRecord::new("q", "A", "A", ""));
        }
        session.reconcile_counts();
        session
    }

    #[test]
    fn test_skip_wraps_forward() {
        let session = session_with_answers(3, &[0, 2]);
        assert_eq!(skip_to_unanswered(&session, 0, Direction::Forward, 3), 1);
        assert_eq!(skip_to_unanswered(&session, 2, Direction::Forward, 3), 1);
    }

    #[test]
    fn test_skip_wraps_backward() {
        let session = session_with_answers(4, &[0, 1]);
        assert_eq!(skip_to_unanswered(&session, 0, Direction::Backward, 4), 3);
        assert_eq!(skip_to_unanswered(&session, 3, Direction::Backward, 4), 2);
    }

    #[test]
    fn test_skip_all_answered_stays() {
        let session = session_with_answers(3, &[0, 1, 2]);
        assert_eq!(skip_to_unanswered(&session, 1, Direction::Forward, 3), 1);
        assert_eq!(skip_to_unanswered(&session, 1, Direction::Backward, 3), 1);
    }

    #[test]
    fn test_skip_can_return_to_current() {
        let session = session_with_answers(3, &[1, 2]);
        assert_eq!(skip_to_unanswered(&session, 0, Direction::Forward, 3), 0);
    }

    #[test]
    fn test_skip_empty_source() {
        let session = session_with_answers(0, &[]);
        assert_eq!(skip_to_unanswered(&session, 7, Direction::Forward, 0), 7);
    }

    #[test]
    fn test_jump_forward_and_wrap() {
        let session = session_with_answers(6, &[0, 2, 4]);
        assert_eq!(jump_to_answered(&session, 3, Direction::Forward), Some(4));
        assert_eq!(jump_to_answered(&session, 4, Direction::Forward), Some(0));
    }

    #[test]
    fn test_jump_backward_and_wrap() {
        let session = session_with_answers(6, &[0, 2, 4]);
        assert_eq!(jump_to_answered(&session, 0, Direction::Backward), Some(4));
        assert_eq!(jump_to_answered(&session, 3, Direction::Backward), Some(2));
    }

    #[test]
    fn test_jump_none_answered() {
        let session = session_with_answers(6, &[]);
        assert_eq!(jump_to_answered(&session, 3, Direction::Forward), None);
        assert_eq!(jump_to_answered(&session, 3, Direction::Backward), None);
    }

    #[test]
    fn test_direction_from_step() {
        assert_eq!(Direction::from_step(1), Direction::Forward);
        assert_eq!(Direction::from_step(-1), Direction::Backward);
    }

    #[test]
    fn test_clamp_row() {
        assert_eq!(clamp_row(-4, 10), 0);
        assert_eq!(clamp_row(5, 10), 5);
        assert_eq!(clamp_row(42, 10), 9);
        assert_eq!(clamp_row(3, 0), 0);
    }
}
