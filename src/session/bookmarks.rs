// Bookmark toggling
use crate::errors::Result;
use crate::session::model::Session;
use crate::session::navigator;
use crate::session::persistence::SessionStore;

/// Flip the bookmark on `row` and persist.
/// Rows past the end are clamped to the last row; a session with no rows
/// stores nothing. Returns whether the row is bookmarked afterwards.
pub fn toggle(store: &SessionStore, session: &mut Session, row: usize) -> Result<bool> {
    if session.total_questions == 0 {
        tracing::debug!(row, "no rows to bookmark");
        return Ok(false);
    }

    let requested = i64::try_from(row).unwrap_or(i64::MAX);
    let target = navigator::clamp_row(requested, session.total_questions);
    if target != row {
        tracing::debug!(row, clamped = target, "bookmark row out of range");
    }

    let bookmarked = session.bookmarks.toggle(target);
    tracing::debug!(row = target, bookmarked, "toggled bookmark");
    store.save_current(session)?;
    Ok(bookmarked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_toggle_adds_then_removes() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::at(temp.path()).unwrap();
        let mut session = Session::new("d", "s").with_total(10);

        assert!(toggle(&store, &mut session, 4).unwrap());
        assert!(store.load_current().unwrap().is_bookmarked(4));

        assert!(!toggle(&store, &mut session, 4).unwrap());
        assert!(!store.load_current().unwrap().is_bookmarked(4));
    }

    #[test]
    fn test_toggle_out_of_range_clamps_to_last_row() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::at(temp.path()).unwrap();
        let mut session = Session::new("d", "s").with_total(5);

        assert!(toggle(&store, &mut session, 99).unwrap());
        assert_eq!(session.bookmarks.sorted(), vec![4]);
        assert!(store.load_current().unwrap().bookmarks.iter().all(|r| r < 5));
    }

    #[test]
    fn test_toggle_without_rows_stores_nothing() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::at(temp.path()).unwrap();
        let mut session = Session::new("d", "s");

        assert!(!toggle(&store, &mut session, 0).unwrap());
        assert!(session.bookmarks.is_empty());
        assert!(store.load_current().is_none());
    }

    #[test]
    fn test_toggle_twice_restores_set() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::at(temp.path()).unwrap();
        let mut session = Session::new("d", "s").with_total(10);
        session.bookmarks.insert(1);
        session.bookmarks.insert(7);
        let original = session.bookmarks.sorted();

        toggle(&store, &mut session, 3).unwrap();
        toggle(&store, &mut session, 3).unwrap();
        toggle(&store, &mut session, 7).unwrap();
        toggle(&store, &mut session, 7).unwrap();

        assert_eq!(session.bookmarks.sorted(), original);
        assert_eq!(session.bookmarks.len(), 2);
    }
}
