// Session persistence: the live session slot and immutable archives on disk
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;

use crate::errors::Result;
use crate::session::migration;
use crate::session::model::Session;

const CURRENT_FILE: &str = "current_session.json";
const ARCHIVE_PREFIX: &str = "session_";
const ARCHIVE_SUFFIX: &str = ".json";

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Directory holding the live session and all archives
    pub sessions_dir: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            sessions_dir: PathBuf::from("sessions"),
        }
    }
}

/// One line of the archive listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveSummary {
    pub id: String,
    pub path: PathBuf,
    pub dataset: String,
    pub split_subset: String,
    pub created_at: DateTime<Utc>,
    pub total_questions: usize,
    pub answered_count: usize,
    pub correct_count: usize,
    pub incorrect_count: usize,
    pub bookmark_count: usize,
}

impl ArchiveSummary {
    fn from_session(session: &Session, path: PathBuf) -> Self {
        Self {
            id: session.id.clone(),
            path,
            dataset: session.dataset.clone(),
            split_subset: session.split_subset.clone(),
            created_at: session.created_at,
            total_questions: session.total_questions,
            answered_count: session.answered_count,
            correct_count: session.correct_count,
            incorrect_count: session.incorrect_count,
            bookmark_count: session.bookmarks.len(),
        }
    }

    /// Accuracy in percent over answered rows
    pub fn accuracy(&self) -> f64 {
        if self.answered_count == 0 {
            0.0
        } else {
            self.correct_count as f64 / self.answered_count as f64 * 100.0
        }
    }
}

/// File-backed session store
#[derive(Debug, Clone)]
pub struct SessionStore {
    config: PersistenceConfig,
}

impl SessionStore {
    /// Create store, creating the sessions directory if needed
    pub fn new(config: PersistenceConfig) -> Result<Self> {
        if !config.sessions_dir.exists() {
            fs::create_dir_all(&config.sessions_dir)?;
        }

        Ok(Self { config })
    }

    /// Create store rooted at a directory
    pub fn at(sessions_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::new(PersistenceConfig {
            sessions_dir: sessions_dir.into(),
        })
    }

    /// Path of the live session file
    pub fn current_path(&self) -> PathBuf {
        self.config.sessions_dir.join(CURRENT_FILE)
    }

    /// Path of the archive for a session id. Ids that are not plain
    /// file name segments are hex-encoded so the archive stays inside
    /// the sessions directory.
    pub fn archive_path(&self, id: &str) -> PathBuf {
        let segment = encode_id_segment(id);
        self.config
            .sessions_dir
            .join(format!("{ARCHIVE_PREFIX}{segment}{ARCHIVE_SUFFIX}"))
    }

    /// Load the live session. Missing or unreadable files count as no session.
    pub fn load_current(&self) -> Option<Session> {
        let path = self.current_path();
        if !path.exists() {
            return None;
        }

        match read_session(&path) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable live session");
                None
            }
        }
    }

    /// Stamp `updated_at` and atomically overwrite the live session
    pub fn save_current(&self, session: &mut Session) -> Result<()> {
        session.updated_at = Utc::now();
        self.write_atomic(&self.current_path(), session)?;
        tracing::debug!(id = %session.id, answered = session.answered_count, "saved live session");
        Ok(())
    }

    /// Write an immutable copy keyed by the session id.
    /// Archiving the same id again replaces the earlier copy.
    pub fn archive(&self, session: &Session) -> Result<PathBuf> {
        let mut archived = session.clone();
        archived.archived_at = Some(Utc::now());

        let path = self.archive_path(&archived.id);
        if path.exists() {
            tracing::info!(id = %archived.id, "replacing existing archive");
        }
        self.write_atomic(&path, &archived)?;

        Ok(path)
    }

    /// Summaries of all readable archives, newest first
    pub fn list_archived(&self) -> Result<Vec<ArchiveSummary>> {
        let mut summaries: Vec<ArchiveSummary> = self
            .load_archives()?
            .into_iter()
            .map(|(path, session)| ArchiveSummary::from_session(&session, path))
            .collect();

        summaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(summaries)
    }

    /// All readable archived sessions, oldest first
    pub fn load_all_archived(&self) -> Result<Vec<Session>> {
        let mut sessions: Vec<Session> = self
            .load_archives()?
            .into_iter()
            .map(|(_, session)| session)
            .collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(sessions)
    }

    /// Find an archived session by exact id, then by id substring.
    /// Among several substring matches the most recently created wins.
    pub fn find_by_id(&self, query: &str) -> Option<Session> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        if !query.contains(['/', '\\']) {
            let exact = self.archive_path(query);
            if exact.exists() {
                return match read_session(&exact) {
                    Ok(session) => Some(session),
                    Err(e) => {
                        tracing::warn!(path = %exact.display(), error = %e, "unreadable archive");
                        None
                    }
                };
            }
        }

        let archives = match self.load_archives() {
            Ok(archives) => archives,
            Err(e) => {
                tracing::warn!(error = %e, "failed to enumerate archives");
                return None;
            }
        };

        archives
            .into_iter()
            .map(|(_, session)| session)
            .filter(|session| session.id.contains(query))
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
    }

    /// Ids of the newest archives, for "did you mean" hints
    pub fn recent_ids(&self, limit: usize) -> Vec<String> {
        self.list_archived()
            .map(|summaries| summaries.into_iter().take(limit).map(|s| s.id).collect())
            .unwrap_or_default()
    }

    /// Remove the live session file if present
    pub fn delete_current(&self) -> Result<()> {
        let path = self.current_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Get sessions directory
    pub fn sessions_dir(&self) -> &Path {
        &self.config.sessions_dir
    }

    fn load_archives(&self) -> Result<Vec<(PathBuf, Session)>> {
        let mut archives = Vec::new();

        for entry in fs::read_dir(&self.config.sessions_dir)? {
            let path = entry?.path();
            if !path.is_file() || archive_id(&path).is_none() {
                continue;
            }

            match read_session(&path) {
                Ok(session) => archives.push((path, session)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable archive");
                }
            }
        }

        Ok(archives)
    }

    /// Serialize into a temp file in the same directory, then rename it over
    /// `path`. On any failure the temp file is removed when dropped.
    fn write_atomic(&self, path: &Path, session: &Session) -> Result<()> {
        let json = serde_json::to_string_pretty(session)?;

        let mut tmp = Builder::new()
            .prefix(".quiztrack-")
            .suffix(".tmp")
            .tempfile_in(&self.config.sessions_dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;

        Ok(())
    }
}

fn read_session(path: &Path) -> Result<Session> {
    let json = fs::read_to_string(path)?;
    migration::from_json(&json)
}

fn encode_id_segment(id: &str) -> String {
    let plain = !id.is_empty()
        && !id.starts_with('~')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if plain {
        return id.to_owned();
    }

    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(1 + id.len() * 2);
    out.push('~');
    for &b in id.as_bytes() {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

fn archive_id(path: &Path) -> Option<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|name| name.strip_prefix(ARCHIVE_PREFIX))
        .and_then(|name| name.strip_suffix(ARCHIVE_SUFFIX))
}
