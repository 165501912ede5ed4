//! Session store — per-token JSON records with a fixed idle-expiry policy.
//!
//! One file per client token under `<install_dir>/sessions`:
//! - `<token>.json` — `{ "created_at": …, "last_active": …, "data": {…} }`
//!
//! A scope is created on first contact, reopened (and touched) while the
//! client stays active, and discarded once it has idled past the two-week
//! lifetime. The lifetime is a process-wide policy applied uniformly to
//! every session; it is not configurable in this layer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;

/// Sessions idle out after two weeks (3600 * 24 * 14 seconds).
pub const SESSION_IDLE_LIFETIME: Duration = Duration::from_secs(1_209_600);

const SESSIONS_DIRNAME: &str = "sessions";

/// On-disk shape of `<token>.json`.
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    created_at: i64,
    last_active: i64,
    #[serde(default)]
    data: BTreeMap<String, String>,
}

/// Owns the session directory and the expiry policy.
pub struct SessionManager {
    dir: PathBuf,
}

impl SessionManager {
    /// Prepare the session directory under the install dir.
    pub fn new(install_dir: &Path) -> Result<Self, AppError> {
        let dir = install_dir.join(SESSIONS_DIRNAME);
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::Session(format!("cannot create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    /// The uniform idle-expiry policy.
    pub fn idle_lifetime(&self) -> Duration {
        SESSION_IDLE_LIFETIME
    }

    /// Establish the session scope for a client identity.
    ///
    /// A known, live token reopens its record and touches `last_active`; a
    /// missing, unknown, or expired token yields a fresh scope with a new
    /// token. Unreadable records are discarded rather than trusted.
    pub fn open(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SessionScope, AppError> {
        if let Some(token) = token.filter(|t| valid_token(t)) {
            let path = self.record_path(token);
            match self.read_record(&path) {
                Some(mut record) => {
                    let idle = now.timestamp() - record.last_active;
                    if idle <= SESSION_IDLE_LIFETIME.as_secs() as i64 {
                        record.last_active = now.timestamp();
                        let scope = SessionScope {
                            token: token.to_string(),
                            path,
                            record,
                        };
                        scope.persist()?;
                        debug!(token, "session reopened");
                        return Ok(scope);
                    }
                    // Idled out: the record is gone for good.
                    fs::remove_file(&path).map_err(|e| {
                        AppError::Session(format!("cannot expire {}: {e}", path.display()))
                    })?;
                    debug!(token, idle, "session expired");
                }
                None => debug!(token, "unknown session token"),
            }
        }
        self.create(now)
    }

    /// Sweep expired records. Returns how many were removed.
    pub fn gc(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| AppError::Session(format!("cannot read {}: {e}", self.dir.display())))?;

        let mut removed = 0;
        for entry in entries {
            let path = entry
                .map_err(|e| AppError::Session(format!("cannot scan sessions: {e}")))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(record) = self.read_record(&path) else {
                warn!(path = %path.display(), "skipping unreadable session record");
                continue;
            };
            if now.timestamp() - record.last_active > SESSION_IDLE_LIFETIME.as_secs() as i64 {
                fs::remove_file(&path).map_err(|e| {
                    AppError::Session(format!("cannot expire {}: {e}", path.display()))
                })?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn create(&self, now: DateTime<Utc>) -> Result<SessionScope, AppError> {
        let token = Uuid::new_v4().simple().to_string();
        let scope = SessionScope {
            path: self.record_path(&token),
            token,
            record: SessionRecord {
                created_at: now.timestamp(),
                last_active: now.timestamp(),
                data: BTreeMap::new(),
            },
        };
        scope.persist()?;
        debug!(token = %scope.token, "session created");
        Ok(scope)
    }

    fn record_path(&self, token: &str) -> PathBuf {
        self.dir.join(format!("{token}.json"))
    }

    fn read_record(&self, path: &Path) -> Option<SessionRecord> {
        let text = fs::read_to_string(path).ok()?;
        serde_json::from_str(&text).ok()
    }
}

/// The token is client-supplied: accept only plain token characters before
/// it gets anywhere near a filename.
fn valid_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= 64
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// An open storage boundary for one client identity.
pub struct SessionScope {
    token: String,
    path: PathBuf,
    record: SessionRecord,
}

impl SessionScope {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn created_at(&self) -> i64 {
        self.record.created_at
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.record.data.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.record.data.insert(key.into(), value.into());
    }

    /// Write the record back to its file.
    pub fn persist(&self) -> Result<(), AppError> {
        let text = serde_json::to_string_pretty(&self.record)
            .map_err(|e| AppError::Session(format!("serialise session: {e}")))?;
        fs::write(&self.path, text)
            .map_err(|e| AppError::Session(format!("cannot write {}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn idle_lifetime_is_two_weeks() {
        let dir = TempDir::new().unwrap();
        let mgr = SessionManager::new(dir.path()).unwrap();
        assert_eq!(mgr.idle_lifetime().as_secs(), 1_209_600);
    }

    #[test]
    fn first_contact_creates_a_scope() {
        let dir = TempDir::new().unwrap();
        let mgr = SessionManager::new(dir.path()).unwrap();
        let scope = mgr.open(None, t0()).unwrap();
        assert!(!scope.token().is_empty());
        assert!(dir.path().join("sessions").join(format!("{}.json", scope.token())).exists());
    }

    #[test]
    fn reopen_within_lifetime_keeps_token_and_data() {
        let dir = TempDir::new().unwrap();
        let mgr = SessionManager::new(dir.path()).unwrap();

        let mut scope = mgr.open(None, t0()).unwrap();
        scope.set("auth", "logged-in");
        scope.persist().unwrap();
        let token = scope.token().to_string();

        let later = t0() + chrono::Duration::days(13);
        let reopened = mgr.open(Some(&token), later).unwrap();
        assert_eq!(reopened.token(), token);
        assert_eq!(reopened.get("auth"), Some("logged-in"));
    }

    #[test]
    fn reopen_past_lifetime_discards_the_record() {
        let dir = TempDir::new().unwrap();
        let mgr = SessionManager::new(dir.path()).unwrap();

        let scope = mgr.open(None, t0()).unwrap();
        let token = scope.token().to_string();

        let later = t0() + chrono::Duration::days(15);
        let fresh = mgr.open(Some(&token), later).unwrap();
        assert_ne!(fresh.token(), token);
        assert!(!dir.path().join("sessions").join(format!("{token}.json")).exists());
    }

    #[test]
    fn unknown_or_hostile_tokens_get_a_fresh_scope() {
        let dir = TempDir::new().unwrap();
        let mgr = SessionManager::new(dir.path()).unwrap();

        let fresh = mgr.open(Some("no-such-token"), t0()).unwrap();
        assert_ne!(fresh.token(), "no-such-token");

        let hostile = mgr.open(Some("../../etc/passwd"), t0()).unwrap();
        assert!(valid_token(hostile.token()));
    }

    #[test]
    fn gc_removes_only_expired_records() {
        let dir = TempDir::new().unwrap();
        let mgr = SessionManager::new(dir.path()).unwrap();

        let live = mgr.open(None, t0()).unwrap();
        let stale = mgr.open(None, t0() - chrono::Duration::days(20)).unwrap();

        let removed = mgr.gc(t0()).unwrap();
        assert_eq!(removed, 1);
        assert!(mgr.read_record(&mgr.record_path(live.token())).is_some());
        assert!(mgr.read_record(&mgr.record_path(stale.token())).is_none());
    }
}
