//! Auth token and cached profile for the dashboard.
//!
//! Two tiers exist: a remembered tier that survives restarts (a JSON file) and
//! a session-only tier that lives in memory. `login` picks exactly one of them
//! from the "remember me" flag. The chosen tier is held by the store and reads
//! never fall back to the other one.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{auth::CoachProfile, error::BackendError};

const TOKEN_KEY: &str = "token";
const PROFILE_KEY: &str = "profile";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session storage i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// String key/value storage backing one session tier.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-lifetime storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// A flat JSON object on disk. The whole file is rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut HashMap<String, String>)) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        f(&mut entries);
        self.save(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceMode {
    Remembered,
    SessionOnly,
}

impl PersistenceMode {
    pub fn from_remember_me(remember_me: bool) -> Self {
        if remember_me {
            PersistenceMode::Remembered
        } else {
            PersistenceMode::SessionOnly
        }
    }
}

#[derive(Clone)]
pub struct SessionTiers {
    pub remembered: Arc<dyn KeyValueStore>,
    pub session_only: Arc<dyn KeyValueStore>,
}

impl SessionTiers {
    /// Remembered tier in `path`, session-only tier in memory.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            remembered: Arc::new(FileStore::new(path)),
            session_only: Arc::new(MemoryStore::new()),
        }
    }

    fn tier(&self, mode: PersistenceMode) -> &dyn KeyValueStore {
        match mode {
            PersistenceMode::Remembered => self.remembered.as_ref(),
            PersistenceMode::SessionOnly => self.session_only.as_ref(),
        }
    }
}

/// Where the dashboard gets a fresh profile when none is cached.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile_with(&self, token: &str) -> Result<CoachProfile, BackendError>;
}

/// Session state for one dashboard process. The tier is fixed by `login` or
/// `restore` and every later read goes to that tier only.
pub struct SessionStore {
    tiers: SessionTiers,
    mode: Mutex<Option<PersistenceMode>>,
}

impl SessionStore {
    pub fn new(tiers: SessionTiers) -> Self {
        Self {
            tiers,
            mode: Mutex::new(None),
        }
    }

    fn set_mode(&self, mode: Option<PersistenceMode>) {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner) = mode;
    }

    /// Stores the session in the tier picked by `remember_me` and clears the other.
    pub fn login(
        &self,
        token: &str,
        profile: Option<&CoachProfile>,
        remember_me: bool,
    ) -> Result<PersistenceMode, StoreError> {
        self.set_mode(None);
        self.clear()?;

        let mode = PersistenceMode::from_remember_me(remember_me);
        let tier = self.tiers.tier(mode);
        tier.set(TOKEN_KEY, token)?;
        if let Some(profile) = profile {
            tier.set(PROFILE_KEY, &serde_json::to_string(profile)?)?;
        }
        self.set_mode(Some(mode));
        info!(?mode, "session stored");
        Ok(mode)
    }

    /// Tier chosen by the last `login` or `restore`.
    pub fn mode(&self) -> Option<PersistenceMode> {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Picks up a session left by an earlier run, preferring the session-only
    /// tier, and fixes the tier for later reads.
    pub fn restore(&self) -> Result<Option<PersistenceMode>, StoreError> {
        let mut found = None;
        for mode in [PersistenceMode::SessionOnly, PersistenceMode::Remembered] {
            if self.tiers.tier(mode).get(TOKEN_KEY)?.is_some() {
                found = Some(mode);
                break;
            }
        }
        self.set_mode(found);
        match found {
            Some(mode) => debug!(?mode, "session restored"),
            None => debug!("no stored session"),
        }
        Ok(found)
    }

    fn active_tier(&self) -> Option<(PersistenceMode, &dyn KeyValueStore)> {
        self.mode().map(|mode| (mode, self.tiers.tier(mode)))
    }

    pub fn token(&self) -> Result<Option<String>, StoreError> {
        match self.active_tier() {
            Some((_, tier)) => tier.get(TOKEN_KEY),
            None => Ok(None),
        }
    }

    /// Profile cached next to the token. An unreadable entry counts as missing.
    pub fn cached_profile(&self) -> Result<Option<CoachProfile>, StoreError> {
        let Some((_, tier)) = self.active_tier() else {
            return Ok(None);
        };
        let Some(raw) = tier.get(PROFILE_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(error = %e, "cached profile is unreadable; ignoring it");
                Ok(None)
            }
        }
    }

    /// Cached profile, or one fetched from `source` and cached in the session's tier.
    /// `None` when there is no session.
    pub async fn profile(&self, source: &dyn ProfileSource) -> Result<Option<CoachProfile>, SessionError> {
        let Some((mode, tier)) = self.active_tier() else {
            return Ok(None);
        };
        if let Some(profile) = self.cached_profile()? {
            return Ok(Some(profile));
        }
        let Some(token) = tier.get(TOKEN_KEY)? else {
            return Ok(None);
        };
        let profile = source.fetch_profile_with(&token).await?;
        tier.set(PROFILE_KEY, &serde_json::to_string(&profile).map_err(StoreError::from)?)?;
        debug!(coach_id = %profile.id, ?mode, "profile fetched and cached");
        Ok(Some(profile))
    }

    pub fn logout(&self) -> Result<(), StoreError> {
        self.set_mode(None);
        self.clear()?;
        info!("session cleared");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        for mode in [PersistenceMode::Remembered, PersistenceMode::SessionOnly] {
            let tier = self.tiers.tier(mode);
            tier.remove(TOKEN_KEY)?;
            tier.remove(PROFILE_KEY)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use uuid::Uuid;

    use super::*;

    struct CountingSource {
        calls: AtomicUsize,
        profile: CoachProfile,
    }

    #[async_trait]
    impl ProfileSource for CountingSource {
        async fn fetch_profile_with(&self, token: &str) -> Result<CoachProfile, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if token == "expired" {
                return Err(BackendError::from_response(401, r#"{"detail":"Token expired"}"#));
            }
            Ok(self.profile.clone())
        }
    }

    fn coach() -> CoachProfile {
        CoachProfile {
            id: Uuid::new_v4(),
            email: "coach@example.com".into(),
            full_name: Some("Alex Coach".into()),
        }
    }

    fn source() -> CountingSource {
        CountingSource {
            calls: AtomicUsize::new(0),
            profile: coach(),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(SessionTiers::with_file(dir.path().join("session.json")))
    }

    #[test]
    fn remember_me_writes_only_the_remembered_tier() {
        let dir = tempfile::tempdir().unwrap();
        let tiers = SessionTiers::with_file(dir.path().join("session.json"));
        let store = SessionStore::new(tiers.clone());

        let mode = store.login("tok-1", Some(&coach()), true).unwrap();

        assert_eq!(mode, PersistenceMode::Remembered);
        assert_eq!(tiers.remembered.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert_eq!(tiers.session_only.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.token().unwrap().as_deref(), Some("tok-1"));
    }

    #[test]
    fn session_only_login_clears_remembered_session() {
        let dir = tempfile::tempdir().unwrap();
        let tiers = SessionTiers::with_file(dir.path().join("session.json"));
        let store = SessionStore::new(tiers.clone());

        store.login("old", Some(&coach()), true).unwrap();
        store.login("new", None, false).unwrap();

        assert_eq!(tiers.remembered.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(tiers.remembered.get(PROFILE_KEY).unwrap(), None);
        assert_eq!(store.mode(), Some(PersistenceMode::SessionOnly));
        assert_eq!(store.token().unwrap().as_deref(), Some("new"));
        assert_eq!(store.cached_profile().unwrap(), None);
    }

    #[test]
    fn remembered_session_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let profile = coach();
        store_in(&dir).login("tok-2", Some(&profile), true).unwrap();

        let restarted = store_in(&dir);

        assert_eq!(restarted.restore().unwrap(), Some(PersistenceMode::Remembered));
        assert_eq!(restarted.cached_profile().unwrap(), Some(profile));
    }

    #[test]
    fn session_only_login_is_gone_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).login("tok-3", None, false).unwrap();

        assert_eq!(store_in(&dir).restore().unwrap(), None);
    }

    #[tokio::test]
    async fn missing_profile_is_fetched_once_and_cached_in_the_token_tier() {
        let dir = tempfile::tempdir().unwrap();
        let tiers = SessionTiers::with_file(dir.path().join("session.json"));
        let store = SessionStore::new(tiers.clone());
        let source = source();
        store.login("tok-4", None, false).unwrap();

        let first = store.profile(&source).await.unwrap();
        let second = store.profile(&source).await.unwrap();

        assert_eq!(first, Some(source.profile.clone()));
        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(tiers.session_only.get(PROFILE_KEY).unwrap().is_some());
        assert_eq!(tiers.remembered.get(PROFILE_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn no_session_means_no_profile_and_no_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let source = source();

        assert_eq!(store_in(&dir).profile(&source).await.unwrap(), None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_profile_fetch_surfaces_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.login("expired", None, true).unwrap();

        let err = store.profile(&source()).await.unwrap_err();

        assert!(matches!(err, SessionError::Backend(ref e) if e.status() == Some(401)));
        assert_eq!(err.to_string(), "Token expired");
        assert_eq!(store.cached_profile().unwrap(), None);
    }

    #[test]
    fn corrupt_profile_counts_as_missing() {
        let store = SessionStore::new(SessionTiers {
            remembered: Arc::new(MemoryStore::new()),
            session_only: Arc::new(MemoryStore::new()),
        });
        store.login("tok-5", None, false).unwrap();
        store.tiers.session_only.set(PROFILE_KEY, "{not json").unwrap();

        assert_eq!(store.cached_profile().unwrap(), None);
    }

    #[test]
    fn tier_chosen_at_login_is_not_re_derived_from_storage() {
        let dir = tempfile::tempdir().unwrap();
        let tiers = SessionTiers::with_file(dir.path().join("session.json"));
        let store = SessionStore::new(tiers.clone());
        store.login("remembered-tok", None, true).unwrap();

        tiers.session_only.set(TOKEN_KEY, "stray-tok").unwrap();
        tiers.session_only.set(PROFILE_KEY, &serde_json::to_string(&coach()).unwrap()).unwrap();

        assert_eq!(store.mode(), Some(PersistenceMode::Remembered));
        assert_eq!(store.token().unwrap().as_deref(), Some("remembered-tok"));
        assert_eq!(store.cached_profile().unwrap(), None);
    }

    #[test]
    fn fresh_store_has_no_session_until_restored() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).login("tok-7", None, true).unwrap();

        let restarted = store_in(&dir);
        assert_eq!(restarted.mode(), None);
        assert_eq!(restarted.token().unwrap(), None);

        restarted.restore().unwrap();
        assert_eq!(restarted.token().unwrap().as_deref(), Some("tok-7"));
    }

    #[test]
    fn logout_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.login("tok-6", Some(&coach()), true).unwrap();

        store.logout().unwrap();

        assert_eq!(store.mode(), None);
        assert_eq!(store.token().unwrap(), None);
    }
}
