//! Client session record: cached profile plus last-activity time.
//!
//! Independent of the HTTP-only cookies; a session can be "expired" here
//! while the cookies are still valid, and the watcher then forces a logout.

use std::time::Duration;

use tracing::error;

use super::clock::{Clock, SystemClock};
use super::store::KeyValueStore;
use crate::auth::{LoginData, UserInfo};

/// Default inactivity timeout (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub const USER_INFO_KEY: &str = "userInfo";
pub const LAST_ACTIVE_KEY: &str = "lastActive";
pub const SAVED_ID_KEY: &str = "savedId";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionData {
    pub user_info: UserInfo,
    pub last_active: u64,
}

pub struct SessionManager<S, C = SystemClock> {
    store: S,
    clock: C,
    timeout: Duration,
}

impl<S: KeyValueStore> SessionManager<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> SessionManager<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Record a successful login: cache the profile and mark activity.
    /// Tokens are never stored here.
    pub fn set_session(&self, data: &LoginData) {
        if let Some(user) = &data.user {
            match serde_json::to_string(user) {
                Ok(json) => self.put(USER_INFO_KEY, &json),
                Err(e) => error!(error = %e, "Failed to serialize user info"),
            }
        }
        self.update_last_activity();
    }

    /// Drop the session record. The saved login ID survives.
    pub fn clear_session(&self) {
        for key in [USER_INFO_KEY, LAST_ACTIVE_KEY] {
            if let Err(e) = self.store.remove(key) {
                error!(key, error = %e, "Failed to clear session entry");
            }
        }
    }

    /// The cached profile. Fields the backend left out read as empty.
    pub fn user_info(&self) -> Option<UserInfo> {
        let raw = self.read(USER_INFO_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(error = %e, "Failed to parse user info");
                None
            }
        }
    }

    pub fn update_last_activity(&self) {
        self.put(LAST_ACTIVE_KEY, &self.now_millis().to_string());
    }

    pub fn last_activity(&self) -> Option<u64> {
        self.read(LAST_ACTIVE_KEY)?.trim().parse().ok()
    }

    /// Inactive for longer than the timeout. No recorded activity is not
    /// expiry: there is nothing to expire.
    pub fn is_session_expired(&self) -> bool {
        let Some(last_active) = self.last_activity() else {
            return false;
        };
        self.now_millis().saturating_sub(last_active) > self.timeout_millis()
    }

    pub fn is_session_valid(&self) -> bool {
        !self.is_session_expired()
    }

    pub fn session_data(&self) -> Option<SessionData> {
        Some(SessionData {
            user_info: self.user_info()?,
            last_active: self.last_activity()?,
        })
    }

    /// Time left before the session expires; zero when there is no session.
    pub fn remaining_time(&self) -> Duration {
        let Some(last_active) = self.last_activity() else {
            return Duration::ZERO;
        };
        let elapsed = self.now_millis().saturating_sub(last_active);
        Duration::from_millis(self.timeout_millis().saturating_sub(elapsed))
    }

    pub fn set_saved_id(&self, id: &str) {
        self.put(SAVED_ID_KEY, id);
    }

    pub fn saved_id(&self) -> Option<String> {
        self.read(SAVED_ID_KEY)
    }

    pub fn clear_saved_id(&self) {
        if let Err(e) = self.store.remove(SAVED_ID_KEY) {
            error!(error = %e, "Failed to clear saved id");
        }
    }

    fn timeout_millis(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            error!(key, error = %e, "Failed to read session entry");
            None
        })
    }

    fn put(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            error!(key, error = %e, "Failed to write session entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ManualClock, MemoryStore};
    use serde_json::json;

    const MINUTE: Duration = Duration::from_secs(60);

    fn manager() -> (SessionManager<MemoryStore, ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        (
            SessionManager::with_clock(MemoryStore::new(), clock.clone()),
            clock,
        )
    }

    fn login_data() -> LoginData {
        serde_json::from_value(json!({
            "token": "a",
            "refreshToken": "r",
            "user": {"userId": "admin", "userName": "Admin"}
        }))
        .unwrap()
    }

    #[test]
    fn test_no_activity_is_not_expired() {
        let (manager, _) = manager();
        assert!(manager.is_session_valid());
        assert_eq!(manager.remaining_time(), Duration::ZERO);
        assert_eq!(manager.session_data(), None);
    }

    #[test]
    fn test_set_session_caches_profile_only() {
        let (manager, clock) = manager();
        manager.set_session(&login_data());

        let data = manager.session_data().unwrap();
        assert_eq!(data.user_info.user_id, "admin");
        assert_eq!(data.user_info.user_name, "Admin");
        assert!(data.user_info.roles.is_empty());
        assert_eq!(data.last_active, clock.now_millis());
        assert_eq!(manager.remaining_time(), DEFAULT_SESSION_TIMEOUT);
    }

    #[test]
    fn test_expires_after_31_minutes_idle() {
        let (manager, clock) = manager();
        manager.update_last_activity();

        clock.advance(30 * MINUTE);
        assert!(manager.is_session_valid());

        clock.advance(MINUTE);
        assert!(!manager.is_session_valid());
        assert_eq!(manager.remaining_time(), Duration::ZERO);
    }

    #[test]
    fn test_validity_is_monotonic_without_activity() {
        let (manager, clock) = manager();
        manager.update_last_activity();

        let mut seen_invalid = false;
        for _ in 0..120 {
            clock.advance(Duration::from_secs(30));
            let valid = manager.is_session_valid();
            if seen_invalid {
                assert!(!valid, "validity came back without activity");
            }
            seen_invalid |= !valid;
        }
        assert!(seen_invalid);
    }

    #[test]
    fn test_custom_timeout() {
        let (manager, clock) = manager();
        let manager = manager.with_timeout(5 * MINUTE);
        manager.update_last_activity();
        clock.advance(6 * MINUTE);
        assert!(manager.is_session_expired());
    }

    #[test]
    fn test_clear_session_keeps_saved_id() {
        let (manager, _) = manager();
        manager.set_session(&login_data());
        manager.set_saved_id("admin");

        manager.clear_session();
        assert_eq!(manager.user_info(), None);
        assert_eq!(manager.last_activity(), None);
        assert_eq!(manager.saved_id().as_deref(), Some("admin"));

        manager.clear_saved_id();
        assert_eq!(manager.saved_id(), None);
    }

    #[test]
    fn test_unparsable_profile_reads_as_none() {
        let store = MemoryStore::new();
        store.set(USER_INFO_KEY, "not json").unwrap();
        let manager = SessionManager::new(store);
        assert_eq!(manager.user_info(), None);
    }

    #[test]
    fn test_garbage_last_active_reads_as_none() {
        let store = MemoryStore::new();
        store.set(LAST_ACTIVE_KEY, "yesterday").unwrap();
        let manager = SessionManager::new(store);
        assert_eq!(manager.last_activity(), None);
        assert!(manager.is_session_valid());
    }
}
