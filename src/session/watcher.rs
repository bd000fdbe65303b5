//! Inactivity watcher for the client session.
//!
//! [`SessionWatcher`] is a plain state machine; [`run_watcher`] drives it
//! from an event channel and a fixed tick. Neither navigates: expiry comes
//! back as [`Navigation`] for the caller to act on.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::clock::Clock;
use super::manager::SessionManager;
use super::store::KeyValueStore;
use super::terminate::{Navigation, SessionTerminator, handle_unauthorized};

/// Minimum gap between two handled interaction events.
pub const ACTIVITY_THROTTLE: Duration = Duration::from_millis(1000);

/// How often validity is re-checked with no interaction at all.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// User interactions that count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEvent {
    PointerDown,
    PointerMove,
    KeyDown,
    Scroll,
    TouchStart,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Valid,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchAction {
    None,
    /// Activity recorded.
    Touched,
    /// The session just expired; run unauthorized handling once.
    Unauthorized,
}

#[derive(Debug)]
pub struct SessionWatcher {
    state: WatchState,
    last_handled: Option<u64>,
    throttle: Duration,
}

impl Default for SessionWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionWatcher {
    pub fn new() -> Self {
        Self {
            state: WatchState::Valid,
            last_handled: None,
            throttle: ACTIVITY_THROTTLE,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Re-evaluate validity. Reports `Unauthorized` only on the transition.
    pub fn check<S: KeyValueStore, C: Clock>(
        &mut self,
        manager: &SessionManager<S, C>,
    ) -> WatchAction {
        if self.state == WatchState::Expired {
            return WatchAction::None;
        }
        if manager.is_session_valid() {
            return WatchAction::None;
        }
        warn!("Session invalid or expired");
        self.state = WatchState::Expired;
        WatchAction::Unauthorized
    }

    /// Handle an interaction event, throttled. A still-valid session gets its
    /// activity time bumped.
    pub fn on_activity<S: KeyValueStore, C: Clock>(
        &mut self,
        manager: &SessionManager<S, C>,
    ) -> WatchAction {
        let now = manager.now_millis();
        if let Some(last) = self.last_handled {
            if now.saturating_sub(last) < self.throttle.as_millis() as u64 {
                return WatchAction::None;
            }
        }

        match self.check(manager) {
            WatchAction::None if self.state == WatchState::Valid => {
                manager.update_last_activity();
                self.last_handled = Some(now);
                WatchAction::Touched
            }
            action => action,
        }
    }
}

/// Drive a watcher until the session expires or the event channel closes.
///
/// Returns the navigation produced by unauthorized handling, or `None` when
/// the sender side was dropped (the UI shell went away).
pub async fn run_watcher<S, C, T>(
    manager: &SessionManager<S, C>,
    terminator: &T,
    mut events: mpsc::Receiver<ActivityEvent>,
) -> Option<Navigation>
where
    S: KeyValueStore,
    C: Clock,
    T: SessionTerminator,
{
    let mut watcher = SessionWatcher::new();
    // First tick fires immediately and doubles as the initial check.
    let mut ticker = tokio::time::interval(CHECK_INTERVAL);

    loop {
        let action = tokio::select! {
            _ = ticker.tick() => watcher.check(manager),
            event = events.recv() => match event {
                Some(event) => {
                    debug!(?event, "Activity");
                    watcher.on_activity(manager)
                }
                None => return None,
            },
        };

        if action == WatchAction::Unauthorized {
            return Some(handle_unauthorized(manager, terminator).await);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::terminate::tests::RecordingTerminator;
    use crate::session::{ManualClock, MemoryStore};
    use std::sync::atomic::Ordering;

    const MINUTE: Duration = Duration::from_secs(60);

    fn manager() -> (SessionManager<MemoryStore, ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        let manager = SessionManager::with_clock(MemoryStore::new(), clock.clone());
        manager.update_last_activity();
        (manager, clock)
    }

    #[test]
    fn test_activity_is_throttled() {
        let (manager, clock) = manager();
        let mut watcher = SessionWatcher::new();

        clock.advance(Duration::from_secs(10));
        assert_eq!(watcher.on_activity(&manager), WatchAction::Touched);
        let touched_at = manager.last_activity().unwrap();

        clock.advance(Duration::from_millis(999));
        assert_eq!(watcher.on_activity(&manager), WatchAction::None);
        assert_eq!(manager.last_activity(), Some(touched_at));

        clock.advance(Duration::from_millis(1));
        assert_eq!(watcher.on_activity(&manager), WatchAction::Touched);
        assert_eq!(manager.last_activity(), Some(touched_at + 1000));
    }

    #[test]
    fn test_activity_after_timeout_does_not_revive() {
        let (manager, clock) = manager();
        let mut watcher = SessionWatcher::new();

        clock.advance(31 * MINUTE);
        let before = manager.last_activity();
        assert_eq!(watcher.on_activity(&manager), WatchAction::Unauthorized);
        assert_eq!(manager.last_activity(), before);
        assert_eq!(watcher.state(), WatchState::Expired);

        clock.advance(Duration::from_secs(2));
        assert_eq!(watcher.on_activity(&manager), WatchAction::None);
    }

    #[test]
    fn test_idle_check_reports_expiry_once() {
        let (manager, clock) = manager();
        let mut watcher = SessionWatcher::new();

        assert_eq!(watcher.check(&manager), WatchAction::None);
        clock.advance(31 * MINUTE);
        assert_eq!(watcher.check(&manager), WatchAction::Unauthorized);
        assert_eq!(watcher.check(&manager), WatchAction::None);
    }

    #[tokio::test]
    async fn test_run_watcher_expires_idle_session() {
        let (manager, clock) = manager();
        clock.advance(31 * MINUTE);
        let terminator = RecordingTerminator::default();
        let (_tx, rx) = mpsc::channel(8);

        let nav = run_watcher(&manager, &terminator, rx).await;
        assert_eq!(nav, Some(Navigation::Login));
        assert_eq!(terminator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.last_activity(), None);
    }

    #[tokio::test]
    async fn test_run_watcher_records_activity_and_stops_on_close() {
        let (manager, clock) = manager();
        let terminator = RecordingTerminator::default();
        let (tx, rx) = mpsc::channel(8);

        clock.advance(Duration::from_secs(20));
        tx.send(ActivityEvent::KeyDown).await.unwrap();
        drop(tx);

        assert_eq!(run_watcher(&manager, &terminator, rx).await, None);
        assert_eq!(manager.last_activity(), Some(clock.now_millis()));
        assert_eq!(terminator.calls.load(Ordering::SeqCst), 0);
    }
}
