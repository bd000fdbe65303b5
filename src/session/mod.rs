//! Client-side session state and inactivity watching.
//!
//! Used by whatever foreground shell sits in front of the gateway. Storage
//! and time are injected so the logic runs the same against a browser-like
//! store, a file, or test doubles.

mod clock;
mod manager;
mod store;
mod terminate;
mod watcher;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{
    DEFAULT_SESSION_TIMEOUT, LAST_ACTIVE_KEY, SAVED_ID_KEY, SessionData, SessionManager,
    USER_INFO_KEY,
};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};
pub use terminate::{
    GatewayLogout, Navigation, SessionTerminator, TerminateError, handle_unauthorized, logout,
};
pub use watcher::{
    ACTIVITY_THROTTLE, ActivityEvent, CHECK_INTERVAL, SessionWatcher, WatchAction, WatchState,
    run_watcher,
};
