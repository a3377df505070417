//! Dashboard-side engine: talks to the REST API, keeps the session and builds
//! plan views.

pub mod api;
pub mod plan_view;
pub mod session;

pub use api::ApiClient;
pub use plan_view::load_plan_view;
pub use session::{
    FileStore, KeyValueStore, MemoryStore, PersistenceMode, ProfileSource, SessionError, SessionStore,
    SessionTiers, StoreError,
};
