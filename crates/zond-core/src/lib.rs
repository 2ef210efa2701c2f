//! Zond Core Library
//!
//! Minimal Universal Analytics measurement client: formats tracked events
//! (pageviews, exceptions, social interactions, generic hits) into
//! query-string payloads and dispatches them fire-and-forget to the
//! collection endpoint. Persistence, host details, and delivery are
//! injectable capabilities with host-backed defaults.

pub mod client_id;
pub mod config;
pub mod environment;
pub mod error;
pub mod payload;
pub mod prefs;
pub mod tracker;
pub mod transport;

// Re-export commonly used items at crate root
pub use client_id::{generate_client_id, get_or_create_client_id};
pub use config::TrackerConfig;
pub use environment::{Environment, HostEnvironment};
pub use error::{Result, ZondError};
pub use payload::Payload;
pub use prefs::{FilePrefStore, MemoryPrefStore, PrefStore};
pub use tracker::Tracker;
pub use transport::{COLLECT_ENDPOINT, HttpTransport, Transport};
