//! `wisal-client` — HTTP plumbing and session lifecycle for the Wisal
//! administrative dashboard.
//!
//! The crate owns the single outgoing channel to the API ([`ApiClient`]),
//! the durable session fields ([`SessionStore`] behind a swappable
//! [`SessionStorage`] port), the derivation of session state from
//! heterogeneous auth responses ([`derive::derive_session`]), and the
//! authenticated/unauthenticated/initializing state machine
//! ([`AuthContext`]). Resource services build on the thin request
//! wrappers and are gated by the auth state exposed via
//! [`AuthContext::snapshot`].

pub mod config;
pub mod context;
pub mod derive;
pub mod error;
pub mod http;
pub mod store;

pub use config::ClientConfig;
pub use context::{AuthContext, Credentials, SessionSnapshot};
pub use derive::{DerivedSession, derive_session};
pub use error::ApiError;
pub use http::ApiClient;
pub use store::{FileStorage, MemoryStorage, SessionStorage, SessionStore};
