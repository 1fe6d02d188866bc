//! `wisal-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. Claims
//! extracted here are **unverified hints** (no signature check happens on
//! the client); they drive UI routing only and must never authorize a
//! server-side action.

pub mod claims;
pub mod codec;
pub mod guard;
pub mod roles;

pub use claims::UnverifiedClaims;
pub use codec::decode_payload;
pub use guard::{GuardState, RouteAccess, landing_route, route_access};
pub use roles::Role;
