//! `wisal-core` — shared foundation for the Wisal client.
//!
//! This crate contains **pure domain** primitives (no HTTP, no storage).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{EmployeeId, InstitutionId};
