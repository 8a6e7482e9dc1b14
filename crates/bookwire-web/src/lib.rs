//! REST boundary for bookwire.
//!
//! This crate only forwards to `bookwire-core` and serializes results and
//! taxonomy failures to JSON; it holds no upstream logic of its own.

pub mod error;
pub mod routes;

pub use routes::{router, AppState};
