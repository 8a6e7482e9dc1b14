//! Core contracts for bookwire.
//!
//! This crate contains:
//! - The rate-limited outbound call pipeline against the booking platform
//! - Normalization of the upstream's ad-hoc response envelope
//! - The stable failure taxonomy for every call layer
//! - Domain callers for authentication, categories, and time slots

pub mod auth;
pub mod booking;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod throttling;

pub use auth::AuthClient;
pub use booking::BookingClient;
pub use config::{ConfigError, UpstreamConfig};
pub use domain::{AuthSession, Category, Provider, Service, SlotIndex};
pub use error::{CallError, ErrorCode};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use throttling::UpstreamGate;
