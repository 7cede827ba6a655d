//! The HTTP surface of Colloquy.
//!
//! One router serves every survey variant: participant endpoints
//! (`/api/{survey}/start|message|summary|complete`, plus signup/login for the
//! resumable variant), the bearer-token-gated admin namespace, a health
//! check, and optional static front-end assets.

/// Admin namespace handlers.
pub mod admin;
/// Signup/login for the resumable variant.
pub mod auth;
/// Error-to-response mapping.
pub mod error;
/// Admin bearer-token middleware.
pub mod middleware;
/// Router assembly and shared state.
pub mod server;
/// Participant survey handlers.
pub mod survey;

pub use error::ApiError;
pub use middleware::{validate_token, AdminAuth};
pub use server::{AppState, GatewayServer};
