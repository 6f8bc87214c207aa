//! REST API client module for the invoicing backend.
//!
//! This module provides the `ApiClient` for the authority endpoints
//! (`/auth/*`) and the template/bill data endpoints.
//!
//! The backend keeps a session cookie; the token returned by sign-in is also
//! sent as a bearer token so a restarted client can re-check its session.

pub mod client;
pub mod error;

pub use client::{ApiClient, CheckResponse, SignInResponse, DEFAULT_BASE_URL};
pub use error::ApiError;
