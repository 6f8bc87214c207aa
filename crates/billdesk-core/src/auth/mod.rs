//! Session lifecycle: who is signed in, and how sure are we.
//!
//! This module provides:
//! - `SessionStore`: the only writer of `SessionState`; applies transitions
//!   and discards stale asynchronous results by generation
//! - `SessionVerifier`: single round trips to the authority, normalized into
//!   outcomes that never fail
//! - `CredentialCache`: durable storage for the credential hint
//! - `flow`: boot and sign-in sequences for callers that await directly

pub mod credentials;
pub mod flow;
pub mod session;
pub mod verifier;

pub use credentials::{
    CredentialCache, FileCredentialCache, KeyringCredentialCache, MemoryCredentialCache,
};
pub use session::{
    Completion, Generation, LoginCompletion, LogoutReason, Outcome, SessionState, SessionStatus,
    SessionStore,
};
pub use verifier::{
    Credentials, HttpVerifier, LoginAttempt, LoginFailure, SessionVerifier, SignedIn, Verification,
};
