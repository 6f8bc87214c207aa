//! The session store: single owner and only writer of `SessionState`.
//!
//! Every asynchronous attempt (boot check, revalidation, login) is stamped
//! with a `Generation` when it starts. A result is applied only if its
//! generation is still the current one and the store is still waiting for
//! it; anything else is discarded. Last started wins, not last completed.

use std::fmt;

use tracing::{debug, info, warn};

use crate::models::Identity;

use super::credentials::CredentialCache;
use super::verifier::{LoginFailure, SignedIn};

/// Stamp identifying one verification or login attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Unknown,
    Verifying,
    Authenticated,
    Unauthenticated,
}

impl SessionStatus {
    /// Whether `next` is an edge of the session state machine.
    ///
    /// `Verifying -> Verifying` is a superseding attempt (a new generation).
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Unknown, Verifying)
                | (Verifying, Verifying)
                | (Verifying, Authenticated)
                | (Verifying, Unauthenticated)
                | (Authenticated, Unauthenticated)
                | (Authenticated, Verifying)
                | (Unauthenticated, Verifying)
        )
    }

    /// Authenticated or Unauthenticated: navigation can be decided.
    pub fn is_settled(self) -> bool {
        matches!(self, SessionStatus::Authenticated | SessionStatus::Unauthenticated)
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionStatus::Unknown => "unknown",
            SessionStatus::Verifying => "verifying",
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Unauthenticated => "unauthenticated",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the authority said about a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Authenticated(Identity),
    Unauthenticated,
}

/// Snapshot of the client's belief about the current session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub status: SessionStatus,
    /// Present iff `status == Authenticated`.
    pub identity: Option<Identity>,
    /// Mirror of the durable credential cache. Advisory only.
    pub credential_hint: Option<String>,
    pub generation: Generation,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Unknown,
            identity: None,
            credential_hint: None,
            generation: Generation::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user asked to sign out.
    UserRequested,
    /// A downstream call reported the session as rejected.
    ForcedInvalidation,
}

impl LogoutReason {
    fn trigger(self) -> &'static str {
        match self {
            LogoutReason::UserRequested => "logout",
            LogoutReason::ForcedInvalidation => "forced_invalidation",
        }
    }
}

/// Result of handing a verification outcome to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied(SessionStatus),
    /// Superseded by a newer attempt or a logout; nothing changed.
    Discarded,
}

/// Result of handing a login outcome to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginCompletion {
    SignedIn,
    /// Applied: the store is now Unauthenticated. The reason is for display.
    Failed(LoginFailure),
    Discarded,
}

pub struct SessionStore {
    state: SessionState,
    cache: Box<dyn CredentialCache>,
}

impl SessionStore {
    pub fn new(cache: Box<dyn CredentialCache>) -> Self {
        Self {
            state: SessionState::default(),
            cache,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn generation(&self) -> Generation {
        self.state.generation
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.state.identity.as_ref()
    }

    pub fn credential_hint(&self) -> Option<&str> {
        self.state.credential_hint.as_deref()
    }

    /// Whether work stamped with `generation` still belongs to the live session.
    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.state.generation
    }

    pub fn credential_cache(&self) -> &dyn CredentialCache {
        self.cache.as_ref()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Start a boot-time check or a revalidation of an authenticated session.
    ///
    /// Returns the generation to echo back on completion, or `None` when
    /// there is nothing to verify (the session is already known to be
    /// signed out; that path goes through `begin_login`).
    pub fn begin_verification(&mut self) -> Option<Generation> {
        if self.state.status == SessionStatus::Unauthenticated {
            debug!("Verification requested while signed out, ignoring");
            return None;
        }
        self.refresh_hint();
        Some(self.begin_attempt("verification"))
    }

    /// Start a user-initiated login.
    ///
    /// Allowed while signed out, or while another attempt is in flight (the
    /// login supersedes it). Returns `None` if already authenticated or the
    /// session has not been checked yet.
    pub fn begin_login(&mut self) -> Option<Generation> {
        match self.state.status {
            SessionStatus::Unauthenticated | SessionStatus::Verifying => {
                Some(self.begin_attempt("login"))
            }
            status => {
                debug!(status = %status, "Login requested in a state that does not allow it, ignoring");
                None
            }
        }
    }

    pub fn complete_verification(&mut self, generation: Generation, outcome: Outcome) -> Completion {
        if !self.accepts(generation, "verification") {
            return Completion::Discarded;
        }

        match outcome {
            Outcome::Authenticated(identity) => {
                self.state.identity = Some(identity);
                self.transition(SessionStatus::Authenticated, "verification");
            }
            Outcome::Unauthenticated => self.enter_unauthenticated("verification"),
        }
        Completion::Applied(self.state.status)
    }

    pub fn complete_login(
        &mut self,
        generation: Generation,
        result: Result<SignedIn, LoginFailure>,
    ) -> LoginCompletion {
        if !self.accepts(generation, "login") {
            return LoginCompletion::Discarded;
        }

        match result {
            Ok(SignedIn { token, identity }) => {
                if let Err(e) = self.cache.put(&token) {
                    warn!(error = %e, "Failed to persist credential hint");
                }
                self.state.credential_hint = Some(token);
                self.state.identity = Some(identity);
                self.transition(SessionStatus::Authenticated, "login");
                LoginCompletion::SignedIn
            }
            Err(failure) => {
                self.enter_unauthenticated("login");
                LoginCompletion::Failed(failure)
            }
        }
    }

    /// End the session at the user's request.
    pub fn logout(&mut self) {
        self.end_session(LogoutReason::UserRequested);
    }

    /// End the session because a downstream call was rejected as unauthorized.
    pub fn invalidate(&mut self) {
        self.end_session(LogoutReason::ForcedInvalidation);
    }

    pub fn end_session(&mut self, reason: LogoutReason) {
        // Bumping the generation orphans any attempt still in flight.
        self.state.generation = self.state.generation.next();

        match self.state.status {
            SessionStatus::Unknown | SessionStatus::Unauthenticated => {
                // No session to end; only make sure no hint survives.
                self.clear_cache();
                debug!(
                    generation = %self.state.generation,
                    status = %self.state.status,
                    reason = reason.trigger(),
                    "No active session to end"
                );
            }
            SessionStatus::Verifying | SessionStatus::Authenticated => {
                self.enter_unauthenticated(reason.trigger());
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn begin_attempt(&mut self, trigger: &'static str) -> Generation {
        self.state.generation = self.state.generation.next();
        self.state.identity = None;
        self.transition(SessionStatus::Verifying, trigger);
        self.state.generation
    }

    fn accepts(&self, generation: Generation, kind: &'static str) -> bool {
        if generation != self.state.generation {
            debug!(
                kind,
                generation = %generation,
                current = %self.state.generation,
                "Discarding stale result"
            );
            return false;
        }
        if self.state.status != SessionStatus::Verifying {
            debug!(kind, generation = %generation, status = %self.state.status, "Discarding duplicate result");
            return false;
        }
        true
    }

    fn enter_unauthenticated(&mut self, trigger: &'static str) {
        self.state.identity = None;
        self.clear_cache();
        self.transition(SessionStatus::Unauthenticated, trigger);
    }

    fn clear_cache(&mut self) {
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "Failed to clear credential hint");
        }
        self.state.credential_hint = None;
    }

    fn refresh_hint(&mut self) {
        match self.cache.get() {
            Ok(hint) => self.state.credential_hint = hint,
            Err(e) => warn!(error = %e, "Failed to read credential hint"),
        }
    }

    fn transition(&mut self, to: SessionStatus, trigger: &'static str) {
        let from = self.state.status;
        debug_assert!(
            from.can_transition_to(to),
            "illegal session transition {from} -> {to}"
        );
        self.state.status = to;
        info!(
            from = %from,
            to = %to,
            generation = %self.state.generation,
            trigger,
            "Session transition"
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
