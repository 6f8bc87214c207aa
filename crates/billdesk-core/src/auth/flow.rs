//! Boot and sign-in sequences.
//!
//! The `begin_*`/`apply_*` halves are for callers that run the verifier on a
//! background task and feed the result back later; `boot`, `sign_in` and
//! `sign_out` await the round trip inline.

use tracing::{debug, info, warn};

use super::credentials::CredentialCache;
use super::session::{Completion, Generation, LoginCompletion, Outcome, SessionStatus, SessionStore};
use super::verifier::{Credentials, LoginAttempt, LoginFailure, SessionVerifier, Verification};

/// What the caller has to do after the store entered boot verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootPlan {
    /// Ask the authority about the session behind `hint`.
    Verify { generation: Generation, hint: String },
    /// Nothing to ask about; the store has already settled.
    Settled(SessionStatus),
}

/// Put the store into boot verification.
///
/// Without a credential hint there is no session to confirm, so the store
/// settles to signed out (through `Verifying`) without a round trip.
pub fn begin_boot(store: &mut SessionStore) -> BootPlan {
    let Some(generation) = store.begin_verification() else {
        return BootPlan::Settled(store.status());
    };

    match store.credential_hint() {
        Some(hint) => BootPlan::Verify {
            generation,
            hint: hint.to_string(),
        },
        None => {
            debug!("No credential hint, skipping remote check");
            store.complete_verification(generation, Outcome::Unauthenticated);
            BootPlan::Settled(store.status())
        }
    }
}

/// Hand a verification result to the store, reporting any fault.
pub fn apply_verification(store: &mut SessionStore, verification: Verification) -> Completion {
    if let Some(ref fault) = verification.fault {
        warn!(
            generation = %verification.generation,
            fault = %fault,
            "Session check failed, treating as signed out"
        );
    }
    store.complete_verification(verification.generation, verification.outcome)
}

/// Hand a login result to the store, reporting transport faults.
pub fn apply_login(store: &mut SessionStore, attempt: LoginAttempt) -> LoginCompletion {
    if let Err(ref failure) = attempt.result {
        match failure {
            LoginFailure::Transport(detail) => {
                warn!(generation = %attempt.generation, fault = %detail, "Login could not reach the authority")
            }
            LoginFailure::Rejected(reason) => {
                info!(generation = %attempt.generation, reason = %reason, "Login rejected")
            }
        }
    }
    store.complete_login(attempt.generation, attempt.result)
}

/// Boot check, awaited inline.
pub async fn boot<V>(store: &mut SessionStore, verifier: &V) -> SessionStatus
where
    V: SessionVerifier + ?Sized,
{
    match begin_boot(store) {
        BootPlan::Settled(status) => status,
        BootPlan::Verify { generation, hint } => {
            let verification = verifier.verify(generation, Some(&hint)).await;
            apply_verification(store, verification);
            store.status()
        }
    }
}

/// Revalidate an authenticated session, awaited inline.
pub async fn revalidate<V>(store: &mut SessionStore, verifier: &V) -> Completion
where
    V: SessionVerifier + ?Sized,
{
    let Some(generation) = store.begin_verification() else {
        return Completion::Discarded;
    };
    let hint = store.credential_hint().map(str::to_string);
    let verification = verifier.verify(generation, hint.as_deref()).await;
    apply_verification(store, verification)
}

/// User-initiated login, awaited inline.
pub async fn sign_in<V>(store: &mut SessionStore, verifier: &V, credentials: &Credentials) -> LoginCompletion
where
    V: SessionVerifier + ?Sized,
{
    let Some(generation) = store.begin_login() else {
        return LoginCompletion::Discarded;
    };
    let attempt = verifier.login(generation, credentials).await;
    apply_login(store, attempt)
}

/// Explicit logout: local state first, then a best-effort remote sign-out.
///
/// Works before boot too; the hint is then read straight from the cache.
pub async fn sign_out<V>(store: &mut SessionStore, verifier: &V)
where
    V: SessionVerifier + ?Sized,
{
    let hint = match store.credential_hint() {
        Some(hint) => Some(hint.to_string()),
        None => store.credential_cache().get().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read credential hint for sign-out");
            None
        }),
    };
    store.logout();
    verifier.sign_out(hint.as_deref()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::auth::credentials::{CredentialCache, MemoryCredentialCache};
    use crate::auth::verifier::SignedIn;
    use crate::models::Identity;

    /// Verifier with canned answers that records what it was asked.
    #[derive(Default)]
    struct ScriptedVerifier {
        accept_hint: Option<String>,
        accept_password: Option<String>,
        seen_hints: Mutex<Vec<Option<String>>>,
        signed_out: Mutex<Vec<Option<String>>>,
    }

    fn user() -> Identity {
        Identity {
            email: Some("owner@example.com".to_string()),
            ..Default::default()
        }
    }

    #[async_trait]
    impl SessionVerifier for ScriptedVerifier {
        async fn verify(&self, generation: Generation, hint: Option<&str>) -> Verification {
            self.seen_hints.lock().unwrap().push(hint.map(str::to_string));
            let outcome = match (hint, self.accept_hint.as_deref()) {
                (Some(h), Some(accepted)) if h == accepted => Outcome::Authenticated(user()),
                _ => Outcome::Unauthenticated,
            };
            Verification {
                generation,
                outcome,
                fault: None,
            }
        }

        async fn login(&self, generation: Generation, credentials: &Credentials) -> LoginAttempt {
            let result = match self.accept_password.as_deref() {
                Some(pw) if pw == credentials.password => Ok(SignedIn {
                    token: "issued".to_string(),
                    identity: user(),
                }),
                Some(_) => Err(LoginFailure::Rejected("Invalid email or password".to_string())),
                None => Err(LoginFailure::Transport("connection refused".to_string())),
            };
            LoginAttempt { generation, result }
        }

        async fn sign_out(&self, hint: Option<&str>) {
            self.signed_out.lock().unwrap().push(hint.map(str::to_string));
        }
    }

    fn store(hint: Option<&str>) -> SessionStore {
        let cache = hint.map(MemoryCredentialCache::with_token).unwrap_or_default();
        SessionStore::new(Box::new(cache))
    }

    #[tokio::test]
    async fn test_boot_without_hint_skips_network() {
        let verifier = ScriptedVerifier::default();
        let mut store = store(None);

        assert_eq!(boot(&mut store, &verifier).await, SessionStatus::Unauthenticated);
        assert!(verifier.seen_hints.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_boot_with_refuted_hint_clears_cache() {
        let verifier = ScriptedVerifier::default();
        let mut store = store(Some("expired"));

        assert_eq!(boot(&mut store, &verifier).await, SessionStatus::Unauthenticated);
        assert_eq!(
            *verifier.seen_hints.lock().unwrap(),
            vec![Some("expired".to_string())]
        );
        assert_eq!(store.credential_cache().get().unwrap(), None);
    }

    #[tokio::test]
    async fn test_boot_with_confirmed_hint() {
        let verifier = ScriptedVerifier {
            accept_hint: Some("live".to_string()),
            ..Default::default()
        };
        let mut store = store(Some("live"));

        assert_eq!(boot(&mut store, &verifier).await, SessionStatus::Authenticated);
        assert_eq!(store.identity(), Some(&user()));
    }

    #[tokio::test]
    async fn test_sign_in_then_sign_out() {
        let verifier = ScriptedVerifier {
            accept_password: Some("secret".to_string()),
            ..Default::default()
        };
        let mut store = store(None);
        boot(&mut store, &verifier).await;

        let completion = sign_in(&mut store, &verifier, &Credentials::new("o@e.com", "secret")).await;
        assert_eq!(completion, LoginCompletion::SignedIn);
        assert_eq!(store.credential_cache().get().unwrap().as_deref(), Some("issued"));

        sign_out(&mut store, &verifier).await;
        assert_eq!(store.status(), SessionStatus::Unauthenticated);
        assert_eq!(store.credential_cache().get().unwrap(), None);
        assert_eq!(
            *verifier.signed_out.lock().unwrap(),
            vec![Some("issued".to_string())]
        );
    }

    #[tokio::test]
    async fn test_sign_out_before_boot_uses_cached_hint() {
        let verifier = ScriptedVerifier::default();
        let mut store = store(Some("stored"));

        sign_out(&mut store, &verifier).await;
        assert_eq!(store.status(), SessionStatus::Unknown);
        assert_eq!(store.credential_cache().get().unwrap(), None);
        assert_eq!(
            *verifier.signed_out.lock().unwrap(),
            vec![Some("stored".to_string())]
        );
    }

    #[tokio::test]
    async fn test_sign_in_failures_surface_reason() {
        let verifier = ScriptedVerifier {
            accept_password: Some("secret".to_string()),
            ..Default::default()
        };
        let mut store = store(None);
        boot(&mut store, &verifier).await;

        let completion = sign_in(&mut store, &verifier, &Credentials::new("o@e.com", "wrong")).await;
        assert_eq!(
            completion,
            LoginCompletion::Failed(LoginFailure::Rejected("Invalid email or password".to_string()))
        );
        assert_eq!(store.status(), SessionStatus::Unauthenticated);

        let offline = ScriptedVerifier::default();
        match sign_in(&mut store, &offline, &Credentials::new("o@e.com", "secret")).await {
            LoginCompletion::Failed(failure) => assert!(failure.is_transport()),
            other => panic!("unexpected completion: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_revalidation_refuted_signs_out() {
        let verifier = ScriptedVerifier {
            accept_password: Some("secret".to_string()),
            ..Default::default()
        };
        let mut store = store(None);
        boot(&mut store, &verifier).await;
        sign_in(&mut store, &verifier, &Credentials::new("o@e.com", "secret")).await;

        // The authority no longer accepts the issued token.
        let completion = revalidate(&mut store, &verifier).await;
        assert_eq!(completion, Completion::Applied(SessionStatus::Unauthenticated));
        assert_eq!(
            verifier.seen_hints.lock().unwrap().last().cloned().flatten().as_deref(),
            Some("issued")
        );
        assert_eq!(store.credential_cache().get().unwrap(), None);
    }

    #[tokio::test]
    async fn test_out_of_order_results() {
        let verifier = ScriptedVerifier {
            accept_hint: Some("old".to_string()),
            accept_password: Some("secret".to_string()),
            ..Default::default()
        };
        let mut store = store(Some("old"));

        // Boot check starts, then the user logs in before it returns.
        let BootPlan::Verify { generation, hint } = begin_boot(&mut store) else {
            panic!("expected a remote check");
        };
        let login_generation = store.begin_login().unwrap();

        let login = verifier
            .login(login_generation, &Credentials::new("o@e.com", "secret"))
            .await;
        let check = verifier.verify(generation, Some(&hint)).await;

        assert_eq!(apply_login(&mut store, login), LoginCompletion::SignedIn);
        assert_eq!(apply_verification(&mut store, check), Completion::Discarded);
        assert_eq!(store.credential_cache().get().unwrap().as_deref(), Some("issued"));
    }
}
