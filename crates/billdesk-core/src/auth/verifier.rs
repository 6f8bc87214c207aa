//! Round trips to the authentication authority.
//!
//! A verifier never fails. Whatever happens on the wire is normalized into
//! an outcome the session store can apply: transport trouble fails closed
//! (signed out) and is reported separately as a diagnostic. Each call is a
//! single attempt; retries are the caller's business.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError, CheckResponse, SignInResponse};
use crate::models::Identity;

use super::session::{Generation, Outcome};

/// Shown when the authority refuses the credentials without saying why.
const DEFAULT_REJECTION: &str = "Login failed. Please check your credentials.";

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A successful login: the new credential hint and the user's profile.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedIn {
    pub token: String,
    pub identity: Identity,
}

/// Why a login did not produce a session. `Display` is the user-facing text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginFailure {
    /// The authority refused the credentials.
    #[error("{0}")]
    Rejected(String),

    /// The authority could not be reached or answered nonsense. Holds the
    /// diagnostic detail, which is not shown to the user.
    #[error("Unable to reach the server. Please try again.")]
    Transport(String),
}

impl LoginFailure {
    pub fn is_transport(&self) -> bool {
        matches!(self, LoginFailure::Transport(_))
    }
}

/// Result of a session check, tagged with the generation it was started for.
#[derive(Debug, Clone)]
pub struct Verification {
    pub generation: Generation,
    pub outcome: Outcome,
    /// Set when the outcome was forced closed by a transport fault.
    pub fault: Option<String>,
}

/// Result of a login round trip, tagged with the generation it was started for.
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    pub generation: Generation,
    pub result: Result<SignedIn, LoginFailure>,
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// Ask the authority whether the session behind `hint` (and any session
    /// cookie) is live.
    async fn verify(&self, generation: Generation, hint: Option<&str>) -> Verification;

    async fn login(&self, generation: Generation, credentials: &Credentials) -> LoginAttempt;

    /// Best-effort remote sign-out of the session behind `hint`. Failures
    /// are logged, never returned.
    async fn sign_out(&self, hint: Option<&str>);
}

/// Verifier backed by the backend's `/auth/*` endpoints.
#[derive(Clone)]
pub struct HttpVerifier {
    api: ApiClient,
}

impl HttpVerifier {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SessionVerifier for HttpVerifier {
    async fn verify(&self, generation: Generation, hint: Option<&str>) -> Verification {
        debug!(generation = %generation, has_hint = hint.is_some(), "Checking session with authority");
        let api = self.api.with_token(hint.map(str::to_string));
        let (outcome, fault) = classify_check(api.check().await);
        Verification {
            generation,
            outcome,
            fault,
        }
    }

    async fn login(&self, generation: Generation, credentials: &Credentials) -> LoginAttempt {
        debug!(generation = %generation, email = %credentials.email, "Signing in");
        let result = classify_sign_in(
            self.api
                .sign_in(&credentials.email, &credentials.password)
                .await,
        );
        LoginAttempt { generation, result }
    }

    async fn sign_out(&self, hint: Option<&str>) {
        let api = self.api.with_token(hint.map(str::to_string));
        if let Err(e) = api.sign_out().await {
            warn!(error = %e, "Remote sign-out failed");
        }
    }
}

/// Map a check response onto an outcome plus an optional fault detail.
fn classify_check(result: Result<CheckResponse, ApiError>) -> (Outcome, Option<String>) {
    match result {
        Ok(CheckResponse {
            authenticated: true,
            user: Some(identity),
        }) => (Outcome::Authenticated(identity), None),
        Ok(CheckResponse {
            authenticated: true,
            user: None,
        }) => (
            Outcome::Unauthenticated,
            Some("Session check reported authenticated without a user".to_string()),
        ),
        Ok(CheckResponse {
            authenticated: false,
            ..
        }) => (Outcome::Unauthenticated, None),
        // The authority saying no is an answer, not a fault.
        Err(ApiError::Unauthorized) | Err(ApiError::AccessDenied(_)) => {
            (Outcome::Unauthenticated, None)
        }
        Err(e) => (Outcome::Unauthenticated, Some(e.to_string())),
    }
}

fn classify_sign_in(result: Result<SignInResponse, ApiError>) -> Result<SignedIn, LoginFailure> {
    match result {
        Ok(SignInResponse { token, .. }) if token.is_empty() => Err(LoginFailure::Transport(
            "Sign-in response carried an empty token".to_string(),
        )),
        Ok(SignInResponse { token, user }) => Ok(SignedIn {
            token,
            identity: user,
        }),
        Err(ApiError::Unauthorized) => Err(LoginFailure::Rejected(
            "Invalid email or password".to_string(),
        )),
        Err(ApiError::AccessDenied(message)) | Err(ApiError::Rejected { message, .. }) => {
            let message = message.trim();
            Err(LoginFailure::Rejected(if message.is_empty() {
                DEFAULT_REJECTION.to_string()
            } else {
                message.to_string()
            }))
        }
        Err(e) => Err(LoginFailure::Transport(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn identity() -> Identity {
        Identity {
            email: Some("a@b.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_check_authenticated_with_user() {
        let (outcome, fault) = classify_check(Ok(CheckResponse {
            authenticated: true,
            user: Some(identity()),
        }));
        assert_eq!(outcome, Outcome::Authenticated(identity()));
        assert!(fault.is_none());
    }

    #[test]
    fn test_check_not_authenticated_is_not_a_fault() {
        let (outcome, fault) = classify_check(Ok(CheckResponse {
            authenticated: false,
            user: None,
        }));
        assert_eq!(outcome, Outcome::Unauthenticated);
        assert!(fault.is_none());

        let (outcome, fault) = classify_check(Err(ApiError::Unauthorized));
        assert_eq!(outcome, Outcome::Unauthenticated);
        assert!(fault.is_none());
    }

    #[test]
    fn test_check_faults_fail_closed() {
        let (outcome, fault) = classify_check(Err(ApiError::ServerError("boom".to_string())));
        assert_eq!(outcome, Outcome::Unauthenticated);
        assert!(fault.unwrap().contains("boom"));

        let (outcome, fault) = classify_check(Ok(CheckResponse {
            authenticated: true,
            user: None,
        }));
        assert_eq!(outcome, Outcome::Unauthenticated);
        assert!(fault.is_some());
    }

    #[test]
    fn test_sign_in_success() {
        let signed_in = classify_sign_in(Ok(SignInResponse {
            token: "tok".to_string(),
            user: identity(),
        }))
        .unwrap();
        assert_eq!(signed_in.token, "tok");
        assert_eq!(signed_in.identity, identity());
    }

    #[test]
    fn test_sign_in_rejections_are_user_facing() {
        let failure = classify_sign_in(Err(ApiError::Unauthorized)).unwrap_err();
        assert_eq!(failure.to_string(), "Invalid email or password");

        let failure = classify_sign_in(Err(ApiError::Rejected {
            status: 400,
            message: "Account locked".to_string(),
        }))
        .unwrap_err();
        assert_eq!(failure, LoginFailure::Rejected("Account locked".to_string()));

        let failure = classify_sign_in(Err(ApiError::Rejected {
            status: 422,
            message: "  ".to_string(),
        }))
        .unwrap_err();
        assert_eq!(failure.to_string(), DEFAULT_REJECTION);
    }

    #[test]
    fn test_sign_in_transport_faults_suggest_retry() {
        let failure =
            classify_sign_in(Err(ApiError::InvalidResponse("bad json".to_string()))).unwrap_err();
        assert!(failure.is_transport());
        assert_eq!(failure.to_string(), "Unable to reach the server. Please try again.");

        let failure = classify_sign_in(Ok(SignInResponse {
            token: String::new(),
            user: identity(),
        }))
        .unwrap_err();
        assert!(failure.is_transport());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("a@b.com", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_unreachable_authority() {
        let api = ApiClient::new("http://127.0.0.1:1/api", Duration::from_secs(2)).unwrap();
        let verifier = HttpVerifier::new(api);

        let verification = verifier.verify(Generation::default(), Some("tok")).await;
        assert_eq!(verification.outcome, Outcome::Unauthenticated);
        assert!(verification.fault.is_some());

        let attempt = verifier
            .login(Generation::default(), &Credentials::new("a@b.com", "pw"))
            .await;
        assert!(attempt.result.unwrap_err().is_transport());

        // Must not panic or block on failure.
        verifier.sign_out(Some("tok")).await;
    }
}
