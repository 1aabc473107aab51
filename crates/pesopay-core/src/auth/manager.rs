//! Auth session manager.
//!
//! Orchestrates login, registration, one-time-code verification, and
//! logout against the backend, and is the only component that installs or
//! replaces the session. Each operation makes exactly one attempt and
//! turns any failure into a single user-presentable message.

use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::{ApiClient, ApiError, AuthSuccess};
use crate::models::UserProfile;

use super::password::MIN_PASSWORD_LEN;
use super::session::Session;

// ============================================================================
// Fallback messages
// ============================================================================

// Shown when an operation fails without a server-supplied message.
const MSG_LOGIN_FAILED: &str = "Failed to login. Please try again.";
const MSG_REGISTER_FAILED: &str = "Failed to register. Please try again.";
const MSG_VERIFY_FAILED: &str = "Failed to verify code. Please try again.";
const MSG_RESEND_FAILED: &str = "Failed to resend code. Please try again.";
const MSG_GOOGLE_FAILED: &str = "Failed to sign in with Google. Please try again.";
const MSG_PROFILE_FAILED: &str = "Failed to load profile. Please try again.";
const MSG_UPDATE_PROFILE_FAILED: &str = "Failed to update profile. Please try again.";
const MSG_CHANGE_PASSWORD_FAILED: &str = "Failed to change password. Please try again.";

const MSG_NO_CONNECTION: &str = "Unable to connect to the server. Check your internet connection.";
const MSG_TIMEOUT: &str = "Connection timed out. Please try again.";

#[derive(Error, Debug)]
pub enum AuthError {
    /// Client-side field validation; the request never reached the network
    #[error("{0}")]
    Validation(String),

    /// A backend operation failed. The message is already user-presentable:
    /// the server-supplied text when available, a fixed per-operation
    /// fallback otherwise.
    #[error("{message}")]
    Operation {
        message: String,
        #[source]
        source: Option<ApiError>,
    },
}

/// Result of a registration attempt.
///
/// The backend either opens a pending verification session (the normal
/// path, completed by [`AuthManager::verify_otp`]) or issues a token
/// immediately (legacy path).
#[derive(Debug, Clone)]
pub enum RegisterOutcome {
    Authenticated(Option<UserProfile>),
    PendingVerification { user_id: String, email: String },
}

/// Owns the session and drives every authentication flow.
pub struct AuthManager {
    api: ApiClient,
    session: Session,
}

impl AuthManager {
    /// The manager consumes the owning [`Session`] handle; everything else
    /// observes the session through watches.
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self { api, session }
    }

    // ===== Authentication Flows =====

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        match self.api.login(email, password).await {
            Ok(auth) => {
                let user = auth.user.clone();
                self.install(auth);
                info!("Login successful");
                Ok(user)
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                Err(operation(e, MSG_LOGIN_FAILED))
            }
        }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterOutcome, AuthError> {
        if name.trim().is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }
        validate_email(email)?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        match self.api.signup(name, email, password).await {
            Ok(reply) => {
                if let Some(token) = reply.token {
                    // Legacy path: authenticated immediately
                    let user = reply.user.clone();
                    self.persist(token, reply.user);
                    info!("Registration authenticated directly");
                    return Ok(RegisterOutcome::Authenticated(user));
                }

                match reply.user_id {
                    // Pending verification: the session must stay untouched
                    // until the one-time code is confirmed
                    Some(user_id) => {
                        info!("Registration pending verification");
                        Ok(RegisterOutcome::PendingVerification {
                            user_id,
                            email: reply.email.unwrap_or_else(|| email.to_string()),
                        })
                    }
                    None => Err(AuthError::Operation {
                        message: MSG_REGISTER_FAILED.to_string(),
                        source: Some(ApiError::InvalidResponse(
                            "signup response carried neither token nor pending session".to_string(),
                        )),
                    }),
                }
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                Err(operation(e, MSG_REGISTER_FAILED))
            }
        }
    }

    pub async fn verify_otp(&self, user_id: &str, code: &str) -> Result<UserProfile, AuthError> {
        if code.trim().is_empty() {
            return Err(AuthError::Validation(
                "Verification code is required".to_string(),
            ));
        }

        match self.api.verify_otp(user_id, code.trim()).await {
            Ok(auth) => {
                let user = auth.user.clone();
                self.install(auth);
                info!("Verification successful");
                Ok(user)
            }
            Err(e) => {
                error!(error = %e, "Verification failed");
                Err(operation(e, MSG_VERIFY_FAILED))
            }
        }
    }

    pub async fn resend_otp(&self, user_id: &str) -> Result<(), AuthError> {
        match self.api.resend_otp(user_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "Resend failed");
                Err(operation(e, MSG_RESEND_FAILED))
            }
        }
    }

    /// Authenticate with a Google-issued ID token. The provider SDK flow
    /// that produces the token lives in the shell, not here.
    pub async fn login_with_google(&self, provider_token: &str) -> Result<UserProfile, AuthError> {
        if provider_token.is_empty() {
            return Err(AuthError::Validation(
                "Google sign-in token is required".to_string(),
            ));
        }

        match self.api.google_login(provider_token).await {
            Ok(auth) => {
                let user = auth.user.clone();
                self.install(auth);
                info!("Google sign-in successful");
                Ok(user)
            }
            Err(e) => {
                error!(error = %e, "Google sign-in failed");
                Err(operation(e, MSG_GOOGLE_FAILED))
            }
        }
    }

    pub fn logout(&self) {
        self.session.clear();
        info!("Logged out");
    }

    // ===== Session Queries =====

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn token(&self) -> Option<String> {
        self.session.current_token()
    }

    pub fn stored_user_profile(&self) -> Option<UserProfile> {
        self.session.user_profile()
    }

    // ===== Profile Operations =====

    pub async fn fetch_profile(&self) -> Result<UserProfile, AuthError> {
        match self.api.fetch_profile().await {
            Ok(user) => {
                self.cache_user(user.clone());
                Ok(user)
            }
            Err(e) => {
                error!(error = %e, "Profile fetch failed");
                Err(operation(e, MSG_PROFILE_FAILED))
            }
        }
    }

    pub async fn update_profile(&self, name: &str) -> Result<UserProfile, AuthError> {
        if name.trim().is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }

        match self.api.update_profile(name.trim()).await {
            Ok(user) => {
                self.cache_user(user.clone());
                Ok(user)
            }
            Err(e) => {
                error!(error = %e, "Profile update failed");
                Err(operation(e, MSG_UPDATE_PROFILE_FAILED))
            }
        }
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if current_password.is_empty() {
            return Err(AuthError::Validation(
                "Current password is required".to_string(),
            ));
        }
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "New password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        match self.api.change_password(current_password, new_password).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "Password change failed");
                Err(operation(e, MSG_CHANGE_PASSWORD_FAILED))
            }
        }
    }

    // ===== Internal =====

    fn install(&self, auth: AuthSuccess) {
        self.persist(auth.token, Some(auth.user));
    }

    /// Install the session, treating persistence as best-effort: a flaky
    /// keychain degrades to a process-lifetime session rather than a
    /// failed login.
    fn persist(&self, token: String, user: Option<UserProfile>) {
        if let Err(e) = self.session.set_session(token, user) {
            warn!(error = %e, "Failed to persist session");
        }
    }

    fn cache_user(&self, user: UserProfile) {
        if let Err(e) = self.session.set_user(user) {
            warn!(error = %e, "Failed to persist refreshed profile");
        }
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::Validation("Email is required".to_string()));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(AuthError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(())
}

/// Map a transport failure onto the single message shown to the user:
/// server-supplied text when present, connectivity wording for network
/// trouble, the per-operation fallback otherwise.
fn operation(source: ApiError, fallback: &str) -> AuthError {
    let message = match &source {
        ApiError::Rejected { message } => message.clone(),
        ApiError::DuplicateEmail => source.to_string(),
        ApiError::Unauthorized { message: Some(m) } => m.clone(),
        ApiError::Network(e) if e.is_timeout() => MSG_TIMEOUT.to_string(),
        ApiError::Network(e) if e.is_connect() => MSG_NO_CONNECTION.to_string(),
        _ => fallback.to_string(),
    };

    AuthError::Operation {
        message,
        source: Some(source),
    }
}
