use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::supabase::{self, SupabaseClient};

/// Identity resolved from a session token. Never persisted locally; looked up
/// fresh from the provider on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
}

/// Identity as reported back from signup, including whether the address has
/// been verified yet.
#[derive(Debug, Clone, Serialize)]
pub struct SignupUser {
    pub id: String,
    pub email: String,
    pub email_confirmed: bool,
}

/// Result of the signup flow. `access_token` is `None` when the provider
/// deferred the session until email verification and auto-confirm did not run
/// or did not succeed.
#[derive(Debug, Clone)]
pub struct SignupOutcome {
    pub user: SignupUser,
    pub access_token: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserIdentity,
    pub access_token: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    #[error("This email is already registered. Please login instead.")]
    AlreadyRegistered,
    #[error("Signup error: {0}")]
    SignupFailed(String),
    #[error("Please verify your email before logging in. Check your inbox for the verification link.")]
    EmailNotConfirmed,
    #[error("Invalid email or password. Please check your credentials and try again.")]
    InvalidCredentials,
    #[error("No account found with this email. Please sign up first.")]
    NoSuchAccount,
    #[error("Login error: {0}")]
    LoginFailed(String),
}

/// External service of record for accounts, credentials and sessions.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn signup(&self, email: &str, password: &str) -> Result<SignupOutcome, IdentityError>;

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, IdentityError>;

    /// Resolve a bearer token to an identity. Must never fail outward: any
    /// provider error (expired, malformed, revoked, transport) collapses to
    /// `None` so the caller sees a single "unresolved" outcome.
    async fn resolve(&self, token: &str) -> Option<UserIdentity>;
}

/// Supabase GoTrue adapter. The `admin` client is present only when a service
/// role key is configured and is used exclusively for the auto-confirm step.
pub struct SupabaseIdentityProvider {
    client: SupabaseClient,
    admin: Option<SupabaseClient>,
}

impl SupabaseIdentityProvider {
    pub fn new(client: SupabaseClient, admin: Option<SupabaseClient>) -> Self {
        Self { client, admin }
    }

    /// Best-effort post-step after a signup that did not grant a session:
    /// mark the account verified with the elevated key, then log in normally
    /// to obtain one. Any failure is logged and the verification-pending flow
    /// continues.
    async fn try_auto_confirm(
        &self,
        admin: &SupabaseClient,
        user_id: &str,
        email: &str,
        password: &str,
    ) -> Option<SignupOutcome> {
        let confirm = admin
            .request_as_key(Method::PUT, &format!("/auth/v1/admin/users/{user_id}"))
            .json(&json!({ "email_confirm": true }))
            .send()
            .await;

        match confirm {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "auto-confirm rejected by provider");
                return None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "auto-confirm request failed");
                return None;
            }
        }

        match self.login(email, password).await {
            Ok(login) => Some(SignupOutcome {
                user: SignupUser {
                    id: login.user.id,
                    email: login.user.email,
                    email_confirmed: true,
                },
                access_token: Some(login.access_token),
                message: "Account created and verified successfully!".to_string(),
            }),
            Err(err) => {
                tracing::warn!(error = %err, "login after auto-confirm failed");
                None
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityProvider {
    async fn signup(&self, email: &str, password: &str) -> Result<SignupOutcome, IdentityError> {
        let resp = self
            .client
            .request(Method::POST, "/auth/v1/signup")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| IdentityError::SignupFailed(e.to_string()))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| IdentityError::SignupFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_signup_error(&body));
        }

        let outcome = outcome_from_signup_body(&body)?;
        if outcome.access_token.is_some() {
            return Ok(outcome);
        }

        // No session granted: email verification is pending upstream.
        if let Some(admin) = &self.admin {
            if let Some(confirmed) = self
                .try_auto_confirm(admin, &outcome.user.id, email, password)
                .await
            {
                return Ok(confirmed);
            }
        }

        Ok(outcome)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, IdentityError> {
        let resp = self
            .client
            .request(Method::POST, "/auth/v1/token?grant_type=password")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| IdentityError::LoginFailed(e.to_string()))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| IdentityError::LoginFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_login_error(&body));
        }

        let access_token = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| IdentityError::LoginFailed("no session in provider response".to_string()))?
            .to_string();
        let user = identity_from(body.get("user").unwrap_or(&Value::Null))
            .ok_or_else(|| IdentityError::LoginFailed("no user in provider response".to_string()))?;

        Ok(LoginOutcome { user, access_token })
    }

    async fn resolve(&self, token: &str) -> Option<UserIdentity> {
        let resp = self
            .client
            .request(Method::GET, "/auth/v1/user")
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| tracing::debug!(error = %err, "token resolution request failed"))
            .ok()?;

        if !resp.status().is_success() {
            return None;
        }

        let body: Value = resp.json().await.ok()?;
        identity_from(&body)
    }
}

fn identity_from(value: &Value) -> Option<UserIdentity> {
    Some(UserIdentity {
        id: value.get("id")?.as_str()?.to_string(),
        email: value.get("email")?.as_str()?.to_string(),
    })
}

/// Builds the signup outcome from a successful provider response. GoTrue
/// returns a session object (`access_token` + `user`) when confirmation is
/// disabled, or the bare user object when verification is pending.
fn outcome_from_signup_body(body: &Value) -> Result<SignupOutcome, IdentityError> {
    if let Some(token) = body.get("access_token").and_then(Value::as_str) {
        let user = identity_from(body.get("user").unwrap_or(&Value::Null))
            .ok_or_else(|| IdentityError::SignupFailed("no user in provider response".to_string()))?;
        return Ok(SignupOutcome {
            user: SignupUser {
                id: user.id,
                email: user.email,
                email_confirmed: true,
            },
            access_token: Some(token.to_string()),
            message: "Account created successfully!".to_string(),
        });
    }

    let user = identity_from(body)
        .ok_or_else(|| IdentityError::SignupFailed("no user in provider response".to_string()))?;
    let email_confirmed = body
        .get("email_confirmed_at")
        .map(|v| !v.is_null())
        .unwrap_or(false);

    Ok(SignupOutcome {
        user: SignupUser {
            id: user.id,
            email: user.email,
            email_confirmed,
        },
        access_token: None,
        message: "Please check your email to verify your account.".to_string(),
    })
}

/// Maps a signup failure body onto the error taxonomy. Prefers the structured
/// `error_code`; falls back to matching the human-readable message for
/// provider versions that omit it. All message matching lives here and in
/// `classify_login_error` so the heuristic has a single point of change.
fn classify_signup_error(body: &Value) -> IdentityError {
    if let Some(code) = supabase::error_code(body) {
        if matches!(code, "user_already_exists" | "email_exists") {
            return IdentityError::AlreadyRegistered;
        }
    }

    let message = supabase::error_message(body);
    if message.to_lowercase().contains("already registered") {
        return IdentityError::AlreadyRegistered;
    }
    IdentityError::SignupFailed(message)
}

fn classify_login_error(body: &Value) -> IdentityError {
    if let Some(code) = supabase::error_code(body) {
        match code {
            "email_not_confirmed" => return IdentityError::EmailNotConfirmed,
            "invalid_credentials" => return IdentityError::InvalidCredentials,
            "user_not_found" => return IdentityError::NoSuchAccount,
            _ => {}
        }
    }

    let message = supabase::error_message(body);
    let lower = message.to_lowercase();
    if lower.contains("email not confirmed") || lower.contains("email_not_confirmed") {
        IdentityError::EmailNotConfirmed
    } else if lower.contains("invalid") || lower.contains("credentials") {
        IdentityError::InvalidCredentials
    } else if lower.contains("user not found") {
        IdentityError::NoSuchAccount
    } else {
        IdentityError::LoginFailed(message)
    }
}
