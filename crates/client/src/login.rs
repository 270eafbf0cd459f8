//! Sign-in flow.
//!
//! Credentials are checked locally (both fields present) before the gateway is
//! called. Keeping the returned token is the caller's concern.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::Serialize;

use flogin_core::SessionId;

use crate::notify::{StateBus, Subscription};

pub const USERNAME_BLANK_MESSAGE: &str = "username must not be blank";
pub const PASSWORD_BLANK_MESSAGE: &str = "password must not be blank";

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// First missing field wins, matching the server's behaviour.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err(USERNAME_BLANK_MESSAGE);
        }
        if self.password.trim().is_empty() {
            return Err(PASSWORD_BLANK_MESSAGE);
        }
        Ok(())
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token issued on successful sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The server refused the credentials; carries its message.
    #[error("{0}")]
    Rejected(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server error ({0}): {1}")]
    Server(u16, String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Shown when the server refuses a sign-in without a message.
pub const LOGIN_REJECTED_MESSAGE: &str = "login rejected";

impl AuthError {
    /// Message to show under the login form. Never empty.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Rejected(msg) if msg.trim().is_empty() => LOGIN_REJECTED_MESSAGE.to_string(),
            AuthError::Rejected(msg) => msg.trim().to_string(),
            AuthError::Server(status, msg) if msg.trim().is_empty() => {
                format!("server error ({status})")
            }
            AuthError::Server(_, msg) => msg.trim().to_string(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, AuthError>;
}

#[async_trait]
impl<A> AuthGateway for Arc<A>
where
    A: AuthGateway + ?Sized,
{
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, AuthError> {
        (**self).login(credentials).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginStatus {
    #[default]
    Idle,
    Submitting,
    Failed(String),
    Authenticated(AuthToken),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    id: SessionId,
    username: String,
    status: LoginStatus,
}

impl LoginSession {
    fn new() -> Self {
        Self {
            id: SessionId::new(),
            username: String::new(),
            status: LoginStatus::Idle,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Username of the last attempt.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn status(&self) -> &LoginStatus {
        &self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            LoginStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&AuthToken> {
        match &self.status {
            LoginStatus::Authenticated(token) => Some(token),
            _ => None,
        }
    }
}

pub struct LoginController<A> {
    gateway: A,
    session: Mutex<LoginSession>,
    bus: StateBus<LoginSession>,
}

impl<A> LoginController<A>
where
    A: AuthGateway,
{
    pub fn new(gateway: A) -> Self {
        Self {
            gateway,
            session: Mutex::new(LoginSession::new()),
            bus: StateBus::new(),
        }
    }

    pub fn session(&self) -> LoginSession {
        self.lock().clone()
    }

    pub fn subscribe(&self) -> Subscription<LoginSession> {
        self.bus.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LoginSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut LoginSession) -> Option<R>) -> Option<R> {
        let mut session = self.lock();
        let out = f(&mut *session)?;
        // Published under the lock so subscribers see transitions in order.
        self.bus.publish(session.clone());
        Some(out)
    }

    /// Attempt to sign in. Returns the resulting status.
    pub async fn submit(&self, credentials: Credentials) -> LoginStatus {
        let checked = credentials.validate();
        let session = self.mutate(|s| {
            s.username = credentials.username.clone();
            s.status = match checked {
                Ok(()) => LoginStatus::Submitting,
                Err(msg) => LoginStatus::Failed(msg.to_string()),
            };
            Some(s.id)
        });

        if let Err(msg) = checked {
            tracing::debug!(reason = msg, "login rejected locally");
            return LoginStatus::Failed(msg.to_string());
        }

        let next = match self.gateway.login(&credentials).await {
            Ok(token) => {
                tracing::info!(username = %credentials.username, "signed in");
                LoginStatus::Authenticated(token)
            }
            Err(err) => {
                tracing::warn!(username = %credentials.username, error = %err, "sign-in failed");
                LoginStatus::Failed(err.user_message())
            }
        };

        let applied = self.mutate(|s| {
            if Some(s.id) != session {
                return None;
            }
            s.status = next.clone();
            Some(())
        });
        if applied.is_none() {
            tracing::debug!("login form reset while signing in; ignoring result");
        }

        next
    }

    /// Start over with a fresh, idle form.
    pub fn reset(&self) {
        self.mutate(|s| {
            *s = LoginSession::new();
            Some(())
        });
    }
}
