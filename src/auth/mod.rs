//! User registration, login and bearer-token authentication.

mod password;
mod token;

pub use password::PasswordService;
pub use token::{Claims, TokenService};

use crate::config::AuthSettings;
use crate::error::{RecapError, Result};
use crate::store::{Store, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Email and password as submitted to `/signup` and `/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Public view of a user inside a session response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
}

/// An issued access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub user: SessionUser,
}

impl Session {
    fn bearer(access_token: String, email: &str) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            user: SessionUser {
                email: email.to_string(),
            },
        }
    }
}

/// Authentication service over a user store.
pub struct AuthService {
    store: Arc<dyn Store>,
    passwords: PasswordService,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self {
            store,
            passwords: PasswordService::new(),
            tokens,
        }
    }

    /// Build from settings. The signing secret is mandatory.
    pub fn from_settings(store: Arc<dyn Store>, settings: &AuthSettings) -> Result<Self> {
        let secret = settings
            .secret_key
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                RecapError::Config(
                    "auth.secret_key is not set. Set SECRET_KEY or add it to the config file."
                        .to_string(),
                )
            })?;

        Ok(Self::new(
            store,
            TokenService::new(secret, settings.token_ttl_minutes),
        ))
    }

    /// Register a new user and issue a token.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn signup(&self, credentials: &Credentials) -> Result<Session> {
        let email = credentials.email.trim();
        if !validator::validate_email(email) {
            return Err(RecapError::Validation(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
        if credentials.password.is_empty() {
            return Err(RecapError::Validation("Password must not be empty".to_string()));
        }

        let hashed = self.passwords.hash_off_thread(&credentials.password).await?;
        let user = self.store.create_user(email, &hashed).await?;
        info!("Registered user {}", user.id);

        let token = self.tokens.create_token(&user.email)?;
        Ok(Session::bearer(token, &user.email))
    }

    /// Verify credentials and issue a token.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let email = credentials.email.trim();
        let Some(user) = self.store.find_user_by_email(email).await? else {
            warn!("Login for unknown email");
            return Err(RecapError::InvalidCredentials);
        };

        if !self
            .passwords
            .verify_off_thread(&credentials.password, &user.hashed_password)
            .await?
        {
            warn!("Login with wrong password");
            return Err(RecapError::InvalidCredentials);
        }

        let token = self.tokens.create_token(&user.email)?;
        Ok(Session::bearer(token, &user.email))
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.tokens.verify_token(token)?;
        self.store
            .find_user_by_email(&claims.sub)
            .await?
            .ok_or_else(|| RecapError::Unauthorized("Could not validate credentials".to_string()))
    }
}
