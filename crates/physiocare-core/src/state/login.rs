//! Login screen.

use std::sync::Arc;

use physiocare_claims::{parse_claims, TokenClaims};
use tracing::warn;

use super::{describe, StateCell, ViewState};
use crate::models::{LoginResponse, Role, SessionData};
use crate::repository::PhysioRepository;

pub const LOGIN_FAILED: &str = "Login failed";
pub const MISSING_CREDENTIALS: &str = "Username and password are required";

pub struct LoginViewModel {
    repo: Arc<PhysioRepository>,
    state: StateCell<SessionData>,
}

impl LoginViewModel {
    pub fn new(repo: Arc<PhysioRepository>) -> Self {
        Self {
            repo,
            state: StateCell::default(),
        }
    }

    pub fn state(&self) -> &StateCell<SessionData> {
        &self.state
    }

    /// Authenticate and persist the session on success.
    ///
    /// Blank credentials fail without contacting the backend.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionData, String> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return self.state.resolve(Err(MISSING_CREDENTIALS.to_string()));
        }

        self.state.set(ViewState::Loading);
        let result = self.authenticate(username.trim(), password).await;
        self.state.resolve(result)
    }

    /// Clear the session and return to `Idle`.
    pub async fn logout(&self) -> Result<(), String> {
        match self.repo.logout().await {
            Ok(()) => {
                self.state.set(ViewState::Idle);
                Ok(())
            }
            Err(e) => self.state.resolve(Err(describe(&e))).map(|_| ()),
        }
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<SessionData, String> {
        let response = self
            .repo
            .login(username, password)
            .await
            .map_err(|e| describe(&e))?;

        if !response.ok {
            return Err(response.error.unwrap_or_else(|| LOGIN_FAILED.to_string()));
        }

        let session = session_from_response(response, username)?;
        self.repo
            .session()
            .save_session(
                session.token.as_deref().unwrap_or_default(),
                session.username.as_deref().unwrap_or_default(),
                session.user_id.as_deref().unwrap_or_default(),
                session.role,
            )
            .map_err(|e| {
                warn!(error = %e, "could not persist session");
                super::UNEXPECTED_ERROR.to_string()
            })?;

        Ok(session)
    }
}

/// Build the session tuple from a successful login.
///
/// Fields the backend left out are recovered from the token's claims.
fn session_from_response(response: LoginResponse, username: &str) -> Result<SessionData, String> {
    let token = non_empty(response.token).ok_or_else(|| LOGIN_FAILED.to_string())?;

    let claims = match parse_claims(&token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, "token claims unreadable");
            TokenClaims::default()
        }
    };

    let user_id = non_empty(response.user_id).or(non_empty(claims.id));
    let role = non_empty(response.rol)
        .or(non_empty(claims.role))
        .and_then(|r| Role::parse(&r));
    let username = non_empty(response.login)
        .or(non_empty(claims.login))
        .unwrap_or_else(|| username.to_string());

    Ok(SessionData {
        token: Some(token),
        username: Some(username),
        user_id,
        role,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
