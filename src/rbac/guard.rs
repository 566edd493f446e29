use serde::{Deserialize, Serialize};

use super::role::{is_allowed, Role};

/// The signed-in principal, as handed out by the auth boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Freshness of the session as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Authenticated(Session),
    Unauthenticated,
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

impl From<Option<Session>> for SessionState {
    fn from(session: Option<Session>) -> Self {
        match session {
            Some(session) => SessionState::Authenticated(session),
            None => SessionState::Unauthenticated,
        }
    }
}

/// Outcome of evaluating a protected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still resolving: show a loading indicator, neither content nor redirect.
    Pending,
    /// No session: redirect to sign-in.
    Unauthenticated,
    /// Session present but role too low: render the access-denied fallback.
    Forbidden { role: Role, required: Role },
    Granted(Session),
}

impl GuardDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, GuardDecision::Granted(_))
    }
}

/// Decide access for a view that requires `required`.
///
/// Pure: evaluated fresh on every navigation, nothing is cached.
pub fn guard(state: &SessionState, required: Role) -> GuardDecision {
    match state {
        SessionState::Loading => GuardDecision::Pending,
        SessionState::Unauthenticated => GuardDecision::Unauthenticated,
        SessionState::Authenticated(session) if is_allowed(session.role, required) => {
            GuardDecision::Granted(session.clone())
        }
        SessionState::Authenticated(session) => {
            tracing::warn!(
                email = %session.email,
                role = %session.role,
                required = %required,
                "access denied"
            );
            GuardDecision::Forbidden {
                role: session.role,
                required,
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn session_with(role: Role) -> Session {
    Session {
        user_id: format!("{}-id", role),
        email: format!("{}@academy.test", role),
        name: format!("Test {}", role),
        role,
        avatar_url: None,
    }
}
