//! Session state and bearer-token storage

/// Authentication state of one test's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated,
    Failed,
}

/// Holds the optional bearer token and derives the authorization header.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    token: Option<String>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn get(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn clear(&mut self) {
        self.token = None;
    }

    /// `Bearer <token>` header value, or None when unauthenticated.
    /// Requests without a token send no authorization header at all.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }
}

/// Ephemeral per-test session, owned by exactly one resolver or client.
#[derive(Debug, Default)]
pub struct Session {
    pub state: AuthState,
    pub tokens: TokenStore,
    pub last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.state = AuthState::Failed;
        self.last_error = Some(reason.into());
    }
}
