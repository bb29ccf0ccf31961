//! Error types for the E2E harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("API client used before init()")]
    ClientNotInitialized,

    #[error("API client used after dispose()")]
    ClientDisposed,

    #[error("Authentication rejected with status {status}")]
    AuthenticationRejected { status: u16 },

    #[error("Timed out waiting for authenticated state at {last_url}{}",
        .error_text.as_deref().map(|t| format!(" (page error: {t})")).unwrap_or_default())]
    AuthenticationTimeout {
        last_url: String,
        error_text: Option<String>,
    },

    #[error("No login form found on page or in embedded frame")]
    LoginFormNotFound,

    #[error("Login response did not contain a token field")]
    TokenMissing,

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Browser driver error: {0}")]
    Driver(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_timeout_message_includes_context() {
        let err = HarnessError::AuthenticationTimeout {
            last_url: "https://host/#/login".to_string(),
            error_text: Some("Invalid credentials".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://host/#/login"));
        assert!(msg.contains("Invalid credentials"));

        let bare = HarnessError::AuthenticationTimeout {
            last_url: "https://host/#/login".to_string(),
            error_text: None,
        };
        assert!(!bare.to_string().contains("page error"));
    }
}
