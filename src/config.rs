//! Environment-sourced harness configuration

use std::fmt;

use crate::error::{HarnessError, HarnessResult};

/// Login credentials supplied by the environment.
///
/// Read-only input; the harness never persists these.
#[derive(Clone)]
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
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Configuration for a harness run.
///
/// Resolved once before any harness operation; missing credentials fail
/// here rather than midway through a test.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base URL of the application under test
    pub base_url: String,

    /// Login credentials
    pub credentials: Credentials,

    /// Run the browser headless
    pub headless: bool,

    /// Log filter passed to `init_logging`
    pub log_filter: String,
}

impl HarnessConfig {
    /// Build the configuration from process environment variables.
    ///
    /// `BASE_URL`, `TEST_USERNAME` and `TEST_PASSWORD` are required;
    /// `HEADLESS` and `LOG_FILTER` are optional.
    pub fn from_env() -> HarnessResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> HarnessResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            get(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| HarnessError::MissingConfig(key.to_string()))
        };

        Ok(Self {
            base_url: require("BASE_URL")?,
            credentials: Credentials {
                username: require("TEST_USERNAME")?,
                password: require("TEST_PASSWORD")?,
            },
            headless: get("HEADLESS").map(|v| v != "false").unwrap_or(true),
            log_filter: get("LOG_FILTER").unwrap_or_else(|| "info".to_string()),
        })
    }
}
