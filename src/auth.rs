//! Authentication resolver for the UI login surface
//!
//! The deployment's login surface is not predictable: a session may already
//! be authenticated, the credential form may sit inline on the page, or it
//! may live inside an embedded frame. Resolution is an explicit state
//! machine over those three topologies rather than a chain of best-effort
//! probes:
//!
//! ```text
//! Start → DetectingTopology → { AlreadyAuthenticated
//!                             | LoginOnPage
//!                             | LoginInFrame } → Submitting
//!       → { Authenticated | Failed }
//! ```

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::error::{HarnessError, HarnessResult};
use crate::session::{AuthState, Session};
use crate::ui::{Scope, UiDriver};

/// Selectors for the login surface and the authenticated-state signal.
///
/// Defaults fit the Control Room deployment; override per environment.
#[derive(Debug, Clone)]
pub struct LoginSelectors {
    pub username: String,
    pub password: String,
    pub submit: String,

    /// Element that is only visible once authenticated. Its appearance is
    /// the sole success criterion for login.
    pub landmark: String,

    /// Region where the application renders login errors.
    pub error_region: String,

    /// The iframe that may host the login form.
    pub login_frame: String,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            username: "#username, input[name=\"username\"]".to_string(),
            password: "#password, input[name=\"password\"]".to_string(),
            submit: "button[type=\"submit\"]".to_string(),
            landmark: "[href*=\"/automation\"]".to_string(),
            error_region: "[role=\"alert\"], .error-message".to_string(),
            login_frame: "iframe[src*=\"login\"]".to_string(),
        }
    }
}

/// Which of the three login surface shapes applies to this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topology {
    AlreadyAuthenticated,
    LoginOnPage,
    LoginInFrame,
}

/// Brings a browser session from unknown state to authenticated.
///
/// Owns its driver and [`Session`] for the duration of one test; neither is
/// shared across concurrent tests.
pub struct AuthResolver<D: UiDriver> {
    driver: D,
    selectors: LoginSelectors,
    session: Session,

    /// Bounded wait for the landmark during detection.
    detect_timeout: Duration,

    /// Bounded wait for each credential-field probe.
    probe_timeout: Duration,

    /// Generous wait for the landmark after submitting.
    auth_timeout: Duration,
}

impl<D: UiDriver> AuthResolver<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            selectors: LoginSelectors::default(),
            session: Session::new(),
            detect_timeout: Duration::from_secs(3),
            probe_timeout: Duration::from_secs(2),
            auth_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_selectors(mut self, selectors: LoginSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_timeouts(mut self, detect: Duration, probe: Duration, auth: Duration) -> Self {
        self.detect_timeout = detect;
        self.probe_timeout = probe;
        self.auth_timeout = auth;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The underlying driver, for page objects reusing this session.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Navigate to the application root, where the login surface lives.
    pub async fn goto(&mut self, url: &str) -> HarnessResult<()> {
        self.driver.goto(url).await
    }

    /// Resolve the session to authenticated.
    ///
    /// Idempotent: on an already-authenticated session this returns
    /// immediately without touching the driver.
    pub async fn login(&mut self, credentials: &Credentials) -> HarnessResult<()> {
        if self.session.is_authenticated() {
            debug!("Session already authenticated, login is a no-op");
            return Ok(());
        }

        self.session.state = AuthState::Authenticating;

        match self.resolve(credentials).await {
            Ok(()) => {
                self.session.state = AuthState::Authenticated;
                info!("UI session authenticated");
                Ok(())
            }
            Err(err) => {
                warn!("Authentication failed: {}", err);
                self.session.fail(err.to_string());
                Err(err)
            }
        }
    }

    async fn resolve(&mut self, credentials: &Credentials) -> HarnessResult<()> {
        let topology = self.detect_topology().await?;
        debug!("Login topology: {:?}", topology);

        let scope = match topology {
            Topology::AlreadyAuthenticated => return Ok(()),
            Topology::LoginOnPage => Scope::Page,
            Topology::LoginInFrame => Scope::frame(&self.selectors.login_frame),
        };

        // Username then password, then one discrete submit action
        self.driver
            .fill(&scope, &self.selectors.username, &credentials.username)
            .await?;
        self.driver
            .fill(&scope, &self.selectors.password, &credentials.password)
            .await?;
        self.driver.click(&scope, &self.selectors.submit).await?;

        // Landmark visibility is the sole success criterion; the URL can
        // keep a stale path across single-page navigation.
        if self
            .driver
            .wait_visible(&Scope::Page, &self.selectors.landmark, self.auth_timeout)
            .await?
        {
            return Ok(());
        }

        let last_url = self.driver.current_url().await?;
        let error_text = self
            .driver
            .text_content(&Scope::Page, &self.selectors.error_region)
            .await?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Err(HarnessError::AuthenticationTimeout {
            last_url,
            error_text,
        })
    }

    /// Probe the page in priority order: authenticated landmark, framed
    /// credential fields, inline credential fields. Neither found means
    /// there is nothing to drive; fail fast instead of waiting out the
    /// full authentication timeout.
    async fn detect_topology(&mut self) -> HarnessResult<Topology> {
        if self
            .driver
            .wait_visible(&Scope::Page, &self.selectors.landmark, self.detect_timeout)
            .await?
        {
            return Ok(Topology::AlreadyAuthenticated);
        }

        let frame = Scope::frame(&self.selectors.login_frame);
        if self
            .driver
            .wait_visible(&frame, &self.selectors.username, self.probe_timeout)
            .await?
        {
            return Ok(Topology::LoginInFrame);
        }

        if self
            .driver
            .wait_visible(&Scope::Page, &self.selectors.username, self.probe_timeout)
            .await?
        {
            return Ok(Topology::LoginOnPage);
        }

        Err(HarnessError::LoginFormNotFound)
    }
}
