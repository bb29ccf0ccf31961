//! Control Room E2E Test Harness
//!
//! This crate drives a third-party web application end to end through a
//! browser-automation driver and a companion HTTP API:
//! - Resolves an unpredictable login surface (already authenticated, inline
//!   form, or form inside an embedded frame) to an authenticated session
//! - Wraps the REST API with token lifecycle and uniform response handling
//! - Provides retry/backoff, condition polling, and unique resource naming
//!   so non-deterministic UI/API interactions stay reliable
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  E2E Harness (Rust)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AuthResolver (UI state machine)                            │
//! │    Start → DetectingTopology                                │
//! │          → {AlreadyAuthenticated|LoginOnPage|LoginInFrame}  │
//! │          → Submitting → {Authenticated|Failed}              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ApiClient                                                  │
//! │    init / login / get / post / put / patch / delete         │
//! │    ApiResponse { status, body: Json|Text, headers }         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  UiDriver trait ── PlaywrightDriver (node subprocess,       │
//! │                    line-delimited JSON protocol)            │
//! │  retry / wait_for_condition / unique_name / TestDataDir    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod naming;
pub mod pages;
pub mod playwright;
pub mod retry;
pub mod session;
pub mod testdata;
pub mod ui;

pub use api::{ApiClient, ApiResponse, ResponseBody};
pub use auth::{AuthResolver, LoginSelectors};
pub use config::{Credentials, HarnessConfig};
pub use error::{HarnessError, HarnessResult};
pub use session::{AuthState, Session, TokenStore};
pub use ui::{Scope, UiDriver};

use tracing_subscriber::EnvFilter;

/// Initialize logging for a harness run.
///
/// The filter comes from [`HarnessConfig`] rather than ambient process
/// state, so each run declares its own verbosity. Safe to call more than
/// once; later calls are ignored.
pub fn init_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .try_init();
}
