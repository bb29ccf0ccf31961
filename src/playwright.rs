//! Playwright browser automation
//!
//! Drives one persistent browser session through a generated node driver
//! script. The script keeps a single page (cookies, local storage, frames)
//! alive for the whole test and services commands over stdin/stdout as
//! line-delimited JSON, one command in flight at a time.

use std::process::{Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tracing::{debug, info};

use async_trait::async_trait;

use crate::error::{HarnessError, HarnessResult};
use crate::ui::{Scope, UiDriver};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Configuration for the browser session.
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
        }
    }
}

#[derive(Serialize)]
struct DriverCmd<'a> {
    id: u64,
    op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selector: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
}

impl<'a> DriverCmd<'a> {
    fn new(id: u64, op: &'static str) -> Self {
        Self {
            id,
            op,
            url: None,
            selector: None,
            frame: None,
            value: None,
            timeout_ms: None,
        }
    }
}

#[derive(Deserialize)]
struct DriverReply {
    id: u64,
    ok: bool,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Handle to the node/Playwright subprocess implementing [`UiDriver`].
pub struct PlaywrightDriver {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    base_url: String,
    next_id: u64,
    // Keeps the generated driver script alive for the child's lifetime
    _script_dir: tempfile::TempDir,
}

impl PlaywrightDriver {
    /// Launch the browser session.
    pub async fn spawn(config: PlaywrightConfig) -> HarnessResult<Self> {
        Self::check_playwright_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, build_driver_script(&config))?;

        debug!("Spawning Playwright driver: {}", script_path.display());

        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| HarnessError::Driver(format!("Failed to spawn node: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| HarnessError::Driver("Driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::Driver("Driver stdout unavailable".to_string()))?;

        let mut driver = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            next_id: 0,
            _script_dir: script_dir,
        };

        driver.wait_ready().await?;
        info!("Browser session ready ({})", config.browser.as_str());
        Ok(driver)
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> HarnessResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(HarnessError::PlaywrightNotFound),
        }
    }

    async fn wait_ready(&mut self) -> HarnessResult<()> {
        let ready = tokio::time::timeout(STARTUP_TIMEOUT, async {
            while let Some(line) = self.stdout.next_line().await? {
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(&line) {
                    if value.get("ready").and_then(|v| v.as_bool()) == Some(true) {
                        return Ok(true);
                    }
                }
            }
            Ok::<bool, std::io::Error>(false)
        })
        .await
        .map_err(|_| HarnessError::Driver("Browser startup timed out".to_string()))??;

        if ready {
            Ok(())
        } else {
            Err(HarnessError::Driver(
                "Driver exited before becoming ready".to_string(),
            ))
        }
    }

    async fn send(&mut self, cmd: DriverCmd<'_>) -> HarnessResult<DriverReply> {
        let id = cmd.id;
        let mut line = serde_json::to_string(&cmd)?;
        line.push('\n');

        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        loop {
            let line = self
                .stdout
                .next_line()
                .await?
                .ok_or_else(|| HarnessError::Driver("Driver exited unexpectedly".to_string()))?;

            let reply: DriverReply = match serde_json::from_str(&line) {
                Ok(reply) => reply,
                // Non-protocol output (browser noise) is skipped
                Err(_) => continue,
            };

            if reply.id != id {
                continue;
            }
            if reply.ok {
                return Ok(reply);
            }
            return Err(HarnessError::Driver(
                reply.error.unwrap_or_else(|| "unknown driver error".to_string()),
            ));
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url, url)
        }
    }

    /// Shut the browser down and reap the subprocess.
    pub async fn close(mut self) -> HarnessResult<()> {
        let cmd = DriverCmd::new(self.next_id(), "close");
        // The driver exits on close; a broken pipe here is fine
        let _ = self.send(cmd).await;
        let _ = self.child.wait().await;
        Ok(())
    }
}

fn frame_of(scope: &Scope) -> Option<&str> {
    match scope {
        Scope::Page => None,
        Scope::Frame(selector) => Some(selector),
    }
}

#[async_trait]
impl UiDriver for PlaywrightDriver {
    async fn goto(&mut self, url: &str) -> HarnessResult<()> {
        let url = self.absolute_url(url);
        let mut cmd = DriverCmd::new(self.next_id(), "goto");
        cmd.url = Some(&url);
        self.send(cmd).await?;
        Ok(())
    }

    async fn current_url(&mut self) -> HarnessResult<String> {
        let cmd = DriverCmd::new(self.next_id(), "url");
        let reply = self.send(cmd).await?;
        reply
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| HarnessError::Driver("Driver returned no URL".to_string()))
    }

    async fn wait_visible(
        &mut self,
        scope: &Scope,
        selector: &str,
        timeout: Duration,
    ) -> HarnessResult<bool> {
        let mut cmd = DriverCmd::new(self.next_id(), "wait_visible");
        cmd.selector = Some(selector);
        cmd.frame = frame_of(scope);
        cmd.timeout_ms = Some(timeout.as_millis() as u64);
        let reply = self.send(cmd).await?;
        Ok(reply.value.as_ref().and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn fill(&mut self, scope: &Scope, selector: &str, value: &str) -> HarnessResult<()> {
        let mut cmd = DriverCmd::new(self.next_id(), "fill");
        cmd.selector = Some(selector);
        cmd.frame = frame_of(scope);
        cmd.value = Some(value);
        self.send(cmd).await?;
        Ok(())
    }

    async fn click(&mut self, scope: &Scope, selector: &str) -> HarnessResult<()> {
        let mut cmd = DriverCmd::new(self.next_id(), "click");
        cmd.selector = Some(selector);
        cmd.frame = frame_of(scope);
        self.send(cmd).await?;
        Ok(())
    }

    async fn text_content(
        &mut self,
        scope: &Scope,
        selector: &str,
    ) -> HarnessResult<Option<String>> {
        let mut cmd = DriverCmd::new(self.next_id(), "text");
        cmd.selector = Some(selector);
        cmd.frame = frame_of(scope);
        let reply = self.send(cmd).await?;
        Ok(reply
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .map(String::from))
    }
}

/// Generate the node driver script for this configuration.
fn build_driver_script(config: &PlaywrightConfig) -> String {
    format!(
        r#"const {{ chromium, firefox, webkit }} = require('playwright');
const readline = require('readline');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  const scopeOf = (frame) => frame ? page.frameLocator(frame) : page;
  const reply = (obj) => process.stdout.write(JSON.stringify(obj) + '\n');

  reply({{ ready: true }});

  const rl = readline.createInterface({{ input: process.stdin }});
  for await (const line of rl) {{
    if (!line.trim()) continue;
    const cmd = JSON.parse(line);
    try {{
      let value = null;
      switch (cmd.op) {{
        case 'goto':
          await page.goto(cmd.url, {{ waitUntil: 'domcontentloaded' }});
          break;
        case 'url':
          value = page.url();
          break;
        case 'wait_visible':
          try {{
            await scopeOf(cmd.frame).locator(cmd.selector).first()
              .waitFor({{ state: 'visible', timeout: cmd.timeout_ms }});
            value = true;
          }} catch (e) {{
            value = false;
          }}
          break;
        case 'fill':
          await scopeOf(cmd.frame).locator(cmd.selector).first().fill(cmd.value);
          break;
        case 'click':
          await scopeOf(cmd.frame).locator(cmd.selector).first().click();
          break;
        case 'text':
          value = await scopeOf(cmd.frame).locator(cmd.selector).first()
            .textContent({{ timeout: 1000 }}).catch(() => null);
          break;
        case 'close':
          reply({{ id: cmd.id, ok: true }});
          await browser.close();
          process.exit(0);
        default:
          throw new Error('unknown op: ' + cmd.op);
      }}
      reply({{ id: cmd.id, ok: true, value }});
    }} catch (error) {{
      reply({{ id: cmd.id, ok: false, error: String(error && error.message || error) }});
    }}
  }}
  await browser.close();
}})();
"#,
        browser = config.browser.as_str(),
        headless = config.headless,
        width = config.viewport_width,
        height = config.viewport_height,
    )
}
