//! Browser driver adapter.
//!
//! [`Driver`] is the capability interface the dispatcher and the meeting join
//! sequences are written against. [`CdpDriver`] is the real implementation:
//! it owns at most one Chrome process at a time and drives it over CDP.

use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use meetpilot_core::config::BrowserConfig;
use meetpilot_core::{Error, PageInfo, Paths, Result, ScrollDirection};

use crate::cdp::{get_page_ws_url, wait_for_cdp_ready, CdpClient};

/// How often the element wait loops re-check the page.
const POLL_INTERVAL_MS: u64 = 200;

/// Element targeting strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Css,
    XPath,
    Id,
    Class,
    Name,
    Tag,
}

impl SelectorKind {
    /// Parse an explicit strategy name; anything unrecognized is not a
    /// strategy.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "css" => Some(Self::Css),
            "xpath" => Some(Self::XPath),
            "id" => Some(Self::Id),
            "class" => Some(Self::Class),
            "name" => Some(Self::Name),
            "tag" => Some(Self::Tag),
            _ => None,
        }
    }
}

/// A page element reference: a raw selector string plus its strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub raw: String,
    pub kind: SelectorKind,
}

impl Selector {
    pub fn css(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: SelectorKind::Css,
        }
    }

    pub fn new(raw: impl Into<String>, kind: SelectorKind) -> Self {
        Self {
            raw: raw.into(),
            kind,
        }
    }

    /// Parse a command target like `xpath=//button` or `#login`. A known
    /// `<strategy>=` prefix selects that strategy; everything else (including
    /// CSS attribute selectors containing `=`) is treated as CSS.
    pub fn from_target(target: &str) -> Self {
        if let Some((prefix, rest)) = target.split_once('=') {
            if let Some(kind) = SelectorKind::parse(prefix) {
                return Self::new(rest, kind);
            }
        }
        Self::css(target)
    }

    /// JS expression that evaluates to the element or null.
    fn locator_js(&self) -> String {
        let escaped = self.raw.replace('\\', "\\\\").replace('\'', "\\'");
        match self.kind {
            SelectorKind::Css => format!("document.querySelector('{}')", escaped),
            SelectorKind::XPath => format!(
                "document.evaluate('{}', document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                escaped
            ),
            SelectorKind::Id => format!("document.getElementById('{}')", escaped),
            SelectorKind::Class => {
                format!("document.getElementsByClassName('{}')[0] || null", escaped)
            }
            SelectorKind::Name => {
                format!("document.getElementsByName('{}')[0] || null", escaped)
            }
            SelectorKind::Tag => {
                format!("document.getElementsByTagName('{}')[0] || null", escaped)
            }
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Capability interface over the browser. The dispatcher and meeting join
/// sequences only see this trait, so tests substitute scripted fakes.
#[async_trait]
pub trait Driver: Send {
    /// Launch the browser. A no-op success while a handle is already live;
    /// never leaks a second process.
    async fn start(&mut self, headless: bool) -> Result<()>;

    fn is_started(&self) -> bool;

    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Wait up to `timeout` for the element to appear, then click it.
    async fn click(&mut self, selector: &Selector, timeout: Duration) -> Result<()>;

    /// Type into the active (focused) element.
    async fn type_text(&mut self, text: &str) -> Result<()>;

    /// Wait up to `timeout` for the element, focus it, clear it, and enter
    /// the text.
    async fn fill(&mut self, selector: &Selector, text: &str, timeout: Duration) -> Result<()>;

    async fn scroll(&mut self, direction: ScrollDirection, amount_px: i64) -> Result<()>;

    /// Capture the page; returns the path the image was written to.
    async fn screenshot(&mut self, filename: Option<&str>) -> Result<String>;

    async fn page_info(&mut self) -> Result<PageInfo>;

    /// Close the browser. Idempotent: closing an already-closed session
    /// succeeds silently.
    async fn close(&mut self) -> Result<()>;
}

struct LiveSession {
    child: Child,
    cdp: CdpClient,
    current_url: Option<String>,
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        // Best-effort kill; kill_on_drop on the Command is the backstop.
        let _ = self.child.start_kill();
    }
}

/// CDP-backed [`Driver`] owning a single Chrome/Chromium process.
pub struct CdpDriver {
    config: BrowserConfig,
    paths: Paths,
    live: Option<LiveSession>,
}

impl CdpDriver {
    pub fn new(config: BrowserConfig, paths: Paths) -> Self {
        Self {
            config,
            paths,
            live: None,
        }
    }

    fn session(&self) -> Result<&LiveSession> {
        self.live.as_ref().ok_or(Error::NotStarted)
    }

    async fn eval(&self, expression: &str) -> Result<Value> {
        self.session()?
            .cdp
            .evaluate_value(expression)
            .await
            .map_err(Error::Driver)
    }

    /// Poll until the selector resolves to an element, bounded by `timeout`.
    async fn wait_for_element(&self, selector: &Selector, timeout: Duration) -> Result<()> {
        let probe = format!("!!({})", selector.locator_js());
        let start = std::time::Instant::now();

        loop {
            if self.eval(&probe).await?.as_bool() == Some(true) {
                return Ok(());
            }
            if start.elapsed() > timeout {
                return Err(Error::ElementNotFound(selector.raw.clone()));
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }
}

#[async_trait]
impl Driver for CdpDriver {
    async fn start(&mut self, headless: bool) -> Result<()> {
        if self.live.is_some() {
            debug!("Browser already started, keeping existing handle");
            return Ok(());
        }

        let browser_path = find_browser_binary()
            .ok_or_else(|| Error::Driver("No Chrome/Chromium binary found".to_string()))?;

        let user_data_dir = self.paths.browser_data_dir().join("profile");
        std::fs::create_dir_all(&user_data_dir)
            .map_err(|e| Error::Driver(format!("Failed to create user data dir: {}", e)))?;

        let debug_port = find_free_port().await?;
        let args = build_browser_args(debug_port, &user_data_dir, headless, &self.config);

        info!(port = debug_port, headless = headless, "Launching browser");

        let child = Command::new(&browser_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Driver(format!("Failed to launch browser: {}", e)))?;

        wait_for_cdp_ready(debug_port, 15).await.map_err(Error::Driver)?;
        let ws_url = get_page_ws_url(debug_port).await.map_err(Error::Driver)?;
        let cdp = CdpClient::connect(&ws_url).await.map_err(Error::Driver)?;

        cdp.enable_domain("Page").await.map_err(Error::Driver)?;
        cdp.enable_domain("Runtime").await.map_err(Error::Driver)?;
        cdp.enable_domain("DOM").await.map_err(Error::Driver)?;

        info!(ws_url = %ws_url, "Browser started, CDP connected");

        self.live = Some(LiveSession {
            child,
            cdp,
            current_url: None,
        });
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.live.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.session()?
            .cdp
            .navigate(url)
            .await
            .map_err(Error::Driver)?;
        if let Some(live) = self.live.as_mut() {
            live.current_url = Some(url.to_string());
        }
        info!(url = %url, "Navigated");
        Ok(())
    }

    async fn click(&mut self, selector: &Selector, timeout: Duration) -> Result<()> {
        self.wait_for_element(selector, timeout).await?;

        let js = format!(
            "(function() {{ var el = {}; if (!el) return false; el.scrollIntoView({{block: 'center'}}); el.click(); return true; }})()",
            selector.locator_js()
        );
        let clicked = self.eval(&js).await?.as_bool().unwrap_or(false);
        if !clicked {
            return Err(Error::ElementNotFound(selector.raw.clone()));
        }
        debug!(selector = %selector.raw, "Clicked element");
        Ok(())
    }

    async fn type_text(&mut self, text: &str) -> Result<()> {
        self.session()?
            .cdp
            .insert_text(text)
            .await
            .map_err(Error::Driver)?;
        debug!(chars = text.len(), "Typed text into active element");
        Ok(())
    }

    async fn fill(&mut self, selector: &Selector, text: &str, timeout: Duration) -> Result<()> {
        self.wait_for_element(selector, timeout).await?;
        let js = format!(
            "(function() {{ var el = {}; if (!el) return false; el.focus(); if ('value' in el) el.value = ''; return true; }})()",
            selector.locator_js()
        );
        self.eval(&js).await?;

        self.session()?
            .cdp
            .insert_text(text)
            .await
            .map_err(Error::Driver)?;
        debug!(selector = %selector.raw, "Filled element");
        Ok(())
    }

    async fn scroll(&mut self, direction: ScrollDirection, amount_px: i64) -> Result<()> {
        let js = scroll_js(direction, amount_px);
        self.eval(&js).await?;
        debug!(direction = %direction, amount = amount_px, "Scrolled");
        Ok(())
    }

    async fn screenshot(&mut self, filename: Option<&str>) -> Result<String> {
        let base64_data = self
            .session()?
            .cdp
            .screenshot()
            .await
            .map_err(Error::Driver)?;

        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&base64_data)
            .map_err(|e| Error::Driver(format!("base64 decode: {}", e)))?;

        let name = filename
            .map(|f| f.to_string())
            .unwrap_or_else(default_screenshot_name);
        let media_dir = self.paths.media_dir();
        std::fs::create_dir_all(&media_dir)?;
        let path = media_dir.join(&name);
        std::fs::write(&path, &bytes)?;

        info!(path = %path.display(), "Screenshot saved");
        Ok(path.display().to_string())
    }

    async fn page_info(&mut self) -> Result<PageInfo> {
        let value = self
            .eval("({url: location.href, title: document.title, width: window.innerWidth, height: window.innerHeight, scrollX: window.pageXOffset, scrollY: window.pageYOffset})")
            .await?;

        Ok(PageInfo {
            url: value
                .get("url")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            title: value
                .get("title")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            window_size: (
                value.get("width").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
                value.get("height").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
            ),
            scroll_offset: (
                value.get("scrollX").and_then(|v| v.as_i64()).unwrap_or(0),
                value.get("scrollY").and_then(|v| v.as_i64()).unwrap_or(0),
            ),
        })
    }

    async fn close(&mut self) -> Result<()> {
        let Some(mut live) = self.live.take() else {
            return Ok(());
        };

        if let Err(e) = live.cdp.close_browser().await {
            debug!("Graceful browser close failed (may already be gone): {}", e);
        }
        if let Err(e) = live.child.kill().await {
            warn!("Failed to kill browser process: {}", e);
        }
        info!("Browser closed");
        Ok(())
    }
}

fn scroll_js(direction: ScrollDirection, amount_px: i64) -> String {
    match direction {
        ScrollDirection::Down => format!("window.scrollBy(0, {})", amount_px),
        ScrollDirection::Up => format!("window.scrollBy(0, -{})", amount_px),
        ScrollDirection::Left => format!("window.scrollBy(-{}, 0)", amount_px),
        ScrollDirection::Right => format!("window.scrollBy({}, 0)", amount_px),
        ScrollDirection::Top => "window.scrollTo(0, 0)".to_string(),
        ScrollDirection::Bottom => {
            "window.scrollTo(0, document.body.scrollHeight)".to_string()
        }
    }
}

fn default_screenshot_name() -> String {
    format!("screenshot_{}.png", chrono::Utc::now().timestamp())
}

fn build_browser_args(
    debug_port: u16,
    user_data_dir: &std::path::Path,
    headless: bool,
    config: &BrowserConfig,
) -> Vec<String> {
    let mut args = vec![
        format!("--remote-debugging-port={}", debug_port),
        format!("--user-data-dir={}", user_data_dir.display()),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--disable-background-networking".to_string(),
        "--disable-extensions".to_string(),
        "--disable-sync".to_string(),
    ];
    if headless {
        args.push("--headless=new".to_string());
    }
    args.push(format!(
        "--window-size={},{}",
        config.window_width, config.window_height
    ));
    args.push("about:blank".to_string());
    args
}

/// Find a Chrome/Chromium binary on the system.
pub fn find_browser_binary() -> Option<String> {
    let candidates: Vec<&str> = if cfg!(target_os = "macos") {
        vec![
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ]
    } else if cfg!(target_os = "linux") {
        vec![
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
        ]
    } else {
        vec![
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    };

    for candidate in candidates {
        if std::path::Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
        if !candidate.contains('/') && !candidate.contains('\\') && which::which(candidate).is_ok()
        {
            return Some(candidate.to_string());
        }
    }
    None
}

async fn find_free_port() -> Result<u16> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| Error::Driver(format!("Failed to bind to find free port: {}", e)))?;
    let port = listener
        .local_addr()
        .map_err(|e| Error::Driver(format!("Failed to get local addr: {}", e)))?
        .port();
    drop(listener);
    Ok(port)
}
