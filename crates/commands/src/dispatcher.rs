//! Command dispatch: one parsed command in, one normalized result out.
//!
//! The dispatcher never propagates errors. Every failure is rendered as
//! plain-English guidance in the `CommandResult`, and the caller decides
//! what to do with it.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use meetpilot_browser::{join_meeting, Driver, MeetingJoinRequest, Selector};
use meetpilot_core::config::BrowserConfig;
use meetpilot_core::{CommandResult, ScrollDirection};
use meetpilot_providers::AiBackend;

use crate::parser::{parse, CommandKind, ParsedCommand, DEFAULT_SCROLL_AMOUNT};

const NOT_STARTED_HINT: &str = "Browser not started. Use 'browser: start browser' first";
const UNKNOWN_BROWSER_HINT: &str =
    "I don't understand that browser command. Try: join meeting, click, scroll, type, screenshot, navigate";
const JOIN_USAGE_HINT: &str =
    "Please provide a meeting URL. Example: browser: join meeting https://zoom.us/j/123456789";
const NAVIGATE_USAGE_HINT: &str =
    "Please provide a URL. Example: browser: navigate to https://google.com";
const CLICK_USAGE_HINT: &str =
    "Please specify what to click. Example: browser: click button.login-btn";
const TYPE_USAGE_HINT: &str = "Please specify text to type. Example: browser: type Hello World";

/// Session-scoped command context. Each logical session owns its browser
/// resource; the mutex keeps a misbehaving caller from racing the handle.
pub struct SessionContext {
    pub session_id: String,
    driver: Mutex<Box<dyn Driver>>,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, driver: Box<dyn Driver>) -> Self {
        Self {
            session_id: session_id.into(),
            driver: Mutex::new(driver),
        }
    }

    /// Close the session's browser if one is running.
    pub async fn shutdown(&self) {
        let mut driver = self.driver.lock().await;
        if let Err(e) = driver.close().await {
            warn!(error = %e, "Failed to close browser on shutdown");
        }
    }
}

pub struct CommandDispatcher {
    ai: Arc<dyn AiBackend>,
    browser_config: BrowserConfig,
}

impl CommandDispatcher {
    pub fn new(ai: Arc<dyn AiBackend>, browser_config: BrowserConfig) -> Self {
        Self { ai, browser_config }
    }

    /// Process one raw command. Total: always returns a result, never errors.
    pub async fn process(&self, ctx: &SessionContext, raw: &str) -> CommandResult {
        let command = parse(raw);
        info!(session_id = %ctx.session_id, kind = ?command.kind, "Dispatching command");

        match command.kind {
            CommandKind::Dummy => dummy_response(raw),
            CommandKind::Ai => self.handle_ai(command.args.prompt.unwrap_or_default()).await,
            CommandKind::Unknown => CommandResult::failed(UNKNOWN_BROWSER_HINT),
            _ => self.handle_browser(ctx, &command).await,
        }
    }

    async fn handle_ai(&self, prompt: String) -> CommandResult {
        if !self.ai.is_configured() {
            return CommandResult::failed("AI service not configured");
        }
        match self.ai.complete(&prompt).await {
            Ok(text) => CommandResult::ai(text),
            Err(e) => {
                warn!(error = %e, "AI completion failed");
                CommandResult::failed(format!("AI service error: {}", e))
            }
        }
    }

    async fn handle_browser(
        &self,
        ctx: &SessionContext,
        command: &ParsedCommand,
    ) -> CommandResult {
        let mut driver = ctx.driver.lock().await;

        match command.kind {
            CommandKind::BrowserStart => {
                if driver.is_started() {
                    return CommandResult::ok("Browser is already running");
                }
                match driver.start(command.args.headless).await {
                    Ok(()) => CommandResult::ok("Browser started successfully"),
                    Err(e) => {
                        warn!(error = %e, "Browser launch failed");
                        CommandResult::failed("Failed to start browser")
                    }
                }
            }

            CommandKind::BrowserClose => match driver.close().await {
                Ok(()) => CommandResult::ok("Browser closed successfully"),
                Err(e) => {
                    warn!(error = %e, "Browser close failed");
                    CommandResult::failed("Failed to close browser")
                }
            },

            CommandKind::BrowserNavigate => {
                let Some(url) = command.args.url.as_deref() else {
                    return CommandResult::failed(NAVIGATE_USAGE_HINT);
                };
                if let Err(result) = self.ensure_started(driver.as_mut()).await {
                    return result;
                }
                match driver.navigate(url).await {
                    Ok(()) => CommandResult::ok(format!("Navigated to {}", url)),
                    Err(e) => {
                        warn!(error = %e, url = %url, "Navigation failed");
                        CommandResult::failed(format!("Failed to navigate to {}", url))
                    }
                }
            }

            CommandKind::BrowserJoinMeeting => {
                let Some(url) = command.args.url.clone() else {
                    return CommandResult::failed(JOIN_USAGE_HINT);
                };
                if let Err(result) = self.ensure_started(driver.as_mut()).await {
                    return result;
                }
                let request = MeetingJoinRequest::new(url.clone());
                let outcome = join_meeting(driver.as_mut(), &request, &self.browser_config).await;
                if outcome.success {
                    CommandResult::ok(format!("Successfully joined meeting at {}", url))
                } else {
                    CommandResult::failed(format!("Failed to join meeting: {}", outcome.message))
                }
            }

            CommandKind::BrowserClick => {
                let Some(target) = command.args.selector.as_deref() else {
                    return CommandResult::failed(CLICK_USAGE_HINT);
                };
                if !driver.is_started() {
                    return CommandResult::failed(NOT_STARTED_HINT);
                }
                let selector = Selector::from_target(target);
                let timeout = Duration::from_secs(self.browser_config.click_timeout_secs);
                match driver.click(&selector, timeout).await {
                    Ok(()) => CommandResult::ok(format!("Clicked {}", target)),
                    Err(e) => CommandResult::failed(format!("Failed to click: {}", e)),
                }
            }

            CommandKind::BrowserScroll => {
                if !driver.is_started() {
                    return CommandResult::failed(NOT_STARTED_HINT);
                }
                let direction = command.args.direction.unwrap_or(ScrollDirection::Down);
                let amount = command.args.amount_px.unwrap_or(DEFAULT_SCROLL_AMOUNT);
                match driver.scroll(direction, amount).await {
                    Ok(()) => {
                        CommandResult::ok(format!("Scrolled {} by {} pixels", direction, amount))
                    }
                    Err(e) => CommandResult::failed(format!("Failed to scroll: {}", e)),
                }
            }

            CommandKind::BrowserType => {
                let Some(text) = command.args.text.as_deref() else {
                    return CommandResult::failed(TYPE_USAGE_HINT);
                };
                if !driver.is_started() {
                    return CommandResult::failed(NOT_STARTED_HINT);
                }
                match driver.type_text(text).await {
                    Ok(()) => CommandResult::ok(format!("Typed: {}", text)),
                    Err(e) => CommandResult::failed(format!("Failed to type: {}", e)),
                }
            }

            CommandKind::BrowserScreenshot => {
                if !driver.is_started() {
                    return CommandResult::failed(NOT_STARTED_HINT);
                }
                match driver.screenshot(None).await {
                    Ok(path) => CommandResult::ok(format!("Screenshot saved as {}", path)),
                    Err(e) => CommandResult::failed(format!("Failed to take screenshot: {}", e)),
                }
            }

            // Dummy / Ai / Unknown are handled in `process`.
            _ => CommandResult::failed(UNKNOWN_BROWSER_HINT),
        }
    }

    /// Auto-start a browser for navigate/join when none is active.
    async fn ensure_started(
        &self,
        driver: &mut dyn Driver,
    ) -> std::result::Result<(), CommandResult> {
        if driver.is_started() {
            return Ok(());
        }
        driver
            .start(self.browser_config.headless)
            .await
            .map_err(|e| {
                warn!(error = %e, "Browser auto-start failed");
                CommandResult::failed("Failed to start browser")
            })
    }
}

/// Canned responses for commands without an `ai:` or `browser:` prefix.
fn dummy_response(raw: &str) -> CommandResult {
    let lower = raw.to_ascii_lowercase();

    if lower.contains("hello") {
        CommandResult::ok("Hello! How can I assist you today?")
    } else if lower.contains("time") {
        let now = chrono::Local::now().format("%H:%M:%S");
        CommandResult::ok(format!("The current time is {}", now))
    } else if lower.contains("help") {
        CommandResult::ok(
            "I can help you with:\n- Basic commands: hello, time, help\n- AI responses: ai: your question\n- Browser control: browser: join meeting, click, scroll, type, screenshot",
        )
    } else {
        CommandResult::ok(
            "I'm not sure how to respond to that yet. Try saying 'help' for available commands.",
        )
    }
}
