//! Meeting join sequences for the supported video-call platforms.
//!
//! Each platform gets a fixed sequence of driver actions. The sequence is an
//! explicit state machine ([`JoinPhase`]) so a caller can see how far a
//! failed join got: the earlier clicks may already have registered with the
//! remote meeting server, and nothing here rolls them back.

use std::time::Duration;

use meetpilot_core::config::BrowserConfig;
use tracing::{info, warn};

use crate::driver::{Driver, Selector};

const ZOOM_JOIN_BUTTON: &str = "button[data-testid='join-button']";
const ZOOM_MEETING_ID_INPUT: &str = "input[placeholder*='Meeting ID']";
const ZOOM_PASSWORD_INPUT: &str = "input[placeholder*='Password']";
const MEET_JOIN_BUTTON: &str = "button[data-mdc-dialog-action='join']";
const MEET_CAMERA_BUTTON: &str = "button[data-mdc-dialog-action='camera']";
const TEAMS_JOIN_BUTTON: &str = "button[data-testid='join-button']";

/// What the caller asked to join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingJoinRequest {
    pub url: String,
    pub meeting_id: Option<String>,
    pub password: Option<String>,
}

impl MeetingJoinRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            meeting_id: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingPlatform {
    Zoom,
    GoogleMeet,
    Teams,
    Generic,
}

impl MeetingPlatform {
    /// Detect the platform from the meeting URL.
    pub fn detect(url: &str) -> Self {
        if url.contains("zoom.us") {
            Self::Zoom
        } else if url.contains("meet.google.com") {
            Self::GoogleMeet
        } else if url.contains("teams.microsoft.com") {
            Self::Teams
        } else {
            Self::Generic
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Zoom => "Zoom",
            Self::GoogleMeet => "Google Meet",
            Self::Teams => "Teams",
            Self::Generic => "Generic",
        }
    }
}

/// Progress states of a join sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JoinPhase {
    NotStarted,
    Navigated,
    DialogJoined,
    CredentialsEntered,
    Joined,
    Failed,
}

/// The result of a join attempt. `reached` is the last phase that completed,
/// so a failed Zoom join that got through the credential inputs reports
/// `CredentialsEntered` even though `phase` is `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub success: bool,
    pub message: String,
    pub phase: JoinPhase,
    pub reached: JoinPhase,
}

impl JoinOutcome {
    fn joined(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            phase: JoinPhase::Joined,
            reached: JoinPhase::Joined,
        }
    }

    fn failed(platform: MeetingPlatform, cause: impl std::fmt::Display, reached: JoinPhase) -> Self {
        Self {
            success: false,
            message: format!("{} join failed: {}", platform.name(), cause),
            phase: JoinPhase::Failed,
            reached,
        }
    }
}

/// Navigate to the meeting URL and run the platform join sequence.
///
/// Partial progress is not rolled back: if the password step fails after the
/// meeting id was entered, the browser is left mid-flow and the outcome
/// reports the phase that was reached.
pub async fn join_meeting(
    driver: &mut dyn Driver,
    request: &MeetingJoinRequest,
    config: &BrowserConfig,
) -> JoinOutcome {
    let platform = MeetingPlatform::detect(&request.url);
    info!(url = %request.url, platform = platform.name(), "Joining meeting");

    if let Err(e) = driver.navigate(&request.url).await {
        warn!(error = %e, "Meeting navigation failed");
        return JoinOutcome::failed(platform, e, JoinPhase::NotStarted);
    }

    // Let the page settle before looking for join controls.
    tokio::time::sleep(Duration::from_millis(config.navigation_settle_ms)).await;

    let primary = Duration::from_secs(config.click_timeout_secs);
    let secondary = Duration::from_secs(config.secondary_timeout_secs);

    match platform {
        MeetingPlatform::Zoom => join_zoom(driver, request, primary, secondary).await,
        MeetingPlatform::GoogleMeet => join_google_meet(driver, primary, secondary).await,
        MeetingPlatform::Teams => join_teams(driver, primary).await,
        MeetingPlatform::Generic => {
            JoinOutcome::joined(format!("Joined meeting at {}", request.url))
        }
    }
}

async fn join_zoom(
    driver: &mut dyn Driver,
    request: &MeetingJoinRequest,
    primary: Duration,
    secondary: Duration,
) -> JoinOutcome {
    let platform = MeetingPlatform::Zoom;
    let join_button = Selector::css(ZOOM_JOIN_BUTTON);

    if let Err(e) = driver.click(&join_button, primary).await {
        return JoinOutcome::failed(platform, e, JoinPhase::Navigated);
    }
    let mut reached = JoinPhase::DialogJoined;

    if let Some(meeting_id) = &request.meeting_id {
        let id_input = Selector::css(ZOOM_MEETING_ID_INPUT);
        if let Err(e) = driver.fill(&id_input, meeting_id, primary).await {
            return JoinOutcome::failed(platform, e, reached);
        }
        reached = JoinPhase::CredentialsEntered;
    }

    if let Some(password) = &request.password {
        let password_input = Selector::css(ZOOM_PASSWORD_INPUT);
        if let Err(e) = driver.fill(&password_input, password, secondary).await {
            return JoinOutcome::failed(platform, e, reached);
        }
        reached = JoinPhase::CredentialsEntered;
    }

    // The join control re-renders after credentials are entered; click again.
    if let Err(e) = driver.click(&join_button, primary).await {
        return JoinOutcome::failed(platform, e, reached);
    }

    JoinOutcome::joined("Joined Zoom meeting successfully")
}

async fn join_google_meet(
    driver: &mut dyn Driver,
    primary: Duration,
    secondary: Duration,
) -> JoinOutcome {
    let platform = MeetingPlatform::GoogleMeet;

    if let Err(e) = driver.click(&Selector::css(MEET_JOIN_BUTTON), primary).await {
        return JoinOutcome::failed(platform, e, JoinPhase::Navigated);
    }

    // The camera toggle failing still fails the whole join, even though the
    // join dialog click above already went through.
    if let Err(e) = driver
        .click(&Selector::css(MEET_CAMERA_BUTTON), secondary)
        .await
    {
        return JoinOutcome::failed(platform, e, JoinPhase::DialogJoined);
    }

    JoinOutcome::joined("Joined Google Meet successfully")
}

async fn join_teams(driver: &mut dyn Driver, primary: Duration) -> JoinOutcome {
    let platform = MeetingPlatform::Teams;

    if let Err(e) = driver.click(&Selector::css(TEAMS_JOIN_BUTTON), primary).await {
        return JoinOutcome::failed(platform, e, JoinPhase::Navigated);
    }

    JoinOutcome::joined("Joined Teams meeting successfully")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meetpilot_core::{Error, PageInfo, Result, ScrollDirection};
    use std::collections::HashSet;

    /// Scripted driver: records calls, fails actions whose selector is in
    /// the `missing` set.
    struct FakeDriver {
        started: bool,
        missing: HashSet<String>,
        calls: Vec<String>,
    }

    impl FakeDriver {
        fn new() -> Self {
            Self {
                started: true,
                missing: HashSet::new(),
                calls: Vec::new(),
            }
        }

        fn with_missing(selectors: &[&str]) -> Self {
            let mut fake = Self::new();
            fake.missing = selectors.iter().map(|s| s.to_string()).collect();
            fake
        }
    }

    #[async_trait]
    impl Driver for FakeDriver {
        async fn start(&mut self, _headless: bool) -> Result<()> {
            self.started = true;
            self.calls.push("start".to_string());
            Ok(())
        }

        fn is_started(&self) -> bool {
            self.started
        }

        async fn navigate(&mut self, url: &str) -> Result<()> {
            self.calls.push(format!("navigate {}", url));
            Ok(())
        }

        async fn click(&mut self, selector: &Selector, _timeout: Duration) -> Result<()> {
            self.calls.push(format!("click {}", selector.raw));
            if self.missing.contains(&selector.raw) {
                return Err(Error::ElementNotFound(selector.raw.clone()));
            }
            Ok(())
        }

        async fn type_text(&mut self, text: &str) -> Result<()> {
            self.calls.push(format!("type {}", text));
            Ok(())
        }

        async fn fill(&mut self, selector: &Selector, text: &str, _timeout: Duration) -> Result<()> {
            self.calls.push(format!("fill {} = {}", selector.raw, text));
            if self.missing.contains(&selector.raw) {
                return Err(Error::ElementNotFound(selector.raw.clone()));
            }
            Ok(())
        }

        async fn scroll(&mut self, _direction: ScrollDirection, _amount_px: i64) -> Result<()> {
            self.calls.push("scroll".to_string());
            Ok(())
        }

        async fn screenshot(&mut self, _filename: Option<&str>) -> Result<String> {
            self.calls.push("screenshot".to_string());
            Ok("screenshot.png".to_string())
        }

        async fn page_info(&mut self) -> Result<PageInfo> {
            Err(Error::Driver("not scripted".to_string()))
        }

        async fn close(&mut self) -> Result<()> {
            self.started = false;
            self.calls.push("close".to_string());
            Ok(())
        }
    }

    fn fast_config() -> BrowserConfig {
        BrowserConfig {
            navigation_settle_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn platform_detection() {
        assert_eq!(
            MeetingPlatform::detect("https://zoom.us/j/123456789"),
            MeetingPlatform::Zoom
        );
        assert_eq!(
            MeetingPlatform::detect("https://meet.google.com/abc-defg-hij"),
            MeetingPlatform::GoogleMeet
        );
        assert_eq!(
            MeetingPlatform::detect("https://teams.microsoft.com/l/meetup-join/xyz"),
            MeetingPlatform::Teams
        );
        assert_eq!(
            MeetingPlatform::detect("https://example.com/room/1"),
            MeetingPlatform::Generic
        );
    }

    #[tokio::test]
    async fn zoom_happy_path_with_credentials() {
        let mut driver = FakeDriver::new();
        let request = MeetingJoinRequest {
            url: "https://zoom.us/j/123456789".to_string(),
            meeting_id: Some("123456789".to_string()),
            password: Some("secret".to_string()),
        };

        let outcome = join_meeting(&mut driver, &request, &fast_config()).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Joined Zoom meeting successfully");
        assert_eq!(outcome.phase, JoinPhase::Joined);

        // Join button clicked, both credentials filled, join clicked again.
        assert_eq!(
            driver.calls,
            vec![
                "navigate https://zoom.us/j/123456789".to_string(),
                format!("click {}", ZOOM_JOIN_BUTTON),
                format!("fill {} = 123456789", ZOOM_MEETING_ID_INPUT),
                format!("fill {} = secret", ZOOM_PASSWORD_INPUT),
                format!("click {}", ZOOM_JOIN_BUTTON),
            ]
        );
    }

    #[tokio::test]
    async fn zoom_password_failure_keeps_entered_id() {
        let mut driver = FakeDriver::with_missing(&[ZOOM_PASSWORD_INPUT]);
        let request = MeetingJoinRequest {
            url: "https://zoom.us/j/123456789".to_string(),
            meeting_id: Some("123456789".to_string()),
            password: Some("secret".to_string()),
        };

        let outcome = join_meeting(&mut driver, &request, &fast_config()).await;
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("Zoom join failed:"));
        assert_eq!(outcome.phase, JoinPhase::Failed);
        // The meeting id step completed before the password step failed.
        assert_eq!(outcome.reached, JoinPhase::CredentialsEntered);
    }

    #[tokio::test]
    async fn google_meet_camera_failure_fails_join() {
        let mut driver = FakeDriver::with_missing(&[MEET_CAMERA_BUTTON]);
        let request = MeetingJoinRequest::new("https://meet.google.com/abc-defg-hij");

        let outcome = join_meeting(&mut driver, &request, &fast_config()).await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("Google Meet join failed"));
        assert_eq!(outcome.reached, JoinPhase::DialogJoined);
    }

    #[tokio::test]
    async fn google_meet_happy_path() {
        let mut driver = FakeDriver::new();
        let request = MeetingJoinRequest::new("https://meet.google.com/abc-defg-hij");

        let outcome = join_meeting(&mut driver, &request, &fast_config()).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Joined Google Meet successfully");
    }

    #[tokio::test]
    async fn teams_join_clicks_once() {
        let mut driver = FakeDriver::new();
        let request = MeetingJoinRequest::new("https://teams.microsoft.com/l/meetup-join/xyz");

        let outcome = join_meeting(&mut driver, &request, &fast_config()).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Joined Teams meeting successfully");
        let clicks = driver.calls.iter().filter(|c| c.starts_with("click")).count();
        assert_eq!(clicks, 1);
    }

    #[tokio::test]
    async fn generic_url_counts_as_joined() {
        let mut driver = FakeDriver::new();
        let request = MeetingJoinRequest::new("https://example.com/room/1");

        let outcome = join_meeting(&mut driver, &request, &fast_config()).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Joined meeting at https://example.com/room/1");
        // No platform-specific clicks for unknown hosts.
        assert!(!driver.calls.iter().any(|c| c.starts_with("click")));
    }

    #[tokio::test]
    async fn zoom_join_button_missing_reports_navigated() {
        let mut driver = FakeDriver::with_missing(&[ZOOM_JOIN_BUTTON]);
        let request = MeetingJoinRequest::new("https://zoom.us/j/987");

        let outcome = join_meeting(&mut driver, &request, &fast_config()).await;
        assert!(!outcome.success);
        assert_eq!(outcome.reached, JoinPhase::Navigated);
    }
}
