//! Command classification and argument extraction.
//!
//! Classification is purely textual: `ai:` prefix, `browser:` prefix with an
//! ordered keyword table for the sub-command, everything else is a dummy
//! command. The browser rule table is data so the precedence can be tested
//! (and read) independently of dispatch.

use meetpilot_core::ScrollDirection;
use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://\S+").unwrap());
static CLICK_TARGET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)click\s+(\S+)").unwrap());
static SCROLL_AMOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*pixels?").unwrap());

pub const DEFAULT_SCROLL_AMOUNT: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Dummy,
    Ai,
    BrowserStart,
    BrowserClose,
    BrowserNavigate,
    BrowserClick,
    BrowserScroll,
    BrowserType,
    BrowserScreenshot,
    BrowserJoinMeeting,
    /// A `browser:` command whose sub-command matched no rule.
    Unknown,
}

/// Ordered browser sub-command rules: first keyword hit wins. Keeping the
/// precedence as data means "click and scroll" classifies as a click because
/// the click rule comes first, and that ordering is directly testable.
pub const BROWSER_RULES: &[(&[&str], CommandKind)] = &[
    (&["join meeting", "join call"], CommandKind::BrowserJoinMeeting),
    (&["click"], CommandKind::BrowserClick),
    (&["scroll"], CommandKind::BrowserScroll),
    (&["type", "write"], CommandKind::BrowserType),
    (&["screenshot", "capture"], CommandKind::BrowserScreenshot),
    (&["navigate", "go to"], CommandKind::BrowserNavigate),
    (&["start browser"], CommandKind::BrowserStart),
    (&["close browser"], CommandKind::BrowserClose),
];

/// Arguments extracted from the raw text. Fields stay `None` when
/// extraction fails; the dispatcher turns that into a usage hint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArgs {
    pub prompt: Option<String>,
    pub url: Option<String>,
    pub selector: Option<String>,
    pub direction: Option<ScrollDirection>,
    pub amount_px: Option<i64>,
    pub text: Option<String>,
    pub headless: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub raw: String,
    pub kind: CommandKind,
    pub args: CommandArgs,
}

/// Classify a raw command string and extract its arguments.
pub fn parse(raw: &str) -> ParsedCommand {
    let lower = raw.to_ascii_lowercase();

    if lower.starts_with("ai:") {
        let prompt = raw[3..].trim().to_string();
        return ParsedCommand {
            raw: raw.to_string(),
            kind: CommandKind::Ai,
            args: CommandArgs {
                prompt: Some(prompt),
                ..Default::default()
            },
        };
    }

    if let Some(remainder) = strip_browser_prefix(raw) {
        let (kind, args) = parse_browser_command(remainder);
        return ParsedCommand {
            raw: raw.to_string(),
            kind,
            args,
        };
    }

    ParsedCommand {
        raw: raw.to_string(),
        kind: CommandKind::Dummy,
        args: CommandArgs::default(),
    }
}

fn strip_browser_prefix(raw: &str) -> Option<&str> {
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("browser:") {
        Some(raw["browser:".len()..].trim())
    } else {
        None
    }
}

fn parse_browser_command(remainder: &str) -> (CommandKind, CommandArgs) {
    let lower = remainder.to_ascii_lowercase();

    let kind = BROWSER_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(_, kind)| *kind)
        .unwrap_or(CommandKind::Unknown);

    let args = match kind {
        CommandKind::BrowserJoinMeeting | CommandKind::BrowserNavigate => CommandArgs {
            url: extract_url(remainder),
            ..Default::default()
        },
        CommandKind::BrowserClick => CommandArgs {
            selector: extract_click_target(remainder),
            ..Default::default()
        },
        CommandKind::BrowserScroll => CommandArgs {
            direction: Some(extract_scroll_direction(&lower)),
            amount_px: Some(extract_scroll_amount(&lower)),
            ..Default::default()
        },
        CommandKind::BrowserType => CommandArgs {
            text: extract_type_text(remainder, &lower),
            ..Default::default()
        },
        CommandKind::BrowserStart => CommandArgs {
            headless: lower.contains("headless"),
            ..Default::default()
        },
        _ => CommandArgs::default(),
    };

    (kind, args)
}

/// First http/https URL in the text, original casing preserved.
fn extract_url(text: &str) -> Option<String> {
    URL_RE.find(text).map(|m| m.as_str().to_string())
}

/// First whitespace-delimited token after the word "click".
fn extract_click_target(text: &str) -> Option<String> {
    CLICK_TARGET_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn extract_scroll_direction(lower: &str) -> ScrollDirection {
    if lower.contains("up") {
        ScrollDirection::Up
    } else if lower.contains("left") {
        ScrollDirection::Left
    } else if lower.contains("right") {
        ScrollDirection::Right
    } else if lower.contains("top") {
        ScrollDirection::Top
    } else if lower.contains("bottom") {
        ScrollDirection::Bottom
    } else {
        ScrollDirection::Down
    }
}

fn extract_scroll_amount(lower: &str) -> i64 {
    SCROLL_AMOUNT_RE
        .captures(lower)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_SCROLL_AMOUNT)
}

/// Everything after the first "type" (or "write") keyword, trimmed. An empty
/// remainder is an extraction failure.
fn extract_type_text(remainder: &str, lower: &str) -> Option<String> {
    let start = lower
        .find("type")
        .map(|i| i + "type".len())
        .or_else(|| lower.find("write").map(|i| i + "write".len()))?;
    let text = remainder[start..].trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_prefix_extracts_trimmed_prompt() {
        let cmd = parse("ai: what is the weather?");
        assert_eq!(cmd.kind, CommandKind::Ai);
        assert_eq!(cmd.args.prompt.as_deref(), Some("what is the weather?"));

        // Trim is idempotent: no surrounding whitespace survives
        let cmd = parse("AI:   spaced out   ");
        assert_eq!(cmd.kind, CommandKind::Ai);
        assert_eq!(cmd.args.prompt.as_deref(), Some("spaced out"));
    }

    #[test]
    fn plain_text_is_dummy() {
        assert_eq!(parse("hello there").kind, CommandKind::Dummy);
        assert_eq!(parse("what time is it").kind, CommandKind::Dummy);
    }

    #[test]
    fn browser_sub_classification() {
        assert_eq!(parse("browser: start browser").kind, CommandKind::BrowserStart);
        assert_eq!(parse("browser: close browser").kind, CommandKind::BrowserClose);
        assert_eq!(
            parse("browser: navigate to https://example.com").kind,
            CommandKind::BrowserNavigate
        );
        assert_eq!(
            parse("browser: go to https://example.com").kind,
            CommandKind::BrowserNavigate
        );
        assert_eq!(parse("browser: click #login").kind, CommandKind::BrowserClick);
        assert_eq!(parse("browser: scroll down").kind, CommandKind::BrowserScroll);
        assert_eq!(parse("browser: type hello").kind, CommandKind::BrowserType);
        assert_eq!(parse("browser: write hello").kind, CommandKind::BrowserType);
        assert_eq!(parse("browser: screenshot").kind, CommandKind::BrowserScreenshot);
        assert_eq!(parse("browser: capture").kind, CommandKind::BrowserScreenshot);
        assert_eq!(
            parse("browser: join meeting https://zoom.us/j/1").kind,
            CommandKind::BrowserJoinMeeting
        );
        assert_eq!(
            parse("browser: join call https://zoom.us/j/1").kind,
            CommandKind::BrowserJoinMeeting
        );
        assert_eq!(parse("browser: dance").kind, CommandKind::Unknown);
    }

    #[test]
    fn precedence_with_cooccurring_keywords() {
        // "click" outranks "scroll"
        assert_eq!(
            parse("browser: click and scroll").kind,
            CommandKind::BrowserClick
        );
        // "join meeting" outranks everything
        assert_eq!(
            parse("browser: join meeting then click something").kind,
            CommandKind::BrowserJoinMeeting
        );
        // "scroll" outranks "type"
        assert_eq!(
            parse("browser: scroll to the type field").kind,
            CommandKind::BrowserScroll
        );
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(parse("BROWSER: Click #a").kind, CommandKind::BrowserClick);
        assert_eq!(parse("Browser: SCREENSHOT").kind, CommandKind::BrowserScreenshot);
    }

    #[test]
    fn url_extraction() {
        let cmd = parse("browser: join meeting https://zoom.us/j/123456789");
        assert_eq!(cmd.args.url.as_deref(), Some("https://zoom.us/j/123456789"));

        let cmd = parse("browser: navigate to http://example.com/page?q=1");
        assert_eq!(cmd.args.url.as_deref(), Some("http://example.com/page?q=1"));

        // No URL -> extraction failure
        let cmd = parse("browser: join meeting please");
        assert_eq!(cmd.args.url, None);

        // Non-http schemes don't match
        let cmd = parse("browser: navigate to ftp://example.com");
        assert_eq!(cmd.args.url, None);
    }

    #[test]
    fn click_target_extraction() {
        let cmd = parse("browser: click button.login-btn");
        assert_eq!(cmd.args.selector.as_deref(), Some("button.login-btn"));

        let cmd = parse("browser: click   #submit then wait");
        assert_eq!(cmd.args.selector.as_deref(), Some("#submit"));

        let cmd = parse("browser: click");
        assert_eq!(cmd.args.selector, None);
    }

    #[test]
    fn scroll_extraction_with_amount() {
        let cmd = parse("browser: scroll up by 300 pixels");
        assert_eq!(cmd.args.direction, Some(ScrollDirection::Up));
        assert_eq!(cmd.args.amount_px, Some(300));

        let cmd = parse("browser: scroll left 40 pixel");
        assert_eq!(cmd.args.direction, Some(ScrollDirection::Left));
        assert_eq!(cmd.args.amount_px, Some(40));
    }

    #[test]
    fn scroll_defaults() {
        let cmd = parse("browser: scroll");
        assert_eq!(cmd.args.direction, Some(ScrollDirection::Down));
        assert_eq!(cmd.args.amount_px, Some(DEFAULT_SCROLL_AMOUNT));
    }

    #[test]
    fn scroll_to_top_and_bottom() {
        assert_eq!(
            parse("browser: scroll to top").args.direction,
            Some(ScrollDirection::Top)
        );
        assert_eq!(
            parse("browser: scroll to bottom").args.direction,
            Some(ScrollDirection::Bottom)
        );
    }

    #[test]
    fn type_extraction_preserves_case() {
        let cmd = parse("browser: type Hello World");
        assert_eq!(cmd.args.text.as_deref(), Some("Hello World"));

        let cmd = parse("browser: write Some Text");
        assert_eq!(cmd.args.text.as_deref(), Some("Some Text"));
    }

    #[test]
    fn type_without_text_is_extraction_failure() {
        let cmd = parse("browser: type");
        assert_eq!(cmd.kind, CommandKind::BrowserType);
        assert_eq!(cmd.args.text, None);

        let cmd = parse("browser: type    ");
        assert_eq!(cmd.args.text, None);
    }

    #[test]
    fn start_browser_headless_flag() {
        assert!(parse("browser: start browser headless").args.headless);
        assert!(!parse("browser: start browser").args.headless);
    }

    #[test]
    fn rule_table_precedence_order() {
        // The table itself encodes the documented precedence.
        let kinds: Vec<CommandKind> = BROWSER_RULES.iter().map(|(_, k)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                CommandKind::BrowserJoinMeeting,
                CommandKind::BrowserClick,
                CommandKind::BrowserScroll,
                CommandKind::BrowserType,
                CommandKind::BrowserScreenshot,
                CommandKind::BrowserNavigate,
                CommandKind::BrowserStart,
                CommandKind::BrowserClose,
            ]
        );
    }
}
