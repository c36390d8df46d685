use serde::{Deserialize, Serialize};

/// The normalized outcome of one processed command. Every dispatch branch
/// produces exactly one of these; failures are rendered as plain text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandResult {
    pub response: String,
    pub is_ai_response: bool,
    pub success: bool,
}

impl CommandResult {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            is_ai_response: false,
            success: true,
        }
    }

    pub fn failed(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            is_ai_response: false,
            success: false,
        }
    }

    pub fn ai(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            is_ai_response: true,
            success: true,
        }
    }
}

/// One append-only transcript row per processed command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub session_id: String,
    pub command_text: String,
    pub response: String,
    pub is_ai_response: bool,
    pub processing_time_ms: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Snapshot of the current page, as reported by the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
    pub window_size: (u32, u32),
    pub scroll_offset: (i64, i64),
}

/// Scroll directions recognized by the command grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
    Top,
    Bottom,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl std::fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
