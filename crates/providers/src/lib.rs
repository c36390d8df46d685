pub mod openai;

use async_trait::async_trait;
use meetpilot_core::Result;

/// One-shot completion backend for `ai:` commands.
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Whether the backend has credentials to call out with.
    fn is_configured(&self) -> bool;

    /// Complete a prompt and return the trimmed response text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub use openai::OpenAiBackend;
