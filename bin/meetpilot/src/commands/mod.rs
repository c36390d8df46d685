pub mod repl;
pub mod run_cmd;
pub mod sessions_cmd;
pub mod status;
pub mod transcript_cmd;

use std::sync::Arc;

use meetpilot_browser::CdpDriver;
use meetpilot_commands::{CommandDispatcher, CommandService, SessionContext};
use meetpilot_core::{Config, Paths};
use meetpilot_providers::OpenAiBackend;
use meetpilot_storage::{SessionStore, TranscriptStore};

/// Wire the full stack for one session: config, AI backend, a fresh CDP
/// driver, and the transcript-backed command service.
pub(crate) fn build_service(paths: &Paths, config: &Config) -> CommandService {
    let ai = Arc::new(OpenAiBackend::new(&config.openai));
    let dispatcher = CommandDispatcher::new(ai, config.browser.clone());
    CommandService::new(dispatcher, TranscriptStore::new(paths.clone()))
}

pub(crate) fn build_context(
    paths: &Paths,
    config: &Config,
    session_id: String,
) -> SessionContext {
    let driver = CdpDriver::new(config.browser.clone(), paths.clone());
    SessionContext::new(session_id, Box::new(driver))
}

/// Resolve the session to use: verify the given ID exists, or create a new
/// session when none was given.
pub(crate) fn resolve_session(
    store: &SessionStore,
    requested: Option<String>,
) -> anyhow::Result<String> {
    match requested {
        Some(id) => {
            if store.get(&id)?.is_none() {
                anyhow::bail!("Session not found: {}", id);
            }
            Ok(id)
        }
        None => Ok(store.create()?.session_id),
    }
}
