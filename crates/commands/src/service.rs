//! Session-facing command service: dispatch plus timing and transcript
//! logging.

use std::time::Instant;
use tracing::{debug, warn};

use meetpilot_core::{CommandRecord, CommandResult};
use meetpilot_storage::TranscriptStore;

use crate::dispatcher::{CommandDispatcher, SessionContext};

pub struct CommandService {
    dispatcher: CommandDispatcher,
    transcripts: TranscriptStore,
}

impl CommandService {
    pub fn new(dispatcher: CommandDispatcher, transcripts: TranscriptStore) -> Self {
        Self {
            dispatcher,
            transcripts,
        }
    }

    /// Run one command for a session: dispatch, measure processing time,
    /// append the exchange to the session transcript, and return the result
    /// with an HTTP-style status hint. Processed commands are 200 even when
    /// they report a failure in text; only an empty command is 400.
    pub async fn execute(&self, ctx: &SessionContext, raw: &str) -> (CommandResult, u16) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return (CommandResult::failed("Command text is required"), 400);
        }

        let started = Instant::now();
        let result = self.dispatcher.process(ctx, trimmed).await;
        let processing_time_ms = started.elapsed().as_millis() as u64;
        debug!(
            session_id = %ctx.session_id,
            processing_time_ms,
            success = result.success,
            "Command processed"
        );

        let record = CommandRecord {
            session_id: ctx.session_id.clone(),
            command_text: trimmed.to_string(),
            response: result.response.clone(),
            is_ai_response: result.is_ai_response,
            processing_time_ms,
            timestamp: chrono::Utc::now(),
        };
        // Logging is best effort: a full disk should not break the session.
        if let Err(e) = self.transcripts.append(&record) {
            warn!(error = %e, session_id = %ctx.session_id, "Failed to append transcript record");
        }

        (result, 200)
    }
}
