use meetpilot_core::Paths;
use meetpilot_storage::TranscriptStore;

pub async fn run(session_id: &str) -> anyhow::Result<()> {
    let paths = Paths::new();
    let store = TranscriptStore::new(paths);

    let transcript = store.transcript(session_id)?;
    if transcript.records.is_empty() {
        println!("No transcript for session {}.", session_id);
        return Ok(());
    }

    println!(
        "Session {} ({} commands)",
        transcript.session_id, transcript.total_commands
    );
    println!();
    for record in &transcript.records {
        let tag = if record.is_ai_response { "ai" } else { "  " };
        println!(
            "[{}] {} ({}ms)",
            record.timestamp.format("%H:%M:%S"),
            record.command_text,
            record.processing_time_ms,
        );
        println!("  {} {}", tag, record.response);
    }
    Ok(())
}
