use meetpilot_core::Paths;
use meetpilot_storage::SessionStore;

pub async fn list() -> anyhow::Result<()> {
    let paths = Paths::new();
    let store = SessionStore::new(paths);

    let sessions = store.list()?;
    if sessions.is_empty() {
        println!("No sessions.");
        return Ok(());
    }

    for session in sessions {
        let state = if session.is_active { "active" } else { "ended" };
        println!(
            "{}  {}  started {}",
            session.session_id,
            state,
            session.started_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }
    Ok(())
}

pub async fn end(session_id: &str) -> anyhow::Result<()> {
    let paths = Paths::new();
    let store = SessionStore::new(paths);

    if store.get(session_id)?.is_none() {
        anyhow::bail!("Session not found: {}", session_id);
    }
    if store.end(session_id)? {
        println!("Session {} ended.", session_id);
    } else {
        println!("Session {} was already ended.", session_id);
    }
    Ok(())
}
