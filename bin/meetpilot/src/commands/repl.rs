use meetpilot_core::{Config, Paths};
use meetpilot_storage::SessionStore;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

pub async fn run(session: Option<String>, headless: bool) -> anyhow::Result<()> {
    let paths = Paths::new();
    paths.ensure_dirs()?;
    let mut config = Config::load_or_default(&paths);
    if headless {
        config.browser.headless = true;
    }

    let store = SessionStore::new(paths.clone());
    let session_id = super::resolve_session(&store, session)?;
    info!(session_id = %session_id, "Session ready");

    let service = super::build_service(&paths, &config);
    let ctx = super::build_context(&paths, &config, session_id.clone());

    println!("meetpilot session {}", session_id);
    println!("Type a command ('help' for examples, 'exit' to quit).");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let (result, _status) = service.execute(&ctx, line).await;
        println!("{}", result.response);
    }

    ctx.shutdown().await;
    println!("Bye.");
    Ok(())
}
