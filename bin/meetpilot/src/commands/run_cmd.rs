use meetpilot_core::{Config, Paths};
use meetpilot_storage::SessionStore;

pub async fn run(command: &str, session: Option<String>) -> anyhow::Result<()> {
    let paths = Paths::new();
    paths.ensure_dirs()?;
    let config = Config::load_or_default(&paths);

    let store = SessionStore::new(paths.clone());
    let session_id = super::resolve_session(&store, session)?;

    let service = super::build_service(&paths, &config);
    let ctx = super::build_context(&paths, &config, session_id.clone());

    let (result, _status) = service.execute(&ctx, command).await;
    println!("{}", result.response);

    ctx.shutdown().await;
    if result.success {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
