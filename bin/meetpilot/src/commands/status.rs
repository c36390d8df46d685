use meetpilot_browser::driver::find_browser_binary;
use meetpilot_core::{Config, Paths};
use meetpilot_storage::SessionStore;

pub async fn run() -> anyhow::Result<()> {
    let paths = Paths::new();

    println!("meetpilot status");
    println!("================");
    println!();

    let config_path = paths.config_file();
    let config_exists = config_path.exists();
    println!(
        "Config:   {} {}",
        config_path.display(),
        if config_exists { "✓" } else { "✗ (not found)" }
    );

    let config = Config::load_or_default(&paths);

    match find_browser_binary() {
        Some(path) => println!("Browser:  {} ✓", path),
        None => println!("Browser:  ✗ no Chrome/Chromium binary found"),
    }

    if config.openai.api_key.is_empty() {
        println!("AI:       ✗ no API key (model {})", config.openai.model);
    } else {
        println!("AI:       ✓ configured (model {})", config.openai.model);
    }

    let sessions = SessionStore::new(paths.clone()).list().unwrap_or_default();
    let active = sessions.iter().filter(|s| s.is_active).count();
    println!("Sessions: {} total, {} active", sessions.len(), active);

    if !config_exists {
        println!();
        println!(
            "Edit {} to set an OpenAI API key for `ai:` commands.",
            config_path.display()
        );
    }
    Ok(())
}
