mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "meetpilot")]
#[command(about = "Text-command driven browser and meeting automation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive command session (type `exit` to quit)
    Repl {
        /// Resume an existing session instead of creating one
        #[arg(short, long)]
        session: Option<String>,

        /// Run the browser headless
        #[arg(long)]
        headless: bool,
    },

    /// Run a single command against a session
    Run {
        /// Command text, e.g. "browser: join meeting https://zoom.us/j/123"
        command: String,

        /// Session ID (a new session is created if omitted)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Manage sessions
    Sessions {
        #[command(subcommand)]
        command: SessionsCommands,
    },

    /// Print the stored transcript of a session
    Transcript {
        /// Session ID
        session_id: String,
    },

    /// Show configuration and environment diagnostics
    Status,
}

#[derive(Subcommand)]
enum SessionsCommands {
    /// List all sessions
    List,
    /// Mark a session as ended
    End {
        /// Session ID
        session_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Repl { session, headless } => {
            commands::repl::run(session, headless).await?;
        }
        Commands::Run { command, session } => {
            commands::run_cmd::run(&command, session).await?;
        }
        Commands::Sessions { command } => match command {
            SessionsCommands::List => {
                commands::sessions_cmd::list().await?;
            }
            SessionsCommands::End { session_id } => {
                commands::sessions_cmd::end(&session_id).await?;
            }
        },
        Commands::Transcript { session_id } => {
            commands::transcript_cmd::run(&session_id).await?;
        }
        Commands::Status => {
            commands::status::run().await?;
        }
    }

    Ok(())
}
