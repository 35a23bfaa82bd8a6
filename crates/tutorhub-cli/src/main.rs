use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

mod commands;

/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "TUTORHUB_LOG";

#[derive(Parser)]
#[command(name = "tutorhub")]
#[command(about = "tutorhub - inspect and drive the marketplace login session", long_about = None)]
struct Cli {
    /// Directory holding config.toml and storage.json (default: ~/.config/tutorhub)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stored session
    Status,
    /// Record a login issued by the marketplace
    Login {
        /// User id
        #[arg(long)]
        id: String,
        /// The user has the teacher role
        #[arg(long)]
        teacher: bool,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        nickname: Option<String>,
        /// Bearer token sent to the API
        #[arg(long)]
        token: String,
        #[arg(long)]
        refresh_token: Option<String>,
    },
    /// Log out and erase stored tokens
    Logout,
    /// Fetch the identity of a restored session from the API
    Refresh,
    /// Evaluate the route guard for a location
    Check {
        /// Location to navigate to, e.g. /teacher/dashboard
        path: String,
    },
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let context = commands::Context::open(cli.data_dir.as_deref())?;
    init_tracing(&context.config.log_level);

    match cli.command {
        Commands::Status => commands::status::run(&context)?,
        Commands::Login {
            id,
            teacher,
            username,
            nickname,
            token,
            refresh_token,
        } => commands::login::run(
            &context,
            commands::login::LoginArgs {
                id,
                teacher,
                username,
                nickname,
                token,
                refresh_token,
            },
        )?,
        Commands::Logout => commands::logout::run(&context)?,
        Commands::Refresh => commands::refresh::run(&context).await?,
        Commands::Check { path } => commands::check::run(&context, &path).await?,
    }

    Ok(())
}
