//! EazyJobs command line client
//!
//! Sign in, start scrapes on the scraping service, watch them finish and keep
//! the job links worth coming back to.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use eazyjobs::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cmd;
mod context;

use context::AppContext;

#[derive(Parser)]
#[command(name = "eazyjobs")]
#[command(about = "Run job-listing scrapes and keep the links you care about")]
#[command(version)]
struct Cli {
    /// Scraping service URL (overrides EAZYJOBS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in (prompts for anything not given)
    Login {
        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out and forget the saved session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Start a scrape and wait for it to finish
    Scrape {
        /// Search keyword
        keyword: String,

        /// Number of posts to collect (1-200)
        #[arg(short = 'n', long)]
        target_posts: Option<u32>,
    },

    /// List every result the service holds
    Results,

    /// Show one result with a preview of its links
    View { keyword: String },

    /// Delete a result on the service
    Delete { keyword: String },

    /// Save every link of a result as a saved job
    Save { keyword: String },

    /// Show dashboard statistics
    Stats,

    /// List keywords the service has results for
    Keywords,

    /// Manage saved job links
    #[command(subcommand)]
    Saved(cmd::saved::SavedCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    let ctx = AppContext::new(config, cli.quiet);

    match cli.command {
        Commands::Login { email, password } => cmd::auth::login(&ctx, email, password),
        Commands::Logout => cmd::auth::logout(&ctx),
        Commands::Whoami => cmd::auth::whoami(&ctx),
        Commands::Scrape {
            keyword,
            target_posts,
        } => cmd::scrape::run(&ctx, &keyword, target_posts).await,
        Commands::Results => cmd::results::list(&ctx).await,
        Commands::View { keyword } => cmd::results::view(&ctx, &keyword).await,
        Commands::Delete { keyword } => cmd::results::delete(&ctx, &keyword).await,
        Commands::Save { keyword } => cmd::results::save(&ctx, &keyword).await,
        Commands::Stats => cmd::results::stats(&ctx).await,
        Commands::Keywords => cmd::results::keywords(&ctx).await,
        Commands::Saved(cmd) => cmd::saved::run(&ctx, cmd).await,
    }
}
