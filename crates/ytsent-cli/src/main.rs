mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ytsent")]
#[command(about = "YouTube comment sentiment from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a full analysis for a video page and print each panel state
    Analyze {
        /// Video page URL (watch, youtu.be or embed link)
        page_url: String,
    },
    /// Submit an analysis job and print its handle
    Submit {
        /// 11-character video id
        video_id: String,
    },
    /// Read the status of a job
    Status {
        /// Job handle returned by `submit`
        job_id: String,
        /// Keep polling until the job completes or fails
        #[arg(long)]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = ytsent_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze { page_url } => commands::run_analyze(&config, &page_url).await,
        Commands::Submit { video_id } => commands::run_submit(&config, video_id).await,
        Commands::Status { job_id, watch } => commands::run_status(&config, job_id, watch).await,
    }
}

#[cfg(test)]
mod tests;
