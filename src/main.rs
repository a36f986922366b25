use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use ytsub_dl::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so yt-dlp progress on stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(version = env!("CARGO_PKG_VERSION"), ?cli, "starting ytsub-dl");

    cli.run().await?;

    Ok(())
}
