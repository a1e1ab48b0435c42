use anyhow::Result;
use clap::Parser;
use sv_translator::{config, server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // before the subscriber, so RUST_LOG may come from .env
    let dotenv = config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    dotenv.log();

    let config = ServerConfig::parse();
    server::run(config).await
}
