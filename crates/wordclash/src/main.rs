//! Server binary: config from the environment, tracing to stdout.

use tracing_subscriber::EnvFilter;
use wordclash::{ServerConfig, ServerError, WordclashServerBuilder};
use wordclash_words::{HttpWordProvider, WordsConfig};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let provider = HttpWordProvider::new(WordsConfig::from_env());

    let server = WordclashServerBuilder::new()
        .config(config)
        .build(provider)
        .await?;

    tracing::info!(
        addr = %server.local_addr().map(|a| a.to_string()).unwrap_or_default(),
        "listening"
    );
    server.run().await
}
