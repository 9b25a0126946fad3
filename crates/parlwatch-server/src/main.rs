//! parlwatch server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) overlaid with
//! `PARLWATCH_*` environment variables, and serves the JSON API under `/api`.
//!
//! ```text
//! PARLWATCH_DATASETTE_BASE_URL=https://datasette.example.org \
//!   cargo run -p parlwatch-server -- --port 8080
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use parlwatch_api::{AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Parliamentary interests API")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Address to bind; overrides `host` from the config.
  #[arg(long)]
  host: Option<String>,

  /// Port to bind; overrides `port` from the config.
  #[arg(short, long)]
  port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("PARLWATCH")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("parliament_categories"),
    )
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  if let Some(host) = cli.host {
    server_cfg.host = host;
  }
  if let Some(port) = cli.port {
    server_cfg.port = port;
  }

  if server_cfg.datasette_base_url.is_none() {
    tracing::warn!("datasette_base_url is not set; /api/interests will report a config error");
  }
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  let state = AppState::new(server_cfg).context("failed to build http client")?;
  let app = parlwatch_api::app(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
