/* demo/site/src/main.rs */

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tandem_demo::config::SiteConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "tandem-demo", about = "Server-rendered demo site with client hydration")]
struct Cli {
  /// Path to a TOML config file (defaults to ./tandem.toml when present)
  #[arg(short, long)]
  config: Option<PathBuf>,
  /// Listening port, overrides config and PORT
  #[arg(short, long)]
  port: Option<u16>,
  /// Listening host, overrides config and HOST
  #[arg(long)]
  host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tandem=info,tandem_demo=info,tower_http=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let cli = Cli::parse();
  let mut config = SiteConfig::load(cli.config.as_deref())?;
  config.apply_env(|key| std::env::var(key).ok())?;
  if let Some(port) = cli.port {
    config.server.port = port;
  }
  if let Some(host) = cli.host {
    config.server.host = host;
  }
  config.validate()?;

  tandem_demo::serve(config).await
}
