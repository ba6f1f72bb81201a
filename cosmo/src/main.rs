//! CosmoSorter headless workspace.
//!
//! Drives a workspace over a line protocol on stdin/stdout, suitable for
//! scripted sessions and automated testing:
//!
//! ```bash
//! printf 'open\ntext Elira wakes in a frozen forest\nanalyze\n' | cargo run -p cosmo
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to change the filter.

mod headless;

use clap::Parser;
use cosmo_core::WorkspaceConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cosmo", version, about = "CosmoSorter demo workspace over a line protocol")]
struct Args {
    /// Directory of the durable workspace store.
    #[arg(long, env = "COSMO_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Directory exports are written to.
    #[arg(long, env = "COSMO_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    /// Remote analysis endpoint; the built-in mock is used when absent.
    #[arg(long, env = "COSMO_ANALYZER_URL")]
    analyzer_url: Option<String>,

    /// Bearer token for the remote analysis endpoint.
    #[arg(long, env = "COSMO_ANALYZER_KEY", hide_env_values = true)]
    analyzer_key: Option<String>,

    /// Fixed mock analysis delay in milliseconds.
    #[arg(long, value_name = "MS")]
    mock_delay_ms: Option<u64>,

    /// Enter the workspace immediately.
    #[arg(long)]
    open: bool,
}

impl Args {
    fn into_config(self) -> WorkspaceConfig {
        let mut config = WorkspaceConfig::from_env();
        if let Some(dir) = self.store_dir {
            config = config.with_store_dir(dir);
        }
        if let Some(dir) = self.export_dir {
            config = config.with_export_dir(dir);
        }
        if let Some(url) = self.analyzer_url {
            config = config.with_analyzer(url, self.analyzer_key);
        }
        if let Some(ms) = self.mock_delay_ms {
            let delay = Duration::from_millis(ms);
            config = config.with_mock_delay(delay, delay);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cosmo=info,cosmo_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let open = args.open;
    let config = args.into_config();

    headless::run_headless(config, open).await.map_err(|e| e.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "cosmo",
            "--store-dir",
            "/tmp/cosmo",
            "--mock-delay-ms",
            "0",
            "--open",
        ])
        .unwrap();
        assert!(args.open);

        let config = args.into_config();
        assert_eq!(config.store_dir, PathBuf::from("/tmp/cosmo"));
        assert_eq!(config.mock_delay, (Duration::ZERO, Duration::ZERO));
    }
}
