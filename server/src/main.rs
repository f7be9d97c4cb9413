use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use concordo_server::config::AppConfig;
use concordo_server::console::Console;
use concordo_server::console::formatter::OutputMode;
use concordo_server::engine::directory::Directory;
use concordo_server::engine::system::System;
use concordo_server::store::FileStore;

/// Concordo: a text-driven chat server simulator.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "concordo.toml")]
    config: PathBuf,

    /// Directory for users.txt and servers.txt (overrides config).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Run without loading or saving any state.
    #[arg(long)]
    no_persist: bool,

    /// Emit one JSON object per feedback line.
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(&cli.config)?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    if cli.json {
        config.console.output = OutputMode::Json;
    }

    // Logs go to stderr; stdout carries only command feedback.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    let limits = config.limits();
    let mut console = if cli.no_persist {
        info!("persistence disabled");
        Console::new(System::new(Directory::new(), limits), config.console.output)
    } else {
        let store = FileStore::from_config(&config.storage);
        let (users, servers) = store
            .load_all()
            .await
            .context("failed to load saved state")?;
        let system = System::new(Directory::restore(users, servers), limits);
        Console::new(system, config.console.output).with_store(store, config.storage.autosave)
    };

    info!(
        data_dir = %config.storage.data_dir.display(),
        autosave = config.storage.autosave,
        "Concordo starting"
    );

    console
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("console I/O failed")?;
    Ok(())
}
