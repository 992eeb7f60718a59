use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Parser;
use trade_export_lib::export::ExportSummary;
use trade_export_lib::models::{ExportConfig, VaultBackend, DEFAULT_BASE_CURRENCY, DEFAULT_OUTPUT_FILE};

#[derive(Parser)]
#[command(name = "trade-history-export")]
#[command(about = "Export Binance.US trade history for every held asset to CSV")]
#[command(version)]
struct Cli {
    /// Output CSV path (overwritten on every run)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Currency all other assets are traded against
    #[arg(long, default_value = DEFAULT_BASE_CURRENCY)]
    base_currency: String,

    /// Where API credentials are cached
    #[arg(long, value_enum, default_value_t = VaultBackend::Keyring)]
    vault: VaultBackend,

    /// Directory of the encrypted credential file (with `--vault file`)
    #[arg(long, env = "TRADE_EXPORT_VAULT_DIR")]
    vault_dir: Option<PathBuf>,

    /// Prompt for credentials when the vault cannot be read
    #[arg(long)]
    vault_error_fallback: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> Result<ExportConfig> {
        let base_currency = self.base_currency.trim().to_uppercase();
        if base_currency.is_empty() || !base_currency.chars().all(|c| c.is_ascii_alphanumeric()) {
            bail!("Invalid base currency '{}'", self.base_currency);
        }

        let defaults = ExportConfig::default();
        Ok(ExportConfig {
            base_currency,
            output_path: self.output,
            vault_backend: self.vault,
            vault_dir: self.vault_dir.unwrap_or_else(|| defaults.vault_dir.clone()),
            vault_error_fallback: self.vault_error_fallback,
            ..defaults
        })
    }
}

async fn run_cli(cli: Cli) -> Result<ExportSummary> {
    let config = cli.into_config()?;
    let summary = trade_export_lib::run(&config).await?;
    Ok(summary)
}

/// Launched without arguments, e.g. by double-click. Any argument at all
/// means batch mode.
fn is_interactive(args: impl ExactSizeIterator) -> bool {
    args.len() <= 1
}

/// Keep a double-clicked console window open until the operator has read it
fn pause() {
    print!("Press Enter to continue...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let interactive = is_interactive(std::env::args_os());
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .format_target(false)
        .init();

    let status = match run_cli(cli).await {
        Ok(summary) => {
            println!(
                "Exported {} trades across {} assets",
                summary.rows_written,
                summary.assets.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Error: {}", e);
            ExitCode::FAILURE
        }
    };

    if interactive {
        pause();
    }

    status
}
