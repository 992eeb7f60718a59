use std::io::Write;

use chrono::Utc;

use super::csv_sink::TradeCsvSink;
use super::error::ExportError;
use super::exporter::{ExportSummary, TradeExporter};
use super::selector::select_assets;
use crate::api::ExchangeSession;
use crate::models::{format_trade_time, ExportConfig};

/// Everything after credentials: clock check, account, selection, export.
///
/// The output file is only created once the account snapshot has been
/// fetched and every balance parsed.
pub async fn run_export<S, O>(
    session: &S,
    config: &ExportConfig,
    out: &mut O,
) -> Result<ExportSummary, ExportError>
where
    S: ExchangeSession + ?Sized,
    O: Write,
{
    report_server_time(session, out).await?;

    let account = session
        .get_account(config.recv_window_ms)
        .await
        .map_err(ExportError::Account)?;
    writeln!(out, "account: {} balances", account.balances.len())?;
    for balance in &account.balances {
        writeln!(out, "  {}: free {}, locked {}", balance.asset, balance.free, balance.locked)?;
    }

    let assets = select_assets(&account.balances, &config.base_currency)?;
    log::info!(
        "Exporting {} assets from {} to {}",
        assets.len(),
        session.exchange_name(),
        config.output_path.display()
    );

    let mut sink = TradeCsvSink::create(&config.output_path)?;
    sink.write_header()?;

    let summary = TradeExporter::new(session, config.recv_window_ms)
        .export(&assets, &mut sink, out)
        .await?;

    sink.finish()?;
    Ok(summary)
}

/// Print request timing and the server clock. Failures here are only logged.
async fn report_server_time<S, O>(session: &S, out: &mut O) -> Result<(), ExportError>
where
    S: ExchangeSession + ?Sized,
    O: Write,
{
    let start = Utc::now();
    let result = session.server_time().await;
    let end = Utc::now();

    match result {
        Ok(server_ms) => {
            let elapsed = end - start;
            writeln!(out, "Start time:  {}", start)?;
            writeln!(out, "End time:    {}, duration: {}ms", end, elapsed.num_milliseconds())?;
            writeln!(out, "Server time: {}", format_trade_time(server_ms))?;

            let midpoint = start.timestamp_millis() + elapsed.num_milliseconds() / 2;
            log::debug!("Local clock offset from server: {}ms", midpoint - server_ms);
        }
        Err(e) => log::warn!("Server time check failed: {}", e),
    }

    Ok(())
}
