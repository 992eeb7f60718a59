use std::io::Write;

use super::csv_sink::TradeCsvSink;
use super::error::ExportError;
use super::selector::SelectedAsset;
use crate::api::ExchangeSession;
use crate::models::ExportRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Running { symbol: String },
    Completed,
    Aborted { reason: String },
}

/// Trades written for one pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetExport {
    pub symbol: String,
    pub trades: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub assets: Vec<AssetExport>,
    pub rows_written: usize,
}

/// Pulls trades pair by pair and streams them into the sink.
///
/// Pairs are processed strictly one after another. The first failed query
/// aborts the run; rows already handed to the sink stay there.
pub struct TradeExporter<'a, S: ExchangeSession + ?Sized> {
    session: &'a S,
    recv_window_ms: u64,
    state: ExportState,
}

impl<'a, S: ExchangeSession + ?Sized> TradeExporter<'a, S> {
    pub fn new(session: &'a S, recv_window_ms: u64) -> Self {
        Self {
            session,
            recv_window_ms,
            state: ExportState::Idle,
        }
    }

    pub fn state(&self) -> &ExportState {
        &self.state
    }

    pub async fn export<W: Write, O: Write>(
        &mut self,
        assets: &[SelectedAsset],
        sink: &mut TradeCsvSink<W>,
        out: &mut O,
    ) -> Result<ExportSummary, ExportError> {
        let result = self.export_assets(assets, sink, out).await;

        self.state = match &result {
            Ok(_) => ExportState::Completed,
            Err(e) => ExportState::Aborted {
                reason: e.to_string(),
            },
        };

        result
    }

    async fn export_assets<W: Write, O: Write>(
        &mut self,
        assets: &[SelectedAsset],
        sink: &mut TradeCsvSink<W>,
        out: &mut O,
    ) -> Result<ExportSummary, ExportError> {
        let mut summary = ExportSummary::default();

        for asset in assets {
            self.state = ExportState::Running {
                symbol: asset.symbol.clone(),
            };
            writeln!(
                out,
                "Asset: {}, free: {}, locked: {}",
                asset.asset, asset.free, asset.locked
            )?;

            let trades = self
                .session
                .list_trades(&asset.symbol, self.recv_window_ms)
                .await
                .map_err(|error| ExportError::Trades {
                    symbol: asset.symbol.clone(),
                    error,
                })?;

            for trade in &trades {
                if trade.symbol != asset.symbol {
                    log::warn!(
                        "Trade {} reports symbol {} while listing {}",
                        trade.id,
                        trade.symbol,
                        asset.symbol
                    );
                }
                sink.write_row(&ExportRow::from(trade))?;
            }

            writeln!(out, "  {} trades: {}", asset.asset, trades.len())?;
            log::info!("Exported {} trades for {}", trades.len(), asset.symbol);

            summary.rows_written += trades.len();
            summary.assets.push(AssetExport {
                symbol: asset.symbol.clone(),
                trades: trades.len(),
            });
        }

        Ok(summary)
    }
}
