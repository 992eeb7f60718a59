pub mod csv_sink;
pub mod error;
pub mod exporter;
pub mod pipeline;
pub mod selector;

pub use csv_sink::{SinkError, TradeCsvSink};
pub use error::ExportError;
pub use exporter::{AssetExport, ExportState, ExportSummary, TradeExporter};
pub use pipeline::run_export;
pub use selector::{select_assets, SelectedAsset};
