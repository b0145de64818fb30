use crate::execution::TradingMode;
use crate::journal::SignalJournal;
use crate::models::PositionStatus;
use crate::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Operational status persisted alongside the signal views: the
/// trading mode (full vs analysis-only) and the open position, if any.
#[derive(Debug, Clone, Serialize)]
pub struct BotStatus {
    pub mode: TradingMode,
    pub position: Option<PositionStatus>,
}

/// Writes the journal's latest and history views as JSON files under an
/// output directory, one pair per symbol. The latest file is rewritten
/// whole every cycle so readers always see a complete document.
#[derive(Debug, Clone)]
pub struct JsonSignalStore {
    output_dir: PathBuf,
}

impl JsonSignalStore {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Persist both views. Symbols like "BTC/USDT" map to file-safe
    /// stems like "BTC_USDT".
    pub fn save(&self, journal: &SignalJournal) -> Result<()> {
        let stem = journal.symbol().replace('/', "_");

        if let Some(latest) = journal.latest() {
            let path = self.output_dir.join(format!("{stem}_latest.json"));
            fs::write(&path, serde_json::to_string_pretty(latest)?)?;
            debug!(path = %path.display(), "wrote latest signal");
        }

        let history: Vec<_> = journal.history().collect();
        let path = self.output_dir.join(format!("{stem}_history.json"));
        fs::write(&path, serde_json::to_string_pretty(&history)?)?;
        debug!(path = %path.display(), entries = history.len(), "wrote history");
        Ok(())
    }

    /// Persist the operational status so a degraded (analysis-only)
    /// bot is distinguishable from a trading one off-process.
    pub fn save_status(&self, symbol: &str, status: &BotStatus) -> Result<()> {
        let stem = symbol.replace('/', "_");
        let path = self.output_dir.join(format!("{stem}_status.json"));
        fs::write(&path, serde_json::to_string_pretty(status)?)?;
        debug!(path = %path.display(), mode = ?status.mode, "wrote status");
        Ok(())
    }
}
