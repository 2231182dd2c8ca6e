//! # Reconciliation Ledger
//!
//! Abandoned wallet debits are appended as JSON lines to
//! `unreconciled.jsonl` in the platform data directory so back office can
//! settle them by hand.
//!
//! - **macOS**: `~/Library/Application Support/com.mueen.pos/unreconciled.jsonl`
//! - **Windows**: `%APPDATA%\mueen\pos\data\unreconciled.jsonl`
//! - **Linux**: `~/.local/share/pos/unreconciled.jsonl`

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::{error, warn};

use mueen_core::UnreconciledDebit;

use crate::error::{ApiError, ErrorCode};

pub const LEDGER_FILE_NAME: &str = "unreconciled.jsonl";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LedgerEntry<'a> {
    recorded_at: String,
    #[serde(flatten)]
    debit: &'a UnreconciledDebit,
}

/// Append-only record of abandoned debits.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationLog {
    path: Option<PathBuf>,
}

impl ReconciliationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ReconciliationLog {
            path: Some(path.into()),
        }
    }

    /// Logs entries without persisting them.
    pub fn disabled() -> Self {
        ReconciliationLog { path: None }
    }

    /// Ledger in the platform data directory.
    ///
    /// Set `MUEEN_LEDGER_PATH` to use a custom path.
    pub fn in_data_dir() -> Self {
        if let Ok(path) = std::env::var("MUEEN_LEDGER_PATH") {
            return ReconciliationLog::new(path);
        }
        match directories::ProjectDirs::from("com", "mueen", "pos") {
            Some(dirs) => ReconciliationLog::new(dirs.data_dir().join(LEDGER_FILE_NAME)),
            None => {
                warn!("Could not determine data directory; abandoned debits will only be logged");
                ReconciliationLog::disabled()
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Records an abandoned debit.
    pub fn record(&self, debit: &UnreconciledDebit) -> Result<(), ApiError> {
        warn!(
            sale_id = debit.sale_id,
            invoice = %debit.invoice_number,
            customer_id = debit.customer_id,
            amount = %debit.amount,
            "Wallet debit abandoned; needs manual reconciliation"
        );

        let Some(path) = &self.path else {
            return Ok(());
        };

        let entry = LedgerEntry {
            recorded_at: Utc::now().to_rfc3339(),
            debit,
        };
        let line = serde_json::to_string(&entry)
            .map_err(|e| ApiError::internal(format!("Cannot encode ledger entry: {}", e)))?;

        append_line(path, &line).map_err(|e| {
            error!(?path, error = %e, "Failed to write reconciliation ledger");
            ApiError::new(
                ErrorCode::Internal,
                format!("Could not write the reconciliation ledger: {}", e),
            )
        })
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mueen_core::Money;

    fn debit(sale_id: u64) -> UnreconciledDebit {
        UnreconciledDebit {
            sale_id,
            invoice_number: format!("INV-{}", sale_id),
            customer_id: 5,
            amount: Money::from_cents(3000),
            note: format!("Payment for Invoice #INV-{}", sale_id),
        }
    }

    #[test]
    fn test_appends_json_lines() {
        let dir = std::env::temp_dir().join(format!("mueen-ledger-{}", std::process::id()));
        let path = dir.join(LEDGER_FILE_NAME);
        let _ = std::fs::remove_file(&path);

        let log = ReconciliationLog::new(&path);
        log.record(&debit(1)).unwrap();
        log.record(&debit(2)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["invoiceNumber"], "INV-1");
        assert_eq!(lines[1]["saleId"], 2);
        assert!(lines[0]["recordedAt"].is_string());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_disabled_log_accepts_entries() {
        let log = ReconciliationLog::disabled();
        assert!(log.path().is_none());
        log.record(&debit(3)).unwrap();
    }
}
