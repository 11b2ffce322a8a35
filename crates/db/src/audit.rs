//! Audit observer that writes ledger events to `tracing`.

use tally_core::ledger::{LedgerEvent, LedgerObserver};
use tracing::info;

/// Emits one `info` event per committed ledger change on the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LedgerObserver for TracingObserver {
    fn record(&self, event: &LedgerEvent) {
        let payload = serde_json::to_string(event).unwrap_or_default();
        info!(
            target: "audit",
            event = event.name(),
            entry_id = %event.entry_id(),
            payload = %payload,
            "ledger event"
        );
    }
}
