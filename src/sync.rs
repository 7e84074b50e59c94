use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::{Transaction, TxnType};

/// Build the record a system sync would fetch from the client's accounting
/// package. `existing` is the current session length.
pub fn synced_transaction(existing: usize, fetched_at: DateTime<Utc>) -> Transaction {
    Transaction {
        id: format!("TX00{}", existing + 1),
        date: "2023-10-10".to_string(),
        description: "Imported Transaction from Accurate".to_string(),
        reference_no: format!("API-{}", fetched_at.timestamp_millis()),
        amount: 5_000_000.0,
        txn_type: TxnType::Debit,
        account_code: "4-2000".to_string(),
        counterparty: "Auto Imported".to_string(),
        risk: None,
    }
}

/// Simulated sync: waits `delay`, then returns exactly one new transaction.
pub fn simulate_sync(existing: usize, delay: Duration) -> Transaction {
    tracing::info!(delay_ms = delay.as_millis() as u64, "syncing from accounting system");
    std::thread::sleep(delay);
    let txn = synced_transaction(existing, Utc::now());
    tracing::info!(id = %txn.id, reference = %txn.reference_no, "sync complete");
    txn
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_synced_transaction_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let txn = synced_transaction(5, at);
        assert_eq!(txn.id, "TX006");
        assert_eq!(txn.reference_no, format!("API-{}", at.timestamp_millis()));
        assert_eq!(txn.txn_type, TxnType::Debit);
        assert_eq!(txn.amount, 5_000_000.0);
        assert!(txn.risk.is_none());
    }

    #[test]
    fn test_simulate_sync_without_delay() {
        let txn = simulate_sync(0, Duration::ZERO);
        assert_eq!(txn.id, "TX001");
        assert!(txn.reference_no.starts_with("API-"));
    }
}
