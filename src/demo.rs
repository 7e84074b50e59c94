use crate::models::{RiskAssessment, RiskLevel, Transaction, TxnType};

struct DemoTxn {
    id: &'static str,
    date: &'static str,
    description: &'static str,
    reference_no: &'static str,
    amount: f64,
    txn_type: TxnType,
    account_code: &'static str,
    counterparty: &'static str,
    risk: Option<(u8, RiskLevel, bool)>,
}

/// Sample cash ledger loaded into every session unless `--no-demo` is given.
const DEMO: &[DemoTxn] = &[
    DemoTxn { id: "TX001", date: "2023-10-01", description: "Office Supplies", reference_no: "BKK-001", amount: 1_500_000.0, txn_type: TxnType::Credit, account_code: "6-1000", counterparty: "CV Maju Jaya", risk: None },
    DemoTxn { id: "TX002", date: "2023-10-02", description: "Sales Revenue", reference_no: "BKM-001", amount: 25_000_000.0, txn_type: TxnType::Debit, account_code: "4-1000", counterparty: "PT Clients Indo", risk: None },
    DemoTxn { id: "TX003", date: "2023-10-05", description: "Consulting Fee", reference_no: "BKK-002", amount: 55_000_000.0, txn_type: TxnType::Credit, account_code: "6-2000", counterparty: "Mr. Expert", risk: Some((85, RiskLevel::High, true)) },
    DemoTxn { id: "TX004", date: "2023-10-06", description: "Utility Bill", reference_no: "BKK-003", amount: 2_500_000.0, txn_type: TxnType::Credit, account_code: "6-3000", counterparty: "PLN", risk: None },
    DemoTxn { id: "TX005", date: "2023-10-07", description: "Unknown Payment", reference_no: "BKK-004", amount: 10_000_000.0, txn_type: TxnType::Credit, account_code: "6-9999", counterparty: "Unknown", risk: Some((55, RiskLevel::Medium, false)) },
];

pub fn demo_transactions() -> Vec<Transaction> {
    DEMO.iter()
        .map(|d| Transaction {
            id: d.id.to_string(),
            date: d.date.to_string(),
            description: d.description.to_string(),
            reference_no: d.reference_no.to_string(),
            amount: d.amount,
            txn_type: d.txn_type,
            account_code: d.account_code.to_string(),
            counterparty: d.counterparty.to_string(),
            risk: d.risk.map(|(risk_score, risk_level, anomaly_flag)| RiskAssessment {
                risk_score,
                risk_level,
                anomaly_flag,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_ledger() {
        let txns = demo_transactions();
        assert_eq!(txns.len(), 5);
        assert_eq!(txns.iter().filter(|t| t.is_high_risk()).count(), 1);
        assert!(txns.iter().all(|t| t.amount >= 0.0));
    }
}
