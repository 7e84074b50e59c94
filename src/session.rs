use std::collections::HashMap;

use crate::error::{DcasError, Result};
use crate::models::{RiskAnalysisResult, Transaction};

/// State transitions applied to a [`Session`].
#[derive(Debug, Clone)]
pub enum Action {
    Imported(Vec<Transaction>),
    Synced(Transaction),
    RiskAnalyzed(Vec<RiskAnalysisResult>),
    AnalysisFailed,
}

/// Owns the working transaction list for one audit session. All mutation
/// goes through [`Session::apply`].
#[derive(Debug, Default)]
pub struct Session {
    transactions: Vec<Transaction>,
    analysis_in_flight: bool,
}

impl Session {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            analysis_in_flight: false,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Mark a CAAT run as started and hand back the list to score.
    pub fn begin_analysis(&mut self) -> Result<Vec<Transaction>> {
        if self.analysis_in_flight {
            return Err(DcasError::AnalysisInProgress);
        }
        self.analysis_in_flight = true;
        Ok(self.transactions.clone())
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Imported(batch) => {
                tracing::info!(added = batch.len(), "session import applied");
                self.transactions.extend(batch);
            }
            Action::Synced(txn) => {
                tracing::info!(id = %txn.id, "session sync applied");
                self.transactions.push(txn);
            }
            Action::RiskAnalyzed(results) => {
                let updated = merge_risk_results(&mut self.transactions, &results);
                tracing::info!(results = results.len(), updated, "risk results merged");
                self.analysis_in_flight = false;
            }
            Action::AnalysisFailed => {
                self.analysis_in_flight = false;
            }
        }
    }
}

/// Overwrite risk fields of transactions that have a result; leave the rest
/// untouched. Returns the number of transactions updated.
pub fn merge_risk_results(txns: &mut [Transaction], results: &[RiskAnalysisResult]) -> usize {
    let by_id: HashMap<&str, &RiskAnalysisResult> = results
        .iter()
        .map(|r| (r.transaction_id.as_str(), r))
        .collect();
    let mut updated = 0;
    for txn in txns.iter_mut() {
        if let Some(result) = by_id.get(txn.id.as_str()) {
            txn.risk = Some(result.assessment());
            updated += 1;
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RiskAssessment, RiskLevel, TxnType};

    fn txn(id: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: "2023-10-01".to_string(),
            description: "Test".to_string(),
            reference_no: id.to_string(),
            amount: 100.0,
            txn_type: TxnType::Debit,
            account_code: "1-0000".to_string(),
            counterparty: "General".to_string(),
            risk: None,
        }
    }

    fn result(id: &str, score: u8, level: RiskLevel) -> RiskAnalysisResult {
        RiskAnalysisResult {
            transaction_id: id.to_string(),
            risk_score: score,
            risk_level: level,
            reasoning: String::new(),
            is_anomaly: level == RiskLevel::High,
        }
    }

    #[test]
    fn test_merge_preserves_unanalyzed() {
        let prior = RiskAssessment {
            risk_score: 55,
            risk_level: RiskLevel::Medium,
            anomaly_flag: false,
        };
        let mut txns = vec![txn("A"), txn("B"), txn("C")];
        txns[2].risk = Some(prior);

        let updated = merge_risk_results(&mut txns, &[result("B", 90, RiskLevel::High)]);

        assert_eq!(updated, 1);
        assert_eq!(txns.len(), 3);
        let ids: Vec<&str> = txns.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
        assert!(txns[0].risk.is_none());
        assert_eq!(txns[1].risk.unwrap().risk_score, 90);
        assert!(txns[1].risk.unwrap().anomaly_flag);
        assert_eq!(txns[2].risk, Some(prior));
    }

    #[test]
    fn test_merge_ignores_unknown_ids() {
        let mut txns = vec![txn("A")];
        assert_eq!(merge_risk_results(&mut txns, &[result("Z", 10, RiskLevel::Low)]), 0);
        assert!(txns[0].risk.is_none());
    }

    #[test]
    fn test_empty_results_change_nothing() {
        let mut session = Session::new(vec![txn("A")]);
        session.begin_analysis().unwrap();
        session.apply(Action::RiskAnalyzed(Vec::new()));
        assert!(session.transactions()[0].risk.is_none());
        assert!(session.begin_analysis().is_ok());
    }

    #[test]
    fn test_second_analysis_refused_while_in_flight() {
        let mut session = Session::new(vec![txn("A")]);
        let snapshot = session.begin_analysis().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(matches!(session.begin_analysis(), Err(DcasError::AnalysisInProgress)));
        session.apply(Action::AnalysisFailed);
        assert!(session.begin_analysis().is_ok());
    }

    #[test]
    fn test_import_and_sync_append() {
        let mut session = Session::new(vec![txn("A")]);
        session.apply(Action::Imported(vec![txn("B"), txn("C")]));
        session.apply(Action::Synced(txn("D")));
        let ids: Vec<&str> = session.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C", "D"]);
    }
}
