use std::collections::BTreeMap;

use crate::models::{RiskLevel, Transaction, TxnType};

pub struct MonthlyFlow {
    pub month: String,
    pub inflow: f64,
    pub outflow: f64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub pending: usize,
}

pub struct DashboardData {
    pub cash_balance: f64,
    pub high_risk_count: usize,
    pub as_of: Option<String>,
    pub inflow_mtd: f64,
    pub outflow_mtd: f64,
    pub monthly: Vec<MonthlyFlow>,
    pub risk: RiskDistribution,
    pub total_transactions: usize,
}

/// `YYYY-MM` prefix of a date string, if it looks like an ISO date.
pub fn month_key(date: &str) -> Option<&str> {
    let key = date.get(..7)?;
    let bytes = key.as_bytes();
    let digits_ok = bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit);
    (bytes[4] == b'-' && digits_ok).then_some(key)
}

pub fn cash_balance(opening_balance: f64, txns: &[Transaction]) -> f64 {
    txns.iter().fold(opening_balance, |acc, t| acc + t.signed_amount())
}

pub fn risk_distribution(txns: &[Transaction]) -> RiskDistribution {
    let mut dist = RiskDistribution::default();
    for t in txns {
        match t.risk_level() {
            Some(RiskLevel::Low) => dist.low += 1,
            Some(RiskLevel::Medium) => dist.medium += 1,
            Some(RiskLevel::High) => dist.high += 1,
            None => dist.pending += 1,
        }
    }
    dist
}

/// Inflow (debits) and outflow (credits) per month, oldest first. Rows whose
/// date has no recognizable month are left out.
pub fn monthly_cash_flow(txns: &[Transaction]) -> Vec<MonthlyFlow> {
    let mut by_month: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for t in txns {
        let Some(month) = month_key(&t.date) else {
            continue;
        };
        let entry = by_month.entry(month).or_default();
        match t.txn_type {
            TxnType::Debit => entry.0 += t.amount,
            TxnType::Credit => entry.1 += t.amount,
        }
    }
    by_month
        .into_iter()
        .map(|(month, (inflow, outflow))| MonthlyFlow {
            month: month.to_string(),
            inflow,
            outflow,
        })
        .collect()
}

/// Latest ISO-looking date in the list.
pub fn latest_date(txns: &[Transaction]) -> Option<&str> {
    txns.iter()
        .map(|t| t.date.as_str())
        .filter(|d| month_key(d).is_some())
        .max()
}

/// Inflow and outflow from the first of `as_of`'s month through `as_of`.
pub fn month_to_date(txns: &[Transaction], as_of: &str) -> (f64, f64) {
    let Some(month) = month_key(as_of) else {
        return (0.0, 0.0);
    };
    txns.iter()
        .filter(|t| month_key(&t.date) == Some(month) && t.date.as_str() <= as_of)
        .fold((0.0, 0.0), |(inflow, outflow), t| match t.txn_type {
            TxnType::Debit => (inflow + t.amount, outflow),
            TxnType::Credit => (inflow, outflow + t.amount),
        })
}

pub fn get_dashboard(txns: &[Transaction], opening_balance: f64, as_of: Option<&str>) -> DashboardData {
    let as_of = as_of.or_else(|| latest_date(txns)).map(str::to_string);
    let (inflow_mtd, outflow_mtd) = as_of
        .as_deref()
        .map(|d| month_to_date(txns, d))
        .unwrap_or((0.0, 0.0));
    let risk = risk_distribution(txns);
    DashboardData {
        cash_balance: cash_balance(opening_balance, txns),
        high_risk_count: risk.high,
        as_of,
        inflow_mtd,
        outflow_mtd,
        monthly: monthly_cash_flow(txns),
        risk,
        total_transactions: txns.len(),
    }
}
