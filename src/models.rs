use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxnType {
    Debit,
    Credit,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk fields set together by a CAAT run. A transaction without one is "Pending".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub anomaly_flag: bool,
}

/// Canonical cash transaction (T_Transaksi_Kas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub description: String,
    pub reference_no: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub txn_type: TxnType,
    pub account_code: String,
    pub counterparty: String,
    #[serde(flatten)]
    pub risk: Option<RiskAssessment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VouchingStatus {
    Inspect,
    Ok,
}

impl Transaction {
    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.risk.map(|r| r.risk_level)
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level() == Some(RiskLevel::High)
    }

    pub fn vouching_status(&self) -> VouchingStatus {
        if self.is_high_risk() {
            VouchingStatus::Inspect
        } else {
            VouchingStatus::Ok
        }
    }

    /// Signed effect on the cash balance: debits add, credits subtract.
    pub fn signed_amount(&self) -> f64 {
        match self.txn_type {
            TxnType::Debit => self.amount,
            TxnType::Credit => -self.amount,
        }
    }
}

/// One scored transaction as returned by a risk scorer. Merged into the
/// session and then dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysisResult {
    pub transaction_id: String,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub reasoning: String,
    pub is_anomaly: bool,
}

impl RiskAnalysisResult {
    pub fn assessment(&self) -> RiskAssessment {
        RiskAssessment {
            risk_score: self.risk_score,
            risk_level: self.risk_level,
            anomaly_flag: self.is_anomaly,
        }
    }
}

/// Cell value from a parsed CSV/XLSX row before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// Whether the cell counts as a value when walking an alias chain.
    /// Empty text and zero fall through to the next alias.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Empty => false,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Empty => String::new(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Intermediate representation from a CSV/XLSX parser: header -> cell.
pub type RawRow = HashMap<String, CellValue>;
