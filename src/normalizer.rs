use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::models::{CellValue, RawRow, Transaction, TxnType};

// ---------------------------------------------------------------------------
// Header aliases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Description,
    ReferenceNo,
    Amount,
    Type,
    Counterparty,
    AccountCode,
}

pub struct FieldAliases {
    pub field: Field,
    /// Checked in order; the first present cell wins.
    pub aliases: &'static [&'static str],
}

/// English and Indonesian header variants seen in client ledgers.
pub const FIELD_ALIASES: &[FieldAliases] = &[
    FieldAliases { field: Field::Date, aliases: &["Date", "date", "Tanggal"] },
    FieldAliases { field: Field::Description, aliases: &["Description", "description", "Keterangan"] },
    FieldAliases { field: Field::ReferenceNo, aliases: &["ReferenceNo", "ref", "No Bukti", "Ref"] },
    FieldAliases { field: Field::Amount, aliases: &["Amount", "amount", "Nilai", "Nominal"] },
    FieldAliases { field: Field::Type, aliases: &["Type", "type", "Tipe"] },
    FieldAliases { field: Field::Counterparty, aliases: &["Counterparty", "counterparty", "Lawan Transaksi", "Vendor"] },
    FieldAliases { field: Field::AccountCode, aliases: &["Account", "accountCode", "Akun"] },
];

const DEFAULT_DESCRIPTION: &str = "Imported Transaction";
const DEFAULT_COUNTERPARTY: &str = "General";
const DEFAULT_ACCOUNT_CODE: &str = "0-0000";

/// Substrings that mark a credit even though they contain a `D`.
const CREDIT_MARKERS: &[&str] = &["CREDIT", "KREDIT"];

pub fn aliases_for(field: Field) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|f| f.field == field)
        .map(|f| f.aliases)
        .unwrap_or(&[])
}

pub fn resolve(row: &RawRow, field: Field) -> Option<&CellValue> {
    aliases_for(field)
        .iter()
        .filter_map(|alias| row.get(*alias))
        .find(|cell| cell.is_present())
}

fn resolve_text(row: &RawRow, field: Field) -> Option<String> {
    resolve(row, field).map(CellValue::to_text)
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

fn non_numeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9.\-]+").unwrap())
}

fn leading_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?(\d+\.?\d*|\.\d+)").unwrap())
}

/// Read the longest leading decimal number, ignoring whatever follows.
/// `"1.500.000-"` reads as `1.5`; a string with no leading digits is `None`.
pub fn parse_leading_number(s: &str) -> Option<f64> {
    leading_number().find(s)?.as_str().parse().ok()
}

/// Coerce an amount cell to a non-negative number. Unparseable input is 0.
pub fn sanitize_amount(cell: &CellValue) -> f64 {
    let parsed = match cell {
        CellValue::Text(s) => {
            let cleaned = non_numeric().replace_all(s, "");
            parse_leading_number(&cleaned).unwrap_or(0.0)
        }
        CellValue::Number(n) => *n,
        CellValue::Empty => 0.0,
    };
    if parsed.is_finite() {
        parsed.abs()
    } else {
        0.0
    }
}

/// Coarse direction heuristic: explicit credit markers first, then anything
/// containing `D` or `IN` is a debit.
pub fn classify_type(raw: &str) -> TxnType {
    let upper = raw.to_uppercase();
    if CREDIT_MARKERS.iter().any(|m| upper.contains(m)) {
        return TxnType::Credit;
    }
    if upper.contains('D') || upper.contains("IN") {
        TxnType::Debit
    } else {
        TxnType::Credit
    }
}

pub fn generated_reference(ingested_at: DateTime<Utc>, index: usize) -> String {
    format!("IMP-{}-{index}", ingested_at.timestamp_millis())
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

pub fn normalize_row(row: &RawRow, index: usize, ingested_at: DateTime<Utc>) -> Transaction {
    let date = resolve_text(row, Field::Date)
        .unwrap_or_else(|| ingested_at.format("%Y-%m-%d").to_string());
    let description =
        resolve_text(row, Field::Description).unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    let reference_no = resolve_text(row, Field::ReferenceNo)
        .unwrap_or_else(|| generated_reference(ingested_at, index));
    let amount = resolve(row, Field::Amount).map(sanitize_amount).unwrap_or(0.0);
    let txn_type = resolve_text(row, Field::Type)
        .map(|raw| classify_type(&raw))
        .unwrap_or(TxnType::Debit);
    let counterparty =
        resolve_text(row, Field::Counterparty).unwrap_or_else(|| DEFAULT_COUNTERPARTY.to_string());
    let account_code =
        resolve_text(row, Field::AccountCode).unwrap_or_else(|| DEFAULT_ACCOUNT_CODE.to_string());

    Transaction {
        id: generated_reference(ingested_at, index),
        date,
        description,
        reference_no,
        amount,
        txn_type,
        account_code,
        counterparty,
        risk: None,
    }
}

/// Map parsed rows onto canonical transactions. Never drops a row: every
/// field has a default, so the output has the input's length and order.
pub fn normalize_rows(rows: &[RawRow], ingested_at: DateTime<Utc>) -> Vec<Transaction> {
    let txns: Vec<Transaction> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| normalize_row(row, i, ingested_at))
        .collect();
    tracing::debug!(rows = txns.len(), "normalized import batch");
    txns
}
