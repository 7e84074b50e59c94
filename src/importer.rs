use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{DcasError, Result};
use crate::models::{CellValue, RawRow, Transaction};
use crate::normalizer::normalize_rows;

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    pub fn from_path(file_path: &Path) -> Result<Self> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            _ => Err(DcasError::UnsupportedFormat(
                file_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            )),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Parse CSV with the first record as headers. Short records simply lack the
/// trailing keys; a malformed record fails the whole file.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut row = RawRow::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            row.entry(header.clone())
                .or_insert_with(|| CellValue::Text(value.to_string()));
        }
        rows.push(row);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// XLSX / XLS (feature-gated)
// ---------------------------------------------------------------------------

/// `None` when the serial falls outside the representable date range.
#[cfg(any(feature = "xlsx", test))]
pub fn excel_serial_to_date(serial: f64) -> Option<String> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = base.checked_add_signed(chrono::Duration::try_days(serial as i64)?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

#[cfg(feature = "xlsx")]
fn cell_from_data(data: &calamine::Data) -> CellValue {
    use calamine::Data;
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_date(serial)
                .map(CellValue::Text)
                .unwrap_or(CellValue::Number(serial))
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        _ => CellValue::Empty,
    }
}

/// Read the first worksheet: first row is the header, blank rows are skipped.
#[cfg(feature = "xlsx")]
pub fn read_spreadsheet_rows(file_path: &Path) -> Result<Vec<RawRow>> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(file_path)
        .map_err(|e| DcasError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DcasError::Spreadsheet("workbook has no sheets".to_string()))?
        .map_err(|e| DcasError::Spreadsheet(e.to_string()))?;

    let mut iter = range.rows();
    let Some(header_row) = iter.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(|c| c.to_string().trim().to_string()).collect();

    let mut rows = Vec::new();
    for cells in iter {
        let mut row = RawRow::new();
        for (header, data) in headers.iter().zip(cells.iter()) {
            if header.is_empty() {
                continue;
            }
            let cell = cell_from_data(data);
            if cell != CellValue::Empty {
                row.entry(header.clone()).or_insert(cell);
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

#[cfg(not(feature = "xlsx"))]
pub fn read_spreadsheet_rows(file_path: &Path) -> Result<Vec<RawRow>> {
    Err(DcasError::UnsupportedFormat(format!(
        "{} (built without spreadsheet support)",
        file_path.display()
    )))
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

pub fn read_rows(file_path: &Path) -> Result<Vec<RawRow>> {
    match FileFormat::from_path(file_path)? {
        FileFormat::Csv => {
            let file = std::fs::File::open(file_path)?;
            read_csv_rows(std::io::BufReader::new(file))
        }
        FileFormat::Xlsx | FileFormat::Xls => read_spreadsheet_rows(file_path),
    }
}

/// Parse and normalize one file. Either the whole file imports or nothing does.
pub fn import_file(file_path: &Path, ingested_at: DateTime<Utc>) -> Result<Vec<Transaction>> {
    let format = FileFormat::from_path(file_path)?;
    let rows = read_rows(file_path).inspect_err(|e| {
        tracing::error!(file = %file_path.display(), error = %e, "import parse failed");
    })?;
    let txns = normalize_rows(&rows, ingested_at);
    if txns.is_empty() {
        tracing::warn!(file = %file_path.display(), "import produced no records");
        return Err(DcasError::NoRecords);
    }
    tracing::info!(
        file = %file_path.display(),
        format = format.key(),
        records = txns.len(),
        "imported transactions"
    );
    Ok(txns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxnType;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("gl.csv")).unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("GL.XLSX")).unwrap(), FileFormat::Xlsx);
        assert_eq!(FileFormat::from_path(Path::new("old.xls")).unwrap(), FileFormat::Xls);
        assert!(matches!(
            FileFormat::from_path(Path::new("notes.pdf")),
            Err(DcasError::UnsupportedFormat(name)) if name == "notes.pdf"
        ));
        assert!(FileFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_read_csv_rows_keys_by_header() {
        let content = "Date,Description,Amount\n2023-10-01,Office Supplies,\"1,500,000\"\n\n2023-10-02,Sales,25000000\n";
        let rows = read_csv_rows(content.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Description"], CellValue::Text("Office Supplies".into()));
        assert_eq!(rows[0]["Amount"], CellValue::Text("1,500,000".into()));
    }

    #[test]
    fn test_read_csv_short_record() {
        let content = "Date,Description,Amount\n2023-10-01\n";
        let rows = read_csv_rows(content.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].get("Amount").is_none());
    }

    #[test]
    fn test_import_file_normalizes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "gl.csv",
            "Tanggal,Keterangan,No Bukti,Nominal,Tipe\n\
             2023-10-01,Setoran,BKM-001,Rp 2.000.000,Masuk Debit\n\
             2023-10-02,Bayar listrik,BKK-001,2500000,Kredit\n",
        );
        let txns = import_file(&path, at()).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].reference_no, "BKM-001");
        assert_eq!(txns[0].txn_type, TxnType::Debit);
        assert_eq!(txns[1].amount, 2_500_000.0);
        assert_eq!(txns[1].txn_type, TxnType::Credit);
    }

    #[test]
    fn test_import_header_only_file_has_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "empty.csv", "Date,Description,Amount\n");
        assert!(matches!(import_file(&path, at()), Err(DcasError::NoRecords)));
    }

    #[test]
    fn test_import_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "ledger.txt", "Date\n2023-01-01\n");
        assert!(matches!(
            import_file(&path, at()),
            Err(DcasError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_import_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        assert!(matches!(import_file(&path, at()), Err(DcasError::Io(_))));
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0).as_deref(), Some("2025-01-10"));
    }

    #[test]
    fn test_excel_serial_out_of_range() {
        assert_eq!(excel_serial_to_date(1.0e12), None);
        assert_eq!(excel_serial_to_date(-1.0e12), None);
    }

    #[test]
    fn test_invalid_utf8_csv_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        let mut content = b"Date,Description,Amount\n2023-10-01,".to_vec();
        content.extend_from_slice(&[0xff, 0xfe, 0xfd]);
        content.extend_from_slice(b",1000\n");
        std::fs::write(&path, content).unwrap();
        assert!(matches!(import_file(&path, at()), Err(DcasError::Csv(_))));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_cell_from_data() {
        use calamine::Data;
        assert_eq!(cell_from_data(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(cell_from_data(&Data::String("x".into())), CellValue::Text("x".into()));
        assert_eq!(cell_from_data(&Data::Bool(true)), CellValue::Text("true".into()));
        assert_eq!(cell_from_data(&Data::Empty), CellValue::Empty);
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_out_of_range_date_cell_stays_numeric() {
        use calamine::{Data, ExcelDateTime, ExcelDateTimeType};
        let dt = ExcelDateTime::new(1.0e12, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_from_data(&Data::DateTime(dt)), CellValue::Number(1.0e12));
    }

    #[cfg(feature = "xlsx")]
    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_read_spreadsheet_first_sheet() {
        let rows = read_spreadsheet_rows(&fixture("ledger.xlsx")).unwrap();
        // blank row 3 skipped, second sheet ignored
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Date"], CellValue::Text("2023-10-01".into()));
        assert_eq!(rows[0]["Description"], CellValue::Text("Setoran kas".into()));
        assert_eq!(rows[0]["Amount"], CellValue::Number(2_500_000.0));
        assert_eq!(rows[1]["Date"], CellValue::Text("2023-10-02".into()));
        assert_eq!(rows[1]["Ref"], CellValue::Number(1042.0));
        assert!(rows.iter().all(|r| !r.contains_key("Ignored")));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_import_spreadsheet_normalizes() {
        let txns = import_file(&fixture("ledger.xlsx"), at()).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].date, "2023-10-01");
        assert_eq!(txns[0].reference_no, "BKM-201");
        assert_eq!(txns[0].amount, 2_500_000.0);
        assert_eq!(txns[0].txn_type, TxnType::Debit);
        assert_eq!(txns[1].reference_no, "1042");
        assert_eq!(txns[1].amount, 7_500_000.0);
        assert_eq!(txns[1].txn_type, TxnType::Credit);
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_corrupt_spreadsheet_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "broken.xlsx", "this is not a zip archive");
        assert!(matches!(
            import_file(&path, at()),
            Err(DcasError::Spreadsheet(_))
        ));
    }
}
