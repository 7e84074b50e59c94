/// Group digits with dots, Indonesian style: 1500000 -> "1.500.000".
/// Fractions are kept to two places behind a comma.
pub fn rupiah(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let mut grouped: String = grouped.chars().rev().collect();

    if dec_part != "00" {
        grouped.push(',');
        grouped.push_str(dec_part.trim_end_matches('0'));
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn idr(val: f64) -> String {
    format!("IDR {}", rupiah(val))
}
