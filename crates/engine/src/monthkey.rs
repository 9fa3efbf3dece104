//! Compact month-encoded values (`MAAAA`, e.g. `12024` = Jan 2024) mapped
//! to sortable `YYYYMM` keys. Keys sort lexicographically in chronological
//! order.

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Parse a month/year cell into a sortable `YYYYMM` key.
///
/// Non-digits are stripped first; the last 4 digits are the year and the
/// 1–2 leading digits the month. Anything else is rejected.
pub fn parse_month_year(value: &str) -> Option<String> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 5 || digits.len() > 6 {
        return None;
    }
    let (month_part, year) = digits.split_at(digits.len() - 4);
    let month: u32 = month_part.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(format!("{year}{month:02}"))
}

/// Display label for a `YYYYMM` key, e.g. `"202401"` → `"Jan/24"`.
pub fn month_label(key: &str) -> String {
    let month: usize = key.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(0);
    let year = key.get(2..4).unwrap_or("");
    match month {
        1..=12 => format!("{}/{year}", MONTH_ABBREV[month - 1]),
        _ => key.to_string(),
    }
}
