/// Strips byte-order and zero-width marks and collapses inner whitespace.
/// Blank cells come back as `None`.
pub(crate) fn clean_cell(value: &str) -> Option<String> {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Numeric cell as written by spreadsheet exports: `"6"`, `"6.0"`, `"14.5"` or
/// `"1,250"`.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let cleaned = clean_cell(value)?.replace(',', "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Integral answer code. `"2.0"` is accepted, `"2.5"` is not.
pub(crate) fn parse_code(value: &str) -> Option<u8> {
    let number = parse_number(value)?;
    if number.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&number) {
        return None;
    }
    Some(number as u8)
}
