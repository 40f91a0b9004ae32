/// `value` with `decimals` fixed decimals and a `%` sign; `12.5` → `12.50%`
pub fn format_percentage(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.*}%", decimals, v),
        _ => String::new(),
    }
}

/// Like [`format_percentage`] for a ratio; `0.125` → `12.50%`
pub fn format_percentage_from_decimal(value: Option<f64>, decimals: usize) -> String {
    format_percentage(value.map(|v| v * 100.0), decimals)
}
