use super::number::{compact_parts, render, Separators};

/// Symbol for an ISO 4217 code, when one is commonly used
fn currency_symbol(code: &str) -> Option<&'static str> {
    let symbol = match code.to_uppercase().as_str() {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "CNY" => "CN¥",
        "INR" => "₹",
        "KRW" => "₩",
        "CAD" => "CA$",
        "AUD" => "A$",
        _ => return None,
    };
    Some(symbol)
}

fn with_currency(body: String, negative: bool, currency: &str) -> String {
    let sign = if negative { "-" } else { "" };
    match currency_symbol(currency) {
        Some(symbol) => format!("{}{}{}", sign, symbol, body),
        None => format!("{}{} {}", sign, currency.to_uppercase(), body),
    }
}

/// Amount with two decimals and the currency symbol, e.g. `$1,234.50`.
///
/// Codes without a known symbol are written out: `CHF 12.00`.
pub fn format_currency(value: Option<f64>, currency: &str, locale: &str) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let body = render(v.abs(), 2, 2, true, Separators::for_locale(locale));
            with_currency(body, v < 0.0 && body_is_nonzero(v), currency)
        }
        _ => String::new(),
    }
}

fn body_is_nonzero(v: f64) -> bool {
    v.abs() >= 0.005
}

/// Compact amount, e.g. `$1.5M`
pub fn format_compact_currency(value: Option<f64>, currency: &str, locale: &str) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let body = compact_parts(v.abs(), locale);
            let negative = v < 0.0 && body != "0";
            with_currency(body, negative, currency)
        }
        _ => String::new(),
    }
}
