use serde::{Deserialize, Serialize};

/// Options for [`format_number`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatOptions {
    pub locale: String,
    pub minimum_fraction_digits: usize,
    pub maximum_fraction_digits: usize,
    pub use_grouping: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            locale: "en-US".to_string(),
            minimum_fraction_digits: 0,
            maximum_fraction_digits: 3,
            use_grouping: true,
        }
    }
}

/// Digit separators of a locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Separators {
    pub group: &'static str,
    pub decimal: &'static str,
}

impl Separators {
    /// Separators for a BCP 47 tag; unknown languages use English ones
    pub(crate) fn for_locale(locale: &str) -> Self {
        let language = locale.split(['-', '_']).next().unwrap_or_default().to_lowercase();
        match language.as_str() {
            "de" | "es" | "it" | "nl" | "pt" | "id" | "tr" => Separators {
                group: ".",
                decimal: ",",
            },
            "fr" | "ru" | "pl" | "cs" | "sv" | "fi" | "nb" => Separators {
                group: "\u{202f}",
                decimal: ",",
            },
            _ => Separators {
                group: ",",
                decimal: ".",
            },
        }
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// `abs` rounded to `max` decimals with trailing zeros trimmed down to `min`
pub(crate) fn fixed_digits(abs: f64, min: usize, max: usize) -> (String, String) {
    let max = max.max(min);
    let text = format!("{:.*}", max, abs);
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (text, String::new()),
    };

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min {
        frac.push('0');
    }
    (int_part, frac)
}

pub(crate) fn render(value: f64, min: usize, max: usize, grouping: bool, separators: Separators) -> String {
    let (int_part, frac) = fixed_digits(value.abs(), min, max);
    let is_zero = int_part.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');

    let mut out = String::new();
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    if grouping {
        out.push_str(&group_digits(&int_part, separators.group));
    } else {
        out.push_str(&int_part);
    }
    if !frac.is_empty() {
        out.push_str(separators.decimal);
        out.push_str(&frac);
    }
    out
}

/// Formats a number with locale digit separators.
///
/// `None`, NaN and infinities format as an empty string.
pub fn format_number(value: Option<f64>, options: &FormatOptions) -> String {
    match value {
        Some(v) if v.is_finite() => render(
            v,
            options.minimum_fraction_digits,
            options.maximum_fraction_digits,
            options.use_grouping,
            Separators::for_locale(&options.locale),
        ),
        _ => String::new(),
    }
}

const COMPACT_UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Short form with at most two decimals: `1234` → `1.23K`, `2500000` → `2.5M`
pub(crate) fn compact_parts(value: f64, locale: &str) -> String {
    let separators = Separators::for_locale(locale);
    let abs = value.abs();

    for (i, (scale, suffix)) in COMPACT_UNITS.iter().enumerate() {
        if abs < *scale {
            continue;
        }
        let (int_part, _) = fixed_digits(abs / scale, 0, 2);
        // 999_999 rounds to 1000K; promote to the next unit up
        if int_part == "1000" && i > 0 {
            let (bigger, bigger_suffix) = COMPACT_UNITS[i - 1];
            return render(value / bigger, 0, 2, false, separators) + bigger_suffix;
        }
        return render(value / scale, 0, 2, false, separators) + suffix;
    }

    if abs >= 999.995 {
        return render(value / 1e3, 0, 2, false, separators) + "K";
    }
    render(value, 0, 2, false, separators)
}

/// Compact notation, e.g. `1.5M`. `None` and non-finite values give `""`.
pub fn format_compact_number(value: Option<f64>, locale: &str) -> String {
    match value {
        Some(v) if v.is_finite() => compact_parts(v, locale),
        _ => String::new(),
    }
}
