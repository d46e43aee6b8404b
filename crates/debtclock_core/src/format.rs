//! Display formatting for debt figures
//!
//! Two renderings share one pipeline: plain text, and markup where every
//! digit and grouping separator sits in its own container so a fixed-pitch
//! stylesheet keeps the number from jiggling while it animates.
//!
//! Callers are expected to pass finite, non-negative amounts. Anything else
//! still produces a string but its content is unspecified.

use serde::{Deserialize, Serialize};

const TRILLION: f64 = 1_000_000_000_000.0;

const CURRENCY_SYMBOL: &str = "$";
const DIGIT_OPEN: &str = r#"<span class="digit-container">"#;
const COMMA_OPEN: &str = r#"<span class="digit-container comma">"#;
const SYMBOL_OPEN: &str = r#"<span class="currency-symbol">"#;
const CLOSE: &str = "</span>";

/// Options controlling how an amount is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Prefix with "$"
    pub show_symbol: bool,
    /// Insert "," every three integer digits
    pub use_grouping: bool,
    /// Render amounts of one trillion or more as "36.22T"
    pub abbreviate_trillions: bool,
    /// Drop cents (truncating toward zero)
    pub round_to_integer: bool,
    /// Hosts should render with [`format_markup`] instead of [`format_plain`]
    pub fixed_width_digits: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_symbol: true,
            use_grouping: true,
            abbreviate_trillions: false,
            round_to_integer: true,
            fixed_width_digits: true,
        }
    }
}

/// Format an amount as plain text, e.g. `$36,215,124,313,382`
pub fn format_plain(amount: f64, opts: &DisplayOptions) -> String {
    let body = number_body(amount, opts);
    if opts.show_symbol {
        format!("{CURRENCY_SYMBOL}{body}")
    } else {
        body
    }
}

/// Format an amount as markup with one container per digit and separator.
///
/// Characters other than digits and separators (the decimal point, the "T"
/// suffix) are emitted bare.
pub fn format_markup(amount: f64, opts: &DisplayOptions) -> String {
    let body = number_body(amount, opts);
    let mut out = String::with_capacity(body.len() * (DIGIT_OPEN.len() + CLOSE.len()) + 48);

    if opts.show_symbol {
        out.push_str(SYMBOL_OPEN);
        out.push_str(CURRENCY_SYMBOL);
        out.push_str(CLOSE);
    }

    for c in body.chars() {
        match c {
            '0'..='9' => {
                out.push_str(DIGIT_OPEN);
                out.push(c);
                out.push_str(CLOSE);
            }
            ',' => {
                out.push_str(COMMA_OPEN);
                out.push(c);
                out.push_str(CLOSE);
            }
            _ => out.push(c),
        }
    }

    out
}

/// Number without the currency symbol
fn number_body(amount: f64, opts: &DisplayOptions) -> String {
    if opts.abbreviate_trillions && amount >= TRILLION {
        return format!("{:.2}T", amount / TRILLION);
    }

    let digits = if opts.round_to_integer {
        format!("{:.0}", amount.trunc())
    } else {
        amount.to_string()
    };

    if opts.use_grouping {
        group_thousands(&digits)
    } else {
        digits
    }
}

/// Insert separators into the integer part of a decimal string.
///
/// The fractional part and any leading sign are left alone. Strings that are
/// not plain decimals (`NaN`, `inf`) come back unchanged.
fn group_thousands(digits: &str) -> String {
    let (sign, unsigned) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    if integer.is_empty() || !integer.bytes().all(|b| b.is_ascii_digit()) {
        return digits.to_string();
    }

    let len = integer.len();
    let mut out = String::with_capacity(digits.len() + len / 3);
    out.push_str(sign);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}
