//! Numeric amount and currency resolution for a located money expression.

use regex::Captures;

use pricetruth_core::Currency;

/// Parse a matched number, resolving `,`/`.` as thousands or decimal marks.
///
/// - Both marks present: the last one is the decimal mark.
/// - A single mark followed by exactly three digits groups thousands.
/// - Any other single mark is the decimal mark.
///
/// A mark that occurs more than once is always a thousands separator. Spaces
/// (including no-break and narrow no-break) only ever group thousands.
pub fn parse_amount(number: &str) -> Option<f64> {
    let decimal = match (number.rfind(','), number.rfind('.')) {
        (Some(comma), Some(dot)) => Some(comma.max(dot)),
        (Some(idx), None) | (None, Some(idx)) => {
            let mark = &number[idx..=idx];
            let once = number.matches(mark).count() == 1;
            let digits_after = number.len() - idx - 1;
            (once && digits_after != 3).then_some(idx)
        }
        (None, None) => None,
    };

    let mut plain = String::with_capacity(number.len());
    for (idx, ch) in number.char_indices() {
        match ch {
            '0'..='9' => plain.push(ch),
            ',' | '.' if Some(idx) == decimal => plain.push('.'),
            ',' | '.' | ' ' | '\u{00A0}' | '\u{202F}' => {}
            _ => return None,
        }
    }

    plain.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// The number group of a [`MONEY`](pricetruth_extraction::matchers::MONEY) match.
pub(crate) fn number_of<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    ["num", "num2", "num3"]
        .iter()
        .find_map(|name| caps.name(name))
        .map(|m| m.as_str())
}

/// Resolve the currency of a money match.
///
/// An ISO code refines a bare `$`; any other disagreement between symbol and
/// code is unresolvable.
pub(crate) fn currency_of(caps: &Captures<'_>) -> Option<Currency> {
    let symbol = ["sym", "sym2", "sym3"]
        .iter()
        .find_map(|name| caps.name(name))
        .map(|m| m.as_str());
    let code = ["code", "code2", "code3"]
        .iter()
        .find_map(|name| caps.name(name))
        .map(|m| m.as_str());

    match (symbol, code) {
        (Some(symbol), None) => Currency::from_symbol(symbol),
        (None, Some(code)) => Currency::from_code(code),
        (Some(symbol), Some(code)) => {
            let by_code = Currency::from_code(code)?;
            if Currency::is_generic_dollar_symbol(symbol) {
                return Some(by_code);
            }
            (Currency::from_symbol(symbol)? == by_code).then_some(by_code)
        }
        (None, None) => None,
    }
}
