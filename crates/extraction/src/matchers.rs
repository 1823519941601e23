//! Heuristic matchers shared by the extractor and the price parser.
//!
//! All patterns are compiled once. Everything here is a literal lexicon: a
//! match only ever *locates* text, it never produces text of its own.

use std::sync::LazyLock;

use regex::Regex;

use pricetruth_core::{CURRENCY_SYMBOLS, Currency};

/// A number with optional thousands groups and a 1-2 digit decimal part.
///
/// Groups are separated by `,`, `.` or a (narrow/no-break) space; an ungrouped
/// run is at most 12 digits.
const NUMBER: &str = r"[0-9]{1,3}(?:[,.][0-9]{3}){1,4}(?:[.,][0-9]{1,2})?|[0-9]{1,3}(?:[ \x{00A0}\x{202F}][0-9]{3}){1,4}(?:[.,][0-9]{1,2})?|[0-9]{1,12}(?:[.,][0-9]{1,2})?";

const GROUP_SEPARATORS: [char; 5] = [' ', '\u{00A0}', '\u{202F}', ',', '.'];

const SEAT_NOUNS: &str = r"seats?|users?|members?|licen[cs]es?|agents?|editors?";

fn symbol_alternation() -> String {
    CURRENCY_SYMBOLS
        .iter()
        .map(|(symbol, _)| regex::escape(symbol))
        .collect::<Vec<_>>()
        .join("|")
}

fn code_alternation() -> String {
    Currency::ALL
        .iter()
        .map(|c| c.code())
        .collect::<Vec<_>>()
        .join("|")
}

/// Money expression: symbol and/or ISO code adjacent to a number.
///
/// Named groups: `sym`/`num`/`code` (symbol first), `code2`/`sym2`/`num2`
/// (code first), `num3`/`sym3`/`code3` (number first).
pub static MONEY: LazyLock<Regex> = LazyLock::new(|| {
    let sym = symbol_alternation();
    let codes = code_alternation();
    let pattern = format!(
        r"(?P<sym>{sym})\s?(?P<num>{NUMBER})(?:\s?\b(?P<code>(?i:{codes}))\b)?|\b(?P<code2>(?i:{codes}))\s?(?P<sym2>{sym})?\s?(?P<num2>{NUMBER})|\b(?P<num3>{NUMBER})\s?(?:(?P<sym3>{sym})|(?P<code3>(?i:{codes}))\b)"
    );
    Regex::new(&pattern).expect("money pattern is valid")
});

/// Cadence/seat suffix directly after a money expression ("/seat/month",
/// " per month", ", billed annually").
pub static PRICE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)^(?:\s*(?:/|\bper\b|\ba\b|\beach\b|\bevery\b)\s*(?:{SEAT_NOUNS}|months?|mo|mth|years?|yrs?|annum|weeks?|wk|days?)\b){{0,2}}(?:,?\s*(?:billed\s+)?(?:monthly|annually|yearly)\b)?"
    );
    Regex::new(&pattern).expect("price suffix pattern is valid")
});

/// Any bare number, used to tell "no amount" apart from "no currency".
pub static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:[.,][0-9]+)*").expect("number pattern is valid"));

pub static MONTH_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:months?|monthly|mo|mos|mth)\b").expect("month pattern is valid")
});

pub static YEAR_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:years?|yearly|annual|annually|annum|yr|yrs)\b")
        .expect("year pattern is valid")
});

/// Cadences the pipeline refuses to convert (week, day, one-off payments).
///
/// Only the structured forms count, so "14-day trial" next to a monthly price
/// is not read as a daily cadence.
pub static UNSUPPORTED_CADENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:/|\bper\b|\ba\b|\beach\b)\s*(?P<unit>weeks?|wk|days?)\b|\b(?P<word>weekly|daily|one[- ]time|lifetime)\b",
    )
    .expect("unsupported cadence pattern is valid")
});

pub static PER_SEAT: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?i)(?:/|\b(?:per|each|a)\b[\s-]*)\s*(?:{SEAT_NOUNS})\b");
    Regex::new(&pattern).expect("per-seat pattern is valid")
});

/// Explicit seat count ("for 5 users", "3 seats"), with the qualifiers that
/// disqualify it captured separately.
pub static SEAT_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)(?:\b(?P<cap>up\s+to|max(?:imum)?)\s+)?\b(?P<count>[0-9]{{1,5}})\s*(?P<plus>\+)?\s*(?:{SEAT_NOUNS})\b"
    );
    Regex::new(&pattern).expect("seat count pattern is valid")
});

/// A located money expression inside some text (byte offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoneyMatch {
    /// Start of the whole expression.
    pub start: usize,
    /// End of the expression including any cadence/seat suffix.
    pub end: usize,
    /// End of the bare money part (before the suffix).
    pub money_end: usize,
}

/// Find every money expression in `text`, in order, extended by its suffix.
///
/// A match whose number is only part of a longer figure ("€1 2999", a digit
/// run past the length limit) is dropped rather than read as a smaller price.
pub fn find_money(text: &str) -> Vec<MoneyMatch> {
    let bare: Vec<(usize, usize)> = MONEY
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = ["num", "num2", "num3"].iter().find_map(|name| caps.name(name))?;
            let cut = continues_number(text, number.end())
                || (number.start() == whole.start() && follows_number(text, whole.start()));
            (!cut).then(|| (whole.start(), whole.end()))
        })
        .collect();

    let mut out = Vec::with_capacity(bare.len());
    for (idx, &(start, money_end)) in bare.iter().enumerate() {
        let limit = bare.get(idx + 1).map(|&(s, _)| s).unwrap_or(text.len());
        let suffix_len = PRICE_SUFFIX
            .find(&text[money_end..limit])
            .map(|m| m.end())
            .unwrap_or(0);
        out.push(MoneyMatch {
            start,
            end: money_end + suffix_len,
            money_end,
        });
    }
    out
}

/// More digits right after `end`, directly or after a group separator.
fn continues_number(text: &str, end: usize) -> bool {
    let mut rest = text[end..].chars();
    match rest.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some(c) if GROUP_SEPARATORS.contains(&c) => {
            rest.take_while(char::is_ascii_digit).count() >= 3
        }
        _ => false,
    }
}

/// A digit right before `start`, directly or across a group separator.
fn follows_number(text: &str, start: usize) -> bool {
    let mut before = text[..start].chars().rev();
    match before.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some(c) if GROUP_SEPARATORS.contains(&c) => {
            before.next().is_some_and(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}
