//! Money and cadence parsing.
//!
//! A price is always parsed from exactly one located money expression. The
//! surrounding window supplies cadence and seat information; it is clipped at
//! neighbouring money expressions so two prices never share keywords.

use core::ops::Range;

use regex::{Match, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pricetruth_core::{Currency, EntityRef, Gap, GapCode, ValueObject};
use pricetruth_extraction::EvidenceSnippet;
use pricetruth_extraction::matchers::{
    BARE_NUMBER, MONEY, MONTH_KEYWORD, MoneyMatch, PER_SEAT, SEAT_COUNT, UNSUPPORTED_CADENCE,
    YEAR_KEYWORD, find_money,
};

use crate::amount::{currency_of, number_of, parse_amount};

/// Characters inspected before the money expression.
const WINDOW_BEFORE: usize = 24;
/// Characters inspected after the money expression.
const WINDOW_AFTER: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cadence {
    Month,
    Year,
    Unknown,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Month => "MONTH",
            Cadence::Year => "YEAR",
            Cadence::Unknown => "UNKNOWN",
        }
    }
}

impl core::fmt::Display for Cadence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parsed price came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceOrigin {
    Snippet { source_url: String, char_offset: usize },
    ProductInput,
}

impl PriceOrigin {
    pub fn entity_ref(&self) -> EntityRef {
        match self {
            PriceOrigin::Snippet {
                source_url,
                char_offset,
            } => EntityRef::Snippet {
                source_url: source_url.clone(),
                char_offset: *char_offset,
            },
            PriceOrigin::ProductInput => EntityRef::Product,
        }
    }

    /// `true` when this origin is exactly `snippet`.
    pub fn is_snippet(&self, snippet: &EvidenceSnippet) -> bool {
        matches!(
            self,
            PriceOrigin::Snippet { source_url, char_offset }
                if source_url == snippet.source_url() && *char_offset == snippet.char_offset()
        )
    }
}

/// A price read from one snippet (or from the product's stated price).
///
/// Produced only by [`parse_snippet`] and [`parse_text`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedPrice {
    amount: f64,
    currency_code: Currency,
    cadence: Cadence,
    per_seat: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    seat_count: Option<u32>,
    price_text: String,
    origin: PriceOrigin,
}

impl ValueObject for ParsedPrice {}

impl ParsedPrice {
    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn currency_code(&self) -> Currency {
        self.currency_code
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn per_seat(&self) -> bool {
        self.per_seat
    }

    pub fn seat_count(&self) -> Option<u32> {
        self.seat_count
    }

    pub fn price_text(&self) -> &str {
        &self.price_text
    }

    pub fn origin(&self) -> &PriceOrigin {
        &self.origin
    }
}

/// Why a text could not be read as a price. Each failure becomes one gap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("no numeric amount")]
    NoAmount,

    #[error("no resolvable currency for {0:?}")]
    UnresolvableCurrency(String),

    #[error("both monthly and yearly cadence keywords near the amount")]
    ConflictingCadence,

    #[error("unsupported billing cadence {0:?}")]
    UnsupportedCadence(String),

    #[error("amount is zero")]
    ZeroAmount,
}

impl ParseFailure {
    pub fn code(&self) -> GapCode {
        match self {
            ParseFailure::NoAmount => GapCode::NoAmount,
            ParseFailure::UnresolvableCurrency(_) => GapCode::UnresolvableCurrency,
            ParseFailure::ConflictingCadence => GapCode::ConflictingCadence,
            ParseFailure::UnsupportedCadence(_) => GapCode::UnsupportedCadence,
            ParseFailure::ZeroAmount => GapCode::ZeroAmount,
        }
    }

    /// Gap for this failure; `text` is the price text that failed.
    pub fn to_gap(&self, text: &str, entity: EntityRef) -> Gap {
        Gap::new(
            self.code(),
            format!("could not parse price from {text:?}: {self}"),
            entity,
        )
    }
}

/// Parse the money expression a snippet was built around.
pub fn parse_snippet(snippet: &EvidenceSnippet) -> Result<ParsedPrice, ParseFailure> {
    let text = snippet.text();
    let range = snippet.price_range();
    let anchors = find_money(text);
    let anchor = anchors
        .iter()
        .copied()
        .find(|m| m.start == range.start)
        .unwrap_or(MoneyMatch {
            start: range.start,
            end: range.end,
            money_end: range.end,
        });

    let origin = PriceOrigin::Snippet {
        source_url: snippet.source_url().to_string(),
        char_offset: snippet.char_offset(),
    };
    parse_at(text, &anchors, anchor, origin)
}

/// Parse free text such as the product's stated price. The first money
/// expression wins.
pub fn parse_text(text: &str) -> Result<ParsedPrice, ParseFailure> {
    let anchors = find_money(text);
    match anchors.first().copied() {
        Some(anchor) => parse_at(text, &anchors, anchor, PriceOrigin::ProductInput),
        // Currency present but the figure is cut short ("€1 2999").
        None if MONEY.is_match(text) => Err(ParseFailure::NoAmount),
        None if BARE_NUMBER.is_match(text) => {
            Err(ParseFailure::UnresolvableCurrency(text.trim().to_string()))
        }
        None => Err(ParseFailure::NoAmount),
    }
}

fn parse_at(
    text: &str,
    anchors: &[MoneyMatch],
    anchor: MoneyMatch,
    origin: PriceOrigin,
) -> Result<ParsedPrice, ParseFailure> {
    let money = &text[anchor.start..anchor.money_end];
    let caps = MONEY.captures(money).ok_or(ParseFailure::NoAmount)?;
    let amount = number_of(&caps)
        .and_then(parse_amount)
        .ok_or(ParseFailure::NoAmount)?;
    let currency_code =
        currency_of(&caps).ok_or_else(|| ParseFailure::UnresolvableCurrency(money.to_string()))?;
    if amount == 0.0 {
        return Err(ParseFailure::ZeroAmount);
    }

    let window = window(text, anchors, anchor);
    let cadence = match cadence_in(text, anchor.money_end..anchor.end)? {
        Some(cadence) => cadence,
        None => cadence_in(text, window.clone())?.unwrap_or(Cadence::Unknown),
    };
    // "a user-friendly" is an adjective, not a seat unit.
    let per_seat = within(&PER_SEAT, text, &window).any(|m| !text[m.end()..].starts_with('-'));
    let seat_count = seat_count(text, &window, anchor);

    Ok(ParsedPrice {
        amount,
        currency_code,
        cadence,
        per_seat,
        seat_count,
        price_text: text[anchor.start..anchor.end].to_string(),
        origin,
    })
}

/// Byte range inspected for cadence and seat keywords around `anchor`.
fn window(text: &str, anchors: &[MoneyMatch], anchor: MoneyMatch) -> Range<usize> {
    let lower = anchors
        .iter()
        .filter(|m| m.end <= anchor.start)
        .map(|m| m.end)
        .max()
        .unwrap_or(0);
    let upper = anchors
        .iter()
        .filter(|m| m.start >= anchor.end)
        .map(|m| m.start)
        .min()
        .unwrap_or(text.len());

    let start = text[..anchor.start]
        .char_indices()
        .rev()
        .take(WINDOW_BEFORE)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(anchor.start);
    let end = text[anchor.end..]
        .char_indices()
        .nth(WINDOW_AFTER)
        .map(|(i, _)| anchor.end + i)
        .unwrap_or(text.len());

    start.max(lower)..end.min(upper)
}

/// Matches lying entirely inside `range`. Word boundaries are judged against
/// the whole text, so a word cut by the window edge never matches.
fn within<'t>(
    re: &'t Regex,
    text: &'t str,
    range: &Range<usize>,
) -> impl Iterator<Item = Match<'t>> + 't {
    let range = range.clone();
    re.find_iter(text)
        .filter(move |m| m.start() >= range.start && m.end() <= range.end)
}

/// Cadence named inside `range`, if any.
///
/// Month and year keywords together are a conflict. Week/day/one-off wording
/// only counts when neither appears.
fn cadence_in(text: &str, range: Range<usize>) -> Result<Option<Cadence>, ParseFailure> {
    let month = within(&MONTH_KEYWORD, text, &range).next().is_some();
    let year = within(&YEAR_KEYWORD, text, &range).next().is_some();
    match (month, year) {
        (true, true) => Err(ParseFailure::ConflictingCadence),
        (true, false) => Ok(Some(Cadence::Month)),
        (false, true) => Ok(Some(Cadence::Year)),
        (false, false) => match within(&UNSUPPORTED_CADENCE, text, &range).next() {
            Some(m) => Err(ParseFailure::UnsupportedCadence(m.as_str().trim().to_string())),
            None => Ok(None),
        },
    }
}

/// First explicit seat count in the window that is not a cap, not open-ended
/// and not the amount itself.
fn seat_count(text: &str, window: &Range<usize>, anchor: MoneyMatch) -> Option<u32> {
    SEAT_COUNT.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        if whole.start() < window.start || whole.end() > window.end {
            return None;
        }
        if caps.name("cap").is_some() || caps.name("plus").is_some() {
            return None;
        }
        let count = caps.name("count")?;
        if count.start() < anchor.money_end && count.end() > anchor.start {
            return None;
        }
        count.as_str().parse::<u32>().ok().filter(|n| *n > 0)
    })
}
