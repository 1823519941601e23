//! The normalization guard: the only place a monthly USD value is produced.

use serde::Serialize;

use pricetruth_core::{Currency, EntityRef, Gap, GapCode, ValueObject};

use crate::fx::FxTable;
use crate::parse::{Cadence, ParsedPrice, PriceOrigin};

/// One arithmetic step applied while normalizing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum NormalizationStep {
    FxConverted { from: Currency, usd_per_unit: f64 },
    SeatsMultiplied { seats: u32 },
    AnnualToMonthly,
}

impl core::fmt::Display for NormalizationStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NormalizationStep::FxConverted { from, usd_per_unit } => {
                write!(f, "converted {from} to USD at {usd_per_unit}")
            }
            NormalizationStep::SeatsMultiplied { seats } => {
                write!(f, "multiplied by {seats} seats")
            }
            NormalizationStep::AnnualToMonthly => f.write_str("divided yearly price by 12"),
        }
    }
}

/// A monthly USD value together with how it was derived.
///
/// Has no public constructor: [`normalize`] is the single writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPrice {
    monthly_usd: f64,
    steps: Vec<NormalizationStep>,
    price_text: String,
    origin: PriceOrigin,
}

impl ValueObject for NormalizedPrice {}

impl NormalizedPrice {
    pub fn monthly_usd(&self) -> f64 {
        self.monthly_usd
    }

    pub fn steps(&self) -> &[NormalizationStep] {
        &self.steps
    }

    pub fn price_text(&self) -> &str {
        &self.price_text
    }

    pub fn origin(&self) -> &PriceOrigin {
        &self.origin
    }

    /// Human-readable derivation, e.g.
    ///
    /// ```text
    /// "€120/year" -> converted EUR to USD at 1.1; divided yearly price by 12 = 11.00 USD/month
    /// ```
    pub fn method(&self) -> String {
        let steps = if self.steps.is_empty() {
            "stated in monthly USD".to_string()
        } else {
            self.steps
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        };
        format!(
            "{:?} -> {steps} = {:.2} USD/month",
            self.price_text, self.monthly_usd
        )
    }
}

/// Why a parsed price was not normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationBlocked {
    AmbiguousCadence,
    PerSeatWithoutSeatCount,
    MissingFxRate { currency: Currency },
    /// The monthly value rounds to zero cents.
    BelowOneCent,
}

impl NormalizationBlocked {
    pub fn code(&self) -> GapCode {
        match self {
            NormalizationBlocked::AmbiguousCadence => GapCode::AmbiguousCadence,
            NormalizationBlocked::PerSeatWithoutSeatCount => GapCode::PerSeatWithoutSeatCount,
            NormalizationBlocked::MissingFxRate { .. } => GapCode::MissingFxRate,
            NormalizationBlocked::BelowOneCent => GapCode::ZeroAmount,
        }
    }

    /// Gap for this block; the original price text is kept in the message.
    pub fn to_gap(&self, price_text: &str, entity: EntityRef) -> Gap {
        let reason = match self {
            NormalizationBlocked::AmbiguousCadence => {
                "billing cadence is not stated".to_string()
            }
            NormalizationBlocked::PerSeatWithoutSeatCount => {
                "per-seat pricing without seat count".to_string()
            }
            NormalizationBlocked::MissingFxRate { currency } => {
                format!("no FX rate supplied for {currency}")
            }
            NormalizationBlocked::BelowOneCent => {
                "monthly value rounds to zero".to_string()
            }
        };
        Gap::new(
            self.code(),
            format!("{price_text:?} not normalized: {reason}"),
            entity,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizationOutcome {
    Normalized(NormalizedPrice),
    Blocked(NormalizationBlocked),
}

impl NormalizationOutcome {
    pub fn normalized(&self) -> Option<&NormalizedPrice> {
        match self {
            NormalizationOutcome::Normalized(price) => Some(price),
            NormalizationOutcome::Blocked(_) => None,
        }
    }
}

/// Convert a parsed price to monthly USD, or say why not.
///
/// Checks run in a fixed order: cadence, FX, seats. The result is rounded
/// to cents.
pub fn normalize(price: &ParsedPrice, fx: &FxTable) -> NormalizationOutcome {
    use NormalizationOutcome::Blocked;

    let yearly = match price.cadence() {
        Cadence::Unknown => return Blocked(NormalizationBlocked::AmbiguousCadence),
        Cadence::Month => false,
        Cadence::Year => true,
    };

    let mut steps = Vec::new();
    let mut value = price.amount();

    let currency = price.currency_code();
    if currency != Currency::Usd {
        let Some(rate) = fx.rate(currency) else {
            return Blocked(NormalizationBlocked::MissingFxRate { currency });
        };
        value *= rate;
        steps.push(NormalizationStep::FxConverted {
            from: currency,
            usd_per_unit: rate,
        });
    }

    if price.per_seat() {
        let Some(seats) = price.seat_count() else {
            return Blocked(NormalizationBlocked::PerSeatWithoutSeatCount);
        };
        value *= f64::from(seats);
        steps.push(NormalizationStep::SeatsMultiplied { seats });
    }

    if yearly {
        value /= 12.0;
        steps.push(NormalizationStep::AnnualToMonthly);
    }

    let monthly_usd = round_to_cents(value);
    if !monthly_usd.is_finite() || monthly_usd <= 0.0 {
        return Blocked(NormalizationBlocked::BelowOneCent);
    }

    tracing::trace!(price_text = price.price_text(), monthly_usd, "normalized price");
    NormalizationOutcome::Normalized(NormalizedPrice {
        monthly_usd,
        steps,
        price_text: price.price_text().to_string(),
        origin: price.origin().clone(),
    })
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_text;

    fn run(text: &str, fx: &FxTable) -> NormalizationOutcome {
        normalize(&parse_text(text).unwrap(), fx)
    }

    fn monthly(text: &str, fx: &FxTable) -> f64 {
        match run(text, fx) {
            NormalizationOutcome::Normalized(price) => price.monthly_usd(),
            other => panic!("expected a value for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn monthly_usd_is_taken_as_is() {
        assert_eq!(monthly("Pricing starts at $25 per month", &FxTable::new()), 25.0);
    }

    #[test]
    fn yearly_is_divided_by_twelve() {
        assert_eq!(monthly("$300 per year", &FxTable::new()), 25.0);
        assert_eq!(monthly("$100/year", &FxTable::new()), 8.33);
    }

    #[test]
    fn per_seat_needs_a_count() {
        assert_eq!(
            run("$10/seat/month", &FxTable::new()),
            NormalizationOutcome::Blocked(NormalizationBlocked::PerSeatWithoutSeatCount)
        );
        assert_eq!(monthly("$10 per user/month for 5 users", &FxTable::new()), 50.0);
    }

    #[test]
    fn unknown_cadence_is_blocked() {
        assert_eq!(
            run("$25", &FxTable::new()),
            NormalizationOutcome::Blocked(NormalizationBlocked::AmbiguousCadence)
        );
    }

    #[test]
    fn foreign_currency_needs_an_explicit_rate() {
        assert_eq!(
            run("€120/year", &FxTable::new()),
            NormalizationOutcome::Blocked(NormalizationBlocked::MissingFxRate {
                currency: Currency::Eur
            })
        );

        let fx = FxTable::new().with_rate(Currency::Eur, 1.1);
        let NormalizationOutcome::Normalized(price) = run("€120/year", &fx) else {
            panic!("expected normalized price");
        };
        assert_eq!(price.monthly_usd(), 11.0);
        assert_eq!(
            price.steps(),
            &[
                NormalizationStep::FxConverted {
                    from: Currency::Eur,
                    usd_per_unit: 1.1
                },
                NormalizationStep::AnnualToMonthly,
            ]
        );
        assert!(price.method().contains("converted EUR to USD at 1.1"));
    }

    #[test]
    fn cadence_is_checked_before_fx() {
        assert_eq!(
            run("€25", &FxTable::new()),
            NormalizationOutcome::Blocked(NormalizationBlocked::AmbiguousCadence)
        );
    }

    #[test]
    fn fx_is_checked_before_seats() {
        assert_eq!(
            run("€10/seat/month", &FxTable::new()),
            NormalizationOutcome::Blocked(NormalizationBlocked::MissingFxRate {
                currency: Currency::Eur
            })
        );
    }

    #[test]
    fn sub_cent_values_are_blocked() {
        assert_eq!(
            run("$0.05 per year", &FxTable::new()),
            NormalizationOutcome::Blocked(NormalizationBlocked::BelowOneCent)
        );
    }

    #[test]
    fn blocked_gap_preserves_original_text() {
        let gap = NormalizationBlocked::PerSeatWithoutSeatCount
            .to_gap("$10/seat/month", EntityRef::Product);
        assert_eq!(gap.reason_code, GapCode::PerSeatWithoutSeatCount);
        assert!(gap.message.contains("$10/seat/month"));
    }

    #[test]
    fn method_describes_plain_monthly_prices() {
        let outcome = run("$25/month", &FxTable::new());
        let price = outcome.normalized().unwrap();
        assert_eq!(price.method(), "\"$25/month\" -> stated in monthly USD = 25.00 USD/month");
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 300,
                ..ProptestConfig::default()
            })]

            /// Property: every produced value is finite, positive and in cents.
            #[test]
            fn normalized_values_are_positive_cents(
                amount in 1u32..100_000,
                yearly in any::<bool>(),
                seats in 1u32..500,
            ) {
                let cadence = if yearly { "year" } else { "month" };
                let text = format!("${amount} per seat/{cadence} for {seats} seats");
                if let NormalizationOutcome::Normalized(price) = run(&text, &FxTable::new()) {
                    let value = price.monthly_usd();
                    prop_assert!(value.is_finite() && value > 0.0);
                    let cents = value * 100.0;
                    prop_assert!((cents.round() - cents).abs() < 1e-6 * value.max(1.0));
                }
            }
        }
    }
}
