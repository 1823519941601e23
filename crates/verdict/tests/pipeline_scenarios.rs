use pricetruth_core::{CancellationFlag, Currency, GapCode, PipelineError, ProductInput, Source};
use pricetruth_verdict::{ConfidenceLevel, PipelineConfig, VerdictStatus, analyze};

fn product(price: &str) -> ProductInput {
    ProductInput::new("Acme Analytics", "https://acme.com", price)
}

fn source(url: &str, content: &str) -> Source {
    Source::new(url, format!("{url} pricing"), content)
}

fn run(product: &ProductInput, sources: &[Source]) -> pricetruth_verdict::PricingVerdict {
    analyze(product, sources, &PipelineConfig::default(), &CancellationFlag::new()).unwrap()
}

#[test]
fn twenty_and_thirty_against_fifty_is_overpriced() {
    let sources = vec![
        source("https://rival-a.com/pricing", "Pro plan: $20/month, billed monthly."),
        source("https://rival-b.com/pricing", "Business is $30 per month per workspace."),
    ];
    let verdict = run(&product("$50/month"), &sources);

    assert_eq!(verdict.status(), VerdictStatus::Overpriced);
    assert_eq!(verdict.comparable_count(), 2);
    assert!(verdict.summary().starts_with("OVERPRICED"));
    assert_eq!(verdict.citations().len(), 2);
}

#[test]
fn internationalized_source_domains_are_accepted() {
    let sources = vec![
        source("https://bücher.de/preise", "Pro $20/month"),
        source("https://b.com/pricing", "Pro $30/month"),
    ];
    let verdict = run(&product("$50/month"), &sources);

    assert_eq!(verdict.status(), VerdictStatus::Overpriced);
    assert_eq!(verdict.competitor_table()[0].domain(), "xn--bcher-kva.de");
}

#[test]
fn single_comparable_competitor_is_undeterminable() {
    let sources = vec![
        source("https://rival-a.com/pricing", "Pricing starts at $25 per month"),
        source("https://rival-b.com/pricing", "Team: $10/seat/month"),
    ];
    let verdict = run(&product("$5/month"), &sources);

    assert_eq!(verdict.status(), VerdictStatus::Undeterminable);
    assert_eq!(verdict.confidence().level, ConfidenceLevel::Low);
    assert!(
        verdict
            .gaps()
            .iter()
            .any(|g| g.message == "insufficient comparable competitors (found 1, need ≥2)")
    );

    let table = verdict.competitor_table();
    assert_eq!(table[0].normalized_monthly_usd(), Some(25.0));
    assert_eq!(table[1].normalized_monthly_usd(), None);
    assert_eq!(table[1].parsed_prices()[0].seat_count(), None);
    assert!(table[1].parsed_prices()[0].per_seat());
}

#[test]
fn every_normalized_value_has_a_snippet_and_citation() {
    let sources = vec![
        source("https://rival-a.com/pricing", "Starter $9/month\nPro $29/month"),
        source("https://rival-b.com/pricing", "Annual plan $240 per year"),
        source("https://rival-c.com/pricing", "Enterprise: contact us"),
        source("https://rival-d.com/pricing", "€15/month for all features"),
    ];
    let verdict = run(&product("$20/month"), &sources);

    for competitor in verdict.competitor_table() {
        if competitor.normalized_monthly_usd().is_some() {
            assert!(!competitor.evidence_snippets().is_empty());
            assert!(!competitor.citations().is_empty());
            let snippet = competitor.normalized_snippet().unwrap();
            assert!(verdict.citations().iter().any(|c| c.url == snippet.source_url()));
        }
    }

    let rival_c = &verdict.competitor_table()[2];
    assert!(rival_c.no_evidence_found());
    let rival_d = &verdict.competitor_table()[3];
    assert_eq!(rival_d.gaps()[0].reason_code, GapCode::MissingFxRate);
}

#[test]
fn explicit_fx_rate_makes_foreign_prices_comparable() {
    let sources = vec![
        source("https://rival-a.com/pricing", "€20/month"),
        source("https://rival-b.com/pricing", "£24 per month"),
    ];
    let mut config = PipelineConfig::default();
    config.fx_rates.insert(Currency::Eur, 1.1);
    config.fx_rates.insert(Currency::Gbp, 1.25);

    let verdict =
        analyze(&product("$25/month"), &sources, &config, &CancellationFlag::new()).unwrap();
    let values: Vec<Option<f64>> = verdict
        .competitor_table()
        .iter()
        .map(|c| c.normalized_monthly_usd())
        .collect();
    assert_eq!(values, vec![Some(22.0), Some(30.0)]);
    assert_eq!(verdict.status(), VerdictStatus::Fair);
}

#[test]
fn runs_are_idempotent() {
    let sources: Vec<Source> = (0..24)
        .map(|i| {
            source(
                &format!("https://rival-{i}.com/pricing"),
                &format!("Basic ${}/month\nPro ${} per year", 10 + i, 200 + 12 * i),
            )
        })
        .collect();
    let product = product("$18/month");

    let first = run(&product, &sources);
    let second = run(&product, &sources);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn duplicate_source_urls_are_rejected() {
    let sources = vec![
        source("https://rival-a.com/pricing", "$20/month"),
        source("https://rival-a.com/pricing", "$20/month"),
    ];
    let err = analyze(
        &product("$50/month"),
        &sources,
        &PipelineConfig::default(),
        &CancellationFlag::new(),
    )
    .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn cancellation_returns_no_verdict() {
    let cancel = CancellationFlag::new();
    cancel.cancel();
    let err = analyze(
        &product("$50/month"),
        &[source("https://rival-a.com", "$20/month")],
        &PipelineConfig::default(),
        &cancel,
    )
    .unwrap_err();
    assert_eq!(err, PipelineError::Cancelled);
}

#[test]
fn verdict_json_has_the_stable_shape() {
    let sources = vec![
        source("https://rival-a.com/pricing", "$20/month"),
        source("https://rival-b.com/pricing", "$30/month"),
    ];
    let verdict = run(&product("$25/month"), &sources);
    let json = serde_json::to_value(&verdict).unwrap();
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "citations",
            "competitor_table",
            "confidence",
            "gaps",
            "key_reasons",
            "status",
            "summary"
        ]
    );
    assert_eq!(json["status"], "FAIR");
    assert!(json["confidence"]["level"].is_string());
    assert!(json["confidence"]["score"].is_number());
}
