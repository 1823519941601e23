use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use pricetruth_core::{CancellationFlag, ProductInput, Source};
use pricetruth_extraction::SnippetExtractor;
use pricetruth_verdict::{PipelineConfig, analyze};

/// A pricing page with a few plans and some filler prose.
fn pricing_page(i: usize) -> String {
    format!(
        "Plans for every team size. Start with a 14-day trial, no card required.\n\
         Starter: ${}/month for individuals.\n\
         Team: ${} per user/month for 5 users, billed monthly.\n\
         Enterprise: ${} per year with SSO and audit logs.\n\
         Questions? Contact sales for volume discounts.",
        9 + i % 20,
        15 + i % 30,
        1_200 + 100 * (i % 10),
    )
}

fn sources(n: usize) -> Vec<Source> {
    (0..n)
        .map(|i| {
            Source::new(
                format!("https://competitor-{i}.example.com/pricing"),
                format!("Competitor {i} pricing"),
                pricing_page(i),
            )
        })
        .collect()
}

fn bench_extraction(c: &mut Criterion) {
    let extractor = SnippetExtractor::default();
    let page = pricing_page(3).repeat(20);

    let mut group = c.benchmark_group("extraction");
    group.throughput(Throughput::Bytes(page.len() as u64));
    group.bench_function("pricing_page_x20", |b| {
        b.iter(|| extractor.extract_text("https://competitor.example.com", black_box(&page)))
    });
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let product = ProductInput::new("Acme", "https://acme.com", "$25/month");
    let config = PipelineConfig::default();

    let mut group = c.benchmark_group("pipeline");
    for n in [4usize, 32, 256] {
        let sources = sources(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &sources, |b, sources| {
            b.iter(|| {
                analyze(&product, black_box(sources), &config, &CancellationFlag::new())
                    .map(|v| v.status())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extraction, bench_pipeline);
criterion_main!(benches);
