//! Detection and canonical counting throughput
//!
//! - parallel vs sequential detector fan-out on a mid-size catalog
//! - full engine request (authorize, read, detect, decorate, summarize)

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;

use storefront_issues_lib::application::Collaborators;
use storefront_issues_lib::domain::repositories::Capabilities;
use storefront_issues_lib::domain::services::{decorate, detect_issues, summarize, IssueCountFilters};
use storefront_issues_lib::domain::{AnswerBlock, PageRecord, ProductRecord, SignalSet, SiteSnapshot};
use storefront_issues_lib::infrastructure::{InMemoryStore, SiteFixture};
use storefront_issues_lib::{EngineConfig, IssueEngine};

fn catalog(products: usize, pages: usize) -> SiteSnapshot {
    let products = (0..products)
        .map(|i| {
            let mut p = ProductRecord::new(format!("p{i}"), format!("Stoneware mug number {i}"));
            if i % 3 != 0 {
                p.seo_title = Some(format!("Stoneware Mug {i} | Clay Studio"));
            }
            if i % 4 != 0 {
                p.description = Some(format!(
                    "Mug {i} is hand-thrown stoneware, holds 350 ml and is dishwasher safe. Use it for coffee or tea."
                ));
            }
            if i % 5 == 0 {
                p.answer_blocks.push(AnswerBlock {
                    question_id: "how_is_it_used".into(),
                    answer_text: "It is the best mug ever!!".into(),
                });
            }
            p.price = (i % 7 != 0).then_some(24.0);
            p
        })
        .collect();
    let pages = (0..pages)
        .map(|i| {
            let prefix = if i % 2 == 0 { "pages" } else { "collections" };
            let mut page = PageRecord::new(format!("https://clay.test/{prefix}/{i}"));
            page.title = (i % 3 != 0).then(|| format!("Clay Studio page {i}"));
            page.word_count = (i as u32 * 37) % 400;
            page
        })
        .collect();
    let signals = SignalSet {
        crawl_health: Some(0.62),
        entity_coverage: Some(0.41),
        ..SignalSet::default()
    };
    SiteSnapshot::new("bench-site", pages, products, signals)
}

fn bench_detection(c: &mut Criterion) {
    let snapshot = catalog(2_000, 500);
    let mut group = c.benchmark_group("detect_issues");
    group.bench_function("sequential", |b| b.iter(|| detect_issues(black_box(&snapshot), false)));
    group.bench_function("parallel", |b| b.iter(|| detect_issues(black_box(&snapshot), true)));
    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let snapshot = catalog(2_000, 500);
    let set = decorate(detect_issues(&snapshot, true), &Capabilities::all());
    let filters = IssueCountFilters::default();
    c.bench_function("summarize", |b| b.iter(|| summarize(black_box(&set), &filters)));
}

fn bench_engine_request(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let snapshot = catalog(1_000, 200);
    let mut site = SiteFixture::new("bench-site", "clay.test").with_member("owner", Capabilities::all());
    site.products = snapshot.products;
    site.pages = snapshot.pages;
    site.signals = snapshot.signals;

    let store = Arc::new(InMemoryStore::new([site]));
    let engine = IssueEngine::new(Collaborators::from_store(store), &EngineConfig::default());

    c.bench_function("compute_canonical_counts_summary", |b| {
        b.iter(|| {
            rt.block_on(engine.compute_canonical_counts_summary("bench-site", "owner", None))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_detection, bench_summary, bench_engine_request);
criterion_main!(benches);
