//! Negotiation Benchmarks
//!
//! Benchmarks for Accept-Language parsing, locale negotiation, route
//! segmentation and phrase resolution.
//!
//! Run with: cargo bench --bench negotiation_benchmarks

use criterion::{Criterion, criterion_group, criterion_main};
use parlance::{
    Arg, I18n, I18nConfig, Locale, MemoryLoader, PhraseRequest, PhraseTable, Route, SimpleRequest,
    parse_accept_language,
};
use std::hint::black_box;

fn engine() -> I18n {
    I18n::builder(I18nConfig::new().with_supported(["en-US", "fr", "de", "ja", "zh-TW", "pt-BR"]))
        .loader(MemoryLoader::new())
        .build()
        .unwrap()
}

fn bench_accept_language(c: &mut Criterion) {
    let mut group = c.benchmark_group("accept_language");

    group.bench_function("parse_short", |b| {
        b.iter(|| parse_accept_language(black_box("fr")))
    });

    group.bench_function("parse_weighted", |b| {
        b.iter(|| {
            parse_accept_language(black_box(
                "de-CH;q=0.3, en-US;q=0.9, fr;q=0.8, ja, *;q=0.1, zh-TW;q=0.5",
            ))
        })
    });

    group.finish();
}

fn bench_negotiation(c: &mut Criterion) {
    let i18n = engine();
    let mut group = c.benchmark_group("negotiation");

    let header = SimpleRequest::new("/").with_header("Accept-Language", "xx, de-CH;q=0.4, ja;q=0.3");
    group.bench_function("header", |b| b.iter(|| i18n.negotiate(black_box(&header))));

    let query = SimpleRequest::new("/?locale=pt_br");
    group.bench_function("query", |b| b.iter(|| i18n.negotiate(black_box(&query))));

    let fallback = SimpleRequest::new("/nothing/here");
    group.bench_function("default_fallback", |b| {
        b.iter(|| i18n.negotiate(black_box(&fallback)))
    });

    group.finish();
}

fn bench_segmentation(c: &mut Criterion) {
    let i18n = engine();
    let mut group = c.benchmark_group("segmentation");

    group.bench_function("index", |b| b.iter(|| i18n.segment(black_box("/"))));
    group.bench_function("versioned_with_locale", |b| {
        b.iter(|| i18n.segment(black_box("/api/v1.0/users/42/en-us")))
    });

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let i18n = engine();
    let fr = Locale::parse("fr").unwrap();
    let table = PhraseTable::new()
        .with("Hello, %s", "Bonjour, %s")
        .with("Plain", "Simple");
    let route = Route::index();

    let mut group = c.benchmark_group("resolution");

    group.bench_function("plain", |b| {
        b.iter(|| i18n.resolve_with(&fr, &table, &route, PhraseRequest::new(black_box("Plain"), vec![])))
    });

    group.bench_function("interpolated", |b| {
        b.iter(|| {
            i18n.resolve_with(
                &fr,
                &table,
                &route,
                PhraseRequest::new(black_box("Hello, %s"), vec![Arg::from("Ada")]),
            )
        })
    });

    group.bench_function("missing_key", |b| {
        b.iter(|| i18n.resolve_with(&fr, &table, &route, PhraseRequest::new(black_box("Nope"), vec![])))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_accept_language,
    bench_negotiation,
    bench_segmentation,
    bench_resolution
);
criterion_main!(benches);
