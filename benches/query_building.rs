//! Performance benchmarks for query parsing and building
//!
//! Run with: cargo bench

use cirrus_query::search::PrefixFilter;
use cirrus_query::{DefaultNamespacePrefixParser, QueryStringParser, SearchConfig, SearchContext, SearchQueryBuilder};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

fn host_config() -> Arc<SearchConfig> {
    Arc::new(SearchConfig {
        enable_cross_project_search: true,
        enable_alt_language: true,
        ..SearchConfig::default()
    })
}

fn bench_query_parsing(c: &mut Criterion) {
    let queries = vec![
        "simple",
        "two words",
        "\"exact phrase\"~2",
        "help:how to edit?",
        "intitle:/Str[a-z]+/i local:foo",
        "prefix:Help:Con",
        "complex AND (query OR search) -exclude",
    ];

    let config = host_config();
    let ns_parser = DefaultNamespacePrefixParser::new();
    let parser = QueryStringParser::new(&config, &ns_parser).expect("default config is valid");

    let mut group = c.benchmark_group("query_parsing");
    for query in queries {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, &q| {
            b.iter(|| parser.parse(black_box(q)))
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let config = host_config();
    let ns_parser = DefaultNamespacePrefixParser::new();
    let mut builder = SearchQueryBuilder::new_ft_search_query_builder(config, "help:foo prefix:bar", &ns_parser)
        .expect("query parses");
    builder
        .set_initial_namespaces(vec![0, 1, 12])
        .add_contextual_filter("prefix", Arc::new(PrefixFilter::new("Category:Foo", &ns_parser)))
        .expect("unique filter name");

    c.bench_function("build", |b| b.iter(|| black_box(&builder).build()));
}

fn bench_derivation(c: &mut Criterion) {
    let ns_parser = DefaultNamespacePrefixParser::new();
    let mut builder = SearchQueryBuilder::new_ft_search_query_builder(host_config(), "foo bar", &ns_parser)
        .expect("query parses");
    builder.set_allow_rewrite(true);
    let source = builder.build();
    let target = Arc::new(SearchConfig::for_wiki("sister"));

    let mut group = c.benchmark_group("derivation");
    group.bench_function("cross_project", |b| {
        b.iter(|| {
            SearchQueryBuilder::for_cross_project_search(Arc::clone(&target), black_box(&source))
                .map(|builder| builder.build())
        })
    });
    group.bench_function("cross_language", |b| {
        b.iter(|| {
            SearchQueryBuilder::for_cross_language_search(Arc::clone(&target), black_box(&source))
                .map(|builder| builder.build())
        })
    });
    group.bench_function("rewritten", |b| {
        b.iter(|| {
            SearchQueryBuilder::for_rewritten_query(black_box(&source), "foo baz", &ns_parser)
                .map(|builder| builder.build())
        })
    });
    group.finish();
}

fn bench_context(c: &mut Criterion) {
    let ns_parser = DefaultNamespacePrefixParser::new();
    let query = SearchQueryBuilder::new_ft_search_query_builder(host_config(), "\"foo bar\" baz", &ns_parser)
        .expect("query parses")
        .build();

    c.bench_function("context_from_query", |b| {
        b.iter(|| SearchContext::from_search_query(black_box(&query), None))
    });
}

criterion_group!(benches, bench_query_parsing, bench_build, bench_derivation, bench_context);

criterion_main!(benches);
