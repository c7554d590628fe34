//! Parser benchmarks.
//!
//! Run with: `cargo bench --package formula-parse`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use formula_lex::{Lexer, LexerContext};
use formula_parse::{parse, Grammar, ParserTables};
use formula_util::Limits;

fn parse_str(tables: &ParserTables, limits: &Limits, src: &str) {
    let tokens = Lexer::new(src, LexerContext::default()).tokenize().unwrap();
    let _ = parse(tokens, limits);
    let _ = tables; // tables is exercised via the process-wide cache inside `parse`
    black_box(());
}

fn bench_table_construction(c: &mut Criterion) {
    c.bench_function("build_parser_tables", |b| {
        b.iter(|| {
            let grammar = Grammar::build().unwrap();
            black_box(ParserTables::build(&grammar).unwrap());
        })
    });
}

fn bench_parsing(c: &mut Criterion) {
    let grammar = Grammar::build().unwrap();
    let tables = ParserTables::build(&grammar).unwrap();
    let limits = Limits::default();

    let mut group = c.benchmark_group("parse_formula");

    let short = "1 + 2 * 3";
    group.throughput(Throughput::Bytes(short.len() as u64));
    group.bench_function("short_arithmetic", |b| b.iter(|| parse_str(&tables, &limits, black_box(short))));

    let nested = "IF({x} > 0, SQRT({x}) + ROUND({y}, 2), MAX({a}, {b}, {c}) * ({d} - {e}))";
    group.throughput(Throughput::Bytes(nested.len() as u64));
    group.bench_function("nested_call", |b| b.iter(|| parse_str(&tables, &limits, black_box(nested))));

    group.finish();
}

criterion_group!(benches, bench_table_construction, bench_parsing);
criterion_main!(benches);
