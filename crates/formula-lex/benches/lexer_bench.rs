//! Lexer benchmarks.
//!
//! Run with: `cargo bench --package formula-lex`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use formula_lex::{Lexer, LexerContext};

fn token_count(source: &str) -> usize {
    Lexer::new(source, LexerContext::default()).tokenize().unwrap().len()
}

fn bench_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_arithmetic");

    let short = "1 + 2 * 3 - 4 / 5";
    group.throughput(Throughput::Bytes(short.len() as u64));
    group.bench_function("short_expression", |b| b.iter(|| token_count(black_box(short))));

    let long = "(1 + 2) * 3 - 4 / (5 % 6) + 7 ^ 2 && 8 < 9 || {x} >= {y} == !{z} != true";
    group.throughput(Throughput::Bytes(long.len() as u64));
    group.bench_function("mixed_expression", |b| b.iter(|| token_count(black_box(long))));

    group.finish();
}

fn bench_variables_and_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_variables_functions");

    group.bench_function("variable_heavy", |b| {
        b.iter(|| token_count(black_box("{a} + {b} * {c} - {d} / {e}")))
    });

    group.bench_function("function_call", |b| {
        b.iter(|| token_count(black_box("IF({x} > 0, SQRT({x}), ROUND({x}, 2))")))
    });

    group.finish();
}

criterion_group!(benches, bench_arithmetic, bench_variables_and_functions);
criterion_main!(benches);
