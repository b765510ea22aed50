use automata_grader::{
    prelude::*,
    random::{random_dfa, random_word},
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_equivalence(c: &mut Criterion) {
    fastrand::seed(42);
    let alphabet = CharAlphabet::of_size(3);
    let mut group = c.benchmark_group("equivalence");
    for size in [4, 16, 64] {
        let left = random_dfa(&alphabet, size);
        let right = random_dfa(&alphabet, size);
        group.bench_with_input(BenchmarkId::new("random", size), &size, |b, _| {
            b.iter(|| black_box(equivalent(&left, &right)))
        });
        group.bench_with_input(BenchmarkId::new("self", size), &size, |b, _| {
            b.iter(|| black_box(equivalent(&left, &left)))
        });
    }
    group.finish();
}

fn bench_run(c: &mut Criterion) {
    fastrand::seed(7);
    let alphabet = CharAlphabet::of_size(2);
    let dfa = random_dfa(&alphabet, 32);
    let words: Vec<String> = (0..100).map(|_| random_word(&alphabet, 0, 64)).collect();
    c.bench_function("run_100_words", |b| {
        b.iter(|| {
            for word in &words {
                black_box(dfa.accepts(word));
            }
        })
    });
}

criterion_group!(benches, bench_equivalence, bench_run);
criterion_main!(benches);
