use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rote::metrics::{Outcome, accuracy, live_words_per_minute, words_per_minute};
use rote::options::OptionSet;
use web_time::Duration;

fn benchmark_wpm_calculations(c: &mut Criterion) {
    let mut group = c.benchmark_group("wpm_calculations");

    let test_cases = vec![
        (100, 10.0),     // Short snippet
        (1000, 120.0),   // Medium template
        (10000, 600.0),  // Full-length test
    ];

    for (characters, seconds) in test_cases {
        group.bench_with_input(
            BenchmarkId::new("calculate", format!("{characters}chars_{}s", seconds as u32)),
            &(characters, seconds),
            |b, &(characters, seconds)| {
                b.iter(|| words_per_minute(black_box(characters), black_box(seconds)))
            },
        );
    }

    group.finish();
}

fn benchmark_accuracy_calculations(c: &mut Criterion) {
    let mut group = c.benchmark_group("accuracy_calculations");

    let test_cases = vec![(100, 5), (1000, 50), (10000, 20000)];

    for (characters, mistakes) in test_cases {
        group.bench_with_input(
            BenchmarkId::new("calculate", format!("{characters}chars_{mistakes}mistakes")),
            &(characters, mistakes),
            |b, &(characters, mistakes)| {
                b.iter(|| accuracy(black_box(characters), black_box(mistakes)))
            },
        );
    }

    group.finish();
}

fn benchmark_live_wpm(c: &mut Criterion) {
    c.bench_function("live_wpm", |b| {
        b.iter(|| {
            (1..=600u64)
                .map(|second| live_words_per_minute(black_box(second as usize * 4), second))
                .max()
        })
    });
}

fn benchmark_outcome(c: &mut Criterion) {
    c.bench_function("outcome_calculate", |b| {
        b.iter(|| {
            Outcome::calculate(
                black_box(Duration::from_millis(93_450)),
                black_box(1200),
                black_box(37),
                black_box(OptionSet::empty()),
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_wpm_calculations,
    benchmark_accuracy_calculations,
    benchmark_live_wpm,
    benchmark_outcome
);
criterion_main!(benches);
