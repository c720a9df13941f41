use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rote::diff::LineRenderConfig;
use rote::options::{OptionSet, TypingOption};
use rote::particles::Point;
use rote::session::Session;
use web_time::{Duration, Instant};

fn template(len: usize) -> String {
    "fn main() {\n    println!(\"hello\");\n}\n"
        .chars()
        .cycle()
        .take(len)
        .collect()
}

fn benchmark_full_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_session");

    for len in [100, 1000, 10000] {
        let text = template(len);

        group.bench_with_input(BenchmarkId::new("type_through", len), &text, |b, text| {
            b.iter(|| {
                let mut session = Session::with_target(text, ()).unwrap().with_seed(0);
                let start = Instant::now();

                for (i, char) in text.chars().enumerate() {
                    // 10% error rate
                    let char = if i % 10 == 0 { '#' } else { char };
                    let now = start + Duration::from_millis(i as u64 * 50);
                    session.handle_key_at(black_box(&char.into()), now);
                }

                black_box(session.outcome().copied())
            })
        });
    }

    group.finish();
}

fn benchmark_power_mode(c: &mut Criterion) {
    let options = OptionSet::empty().with(TypingOption::PowerMode);
    let text = template(1000);

    c.bench_function("power_mode_session", |b| {
        b.iter(|| {
            let mut session = Session::with_target(&text, ())
                .unwrap()
                .with_options(options)
                .with_seed(0);
            let start = Instant::now();

            for (i, char) in text.chars().enumerate() {
                let now = start + Duration::from_millis(i as u64 * 50);
                session.set_cursor_anchor(Point::new(i as f64, 0.0));
                session.poll_at(now);
                session.handle_key_at(&char.into(), now);
            }

            black_box(session.particles().len())
        })
    });
}

fn benchmark_render_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_lines");

    for len in [100, 1000, 10000] {
        let text = template(len);
        let mut session = Session::with_target(&text, ()).unwrap();
        for char in text.chars().take(len / 2) {
            session.handle_key(&char.into());
        }

        group.bench_with_input(BenchmarkId::new("layout", len), &session, |b, session| {
            b.iter(|| {
                session.render_lines(
                    |line| Some(line.contents.len()),
                    black_box(LineRenderConfig::new(80)),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_full_session,
    benchmark_power_mode,
    benchmark_render_lines
);
criterion_main!(benches);
