//! Criterion benchmarks for per-frame work in debtclock_core
//!
//! Run with: cargo bench -p debtclock_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use debtclock_core::animation::ManualClock;
use debtclock_core::{AnimationRequest, Animator, DisplayOptions, Easing, format_markup, format_plain};

const DEBT: f64 = 36_215_124_313_382.16;

fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");

    let variants = [
        ("grouped", DisplayOptions::default()),
        (
            "full_precision",
            DisplayOptions {
                round_to_integer: false,
                ..Default::default()
            },
        ),
        (
            "abbreviated",
            DisplayOptions {
                abbreviate_trillions: true,
                ..Default::default()
            },
        ),
    ];

    for (name, opts) in variants.iter() {
        group.bench_with_input(BenchmarkId::new("plain", name), opts, |b, opts| {
            b.iter(|| format_plain(black_box(DEBT), black_box(opts)))
        });
        group.bench_with_input(BenchmarkId::new("markup", name), opts, |b, opts| {
            b.iter(|| format_markup(black_box(DEBT), black_box(opts)))
        });
    }

    group.finish();
}

fn bench_animation_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("animation");
    let opts = DisplayOptions::default();

    for easing in Easing::ALL {
        group.bench_function(BenchmarkId::new("two_second_run", easing.name()), |b| {
            b.iter(|| {
                let clock = ManualClock::new();
                let mut animator = Animator::new(clock.clone());
                let request = AnimationRequest {
                    start_value: DEBT * 0.9,
                    target_value: DEBT,
                    duration_ms: 2000.0,
                    easing,
                    enabled: true,
                };
                animator.animate(request, move |value| {
                    black_box(format_markup(value, &opts));
                });
                while animator.tick() {
                    clock.advance(16.0);
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_format, bench_animation_frames);
criterion_main!(benches);
