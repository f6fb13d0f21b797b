//! # Event Queue Benchmark
//!
//! REQUIREMENTS:
//! - Non-blocking insert must stay cheap enough for touch/accelerometer rates
//! - A blocking round trip (insert, dequeue, acknowledge) well under a frame
//!
//! Run with: `cargo bench --package tether_core`

// Benchmarks don't need docs and may have intentionally unused code
#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tether_core::{Event, EventQueue, TouchAction};

fn touch(i: i32) -> Event {
    Event::Touch {
        action: TouchAction::Move,
        x: i,
        y: i,
    }
}

/// Benchmark: insert then drain a burst of input events.
fn bench_insert_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_drain");

    for count in [16, 128, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let queue = EventQueue::new(count);
            queue.init();
            b.iter(|| {
                for i in 0..count {
                    black_box(queue.insert(touch(i32::try_from(i).unwrap_or(0))));
                }
                while let Some(event) = queue.remove_oldest(Some(Duration::ZERO)) {
                    black_box(event);
                }
            });
        });
    }

    group.finish();
}

/// Benchmark: blocking round trip against a consumer thread.
fn bench_blocking_round_trip(c: &mut Criterion) {
    let queue = Arc::new(EventQueue::new(64));
    queue.init();

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            while let Some(event) = queue.remove_oldest(None) {
                if matches!(event, Event::Quit) {
                    break;
                }
                queue.done_with_event(true);
            }
        })
    };

    c.bench_function("blocking_round_trip", |b| {
        b.iter(|| black_box(queue.insert_blocking(Event::Resume)));
    });

    queue.insert(Event::Quit);
    let _ = consumer.join();
}

criterion_group!(benches, bench_insert_drain, bench_blocking_round_trip);
criterion_main!(benches);
