//! Inbound dispatch benchmarks.
//!
//! Measures frame decoding on its own and the full path from a transport
//! event to the `on_message` hook.
//!
//! Run with: cargo bench --bench dispatch
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use parking_lot::Mutex;
use ws_link::{
    ConnectionManager, Message, Result, Transport, TransportEvents, decode_frame, encode_frame,
};

// ============================================================================
// Fixtures
// ============================================================================

const FIELD_COUNTS: &[usize] = &[1, 16, 128];

/// Transport that accepts every frame and discards it.
struct NullTransport;

impl Transport for NullTransport {
    fn is_ready(&self) -> bool {
        true
    }

    fn send_text(&self, _frame: String) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) {}
}

fn frame_with_fields(count: usize) -> String {
    let mut message = Message::new("chat.delta");
    for i in 0..count {
        message.insert(format!("field{i}"), format!("value {i}"));
    }
    encode_frame(&message).expect("encodable")
}

// ============================================================================
// Benchmark: Decode
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_frame");

    for &count in FIELD_COUNTS {
        let frame = frame_with_fields(count);
        group.bench_with_input(BenchmarkId::new("fields", count), &frame, |b, frame| {
            b.iter(|| decode_frame(black_box(frame)).expect("valid"));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Dispatch
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let listener: Arc<Mutex<Option<TransportEvents>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&listener);
    let received = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&received);

    let manager = ConnectionManager::builder()
        .transport(move |_: &str, events: TransportEvents| -> Result<Box<dyn Transport>> {
            *slot.lock() = Some(events);
            Ok(Box::new(NullTransport))
        })
        .on_message(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .build()
        .expect("build");

    manager.connect("bench://local");
    let events = listener.lock().clone().expect("transport created");
    events.open();

    let mut group = c.benchmark_group("dispatch");
    for &count in FIELD_COUNTS {
        let frame = frame_with_fields(count);
        group.bench_with_input(BenchmarkId::new("message", count), &frame, |b, frame| {
            b.iter(|| events.message(black_box(frame.as_str())));
        });
    }
    group.finish();

    let ping = Message::new("ping");
    c.bench_function("send", |b| {
        b.iter(|| manager.send(black_box(&ping)).expect("serializable"));
    });

    assert!(received.load(Ordering::Relaxed) > 0);
}

criterion_group!(benches, bench_decode, bench_dispatch);
criterion_main!(benches);
