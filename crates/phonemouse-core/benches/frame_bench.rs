//! Criterion benchmarks for the per-frame hot path.
//!
//! Every received frame goes through decode, button edge emission, scaling,
//! and interpolation before anything reaches the virtual device.  At the
//! phone's ~15 ms send interval this path has plenty of headroom; the
//! benchmark exists to catch accidental allocations or regressions.
//!
//! Run with:
//! ```bash
//! cargo bench --package phonemouse-core --bench frame_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use phonemouse_core::{
    compute_multiplier, scale, split, ButtonEdgeEmitter, ButtonMask, ButtonMode, Frame,
    PointerEvent,
};

// ── Frame fixtures ────────────────────────────────────────────────────────────

fn make_motion_frame() -> [u8; 5] {
    Frame { buttons: ButtonMask(0), dx: -37, dy: 112 }.encode()
}

fn make_click_frame() -> [u8; 5] {
    Frame { buttons: ButtonMask(ButtonMask::LEFT), dx: 0, dy: 0 }.encode()
}

// ── Benchmark groups ──────────────────────────────────────────────────────────

/// Benchmarks `Frame::decode` on its own.
fn bench_decode(c: &mut Criterion) {
    let bytes = make_motion_frame();
    c.bench_function("frame_decode", |b| b.iter(|| Frame::decode(black_box(&bytes))));
}

/// Benchmarks the whole frame-to-events path for several interpolation settings.
fn bench_translate(c: &mut Criterion) {
    let mult = compute_multiplier(150);
    let mut group = c.benchmark_group("translate_frame");

    for steps in [0u32, 4, 16] {
        for (name, bytes) in [("motion", make_motion_frame()), ("click", make_click_frame())] {
            group.bench_with_input(BenchmarkId::new(name, steps), &bytes, |b, bytes| {
                let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);
                let mut out: Vec<PointerEvent> = Vec::with_capacity(64);
                b.iter(|| {
                    out.clear();
                    let frame = Frame::decode(black_box(bytes));
                    emitter.emit(frame.buttons, &mut out);
                    let (dx, dy) = (scale(frame.dx, mult), scale(frame.dy, mult));
                    for (sx, sy) in split(dx, dy, steps) {
                        out.push(PointerEvent::Motion { dx: sx, dy: sy });
                        out.push(PointerEvent::Sync);
                    }
                    out.len()
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_decode, bench_translate);
criterion_main!(benches);
