//! Hot-path benchmarks (§10 "Dev/test tooling").
//!
//! One `#[inline(never)]` driver function per measured path, fed through
//! `criterion::BenchmarkId` so the per-panel and per-sample costs are
//! visible independently of the full-sweep cost.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use eps_common::config::{BiasConfig, PanelConfig, SystemConfig, ThresholdConfig, TimerConfig};
use eps_fdir_core::lag_buffer::LagBuffer;
use eps_fdir_core::quantile::P2Quantile;
use eps_fdir_core::system::System;
use eps_fdir_core::testkit::{LinearPredictor, SimulatedHardware};

#[inline(never)]
fn push_samples(buf: &mut LagBuffer, n: u32) {
    for i in 0..n {
        buf.push(i as f64, i as f64 * 0.1);
    }
}

fn bench_lag_buffer_push(c: &mut Criterion) {
    c.bench_function("lag_buffer_push", |b| {
        b.iter(|| {
            let mut buf = LagBuffer::new();
            push_samples(&mut buf, 64);
        });
    });
}

#[inline(never)]
fn update_quantile(q: &mut P2Quantile, n: u32) {
    let mut x: u64 = 42;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        let v = ((x >> 33) % 1000) as f64;
        q.update(v);
    }
}

fn bench_p2_quantile_update(c: &mut Criterion) {
    c.bench_function("p2_quantile_update", |b| {
        b.iter(|| {
            let mut q = P2Quantile::new(0.99);
            update_quantile(&mut q, 256);
        });
    });
}

fn sys_config(n: usize) -> SystemConfig {
    SystemConfig {
        sample_period_s: 5.0,
        bias: BiasConfig {
            alpha: 0.01,
            warmup: 50,
        },
        quantile_p: 0.99,
        thresholds: ThresholdConfig {
            m_spike: 1.2,
            t_v_drop: 0.5,
            t_dp: 0.5,
            t_dv: 0.3,
            k_sigma: 3.0,
            sigma_power: 0.5,
        },
        timers: TimerConfig {
            stable_required: 6,
            recovery_stable_required: 24,
            enable_timeout_ms: 300_000,
            recovery_telemetry_interval_ms: 60_000,
        },
        panels: (0..n as u8)
            .map(|id| PanelConfig {
                id,
                p_nominal: 8.4,
                v_nominal: 17.5,
            })
            .collect(),
    }
}

/// One full `System::tick_all` sweep for `N` panels, the actual per-tick
/// cost a flight build pays every 5 s (SC-style budget check, §5).
fn bench_tick_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_all");
    for &n in &[1usize, 4, 13] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            macro_rules! run_for {
                ($n:expr) => {{
                    let hw: SimulatedHardware<$n> = SimulatedHardware::new(17.5, 0.48, 5_000);
                    let mut sys: System<SimulatedHardware<$n>, LinearPredictor, NoopSink, $n> =
                        System::new(hw, LinearPredictor, NoopSink, sys_config($n));
                    b.iter(|| {
                        sys.tick_all();
                    });
                }};
            }
            match n {
                1 => run_for!(1),
                4 => run_for!(4),
                13 => run_for!(13),
                _ => unreachable!(),
            }
        });
    }
    group.finish();
}

#[derive(Default)]
struct NoopSink;

impl eps_common::telemetry::TelemetrySink for NoopSink {
    fn send_telemetry(&mut self, _panel: u8, _voltage: f32, _current: f32, _power: f32) {}
    fn send_telemetry_alert(&mut self, _panel: u8, _power: f32, _voltage: f32) {}
    fn send_telemetry_success(&mut self, _panel: u8) {}
}

criterion_group!(
    benches,
    bench_lag_buffer_push,
    bench_p2_quantile_update,
    bench_tick_all
);
criterion_main!(benches);
