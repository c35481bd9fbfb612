//! Benchmarks for property dispatch through the object registry.
//!
//! Covers the host's hot path on the dispatch surface:
//! - Selector lookup and value encode into a caller buffer
//! - Probe operations (existence, settability, size)
//! - Settable write/read round-trips
//! - Handle token resolution
//! - Full three-object registry initialization

use std::hint::black_box;
use std::sync::{Arc, Mutex};

use criterion::{Criterion, criterion_group, criterion_main};

use camveil::test_utils::{ScriptedDetector, UnavailableOpener, test_config};
use camveil::types::selector;
use camveil::{Camveil, ObjectId, ObjectRegistry, RawHandle, Selector, SequentialRegistrar};

fn build_registry() -> ObjectRegistry {
    let mut registrar = SequentialRegistrar::default();
    Camveil::initialize_with(
        test_config(),
        ObjectId(1),
        &mut registrar,
        Arc::new(UnavailableOpener),
        Arc::new(Mutex::new(ScriptedDetector::always_clear())),
    )
    .expect("registry initialization")
}

fn bench_property_reads(c: &mut Criterion) {
    let registry = build_registry();
    let ids = registry.ids();

    let mut group = c.benchmark_group("property_reads");

    group.bench_function("u32_fixed", |b| {
        let mut buf = [0u8; 4];
        b.iter(|| {
            let written = registry
                .property_data(
                    black_box(ids.device),
                    black_box(selector::DEVICE_IS_ALIVE),
                    &mut buf,
                )
                .expect("fixed u32 read");
            black_box(written)
        })
    });

    group.bench_function("u32_computed", |b| {
        let mut buf = [0u8; 4];
        b.iter(|| {
            let written = registry
                .property_data(
                    black_box(ids.device),
                    black_box(selector::DEVICE_IS_RUNNING),
                    &mut buf,
                )
                .expect("computed u32 read");
            black_box(written)
        })
    });

    group.bench_function("f64_fixed", |b| {
        let mut buf = [0u8; 8];
        b.iter(|| {
            let written = registry
                .property_data(
                    black_box(ids.stream),
                    black_box(selector::STREAM_FRAME_RATE),
                    &mut buf,
                )
                .expect("f64 read");
            black_box(written)
        })
    });

    group.bench_function("range", |b| {
        let mut buf = [0u8; 16];
        b.iter(|| {
            let written = registry
                .property_data(
                    black_box(ids.stream),
                    black_box(selector::STREAM_FRAME_RATE_RANGES),
                    &mut buf,
                )
                .expect("range read");
            black_box(written)
        })
    });

    group.bench_function("text_handle", |b| {
        let mut buf = [0u8; 8];
        b.iter(|| {
            let written = registry
                .property_data(black_box(ids.device), black_box(selector::DEVICE_UID), &mut buf)
                .expect("text handle read");
            black_box(written)
        })
    });

    group.finish();
}

fn bench_probe_operations(c: &mut Criterion) {
    let registry = build_registry();
    let ids = registry.ids();
    let foreign = Selector::from_fourcc(b"zzzz");

    let mut group = c.benchmark_group("property_probes");

    group.bench_function("has_property_hit", |b| {
        b.iter(|| {
            registry
                .has_property(black_box(ids.device), black_box(selector::DEVICE_UID))
                .expect("probe")
        })
    });

    group.bench_function("has_property_miss", |b| {
        b.iter(|| {
            registry.has_property(black_box(ids.device), black_box(foreign)).expect("probe")
        })
    });

    group.bench_function("data_size", |b| {
        b.iter(|| {
            registry
                .property_data_size(
                    black_box(ids.stream),
                    black_box(selector::STREAM_FRAME_RATE_RANGES),
                )
                .expect("size probe")
        })
    });

    group.bench_function("is_settable", |b| {
        b.iter(|| {
            registry
                .is_property_settable(
                    black_box(ids.device),
                    black_box(selector::DEVICE_EXCLUSIVE_ACCESS),
                )
                .expect("settability probe")
        })
    });

    group.finish();
}

fn bench_settable_round_trip(c: &mut Criterion) {
    let registry = build_registry();
    let ids = registry.ids();

    c.bench_function("exclusive_access_write_read", |b| {
        let mut buf = [0u8; 4];
        b.iter(|| {
            registry
                .set_property_data(
                    black_box(ids.device),
                    black_box(selector::DEVICE_EXCLUSIVE_ACCESS),
                    black_box(&1u32.to_le_bytes()),
                )
                .expect("write");
            registry
                .property_data(ids.device, selector::DEVICE_EXCLUSIVE_ACCESS, &mut buf)
                .expect("read back");
            black_box(u32::from_le_bytes(buf))
        })
    });
}

fn bench_handle_resolution(c: &mut Criterion) {
    let registry = build_registry();
    let ids = registry.ids();

    let mut buf = [0u8; 8];
    registry
        .property_data(ids.device, selector::DEVICE_UID, &mut buf)
        .expect("token read");
    let token = RawHandle(u64::from_le_bytes(buf));

    c.bench_function("resolve_text_handle", |b| {
        b.iter(|| {
            let value = registry.resolve_handle(black_box(token)).expect("published token");
            black_box(value)
        })
    });
}

fn bench_initialization(c: &mut Criterion) {
    c.bench_function("registry_initialize", |b| {
        b.iter(|| {
            let registry = build_registry();
            black_box(registry)
        })
    });
}

criterion_group!(
    benches,
    bench_property_reads,
    bench_probe_operations,
    bench_settable_round_trip,
    bench_handle_resolution,
    bench_initialization
);
criterion_main!(benches);
