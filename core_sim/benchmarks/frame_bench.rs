use std::sync::Arc;

use bevy::math::{IVec2, UVec2};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use despot_core::{
    build_app_with_config, run_frame, FogPalette, GameConfig, GridGeometry, MiniMapProjector,
    TileMap, VisibilityEngine,
};

const SIZES: [u32; 5] = [16, 32, 64, 128, 256];

fn explored_engine(size: u32) -> VisibilityEngine {
    let mut engine = VisibilityEngine::new(UVec2::splat(size), 5);
    for step in (0..size as i32).step_by(4) {
        engine.update_exploration(IVec2::new(step, step));
    }
    engine
}

fn bench_fog_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("fog_field");

    for size in SIZES {
        let engine = explored_engine(size);
        let viewer = Some(IVec2::splat(size as i32 / 2));
        group.bench_with_input(BenchmarkId::new("grid", size), &size, |b, _| {
            b.iter(|| engine.count_by_band(viewer))
        });
    }

    group.finish();
}

fn bench_minimap_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimap_render");
    let config = GameConfig::builtin();

    for size in SIZES {
        let engine = explored_engine(size);
        let grid = GridGeometry::new(config.grid.tile_size);
        let projector = MiniMapProjector::new(
            grid.world_extent(UVec2::splat(size)),
            grid,
            &config.minimap,
            FogPalette::MINIMAP,
        );
        let tracked = Some(IVec2::splat(size as i32 / 2));
        group.bench_with_input(BenchmarkId::new("grid", size), &size, |b, _| {
            b.iter(|| projector.render(&engine, tracked))
        });
    }

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");

    for size in [16u32, 32, 64] {
        group.bench_with_input(BenchmarkId::new("grid", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let map = Arc::new(TileMap::uniform(size, size, true));
                    let mut app = build_app_with_config(map, GameConfig::builtin());
                    run_frame(&mut app, 0.016);
                    app
                },
                |mut app| {
                    run_frame(&mut app, 0.016);
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(frame_benches, bench_fog_field, bench_minimap_render, bench_frame);
criterion_main!(frame_benches);
