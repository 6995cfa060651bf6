// Mesh pipeline benchmarks: full-map rebuilds and incremental edits.
//
// The full-map benches rebuild every chunk of a default 4x3-chunk map
// (20x15 cells) from scratch; the edit benches measure the editing loop
// a caller actually sits in, where a flush only rebuilds the chunks an
// edit dirtied.

use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use hexterrace_map::config::MapConfig;
use hexterrace_map::coords::HexCoordinates;
use hexterrace_map::direction::HexDirection;
use hexterrace_map::grid::HexGrid;

fn full_rebuild(c: &mut Criterion) {
    let config = MapConfig::default();
    c.bench_function("flush_full_map_serial", |b| {
        b.iter_batched(
            || HexGrid::new(&config),
            |mut grid| black_box(grid.flush()),
            BatchSize::LargeInput,
        )
    });
    c.bench_function("flush_full_map_parallel", |b| {
        b.iter_batched(
            || HexGrid::new(&config),
            |mut grid| black_box(grid.flush_parallel()),
            BatchSize::LargeInput,
        )
    });
}

fn incremental_edit(c: &mut Criterion) {
    let config = MapConfig::default();
    let grid = HexGrid::new(&config);
    // Interior to its chunk, so an edit dirties exactly one chunk.
    let target = grid.cell_at(HexCoordinates::from_offset(2, 2)).unwrap();
    drop(grid);

    c.bench_function("raise_one_cell_and_flush", |b| {
        b.iter_batched(
            || {
                let mut grid = HexGrid::new(&config);
                grid.flush();
                grid
            },
            |mut grid| {
                grid.set_elevation(target, 2);
                black_box(grid.flush())
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("carve_river_and_flush", |b| {
        b.iter_batched(
            || {
                let mut grid = HexGrid::new(&config);
                grid.set_elevation(target, 1);
                grid.flush();
                grid
            },
            |mut grid| {
                grid.set_outgoing_river(target, HexDirection::E);
                black_box(grid.flush())
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, full_rebuild, incremental_edit);
criterion_main!(benches);
