//! Benchmarks for the layout engine.
//!
//! Run with: cargo bench -p plotkit-layout --bench layout_bench

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use plotkit_layout::{FlexSpec, Frame, GridOptions, LayoutTree};

fn fill_grid(num_cols: usize, count: usize) -> LayoutTree {
    let mut tree = LayoutTree::new();
    let grid = tree
        .create_grid(Frame::new(), num_cols, GridOptions::default().gaps(2.0, 2.0))
        .unwrap();
    for i in 0..count {
        let v = tree.create_view(Frame::new().flex()).unwrap();
        tree.set_size(v, 20.0 + (i % 7) as f64, 10.0 + (i % 5) as f64)
            .unwrap();
        tree.grid_append(grid, v, None).unwrap();
    }
    tree
}

fn bench_grid_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_append");
    for &count in &[16usize, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(fill_grid(4, count)));
        });
    }
    group.finish();
}

fn bench_grid_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_resize");
    for &count in &[16usize, 64, 256] {
        let mut tree = fill_grid(4, count);
        // The grid is always the first view created.
        let grid = plotkit_layout::ViewId::MIN;
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            let mut extent = 200.0;
            b.iter(|| {
                extent = if extent > 150.0 { 120.0 } else { 200.0 };
                tree.resize(grid, black_box(extent), black_box(extent))
                    .unwrap();
                tree.take_resize_events()
            });
        });
    }
    group.finish();
}

fn bench_flex_reflow(c: &mut Criterion) {
    let mut tree = LayoutTree::new();
    let row = tree.create_flex(Frame::new(), FlexSpec::row().gap(1.0)).unwrap();
    let mut first = None;
    for i in 0..64 {
        let v = tree.create_view(Frame::new().bubble()).unwrap();
        tree.set_size(v, 8.0 + (i % 3) as f64, 12.0).unwrap();
        tree.append_child(row, v).unwrap();
        first.get_or_insert(v);
    }
    let first = first.unwrap();
    c.bench_function("flex_reflow_64", |b| {
        let mut width = 8.0;
        b.iter(|| {
            width = if width > 8.5 { 8.0 } else { 9.0 };
            tree.set_size(first, black_box(width), 12.0).unwrap();
            tree.take_resize_events()
        });
    });
}

criterion_group!(
    benches,
    bench_grid_append,
    bench_grid_resize,
    bench_flex_reflow
);
criterion_main!(benches);
