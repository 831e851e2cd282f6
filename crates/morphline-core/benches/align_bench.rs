use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use morphline_core::align::{AlignmentContext, AngularAligner, VertexAligner};
use morphline_core::mapping::{ClusteringMapper, GreedyMapper, Mapper};
use morphline_core::{interpolate, MorphDefaults};
use morphline_data::{Norm, Point, ShapeKind, ShapeState};

fn grid(count: usize, offset: f64) -> Vec<Point> {
    (0..count)
        .map(|i| Point::new((i % 10) as f64 * 10.0 + offset, (i / 10) as f64 * 10.0))
        .collect()
}

fn bench_angular(c: &mut Criterion) {
    let mut group = c.benchmark_group("angular_align");
    for resolution in [32usize, 128, 512] {
        let circle = ShapeKind::Circle { radius: 10.0 }.contours(resolution)[0].outer.clone();
        let star = ShapeKind::Star {
            points: 5,
            outer_radius: 12.0,
            inner_radius: 5.0,
        }
        .contours(resolution)[0]
            .outer
            .clone();
        let aligner = AngularAligner::new(Norm::L2);
        let context = AlignmentContext::closed();
        group.bench_with_input(BenchmarkId::from_parameter(resolution), &resolution, |b, _| {
            b.iter(|| aligner.align(black_box(&circle), black_box(&star), &context, None))
        });
    }
    group.finish();
}

fn bench_mappers(c: &mut Criterion) {
    let start = grid(60, 0.0);
    let end = grid(40, 3.0);
    c.bench_function("greedy_map_60x40", |b| {
        b.iter(|| GreedyMapper.map(black_box(&start), black_box(&end)))
    });
    let clustering = ClusteringMapper::default();
    c.bench_function("clustering_map_60x40", |b| {
        b.iter(|| clustering.map(black_box(&start), black_box(&end)))
    });
}

fn bench_morph_frame(c: &mut Criterion) {
    let defaults = MorphDefaults::default();
    let circle = ShapeState::new(ShapeKind::Circle { radius: 10.0 });
    let square = ShapeState::new(ShapeKind::Rectangle {
        width: 20.0,
        height: 20.0,
        corner_radius: 0.0,
    });
    c.bench_function("circle_to_square_uncached", |b| {
        b.iter(|| interpolate(black_box(&circle), black_box(&square), 0.5, &defaults))
    });
}

criterion_group!(benches, bench_angular, bench_mappers, bench_morph_frame);
criterion_main!(benches);
