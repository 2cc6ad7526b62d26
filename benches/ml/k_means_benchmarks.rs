use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use honorroll::ml::clustering::{KMeans, KMeansConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn blobs(n: usize, dims: usize, centers: usize) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|i| {
            let offset = (i % centers) as f64 * 10.0;
            (0..dims).map(|_| offset + rng.gen_range(0.0..1.0)).collect()
        })
        .collect()
}

fn bench_identify_clusters(c: &mut Criterion) {
    let mut group = c.benchmark_group("identify_clusters");
    for &n in &[100, 1_000, 5_000] {
        let points = blobs(n, 4, 5);
        group.bench_with_input(BenchmarkId::new("random_seeds", n), &points, |b, points| {
            b.iter(|| {
                let config = KMeansConfig::new().with_seed(7);
                let mut kmeans = KMeans::with_config(points.clone(), config);
                black_box(kmeans.identify_clusters(5, None).unwrap().len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_identify_clusters);
criterion_main!(benches);
