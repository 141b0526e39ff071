use criterion::measurement::Measurement;
use criterion::{criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion};
use rand::distr::{Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};
use sparse_algebra::sparse::pool;
use sparse_algebra::{ScratchPoolConfig, SparseMatrix};
use std::time::Duration;

#[derive(Clone)]
pub struct SparseMatrixConfig {
    seed: u64,
    matrix_sizes: Vec<usize>,
    densities: Vec<f64>,
    measurement_time: u64,
    sample_size: usize,
}

impl Default for SparseMatrixConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            matrix_sizes: vec![50, 200, 500],
            densities: vec![0.01, 0.1],
            measurement_time: 10,
            sample_size: 10,
        }
    }
}

fn create_test_matrix(size: usize, density: f64, seed: u64) -> SparseMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let value_dist = Uniform::try_from(0.0..1.0).unwrap();
    SparseMatrix::random(size, size, density, &mut rng, |rng| value_dist.sample(rng)).unwrap()
}

fn configure_group<'a, M: Measurement>(
    c: &'a mut Criterion<M>,
    name: &str,
    config: &SparseMatrixConfig,
) -> BenchmarkGroup<'a, M> {
    let mut group = c.benchmark_group(name);
    group.measurement_time(Duration::from_secs(config.measurement_time));
    group.sample_size(config.sample_size);
    group
}

pub fn bench_elementwise(c: &mut Criterion) {
    let config = SparseMatrixConfig::default();
    let mut group = configure_group(c, "Sparse_Elementwise", &config);

    for &size in config.matrix_sizes.iter() {
        for &density in config.densities.iter() {
            let a = create_test_matrix(size, density, config.seed + size as u64);
            let b = create_test_matrix(size, density, config.seed + 2 * size as u64);
            let id = format!("{}x{}_d{}", size, size, density);

            group.bench_with_input(BenchmarkId::new("add", &id), &(size, density), |bench, _| {
                bench.iter(|| a.add(&b));
            });

            group.bench_with_input(
                BenchmarkId::new("transpose", &id),
                &(size, density),
                |bench, _| {
                    bench.iter(|| a.transpose());
                },
            );
        }
    }
    group.finish();
}

pub fn bench_dot(c: &mut Criterion) {
    let config = SparseMatrixConfig::default();
    pool::initialize(ScratchPoolConfig::default()).unwrap();
    let mut group = configure_group(c, "Sparse_Dot", &config);

    for &size in config.matrix_sizes.iter() {
        for &density in config.densities.iter() {
            let a = create_test_matrix(size, density, config.seed + size as u64);
            let b = create_test_matrix(size, density, config.seed + 2 * size as u64);

            group.bench_with_input(
                BenchmarkId::new("dot", format!("{}x{}_d{}", size, size, density)),
                &(size, density),
                |bench, _| {
                    bench.iter(|| a.dot(&b));
                },
            );
        }
    }
    group.finish();
}

criterion_group!(sparse_benches, bench_elementwise, bench_dot);
criterion_main!(sparse_benches);
