// Copyright 2025 Irreducible Inc.

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use lamina_matrix::Matrix;
use lamina_utils::{rayon::adjust_thread_pool, tracing::init_tracing};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_matrix(n: usize, rng: &mut StdRng) -> Matrix<f64> {
	let elements = std::iter::repeat_with(|| rng.gen_range(-1.0..1.0))
		.take(n * n)
		.collect();
	Matrix::from_vec(n, n, elements).unwrap()
}

fn bench_product(c: &mut Criterion) {
	adjust_thread_pool()
		.as_ref()
		.expect("failed to init thread pool");
	init_tracing();

	let mut group = c.benchmark_group("product");
	let mut rng = StdRng::seed_from_u64(0);
	for n in [32, 128, 256] {
		let a = random_matrix(n, &mut rng);
		let b = random_matrix(n, &mut rng);
		group.throughput(Throughput::Elements((n * n * n) as u64));
		group.bench_function(format!("serial(n={n})"), |bench| bench.iter(|| a.product(&b)));
		group.bench_function(format!("parallel(n={n})"), |bench| {
			bench.iter(|| a.par_product(&b))
		});
	}
	group.finish()
}

fn bench_solve(c: &mut Criterion) {
	let mut group = c.benchmark_group("solve");
	let mut rng = StdRng::seed_from_u64(1);
	for n in [16, 64, 128] {
		let mut a = random_matrix(n, &mut rng);
		a.scale(0.1).unwrap();
		a.add_identity().unwrap();
		let b = random_matrix(n, &mut rng);
		group.bench_function(format!("div(n={n})"), |bench| {
			bench.iter(|| {
				let mut x = b.clone();
				x /= &a;
				x
			})
		});
		group.bench_function(format!("det(n={n})"), |bench| bench.iter(|| a.det()));
	}
	group.finish()
}

criterion_group!(matrix, bench_product, bench_solve);
criterion_main!(matrix);
