// Copyright 2025 Irreducible Inc.

use std::{env, sync::OnceLock};

/// Pins the global rayon pool to the calling thread when `RAYON_NUM_THREADS=1`.
///
/// A single-threaded pool that still spawns a worker makes profiles noisy without making anything
/// faster; running on the current thread keeps the parallel kernels equivalent to the serial ones.
///
/// rayon only lets the global pool be built once, so the outcome of the first call is cached and
/// returned by reference (`ThreadPoolBuildError` is not `Clone`). Call it at the top of `main`.
pub fn adjust_thread_pool() -> &'static Result<(), rayon::ThreadPoolBuildError> {
	static ONCE_GUARD: OnceLock<Result<(), rayon::ThreadPoolBuildError>> = OnceLock::new();

	ONCE_GUARD.get_or_init(|| match env::var("RAYON_NUM_THREADS") {
		Ok(v) if v.trim() == "1" => rayon::ThreadPoolBuilder::new()
			.num_threads(1)
			.use_current_thread()
			.build_global(),
		_ => Ok(()),
	})
}

/// Base-2 logarithm of the number of parallel tasks worth creating for one job.
pub fn get_log_max_threads() -> usize {
	(2 * rayon::current_num_threads() - 1).ilog2() as _
}

/// Rows per band when `rows` rows are split across the pool, never fewer than `min_rows`.
pub fn rows_per_band(rows: usize, min_rows: usize) -> usize {
	let bands = 1usize << get_log_max_threads();
	rows.div_ceil(bands).max(min_rows).max(1)
}
