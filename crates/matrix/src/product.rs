// Copyright 2025 Irreducible Inc.

use lamina_utils::{
	checked_arithmetics::{checked_area, checked_extent},
	ensure,
	env::usize_env_var,
	rayon::rows_per_band,
};
use rayon::prelude::*;
use tracing::instrument;

use crate::{buffer::DenseBuffer, error::Error, scalar::Scalar};

/// Minimum number of output rows handed to one rayon task, overridable through the environment.
const PAR_MIN_ROWS_VAR: &str = "LAMINA_PAR_MIN_ROWS";
const DEFAULT_PAR_MIN_ROWS: usize = 16;

/// Accumulates rows `first_row..` of `a * b` into `out`, which holds whole output rows.
///
/// The `i, k, j` loop order streams through rows of `b` and `out`, so each output element is
/// accumulated in increasing `k` regardless of how the rows are banded.
fn mul_rows_into<T: Scalar>(a: &DenseBuffer<T>, b: &DenseBuffer<T>, first_row: usize, out: &mut [T]) {
	let n = b.cols();
	for (offset, out_row) in out.chunks_exact_mut(n).enumerate() {
		let a_row = a.row(first_row + offset);
		for (k, &a_ik) in a_row.iter().enumerate() {
			for (c, &b_kj) in out_row.iter_mut().zip(b.row(k)) {
				*c += a_ik * b_kj;
			}
		}
	}
}

impl<T: Scalar> DenseBuffer<T> {
	fn check_product_dims(a: &Self, b: &Self) -> Result<(), Error> {
		ensure!(
			a.cols() == b.rows(),
			Error::ShapeMismatch {
				op: "mul",
				lhs: a.dim(),
				rhs: b.dim(),
			}
		);
		let acc_rows = checked_extent(a.cols(), 1).ok_or(Error::SizeOverflow {
			rows: a.cols(),
			cols: b.cols(),
		})?;
		ensure!(
			checked_area::<T>(acc_rows, b.cols()).is_some(),
			Error::SizeOverflow {
				rows: acc_rows,
				cols: b.cols(),
			}
		);
		Ok(())
	}

	/// `a * b` in a freshly allocated buffer.
	///
	/// The operands may be the same buffer; nothing is written until the product is complete.
	#[instrument("DenseBuffer::product", skip_all, level = "debug")]
	pub fn product(a: &Self, b: &Self) -> Result<Self, Error> {
		Self::check_product_dims(a, b)?;
		let mut out = Self::zeros(a.rows(), b.cols())?;
		mul_rows_into(a, b, 0, out.elements_mut());
		Ok(out)
	}

	/// `a * b` with the output rows computed in parallel bands.
	///
	/// Every element is accumulated in the same order as in [`Self::product`], so both give
	/// identical results.
	#[instrument("DenseBuffer::par_product", skip_all, level = "debug")]
	pub fn par_product(a: &Self, b: &Self) -> Result<Self, Error> {
		Self::check_product_dims(a, b)?;
		let mut out = Self::zeros(a.rows(), b.cols())?;
		let band_rows = rows_per_band(a.rows(), usize_env_var(PAR_MIN_ROWS_VAR, DEFAULT_PAR_MIN_ROWS));
		let n = b.cols();
		out.elements_mut()
			.par_chunks_mut(band_rows.saturating_mul(n))
			.enumerate()
			.for_each(|(band, chunk)| mul_rows_into(a, b, band * band_rows, chunk));
		Ok(out)
	}

	/// Replaces `self` with `self * rhs`.
	pub fn mul_assign_matrix(&mut self, rhs: &Self) -> Result<(), Error> {
		*self = Self::product(self, rhs)?;
		Ok(())
	}

	/// Writes the block `i1..=i2` x `j1..=j2` of `a * b` into `self`, leaving every other element
	/// untouched.
	///
	/// `self` must already have the shape of the full product. Tiling the output and calling this
	/// once per tile assembles the whole product.
	#[instrument("DenseBuffer::get_product", skip_all, level = "debug")]
	pub fn get_product(
		&mut self,
		a: &Self,
		b: &Self,
		i1: usize,
		i2: usize,
		j1: usize,
		j2: usize,
	) -> Result<(), Error> {
		Self::check_product_dims(a, b)?;
		ensure!(
			self.dim() == (a.rows(), b.cols()),
			Error::ShapeMismatch {
				op: "partial product",
				lhs: self.dim(),
				rhs: (a.rows(), b.cols()),
			}
		);
		ensure!(
			i1 <= i2 && i2 < a.rows(),
			Error::InvalidRange {
				start: i1,
				end: i2,
				len: a.rows(),
			}
		);
		ensure!(
			j1 <= j2 && j2 < b.cols(),
			Error::InvalidRange {
				start: j1,
				end: j2,
				len: b.cols(),
			}
		);

		for i in i1..=i2 {
			let a_row = a.row(i);
			let out_row = &mut self.row_mut(i)[j1..=j2];
			out_row.fill(T::zero());
			for (k, &a_ik) in a_row.iter().enumerate() {
				for (c, &b_kj) in out_row.iter_mut().zip(&b.row(k)[j1..=j2]) {
					*c += a_ik * b_kj;
				}
			}
		}
		Ok(())
	}

	/// `a * bᵗ` without materializing the transpose.
	#[instrument("DenseBuffer::times_transpose", skip_all, level = "debug")]
	pub fn times_transpose(a: &Self, b: &Self) -> Result<Self, Error> {
		ensure!(
			a.cols() == b.cols(),
			Error::ShapeMismatch {
				op: "mul transpose",
				lhs: a.dim(),
				rhs: b.dim(),
			}
		);
		let mut out = Self::zeros(a.rows(), b.rows())?;
		for i in 0..a.rows() {
			let a_row = a.row(i);
			for (j, c) in out.row_mut(i).iter_mut().enumerate() {
				*c = a_row
					.iter()
					.zip(b.row(j))
					.fold(T::zero(), |acc, (&x, &y)| acc + x * y);
			}
		}
		Ok(out)
	}
}
