// Copyright 2025 Irreducible Inc.

use lamina_utils::{bail, ensure};
use tracing::{instrument, trace};

use crate::{buffer::DenseBuffer, error::Error, scalar::RealScalar};

impl<T: RealScalar> DenseBuffer<T> {
	/// Determinant by Gaussian elimination with partial pivoting.
	///
	/// Columns are reduced from the last to the first on a scratch copy, which leaves a lower
	/// triangular matrix whose diagonal product, signed by the parity of the row swaps, is the
	/// determinant. A column without a non-zero candidate makes the result exactly zero. Any NaN
	/// element makes the result NaN.
	///
	/// ## Throws
	///
	/// * [`Error::MatrixNotSquare`]
	#[instrument("DenseBuffer::det", skip_all, level = "debug")]
	pub fn det(&self) -> Result<T, Error> {
		ensure!(self.is_square(), Error::MatrixNotSquare);

		// NaN never wins a pivot comparison and would read as a zero column.
		if self.elements().iter().any(|&x| x.is_nan()) {
			return Ok(T::nan());
		}

		let mut tmp = self.clone();
		let mut negative = false;

		for k in (0..self.rows()).rev() {
			let (pivot, magnitude) = tmp.pivot_in_column(k, 0..k + 1);
			if magnitude == T::zero() {
				trace!(column = k, "zero pivot, determinant vanishes");
				return Ok(T::zero());
			}
			if pivot != k {
				tmp.swap_rows(pivot, k);
				negative = !negative;
			}

			let pivot_value = tmp[(k, k)];
			for i in 0..k {
				let scalar = tmp[(i, k)] / pivot_value;
				if scalar != T::zero() {
					tmp.sub_pivot_row(i, k, scalar);
				}
			}
		}

		let product = (0..self.rows()).fold(T::one(), |acc, k| acc * tmp[(k, k)]);
		Ok(if negative { -product } else { product })
	}

	/// Left division: replaces `self` with `lhs⁻¹ * self`.
	///
	/// Gauss-Jordan elimination with partial pivoting runs on a scratch copy of `lhs` while every
	/// row operation is mirrored on `self`.
	///
	/// ## Throws
	///
	/// * [`Error::MatrixNotSquare`] if `lhs` is not square
	/// * [`Error::ShapeMismatch`] if `lhs` and `self` have different row counts
	/// * [`Error::MatrixIsSingular`] if a pivot column has no non-zero candidate, NaN candidates
	///   included; `self` is left partially reduced in that case, see [`Matrix::solve`] for an
	///   all-or-nothing variant
	///
	/// [`Matrix::solve`]: crate::Matrix::solve
	#[instrument("DenseBuffer::solve_in_place", skip_all, level = "debug")]
	pub fn solve_in_place(&mut self, lhs: &Self) -> Result<(), Error> {
		ensure!(lhs.is_square(), Error::MatrixNotSquare);
		ensure!(
			lhs.rows() == self.rows(),
			Error::ShapeMismatch {
				op: "div",
				lhs: self.dim(),
				rhs: lhs.dim(),
			}
		);

		let n = lhs.rows();
		let mut tmp = lhs.clone();

		for i in 0..n {
			let (pivot, magnitude) = tmp.pivot_in_column(i, i..n);
			if magnitude == T::zero() {
				trace!(column = i, "zero pivot in divisor");
				bail!(Error::MatrixIsSingular);
			}
			tmp.swap_rows(i, pivot);
			self.swap_rows(i, pivot);

			// Normalize the pivot
			let pivot_value = tmp[(i, i)];
			tmp.divide_row(i, pivot_value);
			self.divide_row(i, pivot_value);

			// Clear the pivot column
			for j in (0..i).chain(i + 1..n) {
				let scalar = tmp[(j, i)];
				if scalar != T::zero() {
					tmp.sub_pivot_row(j, i, scalar);
					self.sub_pivot_row(j, i, scalar);
				}
			}
		}

		Ok(())
	}

	/// The inverse of a square matrix.
	pub fn inverse(&self) -> Result<Self, Error> {
		ensure!(self.is_square(), Error::MatrixNotSquare);
		let mut out = Self::identity(self.rows())?;
		out.solve_in_place(self)?;
		Ok(out)
	}
}
