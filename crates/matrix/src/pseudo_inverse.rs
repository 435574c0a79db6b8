// Copyright 2025 Irreducible Inc.

use tracing::{debug, instrument};

use crate::{buffer::DenseBuffer, error::Error, scalar::RealScalar};

/// Outcome of a rank-revealing elimination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankReport {
	/// Number of pivots taken, the numeric rank.
	pub rank: usize,
	/// Column of each pivot, in elimination order.
	pub pivots: Vec<usize>,
	/// Columns whose best candidate was negligible and were skipped.
	pub deficient: Vec<usize>,
}

impl<T: RealScalar> DenseBuffer<T> {
	/// Reduces a copy of `self` to reduced row echelon form.
	///
	/// Columns are visited left to right. In each, the largest remaining candidate is swapped into
	/// the next pivot row, the row is normalized and the column is cleared everywhere else. A
	/// candidate whose magnitude is at most `negligible` marks the column rank-deficient instead.
	/// Elimination stops once every row holds a pivot, so the rank is the number of processed
	/// columns minus the deficient ones.
	///
	/// Returns the echelon form, whose first `rank` rows are the non-zero ones.
	pub fn rank_reveal(&self, negligible: T) -> (Self, RankReport) {
		let (m, n) = self.dim();
		let mut echelon = self.clone();
		let mut pivots = Vec::with_capacity(m.min(n));
		let mut deficient = Vec::new();

		let mut row = 0;
		for col in 0..n {
			if row == m {
				break;
			}

			let (pivot, magnitude) = echelon.pivot_in_column(col, row..m);
			if magnitude <= negligible {
				deficient.push(col);
				continue;
			}

			echelon.swap_rows(row, pivot);
			let pivot_value = echelon[(row, col)];
			echelon.divide_row(row, pivot_value);
			for i in (0..row).chain(row + 1..m) {
				let scalar = echelon[(i, col)];
				if scalar != T::zero() {
					echelon.sub_pivot_row(i, row, scalar);
				}
			}

			pivots.push(col);
			row += 1;
		}

		let report = RankReport {
			rank: pivots.len(),
			pivots,
			deficient,
		};
		(echelon, report)
	}

	/// Moore-Penrose pseudo-inverse, an `n x m` matrix for an `m x n` input.
	///
	/// The rank-revealing elimination yields a full-rank factorization `A = C * F`, where the left
	/// block `C` gathers the pivot columns of `A` and the right block `F` holds the non-zero rows
	/// of the echelon form. Both have full rank `r`, so
	/// `A⁺ = Fᵗ (F Fᵗ)⁻¹ (Cᵗ C)⁻¹ Cᵗ`, computed with two `r x r` Gauss-Jordan divisions.
	/// A rank zero input yields the zero matrix.
	///
	/// `negligible` is the magnitude at or below which a pivot candidate counts as zero; with `0`
	/// only exact zeros are rank-deficient.
	#[instrument("DenseBuffer::pseudo_inverse", skip_all, level = "debug")]
	pub fn pseudo_inverse(&self, negligible: T) -> Result<Self, Error> {
		let (m, n) = self.dim();
		let (echelon, report) = self.rank_reveal(negligible);
		debug!(
			rank = report.rank,
			deficient = ?report.deficient,
			"rank-revealing elimination done"
		);

		let r = report.rank;
		if r == 0 {
			return Self::zeros(n, m);
		}

		let mut left = Self::zeros(m, r)?;
		for (k, &col) in report.pivots.iter().enumerate() {
			for i in 0..m {
				left[(i, k)] = self[(i, col)];
			}
		}

		let mut right = Self::zeros(r, n)?;
		right.cut_all(&echelon);

		let left_t = left.transpose();
		let left_gram = Self::product(&left_t, &left)?;
		let right_gram = Self::times_transpose(&right, &right)?;

		let mut out = left_t;
		out.solve_in_place(&left_gram)?;
		out.solve_in_place(&right_gram)?;
		Self::product(&right.transpose(), &out)
	}
}
