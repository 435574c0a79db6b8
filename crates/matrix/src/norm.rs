// Copyright 2025 Irreducible Inc.

use crate::{buffer::DenseBuffer, scalar::Scalar};

fn max<T: Scalar>(values: impl Iterator<Item = T>) -> T {
	values.fold(T::zero(), |acc, x| if x > acc { x } else { acc })
}

impl<T: Scalar> DenseBuffer<T> {
	/// Induced 1-norm: the largest absolute column sum.
	pub fn norm1(&self) -> T {
		max((0..self.cols()).map(|j| {
			(0..self.rows()).fold(T::zero(), |acc, i| acc + self[(i, j)].magnitude())
		}))
	}

	/// Induced ∞-norm: the largest absolute row sum.
	pub fn norm_inf(&self) -> T {
		max((0..self.rows()).map(|i| {
			self.row(i)
				.iter()
				.fold(T::zero(), |acc, &x| acc + x.magnitude())
		}))
	}
}
