// Copyright 2025 Irreducible Inc.

use std::ops::{AddAssign, DivAssign, Index, IndexMut, MulAssign, Neg, SubAssign};

use bytemuck::zeroed_slice_box;
use getset::CopyGetters;
use lamina_utils::{bail, checked_arithmetics::checked_area, ensure};

use crate::{error::Error, scalar::Scalar};

/// A dense `rows x cols` matrix stored in a row-major boxed slice.
///
/// Element `(i, j)` lives at offset `i * cols + j`. Both dimensions are always non-zero and the
/// element count always fits the addressable range; every constructor checks this. The buffer is
/// exclusively owned: the shared, copy-on-write view is [`Matrix`](crate::Matrix).
#[derive(Debug, Clone, CopyGetters)]
pub struct DenseBuffer<T: Scalar> {
	#[getset(get_copy = "pub")]
	rows: usize,
	#[getset(get_copy = "pub")]
	cols: usize,
	elements: Box<[T]>,
}

/// Element count of a `rows x cols` buffer, validating the shape.
pub(crate) fn checked_len<T>(rows: usize, cols: usize) -> Result<usize, Error> {
	ensure!(rows > 0 && cols > 0, Error::EmptyShape { rows, cols });
	checked_area::<T>(rows, cols).ok_or(Error::SizeOverflow { rows, cols })
}

impl<T: Scalar> DenseBuffer<T> {
	pub fn zeros(rows: usize, cols: usize) -> Result<Self, Error> {
		let len = checked_len::<T>(rows, cols)?;
		Ok(Self {
			rows,
			cols,
			elements: zeroed_slice_box(len),
		})
	}

	pub fn from_elem(rows: usize, cols: usize, value: T) -> Result<Self, Error> {
		let len = checked_len::<T>(rows, cols)?;
		Ok(Self {
			rows,
			cols,
			elements: vec![value; len].into_boxed_slice(),
		})
	}

	/// Takes ownership of a row-major array of exactly `rows * cols` elements.
	pub fn from_vec(rows: usize, cols: usize, elements: Vec<T>) -> Result<Self, Error> {
		let len = checked_len::<T>(rows, cols)?;
		if elements.len() != len {
			bail!(Error::IncorrectArgumentLength {
				arg: "elements".into(),
				expected: len,
			});
		}
		Ok(Self {
			rows,
			cols,
			elements: elements.into_boxed_slice(),
		})
	}

	pub fn identity(n: usize) -> Result<Self, Error> {
		let mut out = Self::zeros(n, n)?;
		out.add_identity();
		Ok(out)
	}

	pub fn dim(&self) -> (usize, usize) {
		(self.rows, self.cols)
	}

	pub fn is_square(&self) -> bool {
		self.rows == self.cols
	}

	/// The row-major elements.
	pub fn elements(&self) -> &[T] {
		&self.elements
	}

	pub fn elements_mut(&mut self) -> &mut [T] {
		&mut self.elements
	}

	pub fn into_vec(self) -> Vec<T> {
		self.elements.into_vec()
	}

	#[inline]
	fn offset(&self, i: usize, j: usize) -> Result<usize, Error> {
		if i >= self.rows || j >= self.cols {
			bail!(Error::IndexOutOfBounds {
				row: i,
				col: j,
				rows: self.rows,
				cols: self.cols,
			});
		}
		Ok(i * self.cols + j)
	}

	pub fn get(&self, i: usize, j: usize) -> Result<T, Error> {
		let offset = self.offset(i, j)?;
		Ok(self.elements[offset])
	}

	pub fn get_mut(&mut self, i: usize, j: usize) -> Result<&mut T, Error> {
		let offset = self.offset(i, j)?;
		Ok(&mut self.elements[offset])
	}

	pub fn row(&self, i: usize) -> &[T] {
		assert!(i < self.rows);
		&self.elements[i * self.cols..(i + 1) * self.cols]
	}

	pub fn row_mut(&mut self, i: usize) -> &mut [T] {
		assert!(i < self.rows);
		&mut self.elements[i * self.cols..(i + 1) * self.cols]
	}

	pub fn fill(&mut self, value: T) {
		self.elements.fill(value);
	}

	pub fn fill_zero(&mut self) {
		self.elements.fill(T::zero());
	}

	/// Adds one to every diagonal entry `(k, k)` with `k < min(rows, cols)`.
	pub fn add_identity(&mut self) {
		let step = self.cols + 1;
		for k in 0..self.rows.min(self.cols) {
			self.elements[k * step] += T::one();
		}
	}

	pub fn try_add_assign(&mut self, rhs: &Self) -> Result<(), Error> {
		self.ensure_same_dim("add", rhs)?;
		for (lhs, &rhs) in self.elements.iter_mut().zip(rhs.elements.iter()) {
			*lhs += rhs;
		}
		Ok(())
	}

	pub fn try_sub_assign(&mut self, rhs: &Self) -> Result<(), Error> {
		self.ensure_same_dim("sub", rhs)?;
		for (lhs, &rhs) in self.elements.iter_mut().zip(rhs.elements.iter()) {
			*lhs -= rhs;
		}
		Ok(())
	}

	pub fn scale(&mut self, factor: T) {
		for x in self.elements.iter_mut() {
			*x *= factor;
		}
	}

	pub fn unscale(&mut self, divisor: T) {
		for x in self.elements.iter_mut() {
			*x /= divisor;
		}
	}

	pub fn transpose(&self) -> Self {
		let mut elements = Vec::with_capacity(self.elements.len());
		for j in 0..self.cols {
			elements.extend((0..self.rows).map(|i| self.elements[i * self.cols + j]));
		}
		Self {
			rows: self.cols,
			cols: self.rows,
			elements: elements.into_boxed_slice(),
		}
	}

	pub(crate) fn ensure_same_dim(&self, op: &'static str, rhs: &Self) -> Result<(), Error> {
		ensure!(
			self.dim() == rhs.dim(),
			Error::ShapeMismatch {
				op,
				lhs: self.dim(),
				rhs: rhs.dim(),
			}
		);
		Ok(())
	}

	pub(crate) fn swap_rows(&mut self, i0: usize, i1: usize) {
		assert!(i0 < self.rows);
		assert!(i1 < self.rows);

		if i0 == i1 {
			return;
		}

		let (lo, hi) = (i0.min(i1), i0.max(i1));
		let (head, tail) = self.elements.split_at_mut(hi * self.cols);
		head[lo * self.cols..(lo + 1) * self.cols].swap_with_slice(&mut tail[..self.cols]);
	}

	pub(crate) fn divide_row(&mut self, i: usize, divisor: T) {
		for x in self.row_mut(i) {
			*x /= divisor;
		}
	}

	/// Row `i0` -= `scalar` * row `i1`.
	pub(crate) fn sub_pivot_row(&mut self, i0: usize, i1: usize, scalar: T) {
		assert!(i0 < self.rows);
		assert!(i1 < self.rows);

		let cols = self.cols;
		for j in 0..cols {
			let x = self.elements[i1 * cols + j];
			self.elements[i0 * cols + j] -= x * scalar;
		}
	}

	/// Index and magnitude of the largest entry of column `col` over `rows`; the first one wins
	/// ties.
	pub(crate) fn pivot_in_column(&self, col: usize, rows: std::ops::Range<usize>) -> (usize, T) {
		let mut best = (rows.start, T::zero());
		for i in rows {
			let magnitude = self.elements[i * self.cols + col].magnitude();
			if magnitude > best.1 {
				best = (i, magnitude);
			}
		}
		best
	}
}

impl<T: Scalar> PartialEq for DenseBuffer<T> {
	fn eq(&self, other: &Self) -> bool {
		if self.dim() != other.dim() {
			return false;
		}

		cfg_if::cfg_if! {
			if #[cfg(feature = "bytewise_eq")] {
				bytemuck::cast_slice::<T, u8>(&self.elements)
					== bytemuck::cast_slice::<T, u8>(&other.elements)
			} else {
				!self
					.elements
					.iter()
					.zip(other.elements.iter())
					.any(|(a, b)| a != b)
			}
		}
	}
}

impl<T: Scalar> Index<(usize, usize)> for DenseBuffer<T> {
	type Output = T;

	fn index(&self, index: (usize, usize)) -> &Self::Output {
		let (i, j) = index;
		assert!(i < self.rows);
		assert!(j < self.cols);
		&self.elements[i * self.cols + j]
	}
}

impl<T: Scalar> IndexMut<(usize, usize)> for DenseBuffer<T> {
	fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
		let (i, j) = index;
		assert!(i < self.rows);
		assert!(j < self.cols);
		&mut self.elements[i * self.cols + j]
	}
}

impl<T: Scalar> AddAssign<&Self> for DenseBuffer<T> {
	fn add_assign(&mut self, rhs: &Self) {
		if let Err(err) = self.try_add_assign(rhs) {
			panic!("{err}");
		}
	}
}

impl<T: Scalar> SubAssign<&Self> for DenseBuffer<T> {
	fn sub_assign(&mut self, rhs: &Self) {
		if let Err(err) = self.try_sub_assign(rhs) {
			panic!("{err}");
		}
	}
}

impl<T: Scalar> MulAssign<T> for DenseBuffer<T> {
	fn mul_assign(&mut self, rhs: T) {
		self.scale(rhs);
	}
}

impl<T: Scalar> DivAssign<T> for DenseBuffer<T> {
	fn div_assign(&mut self, rhs: T) {
		self.unscale(rhs);
	}
}

impl<T: Scalar> Neg for &DenseBuffer<T> {
	type Output = DenseBuffer<T>;

	fn neg(self) -> DenseBuffer<T> {
		DenseBuffer {
			rows: self.rows,
			cols: self.cols,
			elements: self.elements.iter().map(|&x| -x).collect(),
		}
	}
}
