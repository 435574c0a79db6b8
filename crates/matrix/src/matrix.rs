// Copyright 2025 Irreducible Inc.

use std::{
	fmt, io,
	ops::{Add, AddAssign, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign},
	sync::Arc,
};

use lamina_utils::ensure;
use tracing::trace;

use crate::{
	buffer::DenseBuffer,
	error::Error,
	scalar::{RealScalar, Scalar},
};

/// A matrix with value semantics over a shared, reference-counted [`DenseBuffer`].
///
/// A handle is either null (no buffer) or shares a buffer with every handle cloned from it.
/// Cloning is cheap; the first mutation through a handle whose buffer is shared copies the buffer
/// (see [`Matrix::detach`]), so a mutation is never observable through another handle.
///
/// Mutation requires `&mut self`, which rules out two live mutable views of one buffer. The
/// reference count is atomic, so handles may be read from several threads.
pub struct Matrix<T: Scalar> {
	buffer: Option<Arc<DenseBuffer<T>>>,
}

impl<T: Scalar> Matrix<T> {
	/// A null matrix.
	pub const fn null() -> Self {
		Self { buffer: None }
	}

	pub fn zeros(rows: usize, cols: usize) -> Result<Self, Error> {
		DenseBuffer::zeros(rows, cols).map(Self::from)
	}

	pub fn from_elem(rows: usize, cols: usize, value: T) -> Result<Self, Error> {
		DenseBuffer::from_elem(rows, cols, value).map(Self::from)
	}

	/// Adopts a row-major array of `rows * cols` elements.
	pub fn from_vec(rows: usize, cols: usize, elements: Vec<T>) -> Result<Self, Error> {
		DenseBuffer::from_vec(rows, cols, elements).map(Self::from)
	}

	pub fn identity(n: usize) -> Result<Self, Error> {
		DenseBuffer::identity(n).map(Self::from)
	}

	pub fn is_null(&self) -> bool {
		self.buffer.is_none()
	}

	/// Drops this handle's reference and makes it null.
	pub fn reset(&mut self) {
		self.buffer = None;
	}

	/// Number of rows, zero for a null matrix.
	pub fn rows(&self) -> usize {
		self.buffer.as_ref().map_or(0, |buffer| buffer.rows())
	}

	/// Number of columns, zero for a null matrix.
	pub fn cols(&self) -> usize {
		self.buffer.as_ref().map_or(0, |buffer| buffer.cols())
	}

	pub fn dim(&self) -> (usize, usize) {
		(self.rows(), self.cols())
	}

	/// Number of handles sharing this handle's buffer, zero for a null matrix.
	pub fn refcount(&self) -> usize {
		self.buffer.as_ref().map_or(0, Arc::strong_count)
	}

	/// Whether both handles share one buffer.
	pub fn shares_buffer_with(&self, other: &Self) -> bool {
		match (&self.buffer, &other.buffer) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}

	/// The underlying kernel for read-only use.
	pub fn buffer(&self) -> Result<&DenseBuffer<T>, Error> {
		self.buffer.as_deref().ok_or(Error::NullMatrix)
	}

	/// Ensures this handle is the sole owner of its buffer, copying it if it is shared, and
	/// returns the kernel for mutation.
	pub fn detach(&mut self) -> Result<&mut DenseBuffer<T>, Error> {
		let buffer = self.buffer.as_mut().ok_or(Error::NullMatrix)?;
		if Arc::strong_count(buffer) > 1 {
			trace!(rows = buffer.rows(), cols = buffer.cols(), "detaching shared buffer");
		}
		Ok(Arc::make_mut(buffer))
	}

	/// Unwraps the buffer, copying it only if it is still shared.
	pub fn into_buffer(self) -> Result<DenseBuffer<T>, Error> {
		let buffer = self.buffer.ok_or(Error::NullMatrix)?;
		Ok(Arc::try_unwrap(buffer).unwrap_or_else(|shared| (*shared).clone()))
	}

	/// Row-major elements; empty for a null matrix.
	pub fn as_slice(&self) -> &[T] {
		self.buffer.as_deref().map(DenseBuffer::elements).unwrap_or_default()
	}

	/// Mutable row-major elements, detaching first.
	pub fn as_mut_slice(&mut self) -> Result<&mut [T], Error> {
		self.detach().map(DenseBuffer::elements_mut)
	}

	pub fn get(&self, i: usize, j: usize) -> Result<T, Error> {
		self.buffer()?.get(i, j)
	}

	pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<(), Error> {
		let buffer = self.detach()?;
		*buffer.get_mut(i, j)? = value;
		Ok(())
	}

	pub fn fill(&mut self, value: T) -> Result<(), Error> {
		self.detach()?.fill(value);
		Ok(())
	}

	pub fn fill_zero(&mut self) -> Result<(), Error> {
		self.detach()?.fill_zero();
		Ok(())
	}

	pub fn add_identity(&mut self) -> Result<(), Error> {
		self.detach()?.add_identity();
		Ok(())
	}

	pub fn try_add_assign(&mut self, rhs: &Self) -> Result<(), Error> {
		let rhs = Arc::clone(rhs.shared()?);
		self.detach()?.try_add_assign(&rhs)
	}

	pub fn try_sub_assign(&mut self, rhs: &Self) -> Result<(), Error> {
		let rhs = Arc::clone(rhs.shared()?);
		self.detach()?.try_sub_assign(&rhs)
	}

	pub fn scale(&mut self, factor: T) -> Result<(), Error> {
		self.detach()?.scale(factor);
		Ok(())
	}

	pub fn unscale(&mut self, divisor: T) -> Result<(), Error> {
		self.detach()?.unscale(divisor);
		Ok(())
	}

	/// `self * rhs` as a new matrix.
	pub fn product(&self, rhs: &Self) -> Result<Self, Error> {
		DenseBuffer::product(self.buffer()?, rhs.buffer()?).map(Self::from)
	}

	/// `self * rhs` computed on the rayon pool; equal to [`Self::product`].
	pub fn par_product(&self, rhs: &Self) -> Result<Self, Error> {
		DenseBuffer::par_product(self.buffer()?, rhs.buffer()?).map(Self::from)
	}

	/// Replaces `self` with `self * rhs`. `rhs` may share `self`'s buffer.
	pub fn try_mul_assign(&mut self, rhs: &Self) -> Result<(), Error> {
		*self = self.product(rhs)?;
		Ok(())
	}

	/// Overwrites rows `i1..=i2`, columns `j1..=j2` of `self` with that block of `a * b`.
	///
	/// `self` must already be `a.rows() x b.cols()`. Any of the three handles may share a buffer:
	/// `self` is detached before writing, so `a` and `b` keep their values.
	#[allow(clippy::too_many_arguments)]
	pub fn partial_product(
		&mut self,
		a: &Self,
		b: &Self,
		i1: usize,
		i2: usize,
		j1: usize,
		j2: usize,
	) -> Result<(), Error> {
		let a = Arc::clone(a.shared()?);
		let b = Arc::clone(b.shared()?);
		self.detach()?.get_product(&a, &b, i1, i2, j1, j2)
	}

	pub fn transpose(&self) -> Result<Self, Error> {
		Ok(self.buffer()?.transpose().into())
	}

	/// `self * rhsᵗ` without materializing the transpose.
	pub fn times_transpose(&self, rhs: &Self) -> Result<Self, Error> {
		DenseBuffer::times_transpose(self.buffer()?, rhs.buffer()?).map(Self::from)
	}

	pub fn norm1(&self) -> Result<T, Error> {
		Ok(self.buffer()?.norm1())
	}

	pub fn norm_inf(&self) -> Result<T, Error> {
		Ok(self.buffer()?.norm_inf())
	}

	/// See [`DenseBuffer::cut`]. `src` may share `self`'s buffer.
	#[allow(clippy::too_many_arguments)]
	pub fn cut(
		&mut self,
		src: &Self,
		di: isize,
		dj: isize,
		si: usize,
		sj: usize,
		sm: usize,
		sn: usize,
	) -> Result<(), Error> {
		let src = Arc::clone(src.shared()?);
		self.detach()?.cut(&src, di, dj, si, sj, sm, sn);
		Ok(())
	}

	/// Copies the overlapping top-left block of `src` into `self`.
	pub fn cut_all(&mut self, src: &Self) -> Result<(), Error> {
		self.cut(src, 0, 0, 0, 0, usize::MAX, usize::MAX)
	}

	pub fn sub_matrix(&self, i: usize, j: usize, m: usize, n: usize) -> Result<Self, Error> {
		self.buffer()?.sub_matrix(i, j, m, n).map(Self::from)
	}

	/// `[a | b]`.
	pub fn merge_h(a: &Self, b: &Self) -> Result<Self, Error> {
		DenseBuffer::merge_h(a.buffer()?, b.buffer()?).map(Self::from)
	}

	/// `a` stacked on top of `b`.
	pub fn merge_v(a: &Self, b: &Self) -> Result<Self, Error> {
		DenseBuffer::merge_v(a.buffer()?, b.buffer()?).map(Self::from)
	}

	/// Writes one `"<prefix>[v1  v2  ...]"` line per row, or `"<prefix>[NULL]"` for a null matrix.
	pub fn print<W, F>(&self, out: &mut W, to_string: F, prefix: &str) -> io::Result<()>
	where
		W: io::Write + ?Sized,
		F: Fn(&T) -> String,
	{
		match self.buffer.as_deref() {
			Some(buffer) => buffer.print(out, to_string, prefix),
			None => writeln!(out, "{prefix}[NULL]"),
		}
	}

	fn shared(&self) -> Result<&Arc<DenseBuffer<T>>, Error> {
		self.buffer.as_ref().ok_or(Error::NullMatrix)
	}
}

impl<T: RealScalar> Matrix<T> {
	pub fn det(&self) -> Result<T, Error> {
		self.buffer()?.det()
	}

	/// Replaces `self` with `rhs⁻¹ * self`.
	///
	/// When both handles share one buffer the result is the identity and no elimination runs. On
	/// error `self` keeps its value.
	pub fn try_div_assign(&mut self, rhs: &Self) -> Result<(), Error> {
		if self.shares_buffer_with(rhs) {
			let buffer = self.buffer()?;
			ensure!(buffer.is_square(), Error::MatrixNotSquare);
			let n = buffer.rows();
			*self = Self::identity(n)?;
			return Ok(());
		}

		// Eliminate on a scratch copy so a singular divisor leaves `self` untouched.
		let mut out = self.buffer()?.clone();
		out.solve_in_place(rhs.buffer()?)?;
		*self = out.into();
		Ok(())
	}

	/// `divisor⁻¹ * self` as a new matrix.
	pub fn solve(&self, divisor: &Self) -> Result<Self, Error> {
		let mut out = self.clone();
		out.try_div_assign(divisor)?;
		Ok(out)
	}

	pub fn inverse(&self) -> Result<Self, Error> {
		self.buffer()?.inverse().map(Self::from)
	}

	/// Moore-Penrose pseudo-inverse; candidates of magnitude at most `negligible` count as zero.
	pub fn pseudo_inverse(&self, negligible: T) -> Result<Self, Error> {
		self.buffer()?.pseudo_inverse(negligible).map(Self::from)
	}

	/// Numeric rank under the same threshold as [`Self::pseudo_inverse`].
	pub fn rank(&self, negligible: T) -> Result<usize, Error> {
		Ok(self.buffer()?.rank_reveal(negligible).1.rank)
	}
}

impl<T: Scalar> From<DenseBuffer<T>> for Matrix<T> {
	fn from(buffer: DenseBuffer<T>) -> Self {
		Self {
			buffer: Some(Arc::new(buffer)),
		}
	}
}

impl<T: Scalar> Default for Matrix<T> {
	fn default() -> Self {
		Self::null()
	}
}

impl<T: Scalar> Clone for Matrix<T> {
	fn clone(&self) -> Self {
		Self {
			buffer: self.buffer.clone(),
		}
	}
}

impl<T: Scalar> fmt::Debug for Matrix<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.buffer.as_deref() {
			Some(buffer) => f
				.debug_struct("Matrix")
				.field("refcount", &self.refcount())
				.field("buffer", buffer)
				.finish(),
			None => f.write_str("Matrix(NULL)"),
		}
	}
}

impl<T: Scalar + fmt::Display> fmt::Display for Matrix<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.buffer.as_deref() {
			Some(buffer) => fmt::Display::fmt(buffer, f),
			None => writeln!(f, "[NULL]"),
		}
	}
}

impl<T: Scalar> PartialEq for Matrix<T> {
	fn eq(&self, other: &Self) -> bool {
		match (&self.buffer, &other.buffer) {
			(None, None) => true,
			(Some(a), Some(b)) => Arc::ptr_eq(a, b) || **a == **b,
			_ => false,
		}
	}
}

impl<T: Scalar> Index<(usize, usize)> for Matrix<T> {
	type Output = T;

	fn index(&self, index: (usize, usize)) -> &Self::Output {
		match self.buffer.as_deref() {
			Some(buffer) => &buffer[index],
			None => panic!("{}", Error::NullMatrix),
		}
	}
}

impl<T: Scalar> IndexMut<(usize, usize)> for Matrix<T> {
	fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
		match self.detach() {
			Ok(buffer) => &mut buffer[index],
			Err(err) => panic!("{err}"),
		}
	}
}

macro_rules! impl_assign_ops {
	($($bound:ident: $trait:ident, $method:ident, $rhs:ty, $via:ident;)*) => {
		$(
			impl<T: $bound> $trait<$rhs> for Matrix<T> {
				fn $method(&mut self, rhs: $rhs) {
					if let Err(err) = self.$via(rhs) {
						panic!("{err}");
					}
				}
			}
		)*
	};
}

impl_assign_ops! {
	Scalar: AddAssign, add_assign, &Matrix<T>, try_add_assign;
	Scalar: SubAssign, sub_assign, &Matrix<T>, try_sub_assign;
	Scalar: MulAssign, mul_assign, &Matrix<T>, try_mul_assign;
	RealScalar: DivAssign, div_assign, &Matrix<T>, try_div_assign;
	Scalar: MulAssign, mul_assign, T, scale;
	Scalar: DivAssign, div_assign, T, unscale;
}

impl<T: Scalar> Neg for &Matrix<T> {
	type Output = Matrix<T>;

	fn neg(self) -> Matrix<T> {
		match self.buffer.as_deref() {
			Some(buffer) => (-buffer).into(),
			None => Matrix::null(),
		}
	}
}

impl<T: Scalar> Add<Self> for &Matrix<T> {
	type Output = Matrix<T>;

	fn add(self, rhs: Self) -> Matrix<T> {
		let mut out = self.clone();
		out += rhs;
		out
	}
}

impl<T: Scalar> Sub<Self> for &Matrix<T> {
	type Output = Matrix<T>;

	fn sub(self, rhs: Self) -> Matrix<T> {
		let mut out = self.clone();
		out -= rhs;
		out
	}
}

impl<T: Scalar> Mul<Self> for &Matrix<T> {
	type Output = Matrix<T>;

	fn mul(self, rhs: Self) -> Matrix<T> {
		match self.product(rhs) {
			Ok(out) => out,
			Err(err) => panic!("{err}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	fn sample() -> Matrix<f64> {
		Matrix::from_vec(2, 2, vec![4.0, 3.0, 6.0, 3.0]).unwrap()
	}

	#[test]
	fn test_null_state() {
		let m = Matrix::<f64>::default();
		assert!(m.is_null());
		assert_eq!(m.dim(), (0, 0));
		assert_eq!(m.refcount(), 0);
		assert!(m.as_slice().is_empty());
		assert_matches!(m.det(), Err(Error::NullMatrix));
		assert_matches!(m.get(0, 0), Err(Error::NullMatrix));

		let mut other = Matrix::<f64>::null();
		assert_matches!(other.fill(1.0), Err(Error::NullMatrix));
		assert_eq!(m, other);
		assert_ne!(m, sample());
		assert_ne!(sample(), m);
	}

	#[test]
	fn test_reset() {
		let mut m = sample();
		let copy = m.clone();
		assert_eq!(copy.refcount(), 2);
		m.reset();
		assert!(m.is_null());
		assert_eq!(copy.refcount(), 1);
	}

	#[test]
	fn test_clone_shares_until_write() {
		let a = sample();
		let mut b = a.clone();
		assert!(a.shares_buffer_with(&b));
		assert_eq!(a.refcount(), 2);

		b[(0, 0)] = 10.0;
		assert!(!a.shares_buffer_with(&b));
		assert_eq!(a.refcount(), 1);
		assert_eq!(b.refcount(), 1);
		assert_eq!(a[(0, 0)], 4.0);
		assert_eq!(b[(0, 0)], 10.0);
	}

	#[test]
	fn test_write_to_original_after_copy() {
		let mut a = sample();
		let b = a.clone();
		a.set(1, 1, -1.0).unwrap();
		assert_eq!(b[(1, 1)], 3.0);
		assert_eq!(a[(1, 1)], -1.0);
		assert_matches!(a.set(2, 0, 0.0), Err(Error::IndexOutOfBounds { .. }));
	}

	#[test]
	fn test_unique_handle_mutates_in_place() {
		let mut a = sample();
		let before = a.as_slice().as_ptr();
		a.add_identity().unwrap();
		assert_eq!(a.as_slice().as_ptr(), before);
		assert_eq!(a.as_slice(), &[5.0, 3.0, 6.0, 4.0]);
	}

	#[test]
	fn test_as_mut_slice_detaches() {
		let a = sample();
		let mut b = a.clone();
		b.as_mut_slice().unwrap().fill(0.0);
		assert_eq!(a, sample());
		assert_eq!(b, Matrix::zeros(2, 2).unwrap());
	}

	#[test]
	#[cfg(not(feature = "bytewise_eq"))]
	fn test_equality_fast_path() {
		let a = Matrix::from_vec(1, 2, vec![f64::NAN, 1.0]).unwrap();
		let b = a.clone();
		assert_eq!(a, b);
		let c = Matrix::from_vec(1, 2, vec![f64::NAN, 1.0]).unwrap();
		assert_ne!(a, c);
	}

	#[test]
	fn test_arithmetic_operators() {
		let a = sample();
		let b = Matrix::identity(2).unwrap();
		assert_eq!((&a + &b).as_slice(), &[5.0, 3.0, 6.0, 4.0]);
		assert_eq!((&a - &b).as_slice(), &[3.0, 3.0, 6.0, 2.0]);
		assert_eq!((-&a).as_slice(), &[-4.0, -3.0, -6.0, -3.0]);
		assert!((-&Matrix::<f64>::null()).is_null());

		let mut c = a.clone();
		c *= 2.0;
		c /= 4.0;
		assert_eq!(c.as_slice(), &[2.0, 1.5, 3.0, 1.5]);
		assert_eq!(a, sample());
	}

	#[test]
	fn test_add_shared_operand() {
		let mut a = sample();
		let alias = a.clone();
		a += &alias;
		assert_eq!(a.as_slice(), &[8.0, 6.0, 12.0, 6.0]);
		assert_eq!(alias, sample());
	}

	#[test]
	#[should_panic(expected = "incompatible")]
	fn test_add_shape_mismatch_panics() {
		let mut a = sample();
		a += &Matrix::zeros(3, 2).unwrap();
	}

	#[test]
	fn test_mul_assign_shared_operand() {
		let mut a = sample();
		let alias = a.clone();
		a *= &alias;
		assert_eq!(a.as_slice(), &[34.0, 21.0, 42.0, 27.0]);
		assert_eq!(alias, sample());
		assert_eq!(&alias * &alias, a);
	}

	#[test]
	fn test_self_division_is_identity() {
		let mut a = sample();
		let alias = a.clone();
		a /= &alias;
		assert_eq!(a, Matrix::identity(2).unwrap());
		assert_eq!(alias, sample());

		let wide = Matrix::<f64>::zeros(2, 3).unwrap();
		let mut wide_alias = wide.clone();
		assert_matches!(wide_alias.try_div_assign(&wide), Err(Error::MatrixNotSquare));
	}

	#[test]
	fn test_division() {
		let a = sample();
		let mut b = Matrix::from_vec(2, 1, vec![7.0, 9.0]).unwrap();
		b /= &a;
		assert_eq!(Matrix::from_vec(2, 1, vec![7.0, 9.0]).unwrap().solve(&a).unwrap(), b);
		let check = a.product(&b).unwrap();
		assert!((check[(0, 0)] - 7.0).abs() < 1e-12);
		assert!((check[(1, 0)] - 9.0).abs() < 1e-12);

		let singular = Matrix::from_vec(2, 2, vec![1.0, 2.0, 2.0, 4.0]).unwrap();
		let mut c = sample();
		assert_matches!(c.try_div_assign(&singular), Err(Error::MatrixIsSingular));
	}

	#[test]
	fn test_failed_division_keeps_dividend() {
		let singular = Matrix::from_vec(2, 2, vec![1.0, 2.0, 2.0, 4.0]).unwrap();

		let mut unique = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
		assert_matches!(unique.try_div_assign(&singular), Err(Error::MatrixIsSingular));
		assert_eq!(unique.as_slice(), &[1.0, 2.0, 3.0, 4.0]);

		let shared = unique.clone();
		assert_matches!(unique.solve(&singular), Err(Error::MatrixIsSingular));
		assert_matches!(unique.try_div_assign(&singular), Err(Error::MatrixIsSingular));
		assert!(unique.shares_buffer_with(&shared));
		assert_eq!(shared.as_slice(), &[1.0, 2.0, 3.0, 4.0]);

		let mut wrong_rows = unique.clone();
		assert_matches!(
			wrong_rows.try_div_assign(&Matrix::identity(3).unwrap()),
			Err(Error::ShapeMismatch { .. })
		);
		assert_eq!(wrong_rows, shared);
	}

	#[test]
	fn test_partial_product_into_operand() {
		let a = sample();
		let mut out = a.clone();
		out.partial_product(&a, &a, 0, 0, 0, 1).unwrap();
		assert_eq!(out.as_slice(), &[34.0, 21.0, 6.0, 3.0]);
		assert_eq!(a, sample());
	}

	#[test]
	fn test_cut_from_shared_source() {
		let src = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
		let mut dst = src.clone();
		dst.cut(&src, -1, 0, 0, 0, usize::MAX, usize::MAX).unwrap();
		assert_eq!(dst.as_slice(), &[3.0, 4.0, 3.0, 4.0]);
		assert_eq!(src.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
	}

	#[test]
	fn test_merge_same_handle() {
		let a = sample();
		let h = Matrix::merge_h(&a, &a).unwrap();
		assert_eq!(h.dim(), (2, 4));
		assert_eq!(h.sub_matrix(0, 2, 2, 2).unwrap(), a);
		assert_matches!(Matrix::merge_v(&a, &Matrix::null()), Err(Error::NullMatrix));
	}

	#[test]
	fn test_into_buffer() {
		let a = sample();
		let b = a.clone();
		let buffer = b.into_buffer().unwrap();
		assert_eq!(buffer.elements(), a.as_slice());
		assert_matches!(Matrix::<f64>::null().into_buffer(), Err(Error::NullMatrix));
	}

	#[test]
	fn test_print() {
		let mut out = Vec::new();
		sample().print(&mut out, |v| v.to_string(), "> ").unwrap();
		Matrix::<f64>::null().print(&mut out, |v| v.to_string(), "> ").unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "> [4  3]\n> [6  3]\n> [NULL]\n");
		assert_eq!(Matrix::<f64>::null().to_string(), "[NULL]\n");
	}

	#[test]
	fn test_handles_are_send_and_sync() {
		fn assert_send_sync<S: Send + Sync>() {}
		assert_send_sync::<Matrix<f64>>();
	}
}
