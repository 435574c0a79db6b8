// Copyright 2025 Irreducible Inc.

use lamina_utils::{checked_arithmetics::checked_extent, ensure};

use crate::{buffer::DenseBuffer, error::Error, scalar::Scalar};

impl<T: Scalar> DenseBuffer<T> {
	/// Copies up to `sm x sn` elements of `src`, starting at `(si, sj)`, into `self` at `(di, dj)`.
	///
	/// A negative destination offset drops the leading source rows/columns that would land
	/// outside `self`. The region is then clipped to both buffers; an empty region copies nothing.
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
	) {
		let (di, si, sm) = absorb_negative_offset(di, si, sm);
		let (dj, sj, sn) = absorb_negative_offset(dj, sj, sn);

		let sm = sm
			.min(src.rows().saturating_sub(si))
			.min(self.rows().saturating_sub(di));
		let sn = sn
			.min(src.cols().saturating_sub(sj))
			.min(self.cols().saturating_sub(dj));
		if sm == 0 || sn == 0 {
			return;
		}

		for r in 0..sm {
			self.row_mut(di + r)[dj..dj + sn].copy_from_slice(&src.row(si + r)[sj..sj + sn]);
		}
	}

	/// Copies the overlapping top-left block of `src` into the top-left corner of `self`.
	pub fn cut_all(&mut self, src: &Self) {
		self.cut(src, 0, 0, 0, 0, usize::MAX, usize::MAX);
	}

	/// The `m x n` block whose top-left corner is `(i, j)`, in a new buffer.
	pub fn sub_matrix(&self, i: usize, j: usize, m: usize, n: usize) -> Result<Self, Error> {
		ensure!(
			checked_extent(i, m).is_some_and(|end| end <= self.rows()),
			Error::InvalidRange {
				start: i,
				end: i.saturating_add(m).saturating_sub(1),
				len: self.rows(),
			}
		);
		ensure!(
			checked_extent(j, n).is_some_and(|end| end <= self.cols()),
			Error::InvalidRange {
				start: j,
				end: j.saturating_add(n).saturating_sub(1),
				len: self.cols(),
			}
		);
		let mut out = Self::zeros(m, n)?;
		out.cut(self, 0, 0, i, j, m, n);
		Ok(out)
	}

	/// `[a | b]`: the columns of `b` appended to those of `a`.
	pub fn merge_h(a: &Self, b: &Self) -> Result<Self, Error> {
		ensure!(
			a.rows() == b.rows(),
			Error::ShapeMismatch {
				op: "merge_h",
				lhs: a.dim(),
				rhs: b.dim(),
			}
		);
		let cols = checked_extent(a.cols(), b.cols()).ok_or(Error::SizeOverflow {
			rows: a.rows(),
			cols: usize::MAX,
		})?;
		let mut out = Self::zeros(a.rows(), cols)?;
		out.cut(a, 0, 0, 0, 0, a.rows(), a.cols());
		out.cut(b, 0, a.cols() as isize, 0, 0, b.rows(), b.cols());
		Ok(out)
	}

	/// `a` stacked on top of `b`.
	pub fn merge_v(a: &Self, b: &Self) -> Result<Self, Error> {
		ensure!(
			a.cols() == b.cols(),
			Error::ShapeMismatch {
				op: "merge_v",
				lhs: a.dim(),
				rhs: b.dim(),
			}
		);
		let rows = checked_extent(a.rows(), b.rows()).ok_or(Error::SizeOverflow {
			rows: usize::MAX,
			cols: a.cols(),
		})?;
		let mut elements = Vec::with_capacity(a.elements().len() + b.elements().len());
		elements.extend_from_slice(a.elements());
		elements.extend_from_slice(b.elements());
		Self::from_vec(rows, a.cols(), elements)
	}
}

/// Turns a negative destination offset into a zero one by advancing the source offset and
/// shrinking the extent accordingly.
fn absorb_negative_offset(dst: isize, src: usize, extent: usize) -> (usize, usize, usize) {
	if dst >= 0 {
		return (dst as usize, src, extent);
	}
	let shift = dst.unsigned_abs();
	(0, src.saturating_add(shift), extent.saturating_sub(shift))
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use proptest::prelude::*;

	use super::*;

	fn counting(rows: usize, cols: usize) -> DenseBuffer<f64> {
		DenseBuffer::from_vec(rows, cols, (0..rows * cols).map(|x| x as f64 + 1.0).collect())
			.unwrap()
	}

	#[test]
	fn test_cut_negative_destination_row() {
		let src = counting(2, 2);
		let mut dst = DenseBuffer::<f64>::zeros(3, 3).unwrap();
		dst.cut(&src, -1, 0, 0, 0, usize::MAX, usize::MAX);
		assert_eq!(dst.elements(), &[3.0, 4.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
	}

	#[test]
	fn test_cut_negative_destination_col() {
		let src = counting(2, 3);
		let mut dst = DenseBuffer::<f64>::zeros(2, 2).unwrap();
		dst.cut(&src, 0, -2, 0, 0, 2, 3);
		assert_eq!(dst.elements(), &[3.0, 0.0, 6.0, 0.0]);
	}

	#[test]
	fn test_cut_clips_to_destination() {
		let src = counting(4, 4);
		let mut dst = DenseBuffer::<f64>::zeros(4, 4).unwrap();
		dst.cut(&src, 2, 2, 0, 0, 4, 4);
		assert_eq!(dst.row(2), &[0.0, 0.0, 1.0, 2.0]);
		assert_eq!(dst.row(3), &[0.0, 0.0, 5.0, 6.0]);
		assert!(dst.row(0).iter().chain(dst.row(1)).all(|&x| x == 0.0));
	}

	#[test]
	fn test_cut_layout() {
		// Tiles a 4x4 destination from a 2x4 and a 4x2 source.
		let wide = counting(2, 4);
		let tall = counting(4, 2);
		let mut dst = DenseBuffer::<f64>::zeros(4, 4).unwrap();
		dst.cut_all(&wide);
		dst.cut(&tall, 2, 0, 0, 0, 2, 2);
		dst.cut(&tall, 2, 2, 2, 0, usize::MAX, usize::MAX);
		assert_eq!(
			dst.elements(),
			&[
				1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 1.0, 2.0, 5.0, 6.0, 3.0, 4.0, 7.0, 8.0
			]
		);
	}

	#[test]
	fn test_cut_empty_region_is_noop() {
		let src = counting(2, 2);
		let mut dst = DenseBuffer::from_elem(2, 2, 9.0f64).unwrap();
		dst.cut(&src, -2, 0, 0, 0, usize::MAX, usize::MAX);
		dst.cut(&src, 0, 0, 2, 0, usize::MAX, usize::MAX);
		dst.cut(&src, 0, 5, 0, 0, usize::MAX, usize::MAX);
		dst.cut(&src, 0, 0, 0, 0, 0, 2);
		assert!(dst.elements().iter().all(|&x| x == 9.0));
	}

	#[test]
	fn test_sub_matrix() {
		let m = counting(3, 4);
		let block = m.sub_matrix(1, 2, 2, 2).unwrap();
		assert_eq!(block.elements(), &[7.0, 8.0, 11.0, 12.0]);
		assert_matches!(m.sub_matrix(2, 0, 2, 1), Err(Error::InvalidRange { len: 3, .. }));
		assert_matches!(m.sub_matrix(0, 0, 1, 0), Err(Error::EmptyShape { .. }));
		assert_matches!(m.sub_matrix(0, usize::MAX, 1, 2), Err(Error::InvalidRange { .. }));
	}

	#[test]
	fn test_merge() {
		let a = counting(2, 1);
		let b = counting(2, 2);
		let h = DenseBuffer::merge_h(&a, &b).unwrap();
		assert_eq!(h.elements(), &[1.0, 1.0, 2.0, 2.0, 3.0, 4.0]);
		assert_matches!(
			DenseBuffer::merge_v(&a, &b),
			Err(Error::ShapeMismatch { op: "merge_v", .. })
		);

		let v = DenseBuffer::merge_v(&b, &b).unwrap();
		assert_eq!(v.dim(), (4, 2));
		assert_eq!(v.elements(), &[1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0]);
		assert_matches!(
			DenseBuffer::merge_h(&a, &counting(3, 1)),
			Err(Error::ShapeMismatch { op: "merge_h", .. })
		);
	}

	proptest! {
		#[test]
		fn test_split_and_merge(rows in 1..7usize, cols in 2..7usize, split in 1..6usize) {
			let split = split.min(cols - 1);
			let m = counting(rows, cols);
			let left = m.sub_matrix(0, 0, rows, split).unwrap();
			let right = m.sub_matrix(0, split, rows, cols - split).unwrap();
			prop_assert_eq!(DenseBuffer::merge_h(&left, &right).unwrap(), m.clone());

			let t = m.transpose();
			let top = t.sub_matrix(0, 0, split, rows).unwrap();
			let bottom = t.sub_matrix(split, 0, cols - split, rows).unwrap();
			prop_assert_eq!(DenseBuffer::merge_v(&top, &bottom).unwrap(), t);
		}
	}
}
