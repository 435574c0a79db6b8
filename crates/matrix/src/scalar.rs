// Copyright 2025 Irreducible Inc.

use std::fmt::Debug;

use bytemuck::Pod;
use num_traits::{Float, NumAssign, Signed};

/// Element type of a dense matrix.
///
/// Signed arithmetic supplies the ring operations together with `abs`, the ordering drives pivot
/// selection and `Pod` allows zero-filled allocation and bytewise comparison. Division is only
/// exact for field-like types, so the elimination kernels require [`RealScalar`].
pub trait Scalar: Signed + NumAssign + PartialOrd + Pod + Debug + Send + Sync {
	/// Magnitude used for pivot selection and norms.
	#[inline]
	fn magnitude(self) -> Self {
		Signed::abs(&self)
	}
}

impl<T> Scalar for T where T: Signed + NumAssign + PartialOrd + Pod + Debug + Send + Sync {}

/// Scalar with real division, required by the elimination kernels (determinant, division,
/// inverse, rank and pseudo-inverse). Truncating integer division would silently corrupt them.
pub trait RealScalar: Scalar + Float {}

impl<T> RealScalar for T where T: Scalar + Float {}
