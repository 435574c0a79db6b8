// Copyright 2025 Irreducible Inc.

use std::mem::size_of;

/// Number of elements of a `rows x cols` array of `T`.
///
/// Returns `None` when `rows * cols` overflows or when the allocation would exceed `isize::MAX`
/// bytes, the largest size the allocator accepts.
pub const fn checked_area<T>(rows: usize, cols: usize) -> Option<usize> {
	let Some(len) = rows.checked_mul(cols) else {
		return None;
	};
	let elem_size = if size_of::<T>() == 0 {
		1
	} else {
		size_of::<T>()
	};
	match len.checked_mul(elem_size) {
		Some(bytes) if bytes <= isize::MAX as usize => Some(len),
		_ => None,
	}
}

/// Sum of two extents, `None` on overflow.
pub const fn checked_extent(a: usize, b: usize) -> Option<usize> {
	a.checked_add(b)
}
