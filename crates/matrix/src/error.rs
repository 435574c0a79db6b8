// Copyright 2025 Irreducible Inc.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("matrix shape {rows}x{cols} has no elements")]
	EmptyShape { rows: usize, cols: usize },
	#[error("a {rows}x{cols} matrix exceeds the addressable size")]
	SizeOverflow { rows: usize, cols: usize },
	#[error("argument {arg} does not have expected length {expected}")]
	IncorrectArgumentLength { arg: String, expected: usize },
	#[error("{op}: operand shapes {lhs:?} and {rhs:?} are incompatible")]
	ShapeMismatch {
		op: &'static str,
		lhs: (usize, usize),
		rhs: (usize, usize),
	},
	#[error("the matrix is not square")]
	MatrixNotSquare,
	#[error("the matrix is singular")]
	MatrixIsSingular,
	#[error("index ({row}, {col}) is out of bounds for a {rows}x{cols} matrix")]
	IndexOutOfBounds {
		row: usize,
		col: usize,
		rows: usize,
		cols: usize,
	},
	#[error("the matrix is null")]
	NullMatrix,
	#[error("range {start}..={end} does not fit an extent of {len}")]
	InvalidRange { start: usize, end: usize, len: usize },
}
