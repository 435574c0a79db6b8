// Copyright 2025 Irreducible Inc.

use std::{fmt, io};

use itertools::Itertools;

use crate::{buffer::DenseBuffer, scalar::Scalar};

/// Separator between two rendered elements of a row.
const ELEMENT_SEPARATOR: &str = "  ";

impl<T: Scalar> DenseBuffer<T> {
	/// Writes one `"<prefix>[v1  v2  ...]"` line per row, each value rendered by `to_string`.
	pub fn print<W, F>(&self, out: &mut W, to_string: F, prefix: &str) -> io::Result<()>
	where
		W: io::Write + ?Sized,
		F: Fn(&T) -> String,
	{
		for i in 0..self.rows() {
			let row = self.row(i).iter().map(&to_string).join(ELEMENT_SEPARATOR);
			writeln!(out, "{prefix}[{row}]")?;
		}
		Ok(())
	}
}

impl<T: Scalar + fmt::Display> fmt::Display for DenseBuffer<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for i in 0..self.rows() {
			writeln!(f, "[{}]", self.row(i).iter().join(ELEMENT_SEPARATOR))?;
		}
		Ok(())
	}
}
