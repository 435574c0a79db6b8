// Copyright 2025 Irreducible Inc.

//! Dense numeric matrices with copy-on-write value semantics.
//!
//! The crate is split in two layers:
//!
//! * [`DenseBuffer`], the kernel: an exclusively owned `rows x cols` row-major array with the
//!   numeric operations (element-wise arithmetic, products, transpose, determinant, Gauss-Jordan
//!   division, Moore-Penrose pseudo-inverse, induced norms, block cut and merge).
//! * [`Matrix`], the handle: an optional reference-counted kernel. Cloning a handle shares the
//!   buffer; every mutation first detaches it, so handles behave like values.
//!
//! Precondition failures (shape mismatches, empty or null operands, singular divisors, sizes
//! beyond the addressable range) are reported as [`Error`] values.

mod block;
mod buffer;
mod elimination;
mod error;
mod matrix;
mod norm;
mod print;
mod product;
mod pseudo_inverse;
mod scalar;

pub use buffer::*;
pub use error::*;
pub use matrix::*;
pub use pseudo_inverse::RankReport;
pub use scalar::*;
