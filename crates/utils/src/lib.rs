// Copyright 2025 Irreducible Inc.

//! Support code shared by the lamina crates: error macros, overflow-checked size arithmetic,
//! environment flags, thread-pool setup and tracing initialization.

pub mod checked_arithmetics;
pub mod env;
pub mod error_utils;
pub mod rayon;
pub mod tracing;
