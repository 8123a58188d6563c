//! Cartesian index spaces for uniform grids (linear/cartesian conversions, windows, iteration).

#![allow(clippy::needless_range_loop)]

mod index;

pub use index::{CartesianIter, CartesianWindowIter, IndexSpace, IndexWindow};
