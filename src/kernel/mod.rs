//! Specialization of point-local stencil formulas into sweeps over whole grid fields.
//!
//! A formula is described once, as a type implementing [`PointFormula`], and
//! [`specialize`] monomorphises it for a floating precision `T` and grid
//! dimension `N`, binding the result to a [`KernelConfig`] (fixed extents,
//! thread parallelism). The returned [`CompiledKernel`] is then invoked once
//! per time step with live field arrays.

#![allow(clippy::needless_range_loop)]

mod config;
mod error;
mod sweep;

pub use config::KernelConfig;
pub use error::{ConfigError, KernelError};
pub use sweep::{specialize, Bindings, CompiledKernel};

use crate::geometry::IndexSpace;
use num::traits::FloatConst;
use num::Float;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

// *****************************
// Precision *******************
// *****************************

/// Floating precision a kernel is specialized for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[serde(alias = "f32", alias = "float32")]
    Single,
    #[serde(alias = "f64", alias = "float64")]
    Double,
}

impl Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => f.write_str("single"),
            Precision::Double => f.write_str("double"),
        }
    }
}

impl FromStr for Precision {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" | "f32" | "float32" => Ok(Precision::Single),
            "double" | "f64" | "float64" => Ok(Precision::Double),
            other => Err(ConfigError::UnsupportedPrecision(other.to_string())),
        }
    }
}

/// A floating point scalar a kernel can be specialized for.
pub trait Real: Float + FloatConst + Debug + Default + Send + Sync + 'static {
    const PRECISION: Precision;
}

impl Real for f32 {
    const PRECISION: Precision = Precision::Single;
}

impl Real for f64 {
    const PRECISION: Precision = Precision::Double;
}

// *****************************
// Formulas ********************
// *****************************

/// Whether a kernel adds its formula to the output cell or overwrites it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    /// `output[cell] += formula`. Repeated calls compound.
    Accumulate,
    /// `output[cell] = formula`. Repeated calls are idempotent.
    Assign,
}

/// Position of a neighbour relative to the cell being updated.
pub type Offset<const N: usize> = [isize; N];

/// A point-update rule over named field roles and free scalar parameters.
///
/// Roles and parameters are addressed inside [`evaluate`](Self::evaluate) by their
/// position in [`INPUTS`](Self::INPUTS) and [`PARAMS`](Self::PARAMS).
pub trait PointFormula<T: Real, const N: usize>: Send + Sync {
    /// Name used in logs and errors.
    const NAME: &'static str;
    /// Role of the field written by the kernel.
    const OUTPUT: &'static str;
    /// Roles of the fields read by the kernel.
    const INPUTS: &'static [&'static str];
    /// Free scalar parameters supplied per call.
    const PARAMS: &'static [&'static str];
    const MODE: UpdateMode;
    /// Largest offset component read by the formula. Also the ghost width the
    /// kernel leaves untouched on every face.
    const RADIUS: usize;

    /// Computes the formula at a single interior cell.
    fn evaluate(&self, point: &Point<'_, T, N>) -> T;
}

/// Read access to the neighbourhood of the cell currently being updated.
pub struct Point<'a, T, const N: usize> {
    pub(crate) index: [usize; N],
    pub(crate) space: IndexSpace<N>,
    pub(crate) inputs: &'a [&'a [T]],
    pub(crate) params: &'a [T],
}

impl<T: Copy, const N: usize> Point<'_, T, N> {
    /// Cartesian index of the cell being updated.
    pub fn index(&self) -> [usize; N] {
        self.index
    }

    /// Reads input `role` at `offset` from the current cell.
    ///
    /// # Panics
    ///
    /// Panics if the neighbour lies outside the grid along any axis, which can only happen
    /// when a formula reads further than its declared `RADIUS`.
    #[inline]
    pub fn read(&self, role: usize, offset: Offset<N>) -> T {
        let size = self.space.size();
        let mut cell = self.index;

        for axis in 0..N {
            cell[axis] = match cell[axis].checked_add_signed(offset[axis]) {
                Some(coord) if coord < size[axis] => coord,
                _ => panic!(
                    "offset {offset:?} from cell {:?} leaves grid of shape {size:?}",
                    self.index
                ),
            };
        }

        self.inputs[role][self.space.linear_from_cartesian(cell)]
    }

    /// Reads input `role` at the current cell.
    #[inline]
    pub fn center(&self, role: usize) -> T {
        self.inputs[role][self.space.linear_from_cartesian(self.index)]
    }

    /// Value of the free scalar parameter at position `param`.
    #[inline]
    pub fn param(&self, param: usize) -> T {
        self.params[param]
    }
}
