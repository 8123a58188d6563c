//! Finite-difference kernels for Eulerian grid operators of vortex-method and
//! immersed-boundary flow solvers.
//!
//! A point-local update rule is written once as a [`kernel::PointFormula`] and
//! specialized per floating precision, grid dimension, optional fixed extents
//! and thread parallelism into a [`kernel::CompiledKernel`] that sweeps whole
//! fields. The [`ops`] module builds the physics kernels on top of it.

#![allow(clippy::needless_range_loop)]

pub mod field;
pub mod geometry;
pub mod kernel;
pub mod ops;

/// Provides common types used by most applications of the kernels.
pub mod prelude {
    pub use crate::field::{Field, FieldMut, FieldRef, VectorField, VectorFieldMut, VectorFieldRef};
    pub use crate::geometry::IndexSpace;
    pub use crate::kernel::{
        ConfigError, KernelConfig, KernelError, Precision, Real, UpdateMode,
    };
    pub use crate::ops::{
        CharFuncFromLevelSet2d, CharFuncFromLevelSet3d, UpdateVorticityFromPenalizedVelocity2d,
        UpdateVorticityFromVelocityForcing2d,
    };
    pub use reborrow::{Reborrow, ReborrowMut};
}
