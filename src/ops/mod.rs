//! Physics kernels built on the stencil specializer.
//!
//! Each generator is specialized once per configuration (typically at solver setup)
//! and then applied to live fields every time step.

mod char_func;
mod vorticity;

pub use char_func::{CharFuncFromLevelSet, CharFuncFromLevelSet2d, CharFuncFromLevelSet3d, SineHeaviside};
pub use vorticity::{
    PenalizedVelocityCurl, UpdateVorticityFromPenalizedVelocity2d,
    UpdateVorticityFromVelocityForcing2d, VelocityForcingCurl,
};
