//! Vorticity updates on 2D grids from velocity-like vector fields.
//!
//! Both kernels accumulate `prefactor * curl(..)` into the vorticity field using
//! second-order central differences. The prefactor carries the grid spacing
//! factored out of the differences, along with any other multiplier.

use crate::field::{FieldMut, VectorFieldRef};
use crate::kernel::{
    specialize, Bindings, CompiledKernel, ConfigError, KernelConfig, KernelError, Point,
    PointFormula, Real, UpdateMode,
};

/// `vorticity += prefactor * curl(forcing)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct VelocityForcingCurl;

impl VelocityForcingCurl {
    const FORCING_X: usize = 0;
    const FORCING_Y: usize = 1;
}

impl<T: Real> PointFormula<T, 2> for VelocityForcingCurl {
    const NAME: &'static str = "update_vorticity_from_velocity_forcing_2d";
    const OUTPUT: &'static str = "vorticity";
    const INPUTS: &'static [&'static str] = &["forcing_x", "forcing_y"];
    const PARAMS: &'static [&'static str] = &["prefactor"];
    const MODE: UpdateMode = UpdateMode::Accumulate;
    const RADIUS: usize = 1;

    #[inline]
    fn evaluate(&self, point: &Point<'_, T, 2>) -> T {
        (point.read(Self::FORCING_Y, [0, 1]) - point.read(Self::FORCING_Y, [0, -1])
            - point.read(Self::FORCING_X, [1, 0])
            + point.read(Self::FORCING_X, [-1, 0]))
            * point.param(0)
    }
}

/// `vorticity += prefactor * curl(penalized - velocity)`, with the difference fused
/// into the stencil so no temporary difference field is materialized.
#[derive(Clone, Copy, Debug, Default)]
pub struct PenalizedVelocityCurl;

impl PenalizedVelocityCurl {
    const PENALIZED_X: usize = 0;
    const PENALIZED_Y: usize = 1;
    const VELOCITY_X: usize = 2;
    const VELOCITY_Y: usize = 3;
}

impl<T: Real> PointFormula<T, 2> for PenalizedVelocityCurl {
    const NAME: &'static str = "update_vorticity_from_penalized_velocity_2d";
    const OUTPUT: &'static str = "vorticity";
    const INPUTS: &'static [&'static str] =
        &["penalized_x", "penalized_y", "velocity_x", "velocity_y"];
    const PARAMS: &'static [&'static str] = &["prefactor"];
    const MODE: UpdateMode = UpdateMode::Accumulate;
    const RADIUS: usize = 1;

    #[inline]
    fn evaluate(&self, point: &Point<'_, T, 2>) -> T {
        (point.read(Self::PENALIZED_Y, [0, 1]) - point.read(Self::VELOCITY_Y, [0, 1])
            - point.read(Self::PENALIZED_Y, [0, -1])
            + point.read(Self::VELOCITY_Y, [0, -1])
            - point.read(Self::PENALIZED_X, [1, 0])
            + point.read(Self::VELOCITY_X, [1, 0])
            + point.read(Self::PENALIZED_X, [-1, 0])
            - point.read(Self::VELOCITY_X, [-1, 0]))
            * point.param(0)
    }
}

/// Updates vorticity from a velocity forcing field.
pub struct UpdateVorticityFromVelocityForcing2d<T: Real> {
    kernel: CompiledKernel<T, VelocityForcingCurl, 2>,
}

impl<T: Real> UpdateVorticityFromVelocityForcing2d<T> {
    /// Builds the kernel. `config` must be 2D and match the precision of `T`.
    pub fn generate(config: &KernelConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            kernel: specialize(VelocityForcingCurl, config)?,
        })
    }

    /// `vorticity += prefactor * curl(forcing)` over the interior of the grid. `forcing`
    /// is a component-major `(2, n, m)` field; a one cell ghost border is left untouched.
    pub fn apply(
        &self,
        vorticity: FieldMut<'_, T, 2>,
        forcing: VectorFieldRef<'_, T, 2>,
        prefactor: T,
    ) -> Result<(), KernelError> {
        let [forcing_x, forcing_y] = forcing.split();

        self.kernel.call(
            Bindings::new()
                .output("vorticity", vorticity)
                .input("forcing_x", forcing_x)
                .input("forcing_y", forcing_y)
                .scalar("prefactor", prefactor),
        )
    }

    pub fn kernel(&self) -> &CompiledKernel<T, VelocityForcingCurl, 2> {
        &self.kernel
    }
}

/// Updates vorticity from the difference between a penalized and an unpenalized velocity field.
pub struct UpdateVorticityFromPenalizedVelocity2d<T: Real> {
    kernel: CompiledKernel<T, PenalizedVelocityCurl, 2>,
}

impl<T: Real> UpdateVorticityFromPenalizedVelocity2d<T> {
    /// Builds the kernel. `config` must be 2D and match the precision of `T`.
    pub fn generate(config: &KernelConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            kernel: specialize(PenalizedVelocityCurl, config)?,
        })
    }

    /// `vorticity += prefactor * curl(penalized_velocity - velocity)` over the interior
    /// of the grid. Both velocities are component-major `(2, n, m)` fields.
    pub fn apply(
        &self,
        vorticity: FieldMut<'_, T, 2>,
        penalized_velocity: VectorFieldRef<'_, T, 2>,
        velocity: VectorFieldRef<'_, T, 2>,
        prefactor: T,
    ) -> Result<(), KernelError> {
        let [penalized_x, penalized_y] = penalized_velocity.split();
        let [velocity_x, velocity_y] = velocity.split();

        self.kernel.call(
            Bindings::new()
                .output("vorticity", vorticity)
                .input("penalized_x", penalized_x)
                .input("penalized_y", penalized_y)
                .input("velocity_x", velocity_x)
                .input("velocity_y", velocity_y)
                .scalar("prefactor", prefactor),
        )
    }

    pub fn kernel(&self) -> &CompiledKernel<T, PenalizedVelocityCurl, 2> {
        &self.kernel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, VectorField};
    use crate::kernel::Precision;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use reborrow::ReborrowMut;

    fn random_vector<T: Real>(rng: &mut StdRng, shape: [usize; 2]) -> VectorField<T, 2> {
        VectorField::from_fn(shape, |_, _| T::from(rng.random_range(-1.0f64..1.0)).unwrap())
    }

    fn random_scalar<T: Real>(rng: &mut StdRng, shape: [usize; 2]) -> Field<T, 2> {
        Field::from_fn(shape, |_| T::from(rng.random_range(-1.0f64..1.0)).unwrap())
    }

    /// Central difference curl, evaluated in double precision.
    fn reference_curl<T: Real>(field: &VectorField<T, 2>, [i, j]: [usize; 2]) -> f64 {
        let x = |index| field.component(0).get(index).to_f64().unwrap();
        let y = |index| field.component(1).get(index).to_f64().unwrap();

        (y([i, j + 1]) - y([i, j - 1])) - (x([i + 1, j]) - x([i - 1, j]))
    }

    fn is_interior([i, j]: [usize; 2], [n, m]: [usize; 2]) -> bool {
        i >= 1 && j >= 1 && i + 1 < n && j + 1 < m
    }

    #[test]
    fn single_forcing_cell() {
        let config = KernelConfig::new(Precision::Double, 2);
        let kernel = UpdateVorticityFromVelocityForcing2d::<f64>::generate(&config).unwrap();

        let mut vorticity = Field::<f64, 2>::zeros([3, 3]);
        let mut forcing = VectorField::<f64, 2>::zeros([3, 3]);
        *forcing.component_mut(1).get_mut([1, 2]) = 1.0;

        kernel
            .apply(vorticity.view_mut(), forcing.view(), 2.0)
            .unwrap();

        assert_eq!(vorticity[[1, 1]], 2.0);
    }

    fn curl_matches_reference<T: Real>(tolerance: f64) {
        let mut rng = StdRng::seed_from_u64(42);
        let shape = [17, 12];

        let config = KernelConfig::for_real::<T>(2);
        let kernel = UpdateVorticityFromVelocityForcing2d::<T>::generate(&config).unwrap();

        let forcing = random_vector::<T>(&mut rng, shape);
        let before = random_scalar::<T>(&mut rng, shape);
        let prefactor = 0.75;

        let mut vorticity = before.clone();
        kernel
            .apply(vorticity.view_mut(), forcing.view(), T::from(prefactor).unwrap())
            .unwrap();

        for index in vorticity.space().iter() {
            let initial = before[index].to_f64().unwrap();
            let result = vorticity[index].to_f64().unwrap();

            if is_interior(index, shape) {
                let expected = initial + prefactor * reference_curl(&forcing, index);
                assert!(
                    (result - expected).abs() <= tolerance * (1.0 + expected.abs()),
                    "cell {index:?}: {result} != {expected}"
                );
            } else {
                assert_eq!(result, initial, "ghost cell {index:?} was written");
            }
        }
    }

    #[test]
    fn curl_correctness() {
        curl_matches_reference::<f32>(1e-6);
        curl_matches_reference::<f64>(1e-12);
    }

    fn fused_matches_separate<T: Real>(tolerance: f64) {
        let mut rng = StdRng::seed_from_u64(7);
        let shape = [14, 19];

        let config = KernelConfig::for_real::<T>(2).with_fixed_extents(shape);
        let forcing_kernel = UpdateVorticityFromVelocityForcing2d::<T>::generate(&config).unwrap();
        let penalized_kernel =
            UpdateVorticityFromPenalizedVelocity2d::<T>::generate(&config).unwrap();

        let penalized = random_vector::<T>(&mut rng, shape);
        let velocity = random_vector::<T>(&mut rng, shape);
        let before = random_scalar::<T>(&mut rng, shape);
        let prefactor = T::from(-1.3).unwrap();

        let difference = VectorField::from_fn(shape, |c, index| {
            *penalized.component(c).get(index) - *velocity.component(c).get(index)
        });

        let mut fused = before.clone();
        penalized_kernel
            .apply(fused.view_mut(), penalized.view(), velocity.view(), prefactor)
            .unwrap();

        let mut separate = before.clone();
        forcing_kernel
            .apply(separate.view_mut(), difference.view(), prefactor)
            .unwrap();

        for index in fused.space() {
            let a = fused[index].to_f64().unwrap();
            let b = separate[index].to_f64().unwrap();
            assert!((a - b).abs() <= tolerance * (1.0 + b.abs()), "cell {index:?}: {a} != {b}");
        }
    }

    #[test]
    fn fused_matches_difference_field() {
        fused_matches_separate::<f32>(5e-5);
        fused_matches_separate::<f64>(1e-12);
    }

    #[test]
    fn repeated_calls_accumulate() {
        let mut rng = StdRng::seed_from_u64(3);
        let shape = [9, 9];

        let config = KernelConfig::for_real::<f64>(2).with_threads(2);
        let forcing_kernel = UpdateVorticityFromVelocityForcing2d::<f64>::generate(&config).unwrap();
        let penalized_kernel =
            UpdateVorticityFromPenalizedVelocity2d::<f64>::generate(&config).unwrap();

        let forcing = random_vector::<f64>(&mut rng, shape);
        let velocity = random_vector::<f64>(&mut rng, shape);
        let before = random_scalar::<f64>(&mut rng, shape);

        let mut once = before.clone();
        forcing_kernel
            .apply(once.view_mut(), forcing.view(), 0.5)
            .unwrap();

        let mut twice = before.clone();
        let mut view = twice.view_mut();
        forcing_kernel
            .apply(view.rb_mut(), forcing.view(), 0.5)
            .unwrap();
        forcing_kernel
            .apply(view.rb_mut(), forcing.view(), 0.5)
            .unwrap();

        for index in before.space().iter() {
            let delta = once[index] - before[index];
            let expected = before[index] + 2.0 * delta;
            assert!((twice[index] - expected).abs() <= 1e-12, "cell {index:?}");
        }

        let mut penalized_once = before.clone();
        penalized_kernel
            .apply(penalized_once.view_mut(), forcing.view(), velocity.view(), 1.0)
            .unwrap();

        let mut penalized_twice = before.clone();
        for _ in 0..2 {
            penalized_kernel
                .apply(penalized_twice.view_mut(), forcing.view(), velocity.view(), 1.0)
                .unwrap();
        }

        for index in before.space().iter() {
            let delta = penalized_once[index] - before[index];
            let expected = before[index] + 2.0 * delta;
            assert!((penalized_twice[index] - expected).abs() <= 1e-12, "cell {index:?}");
        }
    }

    #[test]
    fn mismatched_fields_are_rejected() {
        let config = KernelConfig::for_real::<f32>(2);
        let kernel = UpdateVorticityFromPenalizedVelocity2d::<f32>::generate(&config).unwrap();

        let mut vorticity = Field::<f32, 2>::zeros([6, 6]);
        let penalized = VectorField::<f32, 2>::zeros([6, 6]);
        let velocity = VectorField::<f32, 2>::zeros([6, 5]);

        let result = kernel.apply(vorticity.view_mut(), penalized.view(), velocity.view(), 1.0);
        assert_eq!(
            result,
            Err(KernelError::ShapeMismatch {
                role: "velocity_x".to_string(),
                expected: vec![6, 6],
                found: vec![6, 5],
            })
        );

        assert!(
            UpdateVorticityFromVelocityForcing2d::<f32>::generate(&KernelConfig::for_real::<f64>(2))
                .is_err()
        );
        assert!(
            UpdateVorticityFromVelocityForcing2d::<f64>::generate(&KernelConfig::for_real::<f64>(3))
                .is_err()
        );
    }
}
