use std::array;
use std::marker::PhantomData;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{ConfigError, KernelConfig, KernelError, Point, PointFormula, Real, UpdateMode};
use crate::field::{FieldMut, FieldRef};
use crate::geometry::{IndexSpace, IndexWindow};

/// Specializes `formula` for precision `T` and dimension `N` under `config`.
///
/// All configuration errors are raised here, before a kernel exists. If the configuration
/// requests threads, a dedicated worker pool is built once and reused by every call.
pub fn specialize<T: Real, F: PointFormula<T, N>, const N: usize>(
    formula: F,
    config: &KernelConfig,
) -> Result<CompiledKernel<T, F, N>, ConfigError> {
    config.validate()?;

    if config.precision != T::PRECISION {
        return Err(ConfigError::PrecisionMismatch {
            expected: config.precision,
            found: T::PRECISION,
        });
    }

    if config.dimension != N {
        return Err(ConfigError::DimensionMismatch {
            kernel: F::NAME,
            expected: N,
            found: config.dimension,
        });
    }

    let extents = match &config.fixed_extents {
        Some(extents) => {
            let extents: [usize; N] = array::from_fn(|axis| extents[axis]);

            for axis in 0..N {
                if extents[axis] <= 2 * F::RADIUS {
                    return Err(ConfigError::ExtentTooSmall {
                        axis,
                        extent: extents[axis],
                        ghost: F::RADIUS,
                    });
                }
            }

            Some(extents)
        }
        None => None,
    };

    #[cfg(feature = "parallel")]
    let pool = match config.threads {
        Some(threads) => Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|index| format!("eulerian-sweep-{index}"))
                .build()
                .map_err(|err| ConfigError::ThreadPool(err.to_string()))?,
        ),
        None => None,
    };

    #[cfg(not(feature = "parallel"))]
    if let Some(threads) = config.threads {
        log::warn!(
            "Kernel {} requested {threads} threads, but parallel sweeps are disabled. Running serially.",
            F::NAME
        );
    }

    log::debug!(
        "Specialized kernel {} (precision: {}, dimension: {}, extents: {:?}, threads: {:?})",
        F::NAME,
        config.precision,
        N,
        extents,
        config.threads
    );

    Ok(CompiledKernel {
        formula,
        config: config.clone(),
        extents,
        #[cfg(feature = "parallel")]
        pool,
        _marker: PhantomData,
    })
}

/// A point formula bound to a precision, dimension and configuration.
///
/// Each call sweeps the formula over the interior of the bound fields (every cell at least
/// `F::RADIUS` away from each face) in row-major order, and blocks until the sweep is
/// complete. Ghost cells are never written. The caller must not let another call write an
/// array this call reads or writes.
pub struct CompiledKernel<T, F, const N: usize> {
    formula: F,
    config: KernelConfig,
    extents: Option<[usize; N]>,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Real, F: PointFormula<T, N>, const N: usize> CompiledKernel<T, F, N> {
    pub fn name(&self) -> &'static str {
        F::NAME
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn formula(&self) -> &F {
        &self.formula
    }

    pub fn mode(&self) -> UpdateMode {
        F::MODE
    }

    /// Width of the border left untouched on every face.
    pub fn ghost(&self) -> usize {
        F::RADIUS
    }

    /// Extents baked into the kernel, if any.
    pub fn fixed_extents(&self) -> Option<[usize; N]> {
        self.extents
    }

    /// Invokes the kernel with fields and scalars bound by name.
    pub fn call(&self, bindings: Bindings<'_, T, N>) -> Result<(), KernelError> {
        let Bindings {
            output,
            inputs,
            scalars,
        } = bindings;

        for (i, (name, _)) in inputs.iter().enumerate() {
            if inputs[..i].iter().any(|(other, _)| other == name) {
                return Err(KernelError::DuplicateRole {
                    name: name.to_string(),
                });
            }
        }

        for (i, (name, _)) in scalars.iter().enumerate() {
            if scalars[..i].iter().any(|(other, _)| other == name) {
                return Err(KernelError::DuplicateRole {
                    name: name.to_string(),
                });
            }
        }

        let Some((output_name, output)) = output else {
            return Err(KernelError::UnboundRole {
                kernel: F::NAME,
                name: F::OUTPUT,
            });
        };

        if output_name != F::OUTPUT {
            return Err(self.unknown(output_name));
        }

        if let Some((name, _)) = inputs
            .iter()
            .find(|(name, _)| !F::INPUTS.iter().any(|role| role == name))
        {
            return Err(self.unknown(name));
        }

        if let Some((name, _)) = scalars
            .iter()
            .find(|(name, _)| !F::PARAMS.iter().any(|param| param == name))
        {
            return Err(self.unknown(name));
        }

        let inputs = F::INPUTS
            .iter()
            .map(|role| {
                inputs
                    .iter()
                    .find(|(name, _)| name == role)
                    .map(|(_, field)| *field)
                    .ok_or(KernelError::UnboundRole {
                        kernel: F::NAME,
                        name: *role,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let params = F::PARAMS
            .iter()
            .map(|param| {
                scalars
                    .iter()
                    .find(|(name, _)| name == param)
                    .map(|(_, value)| *value)
                    .ok_or(KernelError::UnboundRole {
                        kernel: F::NAME,
                        name: *param,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.sweep(output, &inputs, &params)
    }

    /// Invokes the kernel with inputs and parameters given in the order of
    /// `F::INPUTS` and `F::PARAMS`.
    pub fn sweep(
        &self,
        mut output: FieldMut<'_, T, N>,
        inputs: &[FieldRef<'_, T, N>],
        params: &[T],
    ) -> Result<(), KernelError> {
        if inputs.len() != F::INPUTS.len() {
            return Err(KernelError::ArityMismatch {
                kernel: F::NAME,
                kind: "input fields",
                expected: F::INPUTS.len(),
                found: inputs.len(),
            });
        }

        if params.len() != F::PARAMS.len() {
            return Err(KernelError::ArityMismatch {
                kernel: F::NAME,
                kind: "scalar parameters",
                expected: F::PARAMS.len(),
                found: params.len(),
            });
        }

        let shape = output.shape();

        if let Some(extents) = self.extents {
            if shape != extents {
                return Err(KernelError::ShapeMismatch {
                    role: F::OUTPUT.to_string(),
                    expected: extents.to_vec(),
                    found: shape.to_vec(),
                });
            }
        }

        for (role, input) in F::INPUTS.iter().zip(inputs) {
            if input.shape() != shape {
                return Err(KernelError::ShapeMismatch {
                    role: role.to_string(),
                    expected: shape.to_vec(),
                    found: input.shape().to_vec(),
                });
            }
        }

        let space = IndexSpace::new(shape);
        let window = space.interior_window(F::RADIUS);

        if window.is_empty() {
            return Err(KernelError::EmptyInterior {
                shape: shape.to_vec(),
                ghost: F::RADIUS,
            });
        }

        log::trace!(
            "Sweeping kernel {} over {} interior cells of {:?}",
            F::NAME,
            window.index_count(),
            shape
        );

        let inputs: Vec<&[T]> = inputs.iter().map(|input| input.storage()).collect();
        let output = output.storage_mut();

        #[cfg(feature = "parallel")]
        if let Some(pool) = &self.pool {
            pool.install(|| self.sweep_parallel(output, &inputs, params, space, window));
            return Ok(());
        }

        self.sweep_serial(output, &inputs, params, space, window);

        Ok(())
    }

    fn sweep_serial(
        &self,
        output: &mut [T],
        inputs: &[&[T]],
        params: &[T],
        space: IndexSpace<N>,
        window: IndexWindow<N>,
    ) {
        for index in window {
            let linear = space.linear_from_cartesian(index);
            self.update(&mut output[linear], index, space, inputs, params);
        }
    }

    /// Fork-join sweep over slabs of constant index along the slowest axis. Each slab is
    /// swept in row-major order and written by exactly one worker.
    #[cfg(feature = "parallel")]
    fn sweep_parallel(
        &self,
        output: &mut [T],
        inputs: &[&[T]],
        params: &[T],
        space: IndexSpace<N>,
        window: IndexWindow<N>,
    ) {
        let slab = space.strides()[0];

        output
            .par_chunks_mut(slab)
            .enumerate()
            .skip(window.origin[0])
            .take(window.size[0])
            .for_each(|(intercept, chunk)| {
                let base = intercept * slab;

                for index in window.slab(0, intercept).iter() {
                    let linear = space.linear_from_cartesian(index) - base;
                    self.update(&mut chunk[linear], index, space, inputs, params);
                }
            });
    }

    #[inline]
    fn update(
        &self,
        cell: &mut T,
        index: [usize; N],
        space: IndexSpace<N>,
        inputs: &[&[T]],
        params: &[T],
    ) {
        let point = Point {
            index,
            space,
            inputs,
            params,
        };

        let value = self.formula.evaluate(&point);

        match F::MODE {
            UpdateMode::Accumulate => *cell = *cell + value,
            UpdateMode::Assign => *cell = value,
        }
    }

    fn unknown(&self, name: &str) -> KernelError {
        KernelError::UnknownRole {
            kernel: F::NAME,
            name: name.to_string(),
        }
    }
}

/// Keyword-style binding of fields and scalars to the roles of a kernel.
///
/// ```ignore
/// kernel.call(
///     Bindings::new()
///         .output("vorticity", vorticity.view_mut())
///         .input("forcing_x", forcing_x)
///         .input("forcing_y", forcing_y)
///         .scalar("prefactor", 0.5),
/// )?;
/// ```
pub struct Bindings<'a, T, const N: usize> {
    output: Option<(&'a str, FieldMut<'a, T, N>)>,
    inputs: Vec<(&'a str, FieldRef<'a, T, N>)>,
    scalars: Vec<(&'a str, T)>,
}

impl<'a, T, const N: usize> Bindings<'a, T, N> {
    pub fn new() -> Self {
        Self {
            output: None,
            inputs: Vec::new(),
            scalars: Vec::new(),
        }
    }

    /// Binds the field written by the kernel. Rebinding replaces the previous output.
    pub fn output(mut self, name: &'a str, field: FieldMut<'a, T, N>) -> Self {
        self.output = Some((name, field));
        self
    }

    pub fn input(mut self, name: &'a str, field: FieldRef<'a, T, N>) -> Self {
        self.inputs.push((name, field));
        self
    }

    pub fn scalar(mut self, name: &'a str, value: T) -> Self {
        self.scalars.push((name, value));
        self
    }
}

impl<T, const N: usize> Default for Bindings<'_, T, N> {
    fn default() -> Self {
        Self::new()
    }
}
