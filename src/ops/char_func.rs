//! Characteristic functions from level set fields.

use crate::field::{FieldMut, FieldRef};
use crate::kernel::{
    specialize, Bindings, CompiledKernel, ConfigError, KernelConfig, KernelError, Point,
    PointFormula, Real, UpdateMode,
};

/// Smoothed Heaviside of a level set, blended by a sine over `[-blend_width, blend_width]`.
///
/// Evaluates to 1 above the band, 0 below it, and inside it to
/// `0.5 * (1 + s / w + sin(pi * s / w) / pi)`, which matches both outer branches in
/// value and first derivative at the band edges.
#[derive(Clone, Copy, Debug)]
pub struct SineHeaviside<T> {
    blend_width: T,
}

impl<T: Real> SineHeaviside<T> {
    pub fn new(blend_width: T) -> Result<Self, ConfigError> {
        if !blend_width.is_finite() || blend_width <= T::zero() {
            return Err(ConfigError::InvalidBlendWidth(format!("{blend_width:?}")));
        }

        Ok(Self { blend_width })
    }

    pub fn blend_width(&self) -> T {
        self.blend_width
    }

    /// Smoothed Heaviside of a single level set value.
    #[inline]
    pub fn heaviside(&self, level_set: T) -> T {
        let outer = if level_set > self.blend_width {
            T::one()
        } else {
            T::zero()
        };

        let blend = if level_set.abs() > self.blend_width {
            T::zero()
        } else {
            self.blend(level_set)
        };

        outer + blend
    }

    /// Blended branch. The upper half of the band is mirrored onto the lower half
    /// (`H(s) = 1 - H(-s)`), so the sine phase stays within `[0, pi]`
    /// and the branch hits exactly 0 and 1 at the band edges.
    #[inline]
    fn blend(&self, level_set: T) -> T {
        if level_set > T::zero() {
            T::one() - self.lower_blend(-level_set)
        } else {
            self.lower_blend(level_set)
        }
    }

    /// Blended branch for `-w <= s <= 0`, with the sine phase measured from the lower
    /// band edge: `y = 1 + s / w` and `sin(pi * (y - 1)) = -sin(pi * y)`.
    #[inline]
    fn lower_blend(&self, level_set: T) -> T {
        let half = (T::one() + T::one()).recip();
        let y = T::one() + level_set / self.blend_width;
        let value = half * (y - (T::PI() * y).sin() / T::PI());

        // Comparisons keep a NaN level set as NaN, unlike `Float::max`.
        if value > half {
            half
        } else if value < T::zero() {
            T::zero()
        } else {
            value
        }
    }
}

impl<T: Real, const N: usize> PointFormula<T, N> for SineHeaviside<T> {
    const NAME: &'static str = "char_func_from_level_set_via_sine_heaviside";
    const OUTPUT: &'static str = "char_func";
    const INPUTS: &'static [&'static str] = &["level_set"];
    const PARAMS: &'static [&'static str] = &[];
    const MODE: UpdateMode = UpdateMode::Assign;
    const RADIUS: usize = 0;

    #[inline]
    fn evaluate(&self, point: &Point<'_, T, N>) -> T {
        self.heaviside(point.center(0))
    }
}

/// Computes a characteristic function field from a level set field. The blend width is
/// baked into the kernel at generation time.
pub struct CharFuncFromLevelSet<T: Real, const N: usize> {
    kernel: CompiledKernel<T, SineHeaviside<T>, N>,
}

/// The 3D characteristic function kernel.
pub type CharFuncFromLevelSet3d<T> = CharFuncFromLevelSet<T, 3>;
/// The 2D characteristic function kernel.
pub type CharFuncFromLevelSet2d<T> = CharFuncFromLevelSet<T, 2>;

impl<T: Real, const N: usize> CharFuncFromLevelSet<T, N> {
    /// Builds the kernel. `config` must be `N`-dimensional, match the precision of `T`, and
    /// `blend_width` must be finite and positive.
    pub fn generate(config: &KernelConfig, blend_width: T) -> Result<Self, ConfigError> {
        let formula = SineHeaviside::new(blend_width)?;

        Ok(Self {
            kernel: specialize(formula, config)?,
        })
    }

    /// Overwrites every cell of `char_func` with the smoothed Heaviside of `level_set`.
    /// Prior contents of `char_func` are irrelevant; repeated calls are idempotent.
    pub fn apply(
        &self,
        char_func: FieldMut<'_, T, N>,
        level_set: FieldRef<'_, T, N>,
    ) -> Result<(), KernelError> {
        self.kernel.call(
            Bindings::new()
                .output("char_func", char_func)
                .input("level_set", level_set),
        )
    }

    pub fn blend_width(&self) -> T {
        self.kernel.formula().blend_width()
    }

    pub fn kernel(&self) -> &CompiledKernel<T, SineHeaviside<T>, N> {
        &self.kernel
    }
}
