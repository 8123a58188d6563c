//! Scalar and vector fields stored on uniform grids.
//!
//! Scalar fields of shape `(n1, .., nN)` are stored row-major. Vector fields
//! are stored component-major with shape `(N, n1, .., nN)`; see [`VectorField`].

use reborrow::{Reborrow, ReborrowMut};
use std::ops::{Index, IndexMut};

use crate::geometry::IndexSpace;
use crate::kernel::KernelError;

mod vector;

pub use vector::{VectorField, VectorFieldMut, VectorFieldRef};

/// Checks that `len` elements exactly fill a grid of the given shape.
fn check_storage(len: usize, shape: &[usize]) -> Result<(), KernelError> {
    if len != shape.iter().product::<usize>() {
        return Err(KernelError::StorageMismatch {
            len,
            shape: shape.to_vec(),
        });
    }

    Ok(())
}

/// An owned scalar field.
#[derive(Clone, Debug, PartialEq)]
pub struct Field<T, const N: usize> {
    data: Vec<T>,
    shape: [usize; N],
}

impl<T: Copy + Default, const N: usize> Field<T, N> {
    /// Allocates a field filled with `T::default()` (zero for floats).
    pub fn zeros(shape: [usize; N]) -> Self {
        Self::filled(shape, T::default())
    }

    pub fn filled(shape: [usize; N], value: T) -> Self {
        Self {
            data: vec![value; IndexSpace::new(shape).index_count()],
            shape,
        }
    }

    /// Builds a field by evaluating `f` at every cartesian index.
    pub fn from_fn<F: FnMut([usize; N]) -> T>(shape: [usize; N], f: F) -> Self {
        Self {
            data: IndexSpace::new(shape).iter().map(f).collect(),
            shape,
        }
    }
}

impl<T, const N: usize> Field<T, N> {
    /// Wraps row-major storage. `data.len()` must equal the product of `shape`.
    pub fn from_storage(data: Vec<T>, shape: [usize; N]) -> Result<Self, KernelError> {
        check_storage(data.len(), &shape)?;
        Ok(Self { data, shape })
    }

    /// Transforms the field back into a linear vector.
    pub fn into_storage(self) -> Vec<T> {
        self.data
    }

    pub fn storage(&self) -> &[T] {
        &self.data
    }

    pub fn storage_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    pub fn space(&self) -> IndexSpace<N> {
        IndexSpace::new(self.shape)
    }

    pub fn view(&self) -> FieldRef<'_, T, N> {
        FieldRef {
            data: &self.data,
            shape: self.shape,
        }
    }

    pub fn view_mut(&mut self) -> FieldMut<'_, T, N> {
        FieldMut {
            data: &mut self.data,
            shape: self.shape,
        }
    }
}

impl<T, const N: usize> Index<[usize; N]> for Field<T, N> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        &self.data[self.space().linear_from_cartesian(index)]
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for Field<T, N> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        let linear = self.space().linear_from_cartesian(index);
        &mut self.data[linear]
    }
}

/// An immutable view of a scalar field.
#[derive(Debug)]
pub struct FieldRef<'a, T, const N: usize> {
    data: &'a [T],
    shape: [usize; N],
}

impl<T, const N: usize> Clone for FieldRef<'_, T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize> Copy for FieldRef<'_, T, N> {}

impl<'a, T, const N: usize> FieldRef<'a, T, N> {
    /// Builds a view over contiguous row-major data.
    pub fn from_storage(data: &'a [T], shape: [usize; N]) -> Result<Self, KernelError> {
        check_storage(data.len(), &shape)?;
        Ok(Self { data, shape })
    }

    pub fn storage(&self) -> &'a [T] {
        self.data
    }

    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    pub fn space(&self) -> IndexSpace<N> {
        IndexSpace::new(self.shape)
    }

    pub fn get(&self, index: [usize; N]) -> &'a T {
        &self.data[self.space().linear_from_cartesian(index)]
    }

    pub fn to_owned(&self) -> Field<T, N>
    where
        T: Clone,
    {
        Field {
            data: self.data.to_vec(),
            shape: self.shape,
        }
    }
}

impl<'a, T, const N: usize> From<&'a Field<T, N>> for FieldRef<'a, T, N> {
    fn from(value: &'a Field<T, N>) -> Self {
        value.view()
    }
}

impl<'short, T: 'short, const N: usize> Reborrow<'short> for FieldRef<'_, T, N> {
    type Target = FieldRef<'short, T, N>;

    fn rb(&'short self) -> Self::Target {
        *self
    }
}

/// A mutable view of a scalar field.
#[derive(Debug)]
pub struct FieldMut<'a, T, const N: usize> {
    data: &'a mut [T],
    shape: [usize; N],
}

impl<'a, T, const N: usize> FieldMut<'a, T, N> {
    /// Builds a mutable view over contiguous row-major data.
    pub fn from_storage(data: &'a mut [T], shape: [usize; N]) -> Result<Self, KernelError> {
        check_storage(data.len(), &shape)?;
        Ok(Self { data, shape })
    }

    pub fn storage(&self) -> &[T] {
        self.data
    }

    pub fn storage_mut(&mut self) -> &mut [T] {
        self.data
    }

    /// Consumes the view, returning the underlying storage with the original lifetime.
    pub fn into_storage(self) -> &'a mut [T] {
        self.data
    }

    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    pub fn space(&self) -> IndexSpace<N> {
        IndexSpace::new(self.shape)
    }

    pub fn get(&self, index: [usize; N]) -> &T {
        &self.data[self.space().linear_from_cartesian(index)]
    }

    pub fn get_mut(&mut self, index: [usize; N]) -> &mut T {
        let linear = self.space().linear_from_cartesian(index);
        &mut self.data[linear]
    }

    /// Overwrites every cell with `value`.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.data.fill(value);
    }
}

impl<'a, T, const N: usize> From<&'a mut Field<T, N>> for FieldMut<'a, T, N> {
    fn from(value: &'a mut Field<T, N>) -> Self {
        value.view_mut()
    }
}

impl<'short, T: 'short, const N: usize> Reborrow<'short> for FieldMut<'_, T, N> {
    type Target = FieldRef<'short, T, N>;

    fn rb(&'short self) -> Self::Target {
        FieldRef {
            data: self.data,
            shape: self.shape,
        }
    }
}

impl<'short, T: 'short, const N: usize> ReborrowMut<'short> for FieldMut<'_, T, N> {
    type Target = FieldMut<'short, T, N>;

    fn rb_mut(&'short mut self) -> Self::Target {
        FieldMut {
            data: self.data,
            shape: self.shape,
        }
    }
}
