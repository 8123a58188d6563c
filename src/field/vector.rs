use reborrow::{Reborrow, ReborrowMut};
use std::array;

use super::{check_storage, Field, FieldMut, FieldRef};
use crate::geometry::IndexSpace;
use crate::kernel::KernelError;

/// Number of elements of a vector field with `N` components on the given grid.
fn vector_len<const N: usize>(shape: [usize; N]) -> usize {
    N * IndexSpace::new(shape).index_count()
}

/// Shape of component-major vector storage, `(N, n1, .., nN)`, for error reporting.
fn vector_shape<const N: usize>(shape: [usize; N]) -> Vec<usize> {
    let mut result = Vec::with_capacity(N + 1);
    result.push(N);
    result.extend_from_slice(&shape);
    result
}

/// An owned vector field with one component per spatial axis, stored component-major:
/// component `c` occupies the contiguous range `c * stride..(c + 1) * stride`.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorField<T, const N: usize> {
    data: Vec<T>,
    shape: [usize; N],
}

impl<T: Copy + Default, const N: usize> VectorField<T, N> {
    pub fn zeros(shape: [usize; N]) -> Self {
        Self {
            data: vec![T::default(); vector_len(shape)],
            shape,
        }
    }

    /// Builds a field by evaluating `f(component, index)` at every cell.
    pub fn from_fn<F: FnMut(usize, [usize; N]) -> T>(shape: [usize; N], mut f: F) -> Self {
        let space = IndexSpace::new(shape);
        let data = (0..N)
            .flat_map(|component| space.iter().map(move |index| (component, index)))
            .map(|(component, index)| f(component, index))
            .collect();

        Self { data, shape }
    }
}

impl<T, const N: usize> VectorField<T, N> {
    /// Wraps component-major storage of shape `(N, n1, .., nN)`.
    pub fn from_storage(data: Vec<T>, shape: [usize; N]) -> Result<Self, KernelError> {
        check_storage(data.len(), &vector_shape(shape))?;
        Ok(Self { data, shape })
    }

    /// Recombines per-component scalar fields into a single vector field.
    pub fn from_components(components: [Field<T, N>; N]) -> Result<Self, KernelError> {
        let Some(shape) = components.first().map(Field::shape) else {
            return Ok(Self {
                data: Vec::new(),
                shape: [0; N],
            });
        };

        let mut data = Vec::with_capacity(vector_len(shape));

        for (component, field) in components.into_iter().enumerate() {
            if field.shape() != shape {
                return Err(KernelError::ShapeMismatch {
                    role: format!("component {component}"),
                    expected: shape.to_vec(),
                    found: field.shape().to_vec(),
                });
            }

            data.extend(field.into_storage());
        }

        Ok(Self { data, shape })
    }

    /// Splits the vector field into owned per-component scalar fields.
    pub fn into_components(self) -> [Field<T, N>; N] {
        let stride = IndexSpace::new(self.shape).index_count();
        let mut data = self.data.into_iter();

        array::from_fn(|_| Field {
            data: data.by_ref().take(stride).collect(),
            shape: self.shape,
        })
    }

    pub fn into_storage(self) -> Vec<T> {
        self.data
    }

    pub fn storage(&self) -> &[T] {
        &self.data
    }

    /// Per-axis extents of each component.
    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    pub fn num_components(&self) -> usize {
        N
    }

    pub fn view(&self) -> VectorFieldRef<'_, T, N> {
        VectorFieldRef {
            data: &self.data,
            shape: self.shape,
        }
    }

    pub fn view_mut(&mut self) -> VectorFieldMut<'_, T, N> {
        VectorFieldMut {
            data: &mut self.data,
            shape: self.shape,
        }
    }

    pub fn component(&self, component: usize) -> FieldRef<'_, T, N> {
        self.view().component(component)
    }

    pub fn component_mut(&mut self, component: usize) -> FieldMut<'_, T, N> {
        self.view_mut().into_component(component)
    }
}

/// An immutable view of a component-major vector field.
#[derive(Debug)]
pub struct VectorFieldRef<'a, T, const N: usize> {
    data: &'a [T],
    shape: [usize; N],
}

impl<T, const N: usize> Clone for VectorFieldRef<'_, T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize> Copy for VectorFieldRef<'_, T, N> {}

impl<'a, T, const N: usize> VectorFieldRef<'a, T, N> {
    /// Builds a view over contiguous storage of shape `(N, n1, .., nN)`.
    pub fn from_storage(data: &'a [T], shape: [usize; N]) -> Result<Self, KernelError> {
        check_storage(data.len(), &vector_shape(shape))?;
        Ok(Self { data, shape })
    }

    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    fn stride(&self) -> usize {
        IndexSpace::new(self.shape).index_count()
    }

    /// Gets an immutable view of the given component.
    pub fn component(&self, component: usize) -> FieldRef<'a, T, N> {
        let stride = self.stride();

        FieldRef {
            data: &self.data[stride * component..stride * (component + 1)],
            shape: self.shape,
        }
    }

    /// Splits the field into one scalar view per component.
    pub fn split(&self) -> [FieldRef<'a, T, N>; N] {
        array::from_fn(|component| self.component(component))
    }
}

impl<'a, T, const N: usize> From<&'a VectorField<T, N>> for VectorFieldRef<'a, T, N> {
    fn from(value: &'a VectorField<T, N>) -> Self {
        value.view()
    }
}

/// A mutable view of a component-major vector field.
#[derive(Debug)]
pub struct VectorFieldMut<'a, T, const N: usize> {
    data: &'a mut [T],
    shape: [usize; N],
}

impl<'a, T, const N: usize> VectorFieldMut<'a, T, N> {
    /// Builds a mutable view over contiguous storage of shape `(N, n1, .., nN)`.
    pub fn from_storage(data: &'a mut [T], shape: [usize; N]) -> Result<Self, KernelError> {
        check_storage(data.len(), &vector_shape(shape))?;
        Ok(Self { data, shape })
    }

    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    fn stride(&self) -> usize {
        IndexSpace::new(self.shape).index_count()
    }

    /// Consumes the view, returning a mutable view of a single component.
    pub fn into_component(self, component: usize) -> FieldMut<'a, T, N> {
        let stride = self.stride();

        FieldMut {
            data: &mut self.data[stride * component..stride * (component + 1)],
            shape: self.shape,
        }
    }

    /// Splits the field into disjoint mutable views, one per component.
    pub fn split_mut(self) -> [FieldMut<'a, T, N>; N] {
        let stride = self.stride();
        let shape = self.shape;
        let mut chunks = self.data.chunks_mut(stride.max(1));

        array::from_fn(|_| FieldMut {
            data: chunks.next().unwrap_or_default(),
            shape,
        })
    }
}

impl<'a, T, const N: usize> From<&'a mut VectorField<T, N>> for VectorFieldMut<'a, T, N> {
    fn from(value: &'a mut VectorField<T, N>) -> Self {
        value.view_mut()
    }
}

impl<'short, T: 'short, const N: usize> Reborrow<'short> for VectorFieldMut<'_, T, N> {
    type Target = VectorFieldRef<'short, T, N>;

    fn rb(&'short self) -> Self::Target {
        VectorFieldRef {
            data: self.data,
            shape: self.shape,
        }
    }
}

impl<'short, T: 'short, const N: usize> ReborrowMut<'short> for VectorFieldMut<'_, T, N> {
    type Target = VectorFieldMut<'short, T, N>;

    fn rb_mut(&'short mut self) -> Self::Target {
        VectorFieldMut {
            data: self.data,
            shape: self.shape,
        }
    }
}
