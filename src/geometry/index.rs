#![allow(clippy::needless_range_loop)]

use std::array;

/// Describes an abstract index space. Allows for iteration of indices
/// in N dimensions, and transformations between cartesian and linear
/// indices. Storage is row-major: the last axis varies fastest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpace<const N: usize> {
    size: [usize; N],
}

impl<const N: usize> IndexSpace<N> {
    /// Constructs a new index space.
    pub const fn new(size: [usize; N]) -> Self {
        Self { size }
    }

    /// Returns the number of indices in the index space.
    pub fn index_count(&self) -> usize {
        let mut result = 1;

        for i in 0..N {
            result *= self.size[i]
        }

        result
    }

    /// Returns the dimensions of the index space along each axis.
    pub fn size(self) -> [usize; N] {
        self.size
    }

    /// Distance in linear storage between neighbours along each axis.
    pub fn strides(self) -> [usize; N] {
        let mut strides = [1; N];

        for i in (0..N.saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.size[i + 1];
        }

        strides
    }

    /// Converts a cartesian index into a linear index.
    #[inline]
    pub fn linear_from_cartesian(self, cartesian: [usize; N]) -> usize {
        for axis in 0..N {
            debug_assert!(cartesian[axis] < self.size[axis]);
        }

        let mut result = 0;

        for i in 0..N {
            result = result * self.size[i] + cartesian[i];
        }

        result
    }

    /// Iterates all cartesian indices in the index space.
    pub const fn iter(self) -> CartesianIter<N> {
        CartesianIter {
            size: self.size,
            cursor: [0; N],
        }
    }

    /// Returns the window of indices at least `ghost` cells away from every face.
    /// Empty along any axis too short to hold a ghost layer on both sides.
    pub fn interior_window(self, ghost: usize) -> IndexWindow<N> {
        IndexWindow {
            origin: [ghost; N],
            size: array::from_fn(|axis| self.size[axis].saturating_sub(2 * ghost)),
        }
    }
}

impl<const N: usize> IntoIterator for IndexSpace<N> {
    type IntoIter = CartesianIter<N>;
    type Item = [usize; N];

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Represents a subset of an index space, and provides utilities for iterating over this window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexWindow<const N: usize> {
    /// Stores the origin (lowest corner) of the index window
    pub origin: [usize; N],
    /// Stores the size along each axis of the index window.
    pub size: [usize; N],
}

impl<const N: usize> IndexWindow<N> {
    /// Constructs a new index window.
    pub fn new(origin: [usize; N], size: [usize; N]) -> Self {
        Self { origin, size }
    }

    /// Number of indices covered by the window.
    pub fn index_count(&self) -> usize {
        IndexSpace::new(self.size).index_count()
    }

    pub fn is_empty(&self) -> bool {
        self.index_count() == 0
    }

    /// Restricts the window to a single slice `intercept` along `axis`. The intercept is
    /// an absolute index, and must lie inside the window.
    pub fn slab(&self, axis: usize, intercept: usize) -> Self {
        debug_assert!(intercept >= self.origin[axis]);
        debug_assert!(intercept < self.origin[axis] + self.size[axis]);

        let mut result = *self;
        result.origin[axis] = intercept;
        result.size[axis] = 1;
        result
    }

    /// Iterates over indices in the index window.
    pub fn iter(&self) -> CartesianWindowIter<N> {
        CartesianWindowIter {
            origin: self.origin,
            inner: IndexSpace::new(self.size).iter(),
        }
    }
}

impl<const N: usize> IntoIterator for IndexWindow<N> {
    type IntoIter = CartesianWindowIter<N>;
    type Item = [usize; N];

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
/// An iterator over the cartesian indices of an `IndexSpace`, in row-major order.
pub struct CartesianIter<const N: usize> {
    size: [usize; N],
    cursor: [usize; N],
}

impl<const N: usize> Iterator for CartesianIter<N> {
    type Item = [usize; N];

    fn next(&mut self) -> Option<Self::Item> {
        if N == 0 || self.size.contains(&0) {
            // Short circuit if any of the dimensions are zero.
            return None;
        }

        // First index was incremented past its end, iteration is complete
        if self.cursor[0] == self.size[0] {
            return None;
        }

        // Store current cursor value (this is what we will return)
        let result = self.cursor;

        for i in (0..N).rev() {
            // If we need to increment this axis, we add to the cursor value
            self.cursor[i] += 1;
            // If the cursor is equal to size, we wrap and carry into the
            // next slower axis. The slowest axis is allowed to overflow,
            // which marks the end of iteration.
            if self.cursor[i] == self.size[i] && i > 0 {
                self.cursor[i] = 0;
                continue;
            }

            break;
        }

        Some(result)
    }
}

#[derive(Debug, Clone)]
/// An iterator over the cartesian indices of an `IndexWindow`.
pub struct CartesianWindowIter<const N: usize> {
    origin: [usize; N],
    inner: CartesianIter<N>,
}

impl<const N: usize> Iterator for CartesianWindowIter<N> {
    type Item = [usize; N];

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.inner.next()?;
        Some(array::from_fn(|i| self.origin[i] + offset[i]))
    }
}
