// Copyright (c) 2019-present Dmitry Stepanov and Fyrox Engine contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Dense two-dimensional grid used for heightmaps, brush kernels and region snapshots.

use std::ops::{Index, IndexMut};

/// Row-major grid of `width * height` cells, addressed by `(x, z)` where `x` is the column and
/// `z` is the row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Creates a new grid with every cell set to `value`.
    pub fn new(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Grid<T> {
    /// Creates a new grid by calling `func(x, z)` for every cell.
    pub fn from_fn<F>(width: usize, height: usize, mut func: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(width * height);
        for z in 0..height {
            for x in 0..width {
                data.push(func(x, z));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn offset(&self, x: usize, z: usize) -> Option<usize> {
        if x < self.width && z < self.height {
            Some(z * self.width + x)
        } else {
            None
        }
    }

    /// Returns a reference to the cell at `(x, z)` or `None` if it is outside of the grid.
    #[inline]
    pub fn get(&self, x: usize, z: usize) -> Option<&T> {
        self.offset(x, z).map(|i| &self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, z: usize) -> Option<&mut T> {
        self.offset(x, z).map(|i| &mut self.data[i])
    }

    /// Returns the cells in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, z): (usize, usize)) -> &Self::Output {
        assert!(
            x < self.width && z < self.height,
            "cell ({x}, {z}) is outside of {}x{} grid",
            self.width,
            self.height
        );
        &self.data[z * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (x, z): (usize, usize)) -> &mut Self::Output {
        assert!(
            x < self.width && z < self.height,
            "cell ({x}, {z}) is outside of {}x{} grid",
            self.width,
            self.height
        );
        &mut self.data[z * self.width + x]
    }
}
