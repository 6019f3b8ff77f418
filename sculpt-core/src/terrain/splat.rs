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

//! Per-layer paint weights (alpha maps).

use crate::terrain::Region;

/// A `width * height` grid where every cell holds one weight per paint layer. A freshly created
/// grid is fully covered by the first layer, so weights of each cell sum to one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplatGrid {
    width: usize,
    height: usize,
    layers: usize,
    weights: Vec<f32>,
}

impl SplatGrid {
    /// Creates new splat grid where the first layer has full weight everywhere.
    pub fn new(width: usize, height: usize, layers: usize) -> Self {
        let mut weights = vec![0.0; width * height * layers];
        if layers > 0 {
            for cell in weights.chunks_exact_mut(layers) {
                cell[0] = 1.0;
            }
        }
        Self {
            width,
            height,
            layers,
            weights,
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
    pub fn layer_count(&self) -> usize {
        self.layers
    }

    #[inline]
    fn cell_offset(&self, x: usize, z: usize) -> usize {
        assert!(
            x < self.width && z < self.height,
            "splat cell ({x}, {z}) is outside of {}x{} grid",
            self.width,
            self.height
        );
        (z * self.width + x) * self.layers
    }

    /// Weights of every layer at the given cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside of the grid.
    #[inline]
    pub fn weights(&self, x: usize, z: usize) -> &[f32] {
        let offset = self.cell_offset(x, z);
        &self.weights[offset..offset + self.layers]
    }

    /// Mutable weights of every layer at the given cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside of the grid.
    #[inline]
    pub fn weights_mut(&mut self, x: usize, z: usize) -> &mut [f32] {
        let offset = self.cell_offset(x, z);
        &mut self.weights[offset..offset + self.layers]
    }

    /// Weight of a layer at the given cell. Layer index is clamped to the valid range, a grid
    /// without layers yields zero.
    #[inline]
    pub fn weight(&self, x: usize, z: usize, layer: usize) -> f32 {
        if self.layers == 0 {
            return 0.0;
        }
        self.weights(x, z)[layer.min(self.layers - 1)]
    }

    /// Copies a rectangular part of the grid.
    ///
    /// # Panics
    ///
    /// Panics if the region does not fit into the grid.
    pub fn region(&self, region: Region) -> SplatGrid {
        self.assert_fits(region);
        let mut weights = Vec::with_capacity(region.width * region.height * self.layers);
        for z in region.z..region.z + region.height {
            let start = (z * self.width + region.x) * self.layers;
            let end = start + region.width * self.layers;
            weights.extend_from_slice(&self.weights[start..end]);
        }
        SplatGrid {
            width: region.width,
            height: region.height,
            layers: self.layers,
            weights,
        }
    }

    /// Writes `source` into the grid with its top-left corner at `(x, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the source does not fit into the grid or has different layer count.
    pub fn set_region(&mut self, x: usize, z: usize, source: &SplatGrid) {
        assert_eq!(
            self.layers, source.layers,
            "layer count mismatch when writing splat region"
        );
        self.assert_fits(Region::new(x, z, source.width, source.height));
        let row_len = source.width * self.layers;
        for row in 0..source.height {
            let dst = ((z + row) * self.width + x) * self.layers;
            let src = row * row_len;
            self.weights[dst..dst + row_len].copy_from_slice(&source.weights[src..src + row_len]);
        }
    }

    fn assert_fits(&self, region: Region) {
        assert!(
            region.x + region.width <= self.width && region.z + region.height <= self.height,
            "region {region:?} is outside of {}x{} splat grid",
            self.width,
            self.height
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_covered_by_first_layer() {
        let grid = SplatGrid::new(4, 4, 3);
        for z in 0..4 {
            for x in 0..4 {
                assert_eq!(grid.weights(x, z), &[1.0, 0.0, 0.0]);
            }
        }
    }

    #[test]
    fn region_round_trips_through_set_region() {
        let mut grid = SplatGrid::new(4, 4, 2);
        grid.weights_mut(2, 1).copy_from_slice(&[0.25, 0.75]);

        let mut part = grid.region(Region::new(1, 1, 2, 2));
        assert_eq!(part.weights(1, 0), &[0.25, 0.75]);

        part.weights_mut(0, 1).copy_from_slice(&[0.0, 1.0]);
        grid.set_region(1, 1, &part);
        assert_eq!(grid.weights(1, 2), &[0.0, 1.0]);
        assert_eq!(grid.weights(2, 1), &[0.25, 0.75]);
        assert_eq!(grid.weights(0, 0), &[1.0, 0.0]);
    }

    #[test]
    fn layer_lookup_clamps_index() {
        let grid = SplatGrid::new(1, 1, 2);
        assert_eq!(grid.weight(0, 0, 7), 0.0);
        assert_eq!(grid.weight(0, 0, 0), 1.0);
    }
}
