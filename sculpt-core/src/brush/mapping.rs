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

//! Conversions from world-space pointer hits to terrain cells and normalized terrain space.
//!
//! Heightmap and splat map share cell coordinates. Object instances use normalized `[0; 1]`
//! coordinates instead, the two must not be mixed.

use crate::terrain::Region;
use nalgebra::{Vector2, Vector3};

/// Converts a world-space hit to the heightmap cell of the top-left corner of a brush with the
/// given size centered at the hit. Fractional cells are truncated toward zero. The result is not
/// clamped and may lie outside of the heightmap.
pub fn world_hit_to_heightmap(
    hit: Vector3<f32>,
    origin: Vector3<f32>,
    world_size: Vector3<f32>,
    resolution: usize,
    brush_size: usize,
) -> Vector2<i32> {
    let local = hit - origin;
    let offset = (brush_size / 2) as i32;
    let x = (local.x / world_size.x * resolution as f32) as i32 - offset;
    let z = (local.z / world_size.z * resolution as f32) as i32 - offset;
    Vector2::new(x, z)
}

/// Converts a world-space hit to normalized terrain space.
pub fn world_hit_to_normalized(
    hit: Vector3<f32>,
    origin: Vector3<f32>,
    world_size: Vector3<f32>,
) -> Vector2<f32> {
    let local = hit - origin;
    Vector2::new(local.x / world_size.x, local.z / world_size.z)
}

/// Part of a brush that lies within the terrain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BrushRegion {
    /// Terrain cells covered by the brush.
    pub cells: Region,
    /// Kernel cell that corresponds to the first cell of the region.
    pub kernel_offset: Vector2<usize>,
}

impl BrushRegion {
    /// Intersects a brush with its top-left corner at `corner` with a `resolution *
    /// resolution` grid. Returns `None` if the brush is entirely outside of the grid.
    pub fn clamp(corner: Vector2<i32>, brush_size: usize, resolution: usize) -> Option<Self> {
        let (x, kx, width) = clamp_axis(corner.x as i64, brush_size as i64, resolution as i64)?;
        let (z, kz, height) = clamp_axis(corner.y as i64, brush_size as i64, resolution as i64)?;
        Some(Self {
            cells: Region::new(x, z, width, height),
            kernel_offset: Vector2::new(kx, kz),
        })
    }

    /// Kernel cell for a cell of the region given relative to the region's first cell.
    #[inline]
    pub fn kernel_cell(&self, dx: usize, dz: usize) -> (usize, usize) {
        (self.kernel_offset.x + dx, self.kernel_offset.y + dz)
    }
}

fn clamp_axis(start: i64, size: i64, resolution: i64) -> Option<(usize, usize, usize)> {
    let begin = start.max(0);
    let end = (start + size).min(resolution);
    if end <= begin {
        None
    } else {
        Some((begin as usize, (begin - start) as usize, (end - begin) as usize))
    }
}

/// Moves `current` toward `target` by at most `max_delta`, never past the target.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + delta.signum() * max_delta
    }
}
