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

//! Terrain buffers: heightmap, splat map and object instances. Every buffer is square and has
//! the same resolution, which is defined by [`TerrainSize`].
//!
//! Region accessors do not clamp their input: callers are expected to clamp brush regions
//! against terrain edges (see [`crate::brush::mapping::BrushRegion`]) before reading or writing.
//! Every mutation is reported to the listeners added by [`Terrain::add_listener`], so renderers
//! could refresh their meshes and textures.

use crate::{grid::Grid, info};
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    sync::mpsc::Sender,
};
use strum_macros::{AsRefStr, EnumIter, EnumString, VariantNames};

pub mod instance;
pub mod splat;

pub use instance::{Color, ObjectInstance};
pub use splat::SplatGrid;

/// Supported terrain resolutions.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumString,
    VariantNames,
    EnumIter,
)]
pub enum TerrainSize {
    #[default]
    Size128,
    Size256,
    Size512,
    Size1024,
}

impl TerrainSize {
    /// Amount of samples along each side of the terrain buffers.
    pub fn resolution(self) -> usize {
        match self {
            TerrainSize::Size128 => 128,
            TerrainSize::Size256 => 256,
            TerrainSize::Size512 => 512,
            TerrainSize::Size1024 => 1024,
        }
    }
}

impl TryFrom<u32> for TerrainSize {
    type Error = TerrainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            128 => Ok(TerrainSize::Size128),
            256 => Ok(TerrainSize::Size256),
            512 => Ok(TerrainSize::Size512),
            1024 => Ok(TerrainSize::Size1024),
            other => Err(TerrainError::UnsupportedSize(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerrainError {
    /// Terrain size is not one of 128, 256, 512 or 1024.
    UnsupportedSize(u32),
}

impl Display for TerrainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TerrainError::UnsupportedSize(size) => {
                write!(
                    f,
                    "Unsupported terrain size {size}! Must be one of 128, 256, 512 or 1024."
                )
            }
        }
    }
}

impl std::error::Error for TerrainError {}

/// Rectangular set of cells, `width * height` cells starting at `(x, z)`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: usize,
    pub z: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    #[inline]
    pub fn new(x: usize, z: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            z,
            width,
            height,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Smallest region that contains every given cell, `None` if there are no cells.
    pub fn bounding<I>(cells: I) -> Option<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut iter = cells.into_iter();
        let (x, z) = iter.next()?;
        let (mut min_x, mut min_z, mut max_x, mut max_z) = (x, z, x, z);
        for (x, z) in iter {
            min_x = min_x.min(x);
            min_z = min_z.min(z);
            max_x = max_x.max(x);
            max_z = max_z.max(z);
        }
        Some(Self::new(
            min_x,
            min_z,
            max_x - min_x + 1,
            max_z - min_z + 1,
        ))
    }
}

/// Which buffer of a terrain has changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TerrainChangeKind {
    Heights,
    Splats,
    Instances,
    /// Every buffer was replaced, resolution might have changed as well.
    Reset,
}

/// A message sent to terrain listeners after every mutation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TerrainChanged {
    pub kind: TerrainChangeKind,
    /// Modified cells, `None` means the whole buffer.
    pub region: Option<Region>,
}

/// See module docs.
#[derive(Debug)]
pub struct Terrain {
    size: TerrainSize,
    origin: Vector3<f32>,
    vertical_extent: f32,
    heights: Grid<f32>,
    splats: SplatGrid,
    layer_count: usize,
    instances: Vec<ObjectInstance>,
    listeners: Vec<Sender<TerrainChanged>>,
}

impl Terrain {
    /// Creates new flat terrain with `layer_count` paint layers (at least one) and the given
    /// vertical world extent. Heights are stored normalized, `1.0` maps to `vertical_extent`.
    pub fn new(size: TerrainSize, layer_count: usize, vertical_extent: f32) -> Self {
        let resolution = size.resolution();
        let layer_count = layer_count.max(1);
        Self {
            size,
            origin: Vector3::default(),
            vertical_extent,
            heights: Grid::new(resolution, resolution, 0.0),
            splats: SplatGrid::new(resolution, resolution, layer_count),
            layer_count,
            instances: Default::default(),
            listeners: Default::default(),
        }
    }

    pub fn with_origin(mut self, origin: Vector3<f32>) -> Self {
        self.origin = origin;
        self
    }

    #[inline]
    pub fn size(&self) -> TerrainSize {
        self.size
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.size.resolution()
    }

    /// World-space position of the terrain corner with zero cell coordinates.
    #[inline]
    pub fn origin(&self) -> Vector3<f32> {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vector3<f32>) {
        self.origin = origin;
    }

    /// Size of the terrain in world units. Horizontal size equals the resolution, so a brush
    /// covers the same amount of cells on every terrain size.
    #[inline]
    pub fn world_size(&self) -> Vector3<f32> {
        let resolution = self.resolution() as f32;
        Vector3::new(resolution, self.vertical_extent, resolution)
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    #[inline]
    pub fn heights(&self) -> &Grid<f32> {
        &self.heights
    }

    #[inline]
    pub fn splats(&self) -> &SplatGrid {
        &self.splats
    }

    /// Adds a listener that will be notified about every change of the terrain. Disconnected
    /// listeners are removed on next notification.
    pub fn add_listener(&mut self, listener: Sender<TerrainChanged>) {
        self.listeners.push(listener);
    }

    fn notify(&mut self, kind: TerrainChangeKind, region: Option<Region>) {
        let message = TerrainChanged { kind, region };
        self.listeners
            .retain(|listener| listener.send(message).is_ok());
    }

    /// Copies `width * height` heights starting at `(x, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the region is outside of the heightmap.
    pub fn get_heights(&self, x: usize, z: usize, width: usize, height: usize) -> Grid<f32> {
        Grid::from_fn(width, height, |dx, dz| self.heights[(x + dx, z + dz)])
    }

    /// Writes `heights` into the heightmap with its top-left corner at `(x, z)`. Heights are
    /// clamped to `[0; 1]`, the terrain never goes below its base or above its vertical extent.
    ///
    /// # Panics
    ///
    /// Panics if the heights do not fit into the heightmap.
    pub fn set_heights(&mut self, x: usize, z: usize, heights: &Grid<f32>) {
        for dz in 0..heights.height() {
            for dx in 0..heights.width() {
                self.heights[(x + dx, z + dz)] = heights[(dx, dz)].clamp(0.0, 1.0);
            }
        }
        self.notify(
            TerrainChangeKind::Heights,
            Some(Region::new(x, z, heights.width(), heights.height())),
        );
    }

    /// Copies splat weights of `width * height` cells starting at `(x, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the region is outside of the splat map.
    pub fn get_alphamaps(&self, x: usize, z: usize, width: usize, height: usize) -> SplatGrid {
        self.splats.region(Region::new(x, z, width, height))
    }

    /// Writes `splats` into the splat map with its top-left corner at `(x, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the weights do not fit into the splat map or have different layer count.
    pub fn set_alphamaps(&mut self, x: usize, z: usize, splats: &SplatGrid) {
        self.splats.set_region(x, z, splats);
        self.notify(
            TerrainChangeKind::Splats,
            Some(Region::new(x, z, splats.width(), splats.height())),
        );
    }

    #[inline]
    pub fn instances(&self) -> &[ObjectInstance] {
        &self.instances
    }

    /// Replaces every object instance.
    pub fn set_instances(&mut self, instances: Vec<ObjectInstance>) {
        self.instances = instances;
        self.notify(TerrainChangeKind::Instances, None);
    }

    pub fn add_instance(&mut self, instance: ObjectInstance) {
        self.instances.push(instance);
        self.notify(TerrainChangeKind::Instances, None);
    }

    /// Removes the first instance (in insertion order) that lies closer than `radius` to the
    /// given normalized position. Not necessarily the nearest one.
    pub fn remove_instance_near(
        &mut self,
        position: Vector2<f32>,
        radius: f32,
    ) -> Option<ObjectInstance> {
        let index = self
            .instances
            .iter()
            .position(|instance| instance.distance_to(position) < radius)?;
        let removed = self.instances.remove(index);
        self.notify(TerrainChangeKind::Instances, None);
        Some(removed)
    }

    /// Flattens the terrain, covers it with the first paint layer and removes every object.
    pub fn reset(&mut self) {
        let resolution = self.resolution();
        self.heights = Grid::new(resolution, resolution, 0.0);
        self.splats = SplatGrid::new(resolution, resolution, self.layer_count);
        self.instances.clear();
        info!("Terrain {resolution}x{resolution} was reset.");
        self.notify(TerrainChangeKind::Reset, None);
    }

    /// Changes resolution of every buffer and resets the terrain.
    pub fn resize(&mut self, size: TerrainSize) {
        info!(
            "Resizing terrain from {} to {}.",
            self.resolution(),
            size.resolution()
        );
        self.size = size;
        self.reset();
    }
}
