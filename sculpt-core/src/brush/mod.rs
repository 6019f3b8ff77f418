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

//! Brushes: grayscale stamps, influence kernels rasterized from them and the modes a brush can
//! apply to a terrain.

use crate::grid::Grid;
use image::{imageops::FilterType, GrayImage, ImageError, Luma};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    path::Path,
};
use strum_macros::{AsRefStr, EnumIter, EnumString, VariantNames};

pub mod library;
pub mod mapping;
pub mod stroke;

pub use library::BrushLibrary;
pub use stroke::{BrushStroke, CellChange, StrokeData};

/// An error that may occur during brush stamp loading.
#[derive(Debug)]
pub enum BrushError {
    /// Stamp image could not be read or decoded.
    Image(ImageError),
    /// Stamp image has zero width or height.
    EmptyImage,
}

impl From<ImageError> for BrushError {
    fn from(e: ImageError) -> Self {
        Self::Image(e)
    }
}

impl Display for BrushError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BrushError::Image(v) => write!(f, "Unable to load brush stamp image: {v}"),
            BrushError::EmptyImage => write!(f, "Brush stamp image is empty."),
        }
    }
}

impl std::error::Error for BrushError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrushError::Image(v) => Some(v),
            BrushError::EmptyImage => None,
        }
    }
}

/// What a brush does with a terrain on every tick of a stroke.
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
pub enum BrushEffectMode {
    #[default]
    Raise,
    Lower,
    Flatten,
    Smooth,
    Paint,
    ObjectAdd,
    ObjectRemove,
}

/// Auxiliary tool panel a user interface should show for a mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ToolPanel {
    Flatten,
    Paint,
    Objects,
}

/// Terrain buffer a mode modifies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StrokeTarget {
    Heights,
    Splats,
    Instances,
}

impl BrushEffectMode {
    pub fn panel(self) -> Option<ToolPanel> {
        match self {
            BrushEffectMode::Flatten => Some(ToolPanel::Flatten),
            BrushEffectMode::Paint => Some(ToolPanel::Paint),
            BrushEffectMode::ObjectAdd => Some(ToolPanel::Objects),
            _ => None,
        }
    }

    pub fn target(self) -> StrokeTarget {
        match self {
            BrushEffectMode::Raise
            | BrushEffectMode::Lower
            | BrushEffectMode::Flatten
            | BrushEffectMode::Smooth => StrokeTarget::Heights,
            BrushEffectMode::Paint => StrokeTarget::Splats,
            BrushEffectMode::ObjectAdd | BrushEffectMode::ObjectRemove => StrokeTarget::Instances,
        }
    }
}

/// Grayscale image a brush kernel is rasterized from.
#[derive(Clone, Debug)]
pub struct BrushStamp {
    name: String,
    image: GrayImage,
}

impl BrushStamp {
    /// Name of the built-in stamp.
    pub const SOLID: &'static str = "Solid";

    /// Stamp with full influence everywhere.
    pub fn solid() -> Self {
        Self {
            name: Self::SOLID.to_owned(),
            image: GrayImage::from_pixel(1, 1, Luma([u8::MAX])),
        }
    }

    pub fn from_image<S: Into<String>>(name: S, image: GrayImage) -> Result<Self, BrushError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(BrushError::EmptyImage);
        }
        Ok(Self {
            name: name.into(),
            image,
        })
    }

    /// Decodes a stamp from an image file of any supported format, colors are converted to
    /// luminance.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BrushError> {
        let path = path.as_ref();
        let image = image::open(path)?.to_luma8();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_image(name, image)
    }

    pub fn from_memory<S: Into<String>>(name: S, bytes: &[u8]) -> Result<Self, BrushError> {
        let image = image::load_from_memory(bytes)?.to_luma8();
        Self::from_image(name, image)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn image(&self) -> &GrayImage {
        &self.image
    }
}

/// Square grid of brush influence values in `[0; 1]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BrushKernel {
    values: Grid<f32>,
}

impl BrushKernel {
    /// Resamples the stamp to `size * size` pixels with a smooth filter and converts every pixel
    /// to influence by normalizing its luminance to `[0; 1]`.
    pub fn generate(stamp: &BrushStamp, size: usize) -> Self {
        if size == 0 {
            return Self::default();
        }

        let extent = size as u32;
        let scaled = image::imageops::resize(stamp.image(), extent, extent, FilterType::Triangle);
        Self {
            values: Grid::from_fn(size, size, |x, z| {
                scaled.get_pixel(x as u32, z as u32)[0] as f32 / u8::MAX as f32
            }),
        }
    }

    /// Kernel with the same influence everywhere.
    pub fn filled(size: usize, influence: f32) -> Self {
        Self {
            values: Grid::new(size, size, influence.clamp(0.0, 1.0)),
        }
    }

    /// Side length of the kernel.
    #[inline]
    pub fn size(&self) -> usize {
        self.values.width()
    }

    /// Influence at the given kernel cell, zero outside of the kernel.
    #[inline]
    pub fn influence(&self, x: usize, z: usize) -> f32 {
        self.values.get(x, z).copied().unwrap_or_default()
    }

    #[inline]
    pub fn values(&self) -> &Grid<f32> {
        &self.values
    }
}

/// Parameters of a brush for one tick of a stroke. Shape and size are defined by the kernel
/// passed alongside.
#[derive(Clone, Debug, PartialEq)]
pub struct Brush {
    /// Strength in `[0; 1]`, scales kernel influence.
    pub strength: f32,
    /// Normalized height the flatten mode moves the surface to.
    pub flatten_target: f32,
    /// Index of the paint layer that gains weight.
    pub paint_layer: usize,
    /// Amount of weight added per unit of influence.
    pub paint_multiplier: f32,
    pub objects: ObjectScatter,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            strength: 0.5,
            flatten_target: 0.16,
            paint_layer: 0,
            paint_multiplier: 80.0,
            objects: Default::default(),
        }
    }
}

/// How new object instances are created.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectScatter {
    /// Prototype (object layer) of new instances.
    pub prototype: usize,
    pub height_min: f32,
    pub height_max: f32,
    pub width_min: f32,
    pub width_max: f32,
}

impl Default for ObjectScatter {
    fn default() -> Self {
        Self {
            prototype: 0,
            height_min: 0.8,
            height_max: 1.2,
            width_min: 0.8,
            width_max: 1.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn white_stamp_gives_full_influence() {
        let stamp = BrushStamp::from_image("white", GrayImage::from_pixel(16, 16, Luma([255])))
            .unwrap();
        let kernel = BrushKernel::generate(&stamp, 5);
        assert_eq!(kernel.size(), 5);
        for value in kernel.values().iter() {
            assert_relative_eq!(*value, 1.0);
        }
    }

    #[test]
    fn luminance_is_normalized_once() {
        let stamp =
            BrushStamp::from_image("gray", GrayImage::from_pixel(4, 4, Luma([51]))).unwrap();
        let kernel = BrushKernel::generate(&stamp, 4);
        assert_relative_eq!(kernel.influence(1, 2), 0.2, epsilon = 1.0e-6);
        assert_eq!(kernel.influence(4, 0), 0.0);
    }

    #[test]
    fn gradient_stamp_keeps_its_shape_when_downsampled() {
        let image = GrayImage::from_fn(64, 64, |x, _| Luma([(x * 4).min(255) as u8]));
        let stamp = BrushStamp::from_image("gradient", image).unwrap();
        let kernel = BrushKernel::generate(&stamp, 8);
        assert!(kernel.influence(0, 3) < kernel.influence(4, 3));
        assert!(kernel.influence(4, 3) < kernel.influence(7, 3));
    }

    #[test]
    fn empty_and_broken_stamps_are_rejected() {
        assert!(matches!(
            BrushStamp::from_image("empty", GrayImage::new(0, 3)),
            Err(BrushError::EmptyImage)
        ));
        assert!(matches!(
            BrushStamp::from_memory("garbage", &[1, 2, 3, 4]),
            Err(BrushError::Image(_))
        ));
    }

    #[test]
    fn modes_report_panels_and_targets() {
        assert_eq!(BrushEffectMode::iter().count(), 7);
        assert_eq!(BrushEffectMode::Flatten.panel(), Some(ToolPanel::Flatten));
        assert_eq!(BrushEffectMode::Paint.panel(), Some(ToolPanel::Paint));
        assert_eq!(BrushEffectMode::ObjectAdd.panel(), Some(ToolPanel::Objects));
        assert_eq!(BrushEffectMode::ObjectRemove.panel(), None);
        assert_eq!(BrushEffectMode::Smooth.target(), StrokeTarget::Heights);
        assert_eq!(
            BrushEffectMode::ObjectRemove.target(),
            StrokeTarget::Instances
        );
        assert_eq!(
            BrushEffectMode::from_str("ObjectAdd"),
            Ok(BrushEffectMode::ObjectAdd)
        );
    }
}
