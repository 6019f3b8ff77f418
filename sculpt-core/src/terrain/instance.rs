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

//! Scattered objects (vegetation, rocks and so on) placed on a terrain.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// 32-bit RGBA color used to tint object instances.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// A single placed object. Position is expressed in normalized terrain space, `[0; 1]` on both
/// axes, the height is implied by the terrain surface at that point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectInstance {
    /// Normalized `(x, z)` position on the terrain.
    pub position: Vector2<f32>,
    pub height_scale: f32,
    pub width_scale: f32,
    /// Rotation around the vertical axis, in radians.
    pub rotation: f32,
    pub color: Color,
    /// Index of the object prototype (object layer) this instance belongs to.
    pub prototype: usize,
}

impl Default for ObjectInstance {
    fn default() -> Self {
        Self {
            position: Vector2::default(),
            height_scale: 1.0,
            width_scale: 1.0,
            rotation: 0.0,
            color: Color::WHITE,
            prototype: 0,
        }
    }
}

impl ObjectInstance {
    /// Distance between this instance and a normalized terrain position.
    #[inline]
    pub fn distance_to(&self, position: Vector2<f32>) -> f32 {
        (self.position - position).norm()
    }
}
