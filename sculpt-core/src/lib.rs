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

//! Core of the terrain sculpting tools: terrain buffers, brushes and the stroke engine.
//!
//! Everything here is single-threaded and synchronous. A terrain is exclusively owned by its
//! user and modified in place, one brush tick at a time.

pub mod brush;
pub mod grid;
pub mod log;
pub mod terrain;

pub use image;
pub use nalgebra as algebra;
pub use rand;

pub mod prelude {
    pub use crate::{
        algebra::{Vector2, Vector3},
        brush::{
            mapping::{move_towards, world_hit_to_heightmap, world_hit_to_normalized, BrushRegion},
            Brush, BrushEffectMode, BrushError, BrushKernel, BrushLibrary, BrushStamp,
            BrushStroke, CellChange, ObjectScatter, StrokeData, StrokeTarget, ToolPanel,
        },
        grid::Grid,
        log::{Log, MessageKind},
        terrain::{
            Color, ObjectInstance, Region, SplatGrid, Terrain, TerrainChangeKind,
            TerrainChanged, TerrainError, TerrainSize,
        },
    };
}
