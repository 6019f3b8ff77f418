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

//! Pointer-driven stroke state machine. A stroke is idle until the pointer is pressed, every
//! tick while the pointer is held modifies the terrain, releasing the pointer turns the stroke
//! into a command.

use crate::command::TerrainCommand;
use nalgebra::Vector3;
use rand::Rng;
use sculpt_core::{
    brush::{Brush, BrushEffectMode, BrushKernel, BrushStroke},
    terrain::Terrain,
};

/// Pointer input an editor reacts to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointerEvent {
    /// Pointer was pressed over the terrain.
    Down,
    /// Pointer is held, the value is the world-space point of the terrain under the pointer.
    Held(Vector3<f32>),
    /// Pointer was released.
    Up,
}

#[derive(Debug)]
struct ActiveStroke {
    stroke: BrushStroke,
    command: TerrainCommand,
}

#[derive(Debug, Default)]
pub struct StrokeInteraction {
    active: Option<ActiveStroke>,
}

impl StrokeInteraction {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Mode of the active stroke, if any.
    pub fn active_mode(&self) -> Option<BrushEffectMode> {
        self.active.as_ref().map(|active| active.stroke.mode())
    }

    /// Starts a new stroke. A stroke that is still active is ended first, its command is
    /// returned.
    pub fn begin(&mut self, mode: BrushEffectMode, terrain: &Terrain) -> Option<TerrainCommand> {
        let previous = self.end(terrain);
        self.active = Some(ActiveStroke {
            stroke: BrushStroke::new(mode),
            command: TerrainCommand::open(mode.target(), terrain),
        });
        previous
    }

    /// Applies one tick of the active stroke. Does nothing and returns `false` when there is no
    /// active stroke.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        terrain: &mut Terrain,
        brush: &Brush,
        kernel: &BrushKernel,
        hit: Vector3<f32>,
        rng: &mut R,
    ) -> bool {
        match self.active.as_mut() {
            Some(active) => active.stroke.apply(terrain, brush, kernel, hit, rng),
            None => false,
        }
    }

    /// Ends the active stroke and returns the completed command. Returns `None` if there was no
    /// active stroke, the stroke was released before its first mutating tick or it left the
    /// terrain as it was.
    pub fn end(&mut self, terrain: &Terrain) -> Option<TerrainCommand> {
        let ActiveStroke {
            stroke,
            mut command,
        } = self.active.take()?;
        if stroke.mutations() == 0 {
            return None;
        }
        command.complete(terrain, stroke);
        (!command.is_empty()).then_some(command)
    }

    /// Drops the active stroke without making a command of it. Changes it has made stay.
    pub fn discard(&mut self) {
        self.active = None;
    }
}
