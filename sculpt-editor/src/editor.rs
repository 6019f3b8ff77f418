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

//! Terrain editor facade: owns a terrain, the brushes, the stroke state and the command
//! history, and exposes everything a user interface needs to drive them.

use crate::{
    command::CommandHistory,
    interaction::{PointerEvent, StrokeInteraction},
    settings::EditorSettings,
};
use nalgebra::Vector3;
use rand::{rngs::StdRng, SeedableRng};
use sculpt_core::{
    brush::{Brush, BrushEffectMode, BrushLibrary, ObjectScatter, ToolPanel},
    info,
    terrain::{Terrain, TerrainChanged, TerrainSize},
    warn,
};
use std::sync::mpsc::Sender;

/// See module docs.
pub struct TerrainEditor {
    settings: EditorSettings,
    terrain: Terrain,
    brushes: BrushLibrary,
    history: CommandHistory,
    interaction: StrokeInteraction,
    mode: BrushEffectMode,
    strength: f32,
    flatten_height: f32,
    paint_layer: usize,
    object_index: usize,
    rng: StdRng,
}

impl TerrainEditor {
    /// Creates new editor with a flat terrain. Brush stamps are loaded from the files listed in
    /// the settings.
    pub fn new(settings: EditorSettings) -> Self {
        let settings = settings.sanitized();
        let brushes = BrushLibrary::load(&settings.brush.textures, settings.brush.size_default);
        Self::with_brushes(settings, brushes)
    }

    /// Creates new editor with the given brush library.
    pub fn with_brushes(settings: EditorSettings, mut brushes: BrushLibrary) -> Self {
        let settings = settings.sanitized();
        brushes.set_size(settings.brush.size_default);

        let terrain = Terrain::new(
            settings.terrain.size,
            settings.paint.layers.len(),
            settings.terrain.height,
        );
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            "Terrain editor created: {0}x{0} terrain, {1} paint layers, {2} brushes.",
            terrain.resolution(),
            terrain.layer_count(),
            brushes.stamps().len()
        );

        Self {
            history: CommandHistory::new(settings.history.debug, settings.history.max_depth),
            strength: settings.brush.strength_default,
            flatten_height: settings.flatten.height_default,
            settings,
            terrain,
            brushes,
            interaction: Default::default(),
            mode: Default::default(),
            paint_layer: 0,
            object_index: 0,
            rng,
        }
    }

    #[inline]
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    #[inline]
    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    #[inline]
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    #[inline]
    pub fn brushes(&self) -> &BrushLibrary {
        &self.brushes
    }

    /// Adds a listener that will be notified about every change of the terrain, so it could be
    /// redrawn.
    pub fn add_terrain_listener(&mut self, listener: Sender<TerrainChanged>) {
        self.terrain.add_listener(listener);
    }

    /// Moves the terrain in the world. Pointer hits are mapped relative to this point.
    pub fn set_terrain_origin(&mut self, origin: Vector3<f32>) {
        self.terrain.set_origin(origin);
    }

    #[inline]
    pub fn mode(&self) -> BrushEffectMode {
        self.mode
    }

    /// Switches brush mode. A stroke that is in progress is committed first.
    pub fn set_mode(&mut self, mode: BrushEffectMode) {
        if self.mode != mode {
            self.end_stroke();
            self.mode = mode;
        }
    }

    /// Auxiliary panel a user interface should show for current mode.
    pub fn panel(&self) -> Option<ToolPanel> {
        self.mode.panel()
    }

    #[inline]
    pub fn brush_index(&self) -> usize {
        self.brushes.selected()
    }

    /// Selects a brush stamp, out-of-range indices are ignored.
    pub fn set_brush_index(&mut self, index: usize) {
        self.brushes.select(index);
    }

    #[inline]
    pub fn brush_size(&self) -> usize {
        self.brushes.size()
    }

    /// Sets brush size in cells, clamped to the range from the settings.
    pub fn set_brush_size(&mut self, size: usize) {
        let brush = &self.settings.brush;
        self.brushes
            .set_size(size.clamp(brush.size_min, brush.size_max));
    }

    #[inline]
    pub fn brush_strength(&self) -> f32 {
        self.strength
    }

    /// Sets brush strength, clamped to `[0; max_strength]`.
    pub fn set_brush_strength(&mut self, strength: f32) {
        self.strength = strength.clamp(0.0, self.settings.brush.max_strength);
    }

    #[inline]
    pub fn flatten_height(&self) -> f32 {
        self.flatten_height
    }

    /// Sets flatten height, clamped to the range from the settings.
    pub fn set_flatten_height(&mut self, height: f32) {
        let flatten = &self.settings.flatten;
        self.flatten_height = height.clamp(flatten.height_min, flatten.height_max);
    }

    #[inline]
    pub fn paint_layer_index(&self) -> usize {
        self.paint_layer
    }

    /// Selects a paint layer, out-of-range indices are ignored.
    pub fn set_paint_layer_index(&mut self, index: usize) {
        let count = self.terrain.layer_count();
        if index < count {
            self.paint_layer = index;
        } else {
            warn!("Paint layer index {index} is out of range, there are only {count} layers.");
        }
    }

    #[inline]
    pub fn object_index(&self) -> usize {
        self.object_index
    }

    /// Selects an object prototype, out-of-range indices are ignored.
    pub fn set_object_index(&mut self, index: usize) {
        let count = self.settings.objects.prototypes.len().max(1);
        if index < count {
            self.object_index = index;
        } else {
            warn!("Object index {index} is out of range, there are only {count} objects.");
        }
    }

    /// Parameters of the current brush.
    pub fn brush(&self) -> Brush {
        let objects = &self.settings.objects;
        Brush {
            strength: self.strength,
            flatten_target: self.flatten_height * self.settings.flatten.stroke_multiplier,
            paint_layer: self.paint_layer,
            paint_multiplier: self.settings.paint.stroke_multiplier,
            objects: ObjectScatter {
                prototype: self.object_index,
                height_min: objects.height_min,
                height_max: objects.height_max,
                width_min: objects.width_min,
                width_max: objects.width_max,
            },
        }
    }

    #[inline]
    pub fn is_stroke_active(&self) -> bool {
        self.interaction.is_active()
    }

    /// Starts a new stroke in current mode. A stroke that is in progress is committed first.
    pub fn begin_stroke(&mut self) {
        if let Some(command) = self.interaction.begin(self.mode, &self.terrain) {
            self.history.register(command);
        }
    }

    /// Applies one tick of the brush at a world-space point of the terrain. Starts a new stroke
    /// if there is none. Returns `true` if the terrain was modified.
    pub fn use_brush(&mut self, hit: Vector3<f32>) -> bool {
        if !self.interaction.is_active() {
            self.begin_stroke();
        }
        let brush = self.brush();
        self.interaction.tick(
            &mut self.terrain,
            &brush,
            self.brushes.kernel(),
            hit,
            &mut self.rng,
        )
    }

    /// Ends current stroke and registers it in the history. Returns `true` if a command was
    /// registered, a stroke without any ticks is dropped.
    pub fn end_stroke(&mut self) -> bool {
        match self.interaction.end(&self.terrain) {
            Some(command) => {
                self.history.register(command);
                true
            }
            None => false,
        }
    }

    /// Reacts to pointer input: press starts a stroke, hold applies the brush, release commits
    /// the stroke. Returns `true` if the terrain or the history has changed.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down => {
                self.begin_stroke();
                false
            }
            PointerEvent::Held(hit) => self.use_brush(hit),
            PointerEvent::Up => self.end_stroke(),
        }
    }

    /// Changes terrain resolution. The terrain is reset and the history is cleared, since
    /// recorded commands refer to cells of the old terrain.
    pub fn set_terrain_size(&mut self, size: TerrainSize) {
        self.interaction.discard();
        self.terrain.resize(size);
        self.history.clear();
        self.settings.terrain.size = size;
    }

    /// Flattens the terrain, removes paint and objects. The history is cleared as well.
    pub fn reset(&mut self) {
        self.interaction.discard();
        self.terrain.reset();
        self.history.clear();
    }

    /// Reverts the most recent stroke. A stroke that is in progress is committed first.
    pub fn undo(&mut self) -> bool {
        self.end_stroke();
        self.history.undo(&mut self.terrain)
    }

    /// Re-applies the most recently undone stroke. A stroke that is in progress is committed
    /// first, which clears the redo history.
    pub fn redo(&mut self) -> bool {
        self.end_stroke();
        self.history.redo(&mut self.terrain)
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[inline]
    pub fn undo_count(&self) -> usize {
        self.history.undo_count()
    }

    #[inline]
    pub fn redo_count(&self) -> usize {
        self.history.redo_count()
    }
}
