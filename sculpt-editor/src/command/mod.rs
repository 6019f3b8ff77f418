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

//! Undoable terrain commands and the history of executed commands.
//!
//! A command covers one whole stroke. It is opened when the stroke starts, completed when the
//! stroke ends and only then registered in the [`CommandHistory`].

use sculpt_core::{
    brush::{BrushStroke, CellChange, StrokeTarget},
    err, info,
    terrain::{ObjectInstance, Region, Terrain},
};
use std::collections::VecDeque;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Side {
    Before,
    After,
}

#[inline]
fn pick<V>(change: &CellChange<V>, side: Side) -> &V {
    match side {
        Side::Before => &change.before,
        Side::After => &change.after,
    }
}

#[derive(Debug, Default)]
pub struct ModifyHeightsCommand {
    changes: Vec<CellChange<f32>>,
}

impl ModifyHeightsCommand {
    pub fn new(changes: Vec<CellChange<f32>>) -> Self {
        Self { changes }
    }

    pub fn changes(&self) -> &[CellChange<f32>] {
        &self.changes
    }

    fn write(&self, terrain: &mut Terrain, side: Side) {
        let Some(bounds) = changed_region(terrain, &self.changes) else {
            return;
        };
        let mut heights = terrain.get_heights(bounds.x, bounds.z, bounds.width, bounds.height);
        for change in self.changes.iter() {
            heights[(change.position.x - bounds.x, change.position.y - bounds.z)] =
                *pick(change, side);
        }
        terrain.set_heights(bounds.x, bounds.z, &heights);
    }
}

#[derive(Debug, Default)]
pub struct ModifySplatsCommand {
    changes: Vec<CellChange<Box<[f32]>>>,
}

impl ModifySplatsCommand {
    pub fn new(changes: Vec<CellChange<Box<[f32]>>>) -> Self {
        Self { changes }
    }

    pub fn changes(&self) -> &[CellChange<Box<[f32]>>] {
        &self.changes
    }

    fn write(&self, terrain: &mut Terrain, side: Side) {
        let Some(bounds) = changed_region(terrain, &self.changes) else {
            return;
        };
        let mut splats = terrain.get_alphamaps(bounds.x, bounds.z, bounds.width, bounds.height);
        for change in self.changes.iter() {
            let weights =
                splats.weights_mut(change.position.x - bounds.x, change.position.y - bounds.z);
            let value = pick(change, side);
            if weights.len() == value.len() {
                weights.copy_from_slice(value);
            }
        }
        terrain.set_alphamaps(bounds.x, bounds.z, &splats);
    }
}

#[derive(Debug, Default)]
pub struct ModifyInstancesCommand {
    old_instances: Vec<ObjectInstance>,
    new_instances: Vec<ObjectInstance>,
}

impl ModifyInstancesCommand {
    pub fn new(old_instances: Vec<ObjectInstance>, new_instances: Vec<ObjectInstance>) -> Self {
        Self {
            old_instances,
            new_instances,
        }
    }
}

/// Smallest region containing every changed cell. `None` if there are no changes or they do
/// not fit into the terrain anymore.
fn changed_region<V>(terrain: &Terrain, changes: &[CellChange<V>]) -> Option<Region> {
    let bounds = Region::bounding(changes.iter().map(|c| (c.position.x, c.position.y)))?;
    let resolution = terrain.resolution();
    if bounds.x + bounds.width > resolution || bounds.z + bounds.height > resolution {
        err!(
            "Command changes region {bounds:?} which is outside of {resolution}x{resolution} terrain!"
        );
        return None;
    }
    Some(bounds)
}

/// A stroke of a brush, captures only the terrain buffer the brush mode modifies.
#[derive(Debug)]
pub enum TerrainCommand {
    ModifyHeights(ModifyHeightsCommand),
    ModifySplats(ModifySplatsCommand),
    ModifyInstances(ModifyInstancesCommand),
}

impl TerrainCommand {
    /// Opens a new command for a stroke that modifies the given buffer. Instances are small, so
    /// the whole list is captured right away. Heights and splats are captured cell by cell by the
    /// stroke.
    pub fn open(target: StrokeTarget, terrain: &Terrain) -> Self {
        match target {
            StrokeTarget::Heights => Self::ModifyHeights(Default::default()),
            StrokeTarget::Splats => Self::ModifySplats(Default::default()),
            StrokeTarget::Instances => Self::ModifyInstances(ModifyInstancesCommand::new(
                terrain.instances().to_vec(),
                Default::default(),
            )),
        }
    }

    /// Captures the state of the terrain after the stroke.
    pub fn complete(&mut self, terrain: &Terrain, stroke: BrushStroke) {
        match self {
            TerrainCommand::ModifyHeights(command) => {
                let heights = terrain.heights();
                command.changes = stroke
                    .height_cells
                    .into_changes(|p| heights[(p.x, p.y)]);
            }
            TerrainCommand::ModifySplats(command) => {
                let splats = terrain.splats();
                command.changes = stroke
                    .splat_cells
                    .into_changes(|p| splats.weights(p.x, p.y).into());
            }
            TerrainCommand::ModifyInstances(command) => {
                command.new_instances = terrain.instances().to_vec();
            }
        }
    }

    /// Whether the command leaves the terrain as it was.
    pub fn is_empty(&self) -> bool {
        match self {
            TerrainCommand::ModifyHeights(command) => command.changes.is_empty(),
            TerrainCommand::ModifySplats(command) => command.changes.is_empty(),
            TerrainCommand::ModifyInstances(command) => {
                command.old_instances == command.new_instances
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TerrainCommand::ModifyHeights(_) => "Modify Terrain Heights",
            TerrainCommand::ModifySplats(_) => "Modify Terrain Splats",
            TerrainCommand::ModifyInstances(_) => "Modify Terrain Objects",
        }
    }

    /// Puts the terrain into the state it had after the stroke.
    pub fn execute(&mut self, terrain: &mut Terrain) {
        match self {
            TerrainCommand::ModifyHeights(command) => command.write(terrain, Side::After),
            TerrainCommand::ModifySplats(command) => command.write(terrain, Side::After),
            TerrainCommand::ModifyInstances(command) => {
                terrain.set_instances(command.new_instances.clone())
            }
        }
    }

    /// Puts the terrain into the state it had before the stroke.
    pub fn revert(&mut self, terrain: &mut Terrain) {
        match self {
            TerrainCommand::ModifyHeights(command) => command.write(terrain, Side::Before),
            TerrainCommand::ModifySplats(command) => command.write(terrain, Side::Before),
            TerrainCommand::ModifyInstances(command) => {
                terrain.set_instances(command.old_instances.clone())
            }
        }
    }
}

/// Undo and redo sequences of completed commands, most recent first.
pub struct CommandHistory {
    undo: VecDeque<TerrainCommand>,
    redo: VecDeque<TerrainCommand>,
    max_depth: usize,
    debug: bool,
}

impl CommandHistory {
    pub fn new(debug: bool, max_depth: usize) -> Self {
        Self {
            undo: Default::default(),
            redo: Default::default(),
            max_depth: max_depth.max(1),
            debug,
        }
    }

    /// Adds a completed command. The oldest command is dropped when the history is full, every
    /// undone command is dropped as well.
    pub fn register(&mut self, command: TerrainCommand) {
        if self.debug {
            info!("Registering command {}", command.name());
        }

        self.undo.push_front(command);
        while self.undo.len() > self.max_depth {
            if let Some(dropped) = self.undo.pop_back() {
                if self.debug {
                    info!("Dropping command {}", dropped.name());
                }
            }
        }
        self.redo.clear();
    }

    /// Reverts the most recent command. Returns `false` if there is nothing to undo.
    pub fn undo(&mut self, terrain: &mut Terrain) -> bool {
        let Some(mut command) = self.undo.pop_front() else {
            return false;
        };
        if self.debug {
            info!("Undo command {}", command.name());
        }
        command.revert(terrain);
        self.redo.push_front(command);
        true
    }

    /// Executes the most recently undone command. Returns `false` if there is nothing to redo.
    pub fn redo(&mut self, terrain: &mut Terrain) -> bool {
        let Some(mut command) = self.redo.pop_front() else {
            return false;
        };
        if self.debug {
            info!("Redo command {}", command.name());
        }
        command.execute(terrain);
        self.undo.push_front(command);
        true
    }

    pub fn clear(&mut self) {
        if self.debug {
            info!(
                "Clearing history of {} commands",
                self.undo.len() + self.redo.len()
            );
        }
        self.undo.clear();
        self.redo.clear();
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[inline]
    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    #[inline]
    pub fn redo_count(&self) -> usize {
        self.redo.len()
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sculpt_core::{
        algebra::{Vector2, Vector3},
        brush::{Brush, BrushEffectMode, BrushKernel},
        terrain::TerrainSize,
    };
    use rand::{rngs::StdRng, SeedableRng};

    fn instance(x: f32) -> ObjectInstance {
        ObjectInstance {
            position: Vector2::new(x, 0.5),
            ..Default::default()
        }
    }

    fn marker(i: usize) -> TerrainCommand {
        TerrainCommand::ModifyInstances(ModifyInstancesCommand::new(
            Vec::new(),
            vec![instance(i as f32 / 1000.0)],
        ))
    }

    fn marker_of(command: &TerrainCommand) -> usize {
        match command {
            TerrainCommand::ModifyInstances(c) => {
                (c.new_instances[0].position.x * 1000.0).round() as usize
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn oldest_commands_are_evicted() {
        let mut history = CommandHistory::new(false, 100);
        for i in 0..101 {
            history.register(marker(i));
        }
        assert_eq!(history.undo_count(), 100);
        assert_eq!(history.undo.front().map(marker_of), Some(100));
        assert_eq!(history.undo.back().map(marker_of), Some(1));
    }

    #[test]
    fn new_command_clears_redo() {
        let mut terrain = Terrain::new(TerrainSize::Size128, 1, 600.0);
        let mut history = CommandHistory::new(true, 10);
        history.register(marker(1));
        history.register(marker(2));

        assert!(history.undo(&mut terrain));
        assert_eq!(history.redo_count(), 1);

        history.register(marker(3));
        assert!(!history.can_redo());
        assert!(!history.redo(&mut terrain));
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn empty_history_does_nothing() {
        let mut terrain = Terrain::new(TerrainSize::Size128, 1, 600.0);
        let mut history = CommandHistory::new(false, 10);
        assert!(!history.undo(&mut terrain));
        assert!(!history.redo(&mut terrain));
        history.clear();
        assert_eq!(history.undo_count() + history.redo_count(), 0);
    }

    #[test]
    fn height_command_restores_only_touched_cells() {
        let mut terrain = Terrain::new(TerrainSize::Size128, 2, 600.0);
        let brush = Brush {
            strength: 0.5,
            ..Default::default()
        };
        let kernel = BrushKernel::filled(3, 1.0);
        let mut rng = StdRng::seed_from_u64(1);

        let mut command = TerrainCommand::open(StrokeTarget::Heights, &terrain);
        let mut stroke = BrushStroke::new(BrushEffectMode::Raise);
        for x in [10.5, 11.5, 12.5] {
            stroke.apply(&mut terrain, &brush, &kernel, Vector3::new(x, 0.0, 20.5), &mut rng);
        }
        command.complete(&terrain, stroke);
        let after = terrain.heights().clone();

        match &command {
            TerrainCommand::ModifyHeights(c) => assert_eq!(c.changes().len(), 5 * 3),
            _ => unreachable!(),
        }

        command.revert(&mut terrain);
        assert!(terrain.heights().iter().all(|h| *h == 0.0));

        command.execute(&mut terrain);
        assert_eq!(terrain.heights(), &after);
    }

    #[test]
    fn splat_command_restores_weights() {
        let mut terrain = Terrain::new(TerrainSize::Size128, 3, 600.0);
        let before = terrain.splats().clone();
        let brush = Brush {
            strength: 0.2,
            paint_layer: 1,
            ..Default::default()
        };
        let kernel = BrushKernel::filled(4, 1.0);
        let mut rng = StdRng::seed_from_u64(1);

        let mut command = TerrainCommand::open(StrokeTarget::Splats, &terrain);
        let mut stroke = BrushStroke::new(BrushEffectMode::Paint);
        stroke.apply(&mut terrain, &brush, &kernel, Vector3::new(64.0, 0.0, 64.0), &mut rng);
        command.complete(&terrain, stroke);
        let after = terrain.splats().clone();

        command.revert(&mut terrain);
        assert_eq!(terrain.splats(), &before);
        command.execute(&mut terrain);
        assert_eq!(terrain.splats(), &after);
    }

    #[test]
    fn instance_command_swaps_whole_list() {
        let mut terrain = Terrain::new(TerrainSize::Size128, 1, 600.0);
        terrain.add_instance(instance(0.1));

        let mut command = TerrainCommand::open(StrokeTarget::Instances, &terrain);
        terrain.add_instance(instance(0.2));
        command.complete(&terrain, BrushStroke::new(BrushEffectMode::ObjectAdd));

        command.revert(&mut terrain);
        assert_eq!(terrain.instances(), &[instance(0.1)]);
        command.execute(&mut terrain);
        assert_eq!(terrain.instances(), &[instance(0.1), instance(0.2)]);
        assert_eq!(command.name(), "Modify Terrain Objects");
    }
}
