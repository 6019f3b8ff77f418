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

//! Stroke engine. A stroke is a sequence of brush ticks between pointer press and release, every
//! tick modifies a brush-sized part of a terrain. Cells are recorded the first time a stroke
//! touches them, so the whole stroke could be undone later by restoring just these cells.

use crate::{
    brush::{
        mapping::{self, BrushRegion},
        Brush, BrushEffectMode, BrushKernel, StrokeTarget,
    },
    grid::Grid,
    terrain::{Color, ObjectInstance, Terrain},
};
use fxhash::FxHashMap;
use nalgebra::{Vector2, Vector3};
use rand::Rng;
use std::f32::consts::TAU;

/// Minimum distance between instances of the same prototype is `1 / (strength * SCATTER_DENSITY)`.
pub const SCATTER_DENSITY: f32 = 500.0;

/// Original values of every cell a stroke has touched.
#[derive(Debug, Clone)]
pub struct StrokeData<V>(FxHashMap<Vector2<usize>, V>);

impl<V> Default for StrokeData<V> {
    fn default() -> Self {
        Self(Default::default())
    }
}

impl<V> StrokeData<V> {
    /// Reset the data so it is ready to record a new stroke.
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of the cell before the stroke began, if the stroke has touched it.
    #[inline]
    pub fn original(&self, position: Vector2<usize>) -> Option<&V> {
        self.0.get(&position)
    }

    /// Stores the value of a cell unless the cell was recorded earlier.
    #[inline]
    pub fn record<F>(&mut self, position: Vector2<usize>, value: F)
    where
        F: FnOnce() -> V,
    {
        self.0.entry(position).or_insert_with(value);
    }

    /// Pairs every recorded original value with the current one, cells that ended up unchanged
    /// are dropped.
    pub fn into_changes<F>(self, mut current: F) -> Vec<CellChange<V>>
    where
        F: FnMut(Vector2<usize>) -> V,
        V: PartialEq,
    {
        self.0
            .into_iter()
            .filter_map(|(position, before)| {
                let after = current(position);
                (before != after).then_some(CellChange {
                    position,
                    before,
                    after,
                })
            })
            .collect()
    }
}

/// Value of a single cell before and after a stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct CellChange<V> {
    pub position: Vector2<usize>,
    pub before: V,
    pub after: V,
}

/// Data for an in-progress stroke.
#[derive(Debug, Default)]
pub struct BrushStroke {
    mode: BrushEffectMode,
    mutations: usize,
    /// The height cells that have been modified.
    pub height_cells: StrokeData<f32>,
    /// Layer weights of the splat cells that have been modified.
    pub splat_cells: StrokeData<Box<[f32]>>,
}

impl BrushStroke {
    /// Starts a new stroke. The mode remains the same until the stroke ends.
    pub fn new(mode: BrushEffectMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    #[inline]
    pub fn mode(&self) -> BrushEffectMode {
        self.mode
    }

    #[inline]
    pub fn target(&self) -> StrokeTarget {
        self.mode.target()
    }

    /// Amount of ticks that have modified the terrain so far. Ticks that missed the terrain or
    /// were rejected are not counted.
    #[inline]
    pub fn mutations(&self) -> usize {
        self.mutations
    }

    /// Applies one tick of the stroke at a world-space hit. Returns `true` if the terrain was
    /// modified.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        terrain: &mut Terrain,
        brush: &Brush,
        kernel: &BrushKernel,
        hit: Vector3<f32>,
        rng: &mut R,
    ) -> bool {
        let modified = match self.mode {
            BrushEffectMode::Raise
            | BrushEffectMode::Lower
            | BrushEffectMode::Flatten
            | BrushEffectMode::Smooth => self.modify_heights(terrain, brush, kernel, hit),
            BrushEffectMode::Paint => self.paint(terrain, brush, kernel, hit),
            BrushEffectMode::ObjectAdd => add_object(terrain, brush, kernel.size(), hit, rng),
            BrushEffectMode::ObjectRemove => remove_object(terrain, kernel.size(), hit),
        };
        if modified {
            self.mutations += 1;
        }
        modified
    }

    fn brush_region(
        terrain: &Terrain,
        kernel: &BrushKernel,
        hit: Vector3<f32>,
    ) -> Option<BrushRegion> {
        let resolution = terrain.resolution();
        let corner = mapping::world_hit_to_heightmap(
            hit,
            terrain.origin(),
            terrain.world_size(),
            resolution,
            kernel.size(),
        );
        BrushRegion::clamp(corner, kernel.size(), resolution)
    }

    fn modify_heights(
        &mut self,
        terrain: &mut Terrain,
        brush: &Brush,
        kernel: &BrushKernel,
        hit: Vector3<f32>,
    ) -> bool {
        let Some(area) = Self::brush_region(terrain, kernel, hit) else {
            return false;
        };
        let cells = area.cells;
        let mut heights = terrain.get_heights(cells.x, cells.z, cells.width, cells.height);

        let targets = match self.mode {
            BrushEffectMode::Smooth => Some(neighbour_average(&heights)),
            _ => None,
        };

        for dz in 0..cells.height {
            for dx in 0..cells.width {
                let (kx, kz) = area.kernel_cell(dx, dz);
                let delta = kernel.influence(kx, kz) * brush.strength;
                let height = heights[(dx, dz)];

                self.height_cells
                    .record(Vector2::new(cells.x + dx, cells.z + dz), || height);

                heights[(dx, dz)] = match self.mode {
                    BrushEffectMode::Raise => height + delta,
                    BrushEffectMode::Lower => height - delta,
                    BrushEffectMode::Flatten => {
                        mapping::move_towards(height, brush.flatten_target, delta)
                    }
                    BrushEffectMode::Smooth => {
                        let average = targets
                            .as_ref()
                            .map_or(height, |averages| averages[(dx, dz)]);
                        mapping::move_towards(height, average, delta)
                    }
                    _ => height,
                };
            }
        }

        terrain.set_heights(cells.x, cells.z, &heights);
        true
    }

    fn paint(
        &mut self,
        terrain: &mut Terrain,
        brush: &Brush,
        kernel: &BrushKernel,
        hit: Vector3<f32>,
    ) -> bool {
        let Some(area) = Self::brush_region(terrain, kernel, hit) else {
            return false;
        };
        let cells = area.cells;
        let mut splats = terrain.get_alphamaps(cells.x, cells.z, cells.width, cells.height);
        let layer_count = splats.layer_count();
        if layer_count == 0 {
            return false;
        }
        let layer = brush.paint_layer.min(layer_count - 1);

        for dz in 0..cells.height {
            for dx in 0..cells.width {
                let (kx, kz) = area.kernel_cell(dx, dz);
                let amount = kernel.influence(kx, kz) * brush.strength * brush.paint_multiplier;
                let weights = splats.weights_mut(dx, dz);

                self.splat_cells
                    .record(Vector2::new(cells.x + dx, cells.z + dz), || {
                        weights.to_vec().into_boxed_slice()
                    });

                weights[layer] += amount;
                let sum = weights.iter().sum::<f32>();
                if sum > 0.0 {
                    for weight in weights.iter_mut() {
                        *weight /= sum;
                    }
                }
            }
        }

        terrain.set_alphamaps(cells.x, cells.z, &splats);
        true
    }
}

/// Average of every cell with its direct neighbours. Neighbours outside of the grid are skipped,
/// so edge cells average fewer values.
fn neighbour_average(heights: &Grid<f32>) -> Grid<f32> {
    let (width, height) = (heights.width(), heights.height());
    Grid::from_fn(width, height, |x, z| {
        let mut sum = heights[(x, z)];
        let mut count = 1;
        let neighbours = [
            (x.checked_add(1), Some(z)),
            (x.checked_sub(1), Some(z)),
            (Some(x), z.checked_add(1)),
            (Some(x), z.checked_sub(1)),
        ];
        for (nx, nz) in neighbours {
            if let Some(value) = nx.zip(nz).and_then(|(nx, nz)| heights.get(nx, nz)) {
                sum += *value;
                count += 1;
            }
        }
        sum / count as f32
    })
}

/// Uniformly distributed point within a circle of unit radius.
fn inside_unit_circle<R: Rng + ?Sized>(rng: &mut R) -> Vector2<f32> {
    loop {
        let point = Vector2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
        if point.norm_squared() <= 1.0 {
            return point;
        }
    }
}

fn random_in<R: Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    let (min, max) = if a <= b { (a, b) } else { (b, a) };
    rng.gen_range(min..=max)
}

fn add_object<R: Rng + ?Sized>(
    terrain: &mut Terrain,
    brush: &Brush,
    brush_size: usize,
    hit: Vector3<f32>,
    rng: &mut R,
) -> bool {
    let world_size = terrain.world_size();
    let offset = inside_unit_circle(rng).scale(0.5);
    let position = mapping::world_hit_to_normalized(hit, terrain.origin(), world_size)
        + Vector2::new(
            offset.x * brush_size as f32 / world_size.x,
            offset.y * brush_size as f32 / world_size.z,
        );

    if !(0.0..=1.0).contains(&position.x) || !(0.0..=1.0).contains(&position.y) {
        return false;
    }

    let scatter = &brush.objects;
    let spacing = 1.0 / (brush.strength * SCATTER_DENSITY);
    let crowded = terrain
        .instances()
        .iter()
        .filter(|instance| instance.prototype == scatter.prototype)
        .any(|instance| instance.distance_to(position) < spacing);
    if crowded {
        return false;
    }

    terrain.add_instance(ObjectInstance {
        position,
        height_scale: random_in(rng, scatter.height_min, scatter.height_max),
        width_scale: random_in(rng, scatter.width_min, scatter.width_max),
        rotation: rng.gen_range(0.0..TAU),
        color: Color::WHITE,
        prototype: scatter.prototype,
    });
    true
}

fn remove_object(terrain: &mut Terrain, brush_size: usize, hit: Vector3<f32>) -> bool {
    let position = mapping::world_hit_to_normalized(hit, terrain.origin(), terrain.world_size());
    let radius = brush_size as f32 / terrain.resolution() as f32;
    terrain.remove_instance_near(position, radius).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainSize;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn terrain() -> Terrain {
        Terrain::new(TerrainSize::Size128, 3, 600.0)
    }

    // Hit that maps a brush of the given size to the top-left corner `(x, z)`.
    fn hit_at(x: usize, z: usize, size: usize) -> Vector3<f32> {
        let half = (size / 2) as f32;
        Vector3::new(x as f32 + half + 0.5, 0.0, z as f32 + half + 0.5)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn raise_modifies_only_brush_cells() {
        let mut terrain = terrain();
        let brush = Brush {
            strength: 1.0,
            ..Default::default()
        };
        let kernel = BrushKernel::filled(4, 1.0);
        let mut stroke = BrushStroke::new(BrushEffectMode::Raise);

        assert!(stroke.apply(&mut terrain, &brush, &kernel, hit_at(2, 2, 4), &mut rng()));

        for z in 0..128 {
            for x in 0..128 {
                let expected = if (2..6).contains(&x) && (2..6).contains(&z) {
                    1.0
                } else {
                    0.0
                };
                assert_eq!(terrain.heights()[(x, z)], expected, "cell ({x}, {z})");
            }
        }
        assert_eq!(stroke.height_cells.len(), 16);
        assert_eq!(stroke.mutations(), 1);
    }

    #[test]
    fn originals_are_recorded_on_first_touch_only() {
        let mut terrain = terrain();
        let brush = Brush {
            strength: 0.25,
            ..Default::default()
        };
        let kernel = BrushKernel::filled(2, 1.0);
        let mut stroke = BrushStroke::new(BrushEffectMode::Raise);
        for _ in 0..3 {
            stroke.apply(&mut terrain, &brush, &kernel, hit_at(10, 10, 2), &mut rng());
        }

        assert_relative_eq!(terrain.heights()[(10, 10)], 0.75);
        assert_eq!(stroke.height_cells.original(Vector2::new(10, 10)), Some(&0.0));

        let changes = stroke
            .height_cells
            .into_changes(|p| terrain.heights()[(p.x, p.y)]);
        assert_eq!(changes.len(), 4);
        assert!(changes.iter().all(|c| c.before == 0.0 && c.after == 0.75));
    }

    #[test]
    fn brush_over_the_edge_touches_only_inner_cells() {
        let mut terrain = terrain();
        let brush = Brush {
            strength: 1.0,
            ..Default::default()
        };
        let kernel = BrushKernel::filled(6, 1.0);
        let mut stroke = BrushStroke::new(BrushEffectMode::Raise);

        // Brush centered at the very corner of the terrain.
        let hit = Vector3::new(127.5, 0.0, 127.5);
        assert!(stroke.apply(&mut terrain, &brush, &kernel, hit, &mut rng()));

        let raised = terrain.heights().iter().filter(|h| **h == 1.0).count();
        assert_eq!(raised, 4 * 4);
        assert_eq!(terrain.heights()[(127, 127)], 1.0);
        assert_eq!(terrain.heights()[(123, 127)], 0.0);

        let outside = Vector3::new(-50.0, 0.0, -50.0);
        assert!(!stroke.apply(&mut terrain, &brush, &kernel, outside, &mut rng()));
        assert_eq!(stroke.mutations(), 1);
    }

    #[test]
    fn heights_stay_within_normalized_range() {
        let mut terrain = terrain();
        let brush = Brush {
            strength: 1.0,
            ..Default::default()
        };
        let kernel = BrushKernel::filled(3, 1.0);

        let mut lower = BrushStroke::new(BrushEffectMode::Lower);
        assert!(lower.apply(&mut terrain, &brush, &kernel, hit_at(30, 30, 3), &mut rng()));
        assert!(terrain.heights().iter().all(|h| *h == 0.0));

        let mut raise = BrushStroke::new(BrushEffectMode::Raise);
        for _ in 0..3 {
            raise.apply(&mut terrain, &brush, &kernel, hit_at(30, 30, 3), &mut rng());
        }
        assert_eq!(terrain.heights()[(31, 31)], 1.0);
        assert_eq!(terrain.heights().iter().copied().fold(0.0, f32::max), 1.0);
    }

    #[test]
    fn rejected_ticks_are_not_counted() {
        let mut terrain = terrain();
        let brush = Brush {
            strength: 0.1,
            ..Default::default()
        };
        let kernel = BrushKernel::filled(1, 1.0);
        let hit = Vector3::new(64.0, 0.0, 64.0);
        let mut stroke = BrushStroke::new(BrushEffectMode::ObjectAdd);

        assert!(stroke.apply(&mut terrain, &brush, &kernel, hit, &mut rng()));
        assert!(!stroke.apply(&mut terrain, &brush, &kernel, hit, &mut rng()));
        assert_eq!(stroke.mutations(), 1);

        let mut missed = BrushStroke::new(BrushEffectMode::Raise);
        let outside = Vector3::new(-500.0, 0.0, -500.0);
        assert!(!missed.apply(&mut terrain, &brush, &kernel, outside, &mut rng()));
        assert_eq!(missed.mutations(), 0);
    }

    #[test]
    fn flatten_converges_without_overshoot() {
        let mut terrain = terrain();
        let brush = Brush {
            strength: 0.03,
            flatten_target: 0.16,
            ..Default::default()
        };
        let kernel = BrushKernel::filled(3, 1.0);
        let mut stroke = BrushStroke::new(BrushEffectMode::Flatten);

        let mut previous = terrain.heights()[(21, 21)];
        for _ in 0..10 {
            stroke.apply(&mut terrain, &brush, &kernel, hit_at(20, 20, 3), &mut rng());
            let height = terrain.heights()[(21, 21)];
            assert!(height >= previous);
            assert!(height <= 0.16);
            previous = height;
        }
        assert_relative_eq!(previous, 0.16);
    }

    #[test]
    fn smooth_moves_heights_to_neighbour_average() {
        let mut terrain = terrain();
        let mut spike = terrain.get_heights(50, 50, 1, 1);
        spike[(0, 0)] = 1.0;
        terrain.set_heights(50, 50, &spike);

        let brush = Brush {
            strength: 1.0,
            ..Default::default()
        };
        let kernel = BrushKernel::filled(3, 1.0);
        let mut stroke = BrushStroke::new(BrushEffectMode::Smooth);
        stroke.apply(&mut terrain, &brush, &kernel, hit_at(49, 49, 3), &mut rng());

        // Centre averages itself with 4 neighbours, the direct neighbour at the region edge
        // averages itself with 3 available neighbours.
        assert_relative_eq!(terrain.heights()[(50, 50)], 0.2);
        assert_relative_eq!(terrain.heights()[(50, 49)], 0.25);
        assert_relative_eq!(terrain.heights()[(49, 49)], 0.0);
    }

    #[test]
    fn neighbour_average_handles_grid_edges() {
        let grid = Grid::from_fn(2, 2, |x, z| (x + 2 * z) as f32);
        let average = neighbour_average(&grid);
        // (0 + 1 + 2) / 3
        assert_relative_eq!(average[(0, 0)], 1.0);
        // (3 + 2 + 1) / 3
        assert_relative_eq!(average[(1, 1)], 2.0);
    }

    #[test]
    fn paint_keeps_weights_normalized() {
        let mut terrain = terrain();
        let brush = Brush {
            strength: 0.05,
            paint_layer: 2,
            ..Default::default()
        };
        let kernel = BrushKernel::filled(5, 0.5);
        let mut stroke = BrushStroke::new(BrushEffectMode::Paint);
        for _ in 0..5 {
            stroke.apply(&mut terrain, &brush, &kernel, hit_at(0, 0, 5), &mut rng());
        }

        let splats = terrain.splats();
        for z in 0..8 {
            for x in 0..8 {
                let sum = splats.weights(x, z).iter().sum::<f32>();
                assert_relative_eq!(sum, 1.0, epsilon = 1.0e-5);
            }
        }
        assert!(splats.weight(2, 2, 2) > 0.9);
        assert_eq!(splats.weights(6, 6), &[1.0, 0.0, 0.0]);
        assert_eq!(
            stroke.splat_cells.original(Vector2::new(1, 1)).map(|w| &w[..]),
            Some(&[1.0, 0.0, 0.0][..])
        );
    }

    #[test]
    fn paint_layer_index_is_clamped() {
        let mut terrain = terrain();
        let brush = Brush {
            strength: 1.0,
            paint_layer: 10,
            ..Default::default()
        };
        let kernel = BrushKernel::filled(1, 1.0);
        let mut stroke = BrushStroke::new(BrushEffectMode::Paint);
        stroke.apply(&mut terrain, &brush, &kernel, hit_at(4, 4, 1), &mut rng());
        assert!(terrain.splats().weight(4, 4, 2) > 0.9);
    }

    #[test]
    fn objects_respect_spacing_per_prototype() {
        let mut terrain = terrain();
        let mut brush = Brush {
            strength: 0.1,
            ..Default::default()
        };
        let kernel = BrushKernel::filled(1, 1.0);
        let hit = Vector3::new(64.0, 0.0, 64.0);
        let mut rng = rng();
        let mut stroke = BrushStroke::new(BrushEffectMode::ObjectAdd);

        assert!(stroke.apply(&mut terrain, &brush, &kernel, hit, &mut rng));
        assert!(!stroke.apply(&mut terrain, &brush, &kernel, hit, &mut rng));
        assert_eq!(terrain.instances().len(), 1);

        brush.objects.prototype = 1;
        assert!(stroke.apply(&mut terrain, &brush, &kernel, hit, &mut rng));

        let instance = &terrain.instances()[1];
        assert_eq!(instance.prototype, 1);
        assert_eq!(instance.color, Color::WHITE);
        assert!((0.8..=1.2).contains(&instance.height_scale));
        assert!((0.0..TAU).contains(&instance.rotation));
        assert!((instance.position - Vector2::new(0.5, 0.5)).norm() <= 0.5 / 128.0 + 1.0e-6);
    }

    #[test]
    fn objects_outside_terrain_are_rejected() {
        let mut terrain = terrain();
        let brush = Brush::default();
        let kernel = BrushKernel::filled(1, 1.0);
        let mut stroke = BrushStroke::new(BrushEffectMode::ObjectAdd);
        let hit = Vector3::new(-10.0, 0.0, 64.0);
        assert!(!stroke.apply(&mut terrain, &brush, &kernel, hit, &mut rng()));
        assert!(terrain.instances().is_empty());
    }

    #[test]
    fn remove_takes_one_instance_per_tick() {
        let mut terrain = terrain();
        for x in [0.5, 0.501, 0.502] {
            terrain.add_instance(ObjectInstance {
                position: Vector2::new(x, 0.5),
                ..Default::default()
            });
        }
        let kernel = BrushKernel::filled(4, 1.0);
        let mut stroke = BrushStroke::new(BrushEffectMode::ObjectRemove);
        let hit = Vector3::new(64.0, 0.0, 64.0);

        assert!(stroke.apply(&mut terrain, &Brush::default(), &kernel, hit, &mut rng()));
        assert_eq!(terrain.instances().len(), 2);
        assert_eq!(terrain.instances()[0].position.x, 0.501);
    }
}
