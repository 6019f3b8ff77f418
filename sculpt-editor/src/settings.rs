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

//! Editor settings stored in a ron file.

use crate::error::SettingsError;
use ron::ser::PrettyConfig;
use sculpt_core::terrain::TerrainSize;
use serde::{Deserialize, Serialize};
use std::{fs::File, path::Path, path::PathBuf};

#[derive(Deserialize, Serialize, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct BrushSettings {
    pub size_min: usize,
    pub size_max: usize,
    pub size_default: usize,
    pub strength_default: f32,
    pub max_strength: f32,
    /// Stamp images, the built-in solid stamp is used when empty.
    pub textures: Vec<PathBuf>,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            size_min: 1,
            size_max: 100,
            size_default: 10,
            strength_default: 0.5,
            max_strength: 1.0,
            textures: Default::default(),
        }
    }
}

#[derive(Deserialize, Serialize, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct FlattenSettings {
    pub height_min: f32,
    pub height_max: f32,
    pub height_default: f32,
    /// Converts flatten height to normalized terrain height.
    pub stroke_multiplier: f32,
}

impl Default for FlattenSettings {
    fn default() -> Self {
        Self {
            height_min: 0.0,
            height_max: 600.0,
            height_default: 100.0,
            stroke_multiplier: 0.0016,
        }
    }
}

#[derive(Deserialize, Serialize, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct PaintSettings {
    /// Names of paint layers, their count defines the amount of splat layers.
    pub layers: Vec<String>,
    pub stroke_multiplier: f32,
}

impl Default for PaintSettings {
    fn default() -> Self {
        Self {
            layers: vec!["Grass".to_owned(), "Dirt".to_owned(), "Rock".to_owned()],
            stroke_multiplier: 80.0,
        }
    }
}

#[derive(Deserialize, Serialize, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct ObjectSettings {
    pub prototypes: Vec<String>,
    pub height_min: f32,
    pub height_max: f32,
    pub width_min: f32,
    pub width_max: f32,
}

impl Default for ObjectSettings {
    fn default() -> Self {
        Self {
            prototypes: vec!["Tree".to_owned(), "Bush".to_owned()],
            height_min: 0.8,
            height_max: 1.2,
            width_min: 0.8,
            width_max: 1.2,
        }
    }
}

#[derive(Deserialize, Serialize, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct HistorySettings {
    pub max_depth: usize,
    /// Log every registered, undone and redone command.
    pub debug: bool,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_depth: 100,
            debug: false,
        }
    }
}

#[derive(Deserialize, Serialize, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct TerrainSettings {
    pub size: TerrainSize,
    /// Vertical world extent of the terrain.
    pub height: f32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            size: TerrainSize::Size128,
            height: 600.0,
        }
    }
}

#[derive(Deserialize, Serialize, PartialEq, Clone, Default, Debug)]
#[serde(default)]
pub struct EditorSettings {
    pub brush: BrushSettings,
    pub flatten: FlattenSettings,
    pub paint: PaintSettings,
    pub objects: ObjectSettings,
    pub history: HistorySettings,
    pub terrain: TerrainSettings,
    /// Seed of the object scattering random generator, entropy is used when absent.
    pub seed: Option<u64>,
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if b < a {
        (b, a)
    } else {
        (a, b)
    }
}

impl EditorSettings {
    pub const FILE_NAME: &'static str = "terrain_sculpt.ron";

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let file = File::open(path)?;
        let settings: Self = ron::de::from_reader(file)?;
        Ok(settings.sanitized())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let file = File::create(path)?;
        ron::ser::to_writer_pretty(file, self, PrettyConfig::default())?;
        Ok(())
    }

    /// Fixes inverted ranges, clamps defaults into their ranges and makes sure there is at least
    /// one paint layer.
    pub fn sanitized(mut self) -> Self {
        let brush = &mut self.brush;
        (brush.size_min, brush.size_max) = ordered(brush.size_min.max(1), brush.size_max.max(1));
        brush.size_default = brush.size_default.clamp(brush.size_min, brush.size_max);
        brush.max_strength = brush.max_strength.max(0.0);
        brush.strength_default = brush.strength_default.clamp(0.0, brush.max_strength);

        let flatten = &mut self.flatten;
        (flatten.height_min, flatten.height_max) = ordered(flatten.height_min, flatten.height_max);
        flatten.height_default = flatten
            .height_default
            .clamp(flatten.height_min, flatten.height_max);

        if self.paint.layers.is_empty() {
            self.paint.layers = PaintSettings::default().layers;
        }

        let objects = &mut self.objects;
        (objects.height_min, objects.height_max) = ordered(objects.height_min, objects.height_max);
        (objects.width_min, objects.width_max) = ordered(objects.width_min, objects.width_max);

        self.history.max_depth = self.history.max_depth.max(1);

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_and_out_of_range_values_are_fixed() {
        let mut settings = EditorSettings::default();
        settings.brush.size_min = 50;
        settings.brush.size_max = 5;
        settings.brush.size_default = 70;
        settings.brush.strength_default = 3.0;
        settings.flatten.height_default = -10.0;
        settings.paint.layers.clear();
        settings.objects.width_min = 2.0;
        settings.objects.width_max = 1.0;

        let settings = settings.sanitized();

        assert_eq!((settings.brush.size_min, settings.brush.size_max), (5, 50));
        assert_eq!(settings.brush.size_default, 50);
        assert_eq!(settings.brush.strength_default, 1.0);
        assert_eq!(settings.flatten.height_default, 0.0);
        assert_eq!(settings.paint.layers.len(), 3);
        assert_eq!((settings.objects.width_min, settings.objects.width_max), (1.0, 2.0));
    }

    #[test]
    fn settings_survive_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "terrain_sculpt_settings_{}.ron",
            std::process::id()
        ));
        let mut settings = EditorSettings::default();
        settings.terrain.size = TerrainSize::Size512;
        settings.seed = Some(42);

        settings.save(&path).unwrap();
        let loaded = EditorSettings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, settings);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: EditorSettings =
            ron::from_str("(brush: (size_default: 20), history: (debug: true))").unwrap();
        assert_eq!(settings.brush.size_default, 20);
        assert_eq!(settings.brush.size_max, 100);
        assert!(settings.history.debug);
        assert_eq!(settings.history.max_depth, 100);
        assert_eq!(settings.terrain.size, TerrainSize::Size128);
    }

    #[test]
    fn broken_file_is_reported() {
        let path = std::env::temp_dir().join(format!(
            "terrain_sculpt_broken_{}.ron",
            std::process::id()
        ));
        std::fs::write(&path, "(brush: [").unwrap();
        let result = EditorSettings::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(SettingsError::Deserialize(_))));
        assert!(matches!(
            EditorSettings::load("no/such/dir/settings.ron"),
            Err(SettingsError::Io(_))
        ));
    }
}
