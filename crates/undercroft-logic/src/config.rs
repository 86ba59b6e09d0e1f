//! Floor sizing tiers, room size templates and the theme table.
//!
//! Deeper floors get more rooms on a wider map. The tier table is the
//! only place floor indices turn into sizes:
//!
//! | Floors | Rooms | Extent |
//! |--------|-------|--------|
//! | 1–3    | 5–7   | 200    |
//! | 4–7    | 8–11  | 280    |
//! | 8+     | 12–20 | 400    |
//!
//! ```
//! use undercroft_logic::config::determine_dungeon_size;
//!
//! let size = determine_dungeon_size(2);
//! assert_eq!((size.min_rooms, size.max_rooms, size.extent), (5, 7, 200.0));
//! ```

use crate::constants::{corridors, objectives, spacing};
use crate::space::Classification;
use serde::{Deserialize, Serialize};

/// Room count range and square map extent for one floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorSize {
    /// Lower bound of the sampled primary-room cap. Not a guaranteed
    /// count: missed trials and dropped rooms leave a floor below it.
    pub min_rooms: u32,
    /// Upper bound of the sampled primary-room cap (spawn room included,
    /// alcoves excluded). No floor exceeds it.
    pub max_rooms: u32,
    /// Side length of the square map, in world units.
    pub extent: f32,
}

impl Default for FloorSize {
    fn default() -> Self {
        determine_dungeon_size(1)
    }
}

impl FloorSize {
    /// Ring spacing scaled to this map's extent.
    pub fn spacing(&self) -> f32 {
        spacing::BASE * self.extent / spacing::REFERENCE_EXTENT
    }

    /// Describe every way this size cannot produce a floor.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.min_rooms < 2 {
            problems.push(format!(
                "min_rooms must be at least 2 (spawn + one radial), got {}",
                self.min_rooms
            ));
        }
        if self.min_rooms > self.max_rooms {
            problems.push(format!(
                "min_rooms {} exceeds max_rooms {}",
                self.min_rooms, self.max_rooms
            ));
        }
        if !self.extent.is_finite() || self.extent <= 0.0 {
            problems.push(format!("extent must be positive, got {}", self.extent));
        } else if self.extent < spacing::REFERENCE_EXTENT {
            // Below the reference extent the rings squeeze together and
            // cardinal-plus rooms collide with their radial parents.
            problems.push(format!(
                "extent {} is below the minimum of {}",
                self.extent,
                spacing::REFERENCE_EXTENT
            ));
        }
        problems
    }
}

/// Map a floor index to its size tier. Floor 0 is treated as floor 1.
pub fn determine_dungeon_size(floor_index: u32) -> FloorSize {
    match floor_index {
        0..=3 => FloorSize {
            min_rooms: 5,
            max_rooms: 7,
            extent: 200.0,
        },
        4..=7 => FloorSize {
            min_rooms: 8,
            max_rooms: 11,
            extent: 280.0,
        },
        _ => FloorSize {
            min_rooms: 12,
            max_rooms: 20,
            extent: 400.0,
        },
    }
}

/// Uniform width/depth range for a room classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeTemplate {
    pub min: f32,
    pub max: f32,
}

impl SizeTemplate {
    pub fn for_classification(classification: Classification) -> Self {
        match classification {
            Classification::Spawn => Self { min: 20.0, max: 28.0 },
            Classification::Radial => Self { min: 16.0, max: 24.0 },
            Classification::Cardinal => Self { min: 14.0, max: 22.0 },
            Classification::CardinalPlus => Self { min: 12.0, max: 20.0 },
            Classification::Corridor => Self {
                min: corridors::WIDTH,
                max: corridors::WIDTH,
            },
            Classification::Alcove | Classification::Normal => Self { min: 8.0, max: 16.0 },
        }
    }
}

/// Visual family of a floor. Only the structural parameters matter here;
/// rendering picks materials from the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub wall_height: f32,
    pub wall_thickness: f32,
}

/// Built-in theme table, one entry per size tier.
pub fn default_themes() -> Vec<Theme> {
    vec![
        Theme {
            name: "Crypt".to_string(),
            wall_height: 4.0,
            wall_thickness: 0.5,
        },
        Theme {
            name: "Catacombs".to_string(),
            wall_height: 4.5,
            wall_thickness: 0.6,
        },
        Theme {
            name: "Abyss".to_string(),
            wall_height: 6.0,
            wall_thickness: 0.8,
        },
    ]
}

/// Pick a theme for a floor. Tiers index the table; deeper floors than
/// the table covers reuse its last entry.
pub fn select_theme(themes: &[Theme], floor_index: u32) -> Option<&Theme> {
    let tier = match floor_index {
        0..=3 => 0,
        4..=7 => 1,
        _ => 2,
    };
    themes.get(tier).or_else(|| themes.last())
}

/// When the non-critical population stage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PopulationMode {
    /// Inside the pipeline, right after decorations.
    #[default]
    Immediate,
    /// Left pending; the caller triggers it after a delay of its choosing.
    Deferred,
}

/// Knobs for a [`FloorGenerator`](crate::pipeline::FloorGenerator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    pub themes: Vec<Theme>,
    pub population: PopulationMode,
    /// Horizontal reach of the exit and key triggers.
    pub exit_radius: f32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            themes: default_themes(),
            population: PopulationMode::Immediate,
            exit_radius: objectives::EXIT_RADIUS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_tiers() {
        for floor in 1..=3 {
            let s = determine_dungeon_size(floor);
            assert_eq!((s.min_rooms, s.max_rooms), (5, 7));
            assert_eq!(s.extent, 200.0);
        }
        for floor in 4..=7 {
            let s = determine_dungeon_size(floor);
            assert_eq!((s.min_rooms, s.max_rooms), (8, 11));
            assert_eq!(s.extent, 280.0);
        }
        for floor in [8, 9, 50, u32::MAX] {
            let s = determine_dungeon_size(floor);
            assert_eq!((s.min_rooms, s.max_rooms), (12, 20));
            assert_eq!(s.extent, 400.0);
        }
    }

    #[test]
    fn test_floor_zero_is_first_tier() {
        assert_eq!(determine_dungeon_size(0), determine_dungeon_size(1));
    }

    #[test]
    fn test_tier_sizes_are_valid() {
        for floor in [1, 4, 8] {
            let problems = determine_dungeon_size(floor).problems();
            assert!(problems.is_empty(), "floor {}: {:?}", floor, problems);
        }
    }

    #[test]
    fn test_invalid_sizes_reported() {
        let size = FloorSize {
            min_rooms: 9,
            max_rooms: 3,
            extent: 200.0,
        };
        assert_eq!(size.problems().len(), 1);

        let size = FloorSize {
            min_rooms: 1,
            max_rooms: 3,
            extent: -5.0,
        };
        assert_eq!(size.problems().len(), 2);

        let size = FloorSize {
            min_rooms: 5,
            max_rooms: 7,
            extent: 60.0,
        };
        assert!(size.problems()[0].contains("below the minimum"));
    }

    #[test]
    fn test_spacing_scales_with_extent() {
        assert_eq!(determine_dungeon_size(1).spacing(), 16.0);
        assert_eq!(determine_dungeon_size(9).spacing(), 32.0);
    }

    #[test]
    fn test_theme_selection() {
        let themes = default_themes();
        assert_eq!(select_theme(&themes, 1).unwrap().name, "Crypt");
        assert_eq!(select_theme(&themes, 5).unwrap().name, "Catacombs");
        assert_eq!(select_theme(&themes, 12).unwrap().name, "Abyss");

        let single = vec![themes[0].clone()];
        assert_eq!(select_theme(&single, 12).unwrap().name, "Crypt");
        assert!(select_theme(&[], 1).is_none());
    }
}
