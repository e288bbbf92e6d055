//! Material to wall color table

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::frame::Rgb;
use crate::sim::Material;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub materials: BTreeMap<u8, Rgb>,
    /// Color for solid values missing from `materials`
    pub fallback: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            materials: BTreeMap::from([
                (3, Rgb::new(200, 160, 20)),
                (4, Rgb::new(80, 180, 80)),
                (5, Rgb::new(80, 80, 200)),
                (6, Rgb::new(180, 60, 60)),
            ]),
            fallback: Rgb::new(200, 160, 20),
        }
    }
}

impl Palette {
    /// Gold border with blue and red accents
    pub fn classic() -> Self {
        Self {
            materials: BTreeMap::from([
                (3, Rgb::new(200, 180, 0)),
                (4, Rgb::new(100, 100, 255)),
                (5, Rgb::new(255, 100, 100)),
            ]),
            fallback: Rgb::new(150, 150, 150),
        }
    }

    pub fn color(&self, material: Material) -> Rgb {
        self.materials
            .get(&material.0)
            .copied()
            .unwrap_or(self.fallback)
    }

    /// Solid material ids with a color, in ascending order
    pub fn solid_materials(&self) -> Vec<u8> {
        self.materials
            .keys()
            .copied()
            .filter(|&m| Material(m).is_solid())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_fallback() {
        let palette = Palette::classic();
        assert_eq!(palette.color(Material::BORDER), Rgb::new(200, 180, 0));
        assert_eq!(palette.color(Material(9)), Rgb::new(150, 150, 150));
        assert_eq!(Palette::default().solid_materials(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_json_keys_are_numbers_as_strings() {
        let palette: Palette =
            serde_json::from_str(r#"{"materials": {"7": [1, 2, 3]}, "fallback": [9, 9, 9]}"#)
                .unwrap();
        assert_eq!(palette.color(Material(7)), Rgb::new(1, 2, 3));
        assert_eq!(palette.solid_materials(), vec![7]);
    }
}
