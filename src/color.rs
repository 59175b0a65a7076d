use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.70, 0.50);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Priority label → Color32
// ---------------------------------------------------------------------------

/// Stable colour per priority label, shared by the checkboxes, the table and
/// the timeline.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Well-known labels get conventional colours; the rest share a palette.
    pub fn new(labels: &BTreeSet<String>) -> Self {
        let others: Vec<&String> = labels
            .iter()
            .filter(|l| conventional_color(l).is_none())
            .collect();
        let mut palette = generate_palette(others.len()).into_iter();

        let mapping = labels
            .iter()
            .map(|label| {
                let color = conventional_color(label)
                    .or_else(|| palette.next())
                    .unwrap_or(Color32::GRAY);
                (label.clone(), color)
            })
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

fn conventional_color(label: &str) -> Option<Color32> {
    match label {
        "High" => Some(Color32::from_rgb(220, 70, 60)),
        "Medium" => Some(Color32::from_rgb(230, 160, 40)),
        "Low" => Some(Color32::from_rgb(80, 170, 90)),
        _ => None,
    }
}
