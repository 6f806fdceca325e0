use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use benchscope::data::model::{Delta, RankChange};

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
            let hsl = Hsl::new(hue, 0.75, 0.55);
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
// Hotspot annotations
// ---------------------------------------------------------------------------

/// Text colour for a hotspot cell; unchanged and unannotated cells keep the default.
pub fn delta_color(delta: Option<Delta>) -> Option<Color32> {
    match delta? {
        Delta::Improved => Some(Color32::from_rgb(60, 170, 90)),
        Delta::Regressed => Some(Color32::from_rgb(215, 70, 60)),
        Delta::Unchanged => None,
    }
}

pub fn rank_glyph(rank: Option<RankChange>) -> &'static str {
    match rank {
        Some(RankChange::Up) => "▲",
        Some(RankChange::Down) => "▼",
        Some(RankChange::None) => "–",
        None => " ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_size_and_distinct() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[2]);
    }

    #[test]
    fn test_unchanged_has_no_color() {
        assert!(delta_color(Some(Delta::Unchanged)).is_none());
        assert!(delta_color(None).is_none());
        assert!(delta_color(Some(Delta::Regressed)).is_some());
    }
}
