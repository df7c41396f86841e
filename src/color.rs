use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::state::TrendTab;

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Diverging colour map for correlation cells
// ---------------------------------------------------------------------------

/// Blue for negative, red for positive, near-white around zero.
/// Undefined coefficients are grey.
pub fn coolwarm(r: Option<f64>) -> Color32 {
    let Some(r) = r else {
        return Color32::GRAY;
    };
    let r = r.clamp(-1.0, 1.0) as f32;
    let hue = if r < 0.0 { 225.0 } else { 5.0 };
    let strength = r.abs();
    hsl_to_color32(hue, 0.15 + 0.6 * strength, 0.92 - 0.45 * strength)
}

/// Readable text colour on top of a [`coolwarm`] cell.
pub fn text_on(r: Option<f64>) -> Color32 {
    match r {
        Some(r) if r.abs() > 0.6 => Color32::WHITE,
        _ => Color32::BLACK,
    }
}

// ---------------------------------------------------------------------------
// Trend chart colours
// ---------------------------------------------------------------------------

/// (daily series, rolling average) colours for a trend tab.
pub fn trend_colors(tab: TrendTab, dark_mode: bool) -> (Color32, Color32) {
    match tab {
        TrendTab::Cases => (
            hsl_to_color32(210.0, 0.6, 0.65).gamma_multiply(0.6),
            hsl_to_color32(28.0, 0.9, 0.55),
        ),
        TrendTab::Deaths => (
            hsl_to_color32(0.0, 0.75, 0.5).gamma_multiply(0.6),
            if dark_mode { Color32::WHITE } else { Color32::BLACK },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coolwarm_diverges_around_zero() {
        let neg = coolwarm(Some(-1.0));
        let pos = coolwarm(Some(1.0));
        let zero = coolwarm(Some(0.0));
        assert!(neg.b() > neg.r());
        assert!(pos.r() > pos.b());
        assert!(zero.r() > 200 && zero.g() > 200 && zero.b() > 200);
        assert_eq!(coolwarm(None), Color32::GRAY);
    }

    #[test]
    fn strong_cells_use_white_text() {
        assert_eq!(text_on(Some(0.95)), Color32::WHITE);
        assert_eq!(text_on(Some(-0.1)), Color32::BLACK);
        assert_eq!(text_on(None), Color32::BLACK);
    }
}
