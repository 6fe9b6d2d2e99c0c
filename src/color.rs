use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Sequential blue ramp for the year series
// ---------------------------------------------------------------------------

/// Portion of the ramp actually used: the palest and darkest ends are
/// skipped so every bar stays visible and labels stay readable.
const RAMP_START: f32 = 0.3;
const RAMP_END: f32 = 0.8;

/// Colour at position `t` ∈ [0, 1] of a light-to-dark blue ramp.
pub fn blue_at(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let lightness = 0.96 - 0.68 * t;
    let saturation = 0.55 + 0.25 * t;
    let hsl = Hsl::new(212.0, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

/// `n` blues evenly spaced over [`RAMP_START`, `RAMP_END`], lightest first.
pub fn blues(n: usize) -> Vec<Color32> {
    match n {
        0 => Vec::new(),
        1 => vec![blue_at(RAMP_START)],
        _ => (0..n)
            .map(|i| {
                let t = RAMP_START + (RAMP_END - RAMP_START) * i as f32 / (n - 1) as f32;
                blue_at(t)
            })
            .collect(),
    }
}
