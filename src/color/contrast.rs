//! Luminance, contrast ratio, and the stroke-outline decision.

use super::Rgb;

/// Foregrounds at or below this contrast ratio against the background get a
/// stroke outline. This only catches near-identical colors; it is far below
/// accessibility thresholds on purpose.
pub const STROKE_CONTRAST_THRESHOLD: f64 = 1.4;

const GAMMA: f64 = 2.2;
const WEIGHT_R: f64 = 0.2126;
const WEIGHT_G: f64 = 0.7151;
const WEIGHT_B: f64 = 0.0721;

/// Perceptual relative luminance in `[0, 1]`.
#[must_use]
pub fn relative_luminance(rgb: Rgb) -> f64 {
    fn channel(c: u8) -> f64 {
        (f64::from(c) / 255.0).powf(GAMMA)
    }

    WEIGHT_R * channel(rgb.r) + WEIGHT_G * channel(rgb.g) + WEIGHT_B * channel(rgb.b)
}

/// Contrast ratio in `[1, 21]`; symmetric in its arguments.
#[must_use]
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (high, low) = if la >= lb { (la, lb) } else { (lb, la) };
    (high + 0.05) / (low + 0.05)
}

/// Channel-wise complement; used for outline colors that stand off the background.
#[must_use]
pub fn invert_color(rgb: Rgb) -> Rgb {
    Rgb::new(255 - rgb.r, 255 - rgb.g, 255 - rgb.b)
}

// =============================================================================
// EVALUATOR
// =============================================================================

/// Decides stroke styling against one configured background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContrastEvaluator {
    background: Rgb,
}

impl ContrastEvaluator {
    #[must_use]
    pub fn new(background: Rgb) -> Self {
        Self { background }
    }

    #[must_use]
    pub fn background(&self) -> Rgb {
        self.background
    }

    /// Replace the background for all later decisions.
    pub fn reset(&mut self, background: Rgb) {
        self.background = background;
    }

    /// True when `foreground` is too close to the background to read unaided.
    #[must_use]
    pub fn needs_stroke(&self, foreground: Rgb) -> bool {
        contrast_ratio(foreground, self.background) <= STROKE_CONTRAST_THRESHOLD
    }
}

impl Default for ContrastEvaluator {
    fn default() -> Self {
        Self::new(Rgb::DEFAULT_BACKGROUND)
    }
}

#[cfg(test)]
#[path = "contrast_test.rs"]
mod tests;
