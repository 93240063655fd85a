use super::*;

const GRAY: Rgb = Rgb::new(0x80, 0x80, 0x80);
const GRAY_PLUS_ONE: Rgb = Rgb::new(0x81, 0x81, 0x81);

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn luminance_extremes() {
    assert!(approx(relative_luminance(Rgb::BLACK), 0.0));
    assert!(approx(relative_luminance(Rgb::WHITE), WEIGHT_R + WEIGHT_G + WEIGHT_B));
}

#[test]
fn luminance_weights_green_highest() {
    let red = relative_luminance(Rgb::new(255, 0, 0));
    let green = relative_luminance(Rgb::new(0, 255, 0));
    let blue = relative_luminance(Rgb::new(0, 0, 255));
    assert!(green > red && red > blue);
    assert!(approx(green, 0.7151));
}

#[test]
fn contrast_is_reflexive() {
    for rgb in [Rgb::BLACK, Rgb::WHITE, GRAY, Rgb::DEFAULT_BACKGROUND, Rgb::new(12, 200, 99)] {
        assert!(approx(contrast_ratio(rgb, rgb), 1.0), "{rgb}");
    }
}

#[test]
fn contrast_is_symmetric() {
    let a = Rgb::new(10, 120, 240);
    let b = Rgb::new(250, 200, 0);
    assert!(approx(contrast_ratio(a, b), contrast_ratio(b, a)));
}

#[test]
fn contrast_separates_black_and_white_most() {
    let extreme = contrast_ratio(Rgb::WHITE, Rgb::BLACK);
    assert!(extreme > contrast_ratio(GRAY, GRAY_PLUS_ONE));
    assert!(extreme > 20.0 && extreme <= 21.0);
}

#[test]
fn invert_complements_each_channel() {
    assert_eq!(invert_color(Rgb::new(0x28, 0x00, 0xff)), Rgb::new(0xd7, 0xff, 0x00));
    assert_eq!(invert_color(invert_color(GRAY)), GRAY);
}

#[test]
fn stroke_for_foreground_equal_to_background() {
    let evaluator = ContrastEvaluator::new(Rgb::DEFAULT_BACKGROUND);
    assert!(evaluator.needs_stroke(Rgb::DEFAULT_BACKGROUND));
}

#[test]
fn no_stroke_for_white_on_default_background() {
    let evaluator = ContrastEvaluator::default();
    assert!(!evaluator.needs_stroke(Rgb::WHITE));
    assert!(!evaluator.needs_stroke(Rgb::DEFAULT_FOREGROUND));
}

#[test]
fn stroke_for_near_background_colors() {
    let evaluator = ContrastEvaluator::new(Rgb::BLACK);
    assert!(evaluator.needs_stroke(Rgb::new(0x20, 0x20, 0x20)));
    assert!(evaluator.needs_stroke(Rgb::new(0, 0, 0x80)));
    assert!(!evaluator.needs_stroke(Rgb::new(0xff, 0, 0)));
}

#[test]
fn reset_changes_later_decisions() {
    let mut evaluator = ContrastEvaluator::default();
    assert!(!evaluator.needs_stroke(Rgb::WHITE));

    evaluator.reset(Rgb::WHITE);
    assert_eq!(evaluator.background(), Rgb::WHITE);
    assert!(evaluator.needs_stroke(Rgb::WHITE));
    assert!(!evaluator.needs_stroke(Rgb::BLACK));

    evaluator.reset(Rgb::BLACK);
    assert!(evaluator.needs_stroke(Rgb::BLACK));
}
