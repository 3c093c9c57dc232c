// Host-side tests for relationships between tuning constants.

use lattice_core::constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn queue_bounds_are_ordered() {
    assert!(EVENT_QUEUE_RETAIN > 0);
    assert!(EVENT_QUEUE_RETAIN < EVENT_QUEUE_CAPACITY);
    assert!(MIN_EVENTS_PER_FRAME <= MAX_EVENTS_PER_FRAME);
    assert!(FRAME_BUDGET_FAST_MS < FRAME_BUDGET_SLOW_MS);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn decay_rates_lie_strictly_inside_unit_interval() {
    for rate in [
        MOUSE_DECAY,
        CLICK_DECAY,
        SCROLL_DECAY,
        COHERENCE_RELAX,
        INTENSITY_RELAX,
        LOCAL_INTERACTION_DECAY,
    ] {
        assert!(rate > 0.0 && rate < 1.0, "{rate}");
    }
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn ranges_are_well_formed() {
    for (lo, hi) in [
        INTENSITY_RANGE,
        SPEED_RANGE,
        DENSITY_RANGE,
        DIMENSION_RANGE,
        COHERENCE_RANGE,
        GRID_DENSITY_RANGE,
        MORPH_RANGE,
        ROTATION_SPEED_RANGE,
        PATTERN_INTENSITY_RANGE,
        GLITCH_RANGE,
        LINE_THICKNESS_RANGE,
        SHELL_WIDTH_RANGE,
        TETRA_THICKNESS_RANGE,
        UNIVERSE_RANGE,
    ] {
        assert!(lo < hi, "({lo}, {hi})");
    }
    assert!(INTENSITY_FLOOR >= INTENSITY_RANGE.0 && INTENSITY_FLOOR <= INTENSITY_RANGE.1);
    assert!(COHERENCE_OVERSHOOT <= COHERENCE_RANGE.1);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn hold_boost_fits_draw_bound() {
    assert_eq!(DIMENSION_DRAW_MAX, DIMENSION_RANGE.1 + HOLD_DIMENSION_BOOST);
    assert!(HOLD_CAP_MS > 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn periodic_effects_run_longer_than_one_shots() {
    assert!(DEFAULT_PERIODIC_EFFECT_MS > DEFAULT_EFFECT_MS);
    assert!(MOUSE_INFLUENCE_ANIM_MS < CHAOS_ANIM_MS && CHAOS_ANIM_MS < PORTAL_ANIM_MS);
}
