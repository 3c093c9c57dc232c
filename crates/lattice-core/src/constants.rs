//! Tuning constants for the mood cascade, bridge and renderer.
//!
//! These constants express intended behavior (time constants, clamp limits,
//! queue bounds) and keep magic numbers out of the code.

// Frame timing
pub const REFERENCE_FRAME_MS: f64 = 16.0; // decay rates are expressed per reference frame
pub const FRAME_BUDGET_FAST_MS: f64 = 18.3; // frames at or under this process 3 events
pub const FRAME_BUDGET_SLOW_MS: f64 = 33.4; // frames at or under this process 2 events
pub const MAX_EVENTS_PER_FRAME: usize = 3;
pub const MIN_EVENTS_PER_FRAME: usize = 1;

// Event queue
pub const EVENT_QUEUE_CAPACITY: usize = 50;
pub const EVENT_QUEUE_RETAIN: usize = 30; // most recent entries kept on overflow

// Interaction decay (multiplier per reference frame)
pub const MOUSE_DECAY: f32 = 0.95;
pub const CLICK_DECAY: f32 = 0.92;
pub const SCROLL_DECAY: f32 = 0.90;
pub const COHERENCE_RELAX: f32 = 0.94;
pub const INTENSITY_RELAX: f32 = 0.995;
pub const ENERGY_EPSILON: f32 = 1e-4; // below this an energy field snaps to 0

// Interaction response
pub const CLICK_PULSE_STEP: f32 = 0.5;
pub const SCROLL_INTENSITY_GAIN: f32 = 0.1;
pub const SCROLL_VELOCITY_SCALE: f32 = 100.0; // px per frame mapped to magnitude 1
pub const INTENSITY_FLOOR: f32 = 0.3;

// Section transitions
pub const TRANSITION_DURATION_MS: f64 = 800.0;
pub const COHERENCE_OVERSHOOT: f32 = 1.5;

// Mood ranges
pub const INTENSITY_RANGE: (f32, f32) = (0.0, 1.0);
pub const SPEED_RANGE: (f32, f32) = (0.1, 3.0);
pub const DENSITY_RANGE: (f32, f32) = (1.0, 50.0);
pub const DIMENSION_RANGE: (f32, f32) = (3.0, 4.5);
pub const COHERENCE_RANGE: (f32, f32) = (0.0, 2.0);

// Derived parameter ranges
pub const GRID_DENSITY_RANGE: (f32, f32) = (1.0, 100.0);
pub const MORPH_RANGE: (f32, f32) = (0.0, 2.0);
pub const ROTATION_SPEED_RANGE: (f32, f32) = (0.0, 3.0);
pub const PATTERN_INTENSITY_RANGE: (f32, f32) = (0.0, 1.5);
pub const GLITCH_RANGE: (f32, f32) = (0.0, 0.2);
pub const LINE_THICKNESS_RANGE: (f32, f32) = (0.005, 0.1);
pub const SHELL_WIDTH_RANGE: (f32, f32) = (0.005, 0.2);
pub const TETRA_THICKNESS_RANGE: (f32, f32) = (0.005, 0.2);
pub const UNIVERSE_RANGE: (f32, f32) = (0.3, 2.0);

// Role-stage coefficients
pub const MOUSE_DIMENSION_GAIN: f32 = 0.25;
pub const ROTATION_SPEED_GAIN: f32 = 0.5;

// Color transforms
pub const DARKEN_FACTOR: f32 = 0.7;
pub const BRIGHTEN_FACTOR: f32 = 1.3;

// Focus
pub const FOCUS_ADJACENT_DISTANCE: f32 = 0.3; // normalized screen distance

// Renderer
pub const THEME_TRANSITION_MS: f64 = 1000.0;
pub const LOCAL_INTERACTION_DECAY: f32 = 0.98; // per rendered frame
pub const GRID_INTERACTION_BOOST: f32 = 0.5;
pub const HOLD_CAP_MS: f64 = 2000.0;
pub const HOLD_DIMENSION_BOOST: f32 = 0.5;
pub const DIMENSION_DRAW_MAX: f32 = DIMENSION_RANGE.1 + HOLD_DIMENSION_BOOST;
pub const CHROMATIC_OFFSET_SCALE: f32 = 0.5; // glitch intensity to sample offset

// 4D rotation plane frequency multipliers
pub const XW_FREQUENCY: f32 = 0.31;
pub const YW_FREQUENCY: f32 = 0.23;
pub const ZW_FREQUENCY: f32 = 0.17;
pub const PERSPECTIVE_DISTANCE: f32 = 2.0;

// Variable animations
pub const MOUSE_INFLUENCE_ANIM_MS: f64 = 150.0;
pub const CHAOS_ANIM_MS: f64 = 300.0;
pub const PORTAL_ANIM_MS: f64 = 600.0;
pub const VARIABLE_EPSILON: f32 = 1e-4; // writes smaller than this are skipped

// Effects
pub const DEFAULT_EFFECT_MS: f64 = 600.0;
pub const DEFAULT_PERIODIC_EFFECT_MS: f64 = 2000.0;
