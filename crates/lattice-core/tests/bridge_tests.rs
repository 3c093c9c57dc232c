// Host-side tests for event ingestion, variable propagation and renderer fan-out.

use lattice_core::authority::{InstanceRole, ParameterAuthority};
use lattice_core::bridge::{events_per_frame, AnimationTarget, EventQueue, FocusState};
use lattice_core::constants::*;
use lattice_core::geometry::{GeometryKind, ParameterPatch};
use lattice_core::{
    FrameState, InteractionEvent, LayerRenderer, ManualClock, MemorySink, ParameterTarget,
    PointerSignal, RenderSurfaceError, RendererOptions, SynchronizationBridge, Variable,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct LayerLog {
    patches: Vec<ParameterPatch>,
    themes: Vec<String>,
    signals: Vec<PointerSignal>,
    renders: usize,
    active: bool,
    destroyed: bool,
}

/// Layer double that records every call into a shared log.
struct RecordingLayer {
    label: String,
    log: Rc<RefCell<LayerLog>>,
    fail_updates: bool,
    fail_render: bool,
}

impl RecordingLayer {
    fn new(label: &str) -> (Self, Rc<RefCell<LayerLog>>) {
        let log = Rc::new(RefCell::new(LayerLog::default()));
        let layer = Self {
            label: label.to_string(),
            log: log.clone(),
            fail_updates: false,
            fail_render: false,
        };
        (layer, log)
    }

    fn failing(label: &str) -> (Self, Rc<RefCell<LayerLog>>) {
        let (mut layer, log) = Self::new(label);
        layer.fail_updates = true;
        layer.fail_render = true;
        (layer, log)
    }
}

impl LayerRenderer for RecordingLayer {
    fn label(&self) -> &str {
        &self.label
    }

    fn update_parameters(&mut self, patch: &ParameterPatch) -> Result<(), RenderSurfaceError> {
        if self.fail_updates {
            return Err(RenderSurfaceError::ContextLost);
        }
        self.log.borrow_mut().patches.push(patch.clone());
        Ok(())
    }

    fn set_theme(&mut self, theme_id: &str) -> bool {
        self.log.borrow_mut().themes.push(theme_id.to_string());
        true
    }

    fn interact(&mut self, signal: PointerSignal) {
        self.log.borrow_mut().signals.push(signal);
    }

    fn render(&mut self, _frame: &FrameState) -> Result<(), RenderSurfaceError> {
        if self.fail_render {
            return Err(RenderSurfaceError::Draw("lost".into()));
        }
        self.log.borrow_mut().renders += 1;
        Ok(())
    }

    fn start(&mut self) {
        self.log.borrow_mut().active = true;
    }

    fn stop(&mut self) {
        self.log.borrow_mut().active = false;
    }

    fn destroy(&mut self) {
        let mut log = self.log.borrow_mut();
        log.active = false;
        log.destroyed = true;
    }

    fn is_active(&self) -> bool {
        self.log.borrow().active
    }
}

fn bridge() -> SynchronizationBridge<MemorySink> {
    SynchronizationBridge::new(ParameterAuthority::new(), MemorySink::new())
}

fn mouse(x: f32, y: f32, magnitude: f32) -> InteractionEvent {
    InteractionEvent::Mouse { x, y, magnitude }
}

#[test]
fn frame_budget_selects_batch_size() {
    assert_eq!(events_per_frame(16.0), 3);
    assert_eq!(events_per_frame(FRAME_BUDGET_FAST_MS), 3);
    assert_eq!(events_per_frame(25.0), 2);
    assert_eq!(events_per_frame(FRAME_BUDGET_SLOW_MS), 2);
    assert_eq!(events_per_frame(80.0), 1);
}

#[test]
fn overflow_keeps_most_recent_events_in_order() {
    let mut b = bridge();
    for i in 0..60 {
        b.queue_event(mouse(i as f32 / 100.0, 0.0, 0.1));
    }
    let queue = b.queue();
    assert!(queue.len() <= EVENT_QUEUE_RETAIN);
    let xs: Vec<f32> = queue
        .iter()
        .map(|e| match e {
            InteractionEvent::Mouse { x, .. } => *x,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    let expected: Vec<f32> = (60 - xs.len()..60).map(|i| i as f32 / 100.0).collect();
    assert_eq!(xs, expected);
    assert_eq!(b.diagnostics().events_dropped, 60 - xs.len() as u64);
}

#[test]
fn shedding_episode_ends_after_drain() {
    let mut q = EventQueue::new(5, 3);
    for _ in 0..6 {
        q.push(InteractionEvent::Scroll { velocity: 1.0 });
    }
    assert_eq!(q.len(), 3);
    assert!(q.is_shedding());
    q.push(InteractionEvent::Scroll { velocity: 2.0 });
    assert_eq!(q.len(), 3);
    q.pop_batch(1);
    assert!(!q.is_shedding());
    q.push(InteractionEvent::Scroll { velocity: 3.0 });
    assert_eq!(q.len(), 3);
}

#[test]
fn process_frame_applies_at_most_k_events() {
    let mut b = bridge();
    for _ in 0..10 {
        b.queue_event(InteractionEvent::Click { x: 0.5, y: 0.5 });
    }
    b.process_frame(16.0);
    assert_eq!(b.diagnostics().last_batch, 3);
    b.process_frame(30.0);
    assert_eq!(b.diagnostics().last_batch, 2);
    b.process_frame(100.0);
    assert_eq!(b.diagnostics().last_batch, 1);
    assert_eq!(b.queue().len(), 4);
    assert_eq!(b.authority().ledger().click, 6);
}

#[test]
fn events_apply_before_propagation() {
    let mut b = bridge();
    let (layer, log) = RecordingLayer::new("content");
    b.register(Box::new(layer), RendererOptions::new(InstanceRole::Content));
    b.queue_event(InteractionEvent::Click { x: 0.5, y: 0.5 });
    b.process_frame(16.0);

    let pulse = b.authority().snapshot().click_pulse;
    assert!(pulse > 0.0);
    assert_eq!(b.sink().scalar("click-pulse"), Some(pulse));
    let last = log.borrow().patches.last().cloned().unwrap();
    assert!(last.detail_intensity.unwrap() > 0.0);
}

#[test]
fn unknown_event_kind_is_dropped() {
    let mut b = bridge();
    assert!(!b.handle_event("teleport", &json!({ "x": 1 })));
    assert!(b.queue().is_empty());
    assert!(b.handle_event("mouse", &json!({ "x": 0.2, "y": 0.4, "intensity": 0.7 })));
    assert!(b.handle_event("section", &json!("about")));
    assert_eq!(b.queue().len(), 2);
}

#[test]
fn every_variable_is_written_once_synced() {
    let mut b = bridge();
    b.sync_all_layers();
    for var in Variable::ALL {
        assert!(b.sink().get(var.name()).is_some(), "{} missing", var.name());
    }
    assert_eq!(b.sink().scalar("global-density"), Some(12.0));
    assert_eq!(b.sink().get("accent-color").and_then(|v| v.as_scalar()), None);
}

#[test]
fn unchanged_variables_are_not_rewritten() {
    let mut b = bridge();
    b.process_frame(16.0);
    let after_first = b.sink().writes();
    assert_eq!(after_first, Variable::ALL.len());
    b.process_frame(16.0);
    // only the relaxing intensity moves on an idle frame
    assert!(b.sink().writes() - after_first < 3);
    let after_second = b.sink().writes();

    b.sync_all_layers();
    assert!(b.sink().writes() >= after_second + Variable::ALL.len());
}

#[test]
fn mouse_event_animates_influence_and_moves_pointer() {
    let mut b = bridge();
    b.queue_event(mouse(0.25, 0.75, 0.8));
    b.process_frame(16.0);
    assert_eq!(b.sink().scalar("mouse-x"), Some(0.25));
    assert_eq!(b.sink().scalar("mouse-y"), Some(0.75));
    assert!(b.is_animating(Variable::MouseInfluence));
    let mid = b.current_value(Variable::MouseInfluence);
    assert!(mid > 0.0 && mid < 0.8);

    for _ in 0..20 {
        b.process_frame(16.0);
    }
    assert!(!b.is_animating(Variable::MouseInfluence));
}

#[test]
fn finished_animation_writes_its_final_value_once() {
    let mut b = bridge();
    b.process_frame(16.0);
    let base = b.sink().scalar("global-speed").unwrap();

    b.animate(Variable::GlobalSpeed, AnimationTarget::Scalar(2.5), 100.0);
    for _ in 0..4 {
        b.process_frame(25.0);
    }
    let last = b.sink().scalar("global-speed").unwrap();
    assert!((last - 2.5).abs() < 1e-5, "final keyframe written, got {last}");
    assert!(!b.is_animating(Variable::GlobalSpeed));

    b.process_frame(25.0);
    let after = b.sink().scalar("global-speed").unwrap();
    assert!((after - base).abs() < 1e-3, "falls back to base, got {after}");
}

#[test]
fn non_finite_input_is_neutralized() {
    let mut b = bridge();
    b.queue_event(InteractionEvent::Scroll { velocity: f32::NAN });
    b.queue_event(mouse(f32::NAN, 0.2, f32::INFINITY));
    b.queue_event(InteractionEvent::Click { x: 0.3, y: f32::NEG_INFINITY });
    for _ in 0..200 {
        b.process_frame(16.0);
    }
    for name in ["scroll-velocity", "chaos-intensity", "scroll-chaos", "mouse-influence", "mouse-x", "mouse-y"] {
        let v = b.sink().scalar(name).unwrap();
        assert!(v.is_finite(), "{name} = {v}");
    }
    assert_eq!(b.sink().scalar("scroll-velocity"), Some(0.0));
    assert_eq!(b.sink().scalar("mouse-influence"), Some(0.0));
    assert_eq!(b.sink().scalar("mouse-x"), Some(0.3));
    assert_eq!(b.sink().scalar("mouse-y"), Some(0.5));
}

#[test]
fn replacing_animation_starts_from_current_value() {
    let mut b = bridge();
    b.animate(Variable::GlobalSpeed, AnimationTarget::Scalar(2.0), 100.0);
    b.process_frame(50.0);
    let current = b.current_value(Variable::GlobalSpeed);
    assert!(current > 1.0 && current < 2.0);

    b.animate(Variable::GlobalSpeed, AnimationTarget::Scalar(0.0), 100.0);
    assert!((b.current_value(Variable::GlobalSpeed) - current).abs() < 1e-6);
}

#[test]
fn keyframe_animation_runs_through_frames() {
    let mut b = bridge();
    b.sync_all_layers();
    assert!(b.animate_variable("--portal-intensity", AnimationTarget::from(&[1.0, 0.0][..]), 200.0));
    b.process_frame(100.0);
    assert!((b.current_value(Variable::PortalIntensity) - 1.0).abs() < 1e-5);
    b.process_frame(50.0);
    assert!((b.current_value(Variable::PortalIntensity) - 0.5).abs() < 1e-5);
    assert!(!b.animate_variable("no-such-variable", AnimationTarget::Scalar(1.0), 10.0));
}

#[test]
fn digit_key_selects_section_and_morphs_layers() {
    let mut b = bridge();
    let (layer, log) = RecordingLayer::new("bg");
    b.register(Box::new(layer), RendererOptions::new(InstanceRole::Background));
    b.queue_event(InteractionEvent::Keypress { key: "2".into() });
    b.process_frame(16.0);

    assert_eq!(b.authority().active_section(), "about");
    assert_eq!(log.borrow().themes, vec!["tetrahedron".to_string()]);
    assert!(b.is_animating(Variable::PortalIntensity));
    assert_eq!(b.sink().scalar("transition-progress").map(|p| p < 0.1), Some(true));

    // keys beyond the catalog and non-digits are ignored
    b.queue_event(InteractionEvent::Keypress { key: "9".into() });
    b.queue_event(InteractionEvent::Keypress { key: "x".into() });
    b.process_frame(16.0);
    assert_eq!(b.authority().active_section(), "about");
    assert_eq!(log.borrow().themes.len(), 1);
}

#[test]
fn repeated_section_event_does_not_restart_morph() {
    let mut b = bridge();
    let (layer, log) = RecordingLayer::new("content");
    b.register(Box::new(layer), RendererOptions::new(InstanceRole::Content));
    b.queue_event(InteractionEvent::Section { id: "lab".into() });
    b.queue_event(InteractionEvent::Section { id: "lab".into() });
    b.process_frame(16.0);
    assert_eq!(log.borrow().themes.len(), 1);
    assert_eq!(b.authority().ledger().section_changes, 1);
}

#[test]
fn focus_follows_nearest_layer() {
    let mut b = bridge();
    let (left, left_log) = RecordingLayer::new("left");
    let (mid, _) = RecordingLayer::new("mid");
    let (right, right_log) = RecordingLayer::new("right");
    let l = b.register(Box::new(left), RendererOptions::new(InstanceRole::Content).with_center(0.1, 0.5));
    let m = b.register(Box::new(mid), RendererOptions::new(InstanceRole::Shadow).with_center(0.3, 0.5));
    let r = b.register(Box::new(right), RendererOptions::new(InstanceRole::Accent).with_center(0.9, 0.5));

    b.queue_event(mouse(0.12, 0.5, 1.0));
    b.process_frame(16.0);
    assert_eq!(b.focus_state(l), Some(FocusState::Focused));
    assert_eq!(b.focus_state(m), Some(FocusState::Adjacent));
    assert_eq!(b.focus_state(r), Some(FocusState::Distant));
    assert_eq!(b.sink().scalar("focus-x"), Some(0.1));
    assert_eq!(b.sink().scalar("left.focus"), Some(1.0));
    assert_eq!(b.sink().scalar("mid.focus"), Some(0.5));

    // distant layers receive no pointer share
    assert_eq!(left_log.borrow().signals.len(), 1);
    assert!(right_log.borrow().signals.is_empty());

    b.queue_event(InteractionEvent::Keypress { key: "Escape".into() });
    b.process_frame(16.0);
    assert_eq!(b.focus_state(l), Some(FocusState::Distant));
    assert_eq!(b.sink().scalar("left.focus"), Some(0.0));
}

#[test]
fn failing_layer_does_not_abort_the_batch() {
    let mut b = bridge();
    let (bad, _) = RecordingLayer::failing("bad");
    let (good, good_log) = RecordingLayer::new("good");
    b.register(Box::new(bad), RendererOptions::new(InstanceRole::Highlight));
    b.register(Box::new(good), RendererOptions::new(InstanceRole::Content));
    b.start_all();

    let mut clock = ManualClock::new(16.0);
    for _ in 0..3 {
        b.frame(&mut clock);
    }
    assert_eq!(good_log.borrow().patches.len(), 3);
    assert_eq!(good_log.borrow().renders, 3);
    // three rejected pushes and three failed draws
    assert_eq!(b.diagnostics().renderer_failures, 6);
    assert_eq!(b.diagnostics().frames, 3);
}

#[test]
fn derived_patch_never_carries_geometry() {
    let mut b = bridge();
    let (layer, log) = RecordingLayer::new("content");
    b.register(
        Box::new(layer),
        RendererOptions::new(InstanceRole::Content).with_geometry(GeometryKind::Klein),
    );
    b.process_frame(16.0);
    let log = log.borrow();
    assert_eq!(log.patches[0].geometry, Some(GeometryKind::Klein));
    assert_eq!(log.patches[1].geometry, None);
    assert!(log.patches[1].grid_density.is_some());
}

#[test]
fn explicit_overrides_persist_across_frames() {
    let mut b = bridge();
    let (layer, log) = RecordingLayer::new("content");
    let id = b.register(Box::new(layer), RendererOptions::new(InstanceRole::Content));
    let patch = ParameterPatch {
        morph_factor: Some(1.9),
        ..ParameterPatch::default()
    };
    b.update_parameters(ParameterTarget::One(id), &patch).unwrap();
    b.process_frame(16.0);
    b.process_frame(16.0);
    assert_eq!(log.borrow().patches.last().unwrap().morph_factor, Some(1.9));

    b.clear_overrides(id);
    b.process_frame(16.0);
    assert_ne!(log.borrow().patches.last().unwrap().morph_factor, Some(1.9));

    assert!(b.update_parameters(ParameterTarget::One(999), &patch).is_err());
}

#[test]
fn parameter_overlays_add_to_derived_values() {
    let mut b = bridge();
    let (layer, log) = RecordingLayer::new("content");
    b.register(Box::new(layer), RendererOptions::new(InstanceRole::Content));
    b.process_frame(16.0);
    let base = log.borrow().patches.last().unwrap().grid_density.unwrap();

    b.add_parameter_overlay(ParameterTarget::Broadcast, "gridDensity", 2.0);
    b.add_parameter_overlay(ParameterTarget::Broadcast, "gridDensity", 1.0);
    b.process_frame(16.0);
    let boosted = log.borrow().patches.last().unwrap().grid_density.unwrap();
    assert!((boosted - (base + 3.0)).abs() < 1e-4);
}

#[test]
fn hold_reaches_full_intensity_at_cap() {
    let mut b = bridge();
    let (layer, log) = RecordingLayer::new("content");
    b.register(Box::new(layer), RendererOptions::new(InstanceRole::Content));
    b.begin_hold();
    b.process_frame(HOLD_CAP_MS);
    assert_eq!(b.sink().scalar("hold-intensity"), Some(1.0));
    b.end_hold();
    b.process_frame(16.0);
    assert_eq!(b.sink().scalar("hold-intensity"), Some(0.0));
    let log = log.borrow();
    assert_eq!(log.signals.as_slice(), &[PointerSignal::HoldStart, PointerSignal::HoldEnd]);
}

#[test]
fn scroll_sets_signed_velocity_that_decays() {
    let mut b = bridge();
    b.queue_event(InteractionEvent::Scroll { velocity: -50.0 });
    b.process_frame(16.0);
    let v = b.sink().scalar("scroll-velocity").unwrap();
    assert!(v < 0.0 && v > -0.5);
    for _ in 0..500 {
        b.process_frame(16.0);
    }
    assert_eq!(b.sink().scalar("scroll-velocity"), Some(0.0));
}

#[test]
fn unregister_destroys_layer() {
    let mut b = bridge();
    let (layer, log) = RecordingLayer::new("gone");
    let id = b.register(Box::new(layer), RendererOptions::new(InstanceRole::Accent));
    assert!(b.unregister(id));
    assert!(log.borrow().destroyed);
    assert!(!b.unregister(id));
    assert!(b.renderer_ids().is_empty());
}

#[test]
fn stopped_layers_are_not_rendered() {
    let mut b = bridge();
    let (layer, log) = RecordingLayer::new("content");
    b.register(Box::new(layer), RendererOptions::new(InstanceRole::Content));
    assert_eq!(b.render_all(&FrameState::new(0.0, 16.0)), 0);
    b.start_all();
    assert_eq!(b.render_all(&FrameState::new(16.0, 16.0)), 1);
    b.stop_all();
    assert_eq!(b.render_all(&FrameState::new(32.0, 16.0)), 0);
    assert_eq!(log.borrow().renders, 1);
}

#[test]
fn moved_center_changes_focus() {
    let mut b = bridge();
    let (anchor, _) = RecordingLayer::new("anchor");
    let (layer, _) = RecordingLayer::new("panel");
    b.register(Box::new(anchor), RendererOptions::new(InstanceRole::Background).with_center(0.5, 0.5));
    let id = b.register(Box::new(layer), RendererOptions::new(InstanceRole::Content).with_center(0.9, 0.5));
    b.queue_event(mouse(0.1, 0.5, 0.5));
    b.process_frame(16.0);
    assert_eq!(b.focus_state(id), Some(FocusState::Distant));

    assert!(b.set_center(id, 0.1, 0.5));
    assert!(!b.set_center(999, 0.1, 0.5));
    b.queue_event(mouse(0.1, 0.5, 0.5));
    b.process_frame(16.0);
    assert_eq!(b.focus_state(id), Some(FocusState::Focused));
}
