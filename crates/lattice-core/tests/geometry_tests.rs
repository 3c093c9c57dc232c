// Host-side tests for lattice evaluation, projection, themes and the renderer lifecycle.

use glam::{Vec2, Vec3, Vec4};
use lattice_core::constants::*;
use lattice_core::geometry::lattice::{evaluate, evaluate_index, GeometryKind, LatticeStyle};
use lattice_core::geometry::projection::{place_on_screen, project_4d, RotationAngles};
use lattice_core::geometry::shading::{chromatic_offset, lattice_value};
use lattice_core::geometry::{
    shade, DrawTarget, GeometryRenderer, LatticeParameters, LatticeUniforms, ParameterPatch,
    SurfaceStatus, ThemeCatalog, LATTICE_UNIFORMS_SIZE,
};
use lattice_core::gpu::{classify_surface_error, FrameAcquire};
use lattice_core::{FrameState, LayerRenderer, PointerSignal, RenderSurfaceError};
use std::collections::VecDeque;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Records every uniform block it is asked to draw.
#[derive(Default)]
struct RecordingTarget {
    frames: Vec<LatticeUniforms>,
    fail_with: Option<RenderSurfaceError>,
    released: bool,
}

impl DrawTarget for RecordingTarget {
    fn resolution(&self) -> [f32; 2] {
        [800.0, 600.0]
    }

    fn draw(&mut self, uniforms: &LatticeUniforms) -> Result<(), RenderSurfaceError> {
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        self.frames.push(*uniforms);
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Acquires a frame the way the hosts do: queued acquisition errors go
/// through the shared classifier before anything is drawn.
#[derive(Default)]
struct AcquiringTarget {
    pending: VecDeque<wgpu::SurfaceError>,
    drawn: usize,
    skipped: usize,
    reconfigured: usize,
}

impl DrawTarget for AcquiringTarget {
    fn resolution(&self) -> [f32; 2] {
        [640.0, 480.0]
    }

    fn draw(&mut self, _uniforms: &LatticeUniforms) -> Result<(), RenderSurfaceError> {
        if let Some(err) = self.pending.pop_front() {
            return match classify_surface_error(err) {
                FrameAcquire::Skip => {
                    self.skipped += 1;
                    Ok(())
                }
                FrameAcquire::Reconfigure => {
                    self.reconfigured += 1;
                    Ok(())
                }
                FrameAcquire::Fatal(e) => Err(e),
            };
        }
        self.drawn += 1;
        Ok(())
    }

    fn release(&mut self) {}
}

fn renderer(theme: &str) -> GeometryRenderer<RecordingTarget> {
    let mut r = GeometryRenderer::new("test", RecordingTarget::default(), theme);
    r.start();
    r
}

fn frame(dt: f64) -> FrameState {
    FrameState::new(0.0, dt)
}

#[test]
fn out_of_range_geometry_index_matches_hypercube() {
    let mut rng = StdRng::seed_from_u64(3);
    let style = LatticeStyle::default();
    for _ in 0..200 {
        let p = Vec3::new(
            rng.gen_range(-2.0..2.0),
            rng.gen_range(-2.0..2.0),
            rng.gen_range(-2.0..2.0),
        );
        let grid = rng.gen_range(1.0..40.0);
        let reference = evaluate_index(0, p, grid, &style);
        for index in [-1_i64, 8, 42, i64::MAX, i64::MIN] {
            assert_eq!(evaluate_index(index, p, grid, &style), reference);
        }
    }
}

#[test]
fn every_family_stays_in_unit_range() {
    let mut rng = StdRng::seed_from_u64(11);
    let style = LatticeStyle {
        time: 1.7,
        ..LatticeStyle::default()
    };
    for kind in GeometryKind::ALL {
        for _ in 0..200 {
            let p = Vec3::new(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
            );
            let v = evaluate(kind, p, rng.gen_range(1.0..100.0), &style);
            assert!((0.0..=1.0).contains(&v), "{kind:?} gave {v}");
        }
    }
}

#[test]
fn geometry_names_round_trip() {
    for kind in GeometryKind::ALL {
        assert_eq!(GeometryKind::from_name(kind.theme_name()), Some(kind));
        assert_eq!(GeometryKind::from_index(kind.index() as i64), kind);
    }
    assert_eq!(GeometryKind::from_name("cube"), None);
}

#[test]
fn projection_without_rotation_is_perspective_divide() {
    let p = Vec4::new(0.4, -0.2, 0.1, 0.0);
    let q = project_4d(p, RotationAngles::from_angle(0.0));
    assert!((q - Vec3::new(0.4, -0.2, 0.1)).length() < 1e-6);

    // w pushes the point toward the viewer by 2/(2+w)
    let far = project_4d(Vec4::new(1.0, 0.0, 0.0, 2.0), RotationAngles::from_angle(0.0));
    assert!((far.x - 0.5).abs() < 1e-6);
}

#[test]
fn rotation_uses_distinct_plane_frequencies() {
    let a = RotationAngles::from_angle(1.0);
    assert!((a.xw - XW_FREQUENCY).abs() < 1e-6);
    assert!((a.yw - YW_FREQUENCY).abs() < 1e-6);
    assert!((a.zw - ZW_FREQUENCY).abs() < 1e-6);
}

#[test]
fn screen_placement_rotates_then_translates() {
    let v = place_on_screen(Vec2::new(1.0, 0.0), std::f32::consts::FRAC_PI_2, Vec2::new(0.5, 0.5));
    assert!((v - Vec2::new(0.5, 1.5)).length() < 1e-5);
}

#[test]
fn uniform_block_matches_shader_layout() {
    assert_eq!(LATTICE_UNIFORMS_SIZE, 112);
    assert_eq!(LATTICE_UNIFORMS_SIZE % 16, 0);
    let u = LatticeUniforms::from_parameters(&LatticeParameters::default(), [640.0, 480.0]);
    assert_eq!(u.as_bytes().len(), 112);
    assert_eq!(&u.as_bytes()[0..4], &640.0_f32.to_ne_bytes());
    assert_eq!(u.base_color[3], 1.0);
}

#[test]
fn set_theme_interpolates_monotonically() {
    let mut r = renderer("hypercube");
    let start = r.parameters().clone();
    let catalog = ThemeCatalog::builtin();
    let target = catalog.get("tetrahedron").unwrap().clone();

    assert!(r.set_theme("tetrahedron"));
    let at0 = r.parameters().numeric_fields();
    r.advance(500.0);
    let at500 = r.parameters().numeric_fields();
    r.advance(500.0);
    let at1000 = r.parameters().numeric_fields();

    assert_eq!(at0, start.numeric_fields());
    assert_eq!(at1000, target.numeric_fields());
    assert!(!r.is_transitioning());
    for i in 0..at0.len() {
        let (a, b, c) = (at0[i], at500[i], at1000[i]);
        assert!(
            (b - a) * (c - b) >= -1e-9,
            "field {i} not monotone: {a} -> {b} -> {c}"
        );
        assert!(b >= a.min(c) - 1e-6 && b <= a.max(c) + 1e-6);
    }
}

#[test]
fn unknown_theme_is_a_noop() {
    let mut r = renderer("hypercube");
    let before = r.parameters().clone();
    assert!(!r.set_theme("nonexistent"));
    assert!(!r.is_transitioning());
    assert_eq!(r.parameters(), &before);
    assert_eq!(r.theme_id(), "hypercube");
}

#[test]
fn patch_during_transition_lands_in_target() {
    let mut r = renderer("hypercube");
    r.set_theme("sphere");
    r.advance(300.0);
    let patch = ParameterPatch {
        grid_density: Some(42.0),
        ..ParameterPatch::default()
    };
    r.update_parameters(&patch);
    r.advance(1000.0);
    assert_eq!(r.parameters().grid_density, 42.0);
    assert_eq!(r.parameters().geometry, GeometryKind::Sphere);
}

#[test]
fn registered_theme_is_selectable() {
    let mut r = renderer("hypercube");
    let custom = LatticeParameters {
        geometry: GeometryKind::Crystal,
        grid_density: 30.0,
        ..LatticeParameters::default()
    };
    r.register_theme("dense-crystal", custom.clone());
    assert!(r.set_theme("dense-crystal"));
    r.advance(2000.0);
    assert_eq!(r.parameters(), &custom);
}

#[test]
fn local_interaction_boosts_grid_and_rotation() {
    let mut r = renderer("hypercube");
    let base = r.frame_uniforms();
    r.interact(PointerSignal::Click { x: 0.2, y: 0.8 });
    r.render(&frame(16.0)).unwrap();
    let drawn = r.target().frames[0];
    let p = r.parameters().clamped();
    assert!((drawn.grid_density - p.grid_density * (1.0 + GRID_INTERACTION_BOOST)).abs() < 1e-4);
    assert!(drawn.grid_density > base.grid_density);
    assert_eq!(drawn.mouse, [0.2, 0.8]);
    let elapsed = 0.016_f32;
    assert!((drawn.rotation_angle - elapsed * p.rotation_speed * 2.0).abs() < 1e-5);
    assert!((r.local_interaction().intensity - LOCAL_INTERACTION_DECAY).abs() < 1e-6);
}

#[test]
fn local_interaction_decays_to_zero() {
    let mut r = renderer("wave");
    r.interact(PointerSignal::Move {
        x: 0.5,
        y: 0.5,
        intensity: 1.0,
    });
    let mut prev = r.local_interaction().intensity;
    for _ in 0..1_000 {
        r.render(&frame(16.0)).unwrap();
        let i = r.local_interaction().intensity;
        assert!(i <= prev);
        prev = i;
    }
    assert_eq!(prev, 0.0);
}

#[test]
fn hold_raises_dimension_up_to_cap() {
    let mut r = renderer("hypercube");
    let base = r.frame_uniforms().dimension;
    r.interact(PointerSignal::HoldStart);
    r.render(&frame(1000.0)).unwrap();
    let half = r.target().frames[0].dimension;
    assert!((half - (base + HOLD_DIMENSION_BOOST * 0.5)).abs() < 1e-5);

    r.render(&frame(5000.0)).unwrap();
    let capped = r.target().frames[1].dimension;
    assert!((capped - (base + HOLD_DIMENSION_BOOST)).abs() < 1e-5);
    assert!(capped <= DIMENSION_DRAW_MAX);

    r.interact(PointerSignal::HoldEnd);
    assert_eq!(r.frame_uniforms().dimension, base);
}

#[test]
fn out_of_range_parameters_are_clamped_at_draw_time() {
    let mut r = renderer("hypercube");
    r.update_parameters(&ParameterPatch {
        grid_density: Some(10_000.0),
        dimension: Some(f32::NAN),
        glitch_intensity: Some(-4.0),
        ..ParameterPatch::default()
    });
    // stored as written
    assert_eq!(r.parameters().grid_density, 10_000.0);
    let u = r.frame_uniforms();
    assert_eq!(u.grid_density, GRID_DENSITY_RANGE.1);
    assert_eq!(u.dimension, DIMENSION_RANGE.0);
    assert_eq!(u.glitch_intensity, 0.0);
}

#[test]
fn stopped_surface_skips_draws() {
    let mut r = GeometryRenderer::new("idle", RecordingTarget::default(), "hypercube");
    r.render(&frame(16.0)).unwrap();
    assert!(r.target().frames.is_empty());
    r.start();
    r.render(&frame(16.0)).unwrap();
    r.stop();
    r.render(&frame(16.0)).unwrap();
    assert_eq!(r.frames_drawn(), 1);
}

#[test]
fn draw_failure_disables_surface_and_reports_once() {
    let target = RecordingTarget {
        fail_with: Some(RenderSurfaceError::ShaderCompile("bad entry point".into())),
        ..RecordingTarget::default()
    };
    let mut r = GeometryRenderer::new("broken", target, "hypercube");
    r.start();
    assert!(r.render(&frame(16.0)).is_err());
    assert!(matches!(r.status(), SurfaceStatus::Failed(RenderSurfaceError::ShaderCompile(_))));
    assert!(r.render(&frame(16.0)).is_ok());
    assert!(!LayerRenderer::is_active(&r));
    // a failed surface cannot be restarted
    r.start();
    assert!(!LayerRenderer::is_active(&r));
}

#[test]
fn surface_errors_classify_by_recoverability() {
    assert_eq!(classify_surface_error(wgpu::SurfaceError::Timeout), FrameAcquire::Skip);
    assert_eq!(classify_surface_error(wgpu::SurfaceError::Lost), FrameAcquire::Reconfigure);
    assert_eq!(classify_surface_error(wgpu::SurfaceError::Outdated), FrameAcquire::Reconfigure);
    assert!(matches!(
        classify_surface_error(wgpu::SurfaceError::OutOfMemory),
        FrameAcquire::Fatal(_)
    ));
}

#[test]
fn transient_acquire_errors_keep_surface_active() {
    let target = AcquiringTarget {
        pending: VecDeque::from([wgpu::SurfaceError::Timeout, wgpu::SurfaceError::Outdated]),
        ..AcquiringTarget::default()
    };
    let mut r = GeometryRenderer::new("flaky", target, "hypercube");
    r.start();
    for _ in 0..4 {
        assert!(r.render(&frame(16.0)).is_ok());
        assert_eq!(r.status(), &SurfaceStatus::Active);
    }
    assert_eq!(r.target().skipped, 1);
    assert_eq!(r.target().reconfigured, 1);
    assert_eq!(r.target().drawn, 2);

    r.target_mut().pending.push_back(wgpu::SurfaceError::OutOfMemory);
    assert!(r.render(&frame(16.0)).is_err());
    assert!(matches!(r.status(), SurfaceStatus::Failed(_)));
}

#[test]
fn destroy_releases_target_and_blocks_restart() {
    let mut r = renderer("torus");
    r.destroy();
    assert!(r.target().released);
    r.start();
    assert_eq!(r.status(), &SurfaceStatus::Stopped);
}

#[test]
fn unknown_initial_theme_uses_defaults() {
    let r = GeometryRenderer::new("x", RecordingTarget::default(), "nope");
    assert_eq!(r.parameters(), &LatticeParameters::default());
}

fn neutral_uniforms() -> LatticeUniforms {
    let mut u = LatticeUniforms::from_parameters(&LatticeParameters::default(), [800.0, 600.0]);
    u.base_color = [1.0, 1.0, 1.0, 1.0];
    u.color_shift = 0.0;
    u.pattern_intensity = 1.0;
    u.primary_intensity = 0.0;
    u.detail_intensity = 0.0;
    u
}

#[test]
fn channels_coincide_without_glitch() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut u = neutral_uniforms();
    u.glitch_intensity = 0.0;
    u.secondary_intensity = 0.0;
    assert_eq!(chromatic_offset(&u), 0.0);
    for _ in 0..100 {
        let uv = Vec2::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
        let [r, g, b, _] = shade(uv, &u);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }
}

#[test]
fn glitch_splits_red_and_blue_samples() {
    let mut rng = StdRng::seed_from_u64(22);
    let mut u = neutral_uniforms();
    u.glitch_intensity = GLITCH_RANGE.1;
    u.secondary_intensity = 0.0;
    let offset = chromatic_offset(&u);
    assert!((offset - GLITCH_RANGE.1 * CHROMATIC_OFFSET_SCALE).abs() < 1e-6);

    let shift = Vec2::new(offset, 0.0);
    let mut split = 0;
    for _ in 0..200 {
        let uv = Vec2::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
        let [r, g, b, _] = shade(uv, &u);
        assert!((r - lattice_value(uv + shift, &u).clamp(0.0, 1.0)).abs() < 1e-6);
        assert!((g - lattice_value(uv, &u).clamp(0.0, 1.0)).abs() < 1e-6);
        assert!((b - lattice_value(uv - shift, &u).clamp(0.0, 1.0)).abs() < 1e-6);
        if (r - b).abs() > 1e-3 {
            split += 1;
        }
    }
    assert!(split > 0, "no fragment showed a red/blue split");
}

#[test]
fn shade_is_bounded_and_transparent_without_pattern() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut u = LatticeUniforms::from_parameters(&LatticeParameters::default(), [800.0, 600.0]);
    for kind in GeometryKind::ALL {
        u.geometry = kind.index();
        for _ in 0..50 {
            let uv = Vec2::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
            let px = shade(uv, &u);
            assert!(px.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }
    u.pattern_intensity = 0.0;
    assert_eq!(shade(Vec2::new(0.3, 0.3), &u)[3], 0.0);
}
