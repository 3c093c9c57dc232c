mod compositor;
mod host;

use compositor::{Compositor, LayerTarget};
use host::{FilePresetStore, LogSink};
use lattice_core::{
    EffectTarget, EffectsOrchestrator, FrameClock, FrameState, GeometryRenderer, InstanceRole,
    InstantClock, InteractionEvent, LatticeConfig, RendererOptions, SynchronizationBridge,
    TriggerOptions,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use winit::event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

/// Pointer travel in physical pixels per event that counts as full mouse magnitude.
const POINTER_MAGNITUDE_PX: f32 = 40.0;
/// Pixels of scroll per wheel line.
const WHEEL_LINE_PX: f32 = 40.0;
const PROFILE_DIR: &str = ".hyperlattice";

struct App {
    window: Arc<Window>,
    compositor: Rc<RefCell<Compositor>>,
    bridge: SynchronizationBridge<LogSink>,
    effects: EffectsOrchestrator,
    store: FilePresetStore,
    clock: InstantClock,
    cursor: [f32; 2],
    next_preset: usize,
    paused: bool,
    title_section: String,
}

impl App {
    fn normalized(&self, x: f64, y: f64) -> [f32; 2] {
        let size = self.window.inner_size();
        [
            (x as f32 / size.width.max(1) as f32).clamp(0.0, 1.0),
            (y as f32 / size.height.max(1) as f32).clamp(0.0, 1.0),
        ]
    }

    fn frame(&mut self) {
        let dt = self.clock.delta_ms();
        if self.paused {
            return;
        }
        self.effects.tick(&mut self.bridge, dt);
        self.bridge.process_frame(dt);

        let acquired = self.compositor.borrow_mut().begin_frame();
        match acquired {
            Ok(true) => {
                self.bridge
                    .render_all(&FrameState::new(self.clock.now_ms(), dt));
                self.compositor.borrow_mut().end_frame();
            }
            Ok(false) => {}
            Err(e) => log::warn!("[frame] surface unavailable: {}", e),
        }

        let section = self.bridge.authority().active_section();
        if section != self.title_section {
            self.title_section = section.to_string();
            self.window
                .set_title(&format!("hyperlattice: {}", self.title_section));
        }
    }

    fn trigger_next_preset(&mut self) {
        let names: Vec<String> = self.effects.preset_names().map(str::to_string).collect();
        if names.is_empty() {
            return;
        }
        let name = &names[self.next_preset % names.len()];
        self.next_preset += 1;
        log::info!("[effects] {}", name);
        self.effects.trigger_effect(
            &mut self.bridge,
            name,
            EffectTarget::Auto,
            TriggerOptions::default(),
        );
        if let Err(e) = self.effects.save_profile(&mut self.store) {
            log::warn!("[effects] profile not saved: {:#}", e);
        }
    }

    fn on_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Space) => {
                self.paused = !self.paused;
                log::info!("[input] paused={}", self.paused);
            }
            Key::Named(NamedKey::Escape) => {
                self.bridge.queue_event(InteractionEvent::Keypress {
                    key: "Escape".into(),
                });
            }
            Key::Character(c) if c.eq_ignore_ascii_case("e") => self.trigger_next_preset(),
            Key::Character(c) => self.bridge.queue_event(InteractionEvent::Keypress {
                key: c.to_string(),
            }),
            _ => {}
        }
    }

    fn on_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => return false,
            WindowEvent::Resized(size) => self.compositor.borrow_mut().resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                let [x, y] = self.normalized(position.x, position.y);
                let size = self.window.inner_size();
                let dx = (x - self.cursor[0]) * size.width as f32;
                let dy = (y - self.cursor[1]) * size.height as f32;
                self.cursor = [x, y];
                let magnitude = (dx * dx + dy * dy).sqrt() / POINTER_MAGNITUDE_PX;
                self.bridge
                    .queue_event(InteractionEvent::Mouse { x, y, magnitude });
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    let [x, y] = self.cursor;
                    self.bridge.queue_event(InteractionEvent::Click { x, y });
                    self.bridge.begin_hold();
                }
                ElementState::Released => self.bridge.end_hold(),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let velocity = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_PX,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                self.bridge.queue_event(InteractionEvent::Scroll { velocity });
            }
            WindowEvent::KeyboardInput { event, .. } => self.on_key(&event),
            _ => {}
        }
        true
    }
}

fn load_config() -> LatticeConfig {
    let Some(path) = std::env::args().nth(1) else {
        return LatticeConfig::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(json) => {
            log::info!("[config] loading {}", path);
            LatticeConfig::from_json_or_default(&json)
        }
        Err(e) => {
            log::error!("[config] {}: {}; using built-in defaults", path, e);
            LatticeConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = load_config();
    let mut bridge = config.build_bridge(LogSink::default())?;

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("hyperlattice")
            .build(&event_loop)?,
    );
    let compositor = Rc::new(RefCell::new(pollster::block_on(Compositor::new(
        window.clone(),
    ))?));

    let section_theme = {
        let authority = bridge.authority();
        authority
            .sections()
            .get(authority.active_section())
            .map(|s| s.geometry.theme_name())
            .unwrap_or("hypercube")
    };
    // back to front; layers fan out horizontally so focus has somewhere to move
    for (i, role) in InstanceRole::ALL.into_iter().enumerate() {
        let slot = match pollster::block_on(compositor.borrow_mut().add_layer()) {
            Ok(slot) => slot,
            Err(e) => {
                log::error!("[init] {} layer unavailable: {}", role.name(), e);
                continue;
            }
        };
        let target = LayerTarget::new(compositor.clone(), slot);
        let renderer = GeometryRenderer::new(role.name(), target, section_theme);
        let cx = (i as f32 + 0.5) / InstanceRole::ALL.len() as f32;
        bridge.register(
            Box::new(renderer),
            RendererOptions::new(role)
                .with_center(cx, 0.5)
                .with_theme(section_theme),
        );
    }

    let mut effects = EffectsOrchestrator::new();
    let store = FilePresetStore::new(PROFILE_DIR);
    match effects.load_profile(&store) {
        Ok(true) => log::info!("[effects] restored preset profile"),
        Ok(false) => {}
        Err(e) => log::warn!("[effects] stored profile ignored: {:#}", e),
    }

    bridge.sync_all_layers();
    bridge.start_all();
    log::info!(
        "[init] global-intensity {:?}",
        bridge.sink().scalar("global-intensity")
    );

    let mut app = App {
        window,
        compositor,
        bridge,
        effects,
        store,
        clock: InstantClock::new(),
        cursor: [0.5, 0.5],
        next_preset: 0,
        paused: false,
        title_section: String::new(),
    };

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => {
            if !app.on_window_event(event) {
                elwt.exit();
            }
        }
        Event::AboutToWait => {
            app.frame();
            app.window.request_redraw();
        }
        _ => {}
    })?;
    Ok(())
}
