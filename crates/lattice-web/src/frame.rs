use crate::sink::CssVariableSink;
use crate::storage::LocalStorageStore;
use lattice_core::{
    EffectTarget, EffectsOrchestrator, FrameClock, FrameState, InstantClock, RendererId,
    SynchronizationBridge, TriggerOptions,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

const DIAGNOSTICS_EVERY_FRAMES: u64 = 600;

/// Everything the animation loop and the DOM listeners share.
pub struct FrameContext {
    pub bridge: SynchronizationBridge<CssVariableSink>,
    pub effects: EffectsOrchestrator,
    pub clock: InstantClock,
    pub store: Option<LocalStorageStore>,
    /// Layer canvases with their renderer ids, for re-centering on resize.
    pub layers: Vec<(RendererId, web::HtmlCanvasElement)>,
    pub paused: bool,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let dt = self.clock.delta_ms();
        if self.paused {
            return;
        }
        self.effects.tick(&mut self.bridge, dt);
        self.bridge.process_frame(dt);
        let drawn = self
            .bridge
            .render_all(&FrameState::new(self.clock.now_ms(), dt));

        let diag = self.bridge.diagnostics();
        if diag.frames % DIAGNOSTICS_EVERY_FRAMES == 0 {
            log::debug!(
                "[frame] {} frames, {} layers drawn, {} events ({} dropped), {} failures",
                diag.frames,
                drawn,
                diag.events_processed,
                diag.events_dropped,
                diag.renderer_failures
            );
        }
    }

    /// Trigger a preset against the current focus and persist the profile.
    pub fn trigger(&mut self, name: &str, options: TriggerOptions) -> bool {
        let ok = self
            .effects
            .trigger_effect(&mut self.bridge, name, EffectTarget::Auto, options);
        if ok {
            self.persist_profile();
        }
        ok
    }

    pub fn persist_profile(&mut self) {
        if let Some(store) = &mut self.store {
            if let Err(e) = self.effects.save_profile(store) {
                log::warn!("[effects] profile not saved: {:#}", e);
            }
        }
    }

    pub fn recenter_layers(&mut self) {
        for (id, canvas) in &self.layers {
            crate::dom::sync_canvas_backing_size(canvas);
            let [x, y] = crate::dom::element_center(canvas);
            self.bridge.set_center(*id, x, y);
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        if let Some(w) = web::window() {
            if let Some(cb) = tick_clone.borrow().as_ref() {
                let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        if let Some(cb) = tick.borrow().as_ref() {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    };
}
