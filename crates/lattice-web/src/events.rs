use crate::dom;
use crate::frame::FrameContext;
use lattice_core::{InteractionEvent, TriggerOptions};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Pointer travel in CSS pixels per event that counts as full mouse magnitude.
const POINTER_MAGNITUDE_PX: f32 = 40.0;

pub const EFFECT_ATTR: &str = "data-lattice-effect";
pub const SECTION_ATTR: &str = "data-lattice-section";

fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
    target: &web::EventTarget,
    kind: &str,
    handler: impl FnMut(E) + 'static,
) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
        log::warn!("[events] {} listener: {:?}", kind, e);
    }
    closure.forget();
}

pub fn wire(window: &web::Window, ctx: &Rc<RefCell<FrameContext>>) {
    let target: &web::EventTarget = window.as_ref();

    {
        let ctx = ctx.clone();
        listen(target, "pointermove", move |ev: web::PointerEvent| {
            let [x, y] = dom::normalized(ev.client_x() as f32, ev.client_y() as f32);
            let dx = ev.movement_x() as f32;
            let dy = ev.movement_y() as f32;
            let magnitude = (dx * dx + dy * dy).sqrt() / POINTER_MAGNITUDE_PX;
            ctx.borrow_mut()
                .bridge
                .queue_event(InteractionEvent::Mouse { x, y, magnitude });
        });
    }

    {
        let ctx = ctx.clone();
        listen(target, "click", move |ev: web::MouseEvent| {
            let [x, y] = dom::normalized(ev.client_x() as f32, ev.client_y() as f32);
            let mut c = ctx.borrow_mut();
            if let Some(id) = dom::closest_attr(ev.target(), SECTION_ATTR) {
                c.bridge.queue_event(InteractionEvent::Section { id });
            }
            if let Some(preset) = dom::closest_attr(ev.target(), EFFECT_ATTR) {
                c.trigger(&preset, TriggerOptions::default());
            }
            c.bridge.queue_event(InteractionEvent::Click { x, y });
        });
    }

    {
        let ctx = ctx.clone();
        listen(target, "wheel", move |ev: web::WheelEvent| {
            ctx.borrow_mut().bridge.queue_event(InteractionEvent::Scroll {
                velocity: ev.delta_y() as f32,
            });
        });
    }

    {
        let ctx = ctx.clone();
        listen(target, "keydown", move |ev: web::KeyboardEvent| {
            let key = ev.key();
            let mut c = ctx.borrow_mut();
            if key == " " {
                c.paused = !c.paused;
                log::info!("[events] paused={}", c.paused);
                ev.prevent_default();
                return;
            }
            c.bridge.queue_event(InteractionEvent::Keypress { key });
        });
    }

    {
        let ctx = ctx.clone();
        listen(target, "pointerdown", move |_ev: web::PointerEvent| {
            ctx.borrow_mut().bridge.begin_hold();
        });
    }

    for kind in ["pointerup", "pointercancel"] {
        let ctx = ctx.clone();
        listen(target, kind, move |_ev: web::PointerEvent| {
            ctx.borrow_mut().bridge.end_hold();
        });
    }

    {
        let ctx = ctx.clone();
        listen(target, "resize", move |_ev: web::Event| {
            ctx.borrow_mut().recenter_layers();
        });
    }
}
