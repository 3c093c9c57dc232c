#![cfg(target_arch = "wasm32")]
mod dom;
mod events;
mod frame;
mod sink;
mod storage;
mod target;

use frame::FrameContext;
use lattice_core::effects::EffectLevel;
use lattice_core::{
    EffectsOrchestrator, GeometryRenderer, InstanceRole, InstantClock, RendererOptions,
    TriggerOptions,
};
use sink::CssVariableSink;
use std::cell::RefCell;
use std::rc::Rc;
use storage::LocalStorageStore;
use target::CanvasTarget;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

thread_local! {
    static CONTEXT: RefCell<Option<Rc<RefCell<FrameContext>>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("lattice-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:#}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let root = document
        .document_element()
        .ok_or_else(|| anyhow::anyhow!("no document element"))?
        .dyn_into::<web::HtmlElement>()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let config = dom::read_config(&document);
    let mut bridge = config.build_bridge(CssVariableSink::new(&root))?;
    let default_theme = {
        let authority = bridge.authority();
        authority
            .sections()
            .get(authority.active_section())
            .map(|s| s.geometry.theme_name())
            .unwrap_or("hypercube")
    };

    let mut layers = Vec::new();
    for (i, canvas) in dom::layer_canvases(&document).into_iter().enumerate() {
        let role_name = canvas.get_attribute("data-lattice-role").unwrap_or_default();
        let role = InstanceRole::resolve(&role_name);
        let label = match canvas.id() {
            id if id.is_empty() => format!("layer-{i}"),
            id => id,
        };
        let theme = canvas
            .get_attribute("data-lattice-theme")
            .unwrap_or_else(|| default_theme.to_string());

        dom::sync_canvas_backing_size(&canvas);
        // a layer without a GPU path stays blank; the rest of the page still runs
        let target = match CanvasTarget::new(canvas.clone()).await {
            Ok(t) => t,
            Err(e) => {
                log::error!("[init] {}: {}", label, e);
                continue;
            }
        };
        bridge.sink_mut().bind_layer(&label, &canvas);
        let [cx, cy] = dom::element_center(&canvas);
        let renderer = GeometryRenderer::new(label, target, &theme);
        let id = bridge.register(
            Box::new(renderer),
            RendererOptions::new(role).with_center(cx, cy).with_theme(theme),
        );
        layers.push((id, canvas));
    }
    log::info!("[init] {} lattice layers", layers.len());

    let mut effects = EffectsOrchestrator::new();
    let store = match LocalStorageStore::open() {
        Ok(s) => {
            match effects.load_profile(&s) {
                Ok(true) => log::info!("[effects] restored preset profile"),
                Ok(false) => {}
                Err(e) => log::warn!("[effects] stored profile ignored: {:#}", e),
            }
            Some(s)
        }
        Err(e) => {
            log::warn!("[effects] no profile storage: {:#}", e);
            None
        }
    };

    bridge.sync_all_layers();
    bridge.start_all();

    let ctx = Rc::new(RefCell::new(FrameContext {
        bridge,
        effects,
        clock: InstantClock::new(),
        store,
        layers,
        paused: false,
    }));
    events::wire(&window, &ctx);
    CONTEXT.with(|c| *c.borrow_mut() = Some(ctx.clone()));
    frame::start_loop(ctx);
    Ok(())
}

fn with_context<R>(f: impl FnOnce(&mut FrameContext) -> R) -> Result<R, JsValue> {
    CONTEXT.with(|c| match c.borrow().as_ref() {
        Some(ctx) => Ok(f(&mut ctx.borrow_mut())),
        None => Err(JsValue::from_str("lattice not initialised")),
    })
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Queue a host event such as `("section", {id: "lab"})`. Unknown kinds return false.
#[wasm_bindgen(js_name = handleEvent)]
pub fn handle_event(kind: &str, payload: JsValue) -> Result<bool, JsValue> {
    let json = if payload.is_undefined() || payload.is_null() {
        serde_json::Value::Null
    } else {
        let text: String = js_sys::JSON::stringify(&payload)?.into();
        serde_json::from_str(&text).map_err(js_error)?
    };
    with_context(|c| c.bridge.handle_event(kind, &json))
}

#[wasm_bindgen(js_name = triggerEffect)]
pub fn trigger_effect(name: &str, intensity: Option<f32>, level: Option<String>) -> Result<bool, JsValue> {
    let options = TriggerOptions {
        intensity: intensity.unwrap_or(1.0),
        level: level.as_deref().and_then(EffectLevel::from_name),
        ..TriggerOptions::default()
    };
    with_context(|c| c.trigger(name, options))
}

#[wasm_bindgen(js_name = cancelEffect)]
pub fn cancel_effect(name: &str) -> Result<bool, JsValue> {
    with_context(|c| c.effects.cancel_effect(&mut c.bridge, name))
}

#[wasm_bindgen(js_name = importPresets)]
pub fn import_presets(json: &str) -> Result<u32, JsValue> {
    with_context(|c| c.effects.import_presets(json))?
        .map(|n| n as u32)
        .map_err(js_error)
}

#[wasm_bindgen(js_name = exportPresets)]
pub fn export_presets() -> Result<String, JsValue> {
    with_context(|c| c.effects.export_presets())?.map_err(js_error)
}

#[wasm_bindgen(js_name = exportProfile)]
pub fn export_profile() -> Result<String, JsValue> {
    with_context(|c| c.effects.export_profile())?.map_err(js_error)
}
