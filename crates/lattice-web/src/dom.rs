use lattice_core::LatticeConfig;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Element id of an optional `<script type="application/json">` config block.
pub const CONFIG_ELEMENT_ID: &str = "lattice-config";
/// Canvases carrying this data attribute become lattice layers.
pub const LAYER_SELECTOR: &str = "canvas[data-lattice-role]";

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

/// Viewport size in CSS pixels.
pub fn viewport_size() -> [f32; 2] {
    let Some(w) = web::window() else {
        return [1.0, 1.0];
    };
    let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0).max(1.0) as f32
    };
    [dim(w.inner_width()), dim(w.inner_height())]
}

/// Client coordinates mapped to [0, 1] over the viewport.
pub fn normalized(client_x: f32, client_y: f32) -> [f32; 2] {
    let [w, h] = viewport_size();
    [(client_x / w).clamp(0.0, 1.0), (client_y / h).clamp(0.0, 1.0)]
}

/// Center of an element in normalized viewport coordinates.
pub fn element_center(el: &web::Element) -> [f32; 2] {
    let rect = el.get_bounding_client_rect();
    normalized(
        (rect.left() + rect.width() * 0.5) as f32,
        (rect.top() + rect.height() * 0.5) as f32,
    )
}

/// Read the page config block, falling back to built-in defaults.
pub fn read_config(document: &web::Document) -> LatticeConfig {
    match document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    {
        Some(json) if !json.trim().is_empty() => LatticeConfig::from_json_or_default(&json),
        _ => LatticeConfig::default(),
    }
}

/// All layer canvases in document order.
pub fn layer_canvases(document: &web::Document) -> Vec<web::HtmlCanvasElement> {
    let Ok(list) = document.query_selector_all(LAYER_SELECTOR) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<web::HtmlCanvasElement>().ok())
        .collect()
}

/// Nearest ancestor (or self) of the event target carrying `attr`, and its value.
pub fn closest_attr(target: Option<web::EventTarget>, attr: &str) -> Option<String> {
    let el = target?.dyn_into::<web::Element>().ok()?;
    let found = el.closest(&format!("[{attr}]")).ok()??;
    found.get_attribute(attr)
}
