use fnv::FnvHashMap;
use lattice_core::{VariableSink, VariableValue};
use web_sys as web;

/// Writes live values as `--name` CSS custom properties. Global values go on
/// the document root; element-scoped values go on the layer's own element.
pub struct CssVariableSink {
    root: web::CssStyleDeclaration,
    layers: FnvHashMap<String, web::CssStyleDeclaration>,
}

impl CssVariableSink {
    pub fn new(root: &web::HtmlElement) -> Self {
        Self {
            root: root.style(),
            layers: FnvHashMap::default(),
        }
    }

    pub fn bind_layer(&mut self, label: &str, element: &web::HtmlElement) {
        self.layers.insert(label.to_string(), element.style());
    }
}

fn write(style: &web::CssStyleDeclaration, name: &str, value: &VariableValue) {
    if let Err(e) = style.set_property(&format!("--{name}"), &value.to_string()) {
        log::warn!("[css] --{}: {:?}", name, e);
    }
}

impl VariableSink for CssVariableSink {
    fn set(&mut self, name: &str, value: &VariableValue) {
        write(&self.root, name, value);
    }

    fn set_layer(&mut self, layer: &str, name: &str, value: &VariableValue) {
        match self.layers.get(layer) {
            Some(style) => write(style, name, value),
            None => write(&self.root, &format!("{layer}-{name}"), value),
        }
    }
}
