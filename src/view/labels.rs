use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

use crate::controller::LabelSink;

/// Page-level text node, updated through `innerText`
pub struct PageLabelSink {
    element: HtmlElement,
}

impl PageLabelSink {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }

    pub fn by_id(document: &Document, id: &str) -> Result<Self, JsValue> {
        let element = document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id `{id}`")))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| JsValue::from_str(&format!("`{id}` is not an HTML element")))?;
        Ok(Self::new(element))
    }
}

impl LabelSink for PageLabelSink {
    fn show(&mut self, text: &str) {
        self.element.set_inner_text(text);
    }
}

/// In-scene text block exposing `set({ content })`
pub struct InWorldLabelSink {
    block: JsValue,
}

impl InWorldLabelSink {
    pub fn new(block: JsValue) -> Self {
        Self { block }
    }

    fn set_content(&self, text: &str) -> Result<(), JsValue> {
        let props = js_sys::Object::new();
        js_sys::Reflect::set(&props, &JsValue::from_str("content"), &JsValue::from_str(text))?;
        let set = js_sys::Reflect::get(&self.block, &JsValue::from_str("set"))?
            .dyn_into::<js_sys::Function>()?;
        set.call1(&self.block, &props)?;
        Ok(())
    }
}

impl LabelSink for InWorldLabelSink {
    fn show(&mut self, text: &str) {
        if let Err(e) = self.set_content(text) {
            tracing::warn!(error = ?e, "in-world label rejected update");
        }
    }
}
