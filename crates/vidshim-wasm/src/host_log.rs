//! Bridge to the host player's log function

use js_sys::Function;
use wasm_bindgen::JsValue;

use vidshim_core::Logger;

/// Calls the host's `log(message)` or falls back to the console
#[derive(Debug, Clone, Default)]
pub struct HostLogger {
    sink: Option<Function>,
}

impl HostLogger {
    pub fn new(sink: Option<Function>) -> Self {
        Self { sink }
    }
}

impl Logger for HostLogger {
    fn log(&self, message: &str) {
        let line = JsValue::from_str(message);
        match &self.sink {
            // Fire and forget
            Some(sink) => {
                let _ = sink.call1(&JsValue::NULL, &line);
            }
            None => web_sys::console::log_2(&"[VidShim]".into(), &line),
        }
    }
}
