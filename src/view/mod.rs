// VIEW: Label sinks, browser bindings and the native window surface
#[cfg(target_arch = "wasm32")]
pub mod labels;
#[cfg(target_arch = "wasm32")]
pub mod web;
#[cfg(not(target_arch = "wasm32"))]
pub mod gpu_init;

#[cfg(target_arch = "wasm32")]
pub use labels::{InWorldLabelSink, PageLabelSink};
#[cfg(target_arch = "wasm32")]
pub use web::WebInteractor;
#[cfg(not(target_arch = "wasm32"))]
pub use gpu_init::GpuContext;
