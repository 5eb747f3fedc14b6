// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::{AxisPolicy, ConfigError, InteractionConfig};
pub use controller::{InteractionMode, LabelSink, Labels, ObjectInteractor, PlaybackTask, TextLabel};
pub use model::{AnimationDataError, FrameSequence};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

/// Module entry point: logging only. The host page builds a `WebInteractor`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    logging::init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "meshxr loaded");
}
