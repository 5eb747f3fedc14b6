use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::Vec3;
use tracing::{debug, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, HtmlInputElement, Window};

use crate::config::InteractionConfig;
use crate::controller::input::wasm::gamepad_from_js;
use crate::controller::{
    AnimationPlayer, ControllerEvent, Hand, InteractionMode, Labels, ObjectInteractor, PlaybackTask,
};
use crate::model::{DisplayFit, FrameSequence};
use crate::view::labels::{InWorldLabelSink, PageLabelSink};

const TIME_LABEL_ID: &str = "timeLabel";
const SPEED_LABEL_ID: &str = "speedLabel";
const SPEED_CONTROL_ID: &str = "speedControl";

fn js_error<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_hand(name: &str) -> Result<Hand, JsValue> {
    Hand::from_name(name).ok_or_else(|| js_error(format!("unknown hand `{name}`")))
}

/// Runs a [`PlaybackTask`] from a `setTimeout` chain, independent of the render loop
struct TimerDriver {
    window: Window,
    task: RefCell<PlaybackTask>,
    interactor: Rc<RefCell<ObjectInteractor>>,
    on_colors: js_sys::Function,
    timeout: Cell<Option<i32>>,
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
    pushed_version: Cell<u64>,
}

impl TimerDriver {
    fn new(
        window: Window,
        task: PlaybackTask,
        interactor: Rc<RefCell<ObjectInteractor>>,
        on_colors: js_sys::Function,
    ) -> Rc<Self> {
        let driver = Rc::new(Self {
            window,
            task: RefCell::new(task),
            interactor,
            on_colors,
            timeout: Cell::new(None),
            tick: RefCell::new(None),
            pushed_version: Cell::new(0),
        });

        let weak: Weak<Self> = Rc::downgrade(&driver);
        let tick = Closure::wrap(Box::new(move || {
            if let Some(driver) = weak.upgrade() {
                driver.timeout.set(None);
                driver.fire();
            }
        }) as Box<dyn FnMut()>);
        *driver.tick.borrow_mut() = Some(tick);
        driver
    }

    fn now(&self) -> f64 {
        self.window.performance().map(|p| p.now()).unwrap_or(0.0)
    }

    fn fire(&self) {
        let now = self.now();
        {
            let mut interactor = self.interactor.borrow_mut();
            self.task.borrow_mut().poll(now, &mut *interactor);
        }
        self.push_colors();
        // Re-read the state: the color callback may have paused or stopped playback
        let wait = self.task.borrow().time_until_wake(now);
        if let Some(wait) = wait {
            self.schedule(wait);
        }
    }

    /// Hand new colors to the host renderer; borrows are released before calling out
    fn push_colors(&self) {
        let colors = {
            let interactor = self.interactor.borrow();
            let attribute = &interactor.target().colors;
            if attribute.version() == self.pushed_version.get() {
                return;
            }
            self.pushed_version.set(attribute.version());
            js_sys::Float32Array::from(attribute.values())
        };
        if let Err(e) = self.on_colors.call1(&JsValue::NULL, &colors) {
            warn!(error = ?e, "color callback failed");
        }
    }

    fn schedule(&self, wait_ms: f64) {
        self.cancel();
        let tick = self.tick.borrow();
        let Some(tick) = tick.as_ref() else {
            return;
        };
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(tick.as_ref().unchecked_ref(), wait_ms.ceil() as i32)
        {
            Ok(handle) => self.timeout.set(Some(handle)),
            Err(e) => warn!(error = ?e, "failed to schedule playback timer"),
        }
    }

    fn cancel(&self) {
        if let Some(handle) = self.timeout.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    fn start(&self) {
        self.task.borrow_mut().start(self.now());
        self.fire();
    }

    fn pause(&self) {
        self.cancel();
        self.task.borrow_mut().pause(self.now());
    }

    fn resume(&self) {
        let now = self.now();
        let wait = {
            let mut task = self.task.borrow_mut();
            task.resume(now);
            task.time_until_wake(now)
        };
        if let Some(wait) = wait {
            self.schedule(wait);
        }
    }

    fn stop(&self) {
        self.cancel();
        self.task.borrow_mut().stop();
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// JavaScript-facing facade. The host page owns the scene, renderer, loader and
/// VR button; it forwards XR events and per-frame poses here and reads the
/// object transform back.
#[wasm_bindgen]
pub struct WebInteractor {
    window: Window,
    config: InteractionConfig,
    interactor: Rc<RefCell<ObjectInteractor>>,
    playback: Option<Rc<TimerDriver>>,
    slider: Option<(HtmlInputElement, Closure<dyn FnMut(Event)>)>,
}

#[wasm_bindgen]
impl WebInteractor {
    /// In XR mode `time_label` / `speed_label` are in-world text blocks; otherwise the
    /// page elements `#timeLabel`, `#speedLabel` and `#speedControl` are used.
    #[wasm_bindgen(constructor)]
    pub fn new(xr_supported: bool, time_label: JsValue, speed_label: JsValue, init_dist: f32) -> Result<WebInteractor, JsValue> {
        Self::build(xr_supported, time_label, speed_label, init_dist, InteractionConfig::default())
    }

    /// Same as the constructor, with a JSON object overriding interaction constants
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        xr_supported: bool,
        time_label: JsValue,
        speed_label: JsValue,
        init_dist: f32,
        config_json: &str,
    ) -> Result<WebInteractor, JsValue> {
        let config = InteractionConfig::from_json(config_json).map_err(js_error)?;
        Self::build(xr_supported, time_label, speed_label, init_dist, config)
    }

    #[wasm_bindgen(getter = isXr)]
    pub fn is_xr(&self) -> bool {
        self.interactor.borrow().mode() == InteractionMode::Xr
    }

    #[wasm_bindgen(getter)]
    pub fn time(&self) -> f64 {
        self.interactor.borrow().time()
    }

    #[wasm_bindgen(setter)]
    pub fn set_time(&self, time: f64) {
        self.interactor.borrow_mut().set_time(time);
    }

    #[wasm_bindgen(getter = playbackSpeed)]
    pub fn playback_speed(&self) -> f32 {
        self.interactor.borrow().playback_speed()
    }

    #[wasm_bindgen(setter = playbackSpeed)]
    pub fn set_playback_speed(&self, speed: f32) {
        self.interactor.borrow_mut().set_playback_speed(speed);
    }

    #[wasm_bindgen(js_name = sessionStart)]
    pub fn session_start(&self) {
        self.interactor.borrow_mut().session_start();
    }

    #[wasm_bindgen(js_name = sessionEnd)]
    pub fn session_end(&self) {
        self.interactor.borrow_mut().session_end();
    }

    /// Forward a WebXR controller event (`selectstart`, `squeezeend`, `connected`, ...).
    /// `gamepad` is only read for `connected`.
    #[wasm_bindgen(js_name = controllerEvent)]
    pub fn controller_event(&self, hand: &str, event: &str, gamepad: JsValue) -> Result<(), JsValue> {
        self.dispatch_controller_event(parse_hand(hand)?, event, &gamepad);
        Ok(())
    }

    /// Same as `controllerEvent`, addressed by `renderer.xr.getController(index)` slot
    #[wasm_bindgen(js_name = controllerEventAt)]
    pub fn controller_event_at(&self, index: u32, event: &str, gamepad: JsValue) -> Result<(), JsValue> {
        let hand = Hand::from_controller_index(index)
            .ok_or_else(|| js_error(format!("no hand for controller slot {index}")))?;
        self.dispatch_controller_event(hand, event, &gamepad);
        Ok(())
    }

    #[wasm_bindgen(js_name = setControllerPose)]
    pub fn set_controller_pose(&self, hand: &str, x: f32, y: f32, z: f32) -> Result<(), JsValue> {
        let hand = parse_hand(hand)?;
        self.interactor.borrow_mut().update_controller_pose(hand, Vec3::new(x, y, z));
        Ok(())
    }

    #[wasm_bindgen(js_name = setGamepadAxes)]
    pub fn set_gamepad_axes(&self, hand: &str, axes: &[f32]) -> Result<(), JsValue> {
        let hand = parse_hand(hand)?;
        self.interactor.borrow_mut().update_gamepad_axes(hand, axes);
        Ok(())
    }

    /// Call once per animation frame, before rendering
    pub fn poll(&self) {
        self.interactor.borrow_mut().poll_controller_inputs();
    }

    #[wasm_bindgen(js_name = objectPosition)]
    pub fn object_position(&self) -> Vec<f32> {
        self.interactor.borrow().target().transform.position.to_array().to_vec()
    }

    #[wasm_bindgen(js_name = objectQuaternion)]
    pub fn object_quaternion(&self) -> Vec<f32> {
        self.interactor.borrow().target().transform.rotation.to_array().to_vec()
    }

    #[wasm_bindgen(js_name = objectMatrix)]
    pub fn object_matrix(&self) -> Vec<f32> {
        self.interactor.borrow().target().transform.matrix().to_cols_array().to_vec()
    }

    #[wasm_bindgen(js_name = cameraPosition)]
    pub fn camera_position(&self) -> Vec<f32> {
        self.interactor.borrow().camera_position().to_array().to_vec()
    }

    /// `[scale, distance]` for a mesh bounding box
    #[wasm_bindgen(js_name = displayFit)]
    pub fn display_fit(&self, min: &[f32], max: &[f32]) -> Result<Vec<f32>, JsValue> {
        if min.len() != 3 || max.len() != 3 {
            return Err(js_error("bounding box corners need three components"));
        }
        let fit = DisplayFit::from_bounds(
            Vec3::from_slice(min),
            Vec3::from_slice(max),
            self.config.import_mesh_size,
            self.config.camera_distance_factor,
        );
        Ok(vec![fit.scale, fit.distance])
    }

    /// Parse the animation document and start looping it. `on_colors` receives a
    /// `Float32Array` each time the vertex colors change.
    #[wasm_bindgen(js_name = startPlayback)]
    pub fn start_playback(&mut self, animation_json: &str, on_colors: js_sys::Function) -> Result<(), JsValue> {
        let frames = FrameSequence::load_json(animation_json).map_err(|e| {
            tracing::error!(error = %e, "animation data rejected");
            js_error(e)
        })?;
        info!(frames = frames.len(), vertices = frames.vertex_count(), "animation loaded");

        if let Some(previous) = self.playback.take() {
            previous.stop();
        }
        let task = PlaybackTask::new(AnimationPlayer::new(frames, self.config.final_frame_interval_ms));
        let driver = TimerDriver::new(self.window.clone(), task, self.interactor.clone(), on_colors);
        driver.start();
        self.playback = Some(driver);
        Ok(())
    }

    #[wasm_bindgen(js_name = pausePlayback)]
    pub fn pause_playback(&self) {
        if let Some(driver) = &self.playback {
            driver.pause();
        }
    }

    #[wasm_bindgen(js_name = resumePlayback)]
    pub fn resume_playback(&self) {
        if let Some(driver) = &self.playback {
            driver.resume();
        }
    }

    #[wasm_bindgen(js_name = stopPlayback)]
    pub fn stop_playback(&mut self) {
        if let Some(driver) = self.playback.take() {
            driver.stop();
        }
    }
}

impl WebInteractor {
    fn dispatch_controller_event(&self, hand: Hand, event: &str, gamepad: &JsValue) {
        let Some(event) = ControllerEvent::from_web_name(event) else {
            debug!(event, "ignoring unknown controller event");
            return;
        };
        let event = match event {
            ControllerEvent::Connected(_) => ControllerEvent::Connected(gamepad_from_js(gamepad).unwrap_or_default()),
            other => other,
        };
        self.interactor.borrow_mut().handle_controller_event(hand, event);
    }

    fn build(
        xr_supported: bool,
        time_label: JsValue,
        speed_label: JsValue,
        init_dist: f32,
        config: InteractionConfig,
    ) -> Result<WebInteractor, JsValue> {
        let window = web_sys::window().ok_or_else(|| js_error("no global `window`"))?;
        let document = window.document().ok_or_else(|| js_error("no document on window"))?;
        let mode = InteractionMode::from_xr_support(xr_supported);

        let labels = match mode {
            InteractionMode::Xr => Labels::new(InWorldLabelSink::new(time_label), InWorldLabelSink::new(speed_label)),
            InteractionMode::Desktop => Labels::new(
                PageLabelSink::by_id(&document, TIME_LABEL_ID)?,
                PageLabelSink::by_id(&document, SPEED_LABEL_ID)?,
            ),
        };
        let interactor = Rc::new(RefCell::new(ObjectInteractor::new(mode, labels, init_dist, &config)));

        let slider = match mode {
            InteractionMode::Desktop => Some(wire_speed_control(&document, interactor.clone())?),
            InteractionMode::Xr => None,
        };

        Ok(WebInteractor {
            window,
            config,
            interactor,
            playback: None,
            slider,
        })
    }
}

impl Drop for WebInteractor {
    fn drop(&mut self) {
        if let Some(driver) = self.playback.take() {
            driver.stop();
        }
        if let Some((input, listener)) = self.slider.take() {
            let _ = input.remove_event_listener_with_callback("change", listener.as_ref().unchecked_ref());
        }
    }
}

/// Configure `#speedControl` from the speed bounds and route its `change` events
fn wire_speed_control(
    document: &web_sys::Document,
    interactor: Rc<RefCell<ObjectInteractor>>,
) -> Result<(HtmlInputElement, Closure<dyn FnMut(Event)>), JsValue> {
    let input = document
        .get_element_by_id(SPEED_CONTROL_ID)
        .ok_or_else(|| js_error(format!("no element with id `{SPEED_CONTROL_ID}`")))?
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| js_error(format!("`{SPEED_CONTROL_ID}` is not an input element")))?;

    let settings = interactor.borrow().slider_settings();
    input.set_min(&settings.min.to_string());
    input.set_max(&settings.max.to_string());
    input.set_step(&settings.step.to_string());
    input.set_value(&settings.value.to_string());

    let source = input.clone();
    let change = Closure::wrap(Box::new(move |_e: Event| match source.value().parse::<f32>() {
        Ok(value) => interactor.borrow_mut().on_slider_change(value),
        Err(_) => warn!(value = %source.value(), "speed control produced a non-number"),
    }) as Box<dyn FnMut(Event)>);
    input.add_event_listener_with_callback("change", change.as_ref().unchecked_ref())?;

    Ok((input, change))
}
