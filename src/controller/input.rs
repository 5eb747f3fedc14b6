/// Platform-agnostic XR controller input
use glam::Vec3;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Hand::Left),
            "right" => Some(Hand::Right),
            _ => None,
        }
    }

    /// WebXR controller slot: 0 is the right hand, 1 the left
    pub fn from_controller_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Hand::Right),
            1 => Some(Hand::Left),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }
}

/// Snapshot of a controller's analog axes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gamepad {
    pub axes: Vec<f32>,
}

/// Discrete hardware events for one hand
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    Connected(Gamepad),
    Disconnected,
    SelectStart,
    SelectEnd,
    SqueezeStart,
    SqueezeEnd,
}

impl ControllerEvent {
    /// Map a WebXR controller event name. `connected` carries no gamepad here;
    /// attach one with [`HandController::set_axes`] or build the variant directly.
    pub fn from_web_name(name: &str) -> Option<Self> {
        match name {
            "connected" => Some(ControllerEvent::Connected(Gamepad::default())),
            "disconnected" => Some(ControllerEvent::Disconnected),
            "selectstart" => Some(ControllerEvent::SelectStart),
            "selectend" => Some(ControllerEvent::SelectEnd),
            "squeezestart" => Some(ControllerEvent::SqueezeStart),
            "squeezeend" => Some(ControllerEvent::SqueezeEnd),
            _ => None,
        }
    }
}

/// Button state of a hand.
///
/// Trigger (select) and grip (squeeze) are independent buttons, so both can be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPhase {
    Disconnected,
    Connected,
    Selecting,
    Gripping,
    SelectingAndGripping,
}

impl HandPhase {
    pub fn on_event(self, event: &ControllerEvent) -> Self {
        use HandPhase::*;
        match (self, event) {
            (_, ControllerEvent::Disconnected) => Disconnected,
            (Disconnected, ControllerEvent::Connected(_)) => Connected,
            (Disconnected | Connected, ControllerEvent::SelectStart) => Selecting,
            (Gripping, ControllerEvent::SelectStart) => SelectingAndGripping,
            (Selecting, ControllerEvent::SelectEnd) => Connected,
            (SelectingAndGripping, ControllerEvent::SelectEnd) => Gripping,
            (Disconnected | Connected, ControllerEvent::SqueezeStart) => Gripping,
            (Selecting, ControllerEvent::SqueezeStart) => SelectingAndGripping,
            (Gripping, ControllerEvent::SqueezeEnd) => Connected,
            (SelectingAndGripping, ControllerEvent::SqueezeEnd) => Selecting,
            (phase, _) => phase,
        }
    }

    pub fn is_selected(self) -> bool {
        matches!(self, HandPhase::Selecting | HandPhase::SelectingAndGripping)
    }

    pub fn is_gripped(self) -> bool {
        matches!(self, HandPhase::Gripping | HandPhase::SelectingAndGripping)
    }

    fn is_holding(self) -> bool {
        self.is_selected() || self.is_gripped()
    }
}

/// Per-hand controller state for the lifetime of an XR session
#[derive(Debug, Clone)]
pub struct HandController {
    pub hand: Hand,
    pub phase: HandPhase,
    pub position: Vec3,
    pub prev_position: Vec3,
    pub gamepad: Option<Gamepad>,
}

impl HandController {
    pub fn new(hand: Hand) -> Self {
        Self {
            hand,
            phase: HandPhase::Disconnected,
            position: Vec3::ZERO,
            prev_position: Vec3::ZERO,
            gamepad: None,
        }
    }

    /// Process a hardware event and update state
    pub fn process_event(&mut self, event: ControllerEvent) {
        let before = self.phase;
        self.phase = before.on_event(&event);
        debug!(hand = self.hand.name(), ?before, after = ?self.phase, ?event, "controller event");

        match event {
            ControllerEvent::Connected(gamepad) => {
                self.gamepad = Some(gamepad);
            }
            ControllerEvent::Disconnected => {
                self.gamepad = None;
                self.prev_position = Vec3::ZERO;
            }
            ControllerEvent::SelectStart | ControllerEvent::SqueezeStart => {
                self.prev_position = self.position;
            }
            ControllerEvent::SelectEnd | ControllerEvent::SqueezeEnd => {
                // The other button may still be held; only an idle hand forgets its sample
                self.prev_position = if self.phase.is_holding() {
                    self.position
                } else {
                    Vec3::ZERO
                };
            }
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_axes(&mut self, axes: &[f32]) {
        let gamepad = self.gamepad.get_or_insert_with(Gamepad::default);
        gamepad.axes.clear();
        gamepad.axes.extend_from_slice(axes);
    }

    pub fn is_selected(&self) -> bool {
        self.phase.is_selected()
    }

    pub fn is_gripped(&self) -> bool {
        self.phase.is_gripped()
    }

    /// Movement since the last frame, as `prev - current`
    pub fn delta(&self) -> Vec3 {
        self.prev_position - self.position
    }

    /// Roll the current sample into `prev_position` once every consumer has read it
    pub fn end_frame(&mut self) {
        self.prev_position = self.position;
    }
}

/// Controller state that exists only while an XR session is running
#[derive(Debug, Clone)]
pub struct XrSession {
    pub left: Option<HandController>,
    pub right: Option<HandController>,
}

impl XrSession {
    pub fn new() -> Self {
        Self {
            left: Some(HandController::new(Hand::Left)),
            right: Some(HandController::new(Hand::Right)),
        }
    }

    pub fn hand(&self, hand: Hand) -> Option<&HandController> {
        match hand {
            Hand::Left => self.left.as_ref(),
            Hand::Right => self.right.as_ref(),
        }
    }

    pub fn hand_mut(&mut self, hand: Hand) -> Option<&mut HandController> {
        match hand {
            Hand::Left => self.left.as_mut(),
            Hand::Right => self.right.as_mut(),
        }
    }

    pub fn end_frame(&mut self) {
        for controller in [self.left.as_mut(), self.right.as_mut()].into_iter().flatten() {
            controller.end_frame();
        }
    }
}

impl Default for XrSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use wasm_bindgen::JsValue;

    /// Read `gamepad.axes` from a WebXR input source's gamepad object
    pub fn gamepad_from_js(gamepad: &JsValue) -> Option<Gamepad> {
        if gamepad.is_undefined() || gamepad.is_null() {
            return None;
        }
        let axes = js_sys::Reflect::get(gamepad, &JsValue::from_str("axes")).ok()?;
        let axes = js_sys::Array::from(&axes)
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        Some(Gamepad { axes })
    }
}
