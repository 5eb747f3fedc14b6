use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::config::InteractionConfig;
use crate::controller::animation_player::PlaybackTarget;
use crate::controller::input::{ControllerEvent, Hand, XrSession};
use crate::controller::manipulator::TransformManipulator;
use crate::controller::playback_speed::PlaybackSpeedController;
use crate::model::TargetObject;

/// Anything that can display a short status string
pub trait LabelSink {
    fn show(&mut self, text: &str);
}

/// Shared in-memory label, read back by whoever draws it
#[derive(Clone, Debug, Default)]
pub struct TextLabel {
    inner: Rc<RefCell<String>>,
}

impl TextLabel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.inner.borrow().clone()
    }
}

impl LabelSink for TextLabel {
    fn show(&mut self, text: &str) {
        let mut content = self.inner.borrow_mut();
        content.clear();
        content.push_str(text);
    }
}

/// Time and speed label sinks for the active mode
pub struct Labels {
    pub time: Box<dyn LabelSink>,
    pub speed: Box<dyn LabelSink>,
}

impl Labels {
    pub fn new(time: impl LabelSink + 'static, speed: impl LabelSink + 'static) -> Self {
        Self {
            time: Box::new(time),
            speed: Box::new(speed),
        }
    }
}

pub fn format_time(time: f64) -> String {
    format!("Time: {time:.2}s")
}

pub fn format_speed(speed: f32) -> String {
    format!("Speed: {speed:.2}x")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Xr,
    Desktop,
}

impl InteractionMode {
    pub fn from_xr_support(xr_supported: bool) -> Self {
        if xr_supported {
            InteractionMode::Xr
        } else {
            InteractionMode::Desktop
        }
    }
}

/// Range and current value for the desktop speed slider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSettings {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub value: f32,
}

/// Owns the target object and routes input from whichever mode was chosen at construction
pub struct ObjectInteractor {
    mode: InteractionMode,
    target: TargetObject,
    camera_position: Vec3,
    time: f64,
    speed: PlaybackSpeedController,
    manipulator: TransformManipulator,
    labels: Labels,
    session: Option<XrSession>,
}

impl ObjectInteractor {
    /// `init_dist` separates camera and object: in XR the object is pushed away from the
    /// viewer, on desktop the camera is pulled back from the object.
    pub fn new(mode: InteractionMode, labels: Labels, init_dist: f32, config: &InteractionConfig) -> Self {
        let (object_position, camera_position) = match mode {
            InteractionMode::Xr => (Vec3::new(0.0, 0.0, -init_dist), Vec3::ZERO),
            InteractionMode::Desktop => (Vec3::ZERO, Vec3::new(0.0, 0.0, init_dist)),
        };

        let mut interactor = Self {
            mode,
            target: TargetObject::new(object_position),
            camera_position,
            time: 0.0,
            speed: PlaybackSpeedController::new(config),
            manipulator: TransformManipulator::new(config),
            labels,
            session: None,
        };
        interactor.set_playback_speed(1.0);
        interactor.set_time(0.0);
        info!(?mode, init_dist, "object interactor ready");
        interactor
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn target(&self) -> &TargetObject {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut TargetObject {
        &mut self.target
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
        self.labels.time.show(&format_time(time));
    }

    pub fn playback_speed(&self) -> f32 {
        self.speed.speed()
    }

    pub fn set_playback_speed(&mut self, speed: f32) {
        let speed = self.speed.set(speed);
        self.labels.speed.show(&format_speed(speed));
    }

    /// Desktop slider `change` notification
    pub fn on_slider_change(&mut self, value: f32) {
        if !value.is_finite() {
            warn!(value, "ignoring non-finite slider value");
            return;
        }
        self.set_playback_speed(value);
    }

    pub fn slider_settings(&self) -> SliderSettings {
        SliderSettings {
            min: self.speed.min,
            max: self.speed.max,
            step: self.speed.input_scale,
            value: self.speed.speed(),
        }
    }

    pub fn session_start(&mut self) {
        if self.mode != InteractionMode::Xr {
            warn!("XR session start ignored in desktop mode");
            return;
        }
        info!("starting XR session");
        self.session = Some(XrSession::new());
    }

    pub fn session_end(&mut self) {
        if self.session.take().is_some() {
            info!("XR session ended");
        }
    }

    pub fn is_session_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&XrSession> {
        self.session.as_ref()
    }

    pub fn handle_controller_event(&mut self, hand: Hand, event: ControllerEvent) {
        match self.session.as_mut().and_then(|s| s.hand_mut(hand)) {
            Some(controller) => controller.process_event(event),
            None => debug!(hand = hand.name(), ?event, "controller event without a live controller"),
        }
    }

    pub fn update_controller_pose(&mut self, hand: Hand, position: Vec3) {
        if let Some(controller) = self.session.as_mut().and_then(|s| s.hand_mut(hand)) {
            controller.set_position(position);
        }
    }

    pub fn update_gamepad_axes(&mut self, hand: Hand, axes: &[f32]) {
        if let Some(controller) = self.session.as_mut().and_then(|s| s.hand_mut(hand)) {
            controller.set_axes(axes);
        }
    }

    /// Per-frame XR input: rotate, zoom, scrub speed, then roll pose samples
    pub fn poll_controller_inputs(&mut self) {
        if self.mode != InteractionMode::Xr {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        self.manipulator.update(&mut self.target.transform, session);

        let scrubbed = session
            .right
            .as_ref()
            .and_then(|right| right.gamepad.as_ref())
            .map(|gamepad| self.speed.apply_axes(&gamepad.axes));

        session.end_frame();

        if let Some(speed) = scrubbed {
            self.labels.speed.show(&format_speed(speed));
        }
    }
}

impl PlaybackTarget for ObjectInteractor {
    fn playback_speed(&self) -> f32 {
        self.speed.speed()
    }

    fn set_time(&mut self, time: f64) {
        ObjectInteractor::set_time(self, time);
    }

    fn apply_colors(&mut self, colors: &[f32]) {
        self.target.colors.replace(colors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::animation_player::{AnimationPlayer, PlaybackTask};
    use crate::controller::input::Gamepad;
    use crate::model::FrameSequence;
    use glam::Quat;

    /// Keeps every string pushed to it
    #[derive(Clone, Default)]
    struct Recording(Rc<RefCell<Vec<String>>>);

    impl Recording {
        fn lines(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    impl LabelSink for Recording {
        fn show(&mut self, text: &str) {
            self.0.borrow_mut().push(text.to_string());
        }
    }

    fn interactor(mode: InteractionMode) -> (ObjectInteractor, Recording, Recording) {
        let time = Recording::default();
        let speed = Recording::default();
        let labels = Labels::new(time.clone(), speed.clone());
        let interactor = ObjectInteractor::new(mode, labels, 5.0, &InteractionConfig::default());
        (interactor, time, speed)
    }

    #[test]
    fn construction_publishes_initial_values() {
        let (obj, time, speed) = interactor(InteractionMode::Desktop);
        assert_eq!(time.lines(), vec!["Time: 0.00s"]);
        assert_eq!(speed.lines(), vec!["Speed: 1.00x"]);
        assert_eq!(obj.target().transform.position, Vec3::ZERO);
        assert_eq!(obj.camera_position(), Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn xr_places_object_in_front_of_viewer() {
        let (obj, _, _) = interactor(InteractionMode::Xr);
        assert_eq!(obj.target().transform.position, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(obj.camera_position(), Vec3::ZERO);
    }

    #[test]
    fn slider_sets_speed_absolutely() {
        let (mut obj, _, speed) = interactor(InteractionMode::Desktop);
        obj.on_slider_change(0.5);
        assert_eq!(obj.playback_speed(), 0.5);
        assert_eq!(speed.lines().last().unwrap(), "Speed: 0.50x");

        obj.on_slider_change(7.0);
        assert_eq!(obj.playback_speed(), 2.0);
        obj.on_slider_change(f32::NAN);
        assert_eq!(obj.playback_speed(), 2.0);
    }

    #[test]
    fn slider_settings_mirror_bounds() {
        let (obj, _, _) = interactor(InteractionMode::Desktop);
        let settings = obj.slider_settings();
        assert_eq!((settings.min, settings.max, settings.step, settings.value), (0.1, 2.0, 0.1, 1.0));
    }

    #[test]
    fn playback_scenario_labels() {
        let (mut obj, time, _) = interactor(InteractionMode::Desktop);
        let frames = FrameSequence::load_json(
            r#"{ "time": [0, 1, 2], "colors": [[1, 0, 0], [0, 1, 0], [0, 0, 1]] }"#,
        )
        .unwrap();
        let mut task = PlaybackTask::new(AnimationPlayer::new(frames, 1000.0));
        task.start(0.0);

        let mut now = 0.0;
        for _ in 0..4 {
            let wait = task.poll(now, &mut obj).unwrap();
            assert_eq!(wait, 1000.0);
            now += wait;
        }
        assert_eq!(
            time.lines(),
            vec!["Time: 0.00s", "Time: 0.00s", "Time: 1.00s", "Time: 2.00s", "Time: 0.00s"]
        );
        assert_eq!(obj.target().colors.values(), &[1.0, 0.0, 0.0]);
        assert_eq!(obj.target().colors.version(), 4);
    }

    #[test]
    fn desktop_mode_ignores_xr_input() {
        let (mut obj, _, _) = interactor(InteractionMode::Desktop);
        obj.session_start();
        assert!(!obj.is_session_active());
        obj.handle_controller_event(Hand::Right, ControllerEvent::SelectStart);
        obj.poll_controller_inputs();
        assert!(obj.target().transform.rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn xr_rotation_through_facade() {
        let (mut obj, _, _) = interactor(InteractionMode::Xr);
        obj.session_start();
        obj.update_controller_pose(Hand::Right, Vec3::new(0.1, 0.0, 0.0));
        obj.handle_controller_event(Hand::Right, ControllerEvent::SelectStart);
        obj.update_controller_pose(Hand::Right, Vec3::ZERO);
        obj.poll_controller_inputs();
        assert!(obj.target().transform.rotation.abs_diff_eq(Quat::from_rotation_y(-1.0), 1e-5));

        // No movement since the last frame: no further rotation
        obj.poll_controller_inputs();
        assert!(obj.target().transform.rotation.abs_diff_eq(Quat::from_rotation_y(-1.0), 1e-5));
    }

    #[test]
    fn released_hand_never_rotates_from_zeroed_sample() {
        let (mut obj, _, _) = interactor(InteractionMode::Xr);
        obj.session_start();
        obj.update_controller_pose(Hand::Right, Vec3::new(0.3, 1.2, -0.4));
        obj.handle_controller_event(Hand::Right, ControllerEvent::SelectStart);
        obj.handle_controller_event(Hand::Right, ControllerEvent::SelectEnd);
        assert_eq!(obj.session().unwrap().right.as_ref().unwrap().prev_position, Vec3::ZERO);

        obj.poll_controller_inputs();
        assert!(obj.target().transform.rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));

        // Pressing again snapshots afresh
        obj.update_controller_pose(Hand::Right, Vec3::new(0.5, 1.0, 0.0));
        obj.handle_controller_event(Hand::Right, ControllerEvent::SelectStart);
        obj.poll_controller_inputs();
        assert!(obj.target().transform.rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn joystick_scrubs_speed_each_frame() {
        let (mut obj, _, speed) = interactor(InteractionMode::Xr);
        obj.session_start();
        obj.handle_controller_event(
            Hand::Right,
            ControllerEvent::Connected(Gamepad { axes: vec![0.0, 0.0, 1.0, 0.0] }),
        );
        for _ in 0..60 {
            obj.poll_controller_inputs();
        }
        assert!((obj.playback_speed() - 1.1).abs() < 1e-4);
        assert_eq!(speed.lines().last().unwrap(), "Speed: 1.10x");

        // Left stick does nothing
        obj.update_gamepad_axes(Hand::Right, &[0.0; 4]);
        obj.handle_controller_event(
            Hand::Left,
            ControllerEvent::Connected(Gamepad { axes: vec![0.0, 0.0, 1.0, 0.0] }),
        );
        let before = obj.playback_speed();
        obj.poll_controller_inputs();
        assert_eq!(obj.playback_speed(), before);
    }

    #[test]
    fn session_end_drops_controllers() {
        let (mut obj, _, _) = interactor(InteractionMode::Xr);
        obj.session_start();
        obj.session_end();
        assert!(!obj.is_session_active());
        // Events racing the session end are tolerated
        obj.handle_controller_event(Hand::Left, ControllerEvent::SqueezeStart);
        obj.update_controller_pose(Hand::Left, Vec3::ONE);
        obj.poll_controller_inputs();

        obj.session_start();
        assert_eq!(obj.session().unwrap().left.as_ref().unwrap().prev_position, Vec3::ZERO);
    }

    #[test]
    fn two_handed_zoom_through_facade() {
        let (mut obj, _, _) = interactor(InteractionMode::Xr);
        obj.session_start();
        obj.update_controller_pose(Hand::Left, Vec3::new(-0.2, 1.0, 0.0));
        obj.update_controller_pose(Hand::Right, Vec3::new(0.2, 1.0, 0.0));
        obj.handle_controller_event(Hand::Left, ControllerEvent::SqueezeStart);
        obj.handle_controller_event(Hand::Right, ControllerEvent::SqueezeStart);
        obj.update_controller_pose(Hand::Left, Vec3::new(-0.25, 1.0, 0.0));
        obj.poll_controller_inputs();
        assert!(obj.target().transform.position.abs_diff_eq(Vec3::new(0.0, 0.0, -4.0), 1e-4));
    }

    #[test]
    fn text_label_keeps_latest() {
        let mut label = TextLabel::new();
        let reader = label.clone();
        label.show("Time: 1.00s");
        label.show("Time: 2.00s");
        assert_eq!(reader.text(), "Time: 2.00s");
    }
}
