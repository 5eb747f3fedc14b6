// CONTROLLER: Input, manipulation, playback and the mode facade
pub mod input;
pub mod manipulator;
pub mod playback_speed;
pub mod animation_player;
pub mod interactor;

pub use input::{ControllerEvent, Gamepad, Hand, HandController, HandPhase, XrSession};
pub use manipulator::TransformManipulator;
pub use playback_speed::PlaybackSpeedController;
pub use animation_player::{AnimationPlayer, PlaybackTarget, PlaybackTask, TaskState};
pub use interactor::{InteractionMode, LabelSink, Labels, ObjectInteractor, SliderSettings, TextLabel};
