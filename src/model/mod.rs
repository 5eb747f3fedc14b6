// MODEL: Manipulated object and animation data
pub mod object;
pub mod animation;
pub mod placement;

pub use object::{ColorAttribute, TargetObject, Transform};
pub use animation::{AnimationData, AnimationDataError, AnimationFrame, FrameSequence};
pub use placement::DisplayFit;
