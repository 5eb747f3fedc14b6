use glam::Vec3;

use crate::config::InteractionConfig;
use crate::controller::input::{HandController, XrSession};
use crate::model::Transform;

/// World axis for the pitch rotation
pub const PITCH_AXIS: Vec3 = Vec3::NEG_X;

/// Maps hand movement directly onto the object transform (no smoothing)
#[derive(Clone, Copy, Debug)]
pub struct TransformManipulator {
    pub rot_input_scale: f32,
    pub zoom_input_scale: f32,
}

impl TransformManipulator {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            rot_input_scale: config.rot_input_scale,
            zoom_input_scale: config.zoom_input_scale,
        }
    }

    /// Yaw about the local up axis and pitch about the world axis from one hand's delta
    pub fn apply_rotation(&self, transform: &mut Transform, delta: Vec3) {
        transform.rotate_y(-delta.x * self.rot_input_scale);
        transform.rotate_on_world_axis(PITCH_AXIS, -delta.y * self.rot_input_scale);
    }

    /// Two-handed zoom along the local forward axis.
    /// Returns the applied translation distance, if any.
    pub fn apply_zoom(&self, transform: &mut Transform, left: &HandController, right: &HandController) -> Option<f32> {
        if !(left.is_gripped() && right.is_gripped()) {
            return None;
        }
        let prev_dist = (left.prev_position - right.prev_position).length();
        let current_dist = (left.position - right.position).length();
        let zoom = (current_dist - prev_dist) * self.zoom_input_scale;
        transform.translate_z(zoom);
        Some(zoom)
    }

    /// Run one frame of manipulation against the pre-update controller state
    pub fn update(&self, transform: &mut Transform, session: &XrSession) {
        // The right hand has priority; the left only drives when the right is absent
        let driver = session.right.as_ref().or(session.left.as_ref());
        if let Some(controller) = driver.filter(|c| c.is_selected()) {
            self.apply_rotation(transform, controller.delta());
        }

        if let (Some(left), Some(right)) = (&session.left, &session.right) {
            self.apply_zoom(transform, left, right);
        }
    }
}

impl Default for TransformManipulator {
    fn default() -> Self {
        Self::new(&InteractionConfig::default())
    }
}
