use glam::{Mat4, Quat, Vec3};

/// Position and orientation of the manipulated object
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Rotate about the object's own up axis
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_rotation_y(angle)).normalize();
    }

    /// Rotate about a fixed world axis (axis must be normalized)
    pub fn rotate_on_world_axis(&mut self, axis: Vec3, angle: f32) {
        self.rotation = (Quat::from_axis_angle(axis, angle) * self.rotation).normalize();
    }

    /// Move along the object's local forward (+Z) axis
    pub fn translate_z(&mut self, distance: f32) {
        self.position += self.rotation * Vec3::Z * distance;
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

/// Per-vertex RGB color buffer, three floats per vertex.
///
/// `version` bumps on every replacement so a renderer can re-upload lazily.
#[derive(Clone, Debug, Default)]
pub struct ColorAttribute {
    values: Vec<f32>,
    version: u64,
}

impl ColorAttribute {
    pub fn replace(&mut self, colors: &[f32]) {
        self.values.clear();
        self.values.extend_from_slice(colors);
        self.version += 1;
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn vertex_count(&self) -> usize {
        self.values.len() / 3
    }

    pub fn vertex(&self, idx: usize) -> Option<[f32; 3]> {
        self.values
            .get(idx * 3..idx * 3 + 3)
            .map(|c| [c[0], c[1], c[2]])
    }
}

/// The mesh group being manipulated and animated
#[derive(Clone, Debug, Default)]
pub struct TargetObject {
    pub transform: Transform,
    pub colors: ColorAttribute,
}

impl TargetObject {
    pub fn new(position: Vec3) -> Self {
        Self {
            transform: Transform {
                position,
                ..Default::default()
            },
            colors: ColorAttribute::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn local_yaw_follows_world_pitch() {
        let mut t = Transform::default();
        t.rotate_on_world_axis(Vec3::X, FRAC_PI_2);
        t.rotate_y(FRAC_PI_2);

        // After pitching, the local up axis points along world +Z
        let local_up = t.rotation * Vec3::Y;
        assert!(local_up.abs_diff_eq(Vec3::Z, 1e-5));
        let expected = Quat::from_rotation_x(FRAC_PI_2) * Quat::from_rotation_y(FRAC_PI_2);
        assert!(t.rotation.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn world_rotation_premultiplies() {
        let mut t = Transform::default();
        t.rotate_y(FRAC_PI_2);
        t.rotate_on_world_axis(Vec3::X, FRAC_PI_2);
        let expected = Quat::from_rotation_x(FRAC_PI_2) * Quat::from_rotation_y(FRAC_PI_2);
        assert!(t.rotation.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn translate_z_uses_local_forward() {
        let mut t = Transform::default();
        t.rotate_y(FRAC_PI_2);
        t.translate_z(2.0);
        // +Z rotated a quarter turn about +Y lands on +X
        assert!(t.position.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn color_replacement_bumps_version() {
        let mut colors = ColorAttribute::default();
        assert_eq!(colors.version(), 0);
        colors.replace(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(colors.version(), 1);
        assert_eq!(colors.vertex_count(), 2);
        assert_eq!(colors.vertex(1), Some([0.0, 1.0, 0.0]));
        assert_eq!(colors.vertex(2), None);
    }
}
