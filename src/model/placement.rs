use glam::Vec3;

/// Uniform display scale and viewing distance for an imported mesh
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayFit {
    pub scale: f32,
    pub distance: f32,
}

impl DisplayFit {
    /// Fit a bounding box so its diagonal spans `size` world units.
    ///
    /// The viewing distance is `|max.z| * scale * distance_factor`.
    pub fn from_bounds(min: Vec3, max: Vec3, size: f32, distance_factor: f32) -> Self {
        let diagonal = (max - min).length();
        let scale = if diagonal > f32::EPSILON { size / diagonal } else { 1.0 };
        Self {
            scale,
            distance: max.z.abs() * scale * distance_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_maps_to_size() {
        let fit = DisplayFit::from_bounds(Vec3::new(-1.0, -2.0, -2.0), Vec3::new(1.0, 2.0, 2.0), 10.0, 3.0);
        // diagonal = sqrt(4 + 16 + 16) = 6
        assert!((fit.scale - 10.0 / 6.0).abs() < 1e-6);
        assert!((fit.distance - 2.0 * 10.0 / 6.0 * 3.0).abs() < 1e-5);
    }

    #[test]
    fn degenerate_box_keeps_unit_scale() {
        let fit = DisplayFit::from_bounds(Vec3::ONE, Vec3::ONE, 10.0, 3.0);
        assert_eq!(fit.scale, 1.0);
        assert_eq!(fit.distance, 3.0);
    }
}
