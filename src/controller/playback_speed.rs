use crate::config::{AxisPolicy, InteractionConfig};

/// Bounded playback speed multiplier
#[derive(Clone, Copy, Debug)]
pub struct PlaybackSpeedController {
    speed: f32,
    pub min: f32,
    pub max: f32,
    /// Slider step on desktop, per-frame axis gain in XR
    pub input_scale: f32,
    pub frame_rate: f32,
    pub axis: AxisPolicy,
}

impl PlaybackSpeedController {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            speed: 1.0_f32.max(config.min_playback_speed).min(config.max_playback_speed),
            min: config.min_playback_speed,
            max: config.max_playback_speed,
            input_scale: config.playback_input_scale,
            frame_rate: config.frame_rate,
            axis: config.playback_axis,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Bounds without `f32::clamp`, which panics on inverted or NaN bounds
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }

    /// Absolute set (desktop slider). Returns the stored, clamped value.
    /// Non-finite input leaves the speed unchanged.
    pub fn set(&mut self, value: f32) -> f32 {
        if value.is_finite() {
            self.speed = self.clamp(value);
        }
        self.speed
    }

    /// Incremental joystick scrub for one frame. Returns the stored, clamped value.
    pub fn apply_axes(&mut self, axes: &[f32]) -> f32 {
        let value = self.axis.read(axes) * self.input_scale;
        self.set(self.speed + value / self.frame_rate)
    }
}

impl Default for PlaybackSpeedController {
    fn default() -> Self {
        Self::new(&InteractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_unit_speed() {
        assert_eq!(PlaybackSpeedController::default().speed(), 1.0);
    }

    #[test]
    fn slider_sets_absolutely() {
        let mut ctrl = PlaybackSpeedController::default();
        assert_eq!(ctrl.set(0.5), 0.5);
        assert_eq!(ctrl.speed(), 0.5);
    }

    #[test]
    fn every_path_stays_in_bounds() {
        let mut ctrl = PlaybackSpeedController::default();
        for x in [-100.0, -1.0, 0.0, 0.05, 0.1, 1.3, 2.0, 2.5, 1e9] {
            let v = ctrl.set(x);
            assert!((0.1..=2.0).contains(&v), "{x} -> {v}");
        }
        ctrl.set(2.0);
        for _ in 0..1000 {
            let v = ctrl.apply_axes(&[0.0, 0.0, 1.0, 0.0]);
            assert!((0.1..=2.0).contains(&v));
        }
        assert_eq!(ctrl.speed(), 2.0);
        for _ in 0..100_000 {
            ctrl.apply_axes(&[0.0, 0.0, -1.0, 0.0]);
        }
        assert_eq!(ctrl.speed(), 0.1);
    }

    #[test]
    fn axis_increments_scaled_per_frame() {
        let mut ctrl = PlaybackSpeedController::default();
        let v = ctrl.apply_axes(&[0.0, 0.0, 0.6, 0.0]);
        assert!((v - (1.0 + 0.6 * 0.1 / 60.0)).abs() < 1e-6);
    }

    #[test]
    fn non_finite_values_leave_speed_unchanged() {
        let mut ctrl = PlaybackSpeedController::default();
        ctrl.set(0.5);
        assert_eq!(ctrl.set(f32::NAN), 0.5);
        assert_eq!(ctrl.set(f32::INFINITY), 0.5);

        // A zero frame rate would turn an idle stick into 0 / 0
        ctrl.frame_rate = 0.0;
        assert_eq!(ctrl.apply_axes(&[0.0; 4]), 0.5);
        assert_eq!(ctrl.apply_axes(&[0.0, 0.0, 1.0, 0.0]), 0.5);
        assert!((0.1..=2.0).contains(&ctrl.speed()));
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        let config = InteractionConfig {
            min_playback_speed: 3.0,
            max_playback_speed: 1.0,
            ..Default::default()
        };
        let mut ctrl = PlaybackSpeedController::new(&config);
        assert!(ctrl.speed().is_finite());
        assert!(ctrl.set(2.0).is_finite());
    }

    #[test]
    fn axis_falls_back_to_first() {
        let mut ctrl = PlaybackSpeedController::default();
        let v = ctrl.apply_axes(&[-0.6, 0.0]);
        assert!((v - (1.0 - 0.6 * 0.1 / 60.0)).abs() < 1e-6);
    }
}
