use serde::Deserialize;

/// Rejected configuration overrides
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("min_playback_speed ({min}) is above max_playback_speed ({max})")]
    SpeedBounds { min: f32, max: f32 },
}

/// Which gamepad axes feed the playback scrub.
///
/// The primary axis is read first; when it is missing, zero or not finite the
/// fallback axis (if any) is read instead.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AxisPolicy {
    pub primary: usize,
    pub fallback: Option<usize>,
}

impl Default for AxisPolicy {
    fn default() -> Self {
        Self {
            primary: 2,
            fallback: Some(0),
        }
    }
}

impl AxisPolicy {
    /// Read the scrub value from a set of gamepad axes.
    pub fn read(&self, axes: &[f32]) -> f32 {
        let usable = |idx: usize| axes.get(idx).copied().filter(|v| v.is_finite() && *v != 0.0);
        usable(self.primary)
            .or_else(|| self.fallback.and_then(usable))
            .unwrap_or(0.0)
    }
}

/// Tunable constants for interaction and playback
///
/// Usage:
///   // Use defaults
///   let config = InteractionConfig::default();
///
///   // Or override a subset from JSON:
///   let config = InteractionConfig::from_json(r#"{ "rot_input_scale": 5.0 }"#)?;
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    // Manipulation gains, tuned for ~60 Hz
    pub rot_input_scale: f32,
    pub zoom_input_scale: f32,

    // Playback speed
    pub playback_input_scale: f32,
    pub min_playback_speed: f32,
    pub max_playback_speed: f32,
    pub frame_rate: f32,
    pub playback_axis: AxisPolicy,

    // Wait after the last frame before looping (ms)
    pub final_frame_interval_ms: f64,

    // Display placement
    pub import_mesh_size: f32,
    pub camera_distance_factor: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            rot_input_scale: 10.0,
            zoom_input_scale: 20.0,
            playback_input_scale: 0.1,
            min_playback_speed: 0.1,
            max_playback_speed: 2.0,
            frame_rate: 60.0,
            playback_axis: AxisPolicy::default(),
            final_frame_interval_ms: 1000.0,
            import_mesh_size: 10.0,
            camera_distance_factor: 3.0,
        }
    }
}

impl InteractionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Every gain, bound and interval must be a positive finite number, with min <= max
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("rot_input_scale", self.rot_input_scale as f64),
            ("zoom_input_scale", self.zoom_input_scale as f64),
            ("playback_input_scale", self.playback_input_scale as f64),
            ("min_playback_speed", self.min_playback_speed as f64),
            ("max_playback_speed", self.max_playback_speed as f64),
            ("frame_rate", self.frame_rate as f64),
            ("final_frame_interval_ms", self.final_frame_interval_ms),
            ("import_mesh_size", self.import_mesh_size as f64),
            ("camera_distance_factor", self.camera_distance_factor as f64),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if self.min_playback_speed > self.max_playback_speed {
            return Err(ConfigError::SpeedBounds {
                min: self.min_playback_speed,
                max: self.max_playback_speed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_axis_wins_when_nonzero() {
        let policy = AxisPolicy::default();
        assert_eq!(policy.read(&[0.3, 0.0, -0.7, 0.0]), -0.7);
    }

    #[test]
    fn falls_back_when_primary_missing_or_zero() {
        let policy = AxisPolicy::default();
        assert_eq!(policy.read(&[0.4, 0.0]), 0.4);
        assert_eq!(policy.read(&[0.4, 0.0, 0.0, 0.0]), 0.4);
        assert_eq!(policy.read(&[0.4, 0.0, f32::NAN]), 0.4);
        assert_eq!(policy.read(&[]), 0.0);
    }

    #[test]
    fn fallback_can_be_disabled() {
        let policy = AxisPolicy { primary: 2, fallback: None };
        assert_eq!(policy.read(&[0.4, 0.0]), 0.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = InteractionConfig::from_json(r#"{ "rot_input_scale": 5.0, "playback_axis": { "fallback": null } }"#).unwrap();
        assert_eq!(config.rot_input_scale, 5.0);
        assert_eq!(config.zoom_input_scale, 20.0);
        assert_eq!(config.playback_axis.primary, 2);
        assert_eq!(config.playback_axis.fallback, None);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(InteractionConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_speed_bounds() {
        let err = InteractionConfig::from_json(r#"{ "min_playback_speed": 3.0, "max_playback_speed": 1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SpeedBounds { min, max } if min == 3.0 && max == 1.0));
    }

    #[test]
    fn rejects_non_positive_speed_bounds() {
        let err = InteractionConfig::from_json(r#"{ "min_playback_speed": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { field: "min_playback_speed", .. }));
        let err = InteractionConfig::from_json(r#"{ "max_playback_speed": -2.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { field: "max_playback_speed", .. }));
    }

    #[test]
    fn rejects_non_finite_bounds() {
        let config = InteractionConfig {
            max_playback_speed: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive { field: "max_playback_speed", .. })));
        let config = InteractionConfig {
            min_playback_speed: f32::INFINITY,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive { field: "min_playback_speed", .. })));
    }

    #[test]
    fn rejects_zero_frame_rate() {
        let err = InteractionConfig::from_json(r#"{ "frame_rate": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { field: "frame_rate", .. }));
    }

    #[test]
    fn rejects_non_positive_final_interval() {
        let err = InteractionConfig::from_json(r#"{ "final_frame_interval_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { field: "final_frame_interval_ms", .. }));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = InteractionConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
