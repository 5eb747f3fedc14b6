use serde::Deserialize;
use std::path::Path;

/// Errors raised while loading an animation document
#[derive(Debug, thiserror::Error)]
pub enum AnimationDataError {
    #[error("animation has no frames")]
    Empty,
    #[error("time has {time} entries but colors has {colors}")]
    LengthMismatch { time: usize, colors: usize },
    #[error("timestamp {index} ({value}) is earlier than the one before it")]
    NonMonotonic { index: usize, value: f64 },
    #[error("color frame {index} has {len} floats, expected {expected}")]
    ColorLength { index: usize, len: usize, expected: usize },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw animation document as exported alongside the mesh.
///
/// `pointValues` is carried through untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationData {
    pub time: Vec<f64>,
    pub colors: Vec<Vec<f32>>,
    #[serde(rename = "pointValues", default)]
    pub point_values: serde_json::Value,
}

impl AnimationData {
    pub fn from_json(json: &str) -> Result<Self, AnimationDataError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnimationDataError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check the document shape and turn it into a playable sequence
    pub fn into_frames(self) -> Result<FrameSequence, AnimationDataError> {
        if self.time.is_empty() {
            return Err(AnimationDataError::Empty);
        }
        if self.time.len() != self.colors.len() {
            return Err(AnimationDataError::LengthMismatch {
                time: self.time.len(),
                colors: self.colors.len(),
            });
        }
        if let Some(index) = self.time.windows(2).position(|w| !(w[1] >= w[0])) {
            return Err(AnimationDataError::NonMonotonic {
                index: index + 1,
                value: self.time[index + 1],
            });
        }

        let expected = self.colors[0].len();
        for (index, colors) in self.colors.iter().enumerate() {
            if colors.len() % 3 != 0 || colors.len() != expected {
                return Err(AnimationDataError::ColorLength {
                    index,
                    len: colors.len(),
                    expected,
                });
            }
        }

        let frames = self
            .time
            .into_iter()
            .zip(self.colors)
            .map(|(timestamp, colors)| AnimationFrame { timestamp, colors })
            .collect();
        Ok(FrameSequence { frames })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub timestamp: f64,
    pub colors: Vec<f32>,
}

/// Validated, non-empty, time-ordered frames
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<AnimationFrame>,
}

impl FrameSequence {
    pub fn load_json(json: &str) -> Result<Self, AnimationDataError> {
        AnimationData::from_json(json)?.into_frames()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, idx: usize) -> Option<&AnimationFrame> {
        self.frames.get(idx)
    }

    pub fn vertex_count(&self) -> usize {
        self.frames[0].colors.len() / 3
    }

    /// Unscaled wait after showing frame `idx`, in milliseconds
    pub fn frame_interval_ms(&self, idx: usize, final_interval_ms: f64) -> f64 {
        match (self.frames.get(idx), self.frames.get(idx + 1)) {
            (Some(cur), Some(next)) => (next.timestamp - cur.timestamp) * 1000.0,
            _ => final_interval_ms,
        }
    }

    /// Time span covered by the timestamps, in seconds
    pub fn duration(&self) -> f64 {
        let first = self.frames[0].timestamp;
        let last = self.frames[self.frames.len() - 1].timestamp;
        last - first
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_FRAMES: &str = r#"{
        "time": [0.0, 0.5, 2.0],
        "colors": [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
        "pointValues": [[0.1], [0.2], [0.3]]
    }"#;

    #[test]
    fn loads_and_validates() {
        let frames = FrameSequence::load_json(THREE_FRAMES).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames.vertex_count(), 1);
        assert_eq!(frames.frame(1).unwrap().colors, vec![0.0, 1.0, 0.0]);
        assert_eq!(frames.duration(), 2.0);
    }

    #[test]
    fn frame_intervals_use_next_timestamp_then_fallback() {
        let frames = FrameSequence::load_json(THREE_FRAMES).unwrap();
        assert_eq!(frames.frame_interval_ms(0, 1000.0), 500.0);
        assert_eq!(frames.frame_interval_ms(1, 1000.0), 1500.0);
        assert_eq!(frames.frame_interval_ms(2, 1000.0), 1000.0);
    }

    #[test]
    fn point_values_are_optional() {
        let data = AnimationData::from_json(r#"{ "time": [0], "colors": [[0, 0, 0]] }"#).unwrap();
        assert!(data.point_values.is_null());
    }

    #[test]
    fn rejects_empty() {
        let err = FrameSequence::load_json(r#"{ "time": [], "colors": [] }"#).unwrap_err();
        assert!(matches!(err, AnimationDataError::Empty));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = FrameSequence::load_json(r#"{ "time": [0, 1], "colors": [[0, 0, 0]] }"#).unwrap_err();
        assert!(matches!(err, AnimationDataError::LengthMismatch { time: 2, colors: 1 }));
    }

    #[test]
    fn rejects_decreasing_time() {
        let err = FrameSequence::load_json(
            r#"{ "time": [0, 2, 1], "colors": [[0, 0, 0], [0, 0, 0], [0, 0, 0]] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, AnimationDataError::NonMonotonic { index: 2, .. }));
    }

    #[test]
    fn allows_repeated_timestamps() {
        let frames = FrameSequence::load_json(
            r#"{ "time": [0, 0, 1], "colors": [[0, 0, 0], [0, 0, 0], [0, 0, 0]] }"#,
        )
        .unwrap();
        assert_eq!(frames.frame_interval_ms(0, 1000.0), 0.0);
    }

    #[test]
    fn rejects_ragged_colors() {
        let err = FrameSequence::load_json(r#"{ "time": [0, 1], "colors": [[0, 0, 0], [0, 0]] }"#).unwrap_err();
        assert!(matches!(err, AnimationDataError::ColorLength { index: 1, len: 2, expected: 3 }));
    }

    #[test]
    fn rejects_bad_json() {
        let err = FrameSequence::load_json("{ not json").unwrap_err();
        assert!(matches!(err, AnimationDataError::Json(_)));
    }
}
