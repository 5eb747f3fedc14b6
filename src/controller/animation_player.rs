use tracing::{debug, info};

use crate::model::FrameSequence;

/// Receiver of animation steps: supplies the live speed, takes time and colors
pub trait PlaybackTarget {
    fn playback_speed(&self) -> f32;
    fn set_time(&mut self, time: f64);
    fn apply_colors(&mut self, colors: &[f32]);
}

/// Steps through a frame sequence, looping forever
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    frames: FrameSequence,
    index: usize,
    final_interval_ms: f64,
}

impl AnimationPlayer {
    pub fn new(frames: FrameSequence, final_interval_ms: f64) -> Self {
        Self {
            frames,
            index: 0,
            final_interval_ms,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn frames(&self) -> &FrameSequence {
        &self.frames
    }

    pub fn rewind(&mut self) {
        self.index = 0;
    }

    /// Show the current frame and advance. Returns the wait before the next step, in ms.
    ///
    /// Speed is read here, so a change takes effect from the next scheduled wake.
    pub fn step(&mut self, target: &mut impl PlaybackTarget) -> f64 {
        let Some(frame) = self.frames.frame(self.index) else {
            self.index = 0;
            return self.final_interval_ms;
        };

        target.apply_colors(&frame.colors);
        let interval = self.frames.frame_interval_ms(self.index, self.final_interval_ms);
        target.set_time(frame.timestamp);

        let speed = target.playback_speed().max(f32::EPSILON) as f64;
        let delay = interval / speed;

        self.index += 1;
        if self.index >= self.frames.len() {
            self.index = 0;
            debug!("animation looping");
        }
        delay
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskState {
    Idle,
    Running { next_wake_ms: f64 },
    Paused { remaining_ms: f64 },
    Stopped,
}

/// Cancellable driver around an [`AnimationPlayer`].
///
/// Time is supplied by the caller in milliseconds, so the same task runs from a
/// browser timer, a native redraw loop or a test.
#[derive(Debug, Clone)]
pub struct PlaybackTask {
    player: AnimationPlayer,
    state: TaskState,
}

impl PlaybackTask {
    pub fn new(player: AnimationPlayer) -> Self {
        Self {
            player,
            state: TaskState::Idle,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn player(&self) -> &AnimationPlayer {
        &self.player
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TaskState::Running { .. })
    }

    /// Begin (or restart) from the first frame; the first step is due immediately
    pub fn start(&mut self, now_ms: f64) {
        self.player.rewind();
        self.state = TaskState::Running { next_wake_ms: now_ms };
        info!(frames = self.player.frames().len(), "playback started");
    }

    pub fn pause(&mut self, now_ms: f64) {
        if let TaskState::Running { next_wake_ms } = self.state {
            let remaining_ms = (next_wake_ms - now_ms).max(0.0);
            self.state = TaskState::Paused { remaining_ms };
            info!(index = self.player.index(), remaining_ms, "playback paused");
        }
    }

    pub fn resume(&mut self, now_ms: f64) {
        if let TaskState::Paused { remaining_ms } = self.state {
            self.state = TaskState::Running { next_wake_ms: now_ms + remaining_ms };
            info!(index = self.player.index(), "playback resumed");
        }
    }

    pub fn stop(&mut self) {
        if self.state != TaskState::Stopped {
            self.state = TaskState::Stopped;
            info!("playback stopped");
        }
    }

    /// Run every step that is due at `now_ms`.
    ///
    /// A late poll does not replay missed steps; the next wake is scheduled from `now_ms`.
    /// Returns the wait until the next wake while running.
    pub fn poll(&mut self, now_ms: f64, target: &mut impl PlaybackTarget) -> Option<f64> {
        // Zero-length intervals chain within one poll, bounded by one pass over the frames
        for _ in 0..self.player.frames().len() {
            match self.state {
                TaskState::Running { next_wake_ms } if now_ms >= next_wake_ms => {
                    let delay = self.player.step(target);
                    self.state = TaskState::Running { next_wake_ms: now_ms + delay };
                }
                _ => break,
            }
        }
        self.time_until_wake(now_ms)
    }

    pub fn time_until_wake(&self, now_ms: f64) -> Option<f64> {
        match self.state {
            TaskState::Running { next_wake_ms } => Some((next_wake_ms - now_ms).max(0.0)),
            _ => None,
        }
    }
}
