//! Frame loop state machine.
//!
//! The loop is `Running` until a close request or the quit key moves it to
//! `Closing`, which is terminal. Each iteration samples the clock, refreshes
//! the rolling statistics, renders, and counts the frame. Key events are
//! translated into `Action`s on their press edge only.

use cube_core::input::{InputState, Key};
use cube_core::time::{FrameStats, FrameTimer, RunSummary};
use cube_platform::window::APP_TITLE;

use crate::controls::{action_for, Action};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closing,
}

#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    pub timer: FrameTimer,
    input: InputState,
}

impl FrameLoop {
    pub fn new(now: f64) -> Self {
        Self {
            state: LoopState::Running,
            timer: FrameTimer::new(now),
            input: InputState::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn request_close(&mut self) {
        if self.state == LoopState::Running {
            log::info!("close requested");
            self.state = LoopState::Closing;
        }
    }

    /// Samples `now` into the timer. Returns the rolling statistics when they
    /// were refreshed this frame.
    pub fn begin_frame(&mut self, now: f64) -> Option<FrameStats> {
        let stats = self.timer.begin_frame(now)?;
        log::info!(
            "frame time: {:4.2}ms/frame ({:.1}fps)",
            stats.avg_frame_time_ms,
            stats.avg_fps
        );
        Some(stats)
    }

    pub fn end_frame(&mut self) {
        self.timer.end_frame();
        self.input.end_frame();
    }

    /// Feeds one key event. Returns the bound action on a fresh press; held
    /// repeats, releases and anything after `Closing` return `None`.
    pub fn key_event(&mut self, key: Key, pressed: bool) -> Option<Action> {
        if !self.is_running() {
            return None;
        }
        if !pressed {
            self.input.key_up(key);
            return None;
        }
        if !self.input.key_down(key) {
            return None;
        }
        let action = action_for(key)?;
        if action == Action::Quit {
            self.request_close();
        }
        Some(action)
    }

    /// Drops held keys whose release will never be delivered.
    pub fn focus_lost(&mut self) {
        self.input.release_all();
    }

    pub fn summary(&self) -> RunSummary {
        self.timer.summary()
    }
}

pub fn title_with_stats(stats: &FrameStats) -> String {
    format!(
        "{APP_TITLE}   /// AVG: {:4.2}ms/frame ({:.1}fps)",
        stats.avg_frame_time_ms, stats.avg_fps
    )
}
