//! Frame timing
//!
//! The host calls [`run_frame`] from its display callback with the frame
//! timestamp. While the page is hidden nothing is updated or drawn; on
//! becoming visible again the clock resyncs so the first frame does not
//! see the whole hidden interval as one step.

use super::input::InputMapper;
use crate::consts::FRAME_MS;
use crate::sim::{FrameTime, GameSession, Snapshot, tick};

/// Draws one frame from a read-only view
pub trait Renderer {
    fn draw(&mut self, snapshot: &Snapshot);
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    last_timestamp: Option<f64>,
    visible: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            last_timestamp: None,
            visible: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool, now_ms: f64) {
        self.visible = visible;
        if visible {
            self.last_timestamp = Some(now_ms);
        }
    }

    /// Frame timing for `timestamp_ms`, or None while hidden
    pub fn advance(&mut self, timestamp_ms: f64) -> Option<FrameTime> {
        if !self.visible {
            return None;
        }
        let dt_ms = match self.last_timestamp {
            Some(last) => (timestamp_ms - last).max(0.0),
            None => FRAME_MS,
        };
        self.last_timestamp = Some(timestamp_ms);
        Some(FrameTime::new(timestamp_ms, dt_ms))
    }
}

/// One display frame: update then draw. Returns false if the frame was
/// skipped because the page is hidden.
pub fn run_frame<R: Renderer + ?Sized>(
    session: &mut GameSession,
    clock: &mut FrameClock,
    input: &mut InputMapper,
    renderer: &mut R,
    timestamp_ms: f64,
) -> bool {
    let Some(frame) = clock.advance(timestamp_ms) else {
        return false;
    };
    let tick_input = input.next_input(frame.now_ms);
    let last_shot = session.player().last_fire_ms;
    tick(session, &tick_input, frame);
    let fired_now = session.player().last_fire_ms;
    if fired_now != last_shot && fired_now == Some(frame.now_ms) {
        input.shot_fired(frame.now_ms);
    }
    renderer.draw(&session.snapshot());
    true
}
