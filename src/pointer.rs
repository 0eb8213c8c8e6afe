// Pointer tracking for the trail.
// Raw window coordinates come in as enter/leave/move events; the simulator
// only ever sees a `PointerSample` taken once at the start of a tick.

use crate::types::Vec2;
use std::time::{Duration, Instant};

/// Bounding box of the surface in the same space as the move coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    /// Surface that starts at the origin (a window's client area).
    pub fn sized(width: usize, height: usize) -> Self {
        Self { left: 0.0, top: 0.0, width: width as f32, height: height as f32 }
    }

    /// Screen-space point -> unit coords, origin bottom-left.
    pub fn normalize(&self, client_x: f32, client_y: f32) -> Vec2 {
        Vec2::new(
            (client_x - self.left) / self.width,
            1.0 - (client_y - self.top) / self.height,
        )
    }
}

/// What the pointer looked like as of the last event / idle check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    pub previous: Vec2,
    pub moving: bool,
    pub last_move: Option<Instant>,
}

/// Copy of the latest displacement segment handed to the simulator.
/// Events between two ticks collapse into a single (previous, position) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub previous: Vec2,
    pub position: Vec2,
    pub moving: bool,
}

impl PointerSample {
    /// A sample that deposits nothing.
    pub fn idle_at(p: Vec2) -> Self {
        Self { previous: p, position: p, moving: false }
    }
}

pub struct PointerTracker {
    state: PointerState,
    inside: bool,
    idle_window: Duration,
}

impl PointerTracker {
    /// Starts at the surface center, outside the surface, not moving.
    pub fn new(idle_window: Duration) -> Self {
        let center = Vec2::new(0.5, 0.5);
        Self {
            state: PointerState {
                position: center,
                previous: center,
                moving: false,
                last_move: None,
            },
            inside: false,
            idle_window,
        }
    }

    pub fn on_enter(&mut self) {
        self.inside = true;
    }

    pub fn on_leave(&mut self) {
        self.inside = false;
    }

    #[cfg(test)]
    pub fn is_inside(&self) -> bool {
        self.inside
    }

    /// Record a move at absolute `(client_x, client_y)`; ignored while outside.
    pub fn on_move(&mut self, client_x: f32, client_y: f32, rect: &SurfaceRect, now: Instant) {
        if !self.inside {
            return;
        }
        self.state.previous = self.state.position;
        self.state.position = rect.normalize(client_x, client_y);
        self.state.moving = true;
        self.state.last_move = Some(now);
    }

    /// Idle check + snapshot, called once per tick.
    pub fn sample(&mut self, now: Instant) -> PointerSample {
        let idle = match self.state.last_move {
            Some(t) => now.saturating_duration_since(t) > self.idle_window,
            None => true,
        };
        if idle {
            self.state.moving = false;
        }
        PointerSample {
            previous: self.state.previous,
            position: self.state.position,
            moving: self.state.moving,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &PointerState {
        &self.state
    }
}
