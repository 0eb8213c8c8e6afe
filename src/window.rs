// Window glue: the native window is the rendering surface.
// Visual effects provided here:
// 1) A resizable window that shows the composited frame.
// 2) Pointer enter/leave/move events derived from per-frame cursor polling.

use crate::error::Error;
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

pub struct Surface {
    window: Window, // the on-screen window you see
}

impl Surface {
    /// Create a resizable window.
    /// Visual: a new empty window appears with your chosen title.
    pub fn open(
        title: &str,
        width: usize,
        height: usize,
        target_fps: usize,
    ) -> Result<Self, Error> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions { resize: true, ..WindowOptions::default() },
        )
        .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(target_fps);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    /// Blocks until the next frame slot when a target fps is set.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    /// Pump window events without drawing (used while paused).
    pub fn idle(&mut self) {
        self.window.update();
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// P toggles pause.
    pub fn p_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::P, KeyRepeat::No)
    }

    /// Current client-area size in pixels.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Cursor in window pixels, `None` while it's outside the window.
    pub fn cursor(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }
}

/// Events derived from two consecutive cursor polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Enter,
    Leave,
    Move(f32, f32),
}

/// Turns "where is the cursor now?" polling into enter/leave/move events.
#[derive(Default)]
pub struct PointerAdapter {
    last: Option<(f32, f32)>,
}

impl PointerAdapter {
    /// Feed this frame's poll; returns the events it implies, in order.
    pub fn update(&mut self, cursor: Option<(f32, f32)>) -> Vec<PointerEvent> {
        let mut events = Vec::with_capacity(2);
        match (self.last, cursor) {
            (None, Some((x, y))) => {
                events.push(PointerEvent::Enter);
                events.push(PointerEvent::Move(x, y));
            }
            (Some(_), None) => events.push(PointerEvent::Leave),
            (Some(prev), Some(now)) if prev != now => events.push(PointerEvent::Move(now.0, now.1)),
            _ => {}
        }
        self.last = cursor;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_emits_enter_then_move() {
        let mut a = PointerAdapter::default();
        assert_eq!(
            a.update(Some((3.0, 4.0))),
            vec![PointerEvent::Enter, PointerEvent::Move(3.0, 4.0)]
        );
    }

    #[test]
    fn still_cursor_emits_nothing() {
        let mut a = PointerAdapter::default();
        a.update(Some((3.0, 4.0)));
        assert!(a.update(Some((3.0, 4.0))).is_empty());
        assert!(PointerAdapter::default().update(None).is_empty());
    }

    #[test]
    fn moving_then_leaving() {
        let mut a = PointerAdapter::default();
        a.update(Some((3.0, 4.0)));
        assert_eq!(a.update(Some((5.0, 4.0))), vec![PointerEvent::Move(5.0, 4.0)]);
        assert_eq!(a.update(None), vec![PointerEvent::Leave]);
        assert!(a.update(None).is_empty());
    }
}
