// Frame driver: one tick = idle check -> simulate -> composite -> swap.
// Pointer events land on the tracker whenever they happen; a tick only
// reads the snapshot taken at its start.

use crate::compositor::{Compositor, ViewportConfig};
use crate::config::Config;
use crate::field::FieldSimulator;
use crate::images::{ImageLoader, SourceImage};
use crate::pointer::{PointerTracker, SurfaceRect};
use crate::types::FrameBuffer;
use log::info;
use std::time::{Duration, Instant};

pub struct FrameDriver {
    tracker: PointerTracker,
    sim: FieldSimulator,
    compositor: Compositor,
    top: SourceImage,
    bottom: SourceImage,
    loader: Option<ImageLoader>,
    screen: FrameBuffer,
    surface: SurfaceRect,
    running: bool,
    ticks: u64,
}

impl FrameDriver {
    /// Driver with both pictures unloaded and no loader attached.
    pub fn new(cfg: &Config) -> Self {
        let disp = &cfg.display;
        let viewport = ViewportConfig::new(disp.width, disp.height, disp.device_pixel_ratio);
        Self {
            tracker: PointerTracker::new(Duration::from_millis(cfg.simulation.idle_ms)),
            sim: FieldSimulator::from_config(&cfg.simulation),
            compositor: Compositor::from_config(viewport, disp),
            top: SourceImage::placeholder(cfg.images.top_placeholder),
            bottom: SourceImage::placeholder(cfg.images.bottom_placeholder),
            loader: None,
            screen: FrameBuffer::new(disp.width, disp.height),
            surface: SurfaceRect::sized(disp.width, disp.height),
            running: true,
            ticks: 0,
        }
    }

    /// Results from `loader` are picked up at the start of later ticks.
    pub fn with_loader(mut self, loader: ImageLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /* ---------- host events ---------- */

    pub fn pointer_enter(&mut self) {
        self.tracker.on_enter();
    }

    pub fn pointer_leave(&mut self) {
        self.tracker.on_leave();
    }

    pub fn pointer_move(&mut self, client_x: f32, client_y: f32, now: Instant) {
        self.tracker.on_move(client_x, client_y, &self.surface, now);
    }

    /// New output size / density. Takes effect next tick; the field is kept.
    pub fn resize(&mut self, width: usize, height: usize, device_pixel_ratio: f32) {
        let viewport = ViewportConfig::new(width, height, device_pixel_ratio);
        if viewport == *self.compositor.viewport() {
            return;
        }
        info!("resize to {width}x{height} @ {:.2}x", viewport.device_pixel_ratio);
        self.compositor.set_viewport(viewport);
        self.surface = SurfaceRect::sized(width, height);
        self.screen = FrameBuffer::new(width, height);
    }

    pub fn pause(&mut self) {
        if self.running {
            info!("paused after {} ticks", self.ticks);
            self.running = false;
        }
    }

    pub fn resume(&mut self) {
        if !self.running {
            info!("resumed");
            self.running = true;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /* ---------- the tick ---------- */

    /// Advance one frame. Returns false (and does nothing) while paused.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        if let Some(loader) = &mut self.loader {
            loader.poll(&mut self.top, &mut self.bottom);
            if loader.is_settled() {
                info!(
                    "image loads settled (top loaded: {}, bottom loaded: {})",
                    self.top.is_loaded(),
                    self.bottom.is_loaded()
                );
                self.loader = None;
            }
        }

        let sample = self.tracker.sample(now);
        self.sim.step(&sample);
        self.compositor.composite(self.sim.produced(), &self.top, &self.bottom, &mut self.screen);
        self.sim.swap();

        self.ticks += 1;
        true
    }

    /// Last composited frame.
    pub fn frame(&self) -> &FrameBuffer {
        &self.screen
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn simulator(&self) -> &FieldSimulator {
        &self.sim
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    #[cfg(test)]
    fn simulator_mut(&mut self) -> &mut FieldSimulator {
        &mut self.sim
    }
}
