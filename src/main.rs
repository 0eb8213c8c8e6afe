// What you SEE:
// • Two pictures stacked; the top one fills the window.
// • Move the mouse: a fading streak follows it and shows the bottom picture.
// • P pauses/resumes the animation. ESC quits.

use fluid_reveal::config;
use fluid_reveal::driver::FrameDriver;
use fluid_reveal::error::Error;
use fluid_reveal::images::ImageLoader;
use fluid_reveal::window::{PointerAdapter, PointerEvent, Surface};
use log::{info, warn};
use std::time::{Duration, Instant};

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = config::load();
    let disp = &cfg.display;

    /* --- Surface ---
       No window (headless box, no display server) means nothing to draw on. */
    let opened = Surface::open("Fluid Reveal", disp.width, disp.height, disp.target_fps);
    let mut surface = match opened {
        Ok(s) => s,
        Err(e) => {
            warn!("{e}; no surface to render on, exiting");
            return Ok(());
        }
    };

    /* --- Pictures load in the background; placeholders show meanwhile --- */
    let loader = ImageLoader::spawn(cfg.images.top.clone(), cfg.images.bottom.clone());
    let mut driver = FrameDriver::new(&cfg).with_loader(loader);
    let mut pointer = PointerAdapter::default();
    let mut size = surface.size();
    driver.resize(size.0, size.1, disp.device_pixel_ratio);

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while surface.is_open() && !surface.esc_pressed() {
        let now = Instant::now();

        if surface.p_pressed_once() {
            if driver.is_running() {
                driver.pause();
            } else {
                driver.resume();
            }
        }

        // Resize first so this frame's moves normalize against the new box.
        let new_size = surface.size();
        if new_size != size && new_size.0 > 0 && new_size.1 > 0 {
            size = new_size;
            driver.resize(size.0, size.1, disp.device_pixel_ratio);
        }

        for event in pointer.update(surface.cursor()) {
            match event {
                PointerEvent::Enter => driver.pointer_enter(),
                PointerEvent::Leave => driver.pointer_leave(),
                PointerEvent::Move(x, y) => driver.pointer_move(x, y, now),
            }
        }

        if driver.tick(now) {
            surface.present(driver.frame())?;
            frames_this_second += 1;
        } else {
            surface.idle();
        }

        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            info!("FPS: {:.1} (tick {})", frames_this_second as f32 / secs, driver.ticks());
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    Ok(())
}
