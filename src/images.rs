// The two background pictures and their background loader.
// Visual expectation: the window shows flat placeholder colors right away;
// each picture pops in whenever its decode finishes (or never, on failure).

use crate::error::Error;
use crate::types::unpack_rgb;
use image::RgbImage;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Which of the two pictures a load result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Top,
    Bottom,
}

/// A picture as the compositor sees it: either decoded, or a flat color.
pub enum SourceImage {
    Unloaded { placeholder: [u8; 3] },
    Loaded(RgbImage),
}

impl SourceImage {
    /// Placeholder from a 0xRRGGBB color.
    pub fn placeholder(rgb: u32) -> Self {
        SourceImage::Unloaded { placeholder: unpack_rgb(rgb) }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, SourceImage::Loaded(_))
    }

    /// Natural pixel size; (1, 1) while unloaded.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            SourceImage::Unloaded { .. } => (1, 1),
            SourceImage::Loaded(img) => img.dimensions(),
        }
    }

    /// The only transition: Unloaded -> Loaded. Later results are ignored,
    /// and so is a picture with no pixels (the placeholder stays).
    pub fn set_loaded(&mut self, img: RgbImage) {
        if img.width() == 0 || img.height() == 0 {
            return;
        }
        if !self.is_loaded() {
            *self = SourceImage::Loaded(img);
        }
    }

    /// Color at unit coords (v = 0 is the picture's bottom edge), 0..255 per channel.
    /// Bilinear with clamp-to-edge addressing.
    pub fn sample(&self, u: f32, v: f32) -> [f32; 3] {
        match self {
            SourceImage::Unloaded { placeholder: [r, g, b] } => [*r as f32, *g as f32, *b as f32],
            SourceImage::Loaded(img) => sample_bilinear(img, u, 1.0 - v),
        }
    }
}

/// `y` here runs top-down like the image rows.
fn sample_bilinear(img: &RgbImage, u: f32, y: f32) -> [f32; 3] {
    let (w, h) = img.dimensions();
    let fx = (u * w as f32 - 0.5).clamp(0.0, (w - 1) as f32);
    let fy = (y * h as f32 - 0.5).clamp(0.0, (h - 1) as f32);
    let x0 = fx.floor() as u32;
    let y0 = fy.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let p00 = img.get_pixel(x0, y0);
    let p10 = img.get_pixel(x1, y0);
    let p01 = img.get_pixel(x0, y1);
    let p11 = img.get_pixel(x1, y1);

    let mut out = [0.0f32; 3];
    for c in 0..3 {
        let a = p00[c] as f32 + (p10[c] as f32 - p00[c] as f32) * tx;
        let b = p01[c] as f32 + (p11[c] as f32 - p01[c] as f32) * tx;
        out[c] = a + (b - a) * ty;
    }
    out
}

/// Decode one picture from disk.
pub fn load_image(path: &Path) -> Result<RgbImage, Error> {
    let img = image::open(path)
        .map_err(|source| Error::ImageLoad { path: path.to_path_buf(), source })?;
    Ok(img.to_rgb8())
}

/// Same as `load_image`, but failures become `None` (logged, never retried).
pub fn load_image_or_none(path: &Path) -> Option<RgbImage> {
    match load_image(path) {
        Ok(img) if img.width() == 0 || img.height() == 0 => {
            warn!("{} decoded to an empty picture; keeping placeholder", path.display());
            None
        }
        Ok(img) => {
            info!("loaded {} ({}x{})", path.display(), img.width(), img.height());
            Some(img)
        }
        Err(e) => {
            warn!("{e}; keeping placeholder");
            None
        }
    }
}

/// One-shot background fetch of both pictures.
/// Results arrive on a channel; the frame loop drains it without waiting.
pub struct ImageLoader {
    rx: Receiver<(Slot, Option<RgbImage>)>,
    pending: usize,
}

impl ImageLoader {
    /// Start one decode thread per picture.
    pub fn spawn(top: PathBuf, bottom: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel();
        for (slot, path) in [(Slot::Top, top), (Slot::Bottom, bottom)] {
            let tx = tx.clone();
            thread::spawn(move || {
                let result = load_image_or_none(&path);
                let _ = tx.send((slot, result)); // receiver gone = app closed
            });
        }
        Self { rx, pending: 2 }
    }

    /// Apply whatever results have arrived so far. Never blocks.
    pub fn poll(&mut self, top: &mut SourceImage, bottom: &mut SourceImage) {
        while self.pending > 0 {
            match self.rx.try_recv() {
                Ok((slot, result)) => {
                    self.pending -= 1;
                    if let Some(img) = result {
                        match slot {
                            Slot::Top => top.set_loaded(img),
                            Slot::Bottom => bottom.set_loaded(img),
                        }
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.pending = 0;
                }
            }
        }
    }

    /// True once both fetches have reported (success or not).
    pub fn is_settled(&self) -> bool {
        self.pending == 0
    }
}
