// Compositor: turns the trail field into the displayed frame.
// Where the field is above the threshold the bottom picture shows through;
// elsewhere the top picture stays. Both pictures are "cover" fitted.

use crate::config::DisplayConfig;
use crate::field::ScalarField;
use crate::images::SourceImage;
use crate::types::{pack_rgb, smoothstep, FrameBuffer, Vec2};
use serde::Deserialize;

/// Device pixel ratio never exceeds this.
pub const MAX_DEVICE_PIXEL_RATIO: f32 = 2.0;

/// Output size plus (capped) pixel density. Rebuilt on every resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub width: usize,
    pub height: usize,
    pub device_pixel_ratio: f32,
}

impl ViewportConfig {
    pub fn new(width: usize, height: usize, device_pixel_ratio: f32) -> Self {
        Self { width, height, device_pixel_ratio: device_pixel_ratio.min(MAX_DEVICE_PIXEL_RATIO) }
    }
}

/// Where the soft edge band sits relative to the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePlacement {
    /// Band is [threshold, threshold + edge].
    #[default]
    Above,
    /// Band is [threshold - edge/2, threshold + edge/2].
    Centered,
}

/// Soft 0..1 reveal factor for field value `f`.
pub fn smooth_threshold(f: f32, threshold: f32, edge: f32, placement: EdgePlacement) -> f32 {
    if edge <= 0.0 {
        return if f >= threshold { 1.0 } else { 0.0 };
    }
    match placement {
        EdgePlacement::Above => smoothstep(threshold, threshold + edge, f),
        EdgePlacement::Centered => smoothstep(threshold - 0.5 * edge, threshold + 0.5 * edge, f),
    }
}

/// Affine map from output uv to picture uv that fills the output (no letterbox).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub mul: Vec2,
    pub add: Vec2,
}

impl CoverFit {
    pub fn identity() -> Self {
        Self { mul: Vec2::new(1.0, 1.0), add: Vec2::new(0.0, 0.0) }
    }

    /// Scale the picture uniformly until it covers `res`, center it, clip overflow.
    pub fn new(res: (f32, f32), tex: (f32, f32)) -> Self {
        if tex.0 < 1.0 || tex.1 < 1.0 {
            return Self::identity();
        }
        let scale = (res.0 / tex.0).max(res.1 / tex.1);
        let scaled = (tex.0 * scale, tex.1 * scale);
        let offset = ((res.0 - scaled.0) * 0.5, (res.1 - scaled.1) * 0.5);
        Self {
            mul: Vec2::new(res.0 / scaled.0, res.1 / scaled.1),
            add: Vec2::new(-offset.0 / scaled.0, -offset.1 / scaled.1),
        }
    }

    #[inline]
    pub fn apply(&self, uv: Vec2) -> Vec2 {
        Vec2::new(uv.x * self.mul.x + self.add.x, uv.y * self.mul.y + self.add.y)
    }
}

pub struct Compositor {
    viewport: ViewportConfig,
    threshold: f32,
    edge_width: f32,
    placement: EdgePlacement,
}

impl Compositor {
    pub fn new(
        viewport: ViewportConfig,
        threshold: f32,
        edge_width: f32,
        placement: EdgePlacement,
    ) -> Self {
        Self { viewport, threshold, edge_width, placement }
    }

    pub fn from_config(viewport: ViewportConfig, cfg: &DisplayConfig) -> Self {
        Self::new(viewport, cfg.threshold, cfg.edge_width, cfg.edge_placement)
    }

    pub fn viewport(&self) -> &ViewportConfig {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: ViewportConfig) {
        self.viewport = viewport;
    }

    /// Edge band width after scaling by pixel density.
    pub fn edge(&self) -> f32 {
        self.edge_width * self.viewport.device_pixel_ratio
    }

    /// Reveal factor for one field value (0 = top, 1 = bottom).
    pub fn reveal(&self, f: f32) -> f32 {
        smooth_threshold(f, self.threshold, self.edge(), self.placement)
    }

    /// Render one frame into `out` (resized to the viewport if needed).
    pub fn composite(
        &self,
        field: &ScalarField,
        top: &SourceImage,
        bottom: &SourceImage,
        out: &mut FrameBuffer,
    ) {
        let (w, h) = (self.viewport.width, self.viewport.height);
        if out.width != w || out.height != h {
            *out = FrameBuffer::new(w, h);
        }
        let res = (w as f32, h as f32);
        let dims = |img: &SourceImage| {
            let (tw, th) = img.dimensions();
            (tw as f32, th as f32)
        };
        let top_fit = CoverFit::new(res, dims(top));
        let bottom_fit = CoverFit::new(res, dims(bottom));

        for py in 0..h {
            // screen rows go down, uv goes up
            let v = 1.0 - (py as f32 + 0.5) / h as f32;
            let row = py * w;
            for px in 0..w {
                let uv = Vec2::new((px as f32 + 0.5) / w as f32, v);
                let t = self.reveal(field.sample(uv.x, uv.y));

                let tuv = top_fit.apply(uv);
                let buv = bottom_fit.apply(uv);
                let a = top.sample(tuv.x, tuv.y);
                let b = bottom.sample(buv.x, buv.y);

                out.pixels[row + px] = pack_rgb(mix_rgb(a, b, t));
            }
        }
    }
}

/// Linear mix of two 0..255 colors, rounded to bytes.
#[inline]
pub fn mix_rgb(a: [f32; 3], b: [f32; 3], t: f32) -> [u8; 3] {
    let ch = |i: usize| (a[i] + (b[i] - a[i]) * t).round().clamp(0.0, 255.0) as u8;
    [ch(0), ch(1), ch(2)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::{Rgb, RgbImage};

    fn compositor(w: usize, h: usize, dpr: f32) -> Compositor {
        Compositor::new(ViewportConfig::new(w, h, dpr), 0.02, 0.004, EdgePlacement::Above)
    }

    #[test]
    fn device_pixel_ratio_is_capped() {
        assert_eq!(ViewportConfig::new(10, 10, 3.0).device_pixel_ratio, 2.0);
        assert_eq!(ViewportConfig::new(10, 10, 1.5).device_pixel_ratio, 1.5);
        assert_abs_diff_eq!(compositor(10, 10, 4.0).edge(), 0.008);
    }

    #[test]
    fn centered_edge_is_half_at_threshold() {
        let mid = smooth_threshold(0.02, 0.02, 0.004, EdgePlacement::Centered);
        assert_abs_diff_eq!(mid, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(smooth_threshold(0.0, 0.02, 0.004, EdgePlacement::Centered), 0.0);
        assert_abs_diff_eq!(smooth_threshold(0.5, 0.02, 0.004, EdgePlacement::Centered), 1.0);
    }

    #[test]
    fn above_edge_starts_at_threshold() {
        assert_abs_diff_eq!(smooth_threshold(0.02, 0.02, 0.004, EdgePlacement::Above), 0.0);
        let mid = smooth_threshold(0.022, 0.02, 0.004, EdgePlacement::Above);
        assert_abs_diff_eq!(mid, 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(smooth_threshold(0.024, 0.02, 0.004, EdgePlacement::Above), 1.0);
    }

    #[test]
    fn zero_edge_is_a_hard_step() {
        assert_eq!(smooth_threshold(0.019, 0.02, 0.0, EdgePlacement::Centered), 0.0);
        assert_eq!(smooth_threshold(0.02, 0.02, 0.0, EdgePlacement::Centered), 1.0);
    }

    #[test]
    fn cover_never_letterboxes() {
        let cases = [
            ((1920.0, 1080.0), (800.0, 1200.0)),
            ((400.0, 900.0), (1600.0, 900.0)),
            ((500.0, 500.0), (30.0, 70.0)),
            ((1280.0, 720.0), (1280.0, 720.0)),
        ];
        for (res, tex) in cases {
            let fit = CoverFit::new(res, tex);
            let lo = fit.apply(Vec2::new(0.0, 0.0));
            let hi = fit.apply(Vec2::new(1.0, 1.0));
            // whole output lands inside the picture...
            assert!(lo.x >= -1e-5 && lo.y >= -1e-5, "{res:?} {tex:?}");
            assert!(hi.x <= 1.0 + 1e-5 && hi.y <= 1.0 + 1e-5, "{res:?} {tex:?}");
            // ...and spans it fully along at least one axis, centered on both
            let span = (hi.x - lo.x).max(hi.y - lo.y);
            assert_abs_diff_eq!(span, 1.0, epsilon = 1e-5);
            assert_abs_diff_eq!((lo.x + hi.x) * 0.5, 0.5, epsilon = 1e-5);
            assert_abs_diff_eq!((lo.y + hi.y) * 0.5, 0.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn cover_keeps_picture_aspect() {
        let fit = CoverFit::new((200.0, 100.0), (100.0, 100.0));
        // 2:1 output over a square picture: full width, middle half of the height
        assert_abs_diff_eq!(fit.apply(Vec2::new(0.0, 0.0)).y, 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(fit.apply(Vec2::new(1.0, 1.0)).y, 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(fit.apply(Vec2::new(1.0, 1.0)).x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn sub_pixel_picture_uses_identity() {
        assert_eq!(CoverFit::new((10.0, 10.0), (0.0, 5.0)), CoverFit::identity());
    }

    #[test]
    fn empty_field_shows_top_only() {
        let c = compositor(8, 4, 1.0);
        let field = ScalarField::new(16, 16);
        let mut out = FrameBuffer::new(1, 1);
        let (blue, red) = (SourceImage::placeholder(0x0000FF), SourceImage::placeholder(0xFF0000));
        c.composite(&field, &blue, &red, &mut out);
        assert_eq!((out.width, out.height), (8, 4));
        assert!(out.pixels.iter().all(|p| *p == 0x0000FF));
    }

    #[test]
    fn saturated_field_shows_bottom_only() {
        let c = compositor(5, 5, 2.0);
        let mut field = ScalarField::new(4, 4);
        field.values.fill(0.5);
        let mut out = FrameBuffer::new(5, 5);
        let (blue, red) = (SourceImage::placeholder(0x0000FF), SourceImage::placeholder(0xFF0000));
        c.composite(&field, &blue, &red, &mut out);
        assert!(out.pixels.iter().all(|p| *p == 0xFF0000));
    }

    #[test]
    fn reveal_follows_field_layout() {
        // left half of the field above threshold -> left half of the frame is bottom
        let c = compositor(4, 2, 1.0);
        let mut field = ScalarField::new(2, 1);
        field.set(0, 0, 1.0);
        let mut out = FrameBuffer::new(4, 2);
        let (blue, red) = (SourceImage::placeholder(0x0000FF), SourceImage::placeholder(0xFF0000));
        c.composite(&field, &blue, &red, &mut out);
        for y in 0..2 {
            assert_eq!(out.pixels[y * 4], 0xFF0000);
            assert_eq!(out.pixels[y * 4 + 3], 0x0000FF);
        }
    }

    #[test]
    fn loaded_top_is_sampled_through_cover_fit() {
        // 9x1 strip, white | green | white thirds, on a square output:
        // cover crops to the middle ninth, so only green is visible.
        let mut pic = RgbImage::from_pixel(9, 1, Rgb([255, 255, 255]));
        for x in 3..6 {
            pic.put_pixel(x, 0, Rgb([0, 255, 0]));
        }
        let mut top = SourceImage::placeholder(0);
        top.set_loaded(pic);

        let c = compositor(4, 4, 1.0);
        let field = ScalarField::new(2, 2);
        let mut out = FrameBuffer::new(4, 4);
        c.composite(&field, &top, &SourceImage::placeholder(0xFF0000), &mut out);
        assert!(out.pixels.iter().all(|p| *p == 0x00FF00));
    }

    #[test]
    fn mix_rounds_each_channel() {
        assert_eq!(mix_rgb([0.0, 0.0, 255.0], [255.0, 0.0, 0.0], 0.5), [128, 0, 128]);
        assert_eq!(mix_rgb([10.0, 20.0, 30.0], [10.0, 20.0, 30.0], 0.7), [10, 20, 30]);
    }
}
