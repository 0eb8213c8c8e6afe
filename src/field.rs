// Trail field: two equal-size scalar grids used ping-pong style.
// Each tick reads `current`, writes `next` (decay + stroke deposit), then the
// roles flip. The buffer being read is never written during a tick.

use crate::config::SimulationConfig;
use crate::pointer::PointerSample;
use crate::types::{smoothstep, Vec2};

/// Square-or-not grid of trail intensity, row 0 at the bottom.
#[derive(Clone, Debug)]
pub struct ScalarField {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>, // row-major, length = width * height
}

impl ScalarField {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, values: vec![0.0; width * height] }
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[j * self.width + i]
    }

    #[cfg(test)]
    pub fn set(&mut self, i: usize, j: usize, v: f32) {
        self.values[j * self.width + i] = v;
    }

    /// Unit-space center of cell (i, j).
    #[inline]
    pub fn cell_center(&self, i: usize, j: usize) -> Vec2 {
        Vec2::new(
            (i as f32 + 0.5) / self.width as f32,
            (j as f32 + 0.5) / self.height as f32,
        )
    }

    /// Cell whose center is nearest to unit-space `p` (clamped to the grid).
    pub fn cell_at(&self, p: Vec2) -> (usize, usize) {
        let i = (p.x * self.width as f32).floor().clamp(0.0, (self.width - 1) as f32);
        let j = (p.y * self.height as f32).floor().clamp(0.0, (self.height - 1) as f32);
        (i as usize, j as usize)
    }

    /// Bilinear lookup between cell centers, clamped to the edge cells.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let fx = (u * self.width as f32 - 0.5).clamp(0.0, (self.width - 1) as f32);
        let fy = (v * self.height as f32 - 0.5).clamp(0.0, (self.height - 1) as f32);
        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let a = self.get(x0, y0) + (self.get(x1, y0) - self.get(x0, y0)) * tx;
        let b = self.get(x0, y1) + (self.get(x1, y1) - self.get(x0, y1)) * tx;
        a + (b - a) * ty
    }
}

/// Shape of one stroke's contribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepositParams {
    pub line_width: f32,
    pub intensity: f32,
    pub min_segment: f32,
}

impl From<&SimulationConfig> for DepositParams {
    fn from(cfg: &SimulationConfig) -> Self {
        Self { line_width: cfg.line_width, intensity: cfg.intensity, min_segment: cfg.min_segment }
    }
}

/// Energy a cell at `p` receives from the stroke `prev -> cur`.
/// Distance is measured to the swept segment, not the infinite line.
pub fn deposit_intensity(p: Vec2, prev: Vec2, cur: Vec2, params: &DepositParams) -> f32 {
    let delta = cur.sub(prev);
    let len = delta.length();
    if len <= params.min_segment {
        return 0.0;
    }
    let dir = delta.scale(1.0 / len);
    let along = p.sub(prev).dot(dir).clamp(0.0, len);
    let closest = prev.add(dir.scale(along));
    let dist = p.sub(closest).length();
    smoothstep(params.line_width, 0.0, dist) * params.intensity
}

pub struct FieldSimulator {
    buffers: [ScalarField; 2],
    current: usize, // index of the readable buffer; the other one is "next"
    decay: f32,
    deposit: DepositParams,
}

impl FieldSimulator {
    /// Both buffers start at zero. `decay` must be in (0, 1].
    pub fn new(width: usize, height: usize, decay: f32, deposit: DepositParams) -> Self {
        debug_assert!(decay > 0.0 && decay <= 1.0, "decay out of range: {decay}");
        Self {
            buffers: [ScalarField::new(width, height), ScalarField::new(width, height)],
            current: 0,
            decay,
            deposit,
        }
    }

    pub fn from_config(cfg: &SimulationConfig) -> Self {
        Self::new(cfg.field_size, cfg.field_size, cfg.decay, DepositParams::from(cfg))
    }

    /// The stable field from the previous tick.
    pub fn current(&self) -> &ScalarField {
        &self.buffers[self.current]
    }

    /// The field written by the latest `step` (valid until `swap`).
    pub fn produced(&self) -> &ScalarField {
        &self.buffers[1 - self.current]
    }

    #[cfg(test)]
    pub fn current_mut(&mut self) -> &mut ScalarField {
        &mut self.buffers[self.current]
    }

    /// Write next = current * decay (+ deposit along the pointer's last segment).
    pub fn step(&mut self, pointer: &PointerSample) {
        let (first, second) = self.buffers.split_at_mut(1);
        let (src, dst) = if self.current == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        };

        for (d, s) in dst.values.iter_mut().zip(&src.values) {
            *d = s * self.decay;
        }

        if !pointer.moving {
            return;
        }
        let (prev, cur) = (pointer.previous, pointer.position);
        if cur.sub(prev).length() <= self.deposit.min_segment {
            return;
        }

        // Cells farther than line_width from both endpoints' bounding box get nothing.
        let lw = self.deposit.line_width;
        let lo = Vec2::new(prev.x.min(cur.x) - lw, prev.y.min(cur.y) - lw);
        let hi = Vec2::new(prev.x.max(cur.x) + lw, prev.y.max(cur.y) + lw);
        let (i0, j0) = dst.cell_at(lo);
        let (i1, j1) = dst.cell_at(hi);

        for j in j0..=j1 {
            for i in i0..=i1 {
                let p = dst.cell_center(i, j);
                let add = deposit_intensity(p, prev, cur, &self.deposit);
                if add > 0.0 {
                    let idx = j * dst.width + i;
                    dst.values[idx] += add;
                }
            }
        }
    }

    /// Flip current/next. Called exactly once per tick, after compositing.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }
}
