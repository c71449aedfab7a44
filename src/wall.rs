// Wall populator: the initial brick grid, the static boundary, and fresh rows
// dropped in from the top. Stateless; the caller owns the world and the rng.

use crate::config::{CanvasConfig, WallConfig};
use crate::types::Point;
use crate::world::{BodyHandle, World};
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallLayout {
    pub canvas_w: f32,
    pub canvas_h: f32,
    pub rows: u32,
    pub columns: u32,
    pub brick_w: f32,
    pub brick_h: f32,
    pub gap: f32,
    pub jitter: f32,
    pub thickness: f32,
    pub ceiling: bool,
}

impl WallLayout {
    pub fn from_config(canvas: &CanvasConfig, wall: &WallConfig) -> Self {
        Self {
            canvas_w: canvas.width as f32,
            canvas_h: canvas.height as f32,
            rows: wall.rows,
            columns: wall.columns,
            brick_w: wall.brick_width,
            brick_h: wall.brick_height,
            gap: wall.gap,
            jitter: wall.jitter,
            thickness: wall.boundary_thickness,
            ceiling: wall.ceiling,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.canvas_w * 0.5, self.canvas_h * 0.5)
    }

    /// Centre x of column `col`; the columns are centred on the canvas.
    pub fn column_x(&self, col: u32) -> f32 {
        let pitch = self.brick_w + self.gap;
        let span = self.columns as f32 * pitch - self.gap;
        let left = (self.canvas_w - span) * 0.5;
        left + col as f32 * pitch + self.brick_w * 0.5
    }

    /// Centre y of row `row`, counting up from the ground. Rows sit flush so
    /// a settled wall stays where it was built; `gap` is horizontal only.
    pub fn row_y(&self, row: u32) -> f32 {
        self.canvas_h - self.brick_h * 0.5 - row as f32 * self.brick_h
    }

    /// Distance between neighbouring brick centres.
    pub fn pitch(&self) -> (f32, f32) {
        (self.brick_w + self.gap, self.brick_h)
    }

    /// The brick cell nearest the canvas midpoint, clamped into the grid.
    pub fn pump_center(&self) -> Point {
        let mid = self.center();
        let (px, py) = self.pitch();
        let col = ((mid.x - self.column_x(0)) / px).round().clamp(0.0, self.columns.saturating_sub(1) as f32);
        let row = ((self.row_y(0) - mid.y) / py).round().clamp(0.0, self.rows.saturating_sub(1) as f32);
        Point::new(self.column_x(col as u32), self.row_y(row as u32))
    }

    /// Sample point of fist-pump cell (`i`, `j`), one pitch per step.
    pub fn pump_cell(&self, i: i32, j: i32) -> Point {
        let (px, py) = self.pitch();
        self.pump_center().offset(i as f32 * px, j as f32 * py)
    }

    fn jittered(&self, x: f32, rng: &mut impl Rng) -> f32 {
        if self.jitter > 0.0 { x + rng.gen_range(-self.jitter..=self.jitter) } else { x }
    }
}

/// Ground, left and right walls, and the ceiling if enabled. The ground's top
/// edge is the canvas bottom; the side walls sit just outside the canvas.
pub fn build_boundaries(world: &mut World, layout: &WallLayout) -> Vec<BodyHandle> {
    let (w, h, t) = (layout.canvas_w, layout.canvas_h, layout.thickness);
    let mut out = vec![
        world.add_static(Point::new(w * 0.5, h + t * 0.5), w + 2.0 * t, t),
        world.add_static(Point::new(-t * 0.5, h * 0.5), t, h * 3.0),
        world.add_static(Point::new(w + t * 0.5, h * 0.5), t, h * 3.0),
    ];
    if layout.ceiling {
        out.push(world.add_static(Point::new(w * 0.5, -t * 0.5), w + 2.0 * t, t));
    }
    out
}

/// The starting `rows` x `columns` grid, stacked on the ground.
pub fn build_grid(world: &mut World, layout: &WallLayout, rng: &mut impl Rng) -> Vec<BodyHandle> {
    let mut out = Vec::with_capacity((layout.rows * layout.columns) as usize);
    for row in 0..layout.rows {
        let y = layout.row_y(row);
        for col in 0..layout.columns {
            let x = layout.jittered(layout.column_x(col), &mut *rng);
            out.push(world.add_brick(Point::new(x, y), layout.brick_w, layout.brick_h));
        }
    }
    out
}

/// One row across the top of the canvas, same columns as the grid.
pub fn spawn_row(world: &mut World, layout: &WallLayout, rng: &mut impl Rng) -> Vec<BodyHandle> {
    let y = layout.brick_h * 0.5;
    (0..layout.columns)
        .map(|col| {
            let x = layout.jittered(layout.column_x(col), &mut *rng);
            world.add_brick(Point::new(x, y), layout.brick_w, layout.brick_h)
        })
        .collect()
}
