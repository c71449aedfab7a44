// Render overlay: everything drawn on top of the camera frame.
// Visual outcomes:
// - Each brick is a translucent slab of ice; the more damaged, the more of the video shows through.
// - Bricks get a thin outline and, once damaged, white crack lines that grow with each tier.
// - Hand keypoints show as small dots, active gestures as a crosshair.
// - Fist-pump anchors show as two rings (the armed one brighter).

use crate::damage::{Brick, DamageApplicator, FULL_INTEGRITY};
use crate::gamma::LinearBlend;
use crate::gesture::{Anchor, ClassifierState, GestureEvent, PumpPhase};
use crate::hand::Hand;
use crate::types::{FrameBuffer, Point};
use crate::world::World;
use image::{ImageBuffer, Rgb, RgbImage, imageops};
use rand::Rng;

const OUTLINE: u32 = 0x5A8CB4;
const CRACK: u32 = 0xF4FBFF;
const KEYPOINT: u32 = 0x40FF80;
const CROSSHAIR_LIGHTER: u32 = 0xFF9A30;
const CROSSHAIR_PINCH: u32 = 0xFF40C0;
const ANCHOR_ARMED: u32 = 0xFFFFFF;
const ANCHOR_IDLE: u32 = 0x8090A0;

/// Opacity of an intact brick, and of one about to break.
const ALPHA_FULL: f32 = 0.8;
const ALPHA_BROKEN: f32 = 0.25;

// ----------------------------- primitives ----------------------------------------------

#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if let Some(idx) = fb.index(x, y) {
        fb.pixels[idx] = color;
    }
}

/// Bresenham line, 1 px.
pub fn draw_line(fb: &mut FrameBuffer, a: Point, b: Point, color: u32) {
    let (mut x0, mut y0) = (a.x.round() as i32, a.y.round() as i32);
    let (x1, y1) = (b.x.round() as i32, b.y.round() as i32);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// A "+" with a small gap in the middle.
pub fn draw_crosshair(fb: &mut FrameBuffer, c: Point, size: f32, color: u32) {
    draw_line(fb, c.offset(-size, 0.0), c.offset(-3.0, 0.0), color);
    draw_line(fb, c.offset(3.0, 0.0), c.offset(size, 0.0), color);
    draw_line(fb, c.offset(0.0, -size), c.offset(0.0, -3.0), color);
    draw_line(fb, c.offset(0.0, 3.0), c.offset(0.0, size), color);
}

/// Midpoint circle outline.
pub fn draw_circle(fb: &mut FrameBuffer, c: Point, radius: i32, color: u32) {
    let (cx, cy) = (c.x.round() as i32, c.y.round() as i32);
    let (mut x, mut y, mut err) = (radius, 0, 1 - radius);
    while x >= y {
        for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            put_pixel(fb, cx + px, cy + py, color);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

fn fill_dot(fb: &mut FrameBuffer, c: Point, radius: i32, color: u32) {
    let (cx, cy) = (c.x.round() as i32, c.y.round() as i32);
    for y in -radius..=radius {
        for x in -radius..=radius {
            if x * x + y * y <= radius * radius {
                put_pixel(fb, cx + x, cy + y, color);
            }
        }
    }
}

// ----------------------------- ice texture ---------------------------------------------

/// Procedural frosted-ice tile, stretched over every brick.
pub struct IceTexture {
    image: RgbImage,
}

impl IceTexture {
    pub fn generate(width: u32, height: u32, rng: &mut impl Rng) -> Self {
        let mut base: RgbImage = ImageBuffer::from_fn(width.max(1), height.max(1), |_, _| {
            let n: i16 = rng.gen_range(-18..=18);
            Rgb([
                (190 + n).clamp(0, 255) as u8,
                (225 + n).clamp(0, 255) as u8,
                (245 + n / 2).clamp(0, 255) as u8,
            ])
        });

        // A few frost streaks, lighter than the body.
        for _ in 0..(width / 8).max(1) {
            let (mut x, mut y) = (rng.gen_range(0..base.width()) as f32, 0.0f32);
            let slope = rng.gen_range(-0.6f32..0.6);
            while (y as u32) < base.height() {
                let px = (x as i64).rem_euclid(base.width() as i64) as u32;
                base.put_pixel(px, y as u32, Rgb([235, 248, 255]));
                x += slope;
                y += 1.0;
            }
        }

        Self { image: imageops::blur(&base, 1.2) }
    }

    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Colour at `u`,`v` in 0..1, clamped.
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let (w, h) = self.image.dimensions();
        let x = ((u.clamp(0.0, 1.0) * (w - 1) as f32).round()) as u32;
        let y = ((v.clamp(0.0, 1.0) * (h - 1) as f32).round()) as u32;
        let Rgb([r, g, b]) = *self.image.get_pixel(x, y);
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }
}

/// Brick opacity for a given integrity.
pub fn brick_alpha(breakage: u8) -> f32 {
    let t = breakage.min(FULL_INTEGRITY) as f32 / FULL_INTEGRITY as f32;
    ALPHA_BROKEN + (ALPHA_FULL - ALPHA_BROKEN) * t
}

// ----------------------------- overlay -------------------------------------------------

pub struct Overlay {
    blend: LinearBlend,
    texture: IceTexture,
}

impl Overlay {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self { blend: LinearBlend::new(), texture: IceTexture::generate(64, 32, rng) }
    }

    /// Composite the wall, hands and gesture feedback onto `fb`.
    pub fn render(
        &self,
        fb: &mut FrameBuffer,
        world: &World,
        damage: &DamageApplicator,
        hands: &[Hand],
        state: &ClassifierState,
        gestures: &[GestureEvent],
    ) {
        let (bw, bh) = (damage.layout().brick_w, damage.layout().brick_h);
        for (body, brick) in damage.bricks() {
            let Some((center, angle)) = world.pose(body) else { continue };
            self.fill_brick(fb, center, angle, bw, bh, brick.breakage);
            if let Some(corners) = world.outline(body) {
                for k in 0..4 {
                    draw_line(fb, corners[k], corners[(k + 1) % 4], OUTLINE);
                }
            }
            draw_cracks(fb, brick, center, angle, bw, bh);
        }

        for hand in hands {
            for p in hand.keypoints.iter().flatten() {
                fill_dot(fb, *p, 2, KEYPOINT);
            }
        }

        draw_anchors(fb, &state.fist.phase);

        for g in gestures {
            match *g {
                GestureEvent::Lighter(p) => draw_crosshair(fb, p, 10.0, CROSSHAIR_LIGHTER),
                GestureEvent::Pinch(p) => draw_crosshair(fb, p, 16.0, CROSSHAIR_PINCH),
                GestureEvent::FistPump => {}
            }
        }
    }

    /// Textured, rotated box. Pixels are tested in the brick's own frame so
    /// rotation needs no polygon scan.
    fn fill_brick(&self, fb: &mut FrameBuffer, center: Point, angle: f32, w: f32, h: f32, breakage: u8) {
        let alpha = brick_alpha(breakage);
        let (sin, cos) = angle.sin_cos();
        let reach = (w * w + h * h).sqrt() * 0.5;
        let (x0, x1) = ((center.x - reach).floor() as i32, (center.x + reach).ceil() as i32);
        let (y0, y1) = ((center.y - reach).floor() as i32, (center.y + reach).ceil() as i32);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let Some(idx) = fb.index(x, y) else { continue };
                let (dx, dy) = (x as f32 + 0.5 - center.x, y as f32 + 0.5 - center.y);
                let lx = dx * cos + dy * sin;
                let ly = -dx * sin + dy * cos;
                if lx.abs() > w * 0.5 || ly.abs() > h * 0.5 {
                    continue;
                }
                let ice = self.texture.sample(lx / w + 0.5, ly / h + 0.5);
                fb.pixels[idx] = self.blend.mix(fb.pixels[idx], ice, alpha);
            }
        }
    }
}

fn draw_cracks(fb: &mut FrameBuffer, brick: &Brick, center: Point, angle: f32, w: f32, h: f32) {
    let Some(pattern) = &brick.crack else { return };
    for (a, b) in pattern.placed(brick.crack_level, center, angle, w, h) {
        draw_line(fb, a, b, CRACK);
    }
}

fn draw_anchors(fb: &mut FrameBuffer, phase: &PumpPhase) {
    let Some((lower, upper)) = phase.anchors() else { return };
    let (lower_color, upper_color) = match phase {
        PumpPhase::Armed { target: Anchor::Upper, .. } => (ANCHOR_IDLE, ANCHOR_ARMED),
        _ => (ANCHOR_ARMED, ANCHOR_IDLE),
    };
    draw_circle(fb, lower, 14, lower_color);
    draw_circle(fb, upper, 14, upper_color);
    draw_line(fb, lower.offset(0.0, -14.0), upper.offset(0.0, 14.0), ANCHOR_IDLE);
}
