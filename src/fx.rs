// FX: flame licks and ice shards, software-drawn with additive blending.
// Visual outcomes:
// - Holding the lighter over a brick sends small orange flames rising from the thumb.
// - A brick that breaks bursts into pale blue shards that fly out and fall.

use crate::types::{FrameBuffer, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

const FLAME_RGB: (u8, u8, u8) = (255, 140, 40);
const SHARD_RGB: (u8, u8, u8) = (170, 220, 255);

/// Additive blend one RGB triplet at (x,y), saturating at 255.
#[inline]
fn add_rgb_saturating(fb: &mut FrameBuffer, x: i32, y: i32, (r, g, b): (u8, u8, u8)) {
    let Some(idx) = fb.index(x, y) else { return };
    let old = fb.pixels[idx];
    let ch = |shift: u32, add: u8| (((old >> shift) & 0xFF) + add as u32).min(255) << shift;
    fb.pixels[idx] = ch(16, r) | ch(8, g) | ch(0, b);
}

/// Soft round glow centred at (cx,cy); `strength` in [0,1].
/// Visual: a fuzzy dot of light, brightest in the middle.
fn draw_additive_disc(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, rgb: (u8, u8, u8), strength: f32) {
    if radius <= 0 {
        return;
    }
    let r2 = (radius * radius) as f32;
    let sigma = radius as f32 * 0.5;
    let denom = 2.0 * sigma * sigma;

    for y in (cy - radius)..=(cy + radius) {
        for x in (cx - radius)..=(cx + radius) {
            let (dx, dy) = ((x - cx) as f32, (y - cy) as f32);
            let d2 = dx * dx + dy * dy;
            if d2 > r2 {
                continue;
            }
            let w = (-d2 / denom).exp() * strength;
            let scale = |c: u8| (c as f32 * w).round().clamp(0.0, 255.0) as u8;
            add_rgb_saturating(fb, x, y, (scale(rgb.0), scale(rgb.1), scale(rgb.2)));
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Flame,
    Shard,
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Point,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub max_life: f32,
    pub energy: f32,
    pub kind: Kind,
}

impl Particle {
    #[inline]
    fn alive(&self) -> bool {
        self.life > 0.0
    }
}

pub struct Fx {
    rng: StdRng,
    particles: Vec<Particle>,
    max_particles: usize,
}

impl Fx {
    pub fn new(max_particles: usize, seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), particles: Vec::with_capacity(max_particles), max_particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// A few flame licks at `at`, drifting upward.
    pub fn spawn_flame(&mut self, at: Point, count: usize) {
        for _ in 0..count {
            let vx = self.rng.gen_range(-25.0..25.0);
            let vy = -self.rng.gen_range(60.0..140.0);
            let life = self.rng.gen_range(0.25..0.5);
            let energy = self.rng.gen_range(0.6..1.0);
            self.push(Particle { pos: at, vx, vy, life, max_life: life, energy, kind: Kind::Flame });
        }
    }

    /// A burst of shards flying outward from `at`.
    pub fn spawn_shards(&mut self, at: Point, count: usize) {
        for _ in 0..count {
            let speed = self.rng.gen_range(80.0..260.0);
            let angle = self.rng.gen_range(0.0..TAU);
            let life = self.rng.gen_range(0.4..0.9);
            let energy = self.rng.gen_range(0.5..1.0);
            let (vx, vy) = (speed * angle.cos(), speed * angle.sin() - 60.0);
            self.push(Particle { pos: at, vx, vy, life, max_life: life, energy, kind: Kind::Shard });
        }
    }

    fn push(&mut self, p: Particle) {
        if self.particles.len() < self.max_particles {
            self.particles.push(p);
        }
    }

    /// Integrate and drop dead particles without drawing.
    pub fn update(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.pos = p.pos.offset(p.vx * dt, p.vy * dt);
            p.vx *= 0.98;
            p.vy = match p.kind {
                // flames keep rising and slow down, shards fall
                Kind::Flame => p.vy * 0.95,
                Kind::Shard => p.vy * 0.99 + 600.0 * dt,
            };
            p.life -= dt;
        }
        self.particles.retain(Particle::alive);
    }

    /// Step and draw all particles on top of `fb`.
    /// Visual: flames shrink as they rise, shards fade as they fall.
    pub fn update_and_render(&mut self, fb: &mut FrameBuffer, dt: f32) {
        self.update(dt);
        for p in &self.particles {
            let life01 = (p.life / p.max_life).clamp(0.0, 1.0);
            let (radius, rgb) = match p.kind {
                Kind::Flame => ((7.0 * life01 + 2.0) as i32, FLAME_RGB),
                Kind::Shard => (3, SHARD_RGB),
            };
            let strength = (0.9 * p.energy * life01).clamp(0.0, 1.0);
            draw_additive_disc(fb, p.pos.x as i32, p.pos.y as i32, radius, rgb, strength);
        }
    }
}
