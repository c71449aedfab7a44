//! Applying gestures to the wall.
//!
//! Breakable bricks are tracked here, keyed by their physics body; the physics
//! world knows nothing about integrity or cracks. Static boundary bodies have
//! no entry and are never damaged.
//!
//! | Gesture   | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | Lighter   | brick under the point loses `lighter_rate` per frame       |
//! | Pinch     | brick under the point is removed                           |
//! | FistPump  | 9x9 brick cells around the canvas centre, graduated damage |
//!
//! Every destroyed brick counts toward replenishment: each
//! `blocks_to_spawn` destructions drop a fresh row in, until
//! `blocks_broken_to_win` is reached.

use crate::config::DamageConfig;
use crate::crack::{CrackPattern, TIERS};
use crate::gesture::GestureEvent;
use crate::types::Point;
use crate::wall::{self, WallLayout};
use crate::world::{BodyHandle, World};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use tracing::{debug, info};

pub const FULL_INTEGRITY: u8 = 100;

/// Cells either side of the centre sampled by a fist pump.
pub const PUMP_RADIUS: i32 = 4;

/// Crack tier for a breakage value: 0 when intact, 10 when gone.
#[inline]
pub fn tier_for(breakage: u8) -> u8 {
    (FULL_INTEGRITY - breakage.min(FULL_INTEGRITY)) / (FULL_INTEGRITY / TIERS)
}

// ----------------------------- brick ---------------------------------------------------

#[derive(Clone, Debug)]
pub struct Brick {
    /// Integrity, 100 down to 1. Never increases; the brick is removed
    /// instead of reaching 0.
    pub breakage: u8,
    /// Tier of the cracks currently drawn.
    pub crack_level: u8,
    /// Generated on first damage, then reused.
    pub crack: Option<CrackPattern>,
}

impl Default for Brick {
    fn default() -> Self {
        Self { breakage: FULL_INTEGRITY, crack_level: 0, crack: None }
    }
}

// ----------------------------- fist pump falloff ---------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PumpHit {
    Remove,
    Damage(u8),
}

/// Effect on grid cell (`i`, `j`), both in `-PUMP_RADIUS..=PUMP_RADIUS`.
///
/// The centre row and column are cleared outright; elsewhere the hit weakens
/// with Chebyshev distance from the centre.
pub fn pump_falloff(i: i32, j: i32) -> Option<PumpHit> {
    if i.abs() > PUMP_RADIUS || j.abs() > PUMP_RADIUS {
        return None;
    }
    if i == 0 || j == 0 {
        return Some(PumpHit::Remove);
    }
    Some(match i.abs().max(j.abs()) {
        1 => PumpHit::Remove,
        2 => PumpHit::Damage(75),
        3 => PumpHit::Damage(50),
        _ => PumpHit::Damage(25),
    })
}

// ----------------------------- DamageEvent ---------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageEvent {
    Damaged { body: BodyHandle, breakage: u8 },
    /// Cracks moved to a new tier. `sound` on even tiers.
    TierCrossed { body: BodyHandle, tier: u8, sound: bool },
    Destroyed { body: BodyHandle, at: Point },
    RowSpawned { bricks: usize },
    Won { total: u32 },
}

// ----------------------------- DamageApplicator ----------------------------------------

pub struct DamageApplicator {
    cfg: DamageConfig,
    layout: WallLayout,
    bricks: HashMap<BodyHandle, Brick>,
    since_spawn: u32,
    total_broken: u32,
    rng: StdRng,
}

impl DamageApplicator {
    pub fn new(cfg: DamageConfig, layout: WallLayout, seed: u64) -> Self {
        Self {
            cfg,
            layout,
            bricks: HashMap::new(),
            since_spawn: 0,
            total_broken: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Boundary plus the starting grid.
    pub fn populate(&mut self, world: &mut World) {
        wall::build_boundaries(world, &self.layout);
        let grid = wall::build_grid(world, &self.layout, &mut self.rng);
        info!(bricks = grid.len(), "wall built");
        self.register(grid);
    }

    /// Wipe the world and start over.
    pub fn reset(&mut self, world: &mut World) {
        world.clear();
        self.bricks.clear();
        self.since_spawn = 0;
        self.total_broken = 0;
        self.populate(world);
    }

    /// Add one breakable brick of the layout's size at `center`.
    pub fn insert_brick(&mut self, world: &mut World, center: Point) -> BodyHandle {
        let h = world.add_brick(center, self.layout.brick_w, self.layout.brick_h);
        self.bricks.insert(h, Brick::default());
        h
    }

    fn register(&mut self, handles: Vec<BodyHandle>) {
        for h in handles {
            self.bricks.insert(h, Brick::default());
        }
    }

    pub fn brick(&self, body: BodyHandle) -> Option<&Brick> {
        self.bricks.get(&body)
    }

    pub fn bricks(&self) -> impl Iterator<Item = (BodyHandle, &Brick)> {
        self.bricks.iter().map(|(&h, b)| (h, b))
    }

    pub fn brick_count(&self) -> usize {
        self.bricks.len()
    }

    pub fn total_broken(&self) -> u32 {
        self.total_broken
    }

    pub fn has_won(&self) -> bool {
        self.total_broken >= self.cfg.blocks_broken_to_win
    }

    pub fn layout(&self) -> &WallLayout {
        &self.layout
    }

    /// Apply one gesture. The world is queried fresh every time.
    pub fn apply(&mut self, world: &mut World, gesture: &GestureEvent) -> Vec<DamageEvent> {
        let mut events = Vec::new();
        match *gesture {
            GestureEvent::Lighter(p) => {
                if let Some(h) = self.breakable_at(world, p) {
                    self.wear(world, h, self.cfg.lighter_rate, &mut events);
                }
            }
            GestureEvent::Pinch(p) => {
                if let Some(h) = self.breakable_at(world, p) {
                    self.destroy(world, h, &mut events);
                }
            }
            GestureEvent::FistPump => self.pump(world, &mut events),
        }
        events
    }

    /// Bricks that fell off the canvas bottom or sides are dropped from play
    /// without counting as broken.
    pub fn cull_offscreen(&mut self, world: &mut World) -> usize {
        let margin = self.layout.brick_w.max(self.layout.brick_h) * 2.0;
        let (w, h) = (self.layout.canvas_w, self.layout.canvas_h);
        let gone: Vec<BodyHandle> = self
            .bricks
            .keys()
            .copied()
            .filter(|&b| match world.pose(b) {
                Some((c, _)) => c.x < -margin || c.x > w + margin || c.y > h + margin,
                None => true,
            })
            .collect();
        for b in &gone {
            self.bricks.remove(b);
            world.remove_body(*b);
        }
        gone.len()
    }

    fn breakable_at(&self, world: &World, p: Point) -> Option<BodyHandle> {
        world.bodies_at_point(p).into_iter().find(|h| self.bricks.contains_key(h))
    }

    fn pump(&mut self, world: &mut World, events: &mut Vec<DamageEvent>) {
        for j in -PUMP_RADIUS..=PUMP_RADIUS {
            for i in -PUMP_RADIUS..=PUMP_RADIUS {
                let Some(hit) = pump_falloff(i, j) else { continue };
                let p = self.layout.pump_cell(i, j);
                let Some(h) = self.breakable_at(world, p) else { continue };
                match hit {
                    PumpHit::Remove => self.destroy(world, h, events),
                    PumpHit::Damage(amount) => self.wear(world, h, amount, events),
                }
            }
        }
    }

    /// Take `amount` off a brick; a blow that would reach zero removes it.
    fn wear(&mut self, world: &mut World, h: BodyHandle, amount: u8, events: &mut Vec<DamageEvent>) {
        let Some(brick) = self.bricks.get_mut(&h) else { return };
        if amount >= brick.breakage {
            self.destroy(world, h, events);
            return;
        }
        brick.breakage -= amount;
        events.push(DamageEvent::Damaged { body: h, breakage: brick.breakage });

        let tier = tier_for(brick.breakage);
        if tier != brick.crack_level {
            if brick.crack.is_none() {
                brick.crack = Some(CrackPattern::generate(&mut self.rng));
            }
            brick.crack_level = tier;
            let sound = tier % 2 == 0;
            debug!(?h, tier, sound, "crack tier");
            events.push(DamageEvent::TierCrossed { body: h, tier, sound });
        }
    }

    fn destroy(&mut self, world: &mut World, h: BodyHandle, events: &mut Vec<DamageEvent>) {
        if self.bricks.remove(&h).is_none() {
            return;
        }
        let at = world.pose(h).map(|(c, _)| c).unwrap_or_default();
        world.remove_body(h);

        self.total_broken += 1;
        self.since_spawn += 1;
        events.push(DamageEvent::Destroyed { body: h, at });
        debug!(total = self.total_broken, "brick destroyed");

        if self.total_broken == self.cfg.blocks_broken_to_win {
            info!(total = self.total_broken, "wall broken, you win");
            events.push(DamageEvent::Won { total: self.total_broken });
        }

        if self.since_spawn >= self.cfg.blocks_to_spawn {
            self.since_spawn = 0;
            if self.total_broken < self.cfg.blocks_broken_to_win {
                let row = wall::spawn_row(world, &self.layout, &mut self.rng);
                info!(bricks = row.len(), total = self.total_broken, "row spawned");
                events.push(DamageEvent::RowSpawned { bricks: row.len() });
                self.register(row);
            }
        }
    }
}
