// Crack patterns for damaged bricks.
//
// A pattern holds one set of line segments per damage tier (1..=10). Segments
// live in the unit square with (0.5, 0.5) at the brick centre and are scaled
// to the brick at draw time. Generated once per brick, on first damage.

use crate::types::Point;
use rand::Rng;
use std::f32::consts::TAU;

pub const TIERS: u8 = 10;

const CENTER: Point = Point::new(0.5, 0.5);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

#[derive(Clone, Debug)]
pub struct CrackPattern {
    tiers: Vec<Vec<Segment>>, // index 0 = tier 1
}

impl CrackPattern {
    pub fn generate(rng: &mut impl Rng) -> Self {
        let tiers = (1..=TIERS).map(|tier| Self::tier_segments(&mut *rng, tier)).collect();
        Self { tiers }
    }

    /// More, longer and branchier cracks as the tier climbs.
    fn tier_segments(rng: &mut impl Rng, tier: u8) -> Vec<Segment> {
        let t = tier as f32;
        let cracks = 1 + tier as usize / 2;           // 1..=6 arms
        let reach = 0.18 + 0.032 * t;                 // arm length in unit-square
        let branches = tier as usize / 3;             // 0..=3 per arm
        let steps = 3;

        let mut out = Vec::new();
        let base_angle = rng.gen_range(0.0..TAU);
        for arm in 0..cracks {
            let spread = TAU / cracks as f32;
            let mut angle = base_angle + spread * arm as f32 + rng.gen_range(-0.3..0.3);
            let step_len = reach / steps as f32;

            let mut at = CENTER;
            let mut joints = Vec::with_capacity(steps);
            for _ in 0..steps {
                angle += rng.gen_range(-0.45..0.45);
                let next = clamp_unit(at.offset(step_len * angle.cos(), step_len * angle.sin()));
                out.push(Segment { from: at, to: next });
                joints.push((next, angle));
                at = next;
            }

            for b in 0..branches.min(joints.len()) {
                let (start, arm_angle) = joints[b];
                let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let dir = arm_angle + side * rng.gen_range(0.5..1.1);
                let len = step_len * rng.gen_range(0.6..1.2);
                let end = clamp_unit(start.offset(len * dir.cos(), len * dir.sin()));
                out.push(Segment { from: start, to: end });
            }
        }
        out
    }

    /// Segments for `tier` (0 = undamaged, nothing to draw).
    pub fn tier(&self, tier: u8) -> &[Segment] {
        match tier {
            0 => &[],
            t => self.tiers.get(t.min(TIERS) as usize - 1).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Segments for `tier` placed on a `width` x `height` brick at `center`
    /// rotated by `angle`.
    pub fn placed(
        &self,
        tier: u8,
        center: Point,
        angle: f32,
        width: f32,
        height: f32,
    ) -> Vec<(Point, Point)> {
        let (sin, cos) = angle.sin_cos();
        let place = |p: Point| {
            let lx = (p.x - 0.5) * width;
            let ly = (p.y - 0.5) * height;
            Point::new(center.x + lx * cos - ly * sin, center.y + lx * sin + ly * cos)
        };
        self.tier(tier).iter().map(|s| (place(s.from), place(s.to))).collect()
    }
}

fn clamp_unit(p: Point) -> Point {
    Point::new(p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn reach(segs: &[Segment]) -> f32 {
        segs.iter().map(|s| s.to.distance(CENTER)).fold(0.0, f32::max)
    }

    #[test]
    fn every_tier_has_segments_inside_the_unit_square() {
        let p = CrackPattern::generate(&mut StdRng::seed_from_u64(7));
        assert!(p.tier(0).is_empty());
        for t in 1..=TIERS {
            let segs = p.tier(t);
            assert!(!segs.is_empty(), "tier {t} empty");
            for s in segs {
                for q in [s.from, s.to] {
                    assert!((0.0..=1.0).contains(&q.x) && (0.0..=1.0).contains(&q.y));
                }
            }
        }
    }

    #[test]
    fn higher_tiers_have_more_cracks() {
        let p = CrackPattern::generate(&mut StdRng::seed_from_u64(11));
        assert!(p.tier(10).len() > p.tier(1).len());
        assert!(p.tier(9).len() > p.tier(3).len());
        assert!(reach(p.tier(10)) > 0.0);
    }

    #[test]
    fn placement_scales_to_the_brick() {
        let p = CrackPattern::generate(&mut StdRng::seed_from_u64(3));
        let center = Point::new(200.0, 100.0);
        for (a, b) in p.placed(10, center, 0.0, 80.0, 40.0) {
            for q in [a, b] {
                assert!((q.x - center.x).abs() <= 40.0 + 1e-3);
                assert!((q.y - center.y).abs() <= 20.0 + 1e-3);
            }
        }
    }
}
