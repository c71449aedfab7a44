// The physics world: rapier2d sets plus the handful of operations the wall
// needs (add, remove, list, point query, step). World units are canvas pixels
// with y pointing down, so gravity is positive y.

use crate::types::Point;
use rapier2d::parry::query::PointQuery;
use rapier2d::prelude::*;

pub use rapier2d::prelude::RigidBodyHandle as BodyHandle;

/// Physical properties of a breakable brick.
const BRICK_RESTITUTION: f32 = 0.5;
const BRICK_FRICTION: f32 = 0.5;
const BRICK_DENSITY: f32 = 1.0;

/// Longest step we integrate; a stalled frame must not fling bricks.
const MAX_DT: f32 = 1.0 / 30.0;

pub struct World {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
}

impl World {
    pub fn new(gravity_y: f32) -> Self {
        Self {
            gravity: vector![0.0, gravity_y],
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
        }
    }

    /// Advance the simulation by `dt` seconds (clamped).
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.params.dt = dt.min(MAX_DT);
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
    }

    /// A dynamic `width` x `height` brick centred on `center`.
    pub fn add_brick(&mut self, center: Point, width: f32, height: f32) -> BodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![center.x, center.y])
            .build();
        let collider = ColliderBuilder::cuboid(width * 0.5, height * 0.5)
            .restitution(BRICK_RESTITUTION)
            .friction(BRICK_FRICTION)
            .density(BRICK_DENSITY)
            .build();
        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// An immovable box (ground, side walls, ceiling).
    pub fn add_static(&mut self, center: Point, width: f32, height: f32) -> BodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![center.x, center.y])
            .build();
        let collider = ColliderBuilder::cuboid(width * 0.5, height * 0.5)
            .friction(BRICK_FRICTION)
            .build();
        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Remove a body and its collider. False if it was already gone.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn bodies(&self) -> Vec<BodyHandle> {
        self.bodies.iter().map(|(h, _)| h).collect()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    pub fn is_static(&self, handle: BodyHandle) -> bool {
        self.bodies.get(handle).is_some_and(|b| b.is_fixed())
    }

    /// Every body with a collider covering `p`.
    pub fn bodies_at_point(&self, p: Point) -> Vec<BodyHandle> {
        let pt = point![p.x, p.y];
        let mut hits = Vec::new();
        for (_, collider) in self.colliders.iter() {
            let Some(parent) = collider.parent() else { continue };
            let Some(pose) = self.collider_pose(collider) else { continue };
            if collider.shape().contains_point(&pose, &pt) && !hits.contains(&parent) {
                hits.push(parent);
            }
        }
        hits
    }

    /// Centre and rotation (radians) of a body.
    pub fn pose(&self, handle: BodyHandle) -> Option<(Point, f32)> {
        let body = self.bodies.get(handle)?;
        let t = body.translation();
        Some((Point::new(t.x, t.y), body.rotation().angle()))
    }

    /// Corners of a body's box collider in world space, clockwise from top-left.
    pub fn outline(&self, handle: BodyHandle) -> Option<[Point; 4]> {
        let body = self.bodies.get(handle)?;
        let collider = self.colliders.get(*body.colliders().first()?)?;
        let half = collider.shape().as_cuboid()?.half_extents;
        let pose = self.collider_pose(collider)?;
        let corner = |x: f32, y: f32| {
            let p = pose * point![x, y];
            Point::new(p.x, p.y)
        };
        Some([
            corner(-half.x, -half.y),
            corner(half.x, -half.y),
            corner(half.x, half.y),
            corner(-half.x, half.y),
        ])
    }

    /// Remove every body.
    pub fn clear(&mut self) {
        for handle in self.bodies() {
            self.remove_body(handle);
        }
    }

    // Derived from the parent so it is right even before the first step.
    fn collider_pose(&self, collider: &Collider) -> Option<Isometry<Real>> {
        let parent = self.bodies.get(collider.parent()?)?;
        Some(parent.position() * collider.position_wrt_parent()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_query_finds_the_brick_under_the_point() {
        let mut world = World::new(900.0);
        let a = world.add_brick(Point::new(100.0, 100.0), 80.0, 40.0);
        let b = world.add_brick(Point::new(200.0, 100.0), 80.0, 40.0);

        assert_eq!(world.bodies_at_point(Point::new(110.0, 110.0)), vec![a]);
        assert_eq!(world.bodies_at_point(Point::new(170.0, 90.0)), vec![b]);
        assert!(world.bodies_at_point(Point::new(150.0, 100.0)).is_empty());
    }

    #[test]
    fn removed_body_is_gone_everywhere() {
        let mut world = World::new(900.0);
        let a = world.add_brick(Point::new(100.0, 100.0), 80.0, 40.0);
        assert!(world.remove_body(a));
        assert!(!world.contains(a));
        assert!(!world.remove_body(a));
        assert!(world.bodies_at_point(Point::new(100.0, 100.0)).is_empty());
        assert!(world.bodies().is_empty());
    }

    #[test]
    fn outline_of_unrotated_box() {
        let mut world = World::new(0.0);
        let a = world.add_static(Point::new(50.0, 20.0), 20.0, 10.0);
        let corners = world.outline(a).unwrap();
        assert_eq!(corners[0], Point::new(40.0, 15.0));
        assert_eq!(corners[2], Point::new(60.0, 25.0));
        assert!(world.is_static(a));
    }

    #[test]
    fn bricks_fall_onto_static_ground() {
        let mut world = World::new(900.0);
        let ground = world.add_static(Point::new(100.0, 220.0), 400.0, 40.0);
        let brick = world.add_brick(Point::new(100.0, 100.0), 40.0, 20.0);
        for _ in 0..240 {
            world.step(1.0 / 60.0);
        }
        let (center, _) = world.pose(brick).unwrap();
        // Ground top is at y = 200; the brick rests on it.
        assert!((center.y - 190.0).abs() < 2.0, "brick at {center:?}");
        assert_eq!(world.pose(ground).unwrap().0, Point::new(100.0, 220.0));
    }
}
