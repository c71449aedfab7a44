use ice_wall::config::{Config, DamageConfig};
use ice_wall::damage::{
    DamageApplicator, DamageEvent, FULL_INTEGRITY, PUMP_RADIUS, PumpHit, pump_falloff,
};
use ice_wall::gesture::GestureEvent;
use ice_wall::types::Point;
use ice_wall::wall::WallLayout;
use ice_wall::world::{BodyHandle, World};

fn setup(damage: DamageConfig) -> (World, DamageApplicator) {
    let cfg = Config::default();
    let layout = WallLayout::from_config(&cfg.canvas, &cfg.wall);
    (World::new(cfg.wall.gravity), DamageApplicator::new(damage, layout, 1234))
}

fn walled(damage: DamageConfig) -> (World, DamageApplicator) {
    let (mut world, mut dmg) = setup(damage);
    dmg.populate(&mut world);
    (world, dmg)
}

fn any_brick(world: &World, dmg: &DamageApplicator) -> (BodyHandle, Point) {
    let (h, _) = dmg.bricks().next().expect("a brick");
    let (at, _) = world.pose(h).expect("brick in world");
    (h, at)
}

fn count(events: &[DamageEvent], pred: impl Fn(&DamageEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

#[test]
fn populated_wall_has_the_configured_grid() {
    let (world, dmg) = walled(DamageConfig::default());
    let cfg = Config::default();
    assert_eq!(dmg.brick_count(), (cfg.wall.rows * cfg.wall.columns) as usize);
    for (h, brick) in dmg.bricks() {
        assert!(world.contains(h));
        assert!(!world.is_static(h));
        assert_eq!(brick.breakage, FULL_INTEGRITY);
        assert!(brick.crack.is_none());
    }
}

#[test]
fn hundred_lighter_frames_melt_exactly_one_brick() {
    let (mut world, mut dmg) = walled(DamageConfig::default());
    let before = dmg.brick_count();
    let (h, at) = any_brick(&world, &dmg);

    let mut last = FULL_INTEGRITY;
    for _ in 0..99 {
        dmg.apply(&mut world, &GestureEvent::Lighter(at));
        let now = dmg.brick(h).expect("still standing").breakage;
        assert!(now < last);
        last = now;
    }
    assert_eq!(last, 1);

    let events = dmg.apply(&mut world, &GestureEvent::Lighter(at));
    assert_eq!(count(&events, |e| matches!(e, DamageEvent::Destroyed { body, .. } if *body == h)), 1);
    assert!(!world.contains(h));
    assert_eq!(dmg.brick_count(), before - 1);
    assert_eq!(dmg.total_broken(), 1);
    for (_, other) in dmg.bricks() {
        assert_eq!(other.breakage, FULL_INTEGRITY);
        assert_eq!(other.crack_level, 0);
        assert!(other.crack.is_none());
    }

    // Nothing left under the point.
    assert!(dmg.apply(&mut world, &GestureEvent::Lighter(at)).is_empty());
}

#[test]
fn crack_tiers_follow_breakage() {
    let (mut world, mut dmg) = walled(DamageConfig::default());
    let (h, at) = any_brick(&world, &dmg);

    let mut tiers = Vec::new();
    let mut sounds = Vec::new();
    for _ in 0..99 {
        for e in dmg.apply(&mut world, &GestureEvent::Lighter(at)) {
            if let DamageEvent::TierCrossed { tier, sound, .. } = e {
                tiers.push(tier);
                if sound {
                    sounds.push(tier);
                }
            }
        }
        let brick = dmg.brick(h).expect("standing");
        assert_eq!(brick.crack_level, (FULL_INTEGRITY - brick.breakage) / 10);
    }
    assert_eq!(tiers, (1..=9).collect::<Vec<u8>>());
    assert_eq!(sounds, vec![2, 4, 6, 8]);
}

#[test]
fn fifteen_destructions_drop_one_row() {
    let (mut world, mut dmg) = walled(DamageConfig::default());
    let start = dmg.brick_count();
    let columns = dmg.layout().columns as usize;

    let mut events = Vec::new();
    for _ in 0..15 {
        let (_, at) = any_brick(&world, &dmg);
        events.extend(dmg.apply(&mut world, &GestureEvent::Pinch(at)));
    }

    assert_eq!(count(&events, |e| matches!(e, DamageEvent::Destroyed { .. })), 15);
    assert_eq!(count(&events, |e| matches!(e, DamageEvent::RowSpawned { .. })), 1);
    assert!(events.contains(&DamageEvent::RowSpawned { bricks: columns }));
    assert_eq!(dmg.brick_count(), start - 15 + columns);
    assert_eq!(dmg.total_broken(), 15);
}

#[test]
fn rows_stop_once_the_wall_is_won() {
    let (mut world, mut dmg) =
        walled(DamageConfig { blocks_to_spawn: 15, blocks_broken_to_win: 20, ..DamageConfig::default() });

    let mut events = Vec::new();
    for _ in 0..30 {
        let (_, at) = any_brick(&world, &dmg);
        events.extend(dmg.apply(&mut world, &GestureEvent::Pinch(at)));
    }

    assert_eq!(dmg.total_broken(), 30);
    assert!(dmg.has_won());
    assert_eq!(count(&events, |e| matches!(e, DamageEvent::RowSpawned { .. })), 1);
    assert_eq!(count(&events, |e| matches!(e, DamageEvent::Won { total: 20 })), 1);
}

#[test]
fn fist_pump_applies_the_falloff_grid() {
    let (mut world, mut dmg) = setup(DamageConfig { blocks_to_spawn: 1000, ..DamageConfig::default() });
    let layout = *dmg.layout();

    let mut cells = Vec::new();
    for j in -PUMP_RADIUS..=PUMP_RADIUS {
        for i in -PUMP_RADIUS..=PUMP_RADIUS {
            let body = dmg.insert_brick(&mut world, layout.pump_cell(i, j));
            cells.push((i, j, body));
        }
    }

    let events = dmg.apply(&mut world, &GestureEvent::FistPump);

    let mut removed = 0;
    for (i, j, body) in cells {
        match pump_falloff(i, j).expect("inside the grid") {
            PumpHit::Remove => {
                removed += 1;
                assert!(!world.contains(body), "({i},{j}) should be gone");
                assert!(dmg.brick(body).is_none());
            }
            PumpHit::Damage(amount) => {
                let brick = dmg.brick(body).expect("damaged brick survives");
                assert_eq!(brick.breakage, FULL_INTEGRITY - amount, "({i},{j})");
            }
        }
    }
    // Centre row and column (17) plus the four diagonal neighbours.
    assert_eq!(removed, 21);
    assert_eq!(count(&events, |e| matches!(e, DamageEvent::Destroyed { .. })), removed);
    assert_eq!(dmg.total_broken(), removed as u32);
}

#[test]
fn second_pump_finishes_the_inner_ring() {
    let (mut world, mut dmg) = setup(DamageConfig { blocks_to_spawn: 1000, ..DamageConfig::default() });
    let layout = *dmg.layout();
    let ring2 = dmg.insert_brick(&mut world, layout.pump_cell(2, 2));
    let ring4 = dmg.insert_brick(&mut world, layout.pump_cell(4, -4));

    dmg.apply(&mut world, &GestureEvent::FistPump);
    assert_eq!(dmg.brick(ring2).map(|b| b.breakage), Some(25));
    assert_eq!(dmg.brick(ring4).map(|b| b.breakage), Some(75));

    dmg.apply(&mut world, &GestureEvent::FistPump);
    assert!(!world.contains(ring2));
    assert_eq!(dmg.brick(ring4).map(|b| b.breakage), Some(50));
}

#[test]
fn pump_on_a_full_wall_keeps_registry_and_world_in_sync() {
    let (mut world, mut dmg) = walled(DamageConfig::default());
    dmg.apply(&mut world, &GestureEvent::FistPump);
    assert!(dmg.total_broken() > 0);
    for (h, _) in dmg.bricks() {
        assert!(world.contains(h));
    }
}

#[test]
fn pump_clears_the_middle_of_the_default_wall() {
    let (mut world, mut dmg) = walled(DamageConfig { blocks_to_spawn: 1000, ..DamageConfig::default() });
    let layout = *dmg.layout();
    let centre_x = layout.pump_center().x;
    let column: Vec<BodyHandle> = dmg
        .bricks()
        .map(|(h, _)| h)
        .filter(|&h| world.pose(h).is_some_and(|(c, _)| (c.x - centre_x).abs() < layout.brick_w * 0.5))
        .collect();
    assert_eq!(column.len(), layout.rows as usize);

    dmg.apply(&mut world, &GestureEvent::FistPump);

    // The top row is the centre row; the four rows under it are the centre
    // column's rings 1 to 4.
    let reached = (PUMP_RADIUS as usize + 1).min(layout.rows as usize);
    let gone = column.iter().filter(|&&h| !world.contains(h)).count();
    assert_eq!(gone, reached);
    assert!(dmg.total_broken() as usize >= reached + 2 * PUMP_RADIUS as usize);
}

#[test]
fn pump_still_lands_after_the_wall_settles() {
    let (mut world, mut dmg) = walled(DamageConfig { blocks_to_spawn: 1000, ..DamageConfig::default() });
    for _ in 0..120 {
        world.step(1.0 / 60.0);
    }
    let before = dmg.total_broken();
    dmg.apply(&mut world, &GestureEvent::FistPump);
    assert!(dmg.total_broken() > before);
    assert!(world.bodies_at_point(dmg.layout().pump_center()).iter().all(|&h| dmg.brick(h).is_none()));
}

#[test]
fn settled_wall_stays_on_the_canvas() {
    let (mut world, mut dmg) = walled(DamageConfig::default());
    let bricks = dmg.brick_count();
    for _ in 0..120 {
        world.step(1.0 / 60.0);
    }
    assert_eq!(dmg.cull_offscreen(&mut world), 0);
    assert_eq!(dmg.brick_count(), bricks);
}
