// What you SEE:
// • Mirrored webcam (or a dark backdrop without one) behind a wall of translucent ice bricks.
// • A green-dotted hand follows the mouse. Hold L for the lighter, P to pinch, F for a fist.
// • Lighter melts the brick under the thumb, pinch (or a click) smashes it, and pumping
//   the fist between the two rings blasts the middle of the wall.
// • O hides the pinky keypoints (occlusion), Space hides the hand, R rebuilds the wall, ESC quits.

mod camera;
mod draw;

use camera::{CameraCapture, GrabFailures};
use draw::Drawer;
use ice_wall::config::Config;
use ice_wall::damage::{DamageApplicator, DamageEvent};
use ice_wall::error::Error;
use ice_wall::fx::Fx;
use ice_wall::gesture::{GestureClassifier, GestureEvent};
use ice_wall::hand::{Hand, Mailbox, spawn_landmark_source};
use ice_wall::mapper::CanvasMapper;
use ice_wall::overlay::Overlay;
use ice_wall::sim::{Pose, SimInput, SimLandmarkSource};
use ice_wall::types::FrameBuffer;
use ice_wall::wall::WallLayout;
use ice_wall::world::World;
use minifb::Key;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const BACKGROUND: u32 = 0x0E1620;
const FLAME_PER_FRAME: usize = 3;
const SHARDS_PER_BRICK: usize = 24;

fn load_config() -> Result<Config, Error> {
    let Some(path) = std::env::args().nth(1) else {
        info!("no config path given, using defaults");
        return Ok(Config::default());
    };
    if Path::new(&path).exists() {
        let cfg = Config::load(&path)?;
        info!(%path, "config loaded");
        Ok(cfg)
    } else {
        let cfg = Config::default();
        cfg.save(&path)?;
        info!(%path, "config not found, wrote defaults");
        Ok(cfg)
    }
}

fn seed() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or(0)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ice_wall=info")),
        )
        .init();

    let cfg = load_config()?;
    let (cw, ch) = (cfg.canvas.width, cfg.canvas.height);

    /* --- Camera (optional) + window --- */
    let mut cam = match CameraCapture::new(cfg.camera.index, cfg.camera.width, cfg.camera.height) {
        Ok(cam) => {
            info!(resolution = ?cam.resolution(), "camera open");
            Some(cam)
        }
        Err(e) => {
            warn!(error = %e, "camera unavailable, drawing over a flat backdrop");
            None
        }
    };
    let source_res = cam.as_ref().map_or((cfg.camera.width, cfg.camera.height), CameraCapture::resolution);
    let mapper = CanvasMapper::new(source_res, (cw, ch));
    let mut drawer = Drawer::new("Ice Wall", cw as usize, ch as usize)?;

    /* --- World + wall --- */
    let seed = seed();
    let layout = WallLayout::from_config(&cfg.canvas, &cfg.wall);
    let mut world = World::new(cfg.wall.gravity);
    let mut damage = DamageApplicator::new(cfg.damage.clone(), layout, seed);
    damage.populate(&mut world);

    let mut classifier = GestureClassifier::new(cfg.gesture.clone());
    let overlay = Overlay::new(&mut StdRng::seed_from_u64(seed ^ 0x1CE));
    let mut fx = Fx::new(800, seed.rotate_left(17));

    /* --- Landmark source on its own thread --- */
    let mailbox = Mailbox::new();
    let (tx, rx) = mpsc::channel();
    let source = spawn_landmark_source(SimLandmarkSource { rx, mapper }, mailbox.clone());

    let mut screen = FrameBuffer::filled(cw as usize, ch as usize, BACKGROUND);
    let mut last_frame = Instant::now();
    let mut last_fps = Instant::now();
    let mut frames: u32 = 0;
    let mut was_clicking = false;
    let mut hidden = false;
    let mut occluded = false;
    let mut grab_failures = GrabFailures::default();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();
        let dt = (now - last_frame).as_secs_f32();
        last_frame = now;

        /* 1) Latest hands, read once per frame. Stale data is reused as-is. */
        let snapshot = mailbox.read();
        let hands: Vec<Hand> = snapshot.hands.iter().map(|h| mapper.map_hand(h)).collect();

        /* 2) Gestures */
        let mut gestures = classifier.update(&hands);
        let clicking = drawer.left_mouse_down();
        if clicking && !was_clicking {
            if let Some(p) = drawer.mouse_pos() {
                gestures.push(GestureEvent::Pinch(p));
            }
        }
        was_clicking = clicking;

        /* 3) Damage */
        for gesture in &gestures {
            if let GestureEvent::Lighter(p) = gesture {
                fx.spawn_flame(*p, FLAME_PER_FRAME);
            }
            for event in damage.apply(&mut world, gesture) {
                match event {
                    DamageEvent::Destroyed { at, .. } => fx.spawn_shards(at, SHARDS_PER_BRICK),
                    DamageEvent::TierCrossed { tier, sound: true, .. } => debug!(tier, "crack sound"),
                    _ => {}
                }
            }
        }

        /* 4) Physics */
        world.step(dt);
        let culled = damage.cull_offscreen(&mut world);
        if culled > 0 {
            debug!(culled, "bricks left the canvas");
        }

        /* 5) Compose: video, ice, hand, particles */
        match cam.as_mut().map(|cam| cam.next_frame(cw, ch)) {
            Some(Ok(frame)) => {
                if let Some(dropped) = grab_failures.recover() {
                    info!(dropped, "camera frames back");
                }
                screen = frame;
            }
            Some(Err(e)) => {
                if grab_failures.fail() {
                    warn!(error = %e, streak = grab_failures.streak(), "camera frame dropped, drawing the backdrop");
                }
                screen.fill(BACKGROUND);
            }
            None => screen.fill(BACKGROUND),
        }
        overlay.render(&mut screen, &world, &damage, &hands, classifier.state(), &gestures);
        fx.update_and_render(&mut screen, dt);
        drawer.present(&screen)?;

        /* 6) Simulator input for the next frame */
        if drawer.key_pressed_once(Key::Space) {
            hidden = !hidden;
        }
        if drawer.key_pressed_once(Key::O) {
            occluded = !occluded;
        }
        if drawer.key_pressed_once(Key::R) {
            damage.reset(&mut world);
            classifier.reset();
            fx.clear();
            info!("wall reset");
        }
        let pose = if hidden {
            None
        } else if drawer.key_down(Key::L) {
            Some(Pose::Lighter)
        } else if drawer.key_down(Key::P) {
            Some(Pose::Pinch)
        } else if drawer.key_down(Key::F) {
            Some(Pose::Fist)
        } else {
            Some(Pose::Open)
        };
        let at = drawer.mouse_pos().unwrap_or_else(|| layout.center());
        if tx.send(SimInput { pose, at, occluded }).is_err() {
            warn!("landmark source stopped");
        }

        /* 7) FPS + title, once per second */
        frames += 1;
        let elapsed = now.duration_since(last_fps);
        if elapsed >= Duration::from_secs(1) {
            let fps = frames as f32 / elapsed.as_secs_f32();
            info!(bricks = damage.brick_count(), broken = damage.total_broken(), "{fps:.1} fps");
            let status = if damage.has_won() { " | YOU WIN" } else { "" };
            drawer.set_title(&format!(
                "Ice Wall | broken {}/{}{} | {:.0} fps",
                damage.total_broken(),
                cfg.damage.blocks_broken_to_win,
                status,
                fps
            ));
            frames = 0;
            last_fps = now;
        }
    }

    drop(tx);
    if source.join().is_err() {
        warn!("landmark source panicked");
    }
    Ok(())
}
