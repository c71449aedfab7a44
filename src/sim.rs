//! Keyboard/mouse stand-in for a pose-estimation model.
//!
//! The window sends [`SimInput`]s (which pose, where the mouse is) over a
//! channel; [`SimLandmarkSource`] turns each into a synthetic 21-point hand in
//! camera space and publishes it to the mailbox, exactly as a real model
//! callback would. The classifier cannot tell the difference.
//!
//! | Key      | Pose                                  |
//! |----------|---------------------------------------|
//! | (none)   | open hand                             |
//! | `L`      | lighter: fingers curled, thumb up     |
//! | `P`      | pinch: thumb on index tip             |
//! | `F`      | fist                                  |
//! | `O`      | drop the pinky keypoints (occlusion)  |
//! | `Space`  | no hand in frame                      |

use crate::hand::{
    Hand, INDEX_DIP, INDEX_MCP, INDEX_PIP, INDEX_TIP, LANDMARK_COUNT, LandmarkSource, Mailbox,
    MIDDLE_DIP, MIDDLE_MCP, MIDDLE_PIP, MIDDLE_TIP, PINKY_DIP, PINKY_MCP, PINKY_PIP, PINKY_TIP,
    RING_DIP, RING_MCP, RING_PIP, RING_TIP, THUMB_CMC, THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST,
};
use crate::mapper::CanvasMapper;
use crate::types::Point;
use std::sync::mpsc::Receiver;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pose {
    Open,
    Lighter,
    Pinch,
    Fist,
}

/// One frame of simulated input, in canvas space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimInput {
    /// `None` when no hand is in view.
    pub pose: Option<Pose>,
    /// Where the gesture's working point should land.
    pub at: Point,
    pub occluded: bool,
}

// Offsets from the wrist in canvas pixels, y down.
const MCP: [(usize, (f32, f32)); 4] = [
    (INDEX_MCP, (-30.0, -90.0)),
    (MIDDLE_MCP, (0.0, -95.0)),
    (RING_MCP, (25.0, -90.0)),
    (PINKY_MCP, (48.0, -80.0)),
];

/// (pip, dip, tip) for each long finger, same order as [`MCP`].
const JOINTS: [[usize; 3]; 4] = [
    [INDEX_PIP, INDEX_DIP, INDEX_TIP],
    [MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP],
    [RING_PIP, RING_DIP, RING_TIP],
    [PINKY_PIP, PINKY_DIP, PINKY_TIP],
];

fn extend(pts: &mut [Point; LANDMARK_COUNT], finger: usize, dir: (f32, f32)) {
    let (mcp, base) = MCP[finger];
    let base = Point::from(base);
    pts[mcp] = base;
    for (k, &joint) in JOINTS[finger].iter().enumerate() {
        let s = (k + 1) as f32 / 3.0;
        pts[joint] = base.offset(dir.0 * s, dir.1 * s);
    }
}

fn curl(pts: &mut [Point; LANDMARK_COUNT], finger: usize) {
    let (mcp, base) = MCP[finger];
    let base = Point::from(base);
    pts[mcp] = base;
    let [pip, dip, tip] = JOINTS[finger];
    pts[pip] = base.offset(0.0, -22.0);
    pts[dip] = base.offset(-6.0, 5.0);
    // Index curls slightly across the palm so a fist's thumb stays clear of it.
    pts[tip] = if finger == 0 { base.offset(-15.0, 40.0) } else { base.offset(0.0, 42.0) };
}

fn thumb(pts: &mut [Point; LANDMARK_COUNT], cmc: (f32, f32), mcp: (f32, f32), ip: (f32, f32), tip: (f32, f32)) {
    pts[THUMB_CMC] = cmc.into();
    pts[THUMB_MCP] = mcp.into();
    pts[THUMB_IP] = ip.into();
    pts[THUMB_TIP] = tip.into();
}

/// A hand in canvas space holding `pose`, moved so its working point is at
/// `at`: the thumb tip for lighter and pinch, the palm centre otherwise.
pub fn pose_hand(pose: Pose, at: Point) -> Hand {
    let mut pts = [Point::default(); LANDMARK_COUNT];
    pts[WRIST] = Point::new(0.0, 0.0);

    match pose {
        Pose::Open => {
            extend(&mut pts, 0, (-7.0, -85.0));
            extend(&mut pts, 1, (0.0, -93.0));
            extend(&mut pts, 2, (5.0, -85.0));
            extend(&mut pts, 3, (10.0, -80.0));
            thumb(&mut pts, (-25.0, -20.0), (-45.0, -40.0), (-62.0, -58.0), (-80.0, -75.0));
        }
        Pose::Lighter => {
            (0..4).for_each(|f| curl(&mut pts, f));
            thumb(&mut pts, (-25.0, -20.0), (-45.0, -50.0), (-55.0, -100.0), (-60.0, -170.0));
        }
        Pose::Pinch => {
            (1..4).for_each(|f| curl(&mut pts, f));
            extend(&mut pts, 0, (-30.0, -60.0));
            thumb(&mut pts, (-25.0, -20.0), (-45.0, -60.0), (-55.0, -105.0), (-62.0, -145.0));
        }
        Pose::Fist => {
            (0..4).for_each(|f| curl(&mut pts, f));
            thumb(&mut pts, (-25.0, -20.0), (-35.0, -45.0), (-15.0, -65.0), (5.0, -75.0));
        }
    }

    let hand = Hand::from_points(pts);
    let focus = match pose {
        Pose::Lighter | Pose::Pinch => hand.get(THUMB_TIP),
        Pose::Open | Pose::Fist => hand.palm_center(),
    }
    .unwrap_or_default();
    hand.map_points(|p| p.offset(at.x - focus.x, at.y - focus.y))
}

impl SimInput {
    /// The hands a model would report for this input, in camera space.
    pub fn hands(&self, mapper: &CanvasMapper) -> Vec<Hand> {
        let Some(pose) = self.pose else { return Vec::new() };
        let mut hand = pose_hand(pose, self.at).map_points(|p| mapper.unmap(p));
        if self.occluded {
            for k in [PINKY_MCP, PINKY_PIP, PINKY_DIP, PINKY_TIP] {
                hand.keypoints[k] = None;
            }
        }
        vec![hand]
    }
}

/// Landmark source driven by [`SimInput`] events from the window.
pub struct SimLandmarkSource {
    pub rx: Receiver<SimInput>,
    pub mapper: CanvasMapper,
}

impl LandmarkSource for SimLandmarkSource {
    fn run(self: Box<Self>, mailbox: Mailbox) {
        let mut last: Option<SimInput> = None;
        for input in self.rx.iter() {
            // Only a change of pose or position is a new detection.
            if last == Some(input) {
                continue;
            }
            mailbox.publish(input.hands(&self.mapper));
            last = Some(input);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GestureConfig;
    use crate::gesture::{Detection, is_fist, is_lighter, three_fingers_down};
    use crate::hand::spawn_landmark_source;
    use std::sync::mpsc;

    #[test]
    fn poses_classify_as_intended() {
        let cfg = GestureConfig::default();
        let at = Point::new(400.0, 300.0);

        let open = pose_hand(Pose::Open, at);
        assert_eq!(is_lighter(&open, &cfg), Detection::No);
        assert_eq!(is_fist(&open, &cfg), Detection::No);

        let lighter = pose_hand(Pose::Lighter, at);
        assert_eq!(is_lighter(&lighter, &cfg), Detection::Yes);
        assert_eq!(is_fist(&lighter, &cfg), Detection::No);
        assert_eq!(lighter.get(THUMB_TIP), Some(at));

        let fist = pose_hand(Pose::Fist, at);
        assert_eq!(is_fist(&fist, &cfg), Detection::Yes);
        assert_eq!(is_lighter(&fist, &cfg), Detection::No);
        assert!(fist.distance(THUMB_TIP, INDEX_TIP).unwrap() > cfg.pinch);

        let pinch = pose_hand(Pose::Pinch, at);
        assert_eq!(three_fingers_down(&pinch, cfg.lighter_curl), Detection::Yes);
        assert!(pinch.distance(THUMB_TIP, INDEX_TIP).unwrap() <= cfg.pinch);
        assert_eq!(is_fist(&pinch, &cfg), Detection::No);
        assert_eq!(is_lighter(&pinch, &cfg), Detection::No);
    }

    #[test]
    fn occlusion_drops_the_pinky() {
        let mapper = CanvasMapper::new((640, 480), (1280, 720));
        let input = SimInput { pose: Some(Pose::Fist), at: Point::new(600.0, 400.0), occluded: true };
        let hands = input.hands(&mapper);
        assert_eq!(hands.len(), 1);
        assert!(hands[0].get(PINKY_TIP).is_none());
        assert!(hands[0].get(THUMB_TIP).is_some());
    }

    #[test]
    fn source_publishes_camera_space_hands() {
        let mapper = CanvasMapper::new((640, 480), (1280, 720));
        let mailbox = Mailbox::new();
        let (tx, rx) = mpsc::channel();
        let worker = spawn_landmark_source(SimLandmarkSource { rx, mapper }, mailbox.clone());

        let at = Point::new(640.0, 360.0);
        tx.send(SimInput { pose: Some(Pose::Lighter), at, occluded: false }).unwrap();
        drop(tx);
        worker.join().unwrap();

        let snap = mailbox.read();
        assert!(snap.fresh);
        let tip = mapper.map(snap.hands[0].get(THUMB_TIP).unwrap());
        assert!((tip.x - at.x).abs() < 1e-3 && (tip.y - at.y).abs() < 1e-3);
    }
}
