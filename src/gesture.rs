//! Gesture recognition over canvas-space hand keypoints.
//!
//! Three detectors run every frame against the first detected hand:
//!
//! | Gesture  | Pose                                        | Emission           |
//! |----------|---------------------------------------------|--------------------|
//! | Lighter  | four fingers curled, thumb sticking out     | every frame held   |
//! | Pinch    | middle/ring/pinky curled, thumb on index tip| once per pinch     |
//! | FistPump | fist held, then punched onto its anchor     | once per punch     |
//!
//! Every predicate needs all of its keypoints. If one is missing the answer is
//! [`Detection::Indeterminate`] and nothing fires.

use crate::config::GestureConfig;
use crate::hand::{
    FINGERS, Hand, INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_MCP, PINKY_TIP, RING_MCP,
    RING_TIP, THUMB_TIP,
};
use crate::types::Point;
use tracing::{debug, info};

// ----------------------------- detection -----------------------------------------------

/// Three-valued predicate result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Detection {
    Yes,
    No,
    /// A required keypoint was missing, or there was no hand at all.
    Indeterminate,
}

impl Detection {
    #[inline]
    pub fn from_bool(b: bool) -> Self {
        if b { Detection::Yes } else { Detection::No }
    }

    #[inline]
    pub fn is_yes(self) -> bool {
        self == Detection::Yes
    }

    /// Missing data wins over a definite answer.
    pub fn and(self, other: Detection) -> Detection {
        match (self, other) {
            (Detection::Indeterminate, _) | (_, Detection::Indeterminate) => {
                Detection::Indeterminate
            }
            (Detection::Yes, Detection::Yes) => Detection::Yes,
            _ => Detection::No,
        }
    }

    pub fn not(self) -> Detection {
        match self {
            Detection::Yes => Detection::No,
            Detection::No => Detection::Yes,
            Detection::Indeterminate => Detection::Indeterminate,
        }
    }
}

// ----------------------------- predicates ----------------------------------------------

const THREE_FINGERS: [(usize, usize); 3] =
    [(MIDDLE_TIP, MIDDLE_MCP), (RING_TIP, RING_MCP), (PINKY_TIP, PINKY_MCP)];

/// Yes when every listed finger's tip is within `threshold` of its MCP.
pub fn fingers_down(hand: &Hand, fingers: &[(usize, usize)], threshold: f32) -> Detection {
    let mut distances = Vec::with_capacity(fingers.len());
    for &(tip, mcp) in fingers {
        match hand.distance(tip, mcp) {
            Some(d) => distances.push(d),
            None => return Detection::Indeterminate,
        }
    }
    Detection::from_bool(distances.iter().all(|&d| d <= threshold))
}

/// Index, middle, ring and pinky all curled.
pub fn four_fingers_down(hand: &Hand, threshold: f32) -> Detection {
    fingers_down(hand, &FINGERS, threshold)
}

/// Middle, ring and pinky curled; the index is free.
pub fn three_fingers_down(hand: &Hand, threshold: f32) -> Detection {
    fingers_down(hand, &THREE_FINGERS, threshold)
}

/// Thumb tip tucked against the base of the index finger.
pub fn thumb_closed(hand: &Hand, threshold: f32) -> Detection {
    match hand.distance(THUMB_TIP, INDEX_MCP) {
        Some(d) => Detection::from_bool(d <= threshold),
        None => Detection::Indeterminate,
    }
}

pub fn is_fist(hand: &Hand, cfg: &GestureConfig) -> Detection {
    four_fingers_down(hand, cfg.fist_curl).and(thumb_closed(hand, cfg.fist_thumb))
}

/// Fingers curled with the thumb out. Cannot hold together with [`is_fist`]
/// because the fist's thumb threshold is tighter than this one.
pub fn is_lighter(hand: &Hand, cfg: &GestureConfig) -> Detection {
    four_fingers_down(hand, cfg.lighter_curl).and(thumb_closed(hand, cfg.lighter_curl).not())
}

// ----------------------------- GestureEvent --------------------------------------------

/// A gesture emitted for this frame. Points are canvas space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    /// Held flame at the thumb tip; erodes whatever it is over.
    Lighter(Point),
    /// One-shot removal at the thumb tip.
    Pinch(Point),
    /// Area blast at the centre of the wall.
    FistPump,
}

// ----------------------------- fist pump -----------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PumpPhase {
    /// No anchors; counting fist frames.
    Idle,
    /// Anchored; the first time the fist is on the lower anchor it fires.
    WaitingForInitialHit { lower: Point, upper: Point },
    /// Reaching `target` flips it. Only reaching `Lower` fires.
    Armed { lower: Point, upper: Point, target: Anchor },
}

impl PumpPhase {
    pub fn anchors(&self) -> Option<(Point, Point)> {
        match *self {
            PumpPhase::Idle => None,
            PumpPhase::WaitingForInitialHit { lower, upper }
            | PumpPhase::Armed { lower, upper, .. } => Some((lower, upper)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FistState {
    pub detected_frames: u32,
    pub lost_frames: u32,
    pub phase: PumpPhase,
}

impl Default for FistState {
    fn default() -> Self {
        Self { detected_frames: 0, lost_frames: 0, phase: PumpPhase::Idle }
    }
}

impl FistState {
    /// Advance one frame. `palm` is `Some` only when a fist was definitely seen.
    /// Returns true when a pump lands.
    fn step(&mut self, palm: Option<Point>, cfg: &GestureConfig) -> bool {
        let Some(palm) = palm else {
            self.lost_frames = self.lost_frames.saturating_add(1);
            if self.lost_frames > cfg.fist_loss_frames {
                if self.phase != PumpPhase::Idle || self.detected_frames > 0 {
                    debug!(lost = self.lost_frames, "fist lost, anchors cleared");
                }
                *self = FistState::default();
            }
            return false;
        };

        self.lost_frames = 0;
        self.detected_frames = self.detected_frames.saturating_add(1);
        let within = |anchor: Point| palm.distance(anchor) <= cfg.pump_reach;

        match self.phase {
            PumpPhase::Idle => {
                if self.detected_frames >= cfg.fist_detection_frames {
                    let lower = palm;
                    let upper = palm.offset(0.0, -cfg.pump_offset);
                    info!(x = lower.x, y = lower.y, "fist anchored");
                    self.phase = PumpPhase::WaitingForInitialHit { lower, upper };
                }
                false
            }
            PumpPhase::WaitingForInitialHit { lower, upper } => {
                if within(lower) {
                    self.phase = PumpPhase::Armed { lower, upper, target: Anchor::Upper };
                    true
                } else {
                    false
                }
            }
            PumpPhase::Armed { lower, upper, target: Anchor::Upper } => {
                if within(upper) {
                    self.phase = PumpPhase::Armed { lower, upper, target: Anchor::Lower };
                }
                false
            }
            PumpPhase::Armed { lower, upper, target: Anchor::Lower } => {
                if within(lower) {
                    self.phase = PumpPhase::Armed { lower, upper, target: Anchor::Upper };
                    true
                } else {
                    false
                }
            }
        }
    }
}

// ----------------------------- classifier ----------------------------------------------

/// Everything the classifier remembers between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassifierState {
    /// Pinch may fire; cleared by a pinch, set again once the fingers part.
    pub pinch_armed: bool,
    pub fist: FistState,
}

impl Default for ClassifierState {
    fn default() -> Self {
        Self { pinch_armed: true, fist: FistState::default() }
    }
}

pub struct GestureClassifier {
    cfg: GestureConfig,
    state: ClassifierState,
}

impl GestureClassifier {
    pub fn new(cfg: GestureConfig) -> Self {
        Self { cfg, state: ClassifierState::default() }
    }

    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    pub fn config(&self) -> &GestureConfig {
        &self.cfg
    }

    pub fn reset(&mut self) {
        self.state = ClassifierState::default();
    }

    /// Classify one frame. `hands` must already be in canvas space.
    pub fn update(&mut self, hands: &[Hand]) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        let hand = hands.first();

        if let Some(hand) = hand {
            if is_lighter(hand, &self.cfg).is_yes() {
                if let Some(tip) = hand.get(THUMB_TIP) {
                    events.push(GestureEvent::Lighter(tip));
                }
            }
            if let Some(p) = self.step_pinch(hand) {
                events.push(GestureEvent::Pinch(p));
            }
        }

        let palm = hand
            .filter(|h| is_fist(h, &self.cfg).is_yes())
            .and_then(Hand::palm_center);
        if self.state.fist.step(palm, &self.cfg) {
            info!("fist pump");
            events.push(GestureEvent::FistPump);
        }

        events
    }

    fn step_pinch(&mut self, hand: &Hand) -> Option<Point> {
        let distance = hand.distance(THUMB_TIP, INDEX_TIP)?;
        if distance > self.cfg.pinch {
            self.state.pinch_armed = true;
            return None;
        }
        if !self.state.pinch_armed || !three_fingers_down(hand, self.cfg.lighter_curl).is_yes() {
            return None;
        }
        self.state.pinch_armed = false;
        let tip = hand.get(THUMB_TIP)?;
        debug!(x = tip.x, y = tip.y, "pinch");
        Some(tip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{LANDMARK_COUNT, WRIST};

    fn open_hand() -> Hand {
        let mut pts = [Point::default(); LANDMARK_COUNT];
        pts[WRIST] = Point::new(0.0, 0.0);
        for (i, &(tip, mcp)) in FINGERS.iter().enumerate() {
            let x = -30.0 + 25.0 * i as f32;
            pts[mcp] = Point::new(x, -90.0);
            pts[tip] = Point::new(x, -180.0);
        }
        pts[THUMB_TIP] = Point::new(-90.0, -100.0);
        Hand::from_points(pts)
    }

    fn curl(hand: &mut Hand, tip: usize, mcp: usize, by: f32) {
        let base = hand.get(mcp).unwrap();
        hand.keypoints[tip] = Some(base.offset(0.0, by));
    }

    #[test]
    fn and_prefers_indeterminate() {
        use Detection::*;
        assert_eq!(Yes.and(Yes), Yes);
        assert_eq!(Yes.and(No), No);
        assert_eq!(No.and(Indeterminate), Indeterminate);
        assert_eq!(Indeterminate.not(), Indeterminate);
    }

    #[test]
    fn four_fingers_down_needs_every_finger() {
        let mut hand = open_hand();
        for &(tip, mcp) in &FINGERS {
            curl(&mut hand, tip, mcp, 30.0);
        }
        assert_eq!(four_fingers_down(&hand, 30.0), Detection::Yes);
        assert_eq!(four_fingers_down(&hand, 29.0), Detection::No);

        curl(&mut hand, RING_TIP, RING_MCP, 31.0);
        assert_eq!(four_fingers_down(&hand, 30.0), Detection::No);
    }

    #[test]
    fn missing_keypoint_is_indeterminate() {
        let mut hand = open_hand();
        hand.keypoints[PINKY_MCP] = None;
        assert_eq!(four_fingers_down(&hand, 1000.0), Detection::Indeterminate);
        assert_eq!(three_fingers_down(&hand, 1000.0), Detection::Indeterminate);
        // The thumb test does not look at the pinky.
        assert_eq!(thumb_closed(&hand, 1000.0), Detection::Yes);
    }

    #[test]
    fn indeterminate_hand_emits_nothing() {
        let mut hand = open_hand();
        for &(tip, mcp) in &FINGERS {
            curl(&mut hand, tip, mcp, 10.0);
        }
        hand.keypoints[INDEX_MCP] = None;
        let mut c = GestureClassifier::new(GestureConfig::default());
        for _ in 0..30 {
            assert!(c.update(&[hand.clone()]).is_empty());
        }
        assert_eq!(c.state().fist.phase, PumpPhase::Idle);
    }

    #[test]
    fn empty_frame_counts_as_fist_lost() {
        let cfg = GestureConfig::default();
        let mut c = GestureClassifier::new(cfg.clone());
        c.update(&[]);
        assert_eq!(c.state().fist.lost_frames, 1);
    }
}
