//! Hand keypoints as delivered by the landmark source, and the single-slot
//! mailbox the frame loop reads them from.

use crate::types::Point;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

// ----------------------------- hand landmark indices -----------------------------------

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// (tip, mcp) pairs for the four long fingers.
pub const FINGERS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_MCP),
    (RING_TIP, RING_MCP),
    (PINKY_TIP, PINKY_MCP),
];

// ----------------------------- hand ----------------------------------------------------

/// One detected hand. A keypoint the model could not place is `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hand {
    pub keypoints: [Option<Point>; LANDMARK_COUNT],
}

impl Hand {
    /// A hand with every keypoint present.
    pub fn from_points(points: [Point; LANDMARK_COUNT]) -> Self {
        Self { keypoints: points.map(Some) }
    }

    /// Builds a hand from a model's flat output; short input leaves the tail missing.
    pub fn from_slice(points: &[Point]) -> Self {
        let mut hand = Hand::default();
        for (slot, p) in hand.keypoints.iter_mut().zip(points) {
            *slot = Some(*p);
        }
        hand
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Point> {
        self.keypoints.get(index).copied().flatten()
    }

    /// Both keypoints, or `None` if either is missing.
    #[inline]
    pub fn pair(&self, a: usize, b: usize) -> Option<(Point, Point)> {
        Some((self.get(a)?, self.get(b)?))
    }

    pub fn distance(&self, a: usize, b: usize) -> Option<f32> {
        self.pair(a, b).map(|(p, q)| p.distance(q))
    }

    /// Applies `f` to every present keypoint.
    pub fn map_points(&self, mut f: impl FnMut(Point) -> Point) -> Hand {
        Hand { keypoints: self.keypoints.map(|k| k.map(&mut f)) }
    }

    /// Midpoint of wrist and middle knuckle; where a fist is anchored.
    pub fn palm_center(&self) -> Option<Point> {
        let (wrist, knuckle) = self.pair(WRIST, MIDDLE_MCP)?;
        Some(wrist.midpoint(knuckle))
    }
}

// ----------------------------- mailbox -------------------------------------------------

/// What the frame loop sees when it reads the mailbox.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub hands: Arc<Vec<Hand>>,
    /// True when the landmark source published since the previous read.
    pub fresh: bool,
}

#[derive(Default)]
struct Slot {
    hands: Arc<Vec<Hand>>,
    fresh: bool,
}

/// Single-slot, last-write-wins hand mailbox.
///
/// The landmark source may publish from any thread at any rate; the frame loop
/// calls [`Mailbox::read`] once at the top of each frame. A slow source simply
/// leaves the previous snapshot in place.
#[derive(Clone, Default)]
pub struct Mailbox {
    slot: Arc<Mutex<Slot>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, hands: Vec<Hand>) {
        let mut slot = match self.slot.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.hands = Arc::new(hands);
        slot.fresh = true;
    }

    pub fn read(&self) -> Snapshot {
        let mut slot = match self.slot.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let snapshot = Snapshot { hands: Arc::clone(&slot.hands), fresh: slot.fresh };
        slot.fresh = false;
        snapshot
    }
}

// ----------------------------- landmark source -----------------------------------------

/// Anything that can push hand snapshots into a [`Mailbox`]: a pose model, a
/// recording, the keyboard simulator.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, mailbox: Mailbox);
}

/// Run a landmark source on its own thread, publishing into `mailbox`.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S, mailbox: Mailbox) -> JoinHandle<()> {
    thread::spawn(move || Box::new(source).run(mailbox))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keypoint_makes_distance_indeterminate() {
        let mut hand = Hand::from_points([Point::new(1.0, 1.0); LANDMARK_COUNT]);
        assert_eq!(hand.distance(THUMB_TIP, INDEX_TIP), Some(0.0));
        hand.keypoints[INDEX_TIP] = None;
        assert_eq!(hand.distance(THUMB_TIP, INDEX_TIP), None);
    }

    #[test]
    fn short_slice_leaves_tail_missing() {
        let hand = Hand::from_slice(&[Point::new(0.0, 0.0); 5]);
        assert!(hand.get(THUMB_TIP).is_some());
        assert!(hand.get(INDEX_MCP).is_none());
    }

    #[test]
    fn mailbox_is_last_write_wins() {
        let mb = Mailbox::new();
        assert!(mb.read().hands.is_empty());

        mb.publish(vec![Hand::default()]);
        mb.publish(vec![Hand::default(), Hand::default()]);
        let first = mb.read();
        assert!(first.fresh);
        assert_eq!(first.hands.len(), 2);

        // Nothing new: same snapshot, marked stale.
        let second = mb.read();
        assert!(!second.fresh);
        assert_eq!(second.hands.len(), 2);
    }

    #[test]
    fn mailbox_accepts_other_threads() {
        let mb = Mailbox::new();
        let producer = mb.clone();
        std::thread::spawn(move || producer.publish(vec![Hand::default()]))
            .join()
            .unwrap();
        assert_eq!(mb.read().hands.len(), 1);
    }
}
