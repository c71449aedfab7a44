// Camera pixels -> canvas pixels, mirrored so the wall lines up with the
// mirrored video preview.

use crate::hand::Hand;
use crate::types::Point;

/// Rescale `p` from a `source_w` x `source_h` camera frame to a
/// `target_w` x `target_h` canvas, then mirror it about the canvas midline.
///
/// Never fails: junk input just lands off-canvas.
#[inline]
pub fn map(p: Point, source_w: f32, source_h: f32, target_w: f32, target_h: f32) -> Point {
    let x = p.x * target_w / source_w;
    let y = p.y * target_h / source_h;
    Point::new(target_w - x, y)
}

/// The camera and canvas sizes, fixed for a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasMapper {
    pub source_w: f32,
    pub source_h: f32,
    pub target_w: f32,
    pub target_h: f32,
}

impl CanvasMapper {
    pub fn new(source: (u32, u32), target: (u32, u32)) -> Self {
        Self {
            source_w: source.0 as f32,
            source_h: source.1 as f32,
            target_w: target.0 as f32,
            target_h: target.1 as f32,
        }
    }

    #[inline]
    pub fn map(&self, p: Point) -> Point {
        map(p, self.source_w, self.source_h, self.target_w, self.target_h)
    }

    /// Inverse of [`CanvasMapper::map`]; used by the simulator to place a hand
    /// under the mouse.
    #[inline]
    pub fn unmap(&self, p: Point) -> Point {
        let x = (self.target_w - p.x) * self.source_w / self.target_w;
        let y = p.y * self.source_h / self.target_h;
        Point::new(x, y)
    }

    pub fn map_hand(&self, hand: &Hand) -> Hand {
        hand.map_points(|p| self.map(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_and_mirrors() {
        let p = map(Point::new(160.0, 120.0), 640.0, 480.0, 1280.0, 720.0);
        assert_eq!(p, Point::new(1280.0 - 320.0, 180.0));
    }

    #[test]
    fn left_edge_lands_on_right_edge() {
        let m = CanvasMapper::new((640, 480), (1280, 720));
        assert_eq!(m.map(Point::new(0.0, 0.0)), Point::new(1280.0, 0.0));
        assert_eq!(m.map(Point::new(640.0, 480.0)), Point::new(0.0, 720.0));
    }

    #[test]
    fn unmap_inverts_map() {
        let m = CanvasMapper::new((640, 480), (1280, 720));
        let p = Point::new(123.0, 45.0);
        let back = m.unmap(m.map(p));
        assert!((back.x - p.x).abs() < 1e-3 && (back.y - p.y).abs() < 1e-3);
    }

    #[test]
    fn missing_keypoints_stay_missing() {
        let m = CanvasMapper::new((640, 480), (640, 480));
        let hand = Hand::from_slice(&[Point::new(10.0, 10.0)]);
        let mapped = m.map_hand(&hand);
        assert_eq!(mapped.get(0), Some(Point::new(630.0, 10.0)));
        assert_eq!(mapped.get(1), None);
    }
}
