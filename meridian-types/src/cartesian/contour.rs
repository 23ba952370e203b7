use crate::cartesian::Point2;

/// Orientation of a closed ring.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Winding {
    /// Negative signed area.
    Clockwise,
    /// Positive signed area.
    CounterClockwise,
}

impl Winding {
    /// Winding of the ring given by `points`. Degenerate rings are reported as clockwise.
    pub fn of(points: &[Point2]) -> Self {
        if area_signed(points) <= 0.0 {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        }
    }
}

/// Signed area of the ring given by `points` (shoelace formula). The ring is closed implicitly, so the last
/// point may or may not repeat the first one.
pub fn area_signed(points: &[Point2]) -> f64 {
    let mut iter = points.iter().chain(points.first());
    let Some(mut prev) = iter.next() else {
        return 0.0;
    };

    let mut aggr = 0.0;
    for p in iter {
        aggr += prev.x() * p.y() - p.x() * prev.y();
        prev = p;
    }

    aggr / 2.0
}

/// Absolute area of the ring. Rings with less than 3 points have zero area.
pub fn area(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    area_signed(points).abs()
}

/// Length of the open path through `points`.
pub fn length(points: &[Point2]) -> f64 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square(side: f64) -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(side, 0.0),
            Point2::new(side, side),
            Point2::new(0.0, side),
        ]
    }

    #[test]
    fn square_area_independent_of_start_and_winding() {
        let ring = square(10.0);
        assert_abs_diff_eq!(area(&ring), 100.0);

        let mut reversed = ring.clone();
        reversed.reverse();
        assert_abs_diff_eq!(area(&reversed), 100.0);

        for shift in 1..ring.len() {
            let mut rotated = ring.clone();
            rotated.rotate_left(shift);
            assert_abs_diff_eq!(area(&rotated), 100.0);
        }
    }

    #[test]
    fn explicitly_closed_ring() {
        let mut ring = square(10.0);
        ring.push(ring[0]);
        assert_abs_diff_eq!(area(&ring), 100.0);
    }

    #[test]
    fn winding() {
        let ring = square(1.0);
        assert_eq!(Winding::of(&ring), Winding::CounterClockwise);

        let reversed: Vec<_> = ring.into_iter().rev().collect();
        assert_eq!(Winding::of(&reversed), Winding::Clockwise);
    }

    #[test]
    fn degenerate_rings() {
        assert_eq!(area(&[]), 0.0);
        assert_eq!(area(&[Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)]), 0.0);
    }

    #[test]
    fn path_length() {
        let path = [
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 4.0),
            Point2::new(3.0, 10.0),
        ];
        assert_abs_diff_eq!(length(&path), 11.0);
        assert_eq!(length(&path[..1]), 0.0);
    }
}
