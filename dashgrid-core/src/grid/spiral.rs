// Lazy ring-by-ring offset generator for nearest-free-cell search.
//
// Ring 0 is the origin. Ring d (d >= 1) holds the 8d cells at Chebyshev
// distance d, visited clockwise: top edge left->right, right edge
// top->bottom, bottom edge right->left, left edge bottom->top.

/// Iterator of `(d_row, d_col)` offsets, up to and including `max_ring`.
#[derive(Debug, Clone)]
pub struct Spiral {
    max_ring: i32,
    ring: i32,
    step: i32,
}

impl Spiral {
    pub fn new(max_ring: i32) -> Self {
        Self { max_ring, ring: 0, step: 0 }
    }

    fn ring_len(ring: i32) -> i32 {
        if ring == 0 { 1 } else { 8 * ring }
    }

    fn offset(ring: i32, step: i32) -> (i32, i32) {
        let d = ring;
        if d == 0 {
            return (0, 0);
        }
        let top = 2 * d + 1;
        let right = top + 2 * d;
        let bottom = right + 2 * d;
        if step < top {
            (-d, -d + step)
        } else if step < right {
            (-d + 1 + (step - top), d)
        } else if step < bottom {
            (d, d - 1 - (step - right))
        } else {
            (d - 1 - (step - bottom), -d)
        }
    }
}

impl Iterator for Spiral {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.ring > self.max_ring {
            return None;
        }
        let out = Self::offset(self.ring, self.step);
        self.step += 1;
        if self.step >= Self::ring_len(self.ring) {
            self.ring += 1;
            self.step = 0;
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_first_ring_order() {
        let offsets: Vec<_> = Spiral::new(1).collect();
        assert_eq!(
            offsets,
            vec![
                (0, 0),
                (-1, -1), (-1, 0), (-1, 1),
                (0, 1), (1, 1),
                (1, 0), (1, -1),
                (0, -1),
            ]
        );
    }

    #[test]
    fn test_rings_cover_square_once() {
        let offsets: Vec<_> = Spiral::new(3).collect();
        let unique: HashSet<_> = offsets.iter().copied().collect();
        assert_eq!(offsets.len(), 49);
        assert_eq!(unique.len(), 49);
        assert!(offsets.iter().all(|(r, c)| r.abs() <= 3 && c.abs() <= 3));
    }

    #[test]
    fn test_rings_increase_monotonically() {
        let dists: Vec<i32> = Spiral::new(4).map(|(r, c)| r.abs().max(c.abs())).collect();
        assert!(dists.windows(2).all(|w| w[0] <= w[1]));
    }
}
