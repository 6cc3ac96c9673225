//! Axial hex coordinate math
//!
//! Flat-topped hexes addressed by `(q, r)` with implicit `s = -q - r`.
//! Pixel space has its origin at the center of cell `(0, 0)`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Integer lattice coordinate of a hex cell
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

/// Neighbor offsets, indexed 0..5 in angular order.
/// Direction `i` is the cell across edge `i`.
pub const NEIGHBOR_DIRS: [Axial; 6] = [
    Axial { q: 1, r: 0 },
    Axial { q: 0, r: 1 },
    Axial { q: -1, r: 1 },
    Axial { q: -1, r: 0 },
    Axial { q: 0, r: -1 },
    Axial { q: 1, r: -1 },
];

/// Corner angles (radians). Edge `i` joins corner `i` to corner `(i + 1) % 6`.
const CORNER_ANGLES: [f32; 6] = [
    0.0,
    std::f32::consts::FRAC_PI_3,
    2.0 * std::f32::consts::FRAC_PI_3,
    std::f32::consts::PI,
    -2.0 * std::f32::consts::FRAC_PI_3,
    -std::f32::consts::FRAC_PI_3,
];

impl Axial {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube coordinate
    #[inline]
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Cell across edge `direction` (taken mod 6)
    #[inline]
    pub fn neighbor(&self, direction: usize) -> Axial {
        let d = NEIGHBOR_DIRS[direction % 6];
        Axial::new(self.q + d.q, self.r + d.r)
    }

    /// All six neighbors in direction order
    pub fn neighbors(&self) -> [Axial; 6] {
        std::array::from_fn(|i| self.neighbor(i))
    }
}

impl From<(i32, i32)> for Axial {
    fn from((q, r): (i32, i32)) -> Self {
        Self::new(q, r)
    }
}

/// Pixel center of a cell: `x = 1.5 R q`, `y = √3 R (r + q/2)`
#[inline]
pub fn center(coord: Axial, hex_radius: f32) -> Vec2 {
    let q = coord.q as f32;
    let r = coord.r as f32;
    Vec2::new(
        1.5 * hex_radius * q,
        3.0_f32.sqrt() * hex_radius * (r + q / 2.0),
    )
}

/// Corner `i` of the hexagon centered at `center`
#[inline]
pub fn hex_corner(center: Vec2, hex_radius: f32, i: usize) -> Vec2 {
    let angle = CORNER_ANGLES[i % 6];
    center + Vec2::new(angle.cos(), angle.sin()) * hex_radius
}

/// Endpoints of edge `i` of a cell
pub fn edge_endpoints(coord: Axial, hex_radius: f32, i: usize) -> (Vec2, Vec2) {
    let c = center(coord, hex_radius);
    (hex_corner(c, hex_radius, i), hex_corner(c, hex_radius, i + 1))
}

/// Snap fractional axial coordinates to the nearest lattice point.
///
/// Each cube component is rounded independently; the one with the largest
/// rounding error is then recomputed from the other two so `q + r + s = 0`.
pub fn hex_round(qf: f32, rf: f32) -> Axial {
    let sf = -qf - rf;
    let mut q = qf.round();
    let mut r = rf.round();
    let s = sf.round();

    let dq = (q - qf).abs();
    let dr = (r - rf).abs();
    let ds = (s - sf).abs();

    if dq > dr && dq > ds {
        q = -r - s;
    } else if dr > ds {
        r = -q - s;
    }

    Axial::new(q as i32, r as i32)
}

/// Cell containing a pixel position
pub fn pixel_to_hex(p: Vec2, hex_radius: f32) -> Axial {
    let qf = (2.0 / 3.0 * p.x) / hex_radius;
    let rf = (-1.0 / 3.0 * p.x + 3.0_f32.sqrt() / 3.0 * p.y) / hex_radius;
    hex_round(qf, rf)
}

/// Number of steps between two cells
pub fn cube_distance(a: Axial, b: Axial) -> u32 {
    let dq = (a.q - b.q).abs();
    let dr = (a.r - b.r).abs();
    let ds = (a.s() - b.s()).abs();
    ((dq + dr + ds) / 2) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const R: f32 = 40.0;

    #[test]
    fn test_center_of_origin() {
        assert_eq!(center(Axial::new(0, 0), R), Vec2::ZERO);
    }

    #[test]
    fn test_pixel_to_hex_exact_center() {
        let c = center(Axial::new(2, -1), R);
        assert_eq!(pixel_to_hex(c, R), Axial::new(2, -1));
    }

    #[test]
    fn test_pixel_to_hex_near_corner_stays_adjacent() {
        // Just inside corner 0 of the origin cell
        let p = Vec2::new(R * 0.95, 0.0);
        assert_eq!(pixel_to_hex(p, R), Axial::new(0, 0));
    }

    #[test]
    fn test_neighbors_share_edge() {
        // Edge i of a cell is edge (i + 3) % 6 of its neighbor, reversed
        let a = Axial::new(0, 0);
        for i in 0..6 {
            let (a0, a1) = edge_endpoints(a, R, i);
            let (b0, b1) = edge_endpoints(a.neighbor(i), R, (i + 3) % 6);
            assert!(a0.distance(b1) < 1e-3, "edge {i} start");
            assert!(a1.distance(b0) < 1e-3, "edge {i} end");
        }
    }

    #[test]
    fn test_cube_distance() {
        assert_eq!(cube_distance(Axial::new(0, 0), Axial::new(2, -1)), 2);
        assert_eq!(cube_distance(Axial::new(-1, 1), Axial::new(1, -1)), 2);
        for n in Axial::new(3, 3).neighbors() {
            assert_eq!(cube_distance(Axial::new(3, 3), n), 1);
        }
    }

    fn frac_cube_distance(a: Axial, qf: f32, rf: f32) -> f32 {
        let sf = -qf - rf;
        ((a.q as f32 - qf).abs() + (a.r as f32 - rf).abs() + (a.s() as f32 - sf).abs()) / 2.0
    }

    proptest! {
        #[test]
        fn prop_hex_round_is_nearest(qf in -50.0f32..50.0, rf in -50.0f32..50.0) {
            let rounded = hex_round(qf, rf);
            prop_assert_eq!(rounded.q + rounded.r + rounded.s(), 0);
            let best = frac_cube_distance(rounded, qf, rf);
            // No neighboring lattice point is strictly closer
            for n in rounded.neighbors() {
                prop_assert!(best <= frac_cube_distance(n, qf, rf) + 1e-3);
            }
        }

        #[test]
        fn prop_center_round_trips(q in -30i32..30, r in -30i32..30) {
            let coord = Axial::new(q, r);
            prop_assert_eq!(pixel_to_hex(center(coord, R), R), coord);
        }
    }
}
