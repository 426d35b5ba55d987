// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate quantization onto an integer millimetre lattice.
//!
//! Host coordinates arrive as `f64` in the model's base length unit (feet).
//! Converting them to whole millimetres makes equality and hashing exact,
//! so vertices that differ only by floating noise collapse to one point.

use nalgebra::Point3;
use std::fmt;

/// Base unit (feet) to millimetres.
pub const FEET_TO_MM: f64 = 25.4 * 12.0;

/// Magnitudes below this (in the input unit) snap to exactly zero.
pub const EPSILON: f64 = 1e-9;

/// Convert a length in feet to whole millimetres.
///
/// Rounds half away from zero; anything smaller than [`EPSILON`] is 0.
#[inline]
pub fn to_millimetres(d: f64) -> i64 {
    snap(d, FEET_TO_MM)
}

#[inline]
fn snap(value: f64, factor: f64) -> i64 {
    if value.abs() < EPSILON {
        0
    } else {
        // f64::round is half-away-from-zero
        (value * factor).round() as i64
    }
}

/// A point on the integer millimetre lattice.
///
/// Ordering is lexicographic on `(x, y, z)`; equality is field-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuantizedPoint {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl QuantizedPoint {
    /// Create a point from lattice components.
    #[inline]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Quantize a point expressed in feet.
    ///
    /// With `switch_coordinates` the Z-up CAD convention is converted to the
    /// Y-up rendering convention: the result is `(-x, z, y)`.
    pub fn from_feet(p: &Point3<f64>, switch_coordinates: bool) -> Self {
        Self::from_components(
            snap(p.x, FEET_TO_MM),
            snap(p.y, FEET_TO_MM),
            snap(p.z, FEET_TO_MM),
            switch_coordinates,
        )
    }

    /// Quantize a point already expressed in millimetres.
    pub fn from_millimetres(p: &Point3<f64>, switch_coordinates: bool) -> Self {
        Self::from_components(
            snap(p.x, 1.0),
            snap(p.y, 1.0),
            snap(p.z, 1.0),
            switch_coordinates,
        )
    }

    #[inline]
    fn from_components(x: i64, y: i64, z: i64, switch_coordinates: bool) -> Self {
        if switch_coordinates {
            Self::new(-x, z, y)
        } else {
            Self::new(x, y, z)
        }
    }

    /// Scale back to floating output units.
    #[inline]
    pub fn to_output(&self, scale: f64) -> [f64; 3] {
        [
            self.x as f64 * scale,
            self.y as f64 * scale,
            self.z as f64 * scale,
        ]
    }
}

impl fmt::Display for QuantizedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_feet_to_millimetres() {
        assert_eq!(to_millimetres(1.0), 305);
        assert_eq!(to_millimetres(10.0), 3048);
        assert_eq!(to_millimetres(-1.0), -305);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let q = QuantizedPoint::from_millimetres(&Point3::new(0.5, -0.5, 2.5), false);
        assert_eq!(q, QuantizedPoint::new(1, -1, 3));
    }

    #[test]
    fn snaps_noise_to_zero() {
        assert_eq!(to_millimetres(1e-10), 0);
        assert_eq!(to_millimetres(-9.9e-10), 0);
    }

    #[test]
    fn switch_coordinates_negates_x_and_swaps_y_z() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let q = QuantizedPoint::from_millimetres(&p, true);
        assert_eq!(q, QuantizedPoint::new(-1, 3, 2));

        let q = QuantizedPoint::from_millimetres(&p, false);
        assert_eq!(q, QuantizedPoint::new(1, 2, 3));
    }

    #[test]
    fn millimetre_input_with_axis_conversion() {
        let q = QuantizedPoint::from_millimetres(&Point3::new(100.0, 0.0, 0.0), true);
        assert_eq!(q, QuantizedPoint::new(-100, 0, 0));
    }

    #[test]
    fn noise_collapses_to_same_point() {
        let a = QuantizedPoint::from_feet(&Point3::new(1.0, 2.0, 3.0), false);
        let b = QuantizedPoint::from_feet(&Point3::new(1.0 + 1e-12, 2.0 - 1e-12, 3.0), false);
        assert_eq!(a, b);
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = QuantizedPoint::new(0, 5, 5);
        let b = QuantizedPoint::new(1, 0, 0);
        let c = QuantizedPoint::new(1, 0, 1);
        assert!(a < b);
        assert!(b < c);

        let mut points = vec![c, a, b];
        points.sort();
        assert_eq!(points, vec![a, b, c]);
    }

    #[test]
    fn display_format() {
        assert_eq!(QuantizedPoint::new(-1, 0, 42).to_string(), "(-1,0,42)");
    }
}
