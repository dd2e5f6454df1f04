/*
Copyright 2025 The armsprop Authors

This file is part of ARMS Propagation Toolkit (armsprop).

ARMS Propagation Toolkit (armsprop) is a free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation; either version 3 of the License, or
(at your option) any later version.

ARMS Propagation Toolkit (armsprop) is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with ARMS Propagation Toolkit (armsprop). If not, see https://www.gnu.org/licenses/.
*/

//! Module containing interpolation methods.

use crate::Float;

/// Grid node with its coordinates and value.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
pub struct Point2D {
    pub value: Float,

    pub x: Float,
    pub y: Float,
}

/// Bilinear interpolation inside a rectangular cell.
///
/// Corners are expected in order: `(x0, y0)`, `(x0, y1)`,
/// `(x1, y0)`, `(x1, y1)`.
pub fn interpolate_bilinear(x: Float, y: Float, corners: [Point2D; 4]) -> Float {
    let [p00, p01, p10, p11] = corners;

    let tx = (x - p00.x) / (p10.x - p00.x);
    let ty = (y - p00.y) / (p01.y - p00.y);

    (1.0 - tx) * (1.0 - ty) * p00.value
        + (1.0 - tx) * ty * p01.value
        + tx * (1.0 - ty) * p10.value
        + tx * ty * p11.value
}

#[cfg(test)]
mod tests {
    use super::{interpolate_bilinear, Point2D};
    use float_cmp::approx_eq;

    fn cell() -> [Point2D; 4] {
        [
            Point2D { value: 10.0, x: 0.0, y: 0.0 },
            Point2D { value: 20.0, x: 0.0, y: 2.0 },
            Point2D { value: 30.0, x: 1.0, y: 0.0 },
            Point2D { value: 60.0, x: 1.0, y: 2.0 },
        ]
    }

    #[test]
    fn corners_are_exact() {
        for corner in cell() {
            let value = interpolate_bilinear(corner.x, corner.y, cell());
            assert!(approx_eq!(f64, value, corner.value));
        }
    }

    #[test]
    fn centre_is_mean() {
        let value = interpolate_bilinear(0.5, 1.0, cell());
        assert!(approx_eq!(f64, value, 30.0));
    }
}
