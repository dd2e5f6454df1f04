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

//! Renderers of the tabulated run files: sound speed
//! profile (`.ssp`), bathymetry (`.bty`) and altimetry (`.ati`).

use super::profiles::{BoundaryProfile, SoundSpeedProfile};
use std::fmt::Write;

pub fn render_ssp(profile: &SoundSpeedProfile) -> String {
    let mut out = String::with_capacity(32 + 20 * profile.len());

    // writing into a String cannot fail
    let _ = writeln!(out, "'{}'", profile.interpolation.marker());
    let _ = writeln!(out, "{}", profile.len());

    for (depth, speed) in profile.pairs() {
        let _ = writeln!(out, "{:.2}  {:.2}", depth, speed);
    }

    out
}

/// Renders `.bty` and `.ati` files, which share the layout.
///
/// The trailing slash on every pair terminates the
/// simulator's free-format read of that line.
pub fn render_boundary(profile: &BoundaryProfile) -> String {
    let mut out = String::with_capacity(32 + 20 * profile.len());

    let _ = writeln!(out, "'{}'", profile.interpolation.marker());
    let _ = writeln!(out, "{},", profile.len());

    for (range, depth) in profile.pairs() {
        let _ = writeln!(out, "{:.2}  {:.1} / ", range, depth);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{render_boundary, render_ssp};
    use crate::model::{
        configuration::PairInterpolation,
        writer::profiles::{BoundaryProfile, SoundSpeedProfile},
    };
    use float_cmp::approx_eq;

    /// Reads back a tabulated file as (marker, pairs).
    fn parse_tabulated(text: &str) -> (char, Vec<(f64, f64)>) {
        let mut lines = text.lines();
        let marker = lines.next().unwrap().trim_matches('\'').chars().next().unwrap();
        let count: usize = lines.next().unwrap().trim_end_matches(',').parse().unwrap();

        let pairs: Vec<(f64, f64)> = lines
            .take(count)
            .map(|line| {
                let mut tokens = line.split_whitespace();
                let x = tokens.next().unwrap().parse().unwrap();
                let y = tokens.next().unwrap().parse().unwrap();
                (x, y)
            })
            .collect();

        assert_eq!(pairs.len(), count);
        (marker, pairs)
    }

    #[test]
    fn ssp_layout() {
        let profile = SoundSpeedProfile::new(
            PairInterpolation::Linear,
            vec![0.0, 12.5, 200.0],
            vec![1490.0, 1487.25, 1500.0],
        )
        .unwrap();

        assert_eq!(
            render_ssp(&profile),
            "'L'\n3\n0.00  1490.00\n12.50  1487.25\n200.00  1500.00\n"
        );
    }

    #[test]
    fn ssp_round_trip() {
        let depths: Vec<f64> = (0..40).map(|i| f64::from(i) * 5.123).collect();
        let speeds: Vec<f64> = (0..40).map(|i| 1480.0 + f64::from(i) * 0.517).collect();

        let profile =
            SoundSpeedProfile::new(PairInterpolation::Linear, depths.clone(), speeds.clone())
                .unwrap();

        let (marker, pairs) = parse_tabulated(&render_ssp(&profile));

        assert_eq!(marker, 'L');
        assert_eq!(pairs.len(), depths.len());

        for ((depth, speed), (read_depth, read_speed)) in depths.iter().zip(&speeds).zip(pairs) {
            assert!(approx_eq!(f64, *depth, read_depth, epsilon = 0.01));
            assert!(approx_eq!(f64, *speed, read_speed, epsilon = 0.01));
        }
    }

    #[test]
    fn boundary_layout() {
        let profile = BoundaryProfile::bathymetry(
            PairInterpolation::Curvilinear,
            vec![0.0, 2.456],
            vec![120.04, 180.0],
        )
        .unwrap();

        assert_eq!(
            render_boundary(&profile),
            "'C'\n2,\n0.00  120.0 / \n2.46  180.0 / \n"
        );
    }
}
