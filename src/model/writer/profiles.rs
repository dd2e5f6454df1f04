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

//! Paired profiles written into the run files: sound speed,
//! bathymetry and altimetry.
//!
//! All invariants (equal lengths, ordering, finite values)
//! are checked on construction, so a profile that exists
//! can always be written.

use crate::{
    errors::ConfigError,
    model::configuration::{schema, PairInterpolation},
    Float,
};
use std::path::Path;

fn check_paired(what: &'static str, left: &[Float], right: &[Float]) -> Result<(), ConfigError> {
    if left.len() != right.len() {
        return Err(ConfigError::LengthMismatch {
            what,
            left: left.len(),
            right: right.len(),
        });
    }

    if left.is_empty() {
        return Err(ConfigError::Empty(what));
    }

    if left.iter().chain(right).any(|v| !v.is_finite()) {
        return Err(ConfigError::NonFinite(what));
    }

    Ok(())
}

fn check_increasing(what: &'static str, values: &[Float]) -> Result<(), ConfigError> {
    if values.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ConfigError::NotIncreasing(what));
    }

    Ok(())
}

/// Reads two-column CSV table (with header) into columns.
pub(crate) fn read_columns(path: &Path) -> Result<(Vec<Float>, Vec<Float>), ConfigError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut left = vec![];
    let mut right = vec![];

    for record in reader.deserialize() {
        let (x, y): (Float, Float) = record?;
        left.push(x);
        right.push(y);
    }

    Ok((left, right))
}

/// Sound speed as a function of depth.
#[derive(Clone, PartialEq, Debug)]
pub struct SoundSpeedProfile {
    pub interpolation: PairInterpolation,
    pub depths: Vec<Float>,
    pub speeds: Vec<Float>,
}

impl SoundSpeedProfile {
    pub fn new(
        interpolation: PairInterpolation,
        depths: Vec<Float>,
        speeds: Vec<Float>,
    ) -> Result<Self, ConfigError> {
        check_paired("Sound speed depths and speeds", &depths, &speeds)?;
        check_increasing("Sound speed depths", &depths)?;
        schema::WATER_DEPTH.check_all(&depths)?;
        schema::WATER_SPEED.check_all(&speeds)?;

        Ok(SoundSpeedProfile {
            interpolation,
            depths,
            speeds,
        })
    }

    pub fn from_table(interpolation: PairInterpolation, path: &Path) -> Result<Self, ConfigError> {
        let (depths, speeds) = read_columns(path)?;
        SoundSpeedProfile::new(interpolation, depths, speeds)
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (Float, Float)> + '_ {
        self.depths.iter().copied().zip(self.speeds.iter().copied())
    }

    pub fn min_depth(&self) -> Float {
        self.depths[0]
    }

    pub fn max_depth(&self) -> Float {
        self.depths[self.depths.len() - 1]
    }
}

/// Range-dependent boundary: sea floor depth (bathymetry)
/// or sea surface height (altimetry) along the track.
#[derive(Clone, PartialEq, Debug)]
pub struct BoundaryProfile {
    pub interpolation: PairInterpolation,
    /// Ranges along the track (km).
    pub ranges: Vec<Float>,
    /// Depth of the boundary at each range (m).
    pub depths: Vec<Float>,
}

impl BoundaryProfile {
    pub fn new(
        what: &'static str,
        interpolation: PairInterpolation,
        ranges: Vec<Float>,
        depths: Vec<Float>,
    ) -> Result<Self, ConfigError> {
        check_paired(what, &ranges, &depths)?;
        check_increasing(what, &ranges)?;
        schema::PROFILE_RANGE.check_all(&ranges)?;
        schema::PROFILE_DEPTH.check_all(&depths)?;

        Ok(BoundaryProfile {
            interpolation,
            ranges,
            depths,
        })
    }

    pub fn bathymetry(
        interpolation: PairInterpolation,
        ranges: Vec<Float>,
        depths: Vec<Float>,
    ) -> Result<Self, ConfigError> {
        BoundaryProfile::new("Bathymetry ranges and depths", interpolation, ranges, depths)
    }

    pub fn altimetry(
        interpolation: PairInterpolation,
        ranges: Vec<Float>,
        heights: Vec<Float>,
    ) -> Result<Self, ConfigError> {
        BoundaryProfile::new("Altimetry ranges and heights", interpolation, ranges, heights)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (Float, Float)> + '_ {
        self.ranges.iter().copied().zip(self.depths.iter().copied())
    }

    pub fn deepest(&self) -> Float {
        self.depths.iter().copied().fold(Float::MIN, Float::max)
    }

    pub fn longest_range(&self) -> Float {
        self.ranges[self.ranges.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundaryProfile, SoundSpeedProfile};
    use crate::{errors::ConfigError, model::configuration::PairInterpolation};
    use float_cmp::approx_eq;
    use std::io::Write;

    #[test]
    fn mismatched_lengths() {
        let result = SoundSpeedProfile::new(
            PairInterpolation::Linear,
            vec![0.0, 10.0, 20.0],
            vec![1500.0, 1490.0],
        );

        assert!(matches!(
            result,
            Err(ConfigError::LengthMismatch { left: 3, right: 2, .. })
        ));
    }

    #[test]
    fn depths_must_increase() {
        let result = SoundSpeedProfile::new(
            PairInterpolation::Linear,
            vec![0.0, 20.0, 20.0],
            vec![1500.0, 1490.0, 1495.0],
        );

        assert!(matches!(result, Err(ConfigError::NotIncreasing(_))));
    }

    #[test]
    fn repeated_ranges_are_rejected() {
        let result = BoundaryProfile::bathymetry(
            PairInterpolation::Linear,
            vec![0.0, 2.5, 2.5, 5.0],
            vec![120.0, 180.0, 175.0, 150.0],
        );

        assert!(matches!(result, Err(ConfigError::NotIncreasing(_))));
    }

    #[test]
    fn empty_and_non_finite() {
        assert!(matches!(
            BoundaryProfile::bathymetry(PairInterpolation::Linear, vec![], vec![]),
            Err(ConfigError::Empty(_))
        ));

        assert!(matches!(
            BoundaryProfile::bathymetry(
                PairInterpolation::Linear,
                vec![0.0, 1.0],
                vec![100.0, f64::NAN]
            ),
            Err(ConfigError::NonFinite(_))
        ));
    }

    #[test]
    fn boundary_extremes() {
        let profile = BoundaryProfile::bathymetry(
            PairInterpolation::Linear,
            vec![0.0, 1.5, 3.0],
            vec![120.0, 185.5, 150.0],
        )
        .unwrap();

        assert!(approx_eq!(f64, profile.deepest(), 185.5));
        assert!(approx_eq!(f64, profile.longest_range(), 3.0));
    }

    #[test]
    fn profile_from_table() {
        let mut table = tempfile::NamedTempFile::new().unwrap();
        writeln!(table, "depth,speed\n0.0,1490.2\n25.0,1488.0\n200.0,1500.0").unwrap();

        let profile =
            SoundSpeedProfile::from_table(PairInterpolation::Linear, table.path()).unwrap();

        assert_eq!(profile.len(), 3);
        assert!(approx_eq!(f64, profile.max_depth(), 200.0));
        assert!(approx_eq!(f64, profile.speeds[0], 1490.2));
    }
}
