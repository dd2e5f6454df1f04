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

//! Module responsible for reading a bathymetric survey
//! and extracting a depth profile along a track from it.
//!
//! The track is a straight line in longitude-latitude space.
//! Distances along it are converted from degrees with a fixed
//! [`KM_PER_DEGREE`] factor, which ignores the convergence of
//! meridians. For tracks of a few kilometres this is the accepted
//! accuracy of the tool, not a bug.

mod bisection;
mod interpolation;

use self::interpolation::{interpolate_bilinear, Point2D};
use crate::{
    constants::KM_PER_DEGREE,
    errors::{BathymetryError, ModelError},
    model::{configuration::PairInterpolation, writer::profiles::BoundaryProfile},
    Float,
};
use float_cmp::approx_eq;
use log::{debug, warn};
use ndarray::{Array1, Array2};
use rustc_hash::FxHashMap;
use std::path::Path;

/// Convenience type to store lon-lat coordinates.
pub type LonLat = (Float, Float);

/// Regular grid of depths indexed by `[latitude, longitude]`.
#[derive(Clone, PartialEq, Debug)]
pub struct BathymetryGrid {
    pub lats: Vec<Float>,
    pub lons: Vec<Float>,
    pub depths: Array2<Float>,
}

impl BathymetryGrid {
    /// Reads a survey CSV file with a header and
    /// `latitude, longitude, depth` rows.
    pub fn from_csv(path: &Path) -> Result<Self, BathymetryError> {
        debug!("Reading bathymetry survey from {}", path.display());

        let mut reader = csv::Reader::from_path(path)?;
        let mut samples = vec![];

        for record in reader.deserialize() {
            let sample: (Float, Float, Float) = record?;
            samples.push(sample);
        }

        BathymetryGrid::from_samples(&samples)
    }

    /// Builds the grid from scattered `(lat, lon, depth)` samples
    /// lying on a regular lattice.
    ///
    /// Lattice nodes without a sample get zero depth.
    pub fn from_samples(samples: &[(Float, Float, Float)]) -> Result<Self, BathymetryError> {
        let samples: Vec<_> = samples
            .iter()
            .filter(|(lat, lon, depth)| lat.is_finite() && lon.is_finite() && depth.is_finite())
            .collect();

        if samples.is_empty() {
            return Err(BathymetryError::EmptyDataset);
        }

        let lats = distinct_sorted(samples.iter().map(|s| s.0));
        let lons = distinct_sorted(samples.iter().map(|s| s.1));

        if lats.len() < 2 || lons.len() < 2 {
            return Err(BathymetryError::DegenerateGrid);
        }

        let lat_index = index_axis(&lats);
        let lon_index = index_axis(&lons);

        let mut depths = Array2::<Float>::zeros((lats.len(), lons.len()));
        let mut filled = Array2::<bool>::from_elem((lats.len(), lons.len()), false);

        for (lat, lon, depth) in samples {
            let i = lat_index[&axis_key(*lat)];
            let j = lon_index[&axis_key(*lon)];

            depths[[i, j]] = *depth;
            filled[[i, j]] = true;
        }

        let missing = filled.iter().filter(|f| !**f).count();
        if missing > 0 {
            warn!(
                "Bathymetry survey does not cover {} of {} grid nodes, assuming zero depth there",
                missing,
                filled.len()
            );
        }

        debug!(
            "Bathymetry grid: {} latitudes x {} longitudes",
            lats.len(),
            lons.len()
        );

        Ok(BathymetryGrid { lats, lons, depths })
    }

    /// Bilinearly interpolated depth at the given point.
    pub fn depth_at(&self, lon: Float, lat: Float) -> Result<Float, BathymetryError> {
        let outside = |_| BathymetryError::OutsideGrid { lon, lat };

        let i = bisection::find_cell(&self.lats, &lat).map_err(outside)?;
        let j = bisection::find_cell(&self.lons, &lon).map_err(outside)?;

        let node = |i: usize, j: usize| Point2D {
            value: self.depths[[i, j]],
            x: self.lons[j],
            y: self.lats[i],
        };

        Ok(interpolate_bilinear(
            lon,
            lat,
            [node(i, j), node(i + 1, j), node(i, j + 1), node(i + 1, j + 1)],
        ))
    }

    /// Extracts the depth profile along a straight track.
    ///
    /// Returns `points` evenly spaced samples with along-track
    /// distances in km from the track start.
    pub fn extract_track(
        &self,
        start: LonLat,
        end: LonLat,
        points: usize,
    ) -> Result<(Vec<Float>, Vec<Float>), BathymetryError> {
        if points < 2 {
            return Err(BathymetryError::IncorrectTrack(
                "track needs at least two points",
            ));
        }

        if approx_eq!(Float, start.0, end.0) && approx_eq!(Float, start.1, end.1) {
            return Err(BathymetryError::IncorrectTrack(
                "track start and end cannot be equal",
            ));
        }

        let mut lons = Array1::linspace(start.0, end.0, points);
        let mut lats = Array1::linspace(start.1, end.1, points);

        // linspace accumulates rounding, so pin the end exactly onto the track end
        lons[points - 1] = end.0;
        lats[points - 1] = end.1;

        let mut ranges = Vec::with_capacity(points);
        let mut depths = Vec::with_capacity(points);

        for (lon, lat) in lons.iter().zip(lats.iter()) {
            depths.push(self.depth_at(*lon, *lat)?);

            let dlon = lon - start.0;
            let dlat = lat - start.1;
            ranges.push((dlon * dlon + dlat * dlat).sqrt() * KM_PER_DEGREE);
        }

        Ok((ranges, depths))
    }
}

/// Reads the survey and extracts the track profile ready to be written.
pub fn profile_along_track(
    dataset: &Path,
    start: LonLat,
    end: LonLat,
    points: usize,
    interpolation: PairInterpolation,
) -> Result<BoundaryProfile, ModelError> {
    let grid = BathymetryGrid::from_csv(dataset)?;
    let (ranges, depths) = grid.extract_track(start, end, points)?;

    Ok(BoundaryProfile::bathymetry(interpolation, ranges, depths)?)
}

/// Hash key of an axis coordinate, with `-0.0` folded into `0.0`.
fn axis_key(value: Float) -> u64 {
    (value + 0.0).to_bits()
}

fn distinct_sorted(values: impl Iterator<Item = Float>) -> Vec<Float> {
    let mut values: Vec<Float> = values.map(|v| v + 0.0).collect();

    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();

    values
}

fn index_axis(axis: &[Float]) -> FxHashMap<u64, usize> {
    axis.iter()
        .enumerate()
        .map(|(index, value)| (axis_key(*value), index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::BathymetryGrid;
    use crate::{constants::KM_PER_DEGREE, errors::BathymetryError};
    use float_cmp::approx_eq;
    use std::io::Write;

    /// 3x3 survey with depth increasing to the north-east.
    fn samples() -> Vec<(f64, f64, f64)> {
        let mut samples = vec![];

        for (i, lat) in [47.70, 47.72, 47.74].iter().enumerate() {
            for (j, lon) in [-122.86, -122.84, -122.82].iter().enumerate() {
                samples.push((*lat, *lon, 100.0 + 10.0 * i as f64 + 20.0 * j as f64));
            }
        }

        samples
    }

    #[test]
    fn grid_from_samples() {
        let grid = BathymetryGrid::from_samples(&samples()).unwrap();

        assert_eq!(grid.lats.len(), 3);
        assert_eq!(grid.lons.len(), 3);
        assert!(approx_eq!(f64, grid.depths[[2, 1]], 140.0));
    }

    #[test]
    fn depth_at_nodes_and_centres() {
        let grid = BathymetryGrid::from_samples(&samples()).unwrap();

        let node = grid.depth_at(-122.84, 47.72).unwrap();
        assert!(approx_eq!(f64, node, 130.0, epsilon = 1e-9));

        let centre = grid.depth_at(-122.85, 47.71).unwrap();
        assert!(approx_eq!(f64, centre, 115.0, epsilon = 1e-9));

        let edge = grid.depth_at(-122.82, 47.74).unwrap();
        assert!(approx_eq!(f64, edge, 160.0, epsilon = 1e-9));
    }

    #[test]
    fn outside_grid() {
        let grid = BathymetryGrid::from_samples(&samples()).unwrap();

        assert!(matches!(
            grid.depth_at(-122.90, 47.72),
            Err(BathymetryError::OutsideGrid { .. })
        ));
    }

    #[test]
    fn missing_nodes_are_zero() {
        let mut samples = samples();
        samples.remove(0);

        let grid = BathymetryGrid::from_samples(&samples).unwrap();
        assert!(approx_eq!(f64, grid.depths[[0, 0]], 0.0));
    }

    #[test]
    fn degenerate_grid() {
        assert!(matches!(
            BathymetryGrid::from_samples(&[(47.7, -122.8, 100.0), (47.7, -122.9, 110.0)]),
            Err(BathymetryError::DegenerateGrid)
        ));
        assert!(matches!(
            BathymetryGrid::from_samples(&[]),
            Err(BathymetryError::EmptyDataset)
        ));
    }

    #[test]
    fn track_distances_use_fixed_scale() {
        let grid = BathymetryGrid::from_samples(&samples()).unwrap();

        let (ranges, depths) = grid
            .extract_track((-122.84, 47.70), (-122.84, 47.74), 5)
            .unwrap();

        assert_eq!(ranges.len(), 5);
        assert!(approx_eq!(f64, ranges[0], 0.0));
        assert!(approx_eq!(f64, ranges[4], 0.04 * KM_PER_DEGREE, epsilon = 1e-9));
        assert!(approx_eq!(f64, depths[0], 120.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, depths[2], 130.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, depths[4], 140.0, epsilon = 1e-9));
    }

    #[test]
    fn incorrect_tracks() {
        let grid = BathymetryGrid::from_samples(&samples()).unwrap();

        assert!(matches!(
            grid.extract_track((-122.84, 47.70), (-122.84, 47.70), 10),
            Err(BathymetryError::IncorrectTrack(_))
        ));
        assert!(matches!(
            grid.extract_track((-122.84, 47.70), (-122.83, 47.72), 1),
            Err(BathymetryError::IncorrectTrack(_))
        ));
    }

    #[test]
    fn survey_from_csv() {
        let mut survey = tempfile::NamedTempFile::new().unwrap();
        writeln!(survey, "latitude,longitude,depth").unwrap();
        for (lat, lon, depth) in samples() {
            writeln!(survey, "{},{},{}", lat, lon, depth).unwrap();
        }

        let grid = BathymetryGrid::from_csv(survey.path()).unwrap();
        assert_eq!(grid, BathymetryGrid::from_samples(&samples()).unwrap());
    }
}
