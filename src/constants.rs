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

//! Module containing constants used by the toolkit.

use crate::Float;

/// Rough length of one degree of arc along the track (km).
///
/// Used for both latitude and longitude differences,
/// so track lengths are approximate (no geodesic, no `cos(lat)` term).
pub const KM_PER_DEGREE: Float = 111.0;

/// Margin added below the deepest bathymetry point
/// when the maximum ray depth is not configured (m).
pub const DEFAULT_DEPTH_MARGIN: Float = 5.0;

/// Margin added beyond the longest bathymetry range
/// when the maximum ray range is not configured (km).
pub const DEFAULT_RANGE_MARGIN: Float = 1.0;

/// Separator between values and `!` comments in environment files.
pub const COMMENT_GAP: &str = "\t\t\t";

/// Mode flag passed to the simulator executable.
pub const SIMULATOR_MODE_FLAG: &str = "-2D";

/// Number of header records preceding pressure records in `.shd` files.
pub const SHD_HEADER_RECORDS: usize = 10;

/// Length (in bytes) of the title stored in the first `.shd` record.
pub const SHD_TITLE_LEN: usize = 80;

/// Length (in bytes) of the plot type stored in the second `.shd` record.
pub const SHD_PLOT_TYPE_LEN: usize = 10;

/// Transmission loss reported where the pressure is exactly zero (dB).
pub const MAX_TRANSMISSION_LOSS: Float = 300.0;

/// Interval between polls of a running simulator (ms).
pub const SIMULATOR_POLL_MS: u64 = 100;
