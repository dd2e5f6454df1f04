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

//! Declarative description of every numeric configuration field.
//!
//! The same table is used to check bounds of values read from
//! `config.yaml` and to describe the fields to front-ends
//! (`armsprop --schema` prints it).

use crate::{errors::ConfigError, Float};
use std::fmt::Write;

/// Kind of value a field holds.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FieldKind {
    Real,
    Count,
}

/// Single entry of the configuration schema.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub min: Float,
    pub max: Float,
    pub unit: &'static str,
    pub hint: &'static str,
}

impl FieldSchema {
    /// Checks if the value is finite, within the field range
    /// and (for counts) integral.
    pub fn check(&self, value: Float) -> Result<(), ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::NonFinite(self.name));
        }

        if !(self.min..=self.max).contains(&value) {
            return Err(ConfigError::OutOfBounds(format!(
                "{} = {} is outside of [{}, {}] {}",
                self.name, value, self.min, self.max, self.unit
            )));
        }

        if self.kind == FieldKind::Count && value.fract() != 0.0 {
            return Err(ConfigError::OutOfBounds(format!(
                "{} = {} must be a whole number",
                self.name, value
            )));
        }

        Ok(())
    }

    /// Convenience method to check all values of a list field.
    pub fn check_all(&self, values: &[Float]) -> Result<(), ConfigError> {
        values.iter().try_for_each(|v| self.check(*v))
    }
}

const fn real(
    name: &'static str,
    min: Float,
    max: Float,
    unit: &'static str,
    hint: &'static str,
) -> FieldSchema {
    FieldSchema {
        name,
        kind: FieldKind::Real,
        min,
        max,
        unit,
        hint,
    }
}

const fn count(name: &'static str, min: Float, max: Float, hint: &'static str) -> FieldSchema {
    FieldSchema {
        name,
        kind: FieldKind::Count,
        min,
        max,
        unit: "",
        hint,
    }
}

pub const FREQUENCY: FieldSchema = real("frequency", 1.0, 1.0e6, "Hz", "source frequency");
pub const MEDIA: FieldSchema = count("media", 1.0, 1.0, "number of media, only one is written");
pub const WATER_DEPTH: FieldSchema = real("sound speed depth", 0.0, 12_000.0, "m", "depth of SSP point");
pub const WATER_SPEED: FieldSchema =
    real("sound speed", 1_300.0, 1_800.0, "m/s", "speed of sound in water");
pub const HALFSPACE_DEPTH: FieldSchema =
    real("half-space depth", -1_000.0, 12_000.0, "m", "depth of the half-space boundary");
pub const COMPRESSIONAL_SPEED: FieldSchema = real(
    "compressional speed",
    0.0,
    10_000.0,
    "m/s",
    "half-space compressional speed",
);
pub const SHEAR_SPEED: FieldSchema =
    real("shear speed", 0.0, 6_000.0, "m/s", "half-space shear speed");
pub const DENSITY: FieldSchema = real("density", 0.0, 25.0, "g/cm^3", "half-space density");
pub const ATTENUATION: FieldSchema =
    real("attenuation", 0.0, 100.0, "(top option units)", "half-space attenuation");
pub const ROUGHNESS: FieldSchema = real("roughness", 0.0, 100.0, "m", "bottom roughness");
pub const SOURCE_DEPTH: FieldSchema = real("source depth", 0.0, 12_000.0, "m", "source depth");
pub const RECEIVER_DEPTH: FieldSchema =
    real("receiver depth", 0.0, 12_000.0, "m", "receiver depth");
pub const RECEIVER_RANGE: FieldSchema =
    real("receiver range", 0.0, 100_000.0, "km", "receiver range");
pub const SAMPLING_COUNT: FieldSchema = count(
    "sampling count",
    1.0,
    1.0e6,
    "declared number of sources/receivers",
);
pub const BEAMS: FieldSchema = count("beams", 0.0, 1.0e7, "number of beams, 0 lets simulator choose");
pub const LAUNCH_ANGLE: FieldSchema =
    real("launch angle", -180.0, 180.0, "deg", "beam launch angle bound");
pub const STEP_SIZE: FieldSchema = real("step size", 0.0, 1.0e5, "m", "ray step, 0 for automatic");
pub const MAX_DEPTH: FieldSchema = real("max depth", 0.0, 12_000.0, "m", "ray box depth");
pub const MAX_RANGE: FieldSchema = real("max range", 0.0, 100_000.0, "km", "ray box range");
pub const PROFILE_RANGE: FieldSchema =
    real("profile range", 0.0, 100_000.0, "km", "range of bathymetry/altimetry point");
pub const PROFILE_DEPTH: FieldSchema =
    real("profile depth", -12_000.0, 12_000.0, "m", "depth of bathymetry/altimetry point");
pub const LONGITUDE: FieldSchema = real("longitude", -180.0, 180.0, "deg", "track end longitude");
pub const LATITUDE: FieldSchema = real("latitude", -90.0, 90.0, "deg", "track end latitude");
pub const TRACK_POINTS: FieldSchema = count("track points", 2.0, 1.0e6, "points along the track");
pub const TIMEOUT: FieldSchema = count("timeout", 1.0, 604_800.0, "simulator time limit (s)");
/// 16 TiB, the default when no limit is configured.
pub const MEMORY: FieldSchema = count("memory", 128.0, 16_777_216.0, "heap limit (MB)");

/// All fields, in the order they appear in `config.yaml`.
pub const SCHEMA: &[FieldSchema] = &[
    FREQUENCY,
    MEDIA,
    BEAMS,
    LAUNCH_ANGLE,
    STEP_SIZE,
    MAX_DEPTH,
    MAX_RANGE,
    HALFSPACE_DEPTH,
    COMPRESSIONAL_SPEED,
    SHEAR_SPEED,
    DENSITY,
    ATTENUATION,
    ROUGHNESS,
    SAMPLING_COUNT,
    SOURCE_DEPTH,
    RECEIVER_DEPTH,
    RECEIVER_RANGE,
    WATER_DEPTH,
    WATER_SPEED,
    PROFILE_RANGE,
    PROFILE_DEPTH,
    LONGITUDE,
    LATITUDE,
    TRACK_POINTS,
    TIMEOUT,
    MEMORY,
];

/// Renders the schema as a plain-text table.
pub fn describe() -> String {
    let mut table = String::new();

    // writing into a String cannot fail
    let _ = writeln!(
        table,
        "{:<22} {:<6} {:>12} {:>12} {:<20} hint",
        "field", "kind", "min", "max", "unit"
    );

    for field in SCHEMA {
        let kind = match field.kind {
            FieldKind::Real => "real",
            FieldKind::Count => "count",
        };

        let _ = writeln!(
            table,
            "{:<22} {:<6} {:>12} {:>12} {:<20} {}",
            field.name, kind, field.min, field.max, field.unit, field.hint
        );
    }

    table
}
