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

//! Module responsible for parsing and checking the configuration file.
//!
//! The configuration file uses [YAML](https://en.wikipedia.org/wiki/YAML)
//! and `serde` to enforce strong typing and automatic type checking.
//! Numeric bounds are checked against the declarative [`schema`].
//!
//! The structures and their fields in this module directly correspond to
//! the fields inside `config.yaml` so you can check this documentation
//! for more details how to set the config file.

pub mod schema;

use crate::{errors::ConfigError, Float};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Interpolation marker written at the top of
/// `.ssp`, `.bty` and `.ati` files.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Deserialize)]
pub enum PairInterpolation {
    #[serde(rename = "L")]
    Linear,
    #[serde(rename = "C")]
    Curvilinear,
}

impl PairInterpolation {
    pub fn marker(self) -> char {
        match self {
            PairInterpolation::Linear => 'L',
            PairInterpolation::Curvilinear => 'C',
        }
    }
}

impl Default for PairInterpolation {
    fn default() -> Self {
        PairInterpolation::Linear
    }
}

/// Fields naming the run and its directories.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Run {
    /// Title of the run. It is written into the environment file
    /// and used as the base name of every run file,
    /// so it cannot contain quotes or path separators.
    pub title: String,

    /// Directory where run files are written and where
    /// the simulator puts its output.
    pub directory: PathBuf,

    /// _(Optional)_ Directory for exported tables.
    ///
    /// Defaults to `./output/`.
    #[serde(default = "Run::default_output_directory")]
    pub output_directory: PathBuf,
}

impl Run {
    fn default_output_directory() -> PathBuf {
        PathBuf::from("./output/")
    }

    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Empty("Run title"));
        }

        if self
            .title
            .chars()
            .any(|c| c == '\'' || c == '/' || c == '\\' || c.is_whitespace())
        {
            return Err(ConfigError::OutOfBounds(format!(
                "run title '{}' cannot contain quotes, whitespace or path separators",
                self.title
            )));
        }

        Ok(())
    }
}

/// Acoustic parameters of the run.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Acoustics {
    /// Source frequency in Hz.
    pub frequency: Float,

    /// _(Optional)_ Number of media. Defaults to `1`.
    #[serde(default = "Acoustics::default_media")]
    pub media: u16,

    /// Top option code (up to 5 characters): SSP interpolation,
    /// surface condition, attenuation units, volume attenuation
    /// and `*` when an altimetry file should be used.
    pub top_options: String,

    /// Run type: `R` rays, `E` eigenrays, `C`/`I`/`S` coherent,
    /// incoherent or semi-coherent TL, `A` arrivals.
    pub run_type: String,

    /// _(Optional)_ Number of beams. `0` lets the simulator choose.
    #[serde(default)]
    pub beams: u32,

    /// Launch angle bounds in degrees.
    pub launch_angles: (Float, Float),

    /// _(Optional)_ Ray step size in meters. `0` lets the simulator choose.
    #[serde(default)]
    pub step_size: Float,

    /// _(Optional)_ Depth of the ray box (m).
    ///
    /// Defaults to the deepest bathymetry point plus 5 m.
    #[serde(default)]
    pub max_depth: Option<Float>,

    /// _(Optional)_ Range of the ray box (km).
    ///
    /// Defaults to the longest bathymetry range plus 1 km.
    #[serde(default)]
    pub max_range: Option<Float>,
}

impl Acoustics {
    fn default_media() -> u16 {
        1
    }

    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        schema::FREQUENCY.check(self.frequency)?;
        schema::MEDIA.check(Float::from(self.media))?;
        schema::BEAMS.check(Float::from(self.beams))?;
        schema::LAUNCH_ANGLE.check(self.launch_angles.0)?;
        schema::LAUNCH_ANGLE.check(self.launch_angles.1)?;
        schema::STEP_SIZE.check(self.step_size)?;

        if self.launch_angles.0 > self.launch_angles.1 {
            return Err(ConfigError::OutOfBounds(
                "first launch angle cannot be larger than the second".to_string(),
            ));
        }

        if let Some(depth) = self.max_depth {
            schema::MAX_DEPTH.check(depth)?;
        }

        if let Some(range) = self.max_range {
            schema::MAX_RANGE.check(range)?;
        }

        Ok(())
    }
}

/// Acoustic properties of a half-space above the surface
/// or below the bottom.
#[derive(Copy, Clone, PartialEq, Debug, Deserialize)]
pub struct HalfSpace {
    /// _(Optional)_ Depth of the boundary (m). For the bottom it
    /// defaults to the deepest bathymetry point, for the surface to `0`.
    #[serde(default)]
    pub depth: Option<Float>,

    pub compressional_speed: Float,

    #[serde(default)]
    pub shear_speed: Float,

    pub density: Float,

    #[serde(default)]
    pub attenuation: Float,
}

impl HalfSpace {
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if let Some(depth) = self.depth {
            schema::HALFSPACE_DEPTH.check(depth)?;
        }

        schema::COMPRESSIONAL_SPEED.check(self.compressional_speed)?;
        schema::SHEAR_SPEED.check(self.shear_speed)?;
        schema::DENSITY.check(self.density)?;
        schema::ATTENUATION.check(self.attenuation)?;

        Ok(())
    }
}

/// Bottom boundary of the water column.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Bottom {
    /// Bottom option code: type (`A`, `V` or `R`) followed by
    /// `*` (or `~`) when a bathymetry file should be used.
    pub options: String,

    #[serde(default)]
    pub roughness: Float,

    /// Required when the bottom type is `A`.
    #[serde(default)]
    pub halfspace: Option<HalfSpace>,
}

impl Bottom {
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        schema::ROUGHNESS.check(self.roughness)?;

        if let Some(halfspace) = &self.halfspace {
            halfspace.check_bounds()?;
        }

        Ok(())
    }
}

/// Declared count of sources or receivers along one axis
/// with the listed values.
///
/// When fewer values than `count` are listed the simulator
/// fills the rest (two values are expanded to an even grid).
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Sampling {
    pub count: usize,
    pub values: Vec<Float>,
}

impl Sampling {
    pub fn check_bounds(
        &self,
        what: &'static str,
        field: &schema::FieldSchema,
    ) -> Result<(), ConfigError> {
        if self.values.is_empty() {
            return Err(ConfigError::Empty(what));
        }

        schema::SAMPLING_COUNT.check(self.count as Float)?;

        if self.count < self.values.len() {
            return Err(ConfigError::CountTooSmall {
                what,
                declared: self.count,
                listed: self.values.len(),
            });
        }

        field.check_all(&self.values)
    }
}

/// Source and receiver positions.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Geometry {
    pub source_depths: Sampling,
    pub receiver_depths: Sampling,
    pub receiver_ranges: Sampling,
}

impl Geometry {
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        self.source_depths
            .check_bounds("Source depths", &schema::SOURCE_DEPTH)?;
        self.receiver_depths
            .check_bounds("Receiver depths", &schema::RECEIVER_DEPTH)?;
        self.receiver_ranges
            .check_bounds("Receiver ranges", &schema::RECEIVER_RANGE)?;

        Ok(())
    }
}

/// Sound speed profile given inline or as a CSV
/// table of `depth, speed` rows.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct SoundSpeed {
    #[serde(default)]
    pub interpolation: PairInterpolation,

    #[serde(default)]
    pub depths: Vec<Float>,

    #[serde(default)]
    pub speeds: Vec<Float>,

    /// _(Optional)_ CSV table used instead of inline values.
    #[serde(default)]
    pub table: Option<PathBuf>,
}

/// Where the bathymetry profile comes from.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BathymetrySource {
    /// Ranges (km) and depths (m) listed in the config.
    Inline {
        ranges: Vec<Float>,
        depths: Vec<Float>,
    },

    /// CSV table of `range, depth` rows.
    Table { path: PathBuf },

    /// Profile extracted along a straight track from
    /// a CSV survey dataset of `latitude, longitude, depth` rows.
    Track {
        dataset: PathBuf,
        /// Track start as (lon, lat).
        start: (Float, Float),
        /// Track end as (lon, lat).
        end: (Float, Float),
        #[serde(default = "BathymetrySource::default_points")]
        points: usize,
    },
}

impl BathymetrySource {
    fn default_points() -> usize {
        1000
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Bathymetry {
    #[serde(default)]
    pub interpolation: PairInterpolation,

    pub source: BathymetrySource,
}

impl Bathymetry {
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if let BathymetrySource::Track {
            start, end, points, ..
        } = &self.source
        {
            for (lon, lat) in [start, end] {
                schema::LONGITUDE.check(*lon)?;
                schema::LATITUDE.check(*lat)?;
            }

            schema::TRACK_POINTS.check(*points as Float)?;
        }

        Ok(())
    }
}

/// Non-flat sea surface, used when the top option ends with `*`.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Altimetry {
    #[serde(default)]
    pub interpolation: PairInterpolation,

    pub ranges: Vec<Float>,

    pub heights: Vec<Float>,
}

/// _(Optional)_ External simulator. When missing,
/// only the run files are written.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Simulator {
    /// Path to the simulator executable (eg. `bellhopcxx`).
    pub executable: PathBuf,

    /// _(Optional)_ Time limit for the run in seconds.
    /// The simulator is killed when it runs longer.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Simulator {
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.timeout {
            schema::TIMEOUT.check(timeout as Float)?;
        }

        Ok(())
    }
}

/// _(Optional)_ Fields with information about
/// resources available for the toolkit.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Resources {
    /// _(Optional)_ Heap memory limit in MB.
    /// Large pressure fields are read whole into memory,
    /// so capping the heap gives an OOM error message
    /// instead of the process being killed by the system.
    ///
    /// Cannot be less than `128` nor more than `16777216` (16 TiB),
    /// which is also the default.
    #[serde(default = "Resources::default_memory")]
    pub memory: usize,
}

impl Resources {
    fn default_memory() -> usize {
        16 * 1024 * 1024
    }

    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        schema::MEMORY.check(self.memory as Float)
    }
}

impl Default for Resources {
    fn default() -> Self {
        Resources {
            memory: Resources::default_memory(),
        }
    }
}

/// Main config structure representing the fields in
/// configuration file.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Config {
    pub run: Run,

    pub acoustics: Acoustics,

    /// Required when the surface condition is `A`.
    #[serde(default)]
    pub surface: Option<HalfSpace>,

    pub bottom: Bottom,

    pub geometry: Geometry,

    pub sound_speed: SoundSpeed,

    #[serde(default)]
    pub bathymetry: Option<Bathymetry>,

    #[serde(default)]
    pub altimetry: Option<Altimetry>,

    #[serde(default)]
    pub simulator: Option<Simulator>,

    #[serde(default)]
    pub resources: Resources,
}

impl Config {
    /// Config structure constructor, responsible for
    /// deserializing configuration file and checking it.
    pub fn new_from_file(file_path: &Path) -> Result<Config, ConfigError> {
        let data = fs::read(file_path)?;
        Config::new_from_slice(&data)
    }

    /// Deserializes and checks configuration from YAML bytes.
    pub fn new_from_slice(data: &[u8]) -> Result<Config, ConfigError> {
        let config: Config = serde_yaml::from_slice(data)?;

        config.run.check_bounds()?;
        config.acoustics.check_bounds()?;
        config.bottom.check_bounds()?;
        config.geometry.check_bounds()?;

        if let Some(surface) = &config.surface {
            surface.check_bounds()?;
        }

        if let Some(bathymetry) = &config.bathymetry {
            bathymetry.check_bounds()?;
        }

        if let Some(simulator) = &config.simulator {
            simulator.check_bounds()?;
        }

        config.resources.check_bounds()?;

        Ok(config)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{BathymetrySource, Config, PairInterpolation};
    use crate::errors::ConfigError;

    /// Transmission loss run close to the one used in the field campaign.
    pub(crate) const TL_CONFIG: &str = r#"
run:
  title: arms_1_tl
  directory: ./runs/
acoustics:
  frequency: 10500.0
  top_options: CVW
  run_type: C
  launch_angles: [-89.0, 89.0]
bottom:
  options: "A*"
  halfspace:
    compressional_speed: 1600.0
    density: 1.8
geometry:
  source_depths: { count: 1, values: [20.0] }
  receiver_depths: { count: 201, values: [0.0, 200.0] }
  receiver_ranges: { count: 501, values: [0.0, 5.0] }
sound_speed:
  depths: [0.0, 50.0, 200.0]
  speeds: [1490.0, 1485.5, 1500.0]
bathymetry:
  source:
    inline:
      ranges: [0.0, 2.5, 5.0]
      depths: [120.0, 180.0, 150.0]
"#;

    #[test]
    fn parse_full_config() {
        let config = Config::new_from_slice(TL_CONFIG.as_bytes()).unwrap();

        assert_eq!(config.run.title, "arms_1_tl");
        assert_eq!(config.acoustics.media, 1);
        assert_eq!(config.acoustics.beams, 0);
        assert_eq!(config.geometry.receiver_depths.count, 201);
        assert_eq!(config.sound_speed.interpolation, PairInterpolation::Linear);
        assert!(config.simulator.is_none());
        assert!(matches!(
            config.bathymetry.unwrap().source,
            BathymetrySource::Inline { .. }
        ));
    }

    #[test]
    fn reject_bad_title() {
        let yaml = TL_CONFIG.replace("title: arms_1_tl", "title: \"arms 1\"");

        assert!(matches!(
            Config::new_from_slice(yaml.as_bytes()),
            Err(ConfigError::OutOfBounds(_))
        ));
    }

    #[test]
    fn reject_too_small_count() {
        let yaml = TL_CONFIG.replace(
            "{ count: 201, values: [0.0, 200.0] }",
            "{ count: 1, values: [0.0, 200.0] }",
        );

        assert!(matches!(
            Config::new_from_slice(yaml.as_bytes()),
            Err(ConfigError::CountTooSmall { declared: 1, listed: 2, .. })
        ));
    }

    #[test]
    fn reject_out_of_bounds_frequency() {
        let yaml = TL_CONFIG.replace("frequency: 10500.0", "frequency: -1.0");

        assert!(matches!(
            Config::new_from_slice(yaml.as_bytes()),
            Err(ConfigError::OutOfBounds(_))
        ));
    }

    #[test]
    fn parse_track_source() {
        let yaml = TL_CONFIG.replace(
            "    inline:\n      ranges: [0.0, 2.5, 5.0]\n      depths: [120.0, 180.0, 150.0]\n",
            "    track:\n      dataset: ./data/dabob.csv\n      start: [-122.83, 47.77]\n      end: [-122.85, 47.71]\n      points: 200\n",
        );

        let config = Config::new_from_slice(yaml.as_bytes()).unwrap();

        match config.bathymetry.unwrap().source {
            BathymetrySource::Track { start, points, .. } => {
                assert_eq!(start, (-122.83, 47.77));
                assert_eq!(points, 200);
            }
            other => panic!("unexpected source {:?}", other),
        }
    }
}
