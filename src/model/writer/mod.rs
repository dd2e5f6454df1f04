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

//! Module responsible for turning the run configuration
//! into the text files read by the simulator.
//!
//! All parameters are validated and resolved into an [`Environment`]
//! before anything touches the filesystem, and the files are then
//! written all-or-nothing.

mod env_file;
pub mod options;
pub mod profiles;
mod tabulated;

use self::options::{BottomOptions, BottomType, RunOptions, SurfaceCondition, TopOptions};
use self::profiles::{BoundaryProfile, SoundSpeedProfile};
use crate::{
    constants::{DEFAULT_DEPTH_MARGIN, DEFAULT_RANGE_MARGIN},
    errors::ConfigError,
    model::configuration::{Config, HalfSpace, Sampling},
    Float,
};
use log::{debug, info, warn};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Half-space with its boundary depth resolved.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct HalfSpaceLayer {
    pub depth: Float,
    pub compressional_speed: Float,
    pub shear_speed: Float,
    pub density: Float,
    pub attenuation: Float,
}

impl HalfSpaceLayer {
    fn resolve(halfspace: &HalfSpace, default_depth: Float) -> Self {
        HalfSpaceLayer {
            depth: halfspace.depth.unwrap_or(default_depth),
            compressional_speed: halfspace.compressional_speed,
            shear_speed: halfspace.shear_speed,
            density: halfspace.density,
            attenuation: halfspace.attenuation,
        }
    }
}

/// One rendered run file.
#[derive(Clone, PartialEq, Debug)]
pub struct RunFile {
    pub extension: &'static str,
    pub contents: String,
}

/// Complete, validated set of parameters of a single simulator run.
///
/// Constructed once per run from the configuration, then
/// rendered into the run files and discarded.
#[derive(Clone, PartialEq, Debug)]
pub struct Environment {
    pub title: String,
    pub frequency: Float,
    pub media: u16,
    pub top: TopOptions,
    pub surface: Option<HalfSpaceLayer>,
    pub sound_speed: SoundSpeedProfile,
    pub bottom: BottomOptions,
    pub roughness: Float,
    pub bottom_halfspace: Option<HalfSpaceLayer>,
    pub source_depths: Sampling,
    pub receiver_depths: Sampling,
    pub receiver_ranges: Sampling,
    pub run: RunOptions,
    pub beams: u32,
    pub launch_angles: (Float, Float),
    pub step_size: Float,
    pub max_depth: Float,
    pub max_range: Float,
    pub bathymetry: Option<BoundaryProfile>,
    pub altimetry: Option<BoundaryProfile>,
}

impl Environment {
    /// Environment constructor, resolving defaults and checking
    /// that every file requested by the option codes can be written.
    ///
    /// Bathymetry is resolved by the caller because it may need
    /// to be extracted from a survey dataset.
    pub fn new(config: &Config, bathymetry: Option<BoundaryProfile>) -> Result<Self, ConfigError> {
        debug!("Resolving run environment");

        let top = TopOptions::parse(&config.acoustics.top_options)?;
        let bottom = BottomOptions::parse(&config.bottom.options)?;
        let run = RunOptions::parse(&config.acoustics.run_type)?;

        let sound_speed = match &config.sound_speed.table {
            Some(path) => {
                SoundSpeedProfile::from_table(config.sound_speed.interpolation, path)?
            }
            None => SoundSpeedProfile::new(
                config.sound_speed.interpolation,
                config.sound_speed.depths.clone(),
                config.sound_speed.speeds.clone(),
            )?,
        };

        let bathymetry = match (bottom.bathymetry, bathymetry) {
            (true, None) => return Err(ConfigError::MissingProfile("a bathymetry file")),
            (false, Some(profile)) => {
                warn!("Bathymetry provided but bottom option does not request it, it will only bound the ray box");
                Some(profile)
            }
            (_, profile) => profile,
        };

        let altimetry = match (top.altimetry, &config.altimetry) {
            (true, None) => return Err(ConfigError::MissingProfile("an altimetry file")),
            (true, Some(altimetry)) => Some(BoundaryProfile::altimetry(
                altimetry.interpolation,
                altimetry.ranges.clone(),
                altimetry.heights.clone(),
            )?),
            (false, Some(_)) => {
                warn!("Altimetry provided but top option does not request it, ignoring");
                None
            }
            (false, None) => None,
        };

        let surface = match (top.surface, &config.surface) {
            (SurfaceCondition::AcoustoElastic, None) => {
                return Err(ConfigError::MissingProfile("a surface half-space"))
            }
            (SurfaceCondition::AcoustoElastic, Some(halfspace)) => {
                Some(HalfSpaceLayer::resolve(halfspace, 0.0))
            }
            _ => None,
        };

        let deepest = bathymetry
            .as_ref()
            .map_or(sound_speed.max_depth(), BoundaryProfile::deepest);

        let bottom_halfspace = match (bottom.kind, &config.bottom.halfspace) {
            (BottomType::AcoustoElastic, None) => {
                return Err(ConfigError::MissingProfile("a bottom half-space"))
            }
            (BottomType::AcoustoElastic, Some(halfspace)) => {
                Some(HalfSpaceLayer::resolve(halfspace, deepest))
            }
            _ => None,
        };

        let max_depth = config
            .acoustics
            .max_depth
            .unwrap_or(deepest + DEFAULT_DEPTH_MARGIN);

        let max_range = config.acoustics.max_range.unwrap_or_else(|| {
            let longest = bathymetry.as_ref().map_or_else(
                || {
                    config
                        .geometry
                        .receiver_ranges
                        .values
                        .iter()
                        .copied()
                        .fold(0.0, Float::max)
                },
                BoundaryProfile::longest_range,
            );
            longest + DEFAULT_RANGE_MARGIN
        });

        Ok(Environment {
            title: config.run.title.clone(),
            frequency: config.acoustics.frequency,
            media: config.acoustics.media,
            top,
            surface,
            sound_speed,
            bottom,
            roughness: config.bottom.roughness,
            bottom_halfspace,
            source_depths: config.geometry.source_depths.clone(),
            receiver_depths: config.geometry.receiver_depths.clone(),
            receiver_ranges: config.geometry.receiver_ranges.clone(),
            run,
            beams: config.acoustics.beams,
            launch_angles: config.acoustics.launch_angles,
            step_size: config.acoustics.step_size,
            max_depth,
            max_range,
            bathymetry,
            altimetry,
        })
    }

    /// Renders every run file requested by the option codes.
    ///
    /// Bathymetry and altimetry files are rendered only
    /// when their flags are set.
    pub fn render(&self) -> Vec<RunFile> {
        let mut files = vec![
            RunFile {
                extension: "env",
                contents: env_file::render_env(self),
            },
            RunFile {
                extension: "ssp",
                contents: tabulated::render_ssp(&self.sound_speed),
            },
        ];

        if self.bottom.bathymetry {
            if let Some(bathymetry) = &self.bathymetry {
                files.push(RunFile {
                    extension: "bty",
                    contents: tabulated::render_boundary(bathymetry),
                });
            }
        }

        if let Some(altimetry) = &self.altimetry {
            files.push(RunFile {
                extension: "ati",
                contents: tabulated::render_boundary(altimetry),
            });
        }

        files
    }

    /// Path of the run files without extension, as passed to the simulator.
    pub fn base_path(&self, directory: &Path) -> PathBuf {
        directory.join(&self.title)
    }

    /// Path of a run file with a given extension.
    pub fn file_path(&self, directory: &Path, extension: &str) -> PathBuf {
        directory.join(format!("{}.{}", self.title, extension))
    }

    /// Writes all run files into `directory` and returns
    /// the base path of the run.
    ///
    /// Every file is first written to a hidden temporary
    /// next to its destination. Only when all of them are written
    /// they are renamed into place, otherwise they are removed
    /// and no run file is created. A failed rename takes back the
    /// files already placed and restores those of an earlier run.
    pub fn write(&self, directory: &Path) -> Result<PathBuf, io::Error> {
        let files = self.render();
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(files.len());

        for file in &files {
            let temp_path = directory.join(format!(".{}.{}.tmp", self.title, file.extension));
            let final_path = self.file_path(directory, file.extension);

            if let Err(err) = fs::write(&temp_path, &file.contents) {
                let _ = fs::remove_file(&temp_path);
                discard_staged(&staged);
                return Err(err);
            }

            staged.push((temp_path, final_path));
        }

        let mut committed: Vec<(PathBuf, Option<PathBuf>)> = Vec::with_capacity(staged.len());

        for (index, (temp_path, final_path)) in staged.iter().enumerate() {
            if let Err(err) = self.commit(directory, temp_path, final_path, &mut committed) {
                discard_staged(&staged[index..]);
                roll_back(&committed);
                return Err(err);
            }
        }

        for (final_path, backup) in &committed {
            if let Some(backup) = backup {
                if let Err(err) = fs::remove_file(backup) {
                    warn!("Could not remove backup file {}: {}", backup.display(), err);
                }
            }

            info!("Run file written: {}", final_path.display());
        }

        Ok(self.base_path(directory))
    }

    /// Moves a staged file into place. A run file from an earlier run
    /// is moved aside first so that it can be restored on failure.
    fn commit(
        &self,
        directory: &Path,
        temp_path: &Path,
        final_path: &Path,
        committed: &mut Vec<(PathBuf, Option<PathBuf>)>,
    ) -> Result<(), io::Error> {
        let backup = match final_path.extension() {
            Some(extension) if final_path.is_file() => {
                let backup = directory.join(format!(
                    ".{}.{}.bak",
                    self.title,
                    extension.to_string_lossy()
                ));
                fs::rename(final_path, &backup)?;
                Some(backup)
            }
            _ => None,
        };

        if let Err(err) = fs::rename(temp_path, final_path) {
            if let Some(backup) = &backup {
                restore(backup, final_path);
            }
            return Err(err);
        }

        committed.push((final_path.to_path_buf(), backup));

        Ok(())
    }
}

fn discard_staged(staged: &[(PathBuf, PathBuf)]) {
    for (temp_path, _) in staged {
        if let Err(err) = fs::remove_file(temp_path) {
            warn!(
                "Could not remove temporary file {}: {}",
                temp_path.display(),
                err
            );
        }
    }
}

/// Removes run files already moved into place and brings back
/// the ones they replaced.
fn roll_back(committed: &[(PathBuf, Option<PathBuf>)]) {
    for (final_path, backup) in committed {
        if let Err(err) = fs::remove_file(final_path) {
            warn!("Could not remove run file {}: {}", final_path.display(), err);
        }

        if let Some(backup) = backup {
            restore(backup, final_path);
        }
    }
}

fn restore(backup: &Path, final_path: &Path) {
    if let Err(err) = fs::rename(backup, final_path) {
        warn!(
            "Could not restore {} from {}: {}",
            final_path.display(),
            backup.display(),
            err
        );
    }
}
