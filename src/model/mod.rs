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

//! Module containing the actual toolkit code.
//!
//! A run goes through four steps: the configuration is read and checked,
//! run files for the simulator are written, the simulator is executed
//! and its result file is read and exported as a table for plotting.

pub mod bathymetry;
pub mod configuration;
pub mod results;
pub mod simulator;
pub mod writer;

#[cfg(all(test, unix))]
mod super_tests;

use crate::{
    errors::ModelError,
    model::{
        bathymetry::profile_along_track,
        configuration::{BathymetrySource, Config, Run},
        results::{export, PressureField, RayFan},
        simulator::{ExternalSimulator, Simulator},
        writer::{
            options::ResultKind,
            profiles::{read_columns, BoundaryProfile},
            Environment,
        },
    },
    ALLOCATOR,
};
use log::{debug, info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Main toolkit function, responsible for all run steps.
///
/// It reads the configuration from `config_path`, writes the run files
/// and, when a simulator is configured, runs it and exports its result.
pub fn main(config_path: &Path) -> Result<(), ModelError> {
    info!("Preparing the run");

    debug!("Reading configuration from {}", config_path.display());
    let config = Config::new_from_file(config_path)?;

    debug!("Setting memory limit");
    if ALLOCATOR
        .set_limit(config.resources.memory.saturating_mul(1024 * 1024))
        .is_err()
    {
        warn!(
            "Cannot set memory limit of {} MB, current usage is already higher",
            config.resources.memory
        );
    }

    prepare_directory(&config.run.directory)?;
    prepare_directory(&config.run.output_directory)?;

    let bathymetry = resolve_bathymetry(&config)?;
    let environment = Environment::new(&config, bathymetry)?;

    info!("Writing run files");
    let base_path = environment.write(&config.run.directory)?;
    info!("Run files written to {}.*", base_path.display());

    export::save_environment(&environment, &config.run.output_directory)?;

    match &config.simulator {
        Some(simulator) => {
            let simulator = ExternalSimulator::from_config(simulator);
            run_and_export(&simulator, &environment, &config.run)?;
        }
        None => info!("No simulator configured, run files are ready to be simulated"),
    }

    Ok(())
}

/// Executes the simulator on written run files, then reads
/// and exports its result.
///
/// Returns the path of the exported table, if the result kind is exported.
pub fn run_and_export<S: Simulator>(
    simulator: &S,
    environment: &Environment,
    run: &Run,
) -> Result<Option<PathBuf>, ModelError> {
    let base_path = environment.base_path(&run.directory);
    let result_path =
        environment.file_path(&run.directory, environment.run.output_extension());

    // a result left by an earlier run must not pass for this one
    if result_path.is_file() {
        debug!("Removing stale result {}", result_path.display());
        fs::remove_file(&result_path)?;
    }

    info!("Running the simulator");
    let report = simulator.run(&base_path)?;
    info!(
        "Simulator finished in {:.1} s",
        report.elapsed.as_secs_f64()
    );

    if !result_path.is_file() {
        return Err(ModelError::MissingOutput(result_path));
    }

    let exported = match environment.run.result {
        ResultKind::Pressure => {
            let field = PressureField::read(&result_path, environment.frequency)?;
            Some(export::save_transmission_loss(
                &field,
                &environment.title,
                &run.output_directory,
            )?)
        }
        ResultKind::Rays => {
            let fan = RayFan::read(&result_path)?;
            Some(export::save_rays(
                &fan,
                &environment.title,
                &run.output_directory,
            )?)
        }
        ResultKind::Arrivals => {
            warn!(
                "Arrivals are not exported, raw result is left at {}",
                result_path.display()
            );
            None
        }
    };

    Ok(exported)
}

/// Resolves the bathymetry profile from whichever source is configured.
fn resolve_bathymetry(config: &Config) -> Result<Option<BoundaryProfile>, ModelError> {
    let bathymetry = match &config.bathymetry {
        Some(bathymetry) => bathymetry,
        None => return Ok(None),
    };

    let profile = match &bathymetry.source {
        BathymetrySource::Inline { ranges, depths } => BoundaryProfile::bathymetry(
            bathymetry.interpolation,
            ranges.clone(),
            depths.clone(),
        )?,
        BathymetrySource::Table { path } => {
            debug!("Reading bathymetry table from {}", path.display());
            let (ranges, depths) = read_columns(path)?;
            BoundaryProfile::bathymetry(bathymetry.interpolation, ranges, depths)?
        }
        BathymetrySource::Track {
            dataset,
            start,
            end,
            points,
        } => {
            info!("Extracting bathymetry along the track from {}", dataset.display());
            profile_along_track(dataset, *start, *end, *points, bathymetry.interpolation)?
        }
    };

    Ok(Some(profile))
}

/// Makes sure that `path` is a usable directory, creating it when missing.
fn prepare_directory(path: &Path) -> Result<(), ModelError> {
    if path.is_dir() {
        debug!("Directory {} exists", path.display());
    } else if path.exists() {
        return Err(ModelError::FaultyOutput(
            "Run or output directory path exists but is not a directory",
        ));
    } else {
        debug!("Directory {} does not exist so creating a new one", path.display());
        fs::create_dir_all(path)?;
    }

    Ok(())
}
