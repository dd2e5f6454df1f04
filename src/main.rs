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

//! ARMS Propagation Toolkit (armsprop) prepares and post-processes
//! underwater acoustic propagation runs of the BELLHOP
//! beam/ray tracing simulator.
//!
//! From a single YAML configuration the toolkit writes the environment
//! file and the sound speed, bathymetry and altimetry tables
//! the simulator reads, runs the simulator as a subprocess
//! and converts its pressure field or ray output into CSV tables
//! ready for plotting.
//!
//! Usage: `armsprop [config.yaml]` or `armsprop --schema`
//! to list the accepted numeric parameters and their bounds.

mod constants;
mod errors;
mod model;

use cap::Cap;
use env_logger::Env;
use log::{error, info};
use std::{alloc, env, path::PathBuf};

type Float = f64;

/// Global allocator used by the toolkit.
///
/// Use of static global allocator allows for capping the memory to the limit set by user
/// in configuration file and in effect provide better [OOM error](https://en.wikipedia.org/wiki/Out_of_memory) handling.
#[global_allocator]
static ALLOCATOR: Cap<alloc::System> = Cap::new(alloc::System, usize::MAX);

/// The main program function.
/// Prepares the runtime environment and calls the [`model::main`].
///
/// To provide meaningful and high-quality error messages the `env_logger`
/// needs to be initiated before any log messages are possible to occur.
fn main() {
    #[cfg(not(feature = "debug"))]
    let logger_env = Env::new().filter_or("ARMSPROP_LOG_LEVEL", "info");

    #[cfg(feature = "debug")]
    let logger_env = Env::new().filter_or("ARMSPROP_LOG_LEVEL", "debug");

    env_logger::Builder::from_env(logger_env)
        .format_timestamp_millis()
        .init();

    let argument = env::args().nth(1);

    if argument.as_deref() == Some("--schema") {
        print!("{}", model::configuration::schema::describe());
        return;
    }

    let config_path = argument.map_or_else(|| PathBuf::from("config.yaml"), PathBuf::from);

    match model::main(&config_path) {
        Ok(_) => info!("Run finished. Check the run and output directories and log."),
        Err(err) => {
            error!("Run failed with error: {}", err);
            std::process::exit(1);
        }
    }
}
