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

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Error in run configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Error while extracting bathymetry: {0}")]
    Bathymetry(#[from] BathymetryError),

    #[error("Error while running the simulator: {0}")]
    Subprocess(#[from] SubprocessError),

    #[error("Error while reading simulator output: {0}")]
    Format(#[from] FormatError),

    #[error("Simulator finished but did not produce {0}, check its .prt log")]
    MissingOutput(PathBuf),

    #[error("Problem with run or output directory: {0}")]
    FaultyOutput(&'static str),

    #[error("Error while writing output table: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot open config file: {0}")]
    CantOpenFile(#[from] std::io::Error),

    #[error("Cannot deserialize config file: {0}")]
    CantDeserialize(#[from] serde_yaml::Error),

    #[error("Cannot read profile table: {0}")]
    CantReadTable(#[from] csv::Error),

    #[error("Configuration component is out of bounds: {0}")]
    OutOfBounds(String),

    #[error("{what} have mismatched lengths ({left} vs {right})")]
    LengthMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{0} must be strictly increasing")]
    NotIncreasing(&'static str),

    #[error("{0} contains a non-finite value")]
    NonFinite(&'static str),

    #[error("Declared count of {what} ({declared}) is smaller than the {listed} listed values")]
    CountTooSmall {
        what: &'static str,
        declared: usize,
        listed: usize,
    },

    #[error("Invalid option code '{code}': {reason}")]
    InvalidOption { code: String, reason: &'static str },

    #[error("Option code requests {0} but no such profile was provided")]
    MissingProfile(&'static str),
}

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Cannot read result file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Result file is truncated: {0}")]
    Truncated(String),

    #[error("Declared dimensions are inconsistent: {0}")]
    InconsistentDimensions(String),

    #[error("Line {line}: cannot parse '{token}' as a number")]
    BadNumber { line: usize, token: String },

    #[error("Line {line}: expected {expected} values, found {found}")]
    WrongTokenCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported content: {0}")]
    Unsupported(String),
}

#[derive(Error, Debug)]
pub enum SubprocessError {
    #[error("Cannot launch {program}: {source}")]
    Launch {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("Simulator exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Simulator was terminated by a signal: {stderr}")]
    Terminated { stderr: String },

    #[error("Simulator did not finish within {0} s and was killed")]
    TimedOut(u64),

    #[error("Lost contact with simulator process: {0}")]
    Wait(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum BathymetryError {
    #[error("Cannot read bathymetry dataset: {0}")]
    CantRead(#[from] csv::Error),

    #[error("Bathymetry dataset contains no usable rows")]
    EmptyDataset,

    #[error("Bathymetry grid needs at least two distinct latitudes and longitudes")]
    DegenerateGrid,

    #[error("Track point ({lon:.4}, {lat:.4}) lies outside of the bathymetry grid")]
    OutsideGrid { lon: f64, lat: f64 },

    #[error("Incorrect track parameters: {0}")]
    IncorrectTrack(&'static str),

    #[error("Error while searching the grid axis: {0}")]
    Search(#[from] SearchError),
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Searched array is empty")]
    EmptyArray,

    #[error("Searched value is out of array bounds")]
    OutOfBounds,
}
