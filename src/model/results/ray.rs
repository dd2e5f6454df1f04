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

//! Reader of the simulator's text ray file (`.ray`).

use crate::{errors::FormatError, Float};
use log::{debug, warn};
use std::{fs, path::Path, str::FromStr};

/// Single traced ray.
#[derive(Clone, PartialEq, Debug)]
pub struct RayPath {
    /// Launch angle in degrees.
    pub launch_angle: Float,
    pub surface_bounces: u32,
    pub bottom_bounces: u32,
    /// `(range [m], depth [m])` polyline.
    pub points: Vec<(Float, Float)>,
}

/// Every ray stored in a ray file together with its header.
#[derive(Clone, PartialEq, Debug)]
pub struct RayFan {
    pub title: String,
    pub frequency: Float,
    pub source_counts: [usize; 3],
    pub angle_counts: [usize; 2],
    pub surface_depth: Float,
    pub bottom_depth: Float,
    pub rays: Vec<RayPath>,
}

/// Cursor over the non-empty lines of the file, remembering line numbers.
struct Lines<'a> {
    inner: std::iter::Peekable<Box<dyn Iterator<Item = (usize, &'a str)> + 'a>>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        let iter: Box<dyn Iterator<Item = (usize, &'a str)> + 'a> = Box::new(
            text.lines()
                .enumerate()
                .map(|(i, l)| (i + 1, l.trim()))
                .filter(|(_, l)| !l.is_empty()),
        );

        Lines {
            inner: iter.peekable(),
        }
    }

    fn at_end(&mut self) -> bool {
        self.inner.peek().is_none()
    }

    fn next(&mut self, what: &str) -> Result<(usize, &'a str), FormatError> {
        self.inner
            .next()
            .ok_or_else(|| FormatError::Truncated(format!("file ends before {}", what)))
    }

    fn values<T: FromStr>(&mut self, what: &str, count: usize) -> Result<Vec<T>, FormatError> {
        let (line, text) = self.next(what)?;
        let tokens: Vec<&str> = text.split_whitespace().collect();

        if tokens.len() < count {
            return Err(FormatError::WrongTokenCount {
                line,
                expected: count,
                found: tokens.len(),
            });
        }

        tokens[..count]
            .iter()
            .map(|t| {
                t.parse::<T>().map_err(|_| FormatError::BadNumber {
                    line,
                    token: (*t).to_string(),
                })
            })
            .collect()
    }

    fn value<T: FromStr + Copy>(&mut self, what: &str) -> Result<T, FormatError> {
        Ok(self.values::<T>(what, 1)?[0])
    }

    fn quoted(&mut self, what: &str) -> Result<String, FormatError> {
        let (_, text) = self.next(what)?;
        Ok(text.trim_matches(|c: char| c == '\'' || c == '"').trim().to_string())
    }
}

impl RayFan {
    pub fn read(path: &Path) -> Result<Self, FormatError> {
        debug!("Reading rays from {}", path.display());
        let text = fs::read_to_string(path)?;
        RayFan::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let mut lines = Lines::new(text);

        let title = lines.quoted("title")?;
        let frequency = lines.value::<Float>("frequency")?;
        let sources = lines.values::<usize>("source counts", 3)?;
        let angles = lines.values::<usize>("angle counts", 2)?;
        let surface_depth = lines.value::<Float>("surface depth")?;
        let bottom_depth = lines.value::<Float>("bottom depth")?;

        let coordinates = lines.quoted("coordinate type")?;
        if coordinates != "rz" {
            return Err(FormatError::Unsupported(format!(
                "coordinate type '{}', only 'rz' rays are read",
                coordinates
            )));
        }

        let expected = sources[2] * angles[0];
        let mut rays = Vec::with_capacity(expected.min(100_000));

        while rays.len() < expected && !lines.at_end() {
            let launch_angle = lines.value::<Float>("launch angle")?;
            let counts = lines.values::<u32>("ray point count", 3)?;

            let points = (0..counts[0])
                .map(|_| {
                    let pair = lines.values::<Float>("end of ray", 2)?;
                    Ok((pair[0], pair[1]))
                })
                .collect::<Result<Vec<_>, FormatError>>()?;

            rays.push(RayPath {
                launch_angle,
                surface_bounces: counts[1],
                bottom_bounces: counts[2],
                points,
            });
        }

        if rays.len() < expected {
            warn!(
                "Ray file declares {} rays but contains only {}",
                expected,
                rays.len()
            );
        }

        Ok(RayFan {
            title,
            frequency,
            source_counts: [sources[0], sources[1], sources[2]],
            angle_counts: [angles[0], angles[1]],
            surface_depth,
            bottom_depth,
            rays,
        })
    }
}
