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

//! Reader of the simulator's binary pressure field (`.shd`).
//!
//! The file is a sequence of fixed-length little-endian records.
//! The first `i32` stores the record length in 4-byte words,
//! record `n` starts at byte `n * 4 * recl`. Records 0 to 9 hold
//! the header and grids, then every (frequency, bearing, source depth,
//! receiver) combination has one record of complex samples over range.

use crate::{
    constants::{MAX_TRANSMISSION_LOSS, SHD_HEADER_RECORDS, SHD_PLOT_TYPE_LEN, SHD_TITLE_LEN},
    errors::FormatError,
    Float,
};
use log::debug;
use ndarray::Array4;
use num_complex::Complex32;
use std::{fs, path::Path};

const WORD: usize = 4;
const DIMENSION_COUNT: usize = 7;

/// Pressure field at a single frequency.
///
/// `pressure` is indexed `[bearing, source depth, receiver, range]`.
/// For irregular grids the receiver axis has length one and each
/// range sample carries its own receiver depth.
#[derive(Clone, Debug)]
pub struct PressureField {
    pub title: String,
    pub plot_type: String,
    pub frequency: Float,
    pub frequencies: Vec<Float>,
    pub attenuation: Float,
    pub bearings: Vec<Float>,
    pub source_x: Vec<Float>,
    pub source_y: Vec<Float>,
    pub source_depths: Vec<f32>,
    pub receiver_depths: Vec<f32>,
    pub receiver_ranges: Vec<Float>,
    pub pressure: Array4<Complex32>,
}

struct Records<'a> {
    bytes: &'a [u8],
    length: usize,
}

impl<'a> Records<'a> {
    fn new(bytes: &'a [u8]) -> Result<Self, FormatError> {
        if bytes.len() < WORD {
            return Err(FormatError::Truncated(
                "file is shorter than the record length field".to_string(),
            ));
        }

        let recl = read_i32s(&bytes[..WORD])[0];
        let length = usize::try_from(recl)
            .ok()
            .filter(|&l| l > 0)
            .map(|l| l * WORD)
            .ok_or_else(|| {
                FormatError::InconsistentDimensions(format!("record length {}", recl))
            })?;

        Ok(Records { bytes, length })
    }

    /// First `size` bytes of record `index`.
    fn get(&self, index: usize, size: usize) -> Result<&'a [u8], FormatError> {
        if size > self.length {
            return Err(FormatError::InconsistentDimensions(format!(
                "record {} needs {} bytes but records are {} bytes long",
                index, size, self.length
            )));
        }

        let start = index
            .checked_mul(self.length)
            .ok_or_else(|| FormatError::InconsistentDimensions(format!("record {}", index)))?;

        start
            .checked_add(size)
            .and_then(|end| self.bytes.get(start..end))
            .ok_or_else(|| {
                FormatError::Truncated(format!(
                    "record {} ends past the end of file ({} bytes)",
                    index,
                    self.bytes.len()
                ))
            })
    }
}

fn read_i32s(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(WORD)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn read_f32s(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(WORD)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn read_f64s(bytes: &[u8]) -> Vec<Float> {
    bytes
        .chunks_exact(2 * WORD)
        .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect()
}

fn read_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(|c: char| c == ' ' || c == '\0')
        .to_string()
}

fn dimension(name: &str, value: i32) -> Result<usize, FormatError> {
    usize::try_from(value)
        .ok()
        .filter(|&v| v > 0)
        .ok_or_else(|| FormatError::InconsistentDimensions(format!("{} = {}", name, value)))
}

/// Index of the value closest to `target`.
fn nearest(values: &[Float], target: Float) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - target).abs().total_cmp(&(*b - target).abs()))
        .map_or(0, |(i, _)| i)
}

impl PressureField {
    pub fn read(path: &Path, frequency: Float) -> Result<Self, FormatError> {
        debug!("Reading pressure field from {}", path.display());
        let bytes = fs::read(path)?;
        PressureField::from_bytes(&bytes, frequency)
    }

    /// Decodes the field at the stored frequency nearest to `frequency`.
    pub fn from_bytes(bytes: &[u8], frequency: Float) -> Result<Self, FormatError> {
        let records = Records::new(bytes)?;

        let title = read_text(&records.get(0, WORD + SHD_TITLE_LEN)?[WORD..]);
        let plot_type = read_text(records.get(1, SHD_PLOT_TYPE_LEN)?);

        let dims_record = records.get(2, DIMENSION_COUNT * WORD + 4 * WORD)?;
        let dims = read_i32s(&dims_record[..DIMENSION_COUNT * WORD]);
        let scalars = read_f64s(&dims_record[DIMENSION_COUNT * WORD..]);

        let n_freq = dimension("Nfreq", dims[0])?;
        let n_theta = dimension("Ntheta", dims[1])?;
        let n_sx = dimension("Nsx", dims[2])?;
        let n_sy = dimension("Nsy", dims[3])?;
        let n_sz = dimension("Nsz", dims[4])?;
        let n_rz = dimension("Nrz", dims[5])?;
        let n_rr = dimension("Nrr", dims[6])?;

        let frequencies = read_f64s(records.get(3, n_freq * 2 * WORD)?);
        let bearings = read_f64s(records.get(4, n_theta * 2 * WORD)?);
        let source_x = read_f64s(records.get(5, n_sx * 2 * WORD)?);
        let source_y = read_f64s(records.get(6, n_sy * 2 * WORD)?);
        let source_depths = read_f32s(records.get(7, n_sz * WORD)?);
        let receiver_depths = read_f32s(records.get(8, n_rz * WORD)?);
        let receiver_ranges = read_f64s(records.get(9, n_rr * 2 * WORD)?);

        let n_rcv = if plot_type.starts_with("irregular") {
            1
        } else {
            n_rz
        };

        let i_freq = nearest(&frequencies, frequency);
        debug!(
            "Selected frequency {} Hz (index {}) for requested {} Hz",
            frequencies[i_freq], i_freq, frequency
        );

        let per_frequency = n_theta
            .checked_mul(n_sz)
            .and_then(|n| n.checked_mul(n_rcv))
            .ok_or_else(|| {
                FormatError::InconsistentDimensions("too many pressure records".to_string())
            })?;
        let total = n_freq
            .checked_mul(per_frequency)
            .map(|n| n + SHD_HEADER_RECORDS)
            .ok_or_else(|| {
                FormatError::InconsistentDimensions("too many pressure records".to_string())
            })?;

        // every declared record must exist, checked before allocating
        records.get(total - 1, n_rr * 2 * WORD)?;

        let first = SHD_HEADER_RECORDS + i_freq * per_frequency;

        let mut samples = Vec::with_capacity(per_frequency * n_rr);
        for offset in 0..per_frequency {
            let record = records.get(first + offset, n_rr * 2 * WORD)?;
            samples.extend(
                read_f32s(record)
                    .chunks_exact(2)
                    .map(|pair| Complex32::new(pair[0], pair[1])),
            );
        }

        let pressure = Array4::from_shape_vec((n_theta, n_sz, n_rcv, n_rr), samples)
            .map_err(|e| FormatError::InconsistentDimensions(e.to_string()))?;

        Ok(PressureField {
            title,
            plot_type,
            frequency: frequencies[i_freq],
            frequencies,
            attenuation: scalars[1],
            bearings,
            source_x,
            source_y,
            source_depths,
            receiver_depths,
            receiver_ranges,
            pressure,
        })
    }

    /// Transmission loss in dB, `-20 log10 |p|`.
    /// Zero pressure maps to the largest reported loss.
    pub fn transmission_loss(&self) -> Array4<Float> {
        self.pressure.mapv(|p| {
            let magnitude = Float::from(p.norm());
            if magnitude > 0.0 {
                (-20.0 * magnitude.log10()).min(MAX_TRANSMISSION_LOSS)
            } else {
                MAX_TRANSMISSION_LOSS
            }
        })
    }

    /// Level relative to the strongest sample, `10 log10(|p| / max|p|)`.
    pub fn relative_level(&self) -> Array4<Float> {
        let peak = self
            .pressure
            .iter()
            .map(|p| Float::from(p.norm()))
            .fold(0.0, Float::max);

        self.pressure.mapv(|p| {
            let magnitude = Float::from(p.norm());
            if magnitude > 0.0 && peak > 0.0 {
                (10.0 * (magnitude / peak).log10()).max(-MAX_TRANSMISSION_LOSS)
            } else {
                -MAX_TRANSMISSION_LOSS
            }
        })
    }
}
