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

//! Parsing of the option codes controlling how the
//! simulator reads the environment file.
//!
//! Only the variants for which this toolkit writes all
//! required input are accepted.

use crate::errors::ConfigError;

fn invalid(code: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidOption {
        code: code.to_string(),
        reason,
    }
}

/// Sound speed interpolation in the water column.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SspInterpolation {
    CLinear,
    N2Linear,
    CubicSpline,
    Pchip,
}

/// Condition at the top boundary.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SurfaceCondition {
    Vacuum,
    AcoustoElastic,
    Rigid,
}

/// Units of the attenuation values.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AttenuationUnits {
    NepersPerMeter,
    DbPerKmHz,
    DbPerMeter,
    DbPerWavelength,
    QFactor,
    LossTangent,
}

/// Top option code (`SSPOPT` line of the environment file).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct TopOptions {
    pub interpolation: SspInterpolation,
    pub surface: SurfaceCondition,
    pub units: AttenuationUnits,
    pub thorp_attenuation: bool,
    pub altimetry: bool,
}

impl TopOptions {
    pub fn parse(code: &str) -> Result<Self, ConfigError> {
        let chars: Vec<char> = code.chars().collect();

        if chars.len() < 3 || chars.len() > 5 {
            return Err(invalid(code, "top option must have from 3 to 5 characters"));
        }

        let interpolation = match chars[0] {
            'C' => SspInterpolation::CLinear,
            'N' => SspInterpolation::N2Linear,
            'S' => SspInterpolation::CubicSpline,
            'P' => SspInterpolation::Pchip,
            'Q' | 'H' => {
                return Err(invalid(code, "range-dependent SSP tables are not written"))
            }
            _ => return Err(invalid(code, "unknown SSP interpolation")),
        };

        let surface = match chars[1] {
            'V' => SurfaceCondition::Vacuum,
            'A' => SurfaceCondition::AcoustoElastic,
            'R' => SurfaceCondition::Rigid,
            'F' => return Err(invalid(code, "reflection coefficient files are not written")),
            _ => return Err(invalid(code, "unknown surface condition")),
        };

        let units = match chars[2] {
            'N' => AttenuationUnits::NepersPerMeter,
            'F' => AttenuationUnits::DbPerKmHz,
            'M' => AttenuationUnits::DbPerMeter,
            'W' => AttenuationUnits::DbPerWavelength,
            'Q' => AttenuationUnits::QFactor,
            'L' => AttenuationUnits::LossTangent,
            _ => return Err(invalid(code, "unknown attenuation units")),
        };

        let thorp_attenuation = match chars.get(3) {
            None | Some(' ') => false,
            Some('T') => true,
            Some('F' | 'B') => {
                return Err(invalid(code, "volume attenuation parameters are not written"))
            }
            Some(_) => return Err(invalid(code, "unknown volume attenuation")),
        };

        let altimetry = match chars.get(4) {
            None | Some(' ') => false,
            Some('*' | '~') => true,
            Some(_) => return Err(invalid(code, "unknown altimetry flag")),
        };

        Ok(TopOptions {
            interpolation,
            surface,
            units,
            thorp_attenuation,
            altimetry,
        })
    }

    /// Canonical 5-character code written to the environment file.
    pub fn code(&self) -> String {
        let interpolation = match self.interpolation {
            SspInterpolation::CLinear => 'C',
            SspInterpolation::N2Linear => 'N',
            SspInterpolation::CubicSpline => 'S',
            SspInterpolation::Pchip => 'P',
        };

        let surface = match self.surface {
            SurfaceCondition::Vacuum => 'V',
            SurfaceCondition::AcoustoElastic => 'A',
            SurfaceCondition::Rigid => 'R',
        };

        let units = match self.units {
            AttenuationUnits::NepersPerMeter => 'N',
            AttenuationUnits::DbPerKmHz => 'F',
            AttenuationUnits::DbPerMeter => 'M',
            AttenuationUnits::DbPerWavelength => 'W',
            AttenuationUnits::QFactor => 'Q',
            AttenuationUnits::LossTangent => 'L',
        };

        let volume = if self.thorp_attenuation { 'T' } else { ' ' };
        let altimetry = if self.altimetry { '*' } else { ' ' };

        [interpolation, surface, units, volume, altimetry]
            .iter()
            .collect()
    }
}

/// Kind of the bottom boundary.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BottomType {
    AcoustoElastic,
    Vacuum,
    Rigid,
}

/// Bottom option code (first field of the `BOTTOM TYPE` line).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BottomOptions {
    pub kind: BottomType,
    pub bathymetry: bool,
    code: String,
}

impl BottomOptions {
    pub fn parse(code: &str) -> Result<Self, ConfigError> {
        let chars: Vec<char> = code.chars().collect();

        if chars.is_empty() || chars.len() > 2 {
            return Err(invalid(code, "bottom option must have 1 or 2 characters"));
        }

        let kind = match chars[0] {
            'A' => BottomType::AcoustoElastic,
            'V' => BottomType::Vacuum,
            'R' => BottomType::Rigid,
            'F' | 'G' | 'P' => {
                return Err(invalid(code, "bottom parameters of this type are not written"))
            }
            _ => return Err(invalid(code, "unknown bottom type")),
        };

        // the simulator reads a bathymetry file for both markers
        let bathymetry = match chars.get(1) {
            None | Some(' ' | '-' | '_') => false,
            Some('*' | '~') => true,
            Some(_) => return Err(invalid(code, "unknown bathymetry flag")),
        };

        Ok(BottomOptions {
            kind,
            bathymetry,
            code: code.to_string(),
        })
    }

    /// Code as it was given, written verbatim to the environment file.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// What the simulator writes for a given run type.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ResultKind {
    /// `.ray` file with ray or eigenray paths
    Rays,
    /// `.shd` file with the pressure field
    Pressure,
    /// `.arr` file with arrivals
    Arrivals,
}

/// Run type code (compute mode).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RunOptions {
    pub result: ResultKind,
    pub eigenrays: bool,
    code: String,
}

impl RunOptions {
    pub fn parse(code: &str) -> Result<Self, ConfigError> {
        let first = code
            .chars()
            .next()
            .ok_or_else(|| invalid(code, "run type cannot be empty"))?;

        if code.chars().count() > 7 || code.contains('\'') {
            return Err(invalid(code, "run type must be up to 7 characters without quotes"));
        }

        let result = match first {
            'R' | 'E' => ResultKind::Rays,
            'C' | 'I' | 'S' => ResultKind::Pressure,
            'A' | 'a' => ResultKind::Arrivals,
            _ => return Err(invalid(code, "unknown run type")),
        };

        Ok(RunOptions {
            result,
            eigenrays: first == 'E',
            code: code.to_string(),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Extension of the file the simulator writes for this run type.
    pub fn output_extension(&self) -> &'static str {
        match self.result {
            ResultKind::Rays => "ray",
            ResultKind::Pressure => "shd",
            ResultKind::Arrivals => "arr",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AttenuationUnits, BottomOptions, BottomType, ResultKind, RunOptions, SurfaceCondition,
        TopOptions,
    };
    use crate::errors::ConfigError;

    #[test]
    fn short_top_option_is_padded() {
        let top = TopOptions::parse("CVW").unwrap();

        assert_eq!(top.surface, SurfaceCondition::Vacuum);
        assert_eq!(top.units, AttenuationUnits::DbPerWavelength);
        assert!(!top.altimetry);
        assert_eq!(top.code(), "CVW  ");
    }

    #[test]
    fn full_top_option() {
        let top = TopOptions::parse("SAWT*").unwrap();

        assert_eq!(top.surface, SurfaceCondition::AcoustoElastic);
        assert!(top.thorp_attenuation);
        assert!(top.altimetry);
        assert_eq!(top.code(), "SAWT*");
    }

    #[test]
    fn reject_unsupported_top_options() {
        for code in ["CV", "XVW", "QVW", "CFW", "CVWB", "CVW ?", "CVW  *"] {
            assert!(
                matches!(TopOptions::parse(code), Err(ConfigError::InvalidOption { .. })),
                "{} should be rejected",
                code
            );
        }
    }

    #[test]
    fn bottom_options() {
        let with_file = BottomOptions::parse("A*").unwrap();
        assert_eq!(with_file.kind, BottomType::AcoustoElastic);
        assert!(with_file.bathymetry);
        assert_eq!(with_file.code(), "A*");

        assert!(BottomOptions::parse("A~").unwrap().bathymetry);
        assert!(!BottomOptions::parse("V").unwrap().bathymetry);
        assert!(BottomOptions::parse("A*x").is_err());
        assert!(BottomOptions::parse("G").is_err());
    }

    #[test]
    fn run_types() {
        let eigen = RunOptions::parse("E").unwrap();
        assert_eq!(eigen.result, ResultKind::Rays);
        assert!(eigen.eigenrays);
        assert_eq!(eigen.output_extension(), "ray");

        let coherent = RunOptions::parse("CG").unwrap();
        assert_eq!(coherent.result, ResultKind::Pressure);
        assert_eq!(coherent.output_extension(), "shd");

        assert!(RunOptions::parse("").is_err());
        assert!(RunOptions::parse("X").is_err());
    }
}
