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

//! Tabular export of simulator results for plotting.

use super::{PressureField, RayFan};
use crate::{errors::ModelError, model::writer::Environment, Float};
use log::info;
use std::path::{Path, PathBuf};

/// Writes the environment of the run next to its results so it can be
/// drawn under the rays or the TL field: `<title>_ssp.csv` always,
/// `<title>_bathymetry.csv` and `<title>_altimetry.csv` when present.
pub fn save_environment(
    environment: &Environment,
    directory: &Path,
) -> Result<Vec<PathBuf>, ModelError> {
    let title = &environment.title;

    let mut saved = vec![save_pairs(
        directory.join(format!("{}_ssp.csv", title)),
        ["depth", "soundSpeed"],
        environment.sound_speed.pairs(),
    )?];

    if let Some(bathymetry) = &environment.bathymetry {
        saved.push(save_pairs(
            directory.join(format!("{}_bathymetry.csv", title)),
            ["rangeKm", "depth"],
            bathymetry.pairs(),
        )?);
    }

    if let Some(altimetry) = &environment.altimetry {
        saved.push(save_pairs(
            directory.join(format!("{}_altimetry.csv", title)),
            ["rangeKm", "height"],
            altimetry.pairs(),
        )?);
    }

    info!("Run environment saved to {}", directory.display());

    Ok(saved)
}

fn save_pairs(
    out_path: PathBuf,
    header: [&str; 2],
    pairs: impl Iterator<Item = (Float, Float)>,
) -> Result<PathBuf, ModelError> {
    let mut out_file = csv::Writer::from_path(&out_path)?;

    out_file.write_record(&header)?;
    for (x, y) in pairs {
        out_file.write_record(&[x.to_string(), y.to_string()])?;
    }

    out_file.flush()?;

    Ok(out_path)
}

/// Writes `<title>_tl.csv` with one row per field sample.
/// Ranges are converted to kilometres.
pub fn save_transmission_loss(
    field: &PressureField,
    title: &str,
    directory: &Path,
) -> Result<PathBuf, ModelError> {
    let out_path = directory.join(format!("{}_tl.csv", title));
    let mut out_file = csv::Writer::from_path(&out_path)?;

    out_file.write_record(&[
        "frequency",
        "bearing",
        "sourceDepth",
        "receiverDepth",
        "rangeKm",
        "transmissionLoss",
        "relativeLevel",
    ])?;

    let loss = field.transmission_loss();
    let level = field.relative_level();
    let irregular = field.pressure.shape()[2] == 1 && field.receiver_depths.len() > 1;

    for ((itheta, isz, ircv, irr), tl) in loss.indexed_iter() {
        let receiver_depth = if irregular {
            field.receiver_depths.get(irr)
        } else {
            field.receiver_depths.get(ircv)
        };

        out_file.write_record(&[
            field.frequency.to_string(),
            field.bearings[itheta].to_string(),
            field.source_depths[isz].to_string(),
            receiver_depth.map_or_else(String::new, |z| z.to_string()),
            (field.receiver_ranges[irr] / 1000.0).to_string(),
            format!("{:.2}", tl),
            format!("{:.2}", level[[itheta, isz, ircv, irr]]),
        ])?;
    }

    out_file.flush()?;
    info!("Transmission loss saved to {}", out_path.display());

    Ok(out_path)
}

/// Writes `<title>_rays.csv`, the points of every ray in launch order.
pub fn save_rays(fan: &RayFan, title: &str, directory: &Path) -> Result<PathBuf, ModelError> {
    let out_path = directory.join(format!("{}_rays.csv", title));
    let mut out_file = csv::Writer::from_path(&out_path)?;

    out_file.write_record(&[
        "ray",
        "launchAngle",
        "surfaceBounces",
        "bottomBounces",
        "rangeKm",
        "depth",
    ])?;

    for (i, ray) in fan.rays.iter().enumerate() {
        for (range, depth) in &ray.points {
            out_file.write_record(&[
                i.to_string(),
                ray.launch_angle.to_string(),
                ray.surface_bounces.to_string(),
                ray.bottom_bounces.to_string(),
                (range / 1000.0).to_string(),
                depth.to_string(),
            ])?;
        }
    }

    out_file.flush()?;
    info!(
        "{} rays saved to {}",
        fan.rays.len(),
        out_path.display()
    );

    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::{save_environment, save_rays, save_transmission_loss};
    use crate::model::{
        configuration::{tests::TL_CONFIG, Config, PairInterpolation},
        results::{ray::tests::ray_file, shd::tests::synthetic_shd, PressureField, RayFan},
        writer::{profiles::BoundaryProfile, Environment},
    };
    use std::fs;

    #[test]
    fn environment_tables() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new_from_slice(TL_CONFIG.as_bytes()).unwrap();
        let bathymetry = BoundaryProfile::bathymetry(
            PairInterpolation::Linear,
            vec![0.0, 2.5, 5.0],
            vec![120.0, 180.5, 150.0],
        )
        .unwrap();
        let environment = Environment::new(&config, Some(bathymetry)).unwrap();

        let saved = save_environment(&environment, dir.path()).unwrap();

        assert_eq!(saved.len(), 2);
        assert!(!dir.path().join("arms_1_tl_altimetry.csv").exists());

        let ssp = fs::read_to_string(dir.path().join("arms_1_tl_ssp.csv")).unwrap();
        assert_eq!(
            ssp.lines().collect::<Vec<_>>(),
            vec!["depth,soundSpeed", "0,1490", "50,1485.5", "200,1500"]
        );

        let bty = fs::read_to_string(dir.path().join("arms_1_tl_bathymetry.csv")).unwrap();
        assert_eq!(
            bty.lines().collect::<Vec<_>>(),
            vec!["rangeKm,depth", "0,120", "2.5,180.5", "5,150"]
        );
    }

    #[test]
    fn transmission_loss_table() {
        let dir = tempfile::tempdir().unwrap();
        let field = PressureField::from_bytes(
            &synthetic_shd("rectilin", &[3500.0], &[20.0], &[10.0, 20.0], &[0.0, 2500.0]),
            3500.0,
        )
        .unwrap();

        let path = save_transmission_loss(&field, "arms_1_tl", dir.path()).unwrap();
        assert!(path.ends_with("arms_1_tl_tl.csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[3][3], "20");
        assert_eq!(&rows[3][4], "2.5");
        // sample 11 - 11i
        assert_eq!(&rows[3][5], "-23.84");
        assert_eq!(&rows[3][6], "0.00");
    }

    #[test]
    fn ray_table() {
        let dir = tempfile::tempdir().unwrap();
        let fan = RayFan::parse(&ray_file(&[3, 2], 2)).unwrap();

        let path = save_rays(&fan, "shot_1_ray", dir.path()).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "ray,launchAngle,surfaceBounces,bottomBounces,rangeKm,depth");
        assert_eq!(lines[5], "1,0,1,2,0.1,21");
    }
}
