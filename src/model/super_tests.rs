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

//! This is a module for integration tests of the toolkit,
//! but with access to private fields and methods.
//!
//! Running the real simulator is not possible in tests, so these
//! "super-unit-tests" drive whole runs with stand-in simulators
//! that write result files the way the simulator does.

use crate::{
    errors::{ModelError, SubprocessError},
    model::{
        configuration::{tests::TL_CONFIG, Config},
        results::{ray::tests::ray_file, shd::tests::synthetic_shd},
        run_and_export,
        simulator::{Simulator, SimulatorReport},
        writer::Environment,
    },
};
use std::{
    fs,
    os::unix::process::ExitStatusExt,
    path::{Path, PathBuf},
    process::ExitStatus,
    time::Duration,
};

/// Stand-in simulator writing `contents` into `<base>.<extension>`.
struct FakeSimulator {
    extension: &'static str,
    contents: Option<Vec<u8>>,
    exit_code: i32,
}

impl Simulator for FakeSimulator {
    fn run(&self, base_path: &Path) -> Result<SimulatorReport, SubprocessError> {
        if self.exit_code != 0 {
            return Err(SubprocessError::NonZeroExit {
                code: self.exit_code,
                stderr: "ENVFile ended early".to_string(),
            });
        }

        if let Some(contents) = &self.contents {
            let path = PathBuf::from(format!("{}.{}", base_path.display(), self.extension));
            fs::write(path, contents).map_err(SubprocessError::Wait)?;
        }

        Ok(SimulatorReport {
            status: ExitStatus::from_raw(0),
            stdout: String::new(),
            stderr: String::new(),
            elapsed: Duration::from_millis(5),
        })
    }
}

/// Eigenray run writing into `root`.
fn eigenray_config(root: &Path) -> String {
    format!(
        r#"
run:
  title: shot_1_ray
  directory: '{run}'
  output_directory: '{out}'
acoustics:
  frequency: 3500.0
  top_options: CVWT
  run_type: E
  beams: 1001
  launch_angles: [-89.0, 89.0]
  step_size: 10.0
bottom:
  options: "A*"
  halfspace:
    compressional_speed: 1600.0
    density: 1.8
geometry:
  source_depths: {{ count: 1, values: [20.0] }}
  receiver_depths: {{ count: 1, values: [20.0] }}
  receiver_ranges: {{ count: 1, values: [0.0] }}
sound_speed:
  depths: [0.0, 100.0, 200.0]
  speeds: [1490.0, 1485.0, 1500.0]
bathymetry:
  source:
    inline:
      ranges: [0.0, 1.0, 2.5]
      depths: [150.0, 196.4, 180.0]
"#,
        run = root.join("runs").display(),
        out = root.join("output").display()
    )
}

fn prepare(yaml: &str) -> (Config, Environment) {
    let config = Config::new_from_slice(yaml.as_bytes()).unwrap();
    let environment = super::resolve_bathymetry(&config)
        .and_then(|bathymetry| Ok(Environment::new(&config, bathymetry)?))
        .unwrap();

    super::prepare_directory(&config.run.directory).unwrap();
    super::prepare_directory(&config.run.output_directory).unwrap();
    environment.write(&config.run.directory).unwrap();

    (config, environment)
}

#[test]
fn writes_run_files_without_simulator() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, eigenray_config(dir.path())).unwrap();

    super::main(&config_path).unwrap();

    let run_dir = dir.path().join("runs");
    let env = fs::read_to_string(run_dir.join("shot_1_ray.env")).unwrap();
    let lines: Vec<&str> = env.lines().collect();

    assert_eq!(lines[3], "'CVWT '\t\t\t! SSPOPT");
    assert_eq!(lines[12], "1\t\t\t! NSD: Number of source depths");
    assert_eq!(lines[13], "20.0 /\t\t\t! Source depth (m)");
    assert_eq!(lines[16], "20.0 /\t\t\t! Receiver depths (m)");
    assert_eq!(lines[19], "0.0 /\t\t\t! Range values (km)");

    assert!(run_dir.join("shot_1_ray.ssp").is_file());
    assert!(run_dir.join("shot_1_ray.bty").is_file());
    assert!(!run_dir.join("shot_1_ray.ati").exists());
    assert!(dir
        .path()
        .join("output")
        .join("shot_1_ray_bathymetry.csv")
        .is_file());
    assert!(dir.path().join("output").join("shot_1_ray_ssp.csv").is_file());
}

#[test]
fn invalid_config_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    let yaml = eigenray_config(dir.path()).replace(
        "speeds: [1490.0, 1485.0, 1500.0]",
        "speeds: [1490.0, 1485.0]",
    );
    fs::write(&config_path, yaml).unwrap();

    let result = super::main(&config_path);

    assert!(matches!(result, Err(ModelError::Config(_))));
    assert!(!dir.path().join("runs").join("shot_1_ray.env").exists());
}

#[test]
fn eigenray_run_is_exported() {
    let dir = tempfile::tempdir().unwrap();
    let (config, environment) = prepare(&eigenray_config(dir.path()));

    let simulator = FakeSimulator {
        extension: "ray",
        contents: Some(ray_file(&[10, 5, 8], 3).into_bytes()),
        exit_code: 0,
    };

    let exported = run_and_export(&simulator, &environment, &config.run)
        .unwrap()
        .unwrap();

    assert_eq!(exported, dir.path().join("output").join("shot_1_ray_rays.csv"));
    let table = fs::read_to_string(exported).unwrap();
    assert_eq!(table.lines().count(), 1 + 10 + 5 + 8);
}

#[test]
fn pressure_run_is_exported() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = TL_CONFIG
        .replace(
            "directory: ./runs/",
            &format!(
                "directory: '{}'\n  output_directory: '{}'",
                dir.path().join("runs").display(),
                dir.path().join("output").display()
            ),
        );
    let (config, environment) = prepare(&yaml);

    let simulator = FakeSimulator {
        extension: "shd",
        contents: Some(synthetic_shd(
            "rectilin",
            &[10500.0],
            &[20.0],
            &[0.0, 100.0, 200.0],
            &[0.0, 2500.0, 5000.0],
        )),
        exit_code: 0,
    };

    let exported = run_and_export(&simulator, &environment, &config.run)
        .unwrap()
        .unwrap();

    let mut reader = csv::Reader::from_path(&exported).unwrap();
    assert_eq!(reader.records().count(), 9);
}

#[test]
fn missing_result_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (config, environment) = prepare(&eigenray_config(dir.path()));

    let simulator = FakeSimulator {
        extension: "ray",
        contents: None,
        exit_code: 0,
    };

    let result = run_and_export(&simulator, &environment, &config.run);

    match result {
        Err(ModelError::MissingOutput(path)) => assert!(path.ends_with("shot_1_ray.ray")),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn simulator_failure_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let (config, environment) = prepare(&eigenray_config(dir.path()));

    let simulator = FakeSimulator {
        extension: "ray",
        contents: Some(ray_file(&[3], 1).into_bytes()),
        exit_code: 2,
    };

    let result = run_and_export(&simulator, &environment, &config.run);

    assert!(matches!(
        result,
        Err(ModelError::Subprocess(SubprocessError::NonZeroExit { code: 2, .. }))
    ));
    assert!(!dir.path().join("output").join("shot_1_ray_rays.csv").exists());
}

#[test]
fn malformed_result_is_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let (config, environment) = prepare(&eigenray_config(dir.path()));

    let mut truncated = ray_file(&[10, 5], 2);
    truncated.truncate(truncated.len() - 30);

    let simulator = FakeSimulator {
        extension: "ray",
        contents: Some(truncated.into_bytes()),
        exit_code: 0,
    };

    assert!(matches!(
        run_and_export(&simulator, &environment, &config.run),
        Err(ModelError::Format(_))
    ));
}

#[test]
fn stale_result_is_not_reused() {
    let dir = tempfile::tempdir().unwrap();
    let (config, environment) = prepare(&eigenray_config(dir.path()));
    fs::write(
        dir.path().join("runs").join("shot_1_ray.ray"),
        ray_file(&[3], 1),
    )
    .unwrap();

    let simulator = FakeSimulator {
        extension: "ray",
        contents: None,
        exit_code: 0,
    };

    assert!(matches!(
        run_and_export(&simulator, &environment, &config.run),
        Err(ModelError::MissingOutput(_))
    ));
}
