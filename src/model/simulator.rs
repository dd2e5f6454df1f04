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

//! Port to the external propagation simulator.
//!
//! The simulator is an opaque executable called as
//! `<executable> -2D <base path>`. Its exit status and output
//! are always checked, and a run exceeding the configured
//! time limit is killed.

use crate::{
    constants::{SIMULATOR_MODE_FLAG, SIMULATOR_POLL_MS},
    errors::SubprocessError,
    model::configuration,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// Outcome of a finished simulator run.
#[derive(Clone, Debug)]
pub struct SimulatorReport {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Anything able to run a simulation for the run files at `base_path`.
pub trait Simulator {
    fn run(&self, base_path: &Path) -> Result<SimulatorReport, SubprocessError>;
}

/// Simulator executed as a child process.
#[derive(Clone, PartialEq, Debug)]
pub struct ExternalSimulator {
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl ExternalSimulator {
    pub fn new(executable: PathBuf, timeout: Option<Duration>) -> Self {
        ExternalSimulator {
            executable,
            timeout,
        }
    }

    pub fn from_config(config: &configuration::Simulator) -> Self {
        ExternalSimulator::new(
            config.executable.clone(),
            config.timeout.map(Duration::from_secs),
        )
    }

    fn command(&self, base_path: &Path) -> Command {
        let mut command = Command::new(&self.executable);

        command
            .arg(SIMULATOR_MODE_FLAG)
            .arg(base_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        command
    }
}

impl Simulator for ExternalSimulator {
    fn run(&self, base_path: &Path) -> Result<SimulatorReport, SubprocessError> {
        debug!(
            "Launching {} {} {}",
            self.executable.display(),
            SIMULATOR_MODE_FLAG,
            base_path.display()
        );

        let started = Instant::now();
        let mut child =
            self.command(base_path)
                .spawn()
                .map_err(|source| SubprocessError::Launch {
                    program: self.executable.clone(),
                    source,
                })?;

        // pipes are drained on their own threads so a chatty
        // simulator never blocks on a full pipe buffer
        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner().template("{spinner} [{elapsed_precise}] {msg}"),
        );
        spinner.set_message(format!("Running {}", self.executable.display()));

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }

            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    spinner.abandon_with_message("Simulator killed after exceeding time limit");

                    // readers are left detached, grandchildren may still hold the pipes
                    return Err(SubprocessError::TimedOut(timeout.as_secs()));
                }
            }

            spinner.tick();
            thread::sleep(Duration::from_millis(SIMULATOR_POLL_MS));
        };

        spinner.finish_and_clear();

        let stdout = collect(stdout_reader);
        let stderr = collect(stderr_reader);

        if !stdout.trim().is_empty() {
            debug!("Simulator output:\n{}", stdout.trim_end());
        }

        if !status.success() {
            let stderr = last_lines(&stderr);

            return Err(match status.code() {
                Some(code) => SubprocessError::NonZeroExit { code, stderr },
                None => SubprocessError::Terminated { stderr },
            });
        }

        if !stderr.trim().is_empty() {
            warn!("Simulator reported on stderr: {}", last_lines(&stderr));
        }

        Ok(SimulatorReport {
            status,
            stdout,
            stderr,
            elapsed: started.elapsed(),
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = vec![];
            let _ = pipe.read_to_end(&mut buffer);
            String::from_utf8_lossy(&buffer).into_owned()
        })
    })
}

fn collect(reader: Option<JoinHandle<String>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// Keeps the tail of the simulator's error output for error messages.
fn last_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let tail = &lines[lines.len().saturating_sub(5)..];

    if tail.is_empty() {
        "no error output".to_string()
    } else {
        tail.join(" | ")
    }
}
