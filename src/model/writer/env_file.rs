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

//! Renderer of the main environment file (`.env`).
//!
//! The simulator reads this file token by token, so the order
//! of lines, quoting and decimal precision are fixed.
//! Comments after `!` are ignored by the simulator.

use super::{Environment, HalfSpaceLayer};
use crate::{constants::COMMENT_GAP, model::configuration::Sampling, Float};
use std::fmt::Write;

/// Shortest representation that reads back to the same value,
/// always with a decimal point (`3500.0`, `-89.0`, `0.25`).
///
/// Very small or large values use a bare exponent (`1e-5`, not `1e-05`),
/// which the simulator's list-directed read accepts as well.
fn repr(value: Float) -> String {
    format!("{:?}", value)
}

fn write_halfspace(out: &mut String, layer: &HalfSpaceLayer, comment: &str) {
    let _ = writeln!(
        out,
        "{:.1}  {:.2}  {:.1}  {:.1}  {:.1} /{}! {}",
        layer.depth,
        layer.compressional_speed,
        layer.shear_speed,
        layer.density,
        layer.attenuation,
        COMMENT_GAP,
        comment
    );
}

fn write_sampling(out: &mut String, sampling: &Sampling, count_comment: &str, comment: &str) {
    let values: Vec<String> = sampling.values.iter().map(|v| format!("{:.1}", v)).collect();

    let _ = writeln!(out, "{}{}! {}", sampling.count, COMMENT_GAP, count_comment);
    let _ = writeln!(out, "{} /{}! {}", values.join(" "), COMMENT_GAP, comment);
    let _ = writeln!(out);
}

pub fn render_env(env: &Environment) -> String {
    let mut out = String::with_capacity(1024 + 24 * env.sound_speed.len());

    // writing into a String cannot fail
    let _ = writeln!(out, "'{}'{}! TITLE", env.title, COMMENT_GAP);
    let _ = writeln!(out, "{}{}! FREQ (Hz)", repr(env.frequency), COMMENT_GAP);
    let _ = writeln!(out, "{}{}! NMEDIA", env.media, COMMENT_GAP);
    let _ = writeln!(out, "'{}'{}! SSPOPT", env.top.code(), COMMENT_GAP);

    if let Some(surface) = &env.surface {
        write_halfspace(
            &mut out,
            surface,
            "Surface depth, compressional speed, shear speed, density, and attenuation",
        );
    }

    let ssp = &env.sound_speed;
    let _ = writeln!(
        out,
        "{}  {:.1}  {:.1}{}! DEPTH of bottom (m)",
        ssp.len(),
        ssp.min_depth(),
        ssp.max_depth(),
        COMMENT_GAP
    );

    for (depth, speed) in ssp.pairs() {
        let _ = writeln!(out, "{:.1}  {:.2}  /", depth, speed);
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "'{}' {}{}! BOTTOM TYPE, roughness",
        env.bottom.code(),
        repr(env.roughness),
        COMMENT_GAP
    );

    if let Some(bottom) = &env.bottom_halfspace {
        write_halfspace(
            &mut out,
            bottom,
            "Bottom depth, compressional speed, shear speed, density, and attenuation",
        );
    }
    let _ = writeln!(out);

    write_sampling(
        &mut out,
        &env.source_depths,
        "NSD: Number of source depths",
        "Source depth (m)",
    );
    write_sampling(
        &mut out,
        &env.receiver_depths,
        "NRD: Number of receiver depths",
        "Receiver depths (m)",
    );
    write_sampling(
        &mut out,
        &env.receiver_ranges,
        "NR: Number of ranges",
        "Range values (km)",
    );

    let _ = writeln!(
        out,
        "'{}'{}! Option: 'R' for ray tracing, 'C' = coherent TL, 'I' = incoherent TL, 'S' = arrivals",
        env.run.code(),
        COMMENT_GAP
    );
    let _ = writeln!(out, "{} {}! Number of beams", env.beams, COMMENT_GAP);
    let _ = writeln!(
        out,
        "{} {} /{}! Launch angles (degrees)",
        repr(env.launch_angles.0),
        repr(env.launch_angles.1),
        COMMENT_GAP
    );
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "{:.1} {:.1} {:.1}{}! Step size (m), Max depth (m), Max range (km)",
        env.step_size, env.max_depth, env.max_range, COMMENT_GAP
    );

    out
}

#[cfg(test)]
mod tests {
    use super::repr;

    #[test]
    fn float_repr() {
        assert_eq!(repr(3500.0), "3500.0");
        assert_eq!(repr(-89.0), "-89.0");
        assert_eq!(repr(0.25), "0.25");
        assert_eq!(repr(10500.5), "10500.5");
        assert_eq!(repr(1e-7), "1e-7");
        assert_eq!(repr(1e20), "1e20");
    }
}
