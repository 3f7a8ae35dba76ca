//! Splitting speed multipliers into chains ffmpeg's `atempo` accepts.
//!
//! `atempo` only takes factors in `[0.5, 2.0]`, so larger or smaller changes
//! are expressed as several filters whose product is the requested speed.
//! See <https://trac.ffmpeg.org/wiki/How%20to%20speed%20up%20/%20slow%20down%20a%20video>

const MAX_TEMPO: f64 = 2.0;
const MIN_TEMPO: f64 = 0.5;

/// Decompose `speed` (> 0) into native tempo factors.
pub fn decompose(speed: f64) -> Vec<f64> {
    if speed > MAX_TEMPO {
        speed_up(speed)
    } else if speed < MIN_TEMPO {
        slow_down(speed)
    } else {
        vec![speed]
    }
}

fn speed_up(mut speed: f64) -> Vec<f64> {
    let mut steps = Vec::new();
    while speed > MAX_TEMPO {
        speed /= MAX_TEMPO;
        steps.push(MAX_TEMPO);
    }
    steps.push(speed);
    steps
}

fn slow_down(mut speed: f64) -> Vec<f64> {
    let mut steps = Vec::new();
    while speed < MIN_TEMPO {
        speed /= MIN_TEMPO;
        steps.push(MIN_TEMPO);
    }
    steps.push(speed);
    steps
}
