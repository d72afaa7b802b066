//! Trend segments: runs of noisy candles with a directional drift.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{CandleSpec, SeriesBuilder};

/// Share of the amplitude added to every body in the trend direction
const DRIFT_FACTOR: f64 = 0.6;
/// Width of the uniform body perturbation, as a share of the amplitude
const NOISE_FACTOR: f64 = 0.8;
/// Wick length on each side, as a share of the amplitude
const WICK_FACTOR: f64 = 0.2;

/// Drift direction of a trend segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bias {
    Up,
    Down,
    Flat,
}

impl Bias {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Bias::Up => 1.0,
            Bias::Down => -1.0,
            Bias::Flat => 0.0,
        }
    }
}

impl<R: Rng + ?Sized> SeriesBuilder<'_, R> {
    /// Append `count` candles drifting in `bias` direction.
    ///
    /// Each body is `sign * 0.6 * amplitude` plus uniform noise in
    /// `[-0.4, 0.4) * amplitude`, with `0.2 * amplitude` wicks on both sides.
    pub fn trend(&mut self, count: usize, bias: Bias, amplitude: f64) {
        let wick = amplitude.abs() * WICK_FACTOR;
        for _ in 0..count {
            let noise = (self.rng.gen::<f64>() - 0.5) * amplitude * NOISE_FACTOR;
            let body = bias.sign() * amplitude * DRIFT_FACTOR + noise;
            self.candle(&CandleSpec::body(body).wicks(wick, wick));
        }
    }
}
