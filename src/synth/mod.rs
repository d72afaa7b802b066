//! Synthetic OHLCV series
//!
//! A [`Series`] only grows through a [`SeriesBuilder`], which owns the
//! append-only bar buffer during one generation run:
//!
//! - [`SeriesBuilder::candle`] appends one engineered bar (see [`CandleSpec`])
//! - [`SeriesBuilder::trend`] appends a noisy directional run (see [`Bias`])
//!
//! Every bar is derived from its predecessors only; indicator overlays (EMA and a
//! constant-width band) are computed at append time and never revisited.

mod candle;
mod trend;

pub use candle::CandleSpec;
pub use trend::Bias;

use std::ops::{Index, Range};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SynthConfig;
use crate::{Direction, OHLCVExt, Result, SimError, OHLCV};

// ============================================================
// BAR
// ============================================================

/// One synthetic OHLCV sample with its overlays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub index: usize,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Exponential moving average of closes
    pub ema: f64,
    pub upper: f64,
    pub lower: f64,
    pub direction: Direction,
}

impl OHLCV for Bar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

// ============================================================
// SERIES
// ============================================================

/// Ordered, append-only bar sequence produced by one generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[inline]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    #[inline]
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Index of the final bar, `None` for an empty series
    #[inline]
    pub fn last_index(&self) -> Option<usize> {
        self.bars.len().checked_sub(1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    /// Bars in `range`, clamped to the series bounds
    pub fn slice(&self, range: Range<usize>) -> &[Bar] {
        let end = range.end.min(self.bars.len());
        let start = range.start.min(end);
        &self.bars[start..end]
    }

    /// Check OHLC ordering and dense indexing of every bar
    pub fn validate(&self) -> Result<()> {
        for (i, bar) in self.bars.iter().enumerate() {
            bar.validate().map_err(|e| match e {
                SimError::InvalidOHLCV { reason, .. } => SimError::InvalidOHLCV { index: i, reason },
                other => other,
            })?;
            if bar.index != i {
                return Err(SimError::InvalidOHLCV {
                    index: i,
                    reason: "bar index out of sequence",
                });
            }
        }
        Ok(())
    }
}

impl Index<usize> for Series {
    type Output = Bar;

    fn index(&self, index: usize) -> &Bar {
        &self.bars[index]
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Generation context: the growing series plus its settings and noise source
pub struct SeriesBuilder<'a, R: Rng + ?Sized> {
    bars: Vec<Bar>,
    config: &'a SynthConfig,
    rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> SeriesBuilder<'a, R> {
    pub fn new(config: &'a SynthConfig, rng: &'a mut R) -> Self {
        Self {
            bars: Vec::with_capacity(256),
            config,
            rng,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Index of the most recently appended bar
    #[inline]
    pub fn last_index(&self) -> Option<usize> {
        self.bars.len().checked_sub(1)
    }

    #[inline]
    pub fn bar(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Current price: last close, or the baseline before the first bar
    #[inline]
    pub fn price(&self) -> f64 {
        self.bars.last().map_or(self.config.base_price, |b| b.close)
    }

    #[inline]
    pub fn config(&self) -> &SynthConfig {
        self.config
    }

    pub fn finish(self) -> Series {
        Series { bars: self.bars }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_series() {
        let series = Series::default();
        assert!(series.is_empty());
        assert_eq!(series.last_index(), None);
        assert!(series.slice(0..10).is_empty());
        assert!(series.validate().is_ok());
    }

    #[test]
    fn test_slice_is_clamped() {
        let config = SynthConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut builder = SeriesBuilder::new(&config, &mut rng);
        builder.trend(5, Bias::Flat, 100.0);
        let series = builder.finish();

        assert_eq!(series.slice(3..99).len(), 2);
        assert_eq!(series.slice(7..9).len(), 0);
        assert_eq!(series[4].index, 4);
    }

    #[test]
    fn test_validate_reports_position() {
        let config = SynthConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut builder = SeriesBuilder::new(&config, &mut rng);
        builder.trend(3, Bias::Up, 200.0);
        let mut series = builder.finish();
        series.bars[2].low = series.bars[2].high + 1.0;

        match series.validate() {
            Err(SimError::InvalidOHLCV { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected InvalidOHLCV, got {other:?}"),
        }
    }

    #[test]
    fn test_series_serializes_as_array() {
        let config = SynthConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut builder = SeriesBuilder::new(&config, &mut rng);
        builder.candle(&CandleSpec::body(50.0));
        let json = serde_json::to_value(builder.finish()).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["direction"], "Bullish");
    }
}
