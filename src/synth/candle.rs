//! Candle builder: the only way a bar enters a series.

use rand::Rng;

use super::{Bar, SeriesBuilder};
use crate::Direction;

/// Shape of one engineered candle
///
/// Wicks are measured beyond the body extremes, so `high >= max(open, close)` and
/// `low <= min(open, close)` hold for every spec. Unset wicks fall back to
/// [`SynthConfig::default_wick`](crate::config::SynthConfig::default_wick), an unset
/// volume is drawn from the configured volume range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CandleSpec {
    /// Offset of the open from the previous close
    pub gap: Option<f64>,
    /// close - open
    pub body: f64,
    pub upper_wick: Option<f64>,
    pub lower_wick: Option<f64>,
    pub volume: Option<f64>,
}

impl CandleSpec {
    pub fn body(body: f64) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    pub fn gap(mut self, delta: f64) -> Self {
        self.gap = Some(delta);
        self
    }

    pub fn wicks(mut self, upper: f64, lower: f64) -> Self {
        self.upper_wick = Some(upper);
        self.lower_wick = Some(lower);
        self
    }

    pub fn upper_wick(mut self, len: f64) -> Self {
        self.upper_wick = Some(len);
        self
    }

    pub fn lower_wick(mut self, len: f64) -> Self {
        self.lower_wick = Some(len);
        self
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Same shape with body, gap and wicks reflected through the open
    pub fn mirrored(self) -> Self {
        Self {
            gap: self.gap.map(|g| -g),
            body: -self.body,
            upper_wick: self.lower_wick,
            lower_wick: self.upper_wick,
            volume: self.volume,
        }
    }
}

impl<R: Rng + ?Sized> SeriesBuilder<'_, R> {
    /// Append one bar shaped by `spec` and return its index.
    pub fn candle(&mut self, spec: &CandleSpec) -> usize {
        let config = self.config;
        let prev = self.bars.last();

        let open = prev.map_or(config.base_price, |b| b.close) + spec.gap.unwrap_or(0.0);
        let close = open + spec.body;
        let upper_wick = spec.upper_wick.unwrap_or(config.default_wick).max(0.0);
        let lower_wick = spec.lower_wick.unwrap_or(config.default_wick).max(0.0);
        let high = open.max(close) + upper_wick;
        let low = open.min(close) - lower_wick;

        // first bar seeds the EMA with its own close
        let alpha = config.ema_alpha.get();
        let prev_ema = prev.map_or(close, |b| b.ema);
        let ema = close * alpha + prev_ema * (1.0 - alpha);
        let half_width = config.band_half_width();

        let volume = match spec.volume {
            Some(v) => v.max(0.0),
            None if config.volume_max > config.volume_min => {
                self.rng.gen_range(config.volume_min..config.volume_max)
            }
            None => config.volume_min.max(0.0),
        };

        let index = self.bars.len();
        self.bars.push(Bar {
            index,
            open,
            high,
            low,
            close,
            volume,
            ema,
            upper: ema + half_width,
            lower: ema - half_width,
            direction: Direction::of(open, close),
        });
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthConfig;
    use crate::OHLCVExt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn build(specs: &[CandleSpec]) -> Vec<Bar> {
        let config = SynthConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut builder = SeriesBuilder::new(&config, &mut rng);
        for spec in specs {
            builder.candle(spec);
        }
        builder.finish().bars().to_vec()
    }

    #[test]
    fn test_first_bar_opens_at_baseline_and_seeds_ema() {
        let bars = build(&[CandleSpec::body(100.0)]);
        let bar = bars[0];
        assert_eq!(bar.open, 42_000.0);
        assert_eq!(bar.close, 42_100.0);
        assert_eq!(bar.high, 42_110.0);
        assert_eq!(bar.low, 41_990.0);
        assert_eq!(bar.ema, 42_100.0);
        assert_eq!(bar.upper, 42_900.0);
        assert_eq!(bar.lower, 41_300.0);
        assert!((500.0..1000.0).contains(&bar.volume));
    }

    #[test]
    fn test_ema_recurrence() {
        let bars = build(&[CandleSpec::body(0.0), CandleSpec::body(100.0)]);
        let expected = 42_100.0 * 0.15 + 42_000.0 * 0.85;
        assert!((bars[1].ema - expected).abs() < 1e-9);
        assert!((bars[1].upper - bars[1].ema - 800.0).abs() < 1e-9);
        assert!((bars[1].ema - bars[1].lower - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_gap_offsets_open_from_previous_close() {
        let bars = build(&[CandleSpec::body(-100.0), CandleSpec::body(10.0).gap(-30.0)]);
        assert_eq!(bars[1].open, bars[0].close - 30.0);
        assert_eq!(bars[1].close, bars[1].open + 10.0);
    }

    #[test]
    fn test_hammer_shape() {
        let spec = CandleSpec::body(20.0).wicks(10.0, 150.0).volume(1500.0);
        let bar = build(&[spec])[0];
        assert_eq!(bar.body(), 20.0);
        assert_eq!(bar.lower_shadow(), 150.0);
        assert_eq!(bar.upper_shadow(), 10.0);
        assert_eq!(bar.volume, 1500.0);
        assert_eq!(bar.direction, Direction::Bullish);
    }

    #[test]
    fn test_negative_wicks_never_invert_bar() {
        let bar = build(&[CandleSpec::body(-40.0).wicks(-5.0, -5.0)])[0];
        assert!(bar.validate().is_ok());
        assert_eq!(bar.high, bar.open);
        assert_eq!(bar.low, bar.close);
        assert_eq!(bar.direction, Direction::Bearish);
    }

    #[test]
    fn test_mirrored_spec() {
        let spec = CandleSpec::body(20.0).wicks(10.0, 150.0).gap(5.0).volume(1.0);
        let m = spec.mirrored();
        assert_eq!(m.body, -20.0);
        assert_eq!(m.gap, Some(-5.0));
        assert_eq!(m.upper_wick, Some(150.0));
        assert_eq!(m.lower_wick, Some(10.0));
        assert_eq!(m.volume, Some(1.0));
    }
}
