//! Scripted multi-leg structural patterns.
//!
//! Top and bottom variants share one script with the direction flipped.

use rand::Rng;

use super::{ComplexKind, Interpreter};
use crate::synth::{Bias, CandleSpec};

const BREAKOUT_VOLUME: f64 = 2000.0;

pub(super) fn run<R: Rng + ?Sized>(it: &mut Interpreter<'_, R>, kind: ComplexKind) {
    match kind {
        ComplexKind::DoubleBottom => double(it, false),
        ComplexKind::DoubleTop => double(it, true),
        ComplexKind::HeadShouldersTop => head_shoulders(it, true),
        ComplexKind::HeadShouldersBottom => head_shoulders(it, false),
        ComplexKind::BullFlag => flag(it, false),
        ComplexKind::BearFlag => flag(it, true),
        ComplexKind::Generic => generic(it),
    }
}

/// `(with, against)` biases for a pattern that resolves downward when `top`
fn legs(top: bool) -> (Bias, Bias) {
    if top {
        (Bias::Up, Bias::Down)
    } else {
        (Bias::Down, Bias::Up)
    }
}

fn sign(top: bool) -> f64 {
    if top {
        -1.0
    } else {
        1.0
    }
}

// W bottom / M top: two tests of an extreme, then a neckline break.
fn double<R: Rng + ?Sized>(it: &mut Interpreter<'_, R>, top: bool) {
    let amp = it.builder.config().amplitude;
    let (first, second) = legs(top);
    let labels = if top {
        ["Rally to the top", "Neckline support", "Failed new high", "Top confirmed"]
    } else {
        ["Decline to the first low", "Rebound to the neckline", "Second test of the low", "Neckline breakout"]
    };

    it.builder.trend(20, first, amp);
    let extreme_a = it.builder.price();
    it.phase(labels[0]);

    it.builder.trend(15, second, amp);
    let neck = it.builder.price();
    it.phase(labels[1]);

    it.builder.trend(15, first, amp);
    let extreme_b = it.builder.price();
    it.phase(labels[2]);

    let breakout = CandleSpec::body(sign(top) * amp).volume(BREAKOUT_VOLUME);
    it.builder.candle(&breakout);
    it.mark_trigger();
    let entry = it.builder.price();

    it.builder.trend(15, second, amp);
    it.phase(labels[3]);

    let lm = &mut it.landmarks;
    if top {
        let resistance = extreme_a.max(extreme_b);
        lm.resistance = Some(resistance);
        lm.support = Some(neck);
        lm.stop = Some(resistance);
    } else {
        let support = extreme_a.min(extreme_b);
        lm.support = Some(support);
        lm.resistance = Some(neck);
        lm.stop = Some(support);
    }
    lm.entry = Some(entry);
}

// Head and shoulders: the trigger is the head's spike candle.
fn head_shoulders<R: Rng + ?Sized>(it: &mut Interpreter<'_, R>, top: bool) {
    let amp = it.builder.config().amplitude;
    let (with, against) = legs(top);
    let labels = if top {
        ["Left shoulder", "Head spikes and fails", "Weak right shoulder", "Neckline broken"]
    } else {
        ["Left shoulder", "Head washes out and recovers", "Higher right shoulder", "Neckline reclaimed"]
    };

    it.builder.trend(15, with, amp);
    it.phase(labels[0]);

    it.builder.trend(10, against, amp);
    it.builder.trend(15, with, amp);
    it.builder.candle(&CandleSpec::body(-sign(top) * 50.0));
    it.mark_trigger();
    it.builder.trend(15, against, amp);
    it.phase(labels[1]);

    it.builder.trend(10, with, amp);
    it.phase(labels[2]);

    it.builder.trend(10, against, amp);
    it.phase(labels[3]);
}

// Flag: impulsive pole, a counter-drifting channel, breakout in the pole's direction.
fn flag<R: Rng + ?Sized>(it: &mut Interpreter<'_, R>, bear: bool) {
    let amp = it.builder.config().amplitude;
    let (_, pole) = legs(bear);
    let s = -sign(bear);
    let labels = if bear {
        ["Flagpole plunge", "Flag drift on light volume", "Breakdown on volume"]
    } else {
        ["Flagpole surge", "Flag consolidation on light volume", "Breakout on volume"]
    };

    it.builder.trend(15, pole, amp * 1.5);
    it.phase(labels[0]);

    for _ in 0..12 {
        it.builder.candle(&CandleSpec::body(s * 30.0));
    }
    it.phase(labels[1]);

    let breakout = CandleSpec::body(-s * amp * 1.5).volume(BREAKOUT_VOLUME);
    it.builder.candle(&breakout);
    it.mark_trigger();
    it.builder.trend(15, pole, amp);
    it.phase(labels[2]);
}

fn generic<R: Rng + ?Sized>(it: &mut Interpreter<'_, R>) {
    let amp = it.builder.config().amplitude;
    it.builder.trend(20, Bias::Up, amp);
    it.mark_trigger();
    it.builder.trend(20, Bias::Down, amp);
    it.phase("Standard pattern walkthrough");
}

#[cfg(test)]
mod tests {
    use crate::config::SynthConfig;
    use crate::program::{PatternProgram, ProgramOutput};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run_pattern(pattern: &str, seed: u64) -> ProgramOutput {
        let mut rng = StdRng::seed_from_u64(seed);
        PatternProgram::for_pattern(pattern).run(&SynthConfig::default(), "X", &mut rng)
    }

    #[test]
    fn test_double_top_layout() {
        let out = run_pattern("m_top", 4);
        let labels: Vec<_> = out.phases[1..].iter().map(|p| p.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Rally to the top", "Neckline support", "Failed new high", "Top confirmed"]
        );
        assert_eq!(out.trigger, Some(90));
        assert_eq!(out.series.len(), 106);

        let trigger = out.series[90];
        assert!(trigger.close < trigger.open);
        assert_eq!(trigger.volume, 2000.0);

        let lm = out.landmarks;
        assert_eq!(lm.entry, Some(trigger.close));
        assert_eq!(lm.stop, lm.resistance);
        assert!(lm.resistance.unwrap() > lm.support.unwrap());
    }

    #[test]
    fn test_double_bottom_landmarks() {
        let out = run_pattern("w_bottom", 4);
        let lm = out.landmarks;
        assert_eq!(lm.stop, lm.support);
        assert!(lm.support.unwrap() < lm.resistance.unwrap());
        assert!(out.series[out.trigger.unwrap()].close > out.series[out.trigger.unwrap()].open);
    }

    #[test]
    fn test_head_shoulders_trigger_is_head() {
        let out = run_pattern("head_shoulders", 8);
        // backdrop 40, left shoulder 15, dip 10, head rally 15
        assert_eq!(out.trigger, Some(80));
        let head = out.series[80];
        assert!((head.close - head.open - 50.0).abs() < 1e-6);

        let inv = run_pattern("head_shoulders_inv", 8);
        assert_eq!(inv.trigger, Some(80));
        assert!(inv.series[80].close < inv.series[80].open);
    }

    #[test]
    fn test_flag_breakout_candle() {
        let out = run_pattern("flag_bull", 2);
        assert_eq!(out.trigger, Some(67));
        let bar = out.series[67];
        assert!((bar.close - bar.open - 300.0).abs() < 1e-6);

        let flag = &out.series.bars()[55..67];
        assert!(flag.iter().all(|b| b.close < b.open));

        let bear = run_pattern("flag_bear", 2);
        assert!(bear.series[67].close < bear.series[67].open);
    }

    #[test]
    fn test_generic_script() {
        let out = run_pattern("triangle_asc", 1);
        assert_eq!(out.series.len(), 80);
        assert_eq!(out.trigger, Some(59));
        assert_eq!(out.phases.len(), 2);
        assert_eq!((out.phases[1].start, out.phases[1].end), (40, 80));
    }
}
