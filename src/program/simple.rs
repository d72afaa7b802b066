//! Three-act programs: setup leg, trigger recipe, result leg.

use rand::Rng;

use super::{Interpreter, Leg, Trigger};
use crate::scenario::{Point, TrendVector};
use crate::synth::Bias;

pub const SETUP_LABEL: &str = "Trend setup";
pub const RESULT_LABEL: &str = "Follow-through";

pub(super) fn run<R: Rng + ?Sized>(
    it: &mut Interpreter<'_, R>,
    setup: Leg,
    trigger: Trigger,
    result: Leg,
    name: &str,
) {
    let config = *it.builder.config();

    let setup_start = it.builder.len();
    let setup_amp = if setup.is_directional() {
        config.amplitude
    } else {
        config.flat_setup_amplitude
    };
    it.builder.trend(config.setup_len.get(), setup.bias(), setup_amp);
    it.phase(SETUP_LABEL);

    if setup.is_directional() {
        it.trend_vector = setup_vector(it, setup_start);
    }

    for spec in trigger.recipe(setup) {
        it.builder.candle(&spec);
    }
    it.mark_trigger();
    it.phase(format!("Pattern confirmed: {name}"));

    let (bias, amp) = match result {
        Leg::Up | Leg::Down => (result.bias(), config.amplitude),
        Leg::Flat | Leg::Volatile => (Bias::Flat, config.volatile_amplitude),
    };
    it.builder.trend(config.result_len.get(), bias, amp);
    it.phase(RESULT_LABEL);
}

/// Arrow from the first to the last close of the setup leg
fn setup_vector<R: Rng + ?Sized>(it: &Interpreter<'_, R>, start: usize) -> Option<TrendVector> {
    let end = it.builder.last_index()?;
    if end < start {
        return None;
    }
    let first = it.builder.bar(start)?;
    let last = it.builder.bar(end)?;
    Some(TrendVector {
        start: Point {
            index: start,
            price: first.close,
        },
        end: Point {
            index: end,
            price: last.close,
        },
    })
}
