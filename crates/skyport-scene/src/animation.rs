//! Key-driven sawtooth oscillators for the freighter and the alien.

/// Sign of a single oscillator step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    /// Subtract one step.
    Decrease,
    /// Add one step.
    Increase,
}

impl StepDirection {
    fn sign(self) -> f32 {
        match self {
            StepDirection::Decrease => -1.0,
            StepDirection::Increase => 1.0,
        }
    }
}

/// A scalar offset confined to `[lower, upper]` that wraps to the opposite
/// bound when a step carries it outside.
///
/// There is no time dependence: the offset only changes when
/// [`step`](Self::step) is called, once per frame a bound key is held.
#[derive(Debug, Clone, PartialEq)]
pub struct Oscillator {
    offset: f32,
    lower: f32,
    upper: f32,
    step: f32,
}

impl Oscillator {
    /// Create an oscillator. `lower` and `upper` are swapped if given out of
    /// order.
    pub fn new(initial: f32, lower: f32, upper: f32, step: f32) -> Self {
        let (lower, upper) = if lower <= upper {
            (lower, upper)
        } else {
            (upper, lower)
        };
        Self {
            offset: initial,
            lower,
            upper,
            step: step.abs(),
        }
    }

    /// Build from the config section.
    pub fn from_config(config: &skyport_config::OscillatorConfig) -> Self {
        Self::new(config.initial, config.lower, config.upper, config.step)
    }

    /// Advance one step. Leaving through the upper bound snaps to the lower
    /// bound and vice versa. Returns the new offset.
    pub fn step(&mut self, direction: StepDirection) -> f32 {
        let next = self.offset + direction.sign() * self.step;
        self.offset = if next > self.upper {
            self.lower
        } else if next < self.lower {
            self.upper
        } else {
            next
        };
        self.offset
    }

    /// Current offset.
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// `(lower, upper)` wrap limits.
    #[must_use]
    pub fn bounds(&self) -> (f32, f32) {
        (self.lower, self.upper)
    }
}
