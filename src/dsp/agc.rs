use crate::config::{AGC_MAX, AGC_MIN, AGC_STEP, EMA_ALPHA, TARGET_LEVEL};

/// Smoother and automatic gain control for the band energy.
///
/// The EMA attacks and releases symmetrically; the gain is nudged
/// multiplicatively each frame so that `ema * gain` settles near
/// `TARGET_LEVEL`. The gain clamp is deliberately lopsided: long silence
/// winds it up towards `AGC_MAX`, sustained overload only takes it down to
/// `AGC_MIN`.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoGain {
    ema_energy: f64,
    gain: f64,
}

impl AutoGain {
    pub fn new() -> Self {
        Self {
            ema_energy: 0.0,
            gain: 1.0,
        }
    }

    /// Feed one frame's raw band energy, get the normalised level in `[0, 1]`.
    pub fn update(&mut self, energy: f64) -> f64 {
        let energy = energy.max(0.0);
        self.ema_energy = (1.0 - EMA_ALPHA) * self.ema_energy + EMA_ALPHA * energy;

        let measured = (self.ema_energy * self.gain).min(1.0);
        let error = TARGET_LEVEL - measured;
        self.gain = (self.gain * (1.0 + AGC_STEP * error)).clamp(AGC_MIN, AGC_MAX);

        // square root as a soft compressor for quiet passages
        (self.ema_energy * self.gain).sqrt().clamp(0.0, 1.0)
    }

    pub fn ema_energy(&self) -> f64 {
        self.ema_energy
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }
}

impl Default for AutoGain {
    fn default() -> Self {
        Self::new()
    }
}
