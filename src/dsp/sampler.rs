//! Polling sampler: one frame of the audio pin at a fixed period.

use super::spectrum::Spectrum;
use super::window::HannWindow;
use crate::board::{AnalogPin, Board};
use crate::config::{ADC_BIAS, SAMPLE_PERIOD_US};

/// How the last acquisition actually went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameTiming {
    /// Time from the first release to the end of the last conversion.
    pub span_us: u32,
    /// Samples whose release time had already passed when they came up.
    pub late_samples: u16,
    pub samples: u16,
}

impl FrameTiming {
    /// Rate the frame was really sampled at. Lower than nominal when the
    /// loop fell behind and samples went back to back. `N` samples span
    /// `N - 1` intervals.
    pub fn effective_rate_hz(&self) -> f64 {
        if self.span_us == 0 || self.samples < 2 {
            return 0.0;
        }
        f64::from(self.samples - 1) * 1e6 / f64::from(self.span_us)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    period_us: u32,
}

impl Sampler {
    pub fn new() -> Self {
        Self::with_period(SAMPLE_PERIOD_US)
    }

    pub fn with_period(period_us: u32) -> Self {
        Self { period_us }
    }

    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    /// Acquire exactly `N` samples into `spectrum`, centered and windowed.
    ///
    /// Sample `i` is released at `t0 + i * period`. The wait compares with a
    /// signed difference so it survives the `micros()` wrap. Missed releases
    /// are not made up for: the samples just come back to back until the
    /// schedule is caught up, which lowers the effective rate for that frame.
    pub fn acquire<B: Board, const N: usize>(
        &self,
        board: &mut B,
        window: &HannWindow<N>,
        spectrum: &mut Spectrum<N>,
    ) -> FrameTiming {
        let t0 = board.micros();
        let mut release = t0;
        let mut late = 0u16;

        for i in 0..N {
            let mut waited = false;
            while (board.micros().wrapping_sub(release) as i32) < 0 {
                waited = true;
                std::hint::spin_loop();
            }
            if !waited && i > 0 {
                late += 1;
            }
            release = release.wrapping_add(self.period_us);

            let raw = board.analog_read(AnalogPin::Audio);
            let centered = f64::from(raw) - f64::from(ADC_BIAS);
            spectrum.set_sample(i, centered, window);
        }

        let span_us = board.micros().wrapping_sub(t0);
        if late > 0 {
            log::trace!("sampler fell behind on {late}/{N} samples");
        }

        FrameTiming {
            span_us,
            late_samples: late,
            samples: N as u16,
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}
