//! The lamp controller: single owner of every buffer and all loop state.

use crate::board::{AnalogPin, Board, PwmOutput};
use crate::config::{FFT_SIZE, SERIAL_BAUD};
use crate::dsp::{
    AutoGain, BandSelection, FrameTiming, HannWindow, Sampler, Spectrum, band_energy,
    duty_from_level,
};
use crate::trace::{DebugTrace, StatusRecord, write_boot_banner};

/// Production frame size.
pub type LineLight = LampController<FFT_SIZE>;

/// What one pass of the loop produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub band: BandSelection,
    pub energy: f64,
    pub level: f64,
    pub duty: u8,
    pub gain: f64,
    pub ema_energy: f64,
    pub timing: FrameTiming,
    pub traced: bool,
}

pub struct LampController<const N: usize> {
    window: HannWindow<N>,
    sampler: Sampler,
    spectrum: Spectrum<N>,
    agc: AutoGain,
    trace: DebugTrace,
    timing: FrameTiming,
}

impl<const N: usize> LampController<N> {
    pub fn new() -> Self {
        Self {
            window: HannWindow::new(),
            sampler: Sampler::new(),
            spectrum: Spectrum::new(),
            agc: AutoGain::new(),
            trace: DebugTrace::new(),
            timing: FrameTiming::default(),
        }
    }

    pub fn nyquist_bin() -> usize {
        Spectrum::<N>::nyquist_bin()
    }

    /// Banner on the serial port, lamp off.
    pub fn boot<B: Board, P: PwmOutput>(&mut self, board: &mut B, pwm: &mut P) {
        pwm.write_duty(0);
        write_boot_banner(board, N);
        log::info!(
            "controller up: N={N}, sample period {} us, serial {SERIAL_BAUD} baud",
            self.sampler.period_us()
        );
    }

    /// One complete pass: sample a frame, then process it.
    pub fn run_frame<B: Board, P: PwmOutput>(&mut self, board: &mut B, pwm: &mut P) -> FrameReport {
        self.acquire(board);
        self.process(board, pwm)
    }

    pub fn acquire<B: Board>(&mut self, board: &mut B) -> FrameTiming {
        self.timing = self.sampler.acquire(board, &self.window, &mut self.spectrum);
        self.timing
    }

    /// Fill the frame from samples that are already centered on zero, the
    /// way the sampler would have. Anything short of `N` is padded with zeros.
    pub fn load_analog_frame(&mut self, samples: impl IntoIterator<Item = f64>) {
        self.spectrum.load(samples, &self.window);
        self.timing = FrameTiming::default();
    }

    /// Everything after acquisition, in loop order: FFT, knobs, band energy,
    /// AGC, gamma, PWM, trace.
    pub fn process<B: Board, P: PwmOutput>(&mut self, board: &mut B, pwm: &mut P) -> FrameReport {
        let magnitudes = self.spectrum.compute();

        let pot1 = board.analog_read(AnalogPin::Pot1);
        let pot2 = board.analog_read(AnalogPin::Pot2);
        let band = BandSelection::from_pots(pot1, pot2, Self::nyquist_bin());

        let energy = band_energy(magnitudes, band);
        let level = self.agc.update(energy);
        let duty = duty_from_level(level);
        pwm.write_duty(duty);

        let record = StatusRecord {
            band,
            level,
            gain: self.agc.gain(),
            ema_energy: self.agc.ema_energy(),
        };
        let traced = self.trace.maybe_emit::<B, N>(board, &record);

        FrameReport {
            band,
            energy,
            level,
            duty,
            gain: record.gain,
            ema_energy: record.ema_energy,
            timing: self.timing,
            traced,
        }
    }

    pub fn ema_energy(&self) -> f64 {
        self.agc.ema_energy()
    }

    pub fn agc_gain(&self) -> f64 {
        self.agc.gain()
    }

    pub fn magnitudes(&self) -> &[f64; N] {
        self.spectrum.magnitudes()
    }
}

impl<const N: usize> Default for LampController<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod scenarios;
