//! Deterministic board with a virtual clock.
//!
//! Time only moves when the controller does something that costs time on
//! the real part: polling `micros()` and running an ADC conversion. The
//! audio pin samples a [`Signal`] at the instant the conversion starts,
//! so the sampler's scheduling decides which points of the waveform end up
//! in the frame.

use std::f64::consts::PI;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{AnalogPin, Board};
use crate::config::{ADC_BIAS, ADC_MAX};
use crate::error::{LineLightError, Result};

/// AVR `micros()` resolution at 16 MHz.
pub const DEFAULT_POLL_COST_US: u32 = 4;
/// 13 ADC cycles at prescaler 16.
pub const DEFAULT_CONVERSION_US: u32 = 13;
/// 13 ADC cycles at the stock Arduino prescaler of 128.
pub const ARDUINO_CONVERSION_US: u32 = 104;

pub trait Signal {
    /// Voltage on the audio pin at `t_us`, in ADC LSB including the bias.
    fn level_at(&mut self, t_us: u64) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Silence;

impl Signal for Silence {
    fn level_at(&mut self, _t_us: u64) -> f64 {
        f64::from(ADC_BIAS)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Tone {
    pub freq_hz: f64,
    pub amplitude_lsb: f64,
}

impl Tone {
    pub fn new(freq_hz: f64, amplitude_lsb: f64) -> Self {
        Self {
            freq_hz,
            amplitude_lsb,
        }
    }
}

impl Signal for Tone {
    fn level_at(&mut self, t_us: u64) -> f64 {
        let t = t_us as f64 * 1e-6;
        f64::from(ADC_BIAS) + self.amplitude_lsb * (2.0 * PI * self.freq_hz * t).sin()
    }
}

/// Uniform white noise around the bias, reproducible from its seed.
#[derive(Debug, Clone)]
pub struct Noise {
    rng: Pcg32,
    amplitude_lsb: f64,
}

impl Noise {
    pub fn new(seed: u64, amplitude_lsb: f64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            amplitude_lsb,
        }
    }
}

impl Signal for Noise {
    fn level_at(&mut self, _t_us: u64) -> f64 {
        let a = self.amplitude_lsb.abs();
        if a == 0.0 {
            return f64::from(ADC_BIAS);
        }
        f64::from(ADC_BIAS) + self.rng.gen_range(-a..=a)
    }
}

/// A WAV file played into the line input, mixed down to mono.
#[derive(Debug, Clone)]
pub struct Recording {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Recording {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = hound::WavReader::open(path.as_ref())?;
        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / full_scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let samples: Vec<f32> = interleaved
            .chunks(channels)
            .filter(|chunk| chunk.len() == channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect();

        if samples.is_empty() {
            return Err(LineLightError::EmptyRecording {
                path: path.as_ref().display().to_string(),
            });
        }

        log::info!(
            "Recording: {} frames @ {} Hz, {} channel(s)",
            samples.len(),
            spec.sample_rate,
            spec.channels
        );

        Ok(Self::from_samples(samples, spec.sample_rate))
    }

    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_us(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1_000_000 / u64::from(self.sample_rate)
    }
}

impl Signal for Recording {
    fn level_at(&mut self, t_us: u64) -> f64 {
        let index = t_us * u64::from(self.sample_rate) / 1_000_000;
        let sample = usize::try_from(index)
            .ok()
            .and_then(|i| self.samples.get(i))
            .copied()
            .unwrap_or(0.0);
        f64::from(ADC_BIAS) + f64::from(sample) * f64::from(ADC_BIAS)
    }
}

pub struct SimBoard {
    now_us: u64,
    poll_cost_us: u32,
    conversion_us: u32,
    pots: [u16; 2],
    signal: Box<dyn Signal>,
    serial: Vec<String>,
    echo: bool,
}

impl SimBoard {
    pub fn new(signal: impl Signal + 'static) -> Self {
        Self {
            now_us: 0,
            poll_cost_us: DEFAULT_POLL_COST_US,
            conversion_us: DEFAULT_CONVERSION_US,
            pots: [ADC_MAX / 2; 2],
            signal: Box::new(signal),
            serial: Vec::new(),
            echo: false,
        }
    }

    pub fn with_clock_start(mut self, now_us: u64) -> Self {
        self.now_us = now_us;
        self
    }

    pub fn with_conversion_us(mut self, conversion_us: u32) -> Self {
        self.conversion_us = conversion_us;
        self
    }

    pub fn with_pots(mut self, pot1: u16, pot2: u16) -> Self {
        self.set_pots(pot1, pot2);
        self
    }

    /// Print serial lines to stdout as they are written.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn set_pots(&mut self, pot1: u16, pot2: u16) {
        self.pots = [pot1.min(ADC_MAX), pot2.min(ADC_MAX)];
    }

    pub fn set_signal(&mut self, signal: impl Signal + 'static) {
        self.signal = Box::new(signal);
    }

    pub fn now_us(&self) -> u64 {
        self.now_us
    }

    pub fn advance_us(&mut self, us: u64) {
        self.now_us += us;
    }

    pub fn serial_lines(&self) -> &[String] {
        &self.serial
    }

    fn quantize(level: f64) -> u16 {
        level.round().clamp(0.0, f64::from(ADC_MAX)) as u16
    }
}

impl Board for SimBoard {
    fn micros(&mut self) -> u32 {
        let now = self.now_us as u32;
        self.now_us += u64::from(self.poll_cost_us);
        now
    }

    fn millis(&mut self) -> u32 {
        (self.now_us / 1000) as u32
    }

    fn analog_read(&mut self, pin: AnalogPin) -> u16 {
        let started = self.now_us;
        self.now_us += u64::from(self.conversion_us);
        match pin {
            AnalogPin::Audio => Self::quantize(self.signal.level_at(started)),
            AnalogPin::Pot1 => self.pots[0],
            AnalogPin::Pot2 => self.pots[1],
        }
    }

    fn serial_write_line(&mut self, line: &str) {
        if self.echo {
            println!("{line}");
        }
        self.serial.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_costs() {
        let mut board = SimBoard::new(Silence);
        assert_eq!(board.micros(), 0);
        assert_eq!(board.micros(), DEFAULT_POLL_COST_US);
        board.analog_read(AnalogPin::Audio);
        assert_eq!(board.now_us(), u64::from(2 * DEFAULT_POLL_COST_US + DEFAULT_CONVERSION_US));
    }

    #[test]
    fn test_micros_wraps() {
        let mut board = SimBoard::new(Silence).with_clock_start(u64::from(u32::MAX) - 1);
        assert_eq!(board.micros(), u32::MAX - 1);
        assert_eq!(board.micros(), 2);
    }

    #[test]
    fn test_adc_clamps_and_rounds() {
        let mut board = SimBoard::new(Tone::new(0.0, 0.0));
        assert_eq!(board.analog_read(AnalogPin::Audio), 512);

        // sin(0) = 0, so a DC tone holds the bias; use a recording to push past the rails
        board.set_signal(Recording::from_samples(vec![2.0; 8], 1000));
        assert_eq!(board.analog_read(AnalogPin::Audio), 1023);
        board.set_signal(Recording::from_samples(vec![-2.0; 8], 1000));
        assert_eq!(board.analog_read(AnalogPin::Audio), 0);
    }

    #[test]
    fn test_pots_are_clamped() {
        let mut board = SimBoard::new(Silence).with_pots(5000, 7);
        assert_eq!(board.analog_read(AnalogPin::Pot1), 1023);
        assert_eq!(board.analog_read(AnalogPin::Pot2), 7);
    }

    #[test]
    fn test_tone_peaks_at_quarter_period() {
        let mut tone = Tone::new(1000.0, 200.0);
        assert!((tone.level_at(250) - 712.0).abs() < 1e-9);
        assert!((tone.level_at(750) - 312.0).abs() < 1e-9);
    }

    #[test]
    fn test_noise_is_reproducible_and_bounded() {
        let mut a = Noise::new(7, 100.0);
        let mut b = Noise::new(7, 100.0);
        for t in 0..1000 {
            let x = a.level_at(t);
            assert_eq!(x, b.level_at(t));
            assert!((412.0..=612.0).contains(&x));
        }
    }

    #[test]
    fn test_recording_falls_silent_after_end() {
        let mut rec = Recording::from_samples(vec![0.5, -0.5], 1000);
        assert_eq!(rec.duration_us(), 2000);
        assert_eq!(rec.level_at(0), 768.0);
        assert_eq!(rec.level_at(1500), 256.0);
        assert_eq!(rec.level_at(5000), 512.0);
    }

    #[test]
    fn test_serial_lines_recorded() {
        let mut board = SimBoard::new(Silence);
        board.serial_write_line("hello");
        assert_eq!(board.serial_lines(), ["hello".to_string()]);
    }
}
