//! Hardware seam between the lamp controller and whatever it runs on.
//!
//! The controller only needs the handful of primitives an Arduino sketch
//! would use: a wrapping microsecond clock, a wrapping millisecond clock,
//! one-shot 10-bit conversions on three analog pins and a line-oriented
//! serial port. The PWM output lives in [`timer1`].

pub mod host;
pub mod sim;
pub mod timer1;

pub use host::{HostBoard, Knobs};
pub use sim::{Signal, SimBoard};
pub use timer1::{PwmOutput, Timer1};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalogPin {
    /// AC-coupled line audio, biased to mid-scale.
    Audio,
    /// Low band edge knob.
    Pot1,
    /// Band width knob.
    Pot2,
}

pub trait Board {
    /// Microseconds since start, wrapping at `u32::MAX`.
    fn micros(&mut self) -> u32;

    /// Milliseconds since start, wrapping at `u32::MAX`.
    fn millis(&mut self) -> u32;

    /// One 10-bit conversion. Always within `0..=ADC_MAX`.
    fn analog_read(&mut self, pin: AnalogPin) -> u16;

    fn serial_write_line(&mut self, line: &str);
}

/// Map a line-level sample in `[-1.0, 1.0]` onto the biased 10-bit ADC range.
pub fn line_level_to_adc(sample: f32) -> u16 {
    use crate::config::{ADC_BIAS, ADC_MAX};

    let lsb = f64::from(ADC_BIAS) + f64::from(sample) * f64::from(ADC_BIAS);
    lsb.round().clamp(0.0, f64::from(ADC_MAX)) as u16
}
