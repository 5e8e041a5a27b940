//! The desktop stand-in for the lamp: real time, line audio from the sound
//! card, knobs from the GUI, serial on stdout.

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Instant;

use ringbuf::HeapCons;
use ringbuf::traits::{Consumer, Observer};

use super::{AnalogPin, Board, line_level_to_adc};
use crate::config::{ADC_BIAS, ADC_MAX, SAMPLE_RATE_HZ};

/// Pot positions shared between the GUI and the controller thread.
#[derive(Debug)]
pub struct Knobs {
    pot1: AtomicU16,
    pot2: AtomicU16,
}

impl Knobs {
    pub fn new(pot1: u16, pot2: u16) -> Self {
        Self {
            pot1: AtomicU16::new(pot1.min(ADC_MAX)),
            pot2: AtomicU16::new(pot2.min(ADC_MAX)),
        }
    }

    pub fn get(&self) -> (u16, u16) {
        (
            self.pot1.load(Ordering::Relaxed),
            self.pot2.load(Ordering::Relaxed),
        )
    }

    pub fn set(&self, pot1: u16, pot2: u16) {
        self.pot1.store(pot1.min(ADC_MAX), Ordering::Relaxed);
        self.pot2.store(pot2.min(ADC_MAX), Ordering::Relaxed);
    }
}

impl Default for Knobs {
    fn default() -> Self {
        Self::new(ADC_MAX / 2, ADC_MAX / 2)
    }
}

pub struct HostBoard {
    started: Instant,
    capture: HeapCons<f32>,
    step: f64,
    phase: f64,
    held: u16,
    max_backlog: usize,
    knobs: Arc<Knobs>,
}

impl HostBoard {
    /// `device_rate` is the capture rate of the samples arriving on `capture`.
    pub fn new(capture: HeapCons<f32>, device_rate: u32, knobs: Arc<Knobs>) -> Self {
        let step = f64::from(device_rate) / f64::from(SAMPLE_RATE_HZ);
        Self {
            started: Instant::now(),
            capture,
            step,
            phase: 0.0,
            held: ADC_BIAS,
            // ~50 ms of audio; beyond that the sampler is behind and skips ahead
            max_backlog: (device_rate as usize / 20).max(1),
            knobs,
        }
    }

    /// Decimate the capture stream down to the sampler's rate. The newest
    /// sample of each step is converted; when nothing new has arrived the
    /// previous value is held.
    fn read_line_input(&mut self) -> u16 {
        let backlog = self.capture.occupied_len();
        if backlog > self.max_backlog {
            for _ in 0..backlog - self.max_backlog {
                self.capture.try_pop();
            }
        }

        self.phase += self.step;
        let take = self.phase.floor() as usize;
        self.phase -= take as f64;

        let mut newest = None;
        for _ in 0..take {
            match self.capture.try_pop() {
                Some(sample) => newest = Some(sample),
                None => break,
            }
        }
        if let Some(sample) = newest {
            self.held = line_level_to_adc(sample);
        }
        self.held
    }
}

impl Board for HostBoard {
    fn micros(&mut self) -> u32 {
        self.started.elapsed().as_micros() as u32
    }

    fn millis(&mut self) -> u32 {
        self.started.elapsed().as_millis() as u32
    }

    fn analog_read(&mut self, pin: AnalogPin) -> u16 {
        match pin {
            AnalogPin::Audio => self.read_line_input(),
            AnalogPin::Pot1 => self.knobs.get().0,
            AnalogPin::Pot2 => self.knobs.get().1,
        }
    }

    fn serial_write_line(&mut self, line: &str) {
        println!("{line}");
    }
}
