//! Timer1 driver: 8-bit phase-correct PWM on OC1A.
//!
//! The registers are modelled as atomics so the compare value can be
//! observed from another thread (the GUI lamp) while the controller thread
//! owns the writer. `OCR1A` is updated with a single 16-bit store, which is
//! the same guarantee the hardware double-buffer gives in phase-correct mode.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU16, Ordering};

use crate::config::F_CPU_HZ;

// TCCR1A
pub const WGM10: u8 = 1 << 0;
pub const WGM11: u8 = 1 << 1;
pub const COM1A0: u8 = 1 << 6;
pub const COM1A1: u8 = 1 << 7;
// TCCR1B
pub const CS10: u8 = 1 << 0;
pub const CS11: u8 = 1 << 1;
pub const CS12: u8 = 1 << 2;
pub const WGM12: u8 = 1 << 3;

pub trait PwmOutput {
    fn write_duty(&mut self, duty: u8);
}

#[derive(Debug, Default)]
struct Registers {
    tccr1a: AtomicU8,
    tccr1b: AtomicU8,
    ocr1a: AtomicU16,
}

#[derive(Debug, Clone, Default)]
pub struct Timer1 {
    regs: Arc<Registers>,
}

impl Timer1 {
    pub fn new() -> Self {
        Self::default()
    }

    /// ~31.37 kHz at 16 MHz, non-inverting, starting fully off.
    pub fn configure_phase_correct_8bit(&self) {
        self.regs.tccr1a.store(0, Ordering::Relaxed);
        self.regs.tccr1b.store(0, Ordering::Relaxed);

        self.regs.tccr1a.fetch_or(WGM10, Ordering::Relaxed);
        self.regs.tccr1b.fetch_or(CS10, Ordering::Relaxed);
        self.regs.tccr1a.fetch_or(COM1A1, Ordering::Relaxed);

        self.regs.ocr1a.store(0, Ordering::Release);
    }

    pub fn tccr1a(&self) -> u8 {
        self.regs.tccr1a.load(Ordering::Relaxed)
    }

    pub fn tccr1b(&self) -> u8 {
        self.regs.tccr1b.load(Ordering::Relaxed)
    }

    pub fn ocr1a(&self) -> u16 {
        self.regs.ocr1a.load(Ordering::Acquire)
    }

    pub fn duty(&self) -> u8 {
        self.ocr1a().min(u16::from(u8::MAX)) as u8
    }

    /// Clock divider selected by CS12:CS10, `None` while the timer is stopped
    /// or clocked externally.
    pub fn prescaler(&self) -> Option<u32> {
        match self.tccr1b() & (CS12 | CS11 | CS10) {
            0b001 => Some(1),
            0b010 => Some(8),
            0b011 => Some(64),
            0b100 => Some(256),
            0b101 => Some(1024),
            _ => None,
        }
    }

    /// TOP for the phase-correct fixed-resolution modes, `None` otherwise.
    pub fn top(&self) -> Option<u32> {
        if self.tccr1b() & WGM12 != 0 {
            return None;
        }
        match self.tccr1a() & (WGM11 | WGM10) {
            0b01 => Some(0x00FF),
            0b10 => Some(0x01FF),
            0b11 => Some(0x03FF),
            _ => None,
        }
    }

    pub fn is_non_inverting(&self) -> bool {
        self.tccr1a() & (COM1A1 | COM1A0) == COM1A1
    }

    /// Phase-correct PWM counts up and back down, so one period is `2 * TOP` ticks.
    pub fn frequency_hz(&self, f_cpu: u32) -> Option<f64> {
        let prescaler = self.prescaler()?;
        let top = self.top()?;
        Some(f64::from(f_cpu) / (f64::from(prescaler) * 2.0 * f64::from(top)))
    }

    pub fn output_frequency_hz(&self) -> Option<f64> {
        self.frequency_hz(F_CPU_HZ)
    }
}

impl PwmOutput for Timer1 {
    fn write_duty(&mut self, duty: u8) {
        self.regs.ocr1a.store(u16::from(duty), Ordering::Release);
    }
}
