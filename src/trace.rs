//! Serial status output: the boot banner and a rate-limited status line.

use crate::board::Board;
use crate::config::{BOOT_BANNER, SAMPLE_RATE_HZ, TRACE_INTERVAL_MS};
use crate::dsp::{BandSelection, Spectrum};

pub fn write_boot_banner<B: Board>(board: &mut B, fft_size: usize) {
    board.serial_write_line(BOOT_BANNER);
    board.serial_write_line(&format!("Fs={SAMPLE_RATE_HZ}"));
    board.serial_write_line(&format!("N={fft_size}"));
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusRecord {
    pub band: BandSelection,
    pub level: f64,
    pub gain: f64,
    pub ema_energy: f64,
}

impl StatusRecord {
    pub fn format<const N: usize>(&self) -> String {
        format!(
            "bins {}-{} ({:.0}-{:.0} Hz) level {:.3}  agc {:.3}  ema {:.3}",
            self.band.lo(),
            self.band.hi(),
            whole_hz(Spectrum::<N>::bin_to_hz(self.band.lo())),
            whole_hz(Spectrum::<N>::bin_to_hz(self.band.hi())),
            self.level,
            self.gain,
            self.ema_energy,
        )
    }
}

/// Half-up, the way the serial port prints a float with no decimals.
/// `{:.0}` alone would round 112.5 down to the even 112.
fn whole_hz(hz: f64) -> f64 {
    (hz + 0.5).floor()
}

/// Emits at most one status line per interval of the millisecond clock.
#[derive(Debug, Clone)]
pub struct DebugTrace {
    last_ms: u32,
    interval_ms: u32,
}

impl DebugTrace {
    pub fn new() -> Self {
        Self::with_interval(TRACE_INTERVAL_MS)
    }

    pub fn with_interval(interval_ms: u32) -> Self {
        Self {
            last_ms: 0,
            interval_ms,
        }
    }

    /// Returns whether a line went out.
    pub fn maybe_emit<B: Board, const N: usize>(&mut self, board: &mut B, record: &StatusRecord) -> bool {
        let now = board.millis();
        if now.wrapping_sub(self.last_ms) < self.interval_ms {
            return false;
        }
        self.last_ms = now;
        board.serial_write_line(&record.format::<N>());
        true
    }
}

impl Default for DebugTrace {
    fn default() -> Self {
        Self::new()
    }
}
