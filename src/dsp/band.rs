use std::fmt;

use crate::config::ADC_MAX;

/// Inclusive bin range `lo..=hi` with `1 <= lo < hi <= nyquist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandSelection {
    lo: usize,
    hi: usize,
}

impl BandSelection {
    /// Derive the band from the two knobs.
    ///
    /// `pot1` places the low edge in `1..=nyquist-1`; `pot2` is the width
    /// above that edge, scaled to whatever room is left, so turning the
    /// low knob never invalidates the high one.
    pub fn from_pots(pot1: u16, pot2: u16, nyquist: usize) -> Self {
        debug_assert!(nyquist >= 2);

        let full = usize::from(ADC_MAX);
        let p1 = usize::from(pot1.min(ADC_MAX));
        let p2 = usize::from(pot2.min(ADC_MAX));

        let lo = 1 + p1 * (nyquist - 2) / full;
        let hi = lo + 1 + p2 * (nyquist - lo - 1) / full;

        Self {
            lo,
            hi: hi.clamp(lo + 1, nyquist),
        }
    }

    pub fn lo(&self) -> usize {
        self.lo
    }

    pub fn hi(&self) -> usize {
        self.hi
    }

    pub fn bin_count(&self) -> usize {
        self.hi - self.lo + 1
    }

    pub fn bins(&self) -> std::ops::RangeInclusive<usize> {
        self.lo..=self.hi
    }

    pub fn contains(&self, bin: usize) -> bool {
        self.bins().contains(&bin)
    }
}

impl fmt::Display for BandSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}
