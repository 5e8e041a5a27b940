use std::sync::Arc;

use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use super::window::HannWindow;
use crate::config::SAMPLE_RATE_HZ;

/// Frame buffer plus the forward FFT that turns it into magnitudes.
///
/// Samples are written already windowed with a zero imaginary part. After
/// [`Spectrum::compute`] `magnitudes()[b]` holds `|X[b]|`, unnormalised;
/// only `1..N/2-1` are meaningful for band selection.
pub struct Spectrum<const N: usize> {
    fft: Arc<dyn Fft<f64>>,
    frame: [Complex64; N],
    scratch: Vec<Complex64>,
    magnitudes: [f64; N],
}

impl<const N: usize> Spectrum<N> {
    pub fn new() -> Self {
        const { assert!(N.is_power_of_two() && N >= 8) };

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(N);
        let scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            fft,
            frame: [Complex64::new(0.0, 0.0); N],
            scratch,
            magnitudes: [0.0; N],
        }
    }

    pub const fn nyquist_bin() -> usize {
        N / 2 - 1
    }

    pub fn bin_to_hz(bin: usize) -> f64 {
        bin as f64 * f64::from(SAMPLE_RATE_HZ) / N as f64
    }

    /// Store one centered sample, windowed.
    #[inline]
    pub fn set_sample(&mut self, index: usize, centered: f64, window: &HannWindow<N>) {
        self.frame[index] = Complex64::new(window.apply(index, centered), 0.0);
    }

    /// Fill the whole frame from centered samples; missing tail samples are zero.
    pub fn load(&mut self, samples: impl IntoIterator<Item = f64>, window: &HannWindow<N>) {
        let mut samples = samples.into_iter();
        for i in 0..N {
            let centered = samples.next().unwrap_or(0.0);
            self.set_sample(i, centered, window);
        }
    }

    pub fn compute(&mut self) -> &[f64; N] {
        self.fft.process_with_scratch(&mut self.frame, &mut self.scratch);

        for (m, x) in self.magnitudes.iter_mut().zip(self.frame.iter()) {
            *m = x.norm();
        }

        &self.magnitudes
    }

    pub fn magnitudes(&self) -> &[f64; N] {
        &self.magnitudes
    }
}

impl<const N: usize> Default for Spectrum<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_bin_mapping() {
        assert_eq!(Spectrum::<128>::nyquist_bin(), 63);
        assert_eq!(Spectrum::<256>::nyquist_bin(), 127);
        assert_eq!(Spectrum::<128>::bin_to_hz(1), 75.0);
        assert_eq!(Spectrum::<256>::bin_to_hz(20), 750.0);
    }

    #[test]
    fn test_zero_frame_gives_zero_magnitudes() {
        let window = HannWindow::<128>::new();
        let mut spectrum = Spectrum::<128>::new();
        spectrum.load(std::iter::repeat(0.0), &window);
        assert!(spectrum.compute().iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_bin_centered_tone_peaks_at_its_bin() {
        let window = HannWindow::<128>::new();
        let mut spectrum = Spectrum::<128>::new();
        // exactly bin 16
        let tone = (0..128).map(|n| 200.0 * (2.0 * PI * 16.0 * n as f64 / 128.0).sin());
        spectrum.load(tone, &window);
        let mags = spectrum.compute();

        let peak = (1..64).max_by(|&a, &b| mags[a].total_cmp(&mags[b])).unwrap();
        assert_eq!(peak, 16);
        // Hann main lobe: the peak is about A * N / 4
        assert!((mags[16] - 200.0 * 128.0 / 4.0).abs() < 200.0, "got {}", mags[16]);
        // far away from the main lobe there is almost nothing left
        assert!(mags[40] < 1.0);
    }

    #[test]
    fn test_matches_direct_dft() {
        let window = HannWindow::<128>::new();
        let mut spectrum = Spectrum::<128>::new();
        let samples: Vec<f64> = (0..128).map(|n| ((n * 37) % 101) as f64 - 50.0).collect();
        spectrum.load(samples.iter().copied(), &window);
        let mags = spectrum.compute();

        for k in [1, 7, 31, 63] {
            let mut acc = Complex64::new(0.0, 0.0);
            for (n, &x) in samples.iter().enumerate() {
                let phase = -2.0 * PI * (k * n) as f64 / 128.0;
                acc += Complex64::from_polar(window.apply(n, x), phase);
            }
            assert!((acc.norm() - mags[k]).abs() < 1e-6 * acc.norm().max(1.0));
        }
    }
}
