use apodize::hanning_iter;

/// Hann coefficients over one frame, computed once at startup.
#[derive(Debug, Clone)]
pub struct HannWindow<const N: usize> {
    coeffs: [f64; N],
}

impl<const N: usize> HannWindow<N> {
    pub fn new() -> Self {
        let mut coeffs = [0.0; N];
        for (c, w) in coeffs.iter_mut().zip(hanning_iter(N)) {
            *c = w;
        }
        Self { coeffs }
    }

    #[inline]
    pub fn apply(&self, index: usize, sample: f64) -> f64 {
        sample * self.coeffs[index]
    }

    pub fn coefficients(&self) -> &[f64; N] {
        &self.coeffs
    }
}

impl<const N: usize> Default for HannWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}
